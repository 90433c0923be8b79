//! Footer template: turns a package name into the styled footer text
//!
//! The template is compiled once per pass from the settings snapshot. The
//! styling tags are the host's rich-text markup (`<i>`, `<b>`, `<size=N>`,
//! `<color=#RRGGBB>`).

use super::format::CompositeFormat;
use super::settings::Settings;
use crate::core::error::{AttributionError, Result};

/// Name substituted when trial-formatting the user's format string
pub const SENTINEL_PACKAGE_NAME: &str = "ExamplePackageName";

/// Format used when the configured one is unusable
pub const FALLBACK_FORMAT: &str = "{0}";

/// Replace square brackets, which the host treats as markup delimiters
pub fn sanitize_markup(text: &str) -> String {
    text.replace('[', "(").replace(']', ")")
}

/// Parse a `RRGGBB` / `RRGGBBAA` color, with or without a leading `#`.
///
/// Returns the uppercased color, or `None` for opaque white, which is the
/// host's default text color and needs no tag.
pub fn parse_color_hex(raw: &str) -> std::result::Result<Option<String>, String> {
    let hex = raw.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("'{}' is not a 6 or 8 digit hex color", raw));
    }
    let hex = hex.to_ascii_uppercase();
    let opaque = hex.len() == 6 || hex.ends_with("FF");
    if opaque && hex.starts_with("FFFFFF") {
        return Ok(None);
    }
    Ok(Some(hex))
}

/// A compiled footer template
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionTemplate {
    prefix: String,
    body: CompositeFormat,
    suffix: String,
    used_fallback: bool,
}

impl DescriptionTemplate {
    /// Compile the footer from the appearance fields of `settings`.
    ///
    /// Never fails: an unusable format string falls back to
    /// [`FALLBACK_FORMAT`] and an invalid color drops the color tag, both
    /// with a warning.
    pub fn compile(settings: &Settings) -> Self {
        let (settings, notes) = settings.clone().sanitized();
        for note in notes {
            tracing::warn!("Footer settings adjusted: {}", note);
        }

        let mut prefix = "\n".repeat(settings.leading_blank_lines as usize);
        let mut closing: Vec<&str> = Vec::new();

        if settings.italic {
            prefix.push_str("<i>");
            closing.push("</i>");
        }
        if settings.bold {
            prefix.push_str("<b>");
            closing.push("</b>");
        }
        if settings.font_size > 0 {
            prefix.push_str(&format!("<size={}>", settings.font_size));
            closing.push("</size>");
        }
        match parse_color_hex(&settings.color_hex) {
            Ok(Some(hex)) => {
                prefix.push_str(&format!("<color=#{}>", hex));
                closing.push("</color>");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Footer color ignored: {}", e),
        }
        let suffix: String = closing.into_iter().rev().collect();

        let (body, used_fallback) = match check_format(&settings.format) {
            Ok(body) => (body, false),
            Err(e) => {
                tracing::warn!(
                    "Footer format {:?} is unusable ({}), using {:?} instead",
                    settings.format,
                    e,
                    FALLBACK_FORMAT
                );
                (CompositeFormat::single_placeholder(), true)
            }
        };

        Self {
            prefix,
            body,
            suffix,
            used_fallback,
        }
    }

    /// Footer text for a package display name
    pub fn render(&self, package_name: &str) -> Result<String> {
        let name = sanitize_markup(package_name);
        let body = self
            .body
            .format(&[&name])
            .map_err(|e| AttributionError::InvalidFormat(e.to_string()))?;
        let mut footer = String::with_capacity(self.prefix.len() + body.len() + self.suffix.len());
        footer.push_str(&self.prefix);
        footer.push_str(&body);
        footer.push_str(&self.suffix);
        Ok(footer)
    }

    /// Whether the configured format was replaced by [`FALLBACK_FORMAT`]
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// What a description looks like with the sentinel package's footer
    pub fn preview(&self, example_description: &str) -> Result<String> {
        Ok(format!(
            "{}{}",
            example_description.trim_end(),
            self.render(SENTINEL_PACKAGE_NAME)?
        ))
    }
}

/// Parse the sanitized format and trial-substitute the sentinel name
pub(crate) fn check_format(raw: &str) -> Result<CompositeFormat> {
    let format = CompositeFormat::parse(&sanitize_markup(raw))
        .map_err(|e| AttributionError::InvalidFormat(e.to_string()))?;
    if !format.has_placeholder() {
        return Err(AttributionError::InvalidFormat(
            "no {0} placeholder".to_string(),
        ));
    }
    format
        .format(&[SENTINEL_PACKAGE_NAME])
        .map_err(|e| AttributionError::InvalidFormat(e.to_string()))?;
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> Settings {
        Settings {
            format: "{0}".into(),
            italic: false,
            bold: false,
            font_size: 0,
            color_hex: "FFFFFF".into(),
            leading_blank_lines: 0,
            ..Settings::default()
        }
    }

    #[test]
    fn test_plain_template_is_bare_name() {
        let template = DescriptionTemplate::compile(&plain());
        assert_eq!(template.render("Alpha").unwrap(), "Alpha");
    }

    #[test]
    fn test_full_styling_nests_tags() {
        let settings = Settings {
            format: "Added by {0}".into(),
            italic: true,
            bold: true,
            font_size: 12,
            color_hex: "#66e0e4".into(),
            leading_blank_lines: 2,
            ..Settings::default()
        };
        let template = DescriptionTemplate::compile(&settings);
        assert_eq!(
            template.render("Alpha").unwrap(),
            "\n\n<i><b><size=12><color=#66E0E4>Added by Alpha</color></size></b></i>"
        );
    }

    #[test]
    fn test_package_name_brackets_are_sanitized() {
        let template = DescriptionTemplate::compile(&plain());
        assert_eq!(template.render("[1.5] Pack").unwrap(), "(1.5) Pack");
    }

    #[test]
    fn test_format_brackets_are_sanitized() {
        let mut settings = plain();
        settings.format = "[{0}]".into();
        let template = DescriptionTemplate::compile(&settings);
        assert_eq!(template.render("Alpha").unwrap(), "(Alpha)");
    }

    #[test]
    fn test_missing_placeholder_falls_back() {
        let mut settings = plain();
        settings.format = "no placeholder here".into();
        let template = DescriptionTemplate::compile(&settings);
        assert!(template.used_fallback());
        assert_eq!(template.render("Alpha").unwrap(), "Alpha");
    }

    #[test]
    fn test_broken_formats_fall_back() {
        for format in ["{0} {1}", "{0", "}{0}", "{x}"] {
            let mut settings = plain();
            settings.format = format.into();
            let template = DescriptionTemplate::compile(&settings);
            assert!(template.used_fallback(), "{:?} should fall back", format);
            assert_eq!(template.render("Alpha").unwrap(), "Alpha");
        }
    }

    #[test]
    fn test_invalid_color_is_dropped() {
        let mut settings = plain();
        settings.color_hex = "blue".into();
        let template = DescriptionTemplate::compile(&settings);
        assert_eq!(template.render("Alpha").unwrap(), "Alpha");
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(parse_color_hex("ffffff"), Ok(None));
        assert_eq!(parse_color_hex("FFFFFFFF"), Ok(None));
        assert_eq!(parse_color_hex("FFFFFF80"), Ok(Some("FFFFFF80".into())));
        assert_eq!(parse_color_hex("66E0E4FF"), Ok(Some("66E0E4FF".into())));
        assert!(parse_color_hex("12345").is_err());
        assert!(parse_color_hex("GGGGGG").is_err());
    }

    #[test]
    fn test_preview_trims_example() {
        let template = DescriptionTemplate::compile(&Settings {
            format: " - {0}".into(),
            ..plain()
        });
        assert_eq!(
            template.preview("A thing.  \n").unwrap(),
            format!("A thing. - {}", SENTINEL_PACKAGE_NAME)
        );
    }
}
