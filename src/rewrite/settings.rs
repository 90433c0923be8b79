//! User settings snapshot
//!
//! The host persists these and hands the rewriter a parsed snapshot. Keys are
//! camelCase in TOML so a host settings file can be read as-is.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{AttributionError, Result};
use crate::rewrite::template::{check_format, parse_color_hex};

/// Largest custom font size the host's text renderer accepts
pub const MAX_FONT_SIZE: i32 = 64;

/// Most blank lines allowed before the footer
pub const MAX_LEADING_BLANK_LINES: i32 = 12;

/// Settings that drive exclusion and footer formatting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === EXCLUSION ===
    /// Annotate records of the base/core package too
    pub include_base_package: bool,

    /// Name shown for the base package instead of its own display name
    pub base_display_name_override: String,

    /// Package ids whose records are never annotated.
    ///
    /// Matched ignoring case and distribution postfixes (`_steam`, `_copy`).
    pub excluded_packages: Vec<String>,

    /// Record categories whose records are never annotated.
    ///
    /// Excluding a category also excludes its subcategories.
    pub excluded_record_categories: Vec<String>,

    // === FOOTER APPEARANCE ===
    /// Footer text; `{0}` is replaced with the package name
    pub format: String,

    pub italic: bool,

    pub bold: bool,

    /// Font size of the footer; 0 keeps the host's size
    pub font_size: i32,

    /// RGB or RGBA hex color of the footer
    pub color_hex: String,

    /// Blank lines between the description and the footer
    pub leading_blank_lines: i32,

    // === ATTRIBUTION ===
    /// Attribute records that were synthesized by patches
    ///
    /// When off, only directly loaded records are annotated.
    pub detect_patched_records: bool,

    /// Look for record names deep inside patch content, up to
    /// [`MAX_SCAN_DEPTH`](crate::attribution::MAX_SCAN_DEPTH) levels.
    ///
    /// Slower on large patch sets, and more likely to pick up names that are
    /// merely referenced rather than defined.
    pub deep_scan_mode: bool,

    /// Append the secondary annotation block where a collaborator offers one
    pub secondary_annotation_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            include_base_package: false,
            base_display_name_override: "Core".to_string(),
            excluded_packages: Vec::new(),
            excluded_record_categories: Vec::new(),

            format: "{0}".to_string(),
            italic: true,
            bold: false,
            font_size: 0,
            color_hex: "66E0E4".to_string(),
            leading_blank_lines: 1,

            detect_patched_records: true,
            deep_scan_mode: false,
            secondary_annotation_enabled: true,
        }
    }
}

impl Settings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML settings document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AttributionError::ParseError(e.to_string()))
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AttributionError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| AttributionError::ParseError(e.to_string()))
    }

    /// Clamp numeric fields into their accepted ranges.
    ///
    /// Returns the clamped settings and a note for every field that changed.
    pub fn sanitized(mut self) -> (Self, Vec<String>) {
        let mut notes = Vec::new();

        let font_size = self.font_size.clamp(0, MAX_FONT_SIZE);
        if font_size != self.font_size {
            notes.push(format!(
                "fontSize {} clamped to {}",
                self.font_size, font_size
            ));
            self.font_size = font_size;
        }

        let blank_lines = self.leading_blank_lines.clamp(0, MAX_LEADING_BLANK_LINES);
        if blank_lines != self.leading_blank_lines {
            notes.push(format!(
                "leadingBlankLines {} clamped to {}",
                self.leading_blank_lines, blank_lines
            ));
            self.leading_blank_lines = blank_lines;
        }

        (self, notes)
    }

    /// Check the footer settings for problems the template will work around
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Err(e) = check_format(&self.format) {
            return Err(format!("format {:?} is unusable: {}", self.format, e));
        }
        if parse_color_hex(&self.color_hex).is_err() {
            return Err(format!("colorHex {:?} is not a 6 or 8 digit hex color", self.color_hex));
        }
        Ok(())
    }
}
