//! Property tests for repeated rewrite passes

use def_attribution::content::{ContentCatalog, Package};
use def_attribution::rewrite::{DescriptionRewriter, DescriptionTemplate, Settings};
use proptest::prelude::*;

fn catalog_with(description: &str) -> ContentCatalog {
    let mut catalog = ContentCatalog::new();
    let thing = catalog.register_category("ThingDef", None).unwrap();
    let alpha = catalog.add_package(Package::new("alpha.pack", "Alpha"));
    catalog
        .load_record(&alpha, thing, "R1", Some(description.to_string()))
        .unwrap();
    catalog
}

fn description(catalog: &ContentCatalog) -> String {
    catalog
        .description("ThingDef", "R1")
        .unwrap_or_default()
        .to_string()
}

prop_compose! {
    fn arb_settings()(
        format in prop::sample::select(vec!["{0}", "({0})", " - {0}", "[{0}]", "by {0,8}", "broken {", "{{{0}}}"]),
        italic in any::<bool>(),
        bold in any::<bool>(),
        font_size in -4i32..80,
        color_hex in prop::sample::select(vec!["66E0E4", "#ffffff", "FF000080", "nope", ""]),
        leading_blank_lines in -2i32..16,
    ) -> Settings {
        Settings {
            format: format.to_string(),
            italic,
            bold,
            font_size,
            color_hex: color_hex.to_string(),
            leading_blank_lines,
            ..Settings::default()
        }
    }
}

proptest! {
    #[test]
    fn prop_second_pass_changes_nothing(text in "[a-zA-Z0-9 .,]{0,40}", settings in arb_settings()) {
        let mut catalog = catalog_with(&text);
        let rewriter = DescriptionRewriter::new();

        rewriter.run(&mut catalog, Some(&settings)).unwrap();
        let first = description(&catalog);
        rewriter.run(&mut catalog, Some(&settings)).unwrap();

        prop_assert_eq!(description(&catalog), first);
    }

    #[test]
    fn prop_footer_follows_trimmed_text(text in "[a-zA-Z0-9 .,]{0,40}", settings in arb_settings()) {
        let mut catalog = catalog_with(&text);
        DescriptionRewriter::new().run(&mut catalog, Some(&settings)).unwrap();

        let footer = DescriptionTemplate::compile(&settings).render("Alpha").unwrap();
        prop_assert_eq!(description(&catalog), format!("{}{}", text.trim_end(), footer));
    }

    #[test]
    fn prop_settings_change_matches_fresh_pass(
        text in "[a-zA-Z0-9 .,]{0,40}",
        before in arb_settings(),
        after in arb_settings(),
    ) {
        let mut reused = catalog_with(&text);
        let rewriter = DescriptionRewriter::new();
        rewriter.run(&mut reused, Some(&before)).unwrap();
        rewriter.run(&mut reused, Some(&after)).unwrap();

        let mut fresh = catalog_with(&text);
        DescriptionRewriter::new().run(&mut fresh, Some(&after)).unwrap();

        prop_assert_eq!(description(&reused), description(&fresh));
    }

    #[test]
    fn prop_restart_keeps_spaced_footer_single(text in "[a-zA-Z0-9 .,]{0,40}", settings in arb_settings()) {
        let settings = Settings {
            leading_blank_lines: settings.leading_blank_lines.max(1),
            ..settings
        };
        let mut catalog = catalog_with(&text);
        DescriptionRewriter::new().run(&mut catalog, Some(&settings)).unwrap();
        let first = description(&catalog);

        DescriptionRewriter::new().run(&mut catalog, Some(&settings)).unwrap();

        prop_assert_eq!(description(&catalog), first);
    }
}
