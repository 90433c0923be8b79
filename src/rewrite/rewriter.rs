//! The rewrite pass: attribute every record and append its footer
//!
//! A [`DescriptionRewriter`] lives as long as the host process. Each call to
//! [`DescriptionRewriter::run`] is one pass: it compiles the template and the
//! exclusion filter, rebuilds the attribution map, then walks every live
//! record. Only one pass can be in flight per rewriter.

use ahash::AHashMap;
use serde::Serialize;
use std::sync::{Mutex, TryLockError};
use std::time::Instant;

use super::annotation::{annotation_block, strip_annotation, SecondaryAnnotator};
use super::exclusion::ExclusionFilter;
use super::ledger::FooterLedger;
use super::settings::Settings;
use super::template::DescriptionTemplate;
use crate::attribution::{AttributionMap, AttributionResolver};
use crate::content::catalog::ContentCatalog;
use crate::content::package::{Package, PackageList};
use crate::content::record::Record;
use crate::content::registry::RecordSlot;
use crate::core::error::{AttributionError, Result};
use crate::core::types::{PackageId, RecordKey};

/// Counts reported at the end of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Records visited
    pub examined: usize,
    /// Records whose description was written
    pub rewritten: usize,
    /// Rewritten records whose owner came from the attribution map
    pub resolved_from_patch: usize,
    /// No owning package could be found
    pub skipped_unattributed: usize,
    /// Owner or category excluded by settings
    pub skipped_excluded: usize,
    pub skipped_no_description: usize,
    /// Records left unmodified because composing their text failed
    pub failed: usize,
    /// Names the attribution scan assigned to a package
    pub names_attributed: usize,
    /// Packages whose patches could not be scanned
    pub packages_failed: usize,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn skipped(&self) -> usize {
        self.skipped_unattributed + self.skipped_excluded + self.skipped_no_description
    }
}

/// Long-lived entry point that runs rewrite passes over a catalog
pub struct DescriptionRewriter {
    /// Held for the whole of a pass; doubles as the in-flight guard
    ledger: Mutex<FooterLedger>,
    annotator: Option<Box<dyn SecondaryAnnotator>>,
}

impl DescriptionRewriter {
    pub fn new() -> Self {
        Self {
            ledger: Mutex::new(FooterLedger::new()),
            annotator: None,
        }
    }

    /// Attach the collaborator that supplies secondary annotation blocks
    pub fn with_annotator(mut self, annotator: impl SecondaryAnnotator + 'static) -> Self {
        self.annotator = Some(Box::new(annotator));
        self
    }

    /// Run one pass over every record in `catalog`.
    ///
    /// Fails only when no settings snapshot is available or another pass is
    /// still running. Per-package and per-record problems are logged and
    /// counted in the summary instead.
    pub fn run(&self, catalog: &mut ContentCatalog, settings: Option<&Settings>) -> Result<RunSummary> {
        let Some(settings) = settings else {
            tracing::error!("No settings snapshot available, record descriptions were not annotated");
            return Err(AttributionError::SettingsUnavailable(
                "no settings snapshot provided".to_string(),
            ));
        };

        let mut ledger = match self.ledger.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                tracing::warn!("Rewrite pass requested while another pass is running, rejected");
                return Err(AttributionError::PassInFlight);
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                tracing::warn!("Previous rewrite pass panicked, continuing with its ledger");
                poisoned.into_inner()
            }
        };

        let started = Instant::now();
        let pass = RewritePass::prepare(settings, catalog, self.annotator.as_deref());
        let mut summary = pass.execute(catalog, &mut ledger);
        summary.elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            "Rewrote {} of {} record descriptions in {} ms ({} attributed from patches, {} skipped, {} failed)",
            summary.rewritten,
            summary.examined,
            summary.elapsed_ms,
            summary.resolved_from_patch,
            summary.skipped(),
            summary.failed
        );
        Ok(summary)
    }

    /// Number of records whose pre-footer text is remembered
    pub fn remembered(&self) -> usize {
        match self.ledger.lock() {
            Ok(ledger) => ledger.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Default for DescriptionRewriter {
    fn default() -> Self {
        Self::new()
    }
}

/// State owned by a single pass; dropped when the pass ends
struct RewritePass<'a> {
    settings: &'a Settings,
    template: DescriptionTemplate,
    filter: ExclusionFilter,
    attribution: AttributionMap,
    annotator: Option<&'a dyn SecondaryAnnotator>,
    /// Rendered footer per package
    footers: AHashMap<PackageId, String>,
    summary: RunSummary,
}

impl<'a> RewritePass<'a> {
    fn prepare(
        settings: &'a Settings,
        catalog: &ContentCatalog,
        annotator: Option<&'a dyn SecondaryAnnotator>,
    ) -> Self {
        let template = DescriptionTemplate::compile(settings);
        let filter = ExclusionFilter::build(settings, catalog.packages(), catalog.registry());

        let mut summary = RunSummary::default();
        let attribution = if settings.detect_patched_records {
            let resolver = AttributionResolver::new(settings.deep_scan_mode);
            let (map, stats) = resolver.resolve_all(catalog.packages().iter());
            summary.names_attributed = stats.names_attributed;
            summary.packages_failed = stats.packages_failed;
            map
        } else {
            AttributionMap::new()
        };

        Self {
            settings,
            template,
            filter,
            attribution,
            annotator,
            footers: AHashMap::new(),
            summary,
        }
    }

    fn execute(mut self, catalog: &mut ContentCatalog, ledger: &mut FooterLedger) -> RunSummary {
        let (packages, registry) = catalog.split_mut();
        for slot in registry.records_mut() {
            self.summary.examined += 1;
            self.rewrite_record(slot, packages, ledger);
        }
        self.summary
    }

    fn rewrite_record(&mut self, slot: RecordSlot<'_>, packages: &PackageList, ledger: &mut FooterLedger) {
        let RecordSlot {
            category,
            category_name,
            record,
        } = slot;

        let Some((package, from_patch)) = self.owner_of(record, packages) else {
            self.summary.skipped_unattributed += 1;
            tracing::debug!("No package found for [{}] {}, skipped", category_name, record.name);
            return;
        };

        if let Some(reason) = self.filter.check(package, category) {
            self.summary.skipped_excluded += 1;
            tracing::debug!(
                "[{}] {} from {} excluded ({:?})",
                category_name,
                record.name,
                package.id,
                reason
            );
            return;
        }

        let Some(current) = record.description.as_deref() else {
            self.summary.skipped_no_description += 1;
            return;
        };

        let key = RecordKey::new(category, record.name.clone());
        match self.compose(&key, record, category_name, current, package, ledger) {
            Ok(text) => {
                record.description = Some(text);
                self.summary.rewritten += 1;
                if from_patch {
                    self.summary.resolved_from_patch += 1;
                }
            }
            Err(e) => {
                self.summary.failed += 1;
                let stage = match (&e, self.annotator) {
                    (AttributionError::Annotation { .. }, Some(annotator)) => annotator.name(),
                    _ => "footer",
                };
                tracing::error!(
                    "Failed to generate description for [{}] {} from package {} ({}): {}",
                    category_name,
                    record.name,
                    package.name,
                    stage,
                    e
                );
            }
        }
    }

    /// Direct provenance first, then the attribution map.
    ///
    /// The flag is true when the owner came from the map.
    fn owner_of<'p>(&self, record: &Record, packages: &'p PackageList) -> Option<(&'p Package, bool)> {
        if let Some(package) = record.source.as_ref().and_then(|id| packages.get(id)) {
            return Some((package, false));
        }
        self.attribution
            .owner(&record.name)
            .and_then(|id| packages.get(id))
            .map(|package| (package, true))
    }

    fn compose(
        &mut self,
        key: &RecordKey,
        record: &Record,
        category_name: &str,
        current: &str,
        package: &Package,
        ledger: &mut FooterLedger,
    ) -> Result<String> {
        let footer = self.footer_for(package)?;

        let base = match ledger.base_for(key, current) {
            Some(base) => base.to_string(),
            None => strip_stale_footer(strip_annotation(current), &footer)
                .trim_end()
                .to_string(),
        };

        let mut text = String::with_capacity(base.len() + footer.len());
        text.push_str(&base);
        text.push_str(&footer);

        if self.settings.secondary_annotation_enabled {
            if let Some(annotator) = self.annotator {
                if annotator.applies_to(record, category_name) {
                    let extra = annotator.annotate(record, category_name)?;
                    if !extra.trim().is_empty() {
                        text.push_str(&annotation_block(&extra));
                    }
                }
            }
        }

        ledger.remember(key.clone(), base, text.clone());
        Ok(text)
    }

    fn footer_for(&mut self, package: &Package) -> Result<String> {
        if let Some(footer) = self.footers.get(&package.id) {
            return Ok(footer.clone());
        }
        let name = package.display_name(&self.settings.base_display_name_override);
        let footer = self.template.render(name)?;
        self.footers.insert(package.id.clone(), footer.clone());
        Ok(footer)
    }
}

/// Remove a footer left by an earlier process.
///
/// Only footers that start with whitespace are recognized; a footer glued
/// directly to the text cannot be told apart from the description itself.
fn strip_stale_footer<'t>(text: &'t str, footer: &str) -> &'t str {
    if !footer.starts_with(char::is_whitespace) || footer.trim().is_empty() {
        return text;
    }
    if let Some(stripped) = text.strip_suffix(footer) {
        return stripped;
    }
    text.trim_end()
        .strip_suffix(footer.trim_end())
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_stale_footer() {
        assert_eq!(strip_stale_footer("An item.\n(Alpha)", "\n(Alpha)"), "An item.");
        assert_eq!(strip_stale_footer("An item.\n(Alpha)  ", "\n(Alpha)"), "An item.");
        assert_eq!(strip_stale_footer("An item.\n(Beta)", "\n(Alpha)"), "An item.\n(Beta)");
        assert_eq!(strip_stale_footer("Made by Alpha", "Alpha"), "Made by Alpha");
        assert_eq!(strip_stale_footer("Text\n\n", "\n\n"), "Text\n\n");
    }

    #[test]
    fn test_blank_footer_never_strips() {
        assert_eq!(strip_stale_footer("Text \n", " \n"), "Text \n");
        assert_eq!(strip_stale_footer("Text", ""), "Text");
    }

    #[test]
    fn test_summary_skipped_total() {
        let summary = RunSummary {
            skipped_unattributed: 1,
            skipped_excluded: 2,
            skipped_no_description: 3,
            ..RunSummary::default()
        };
        assert_eq!(summary.skipped(), 6);
    }
}
