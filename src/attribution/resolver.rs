//! Attribution of patch-synthesized records to the package that injected them
//!
//! The resolver scans the literal content of every Add/Insert patch for
//! record-name markers (`<defName>`). The first package, in load order, whose
//! patches mention a name owns it.

use ahash::AHashMap;

use super::walker::{LiteralFragment, PatchWalker};
use crate::content::package::Package;
use crate::content::patch::ContentNode;
use crate::core::error::{AttributionError, Result};
use crate::core::types::{PackageId, RecordName};

/// Element name that marks a record name inside injected content
pub const RECORD_NAME_MARKER: &str = "defName";

/// Deepest level deep-scan mode descends to
pub const MAX_SCAN_DEPTH: usize = 10;

/// Record name -> owning package, built once per rewrite pass
#[derive(Debug, Clone, Default)]
pub struct AttributionMap {
    owners: AHashMap<RecordName, PackageId>,
}

impl AttributionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `name` with `package` unless something already claimed it.
    ///
    /// Returns `true` when the name was newly attributed.
    pub fn claim(&mut self, name: RecordName, package: &PackageId) -> bool {
        if self.owners.contains_key(&name) {
            return false;
        }
        self.owners.insert(name, package.clone());
        true
    }

    pub fn owner(&self, name: &RecordName) -> Option<&PackageId> {
        self.owners.get(name)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Counts reported after resolving every package
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub packages_scanned: usize,
    pub packages_failed: usize,
    pub fragments_scanned: usize,
    pub names_attributed: usize,
}

/// Scans patch content for record-name markers
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributionResolver {
    deep_scan: bool,
}

impl AttributionResolver {
    pub fn new(deep_scan: bool) -> Self {
        Self { deep_scan }
    }

    /// Scan every package's patches, in order, into a fresh map.
    ///
    /// A package whose patches are malformed is logged and contributes
    /// nothing; the remaining packages are still scanned.
    pub fn resolve_all<'p>(
        &self,
        packages: impl IntoIterator<Item = &'p Package>,
    ) -> (AttributionMap, ResolveStats) {
        let mut map = AttributionMap::new();
        let mut stats = ResolveStats::default();

        for package in packages {
            stats.packages_scanned += 1;
            match self.scan_package(package, &mut map) {
                Ok((fragments, attributed)) => {
                    stats.fragments_scanned += fragments;
                    stats.names_attributed += attributed;
                }
                Err(e) => {
                    stats.packages_failed += 1;
                    tracing::error!(
                        "Failed to scan patches of package '{}' ({}), its patched records won't be attributed: {}",
                        package.name,
                        package.id,
                        e
                    );
                }
            }
        }

        tracing::debug!(
            "Attribution scanned {} packages ({} failed), {} fragments, {} names attributed",
            stats.packages_scanned,
            stats.packages_failed,
            stats.fragments_scanned,
            stats.names_attributed
        );
        (map, stats)
    }

    /// Scan one package into `map`.
    ///
    /// Names are staged and only committed once the whole package scanned
    /// cleanly, so a failing package leaves no partial contributions. Returns
    /// (fragments scanned, names newly attributed).
    pub fn scan_package(&self, package: &Package, map: &mut AttributionMap) -> Result<(usize, usize)> {
        let mut staged = Vec::new();
        let mut fragments = 0;

        for fragment in PatchWalker::forest(&package.patches).fragments() {
            fragments += 1;
            self.scan_fragment(package, fragment, &mut staged)?;
        }

        let attributed = staged
            .into_iter()
            .filter(|name| map.claim(name.clone(), &package.id))
            .count();
        Ok((fragments, attributed))
    }

    fn scan_fragment(
        &self,
        package: &Package,
        fragment: LiteralFragment<'_>,
        staged: &mut Vec<RecordName>,
    ) -> Result<()> {
        let nodes = fragment.nodes.ok_or_else(|| AttributionError::MalformedPatch {
            package: package.id.clone(),
            reason: format!("{} operation has no value", fragment.operation.kind_name()),
        })?;
        for node in nodes {
            self.scan_node(package, node, 0, staged)?;
        }
        Ok(())
    }

    fn scan_node(
        &self,
        package: &Package,
        node: &ContentNode,
        depth: usize,
        staged: &mut Vec<RecordName>,
    ) -> Result<()> {
        if node.name == RECORD_NAME_MARKER {
            if !node.children.is_empty() {
                return Err(AttributionError::MalformedPatch {
                    package: package.id.clone(),
                    reason: format!(
                        "<{}> at depth {} holds elements instead of text",
                        RECORD_NAME_MARKER, depth
                    ),
                });
            }
            match node.text.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => staged.push(RecordName::new(name)),
                _ => tracing::debug!(
                    "Empty <{}> in patches of {}, ignored",
                    RECORD_NAME_MARKER,
                    package.id
                ),
            }
            return Ok(());
        }

        if self.descends_at(depth) {
            for child in &node.children {
                self.scan_node(package, child, depth + 1, staged)?;
            }
        }
        Ok(())
    }

    /// Top-level nodes are always opened; deeper ones only in deep-scan mode
    fn descends_at(&self, depth: usize) -> bool {
        depth == 0 || (self.deep_scan && depth < MAX_SCAN_DEPTH)
    }
}
