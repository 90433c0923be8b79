//! Content packages and the ordered package list

use ahash::AHashMap;

use super::patch::PatchOperation;
use crate::core::types::{PackageId, RecordKey};

/// An independently authored content bundle
#[derive(Debug, Clone)]
pub struct Package {
    pub id: PackageId,
    /// Human-readable name shown in the footer
    pub name: String,
    /// Marks the host's own base content
    pub is_base: bool,
    /// Records this package loads directly, in load order
    pub records: Vec<RecordKey>,
    /// Root patch operations, in declaration order
    pub patches: Vec<PatchOperation>,
}

impl Package {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PackageId::new(id),
            name: name.into(),
            is_base: false,
            records: Vec::new(),
            patches: Vec::new(),
        }
    }

    /// Mark as the base/core content package
    pub fn base(mut self) -> Self {
        self.is_base = true;
        self
    }

    pub fn with_patch(mut self, patch: PatchOperation) -> Self {
        self.patches.push(patch);
        self
    }

    /// Name to put in the footer; the base package uses the configured override
    pub fn display_name<'a>(&'a self, base_override: &'a str) -> &'a str {
        let base_override = base_override.trim();
        if self.is_base && !base_override.is_empty() {
            base_override
        } else {
            &self.name
        }
    }
}

/// Packages in host load order, indexed by id
#[derive(Debug, Clone, Default)]
pub struct PackageList {
    packages: Vec<Package>,
    by_id: AHashMap<PackageId, usize>,
    by_normalized: AHashMap<String, usize>,
}

impl PackageList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package at the end of the load order.
    ///
    /// Returns the package's position. A package whose id is already present
    /// replaces nothing; the existing position is returned.
    pub fn push(&mut self, package: Package) -> usize {
        if let Some(&index) = self.by_id.get(&package.id) {
            tracing::warn!(
                "Package '{}' ({}) registered twice, keeping the first",
                package.name,
                package.id
            );
            return index;
        }
        let index = self.packages.len();
        self.by_id.insert(package.id.clone(), index);
        self.by_normalized.entry(package.id.normalized()).or_insert(index);
        self.packages.push(package);
        index
    }

    pub fn get(&self, id: &PackageId) -> Option<&Package> {
        self.by_id.get(id).map(|&i| &self.packages[i])
    }

    pub(crate) fn get_mut(&mut self, id: &PackageId) -> Option<&mut Package> {
        match self.by_id.get(id) {
            Some(&i) => self.packages.get_mut(i),
            None => None,
        }
    }

    /// Find a loaded package from a user-typed id, ignoring case and
    /// distribution postfixes
    pub fn find(&self, raw_id: &str) -> Option<&Package> {
        self.by_normalized
            .get(&crate::core::types::normalize_package_id(raw_id))
            .map(|&i| &self.packages[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
