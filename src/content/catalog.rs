//! The host's content catalog: ordered packages plus the category registry

use super::package::{Package, PackageList};
use super::record::Record;
use super::registry::CategoryRegistry;
use crate::core::error::{AttributionError, Result};
use crate::core::types::{CategoryId, PackageId, RecordKey, RecordName};

/// Everything the rewriter reads from (packages) and writes to (records)
#[derive(Debug, Clone, Default)]
pub struct ContentCatalog {
    packages: PackageList,
    registry: CategoryRegistry,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a package to the load order and return its id
    pub fn add_package(&mut self, package: Package) -> PackageId {
        let id = package.id.clone();
        self.packages.push(package);
        id
    }

    /// Load a record directly from `package`
    pub fn load_record(
        &mut self,
        package: &PackageId,
        category: CategoryId,
        name: impl Into<RecordName>,
        description: Option<String>,
    ) -> Result<RecordKey> {
        if self.packages.get(package).is_none() {
            return Err(AttributionError::ParseError(format!(
                "record loaded from unknown package {}",
                package
            )));
        }
        let key = self.registry.insert(Record::loaded(
            category,
            name,
            description,
            package.clone(),
        ))?;
        if let Some(owner) = self.packages.get_mut(package) {
            owner.records.push(key.clone());
        }
        Ok(key)
    }

    /// Add a record that only exists because a patch produced it
    pub fn add_synthesized(
        &mut self,
        category: CategoryId,
        name: impl Into<RecordName>,
        description: Option<String>,
    ) -> Result<RecordKey> {
        self.registry
            .insert(Record::synthesized(category, name, description))
    }

    /// Register a category, under `parent` or the root
    pub fn register_category(&mut self, name: &str, parent: Option<&str>) -> Result<CategoryId> {
        self.registry.register_category(name, parent)
    }

    pub fn packages(&self) -> &PackageList {
        &self.packages
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CategoryRegistry {
        &mut self.registry
    }

    /// Read-only packages and writable records at the same time
    pub fn split_mut(&mut self) -> (&PackageList, &mut CategoryRegistry) {
        (&self.packages, &mut self.registry)
    }

    pub fn record(&self, key: &RecordKey) -> Option<&Record> {
        self.registry.get(key)
    }

    /// Description of a record, looked up by category and record name
    pub fn description(&self, category: &str, name: &str) -> Option<&str> {
        let category = self.registry.category_id(category)?;
        self.registry
            .get(&RecordKey::new(category, name))
            .and_then(|r| r.description.as_deref())
    }
}
