//! Load a content catalog from TOML package manifests
//!
//! A catalog directory holds an optional `categories.toml` plus one manifest
//! per package. Manifests are applied in file-name order, which is the load
//! order, so prefix them (`00_core.toml`, `10_alpha.toml`) to control it.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::catalog::ContentCatalog;
use super::package::Package;
use super::patch::PatchOperation;
use crate::core::error::{AttributionError, Result};
use crate::core::types::{CategoryId, RecordName};

/// File holding categories and host types shared by all packages
pub const CATEGORIES_FILE: &str = "categories.toml";

/// TOML representation of `categories.toml`
#[derive(Debug, Default, Deserialize)]
struct TomlCategories {
    #[serde(default)]
    categories: Vec<TomlCategory>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TomlCategory {
    name: String,
    #[serde(default)]
    parent: Option<String>,
}

/// TOML representation of one package manifest
#[derive(Debug, Deserialize)]
struct TomlManifest {
    package: TomlPackage,
    #[serde(default)]
    categories: Vec<TomlCategory>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    records: Vec<TomlRecord>,
    /// Records the host produced from patches; they carry no provenance
    #[serde(default)]
    synthesized: Vec<TomlRecord>,
    #[serde(default)]
    patches: Vec<PatchOperation>,
}

#[derive(Debug, Deserialize)]
struct TomlPackage {
    id: String,
    name: String,
    #[serde(default)]
    base: bool,
}

#[derive(Debug, Deserialize)]
struct TomlRecord {
    category: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    /// Extra readout for the secondary annotation collaborator
    #[serde(default)]
    annotation: Option<String>,
}

/// A secondary-annotation readout declared next to a record
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredAnnotation {
    /// Registered name of the record's category, whatever alias the manifest used
    pub category: String,
    pub record: RecordName,
    pub text: String,
}

/// Builds a [`ContentCatalog`] from manifests
#[derive(Debug, Default)]
pub struct ContentLoader {
    catalog: ContentCatalog,
    annotations: Vec<DeclaredAnnotation>,
}

impl ContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `categories.toml` (if present) and every other `.toml` in `dir`
    pub fn load_directory(dir: &Path) -> Result<Self> {
        let mut loader = Self::new();

        let categories_path = dir.join(CATEGORIES_FILE);
        if categories_path.exists() {
            let content = std::fs::read_to_string(&categories_path)?;
            loader.apply_categories_str(&content, &categories_path.display().to_string())?;
        }

        let mut manifests: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| path.extension().map_or(false, |ext| ext == "toml"))
            .filter(|path| path.file_name().map_or(true, |n| n != CATEGORIES_FILE))
            .collect();
        manifests.sort();

        for path in manifests {
            let content = std::fs::read_to_string(&path)?;
            loader.apply_manifest_str(&content, &path.display().to_string())?;
        }

        tracing::info!(
            "Loaded {} packages and {} records from {}",
            loader.catalog.packages().len(),
            loader.catalog.registry().record_count(),
            dir.display()
        );
        Ok(loader)
    }

    /// Register the categories and host types of a `categories.toml` document
    pub fn apply_categories_str(&mut self, content: &str, origin: &str) -> Result<()> {
        let parsed: TomlCategories = toml::from_str(content)
            .map_err(|e| AttributionError::ParseError(format!("{}: {}", origin, e)))?;
        self.register_categories(&parsed.categories, &parsed.types)
    }

    /// Apply one package manifest at the end of the load order
    pub fn apply_manifest_str(&mut self, content: &str, origin: &str) -> Result<()> {
        let manifest: TomlManifest = toml::from_str(content)
            .map_err(|e| AttributionError::ParseError(format!("{}: {}", origin, e)))?;

        self.register_categories(&manifest.categories, &manifest.types)?;

        let mut package = Package::new(manifest.package.id, manifest.package.name);
        package.is_base = manifest.package.base;
        package.patches = manifest.patches;
        let package_id = self.catalog.add_package(package);

        for record in manifest.records {
            let category = self.category_for(&record, origin)?;
            let name = RecordName::new(record.name.clone());
            match self
                .catalog
                .load_record(&package_id, category, name.clone(), record.description)
            {
                Ok(_) => self.note_annotation(category, name, record.annotation),
                Err(AttributionError::DuplicateRecord { category, name }) => {
                    tracing::warn!(
                        "{}: record [{}] {} already loaded by an earlier package, skipped",
                        origin,
                        category,
                        name
                    );
                }
                Err(e) => return Err(e),
            }
        }

        for record in manifest.synthesized {
            let category = self.category_for(&record, origin)?;
            let name = RecordName::new(record.name.clone());
            match self
                .catalog
                .add_synthesized(category, name.clone(), record.description)
            {
                Ok(_) => self.note_annotation(category, name, record.annotation),
                Err(AttributionError::DuplicateRecord { category, name }) => {
                    tracing::warn!(
                        "{}: synthesized record [{}] {} already exists, skipped",
                        origin,
                        category,
                        name
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    fn register_categories(&mut self, categories: &[TomlCategory], types: &[String]) -> Result<()> {
        for category in categories {
            self.catalog
                .register_category(&category.name, category.parent.as_deref())?;
        }
        for name in types {
            self.catalog.registry_mut().register_foreign_type(name);
        }
        Ok(())
    }

    fn category_for(&self, record: &TomlRecord, origin: &str) -> Result<CategoryId> {
        self.catalog
            .registry()
            .category_id(&record.category)
            .ok_or_else(|| {
                AttributionError::UnknownCategory(format!(
                    "{} (record {} in {})",
                    record.category, record.name, origin
                ))
            })
    }

    fn note_annotation(&mut self, category: CategoryId, record: RecordName, text: Option<String>) {
        if let Some(text) = text {
            self.annotations.push(DeclaredAnnotation {
                category: self.catalog.registry().category_name(category).to_string(),
                record,
                text,
            });
        }
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn annotations(&self) -> &[DeclaredAnnotation] {
        &self.annotations
    }

    pub fn into_parts(self) -> (ContentCatalog, Vec<DeclaredAnnotation>) {
        (self.catalog, self.annotations)
    }
}
