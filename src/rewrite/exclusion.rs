//! Which packages and record categories are left alone
//!
//! Built once per pass from the settings. Bad entries are reported and
//! ignored; nothing here can fail the pass.

use ahash::AHashSet;

use super::settings::Settings;
use crate::content::package::{Package, PackageList};
use crate::content::registry::{CategoryRegistry, TypeResolution};
use crate::core::types::{normalize_package_id, CategoryId};

/// Why a record was not rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    BasePackage,
    Package,
    Category,
}

#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    include_base: bool,
    /// Normalized package ids
    packages: AHashSet<String>,
    /// Excluded categories and all their subcategories
    categories: AHashSet<CategoryId>,
}

impl ExclusionFilter {
    pub fn build(settings: &Settings, packages: &PackageList, registry: &CategoryRegistry) -> Self {
        let mut filter = Self {
            include_base: settings.include_base_package,
            ..Self::default()
        };

        for raw in &settings.excluded_packages {
            let id = raw.trim();
            if id.is_empty() {
                continue;
            }
            if !filter.packages.insert(normalize_package_id(id)) {
                tracing::warn!("Duplicate excluded package entry: {}", id);
                continue;
            }
            match packages.find(id) {
                Some(package) => {
                    tracing::info!("Excluding package '{}' ({}) from attribution", package.name, package.id)
                }
                None => tracing::warn!(
                    "Failed to find a loaded package with id '{}'. It won't be excluded unless it loads later.",
                    id
                ),
            }
        }

        let mut roots: Vec<CategoryId> = Vec::new();
        for raw in &settings.excluded_record_categories {
            let name = raw.trim();
            if name.is_empty() {
                continue;
            }
            match registry.resolve(name) {
                TypeResolution::Category(id) if roots.contains(&id) => {
                    tracing::warn!("Duplicate excluded record category entry: {}", registry.category_name(id));
                }
                TypeResolution::Category(id) => roots.push(id),
                TypeResolution::Foreign(full) => tracing::error!(
                    "Type '{}' is not a record category. Will be ignored.",
                    full
                ),
                TypeResolution::Unknown => tracing::error!(
                    "Failed to find excluded record category '{}'. Perhaps it comes from a package that isn't loaded?",
                    name
                ),
            }
        }

        filter.categories = registry
            .categories()
            .map(|c| c.id)
            .filter(|&id| roots.iter().any(|&root| registry.is_within(id, root)))
            .collect();

        filter
    }

    /// Check the owning package first, then the record's category
    pub fn check(&self, package: &Package, category: CategoryId) -> Option<Exclusion> {
        if package.is_base && !self.include_base {
            return Some(Exclusion::BasePackage);
        }
        if self.excludes_package(package) {
            return Some(Exclusion::Package);
        }
        if self.categories.contains(&category) {
            return Some(Exclusion::Category);
        }
        None
    }

    pub fn excludes_package(&self, package: &Package) -> bool {
        self.packages.contains(&package.id.normalized())
    }

    pub fn excludes_category(&self, category: CategoryId) -> bool {
        self.categories.contains(&category)
    }

    pub fn excluded_package_count(&self) -> usize {
        self.packages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (PackageList, CategoryRegistry) {
        let mut packages = PackageList::new();
        packages.push(Package::new("host.core", "Core").base());
        packages.push(Package::new("Author.Weapons_steam", "Weapons"));
        let mut registry = CategoryRegistry::new();
        registry.register_category("ThingDef", None).unwrap();
        registry.register_category("AmmoDef", Some("ThingDef")).unwrap();
        registry.register_category("ResearchDef", None).unwrap();
        registry.register_foreign_type("Verse.Pawn");
        (packages, registry)
    }

    #[test]
    fn test_base_package_needs_opt_in() {
        let (packages, registry) = fixture();
        let core = packages.find("host.core").unwrap();
        let thing = registry.category_id("ThingDef").unwrap();

        let filter = ExclusionFilter::build(&Settings::default(), &packages, &registry);
        assert_eq!(filter.check(core, thing), Some(Exclusion::BasePackage));

        let settings = Settings {
            include_base_package: true,
            ..Settings::default()
        };
        let filter = ExclusionFilter::build(&settings, &packages, &registry);
        assert_eq!(filter.check(core, thing), None);
    }

    #[test]
    fn test_package_matched_across_channels() {
        let (packages, registry) = fixture();
        let settings = Settings {
            excluded_packages: vec!["author.weapons".into(), "AUTHOR.WEAPONS_copy".into(), "  ".into()],
            ..Settings::default()
        };
        let filter = ExclusionFilter::build(&settings, &packages, &registry);
        assert_eq!(filter.excluded_package_count(), 1);
        let weapons = packages.find("author.weapons").unwrap();
        assert_eq!(
            filter.check(weapons, registry.category_id("ResearchDef").unwrap()),
            Some(Exclusion::Package)
        );
    }

    #[test]
    fn test_category_exclusion_covers_subcategories() {
        let (packages, registry) = fixture();
        let settings = Settings {
            excluded_record_categories: vec![
                "thingdef".into(),
                "ThingDef".into(),
                "Verse.Pawn".into(),
                "NoSuchDef".into(),
            ],
            ..Settings::default()
        };
        let filter = ExclusionFilter::build(&settings, &packages, &registry);
        assert!(filter.excludes_category(registry.category_id("ThingDef").unwrap()));
        assert!(filter.excludes_category(registry.category_id("AmmoDef").unwrap()));
        assert!(!filter.excludes_category(registry.category_id("ResearchDef").unwrap()));
        assert!(!filter.excludes_category(registry.root()));
    }

    #[test]
    fn test_package_reason_reported_before_category() {
        let (packages, registry) = fixture();
        let settings = Settings {
            excluded_packages: vec!["author.weapons".into()],
            excluded_record_categories: vec!["ResearchDef".into()],
            ..Settings::default()
        };
        let filter = ExclusionFilter::build(&settings, &packages, &registry);
        let weapons = packages.find("author.weapons").unwrap();
        assert_eq!(
            filter.check(weapons, registry.category_id("ResearchDef").unwrap()),
            Some(Exclusion::Package)
        );
    }

    #[test]
    fn test_unknown_package_still_listed() {
        let (packages, registry) = fixture();
        let settings = Settings {
            excluded_packages: vec!["later.pack".into()],
            ..Settings::default()
        };
        let filter = ExclusionFilter::build(&settings, &packages, &registry);
        assert!(filter.excludes_package(&Package::new("Later.Pack_steam", "Later")));
    }
}
