//! Record category registry and record enumeration
//!
//! Every record category registers itself here together with its live
//! records. Extension packages add categories at load time, so nothing in the
//! crate hardcodes a category list; enumeration simply walks what was
//! registered, in registration order.

use ahash::AHashMap;

use super::record::Record;
use crate::core::error::{AttributionError, Result};
use crate::core::types::{CategoryId, RecordKey, RecordName};

/// Name of the root of the record-category hierarchy
pub const ROOT_CATEGORY: &str = "Def";

/// A registered record category and its live records
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    /// Full name, possibly namespaced (`Verse.ThingDef`)
    pub name: String,
    /// Parent category; `None` only for the root
    pub parent: Option<CategoryId>,
    records: Vec<Record>,
    by_name: AHashMap<RecordName, usize>,
}

impl Category {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// What a user-typed type name refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeResolution {
    /// A record category
    Category(CategoryId),
    /// A host type that exists but is not part of the record hierarchy
    Foreign(String),
    Unknown,
}

/// A mutable view of one live record during enumeration
#[derive(Debug)]
pub struct RecordSlot<'a> {
    pub category: CategoryId,
    pub category_name: &'a str,
    pub record: &'a mut Record,
}

/// Registry of record categories and their live record sets
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    /// Lowercased full and short names -> category
    lookup: AHashMap<String, CategoryId>,
    /// Lowercased full and short names -> full name, for non-record types
    foreign: AHashMap<String, String>,
}

impl CategoryRegistry {
    /// A registry holding only the root category
    pub fn new() -> Self {
        let mut registry = Self {
            categories: Vec::new(),
            lookup: AHashMap::new(),
            foreign: AHashMap::new(),
        };
        registry.push_category(ROOT_CATEGORY.to_string(), None);
        registry
    }

    pub fn root(&self) -> CategoryId {
        CategoryId(0)
    }

    /// Register a record category under `parent` (the root when `None`).
    ///
    /// Registering an existing name returns its id unchanged.
    pub fn register_category(&mut self, name: &str, parent: Option<&str>) -> Result<CategoryId> {
        let name = name.trim();
        if let Some(id) = self.lookup.get(&name.to_lowercase()) {
            return Ok(*id);
        }
        let parent_id = match parent.map(str::trim).filter(|p| !p.is_empty()) {
            Some(parent_name) => self
                .category_id(parent_name)
                .ok_or_else(|| AttributionError::UnknownCategory(parent_name.to_string()))?,
            None => self.root(),
        };
        Ok(self.push_category(name.to_string(), Some(parent_id)))
    }

    /// Make a host type known that is not itself a record category
    pub fn register_foreign_type(&mut self, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        for key in lookup_keys(name) {
            self.foreign.entry(key).or_insert_with(|| name.to_string());
        }
    }

    fn push_category(&mut self, name: String, parent: Option<CategoryId>) -> CategoryId {
        let id = CategoryId(self.categories.len() as u32);
        for key in lookup_keys(&name) {
            self.lookup.entry(key).or_insert(id);
        }
        tracing::debug!("Registered record category {} ({:?})", name, id);
        self.categories.push(Category {
            id,
            name,
            parent,
            records: Vec::new(),
            by_name: AHashMap::new(),
        });
        id
    }

    /// Look up a category by full or short name, ignoring case
    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.lookup.get(&name.trim().to_lowercase()).copied()
    }

    /// Resolve a user-typed type name against everything the host knows
    pub fn resolve(&self, name: &str) -> TypeResolution {
        let key = name.trim().to_lowercase();
        if let Some(id) = self.lookup.get(&key) {
            return TypeResolution::Category(*id);
        }
        match self.foreign.get(&key) {
            Some(full) => TypeResolution::Foreign(full.clone()),
            None => TypeResolution::Unknown,
        }
    }

    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(id.0 as usize)
    }

    pub fn category_name(&self, id: CategoryId) -> &str {
        self.category(id).map(|c| c.name.as_str()).unwrap_or("?")
    }

    /// Whether `id` is `ancestor` or sits below it in the hierarchy
    pub fn is_within(&self, id: CategoryId, ancestor: CategoryId) -> bool {
        let mut current = Some(id);
        while let Some(cid) = current {
            if cid == ancestor {
                return true;
            }
            current = self.category(cid).and_then(|c| c.parent);
        }
        false
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Add a live record to its category
    pub fn insert(&mut self, record: Record) -> Result<RecordKey> {
        let category = self
            .categories
            .get_mut(record.category.0 as usize)
            .ok_or_else(|| AttributionError::UnknownCategory(format!("{:?}", record.category)))?;
        if category.by_name.contains_key(&record.name) {
            return Err(AttributionError::DuplicateRecord {
                category: category.name.clone(),
                name: record.name,
            });
        }
        let key = RecordKey::new(category.id, record.name.clone());
        category
            .by_name
            .insert(record.name.clone(), category.records.len());
        category.records.push(record);
        Ok(key)
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        let category = self.category(key.category)?;
        category
            .by_name
            .get(&key.name)
            .map(|&i| &category.records[i])
    }

    pub fn get_mut(&mut self, key: &RecordKey) -> Option<&mut Record> {
        let category = self.categories.get_mut(key.category.0 as usize)?;
        match category.by_name.get(&key.name) {
            Some(&i) => category.records.get_mut(i),
            None => None,
        }
    }

    /// Every live record, category by category in registration order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.categories.iter().flat_map(|c| c.records.iter())
    }

    /// Every live record with mutable access, in the same order as [`records`]
    ///
    /// [`records`]: CategoryRegistry::records
    pub fn records_mut(&mut self) -> impl Iterator<Item = RecordSlot<'_>> {
        self.categories.iter_mut().flat_map(|category| {
            let Category {
                id, name, records, ..
            } = category;
            let id = *id;
            let name: &String = name;
            records.iter_mut().map(move |record| RecordSlot {
                category: id,
                category_name: name.as_str(),
                record,
            })
        })
    }

    pub fn record_count(&self) -> usize {
        self.categories.iter().map(Category::len).sum()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Full name plus the short name after the last `.`, lowercased
fn lookup_keys(name: &str) -> Vec<String> {
    let full = name.to_lowercase();
    let mut keys = vec![full.clone()];
    if let Some((_, short)) = full.rsplit_once('.') {
        if !short.is_empty() {
            keys.push(short.to_string());
        }
    }
    keys
}
