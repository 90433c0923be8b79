//! Core identity types shared by the content model and the rewrite engine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution-channel postfixes the host appends to duplicate installs.
const CHANNEL_POSTFIXES: [&str; 2] = ["_steam", "_copy"];

/// Unique identifier of a content package, as declared by its author
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(pub String);

impl PackageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased, trimmed id with any distribution postfix removed.
    ///
    /// A locally installed copy (`author.pack_copy`) and a store copy
    /// (`author.pack_steam`) normalize to the same value as `Author.Pack`.
    pub fn normalized(&self) -> String {
        normalize_package_id(&self.0)
    }

    /// Compare against a raw user-typed id, ignoring case and channel postfixes
    pub fn same_package(&self, other: &str) -> bool {
        self.normalized() == normalize_package_id(other)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

pub fn normalize_package_id(raw: &str) -> String {
    let mut id = raw.trim().to_lowercase();
    for postfix in CHANNEL_POSTFIXES {
        if let Some(stripped) = id.strip_suffix(postfix) {
            id = stripped.to_string();
            break;
        }
    }
    id
}

/// Name of a record, unique within its category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordName(pub String);

impl RecordName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Registry-assigned handle of a record category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

/// Identifies one live record across all categories
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub category: CategoryId,
    pub name: RecordName,
}

impl RecordKey {
    pub fn new(category: CategoryId, name: impl Into<RecordName>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

impl From<String> for RecordName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_postfixes_are_equivalent() {
        let id = PackageId::new("Author.WeaponPack");
        assert!(id.same_package("author.weaponpack_steam"));
        assert!(id.same_package("  AUTHOR.WEAPONPACK_copy "));
        assert!(!id.same_package("author.weaponpack2"));
    }

    #[test]
    fn test_only_one_postfix_stripped() {
        assert_eq!(normalize_package_id("a.b_copy_steam"), "a.b_copy");
    }
}
