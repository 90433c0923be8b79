//! Definition records - the named, typed entries whose descriptions get a footer

use serde::{Deserialize, Serialize};

use crate::core::types::{CategoryId, PackageId, RecordName};

/// A live definition record owned by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique name within the category
    pub name: RecordName,
    /// Category the record belongs to
    pub category: CategoryId,
    /// Descriptive text; the only field the rewriter mutates
    pub description: Option<String>,
    /// Package that loaded the record directly.
    ///
    /// `None` is the normal state for records synthesized by a patch; their
    /// owner has to be recovered from the attribution map.
    pub source: Option<PackageId>,
}

impl Record {
    /// A record loaded directly from a package
    pub fn loaded(
        category: CategoryId,
        name: impl Into<RecordName>,
        description: Option<String>,
        source: PackageId,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description,
            source: Some(source),
        }
    }

    /// A record that exists only because some patch injected it
    pub fn synthesized(
        category: CategoryId,
        name: impl Into<RecordName>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            description,
            source: None,
        }
    }

    pub fn is_synthesized(&self) -> bool {
        self.source.is_none()
    }
}
