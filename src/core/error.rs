use thiserror::Error;

use crate::core::types::{PackageId, RecordName};

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Settings snapshot unavailable: {0}")]
    SettingsUnavailable(String),

    #[error("A rewrite pass is already in flight")]
    PassInFlight,

    #[error("Malformed patch in package {package}: {reason}")]
    MalformedPatch { package: PackageId, reason: String },

    #[error("Invalid format string: {0}")]
    InvalidFormat(String),

    #[error("Annotation failed for {record}: {reason}")]
    Annotation { record: RecordName, reason: String },

    #[error("Unknown record category: {0}")]
    UnknownCategory(String),

    #[error("Duplicate record {name} in category {category}")]
    DuplicateRecord { category: String, name: RecordName },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AttributionError>;
