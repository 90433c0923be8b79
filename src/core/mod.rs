pub mod error;
pub mod types;

pub use error::{AttributionError, Result};
pub use types::{CategoryId, PackageId, RecordKey, RecordName};
