//! Host content model: packages, records, patches and the category registry
//!
//! This is the crate's view of the host engine. Packages and patches are
//! read-only; record descriptions are the only thing the rewriter changes.

pub mod catalog;
pub mod loader;
pub mod package;
pub mod patch;
pub mod record;
pub mod registry;

pub use catalog::ContentCatalog;
pub use loader::{ContentLoader, DeclaredAnnotation};
pub use package::{Package, PackageList};
pub use patch::{ContentNode, PatchOperation};
pub use record::Record;
pub use registry::{Category, CategoryRegistry, RecordSlot, TypeResolution, ROOT_CATEGORY};
