//! Def Attribution - names the contributing package under every record description

pub mod attribution;
pub mod content;
pub mod core;
pub mod rewrite;

pub use crate::attribution::{AttributionMap, AttributionResolver, PatchWalker};
pub use crate::content::{ContentCatalog, ContentLoader, ContentNode, Package, PatchOperation, Record};
pub use crate::core::error::{AttributionError, Result};
pub use crate::rewrite::{DescriptionRewriter, DescriptionTemplate, RunSummary, Settings};
