//! Recovering which package contributed each record
//!
//! Directly loaded records know their package. Records synthesized by patches
//! do not, so their owner is reconstructed from the patch forests: the walker
//! finds every operation that injects literal content and the resolver reads
//! record names out of that content.

pub mod resolver;
pub mod walker;

pub use resolver::{
    AttributionMap, AttributionResolver, ResolveStats, MAX_SCAN_DEPTH, RECORD_NAME_MARKER,
};
pub use walker::{LiteralFragment, PatchWalker};
