//! Description rewriting: settings, exclusion, footer template and the pass
//! that applies them to every record

pub mod annotation;
pub mod exclusion;
pub mod format;
pub mod ledger;
pub mod rewriter;
pub mod settings;
pub mod template;

pub use annotation::{SecondaryAnnotator, TableAnnotator, ANNOTATION_MARKER};
pub use exclusion::{Exclusion, ExclusionFilter};
pub use format::{CompositeFormat, FormatError};
pub use ledger::FooterLedger;
pub use rewriter::{DescriptionRewriter, RunSummary};
pub use settings::Settings;
pub use template::{DescriptionTemplate, FALLBACK_FORMAT, SENTINEL_PACKAGE_NAME};
