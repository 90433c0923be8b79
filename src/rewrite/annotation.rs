//! Secondary annotation blocks appended after the footer
//!
//! An annotator is an external collaborator (e.g. a compatibility layer that
//! explains a numeric stat) that may contribute an extra block of text for a
//! record. Each block is fenced by [`ANNOTATION_MARKER`] so that a later pass
//! can find and remove it before appending a fresh one.

use ahash::AHashMap;

use crate::content::record::Record;
use crate::core::error::{AttributionError, Result};
use crate::core::types::RecordName;

/// Invisible fence around an annotation block: zero-width space followed by
/// an invisible separator. Neither renders in the host's text widgets.
pub const ANNOTATION_MARKER: &str = "\u{200B}\u{2063}";

/// Supplies the optional extra block for a record
pub trait SecondaryAnnotator: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Whether this annotator has anything to say about `record`
    fn applies_to(&self, record: &Record, category_name: &str) -> bool;

    /// Text of the block; called only when [`applies_to`] returned true
    ///
    /// [`applies_to`]: SecondaryAnnotator::applies_to
    fn annotate(&self, record: &Record, category_name: &str) -> Result<String>;
}

/// Wrap annotation text into a fenced block ready to append
pub fn annotation_block(text: &str) -> String {
    format!("\n\n{}{}{}", ANNOTATION_MARKER, text.trim(), ANNOTATION_MARKER)
}

/// Remove a trailing annotation block, if the text ends with one.
///
/// Text that ends with a lone marker is returned unchanged.
pub fn strip_annotation(text: &str) -> &str {
    let trimmed = text.trim_end();
    let Some(body) = trimmed.strip_suffix(ANNOTATION_MARKER) else {
        return text;
    };
    match body.rfind(ANNOTATION_MARKER) {
        Some(start) => body[..start].trim_end(),
        None => text,
    }
}

/// Annotator backed by a fixed table of (category, record name) -> text
#[derive(Debug, Clone, Default)]
pub struct TableAnnotator {
    /// Keyed by lowercased category name; record names are only unique per category
    entries: AHashMap<(String, RecordName), String>,
}

impl TableAnnotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: &str, record: impl Into<RecordName>, text: impl Into<String>) {
        self.entries
            .insert((category_key(category), record.into()), text.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, record: &Record, category_name: &str) -> Option<&String> {
        self.entries
            .get(&(category_key(category_name), record.name.clone()))
    }
}

fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

impl SecondaryAnnotator for TableAnnotator {
    fn name(&self) -> &str {
        "table"
    }

    fn applies_to(&self, record: &Record, category_name: &str) -> bool {
        self.lookup(record, category_name).is_some()
    }

    fn annotate(&self, record: &Record, category_name: &str) -> Result<String> {
        self.lookup(record, category_name)
            .cloned()
            .ok_or_else(|| AttributionError::Annotation {
                record: record.name.clone(),
                reason: format!("no table entry in category {}", category_name),
            })
    }
}
