//! Memory of what each pass wrote, so later passes can start from clean text

use ahash::AHashMap;

use crate::core::types::RecordKey;

#[derive(Debug, Clone, PartialEq, Eq)]
struct LedgerEntry {
    /// Description as it was before any footer was appended
    base: String,
    /// Description as the last pass left it
    written: String,
}

/// Per-record record of pre-footer text and last written text
#[derive(Debug, Clone, Default)]
pub struct FooterLedger {
    entries: AHashMap<RecordKey, LedgerEntry>,
}

impl FooterLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pre-footer text for `key`, provided the record still holds exactly
    /// what the last pass wrote. Someone else edited it otherwise, and the
    /// stored base no longer applies.
    pub fn base_for(&self, key: &RecordKey, current: &str) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| entry.written == current)
            .map(|entry| entry.base.as_str())
    }

    pub fn remember(&mut self, key: RecordKey, base: String, written: String) {
        self.entries.insert(key, LedgerEntry { base, written });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
