use chrono::Local;
use serde::{Deserialize, Serialize};

/// Timestamp layout for history entries, e.g. `17-10-2026 14:03:59`
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// One completed extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    timestamp: String,
    text: String,
}

impl HistoryEntry {
    /// Create an entry stamped with the current local time
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
            text: text.into(),
        }
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only log of extraction results, oldest first
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        tracing::info!("Clearing {} history entries", self.entries.len());
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
