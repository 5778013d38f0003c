//! Local reading history.
//!
//! One JSON array under a single key, most recently read comic first, one
//! entry per comic. Reads never fail: a missing, unreadable or corrupt list
//! is an empty history.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;
use crate::store::KeyValueStore;

pub const HISTORY_KEY: &str = "reading_history";
pub const DEFAULT_MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub comic_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    pub chapter_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_title: Option<String>,
    /// Unix milliseconds.
    pub read_at: i64,
}

/// Handle over the history list stored under `key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingHistory {
    key: String,
    max_entries: usize,
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new(HISTORY_KEY, DEFAULT_MAX_ENTRIES)
    }
}

impl ReadingHistory {
    /// `max_entries` of 0 is bumped to 1.
    pub fn new(key: impl Into<String>, max_entries: usize) -> Self {
        Self {
            key: key.into(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn load<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<HistoryEntry>, PolicyError> {
        match store.get(&self.key)? {
            None => Ok(Vec::new()),
            Some(text) => {
                serde_json::from_str(&text).map_err(|e| PolicyError::malformed(&self.key, e))
            }
        }
    }

    fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        entries: &[HistoryEntry],
    ) -> Result<(), PolicyError> {
        let text = serde_json::to_string(entries).map_err(|e| PolicyError::malformed(&self.key, e))?;
        store.set(&self.key, &text)?;
        Ok(())
    }

    /// Like `load`, but a corrupt list counts as empty so the next write
    /// replaces it. Store failures still propagate.
    fn load_for_update<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<Vec<HistoryEntry>, PolicyError> {
        match self.load(store) {
            Err(PolicyError::Malformed { reason, .. }) => {
                log::warn!("reading history: discarding corrupt list ({reason})");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// All entries, most recent first.
    pub fn entries<S: KeyValueStore + ?Sized>(&self, store: &S) -> Vec<HistoryEntry> {
        self.load(store).unwrap_or_else(|err| {
            log::warn!("reading history: {err}; treating as empty");
            Vec::new()
        })
    }

    /// Upsert `entry` at the front, dropping the oldest beyond the cap.
    /// A corrupt stored list is overwritten.
    pub fn record<S: KeyValueStore + ?Sized>(
        &self,
        store: &S,
        entry: HistoryEntry,
    ) -> Result<(), PolicyError> {
        let mut entries = self.load_for_update(store)?;
        entries.retain(|e| e.comic_id != entry.comic_id);
        log::debug!(
            "reading history: {} chapter {} at {}",
            entry.comic_id,
            entry.chapter_id,
            entry.read_at
        );
        entries.insert(0, entry);
        entries.truncate(self.max_entries);
        self.save(store, &entries)
    }

    /// Last read entry of one comic ("continue reading").
    pub fn last_read<S: KeyValueStore + ?Sized>(&self, store: &S, comic_id: &str) -> Option<HistoryEntry> {
        self.entries(store).into_iter().find(|e| e.comic_id == comic_id)
    }

    /// Returns whether an entry was removed.
    pub fn remove<S: KeyValueStore + ?Sized>(&self, store: &S, comic_id: &str) -> Result<bool, PolicyError> {
        let mut entries = self.load_for_update(store)?;
        let before = entries.len();
        entries.retain(|e| e.comic_id != comic_id);
        if entries.len() == before {
            return Ok(false);
        }
        self.save(store, &entries)?;
        Ok(true)
    }

    pub fn clear<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), PolicyError> {
        store.remove(&self.key)?;
        Ok(())
    }
}
