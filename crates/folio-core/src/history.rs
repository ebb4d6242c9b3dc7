//! Linear undo/redo over whole-document snapshots, with best-effort
//! persistence.
//!
//! `stack[cursor]` is always the document currently on screen: callers
//! apply a mutation first and push the result afterwards. Undo and redo
//! only move the cursor and hand back the snapshot to load.

use crate::document::Document;
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default maximum number of snapshots kept.
pub const MAX_HISTORY_DEPTH: usize = 50;

/// Storage key prefix for persisted history.
pub const HISTORY_KEY_PREFIX: &str = "history-";

/// Storage key holding the history of `document_id`.
pub fn history_key(document_id: &str) -> String {
    format!("{HISTORY_KEY_PREFIX}{document_id}")
}

/// On-disk shape of a saved history.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedHistory {
    cursor: usize,
    stack: Vec<Document>,
}

/// Snapshot undo/redo stack.
pub struct HistoryManager {
    stack: Vec<Document>,
    cursor: usize,
    max_depth: usize,
    storage: Option<Arc<dyn Storage>>,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    /// In-memory history with the default depth.
    pub fn new() -> Self {
        Self::with_depth(MAX_HISTORY_DEPTH)
    }

    /// In-memory history keeping at most `max_depth` snapshots (minimum 1).
    pub fn with_depth(max_depth: usize) -> Self {
        Self { stack: Vec::new(), cursor: 0, max_depth: max_depth.max(1), storage: None }
    }

    /// Persist through `storage` on [`save_to_storage`](Self::save_to_storage).
    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Reset to a single snapshot of `document`.
    pub fn initialize(&mut self, document: &Document) {
        self.stack = vec![document.clone()];
        self.cursor = 0;
    }

    /// Record `document` as the new present. Any redo entries are dropped and
    /// the oldest snapshots are evicted beyond the depth limit.
    pub fn push(&mut self, document: &Document) {
        if !self.stack.is_empty() {
            self.stack.truncate(self.cursor + 1);
        }
        self.stack.push(document.clone());
        while self.stack.len() > self.max_depth {
            self.stack.remove(0);
        }
        self.cursor = self.stack.len() - 1;
        log::debug!("History push: {} entries, cursor {}", self.stack.len(), self.cursor);
    }

    /// Step back one snapshot and return it.
    pub fn undo(&mut self) -> Option<&Document> {
        if self.cursor == 0 || self.stack.is_empty() {
            return None;
        }
        self.cursor -= 1;
        self.stack.get(self.cursor)
    }

    /// Step forward one snapshot and return it.
    pub fn redo(&mut self) -> Option<&Document> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.stack.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0 && !self.stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    /// Snapshot at the cursor.
    pub fn current(&self) -> Option<&Document> {
        self.stack.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
        self.cursor = 0;
    }

    /// Write the whole stack under the document's key, replacing any earlier
    /// save. Failures are logged and otherwise ignored.
    pub fn save_to_storage(&self, document_id: &str) {
        let Some(storage) = &self.storage else {
            return;
        };
        let persisted = PersistedHistory { cursor: self.cursor, stack: self.stack.clone() };
        let json = match serde_json::to_string(&persisted) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize history for {document_id}: {e}");
                return;
            }
        };
        if let Err(e) = storage.save(&history_key(document_id), &json) {
            log::warn!("Failed to save history for {document_id}: {e}");
        }
    }

    /// Replace the in-memory history with the saved one for `document_id`.
    ///
    /// Returns `false` (and keeps the current history) when nothing usable
    /// was saved: missing key, unreadable storage, corrupt JSON or an
    /// out-of-range cursor.
    pub fn load_from_storage(&mut self, document_id: &str) -> bool {
        let Some(storage) = &self.storage else {
            return false;
        };
        let json = match storage.load(&history_key(document_id)) {
            Ok(json) => json,
            Err(crate::storage::StorageError::NotFound(_)) => return false,
            Err(e) => {
                log::warn!("Failed to load history for {document_id}: {e}");
                return false;
            }
        };
        let persisted: PersistedHistory = match serde_json::from_str(&json) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("Discarding corrupt history for {document_id}: {e}");
                return false;
            }
        };
        if persisted.stack.is_empty() || persisted.cursor >= persisted.stack.len() {
            log::warn!("Discarding inconsistent history for {document_id}");
            return false;
        }

        let mut stack = persisted.stack;
        let mut cursor = persisted.cursor;
        if stack.len() > self.max_depth {
            let excess = stack.len() - self.max_depth;
            stack.drain(..excess);
            cursor = cursor.saturating_sub(excess);
        }
        self.stack = stack;
        self.cursor = cursor;
        log::info!("Restored history for {document_id}: {} entries", self.stack.len());
        true
    }

    /// Delete the saved history for `document_id`.
    pub fn clear_storage(&self, document_id: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.delete(&history_key(document_id)) {
                log::warn!("Failed to clear history for {document_id}: {e}");
            }
        }
    }
}
