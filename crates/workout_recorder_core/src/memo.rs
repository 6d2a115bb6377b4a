//! crates/workout_recorder_core/src/memo.rs
//!
//! One free-text memo per calendar date, kept in local storage next to the
//! drafts. Like drafts, storage failures are logged and swallowed.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::warn;

use crate::ports::KeyValueStore;

#[derive(Clone)]
pub struct MemoStore {
    store: Arc<dyn KeyValueStore>,
}

impl MemoStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key_for(date: NaiveDate) -> String {
        format!("memo:{}", date.format("%Y-%m-%d"))
    }

    pub fn get(&self, date: NaiveDate) -> Option<String> {
        match self.store.get_item(&Self::key_for(date)) {
            Ok(memo) => memo.filter(|m| !m.trim().is_empty()),
            Err(e) => {
                warn!("Failed to read memo for {}: {}", date, e);
                None
            }
        }
    }

    pub fn has_memo(&self, date: NaiveDate) -> bool {
        self.get(date).is_some()
    }

    /// Stores the trimmed text; blank text removes the memo.
    pub fn save(&self, date: NaiveDate, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            self.delete(date);
            return;
        }
        if let Err(e) = self.store.set_item(&Self::key_for(date), text) {
            warn!("Failed to save memo for {}: {}", date, e);
        }
    }

    pub fn delete(&self, date: NaiveDate) {
        if let Err(e) = self.store.remove_item(&Self::key_for(date)) {
            warn!("Failed to delete memo for {}: {}", date, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;

    #[test]
    fn save_trims_and_blank_deletes() {
        let store = Arc::new(MemoryStore::new());
        let memos = MemoStore::new(store.clone());
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

        memos.save(date, "  felt strong today \n");
        assert_eq!(memos.get(date).as_deref(), Some("felt strong today"));
        assert!(memos.has_memo(date));

        memos.save(date, "   ");
        assert!(!memos.has_memo(date));
        assert!(store.keys().unwrap().is_empty());
    }
}
