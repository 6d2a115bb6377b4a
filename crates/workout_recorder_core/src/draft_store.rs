//! crates/workout_recorder_core/src/draft_store.rs
//!
//! Durable staging area for in-progress sessions, one draft per calendar date.
//!
//! Drafts bridge short interruptions (a reload, an accidental navigation) for
//! the current workout. Anything dated before yesterday is treated as abandoned
//! and evicted. Storage failures never reach the caller: reads fall back to an
//! empty draft and writes are dropped with a warning, so recording keeps working
//! even when persistence does not.

use chrono::{Duration, NaiveDate};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::WorkoutDraft;
use crate::ports::KeyValueStore;

const KEY_PREFIX: &str = "draft:";

#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn key_for(date: NaiveDate) -> String {
        format!("{}{}", KEY_PREFIX, date.format("%Y-%m-%d"))
    }

    /// Returns the stored draft for `date`, or a fresh empty one.
    pub fn load(&self, date: NaiveDate) -> WorkoutDraft {
        let key = Self::key_for(date);
        let raw = match self.store.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return WorkoutDraft::empty(date),
            Err(e) => {
                warn!("Failed to read draft {}: {}", key, e);
                return WorkoutDraft::empty(date);
            }
        };

        match serde_json::from_str::<WorkoutDraft>(&raw) {
            Ok(draft) if draft.date == date => draft,
            Ok(draft) => {
                warn!(
                    "Draft under {} is dated {}; starting a fresh draft.",
                    key, draft.date
                );
                WorkoutDraft::empty(date)
            }
            Err(e) => {
                warn!("Discarding undecodable draft {}: {}", key, e);
                WorkoutDraft::empty(date)
            }
        }
    }

    /// Writes the full draft under its own date.
    pub fn save(&self, draft: &WorkoutDraft) {
        let key = Self::key_for(draft.date);
        let json = match serde_json::to_string(draft) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize draft {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = self.store.set_item(&key, &json) {
            warn!("Failed to write draft {}: {}", key, e);
        }
    }

    pub fn purge(&self, date: NaiveDate) {
        let key = Self::key_for(date);
        if let Err(e) = self.store.remove_item(&key) {
            warn!("Failed to purge draft {}: {}", key, e);
        }
    }

    /// Deletes every draft dated more than one calendar day before `today`.
    /// Returns the dates that were evicted.
    pub fn evict_stale(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list drafts for eviction: {}", e);
                return Vec::new();
            }
        };
        let cutoff = today - Duration::days(1);

        let mut evicted = Vec::new();
        for key in keys {
            let Some(date_str) = key.strip_prefix(KEY_PREFIX) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
                debug!("Skipping draft key with unparseable date: {}", key);
                continue;
            };
            if date < cutoff {
                match self.store.remove_item(&key) {
                    Ok(()) => evicted.push(date),
                    Err(e) => warn!("Failed to evict stale draft {}: {}", key, e),
                }
            }
        }
        if !evicted.is_empty() {
            debug!("Evicted {} stale draft(s).", evicted.len());
        }
        evicted
    }
}
