//! In-memory store, for tests and throwaway sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use arcanum_core::{ReadingLog, UserProfile};

use super::ProfileStore;
use crate::error::StoreResult;

#[derive(Debug, Default)]
struct Inner {
    profiles: HashMap<String, UserProfile>,
    history: HashMap<String, Vec<ReadingLog>>,
}

/// A [`ProfileStore`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Number of readings recorded for `user_id`.
    pub fn history_len(&self, user_id: &str) -> usize {
        self.with(|inner| inner.history.get(user_id).map_or(0, Vec::len))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn load_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        Ok(self.with(|inner| inner.profiles.get(user_id).cloned()))
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        self.with(|inner| {
            inner.profiles.insert(profile.id.clone(), profile.clone());
        });
        Ok(())
    }

    async fn append_history(&self, user_id: &str, log: &ReadingLog) -> StoreResult<()> {
        self.with(|inner| {
            inner
                .history
                .entry(user_id.to_string())
                .or_default()
                .insert(0, log.clone());
        });
        Ok(())
    }

    async fn load_history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<ReadingLog>> {
        Ok(self.with(|inner| {
            inner
                .history
                .get(user_id)
                .map(|logs| logs.iter().take(limit).cloned().collect())
                .unwrap_or_default()
        }))
    }
}
