//! Profile and reading-history persistence seam.
//!
//! The session reads a snapshot once, when a reading begins, and appends
//! one entry when a reading completes. A slow or broken store never holds
//! up a reading; it just makes the reading anonymous.

mod json;
mod memory;

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use arcanum_core::{PersonalizationSnapshot, ReadingLog, UserProfile};

use crate::error::{StoreError, StoreResult};

pub use json::JsonFileStore;
pub use memory::MemoryStore;

/// Key-value storage for user profiles and their reading history.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile, or `None` if the user has none.
    async fn load_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>>;

    /// Create or replace a profile.
    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    /// Record a completed reading.
    async fn append_history(&self, user_id: &str, log: &ReadingLog) -> StoreResult<()>;

    /// Up to `limit` past readings, newest first.
    async fn load_history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<ReadingLog>>;
}

/// Load the personalization snapshot for `user_id`, bounded by `timeout`.
///
/// Anonymous sessions, store errors, and timeouts all yield an empty
/// snapshot. A failure in one half (profile or history) keeps the other.
pub async fn load_snapshot<S: ProfileStore + ?Sized>(
    store: &S,
    user_id: Option<&str>,
    history_limit: usize,
    timeout: Duration,
) -> PersonalizationSnapshot {
    let Some(user_id) = user_id else {
        return PersonalizationSnapshot::anonymous();
    };

    let profile = match bounded(timeout, store.load_profile(user_id)).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(user_id, error = %e, "profile unavailable, reading without it");
            None
        }
    };

    let history = if history_limit == 0 {
        Vec::new()
    } else {
        match bounded(timeout, store.load_history(user_id, history_limit)).await {
            Ok(history) => history,
            Err(e) => {
                warn!(user_id, error = %e, "history unavailable, reading without it");
                Vec::new()
            }
        }
    };

    PersonalizationSnapshot { profile, history }
}

/// Run a store call with an upper time bound.
pub async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = StoreResult<T>>,
) -> StoreResult<T> {
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(StoreError::Timeout))
}
