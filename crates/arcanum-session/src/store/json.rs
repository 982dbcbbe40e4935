//! Store backed by one JSON document per user and collection.
//!
//! Layout under the root directory:
//!
//! ```text
//! users/<user-id>.json      UserProfile
//! history/<user-id>.json    [ReadingLog], newest first
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tracing::debug;

use arcanum_core::{ReadingLog, UserProfile};

use super::ProfileStore;
use crate::error::{StoreError, StoreResult};

const USERS_DIR: &str = "users";
const HISTORY_DIR: &str = "history";

/// A [`ProfileStore`] persisting to JSON files in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Use `root` as the data directory. It is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, collection: &str, user_id: &str) -> StoreResult<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.root.join(collection).join(format!("{user_id}.json")))
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Option<T>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "store document written");
        Ok(())
    }
}

fn validate_user_id(user_id: &str) -> StoreResult<()> {
    let ok = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !user_id.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user_id.to_string()))
    }
}

#[async_trait]
impl ProfileStore for JsonFileStore {
    async fn load_profile(&self, user_id: &str) -> StoreResult<Option<UserProfile>> {
        let path = self.path(USERS_DIR, user_id)?;
        self.read(&path).await
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let path = self.path(USERS_DIR, &profile.id)?;
        self.write(&path, profile).await
    }

    async fn append_history(&self, user_id: &str, log: &ReadingLog) -> StoreResult<()> {
        let path = self.path(HISTORY_DIR, user_id)?;
        let mut history: Vec<ReadingLog> = self.read(&path).await?.unwrap_or_default();
        history.insert(0, log.clone());
        self.write(&path, &history).await
    }

    async fn load_history(&self, user_id: &str, limit: usize) -> StoreResult<Vec<ReadingLog>> {
        let path = self.path(HISTORY_DIR, user_id)?;
        let mut history: Vec<ReadingLog> = self.read(&path).await?.unwrap_or_default();
        history.truncate(limit);
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use arcanum_core::{SpreadKind, deck, shuffle_deck};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn log(question: &str) -> ReadingLog {
        let mut rng = StdRng::seed_from_u64(3);
        let cards = shuffle_deck(deck(), 0.2, &mut rng);
        ReadingLog::new(
            question,
            SpreadKind::ThreeCard.definition(),
            &cards[..3],
            "a summary",
        )
    }

    #[tokio::test]
    async fn missing_documents_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_profile("nobody").await.unwrap().is_none());
        assert!(store.load_history("nobody", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let mut profile = UserProfile::new("ana", "Ana");
        profile.age = Some(31);
        JsonFileStore::new(dir.path())
            .save_profile(&profile)
            .await
            .unwrap();

        assert!(dir.path().join("users").join("ana.json").exists());
        let loaded = JsonFileStore::new(dir.path())
            .load_profile("ana")
            .await
            .unwrap();
        assert_eq!(loaded, Some(profile));
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        for q in ["one", "two", "three"] {
            store.append_history("ana", &log(q)).await.unwrap();
        }
        let history = store.load_history("ana", 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "three");
        assert_eq!(history[1].question, "two");
        assert_eq!(history[0].cards.len(), 3);
        assert_eq!(history[0].cards[0].position, "Past");
    }

    #[tokio::test]
    async fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("users")).unwrap();
        std::fs::write(dir.path().join("users").join("ana.json"), "{ not json").unwrap();
        let err = JsonFileStore::new(dir.path())
            .load_profile("ana")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[tokio::test]
    async fn path_like_user_ids_are_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        for id in ["", "../etc", "a/b", ".hidden"] {
            let err = store.load_profile(id).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidUserId(_)), "{id:?}");
        }
    }
}
