//! JSON file session store.
//!
//! Persists the session collection as one JSON document under a fixed key
//! in the client's data directory — the file-system rendition of a
//! key-value text store. Saves replace the whole snapshot (write to a
//! temp sibling, then rename), so a crash mid-save never leaves a
//! truncated document behind.

use async_trait::async_trait;
use palaver_application::ports::session_store::{SessionStore, StoreError};
use palaver_domain::{Session, SessionCollection};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Fixed key under which the serialized collection lives.
const SESSIONS_KEY: &str = "chats";

/// Session store backed by a single JSON file.
pub struct JsonFileSessionStore {
    path: PathBuf,
}

impl JsonFileSessionStore {
    /// Store rooted at `dir` (e.g. `~/.local/share/palaver`).
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSIONS_KEY}.json")),
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode a snapshot, dropping corrupt entries instead of failing.
    fn decode(text: &str) -> SessionCollection {
        let entries: Vec<serde_json::Value> = match serde_json::from_str(text) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Session snapshot is not a JSON array, starting empty: {e}");
                return SessionCollection::new();
            }
        };

        let mut collection = SessionCollection::new();
        for entry in entries {
            match serde_json::from_value::<Session>(entry) {
                Ok(session) => collection.push(session),
                Err(e) => warn!("Dropping corrupt session entry: {e}"),
            }
        }
        collection
    }
}

#[async_trait]
impl SessionStore for JsonFileSessionStore {
    async fn load(&self) -> SessionCollection {
        match fs::read_to_string(&self.path).await {
            Ok(text) => {
                let collection = Self::decode(&text);
                debug!(
                    "Loaded {} session(s) from {}",
                    collection.len(),
                    self.path.display()
                );
                collection
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SessionCollection::new(),
            Err(e) => {
                warn!("Could not read {}: {e}", self.path.display());
                SessionCollection::new()
            }
        }
    }

    async fn save(&self, collection: &SessionCollection) -> Result<(), StoreError> {
        let json = serde_json::to_string(collection)?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Whole-snapshot replace: the rename is what makes the new state
        // visible, never a partially written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;

        debug!(
            "Saved {} session(s) to {}",
            collection.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_domain::{Message, MessageId, SessionId};

    fn collection_with_messages() -> SessionCollection {
        let mut collection = SessionCollection::new();
        let mut session = Session::new(SessionId::new("a"), "Chat 1");
        session.append(Message::user(MessageId(0), "Hello"));
        session.append(Message::assistant(MessageId(1), "Hi there!"));
        collection.push(session);
        collection.push(Session::new(SessionId::new("b"), "Chat 2"));
        collection
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());

        store.save(&collection_with_messages()).await.unwrap();
        let restored = store.load().await;

        assert_eq!(restored.len(), 2);
        let first = restored.first().unwrap();
        assert_eq!(first.name(), "Chat 1");
        assert_eq!(first.messages().len(), 2);
        assert_eq!(first.messages()[1].content, "Hi there!");

        // Saving what we loaded reproduces the same snapshot.
        store.save(&restored).await.unwrap();
        let again = store.load().await;
        assert_eq!(
            serde_json::to_value(&again).unwrap(),
            serde_json::to_value(&restored).unwrap()
        );
    }

    #[tokio::test]
    async fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn unparseable_snapshot_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        std::fs::write(store.path(), "not json at all {{{").unwrap();

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_entries_are_dropped_but_valid_ones_survive() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        std::fs::write(
            store.path(),
            r#"[
                {"id": "good", "name": "Chat 1", "messages": []},
                {"name": "missing id"},
                42,
                {"id": "also-good", "name": "Chat 2",
                 "messages": [{"id": 0, "role": "user", "content": "hi"}]}
            ]"#,
        )
        .unwrap();

        let collection = store.load().await;
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.first().unwrap().name(), "Chat 1");
        assert!(collection.get(&SessionId::new("also-good")).is_some());
    }

    #[tokio::test]
    async fn save_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path().join("nested").join("deeper"));

        store.save(&collection_with_messages()).await.unwrap();
        assert_eq!(store.load().await.len(), 2);
    }

    #[tokio::test]
    async fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        store.save(&collection_with_messages()).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["chats.json"]);
    }

    #[tokio::test]
    async fn snapshot_file_is_keyed_by_fixed_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSessionStore::new(dir.path());
        assert_eq!(store.path().file_name().unwrap(), "chats.json");
    }
}
