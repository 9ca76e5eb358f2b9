//! State persistence for the FireTeam CLI
//!
//! A [`KeyValueStore`] backed by one JSON object on disk. The runtime keeps the
//! identity record under its own key in here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use fireteam_core::{FireteamError, FireteamResult};
use fireteam_runtime::{KeyValueIdentityStore, KeyValueStore};

/// File name of the state file inside the data directory
pub const STATE_FILE_NAME: &str = "fireteam.json";

/// JSON-file key-value store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/fireteam.json`
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::new(data_dir.as_ref().join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> FireteamResult<BTreeMap<String, String>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(FireteamError::persistence(format!(
                    "Failed to read state file: {}",
                    e
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| FireteamError::persistence(format!("Failed to parse state file: {}", e)))
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> FireteamResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                FireteamError::persistence(format!("Failed to create data directory: {}", e))
            })?;
        }

        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| FireteamError::persistence(format!("Failed to serialize state: {}", e)))?;

        // Staged write, then rename over the old file
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, raw)
            .await
            .map_err(|e| FireteamError::persistence(format!("Failed to write state file: {}", e)))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| FireteamError::persistence(format!("Failed to replace state file: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> FireteamResult<Option<String>> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> FireteamResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries).await?;
        debug!(path = %self.path.display(), key, "state file updated");
        Ok(())
    }
}

/// Identity store persisting to `<data_dir>/fireteam.json`
pub fn identity_store<P: AsRef<Path>>(data_dir: P) -> KeyValueIdentityStore<JsonFileStore> {
    KeyValueIdentityStore::new(JsonFileStore::in_dir(data_dir))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use fireteam_core::IDENTITY_STORAGE_KEY;
    use fireteam_runtime::IdentityStore;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fireteam-state-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let store = JsonFileStore::in_dir(scratch_dir("missing"));
        assert_eq!(store.get("anything").await, Ok(None));
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_keeps_other_keys() {
        let dir = scratch_dir("keys").join("nested");
        let store = JsonFileStore::in_dir(&dir);

        store.set("first", "1").await.expect("Failed to set first");
        store.set("second", "2").await.expect("Failed to set second");
        store.set("first", "one").await.expect("Failed to overwrite");

        let reopened = JsonFileStore::in_dir(&dir);
        assert_eq!(reopened.get("first").await, Ok(Some("one".to_string())));
        assert_eq!(reopened.get("second").await, Ok(Some("2".to_string())));
        assert!(!dir.join("fireteam.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_persistence_error() {
        let dir = scratch_dir("corrupt");
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(dir.join(STATE_FILE_NAME), "{not json").expect("write");

        let store = JsonFileStore::in_dir(&dir);
        assert!(matches!(
            store.get(IDENTITY_STORAGE_KEY).await,
            Err(FireteamError::Persistence { .. })
        ));
    }

    #[tokio::test]
    async fn test_identity_round_trip_through_file() {
        let dir = scratch_dir("identity");
        let store = identity_store(&dir);
        store
            .save_identity("  Alice   Bravo ")
            .await
            .expect("Failed to save identity");

        let raw = std::fs::read_to_string(dir.join(STATE_FILE_NAME)).expect("read");
        assert!(raw.contains(IDENTITY_STORAGE_KEY));
        assert_eq!(
            identity_store(&dir).load_identity().await,
            Ok(Some("Alice Bravo".to_string()))
        );
    }
}
