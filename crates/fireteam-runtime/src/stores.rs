//! Identity storage adapters
//!
//! [`KeyValueIdentityStore`] keeps the identity as a JSON record under the
//! fixed storage key of any [`KeyValueStore`]. [`MemoryKeyValueStore`] backs
//! tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fireteam_core::{FireteamError, FireteamResult, IdentityRecord, IDENTITY_STORAGE_KEY};
use tokio::sync::RwLock;
use tracing::debug;

use crate::collaborators::{IdentityStore, KeyValueStore};

// ----------------------------------------------------------------------------
// Key-Value Identity Store
// ----------------------------------------------------------------------------

/// [`IdentityStore`] on top of a string key-value store
#[derive(Debug, Clone)]
pub struct KeyValueIdentityStore<S> {
    store: S,
}

impl<S: KeyValueStore> KeyValueIdentityStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: KeyValueStore> IdentityStore for KeyValueIdentityStore<S> {
    async fn load_identity(&self) -> FireteamResult<Option<String>> {
        let raw = match self.store.get(IDENTITY_STORAGE_KEY).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let record = IdentityRecord::from_json(&raw)?;
        Ok(Some(record.name).filter(|name| !name.is_empty()))
    }

    async fn save_identity(&self, name: &str) -> FireteamResult<()> {
        let raw = IdentityRecord::new(name).to_json()?;
        self.store.set(IDENTITY_STORAGE_KEY, &raw).await?;
        debug!("identity record saved");
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// In-Memory Store
// ----------------------------------------------------------------------------

/// Shared in-memory [`KeyValueStore`]; clones see the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    read_only: bool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes fail, for exercising save-failure handling
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Seed an entry directly, bypassing the read-only flag
    pub async fn insert(&self, key: &str, value: &str) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> FireteamResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> FireteamResult<()> {
        if self.read_only {
            return Err(FireteamError::persistence("store is read-only"));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_round_trip_through_key_value_store() {
        let kv = MemoryKeyValueStore::new();
        let store = KeyValueIdentityStore::new(kv.clone());

        assert_eq!(store.load_identity().await.unwrap(), None);
        store.save_identity("  Alice  Bravo ").await.unwrap();

        let raw = kv.get(IDENTITY_STORAGE_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"{"name":"Alice Bravo"}"#);
        assert_eq!(
            store.load_identity().await.unwrap().as_deref(),
            Some("Alice Bravo")
        );
    }

    #[tokio::test]
    async fn test_blank_and_corrupt_records() {
        let kv = MemoryKeyValueStore::new();
        let store = KeyValueIdentityStore::new(kv.clone());

        kv.insert(IDENTITY_STORAGE_KEY, r#"{"name":"   "}"#).await;
        assert_eq!(store.load_identity().await.unwrap(), None);

        kv.insert(IDENTITY_STORAGE_KEY, "{broken").await;
        assert!(matches!(
            store.load_identity().await,
            Err(FireteamError::Persistence { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_only_store_rejects_save() {
        let store = KeyValueIdentityStore::new(MemoryKeyValueStore::read_only());
        assert!(store.save_identity("Alice").await.is_err());
    }
}
