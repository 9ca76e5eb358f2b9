//! Collaborator interfaces
//!
//! The narrow seams between the runtime and the platform: network sensing,
//! presentation, notifications and persisted identity. Every method is async
//! and fallible; the runtime logs failures and never lets them reach the
//! state machines.

use std::sync::Arc;

use async_trait::async_trait;
use fireteam_core::{FireteamResult, NetworkSnapshot};

// ----------------------------------------------------------------------------
// Network Sensing
// ----------------------------------------------------------------------------

/// Source of point-in-time network facts
#[async_trait]
pub trait NetworkSnapshotSource: Send + Sync {
    /// Fetch the current snapshot, or `NetworkUnavailable` when the platform
    /// cannot answer
    async fn fetch_snapshot(&self) -> FireteamResult<NetworkSnapshot>;
}

// ----------------------------------------------------------------------------
// Presentation
// ----------------------------------------------------------------------------

/// Local alert presentation: sound, vibration and the alert modal
#[async_trait]
pub trait PresentationSink: Send + Sync {
    /// Show the alert raised by `sender` and play its sound
    async fn present_alert(&self, sender: &str) -> FireteamResult<()>;

    /// Take the alert down and stop any sound
    async fn present_dismiss(&self) -> FireteamResult<()>;

    /// One haptic pulse while an alert is showing
    async fn pulse(&self) -> FireteamResult<()> {
        Ok(())
    }
}

/// Best-effort local notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn schedule_notification(&self, title: &str, body: &str) -> FireteamResult<()>;
}

// ----------------------------------------------------------------------------
// Persistence
// ----------------------------------------------------------------------------

/// Persisted display name
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Load the stored name; `Ok(None)` when nothing was ever saved
    async fn load_identity(&self) -> FireteamResult<Option<String>>;

    async fn save_identity(&self, name: &str) -> FireteamResult<()>;
}

/// String key-value storage, the shape most platforms offer
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> FireteamResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> FireteamResult<()>;
}

// ----------------------------------------------------------------------------
// Collaborator Set
// ----------------------------------------------------------------------------

/// Everything the runtime talks to, shared between its tasks
#[derive(Clone)]
pub struct Collaborators {
    pub network: Arc<dyn NetworkSnapshotSource>,
    pub presentation: Arc<dyn PresentationSink>,
    pub notifications: Arc<dyn NotificationSink>,
    pub identity: Arc<dyn IdentityStore>,
}

// ----------------------------------------------------------------------------
// No-op Collaborators
// ----------------------------------------------------------------------------

/// Presentation and notification sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

#[async_trait]
impl PresentationSink for SilentSink {
    async fn present_alert(&self, _sender: &str) -> FireteamResult<()> {
        Ok(())
    }

    async fn present_dismiss(&self) -> FireteamResult<()> {
        Ok(())
    }
}

#[async_trait]
impl NotificationSink for SilentSink {
    async fn schedule_notification(&self, _title: &str, _body: &str) -> FireteamResult<()> {
        Ok(())
    }
}

/// Network source that never reports a qualifying network
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetworkSource;

#[async_trait]
impl NetworkSnapshotSource for OfflineNetworkSource {
    async fn fetch_snapshot(&self) -> FireteamResult<NetworkSnapshot> {
        Ok(NetworkSnapshot::unavailable())
    }
}
