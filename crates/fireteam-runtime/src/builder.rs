//! Runtime Builder API
//!
//! Builder-style construction of a [`FireteamRuntime`] from configuration and
//! collaborators, and the cloneable [`RuntimeHandle`] consumers (CLI, tests)
//! use to talk to it. Collaborators left unset fall back to offline/no-op
//! implementations and an in-memory identity store.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

use fireteam_core::{
    AlertState, ClearReason, DeviceId, FireteamConfig, FireteamError, FireteamResult,
    IdentityState, NetworkStatus, PresenceEntry, TimeSource, Timestamp,
};

use crate::channel::{AppEvent, Command, Reply};
use crate::clock::TokioTimeSource;
use crate::collaborators::{
    Collaborators, IdentityStore, NetworkSnapshotSource, NotificationSink, OfflineNetworkSource,
    PresentationSink, SilentSink,
};
use crate::logic::CoreStats;
use crate::runtime::FireteamRuntime;
use crate::stores::{KeyValueIdentityStore, MemoryKeyValueStore};

// ----------------------------------------------------------------------------
// Runtime Builder
// ----------------------------------------------------------------------------

/// Builder for a [`FireteamRuntime`]
pub struct RuntimeBuilder {
    config: FireteamConfig,
    device_id: Option<DeviceId>,
    network: Option<Arc<dyn NetworkSnapshotSource>>,
    presentation: Option<Arc<dyn PresentationSink>>,
    notifications: Option<Arc<dyn NotificationSink>>,
    identity: Option<Arc<dyn IdentityStore>>,
    time_source: Option<Arc<dyn TimeSource>>,
}

impl RuntimeBuilder {
    pub fn new(config: FireteamConfig) -> Self {
        Self {
            config,
            device_id: None,
            network: None,
            presentation: None,
            notifications: None,
            identity: None,
            time_source: None,
        }
    }

    /// Builder with the testing configuration preset
    pub fn for_testing() -> Self {
        Self::new(FireteamConfig::testing())
    }

    pub fn with_config(mut self, config: FireteamConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a fixed device id instead of generating one
    pub fn with_device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    pub fn with_network_source<S: NetworkSnapshotSource + 'static>(mut self, source: S) -> Self {
        self.network = Some(Arc::new(source));
        self
    }

    pub fn with_presentation<P: PresentationSink + 'static>(mut self, sink: P) -> Self {
        self.presentation = Some(Arc::new(sink));
        self
    }

    pub fn with_notifications<N: NotificationSink + 'static>(mut self, sink: N) -> Self {
        self.notifications = Some(Arc::new(sink));
        self
    }

    pub fn with_identity_store<I: IdentityStore + 'static>(mut self, store: I) -> Self {
        self.identity = Some(Arc::new(store));
        self
    }

    pub fn with_time_source<T: TimeSource + 'static>(mut self, time_source: T) -> Self {
        self.time_source = Some(Arc::new(time_source));
        self
    }

    /// Validate the configuration and assemble a stopped runtime
    pub fn build(self) -> FireteamResult<FireteamRuntime> {
        self.config.validate()?;

        let time_source = self
            .time_source
            .unwrap_or_else(|| Arc::new(TokioTimeSource::new()));
        let device_id = self
            .device_id
            .unwrap_or_else(|| DeviceId::generate(time_source.now()));

        let collaborators = Collaborators {
            network: self
                .network
                .unwrap_or_else(|| Arc::new(OfflineNetworkSource)),
            presentation: self.presentation.unwrap_or_else(|| Arc::new(SilentSink)),
            notifications: self.notifications.unwrap_or_else(|| Arc::new(SilentSink)),
            identity: self.identity.unwrap_or_else(|| {
                Arc::new(KeyValueIdentityStore::new(MemoryKeyValueStore::new()))
            }),
        };

        debug!(device_id = %device_id, "runtime assembled");
        Ok(FireteamRuntime::new(
            self.config,
            device_id,
            collaborators,
            time_source,
        ))
    }

    /// Build and start in one step
    pub async fn start(self) -> FireteamResult<FireteamRuntime> {
        let mut runtime = self.build()?;
        runtime.start().await?;
        Ok(runtime)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new(FireteamConfig::default())
    }
}

// ----------------------------------------------------------------------------
// Runtime Handle
// ----------------------------------------------------------------------------

/// Handle to a running FireTeam runtime
///
/// Every call is answered by the core logic task; once the runtime stops,
/// calls fail with [`FireteamError::NotRunning`].
#[derive(Clone)]
pub struct RuntimeHandle {
    device_id: DeviceId,
    time_source: Arc<dyn TimeSource>,
    command_sender: mpsc::Sender<Command>,
    app_event_sender: broadcast::Sender<AppEvent>,
}

impl RuntimeHandle {
    pub(crate) fn new(
        device_id: DeviceId,
        time_source: Arc<dyn TimeSource>,
        command_sender: mpsc::Sender<Command>,
        app_event_sender: broadcast::Sender<AppEvent>,
    ) -> Self {
        Self {
            device_id,
            time_source,
            command_sender,
            app_event_sender,
        }
    }

    pub(crate) fn command_sender(&self) -> &mpsc::Sender<Command> {
        &self.command_sender
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> FireteamResult<T> {
        let (reply, response) = oneshot::channel();
        self.command_sender
            .send(command(reply))
            .await
            .map_err(|_| FireteamError::NotRunning)?;
        response.await.map_err(|_| FireteamError::NotRunning)
    }

    /// This runtime's device id
    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// Current time on the runtime's clock, the one `last_seen_at` is
    /// stamped with
    pub fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Normalize and store a display name; an empty result clears identity
    /// and stops heartbeats
    pub async fn set_identity(&self, name: &str) -> FireteamResult<IdentityState> {
        let name = name.to_string();
        self.request(|reply| Command::SetIdentity { name, reply })
            .await
    }

    pub async fn identity_state(&self) -> FireteamResult<IdentityState> {
        self.request(|reply| Command::GetIdentity { reply }).await
    }

    /// Roster in insertion order with each entry's online flag
    pub async fn presence_snapshot(&self) -> FireteamResult<Vec<PresenceEntry>> {
        self.request(|reply| Command::GetPresence { reply }).await
    }

    /// Raise an alert as the local participant
    ///
    /// Fails with [`FireteamError::IdentityRequired`] while no display name is
    /// set.
    pub async fn send_alert(&self) -> FireteamResult<AlertState> {
        self.request(|reply| Command::SendAlert { reply }).await?
    }

    /// Dismiss the visible alert; `None` when nothing was showing
    pub async fn dismiss_alert(&self) -> FireteamResult<Option<ClearReason>> {
        self.request(|reply| Command::DismissAlert { reply }).await
    }

    pub async fn alert_state(&self) -> FireteamResult<AlertState> {
        self.request(|reply| Command::GetAlertState { reply }).await
    }

    /// Take a network snapshot now, outside the heartbeat schedule
    pub async fn reconnect(&self) -> FireteamResult<NetworkStatus> {
        self.request(|reply| Command::Reconnect { reply }).await
    }

    pub async fn network_status(&self) -> FireteamResult<NetworkStatus> {
        self.request(|reply| Command::GetNetworkStatus { reply })
            .await
    }

    /// Whether the alert button is enabled: identity set and on the team
    /// network
    pub async fn can_send_alert(&self) -> FireteamResult<bool> {
        let identity = self.identity_state().await?;
        let network = self.network_status().await?;
        Ok(identity.is_set() && network.qualifying)
    }

    pub async fn stats(&self) -> FireteamResult<CoreStats> {
        self.request(|reply| Command::GetStats { reply }).await
    }

    /// Subscribe to state-change events
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.app_event_sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = FireteamConfig::default();
        config.presence.broadcast_interval_ms = 0;
        assert!(matches!(
            RuntimeBuilder::new(config).build(),
            Err(FireteamError::InvalidConfiguration { .. })
        ));
    }

    #[tokio::test]
    async fn test_lifecycle_errors() {
        let mut runtime = RuntimeBuilder::for_testing()
            .with_device_id(DeviceId::new("device-a"))
            .build()
            .expect("Failed to build runtime");

        assert!(matches!(runtime.handle(), Err(FireteamError::NotRunning)));

        runtime.start().await.expect("Failed to start runtime");
        assert!(runtime.is_running());
        assert_eq!(
            runtime.start().await,
            Err(FireteamError::AlreadyRunning)
        );

        let handle = runtime.handle().expect("Failed to get handle");
        assert_eq!(handle.device_id().as_str(), "device-a");

        runtime.stop().await.expect("Failed to stop runtime");
        assert!(!runtime.is_running());
        assert_eq!(
            handle.identity_state().await,
            Err(FireteamError::NotRunning)
        );
        // Stopping twice is fine
        runtime.stop().await.expect("Second stop failed");
    }
}
