//! FireTeam Runtime
//!
//! [`FireteamRuntime`] owns the lifecycle of the two tasks that make up a
//! running FireTeam node:
//!
//! - the `CoreLogicTask`, single owner of identity, registry, alert state and
//!   every timer
//! - the `EffectDispatcher`, which executes presentation, notification and
//!   persistence effects in order
//!
//! ```rust,no_run
//! use fireteam_core::FireteamConfig;
//! use fireteam_runtime::RuntimeBuilder;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut runtime = RuntimeBuilder::new(FireteamConfig::default()).build()?;
//! runtime.start().await?;
//!
//! let handle = runtime.handle()?;
//! handle.set_identity("Alice").await?;
//! let roster = handle.presence_snapshot().await?;
//! println!("{} participant(s)", roster.len());
//!
//! runtime.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use fireteam_core::{
    DeviceId, FireteamConfig, FireteamError, FireteamResult, IdentityState, TimeSource,
};

use crate::builder::RuntimeHandle;
use crate::channel::Command;
use crate::collaborators::Collaborators;
use crate::logic::{CoreLogicTask, CoreState, EffectDispatcher};

/// Upper bound on waiting for each task during `stop()`
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

// ----------------------------------------------------------------------------
// FireTeam Runtime
// ----------------------------------------------------------------------------

pub struct FireteamRuntime {
    config: FireteamConfig,
    device_id: DeviceId,
    collaborators: Collaborators,
    time_source: Arc<dyn TimeSource>,
    handle: Option<RuntimeHandle>,
    core_logic_handle: Option<JoinHandle<FireteamResult<()>>>,
    dispatcher_handle: Option<JoinHandle<()>>,
    running: bool,
}

impl FireteamRuntime {
    pub(crate) fn new(
        config: FireteamConfig,
        device_id: DeviceId,
        collaborators: Collaborators,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            device_id,
            collaborators,
            time_source,
            handle: None,
            core_logic_handle: None,
            dispatcher_handle: None,
            running: false,
        }
    }

    /// Load the stored identity and start both tasks
    ///
    /// With a stored identity the first heartbeat runs immediately.
    pub async fn start(&mut self) -> FireteamResult<()> {
        if self.running {
            return Err(FireteamError::AlreadyRunning);
        }

        let identity = self.load_identity().await;
        let channels = &self.config.channels;
        let (command_sender, command_receiver) = mpsc::channel(channels.command_buffer_size);
        let (effect_sender, effect_receiver) = mpsc::channel(channels.effect_buffer_size);
        let (app_event_sender, _) = broadcast::channel(channels.app_event_buffer_size);

        let state = CoreState::new(self.device_id.clone(), identity, &self.config);
        let core_logic = CoreLogicTask::new(
            state,
            self.config.clone(),
            Arc::clone(&self.time_source),
            Arc::clone(&self.collaborators.network),
            command_receiver,
            effect_sender,
            app_event_sender.clone(),
        );
        let dispatcher = EffectDispatcher::new(self.collaborators.clone(), effect_receiver);

        self.dispatcher_handle = Some(tokio::spawn(dispatcher.run()));
        self.core_logic_handle = Some(tokio::spawn(core_logic.run()));
        self.handle = Some(RuntimeHandle::new(
            self.device_id.clone(),
            Arc::clone(&self.time_source),
            command_sender,
            app_event_sender,
        ));
        self.running = true;

        info!(device_id = %self.device_id, "FireTeam runtime started");
        Ok(())
    }

    async fn load_identity(&self) -> IdentityState {
        match self.collaborators.identity.load_identity().await {
            Ok(Some(name)) => IdentityState::new(&name),
            Ok(None) => IdentityState::default(),
            Err(e) => {
                warn!(error = %e, "failed to load identity, starting without one");
                IdentityState::default()
            }
        }
    }

    /// Stop the runtime, cancelling every timer
    ///
    /// Effects queued before the stop (including the departure notice) are
    /// delivered before this returns. Stopping a stopped runtime is a no-op.
    pub async fn stop(&mut self) -> FireteamResult<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;

        if let Some(handle) = self.handle.take() {
            let _ = handle.command_sender().send(Command::Shutdown).await;
        }

        let mut result = Ok(());
        if let Some(mut core) = self.core_logic_handle.take() {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut core).await {
                Ok(Ok(outcome)) => result = outcome,
                Ok(Err(e)) => {
                    result = Err(FireteamError::channel_error(format!(
                        "Core logic task panicked: {}",
                        e
                    )))
                }
                Err(_) => {
                    warn!("Core logic task did not stop in time, aborting");
                    core.abort();
                }
            }
        }

        if let Some(mut dispatcher) = self.dispatcher_handle.take() {
            if tokio::time::timeout(SHUTDOWN_TIMEOUT, &mut dispatcher)
                .await
                .is_err()
            {
                warn!("Effect dispatcher did not drain in time, aborting");
                dispatcher.abort();
            }
        }

        info!(device_id = %self.device_id, "FireTeam runtime stopped");
        result
    }

    /// Handle for talking to the running runtime
    pub fn handle(&self) -> FireteamResult<RuntimeHandle> {
        self.handle.clone().ok_or(FireteamError::NotRunning)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn config(&self) -> &FireteamConfig {
        &self.config
    }
}

impl Drop for FireteamRuntime {
    fn drop(&mut self) {
        if let Some(core) = self.core_logic_handle.take() {
            core.abort();
        }
        if let Some(dispatcher) = self.dispatcher_handle.take() {
            dispatcher.abort();
        }
    }
}
