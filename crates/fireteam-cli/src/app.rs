//! FireTeam terminal application
//!
//! Wires the runtime to this host: the system network probe, terminal sinks
//! and the JSON state file in the data directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use fireteam_core::NetworkStatus;
use fireteam_runtime::{FireteamRuntime, KeyValueIdentityStore, RuntimeBuilder};

use crate::config::AppConfig;
use crate::error::Result;
use crate::network::SystemNetworkSource;
use crate::state::{identity_store, JsonFileStore};
use crate::terminal::{stdout_writer, SharedWriter, TerminalNotifier, TerminalPresenter};

pub struct FireteamApp {
    config: AppConfig,
    data_dir: PathBuf,
    out: SharedWriter,
}

impl FireteamApp {
    /// Resolve the data directory and bind output to stdout
    pub fn new(config: AppConfig) -> Result<Self> {
        let data_dir = config.data_dir()?;
        Ok(Self::with_writer(config, data_dir, stdout_writer()))
    }

    pub fn with_writer(config: AppConfig, data_dir: PathBuf, out: SharedWriter) -> Self {
        debug!(data_dir = %data_dir.display(), "application configured");
        Self {
            config,
            data_dir,
            out,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn writer(&self) -> SharedWriter {
        self.out.clone()
    }

    pub fn identity_store(&self) -> KeyValueIdentityStore<JsonFileStore> {
        identity_store(&self.data_dir)
    }

    pub fn network_source(&self) -> SystemNetworkSource {
        SystemNetworkSource::new(
            self.config.network.clone(),
            self.config.fireteam.presence.qualifying_types.clone(),
        )
    }

    /// Runtime bound to this host's collaborators, not yet started
    pub fn runtime_builder(&self) -> RuntimeBuilder {
        RuntimeBuilder::new(self.config.fireteam.clone())
            .with_network_source(self.network_source())
            .with_presentation(TerminalPresenter::new(self.out.clone(), self.config.cli.bell))
            .with_notifications(TerminalNotifier::new(self.out.clone()))
            .with_identity_store(self.identity_store())
    }

    /// Build and start the runtime
    pub async fn start_runtime(&self) -> Result<FireteamRuntime> {
        let runtime = self.runtime_builder().start().await?;
        info!("FireTeam runtime started");
        Ok(runtime)
    }

    /// One network sample, classified, without starting a runtime
    pub async fn probe_network(&self) -> Result<(String, NetworkStatus)> {
        let source = self.network_source();
        let state = source.probe_state().await?;
        let snapshot = state.normalize_with(&self.config.fireteam.presence.qualifying_types);
        Ok((state.connection_type, NetworkStatus::from_snapshot(&snapshot)))
    }
}
