//! Core state owned by the logic task

use serde::{Deserialize, Serialize};

use fireteam_core::{
    AlertCoordinator, AlertStats, DeviceId, FireteamConfig, IdentityState, NetworkStatus,
    PresenceRegistry, RegistryStats,
};

// ----------------------------------------------------------------------------
// Core State
// ----------------------------------------------------------------------------

/// Everything the core logic task mutates
#[derive(Debug)]
pub struct CoreState {
    pub device_id: DeviceId,
    pub identity: IdentityState,
    pub registry: PresenceRegistry,
    pub alerts: AlertCoordinator,
    pub network: NetworkStatus,
    pub stats: CoreStats,
}

impl CoreState {
    pub fn new(device_id: DeviceId, identity: IdentityState, config: &FireteamConfig) -> Self {
        Self {
            device_id,
            identity,
            registry: PresenceRegistry::new(),
            alerts: AlertCoordinator::new(config.alerts.display_duration()),
            network: NetworkStatus::unavailable(),
            stats: CoreStats::default(),
        }
    }

    /// Snapshot of every counter, including the core components' own
    pub fn stats_snapshot(&self) -> CoreStats {
        CoreStats {
            registry: self.registry.stats().clone(),
            alerts: self.alerts.stats().clone(),
            ..self.stats.clone()
        }
    }
}

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

/// Runtime counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreStats {
    pub commands_processed: u64,
    /// Broadcast ticks that started a snapshot fetch
    pub heartbeats_started: u64,
    /// Broadcast ticks skipped because a fetch was still running
    pub heartbeats_skipped: u64,
    pub snapshot_failures: u64,
    pub prune_runs: u64,
    /// Effects dropped because the dispatcher queue was full
    pub effects_dropped: u64,
    pub registry: RegistryStats,
    pub alerts: AlertStats,
}
