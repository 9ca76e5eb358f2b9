//! Centralized Configuration Management
//!
//! All tunables of the presence and alert subsystem in one serde-friendly
//! structure. Durations are stored as milliseconds so the configuration reads
//! naturally from TOML; typed accessors return [`Duration`].

use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{FireteamError, FireteamResult};
use crate::network::DEFAULT_QUALIFYING_TYPE;
use crate::notification::DEFAULT_TITLE;

// ----------------------------------------------------------------------------
// Presence Configuration
// ----------------------------------------------------------------------------

/// Heartbeat and pruning schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Period of the broadcast (heartbeat) tick
    pub broadcast_interval_ms: u64,
    /// Period of the pruning sweep
    pub prune_interval_ms: u64,
    /// Age at which a participant counts as gone
    pub timeout_ms: u64,
    /// Upper bound on one network snapshot fetch
    pub snapshot_timeout_ms: u64,
    /// Only upsert the local participant while on a qualifying network
    pub require_qualifying_network: bool,
    /// Connection types treated as the team network
    pub qualifying_types: Vec<String>,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            broadcast_interval_ms: 2_000,
            prune_interval_ms: 5_000,
            timeout_ms: 10_000,
            snapshot_timeout_ms: 1_500,
            require_qualifying_network: true,
            qualifying_types: vec![DEFAULT_QUALIFYING_TYPE.to_string()],
        }
    }
}

impl PresenceConfig {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_millis(self.prune_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn snapshot_timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot_timeout_ms)
    }
}

// ----------------------------------------------------------------------------
// Alert Configuration
// ----------------------------------------------------------------------------

/// Alert display behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// How long a raised alert stays visible without a dismiss
    pub display_duration_ms: u64,
    /// Repeat interval of the haptic pulse while an alert is visible; 0 disables
    pub haptic_pulse_interval_ms: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            display_duration_ms: 10_000,
            haptic_pulse_interval_ms: 1_000,
        }
    }
}

impl AlertConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_duration_ms)
    }

    pub fn haptic_pulse_interval(&self) -> Option<Duration> {
        (self.haptic_pulse_interval_ms > 0)
            .then(|| Duration::from_millis(self.haptic_pulse_interval_ms))
    }
}

// ----------------------------------------------------------------------------
// Notification Configuration
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    /// Schedule a "joined" notification on a successful reconnect
    pub announce_connect: bool,
    /// Schedule a "left" notification when the qualifying network is lost
    pub announce_disconnect: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            announce_connect: true,
            announce_disconnect: true,
        }
    }
}

// ----------------------------------------------------------------------------
// Channel Configuration
// ----------------------------------------------------------------------------

/// Buffer sizes for the runtime's channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Buffer size for commands (UI → core logic)
    pub command_buffer_size: usize,
    /// Buffer size for side effects (core logic → effect dispatcher)
    pub effect_buffer_size: usize,
    /// Capacity of the app event broadcast (core logic → UI)
    pub app_event_buffer_size: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            command_buffer_size: 32,
            effect_buffer_size: 64,
            app_event_buffer_size: 64,
        }
    }
}

// ----------------------------------------------------------------------------
// Main Configuration
// ----------------------------------------------------------------------------

/// Complete FireTeam configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireteamConfig {
    pub presence: PresenceConfig,
    pub alerts: AlertConfig,
    pub notifications: NotificationConfig,
    pub channels: ChannelConfig,
}

impl FireteamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for tests: default timings, small buffers
    pub fn testing() -> Self {
        Self {
            channels: ChannelConfig {
                command_buffer_size: 8,
                effect_buffer_size: 32,
                app_event_buffer_size: 256,
            },
            ..Self::default()
        }
    }

    pub fn with_presence(mut self, presence: PresenceConfig) -> Self {
        self.presence = presence;
        self
    }

    pub fn with_alerts(mut self, alerts: AlertConfig) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_notifications(mut self, notifications: NotificationConfig) -> Self {
        self.notifications = notifications;
        self
    }

    pub fn with_channels(mut self, channels: ChannelConfig) -> Self {
        self.channels = channels;
        self
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> FireteamResult<()> {
        let presence = &self.presence;
        if presence.broadcast_interval_ms == 0 {
            return Err(FireteamError::config_error(
                "Broadcast interval must be greater than 0",
            ));
        }
        if presence.prune_interval_ms == 0 {
            return Err(FireteamError::config_error(
                "Prune interval must be greater than 0",
            ));
        }
        if presence.timeout_ms <= presence.broadcast_interval_ms {
            return Err(FireteamError::config_error(format!(
                "Presence timeout ({}ms) must exceed the broadcast interval ({}ms)",
                presence.timeout_ms, presence.broadcast_interval_ms
            )));
        }
        if presence.snapshot_timeout_ms == 0 {
            return Err(FireteamError::config_error(
                "Snapshot timeout must be greater than 0",
            ));
        }
        if presence.qualifying_types.is_empty() {
            return Err(FireteamError::config_error(
                "At least one qualifying connection type is required",
            ));
        }
        if self.alerts.display_duration_ms == 0 {
            return Err(FireteamError::config_error(
                "Alert display duration must be greater than 0",
            ));
        }

        let channels = &self.channels;
        if channels.command_buffer_size == 0
            || channels.effect_buffer_size == 0
            || channels.app_event_buffer_size == 0
        {
            return Err(FireteamError::config_error(
                "Channel buffer sizes must be greater than 0",
            ));
        }

        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
