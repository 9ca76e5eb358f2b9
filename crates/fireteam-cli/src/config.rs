//! FireTeam CLI Configuration Management
//!
//! Configuration is a single TOML file. Every section is optional; anything
//! left out falls back to its default, so an empty file is a valid config.
//!
//! ```toml
//! [fireteam.presence]
//! broadcast_interval_ms = 2000
//! qualifying_types = ["wifi", "ethernet"]
//!
//! [network]
//! reachability_host = "1.1.1.1:443"
//!
//! [storage]
//! data_dir = "/var/lib/fireteam"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fireteam_core::FireteamConfig;

use crate::error::{CliError, Result};

/// Directory under the platform data dir holding FireTeam state
const APP_DIR_NAME: &str = "fireteam";

// ----------------------------------------------------------------------------
// CLI Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the `fireteam` binary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Presence, alert, notification and channel tunables
    pub fireteam: FireteamConfig,

    /// Terminal behaviour
    pub cli: CliConfig,

    /// Host network probing
    pub network: NetworkProbeConfig,

    /// Where the identity file lives
    pub storage: StorageConfig,
}

/// Terminal options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Ring the terminal bell on alerts and haptic pulses
    pub bell: bool,
}

/// How the system network source samples the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkProbeConfig {
    /// Address used to discover the outbound interface's IP; nothing is sent
    pub route_probe_addr: String,

    /// `host:port` a TCP connect is attempted to for internet reachability
    pub reachability_host: String,

    pub reachability_timeout_ms: u64,

    /// Command printing the current SSID; split on whitespace into the
    /// program and its arguments
    pub ssid_command: String,
}

/// Persistence location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Defaults to `<platform data dir>/fireteam`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// ----------------------------------------------------------------------------
// Default Implementations
// ----------------------------------------------------------------------------

impl Default for CliConfig {
    fn default() -> Self {
        Self { bell: true }
    }
}

impl Default for NetworkProbeConfig {
    fn default() -> Self {
        Self {
            route_probe_addr: "8.8.8.8:80".to_string(),
            reachability_host: "1.1.1.1:443".to_string(),
            reachability_timeout_ms: 1_000,
            ssid_command: "iwgetid -r".to_string(),
        }
    }
}

impl NetworkProbeConfig {
    pub fn reachability_timeout(&self) -> Duration {
        Duration::from_millis(self.reachability_timeout_ms)
    }
}

// ----------------------------------------------------------------------------
// Configuration Loading Logic
// ----------------------------------------------------------------------------

impl AppConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CliError::Config(format!(
                "Failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<()> {
        self.fireteam.validate()?;

        if self.network.reachability_timeout_ms == 0 {
            return Err(CliError::Config(
                "Reachability timeout must be greater than 0".to_string(),
            ));
        }
        if !self.network.reachability_host.contains(':') {
            return Err(CliError::Config(format!(
                "Reachability host must be host:port, got {}",
                self.network.reachability_host
            )));
        }
        if self.network.ssid_command.trim().is_empty() {
            return Err(CliError::Config("SSID command must not be empty".to_string()));
        }

        Ok(())
    }

    /// Effective data directory: configured, else the platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| CliError::Config("No platform data directory available".to_string()))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::from_toml("").expect("Failed to parse empty config");
        assert_eq!(config, AppConfig::default());
        assert!(config.cli.bell);
    }

    #[test]
    fn test_partial_sections_merge_with_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [fireteam.presence]
            qualifying_types = ["wifi", "ethernet"]

            [storage]
            data_dir = "/tmp/fireteam-test"
            "#,
        )
        .expect("Failed to parse config");

        assert_eq!(
            config.fireteam.presence.qualifying_types,
            vec!["wifi".to_string(), "ethernet".to_string()]
        );
        assert_eq!(config.fireteam.presence.broadcast_interval_ms, 2_000);
        assert_eq!(
            config.data_dir().expect("data dir"),
            PathBuf::from("/tmp/fireteam-test")
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = AppConfig::from_toml("[fireteam.presence]\ntimeout_ms = 1000\n");
        assert!(matches!(err, Err(CliError::Fireteam(_))));

        let err = AppConfig::from_toml("[network]\nreachability_host = \"example.com\"\n");
        assert!(matches!(err, Err(CliError::Config(_))));

        let err = AppConfig::from_toml("[cli]\nbell = \"loud\"\n");
        assert!(matches!(err, Err(CliError::TomlParsing(_))));
    }

    #[test]
    fn test_printed_config_reloads() {
        let config = AppConfig::default();
        let printed = config.to_toml().expect("Failed to print config");
        assert!(printed.contains("[fireteam.presence]"));
        assert!(printed.contains("[network]"));
        assert_eq!(AppConfig::from_toml(&printed).expect("reload"), config);
    }
}
