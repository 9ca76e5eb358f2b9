//! Network state shapes
//!
//! Platforms report connectivity in loosely-typed, partially optional forms.
//! [`PlatformNetworkState`] captures that raw report and is normalized once,
//! at the classifier boundary, into the fixed [`NetworkSnapshot`] the core
//! depends on. [`NetworkStatus`] is the device's own network panel.

use serde::{Deserialize, Serialize};

use crate::signal::{Classification, SignalClassifier, SignalStrength};

/// Connection type that qualifies by default
pub const DEFAULT_QUALIFYING_TYPE: &str = "wifi";

// ----------------------------------------------------------------------------
// Network Snapshot
// ----------------------------------------------------------------------------

/// Point-in-time network facts, read-only to the core
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub is_qualifying_network: bool,
    pub ssid: Option<String>,
    pub internet_reachable: bool,
    pub ip_address: Option<String>,
}

impl NetworkSnapshot {
    /// Snapshot used when the platform cannot answer
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn classify(&self) -> Classification {
        SignalClassifier::classify(self)
    }
}

// ----------------------------------------------------------------------------
// Platform Report
// ----------------------------------------------------------------------------

/// Raw connectivity report as a platform layer produces it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformNetworkState {
    /// Connection kind, e.g. `"wifi"`, `"ethernet"`, `"cellular"`, `"none"`
    pub connection_type: String,
    pub is_connected: Option<bool>,
    pub is_internet_reachable: Option<bool>,
    /// Type-specific details; WiFi reports carry `{"ssid": ...}`
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

impl PlatformNetworkState {
    /// Normalize treating only WiFi as qualifying
    pub fn normalize(&self) -> NetworkSnapshot {
        self.normalize_with(&[DEFAULT_QUALIFYING_TYPE])
    }

    /// Normalize with an explicit list of qualifying connection types
    pub fn normalize_with<S: AsRef<str>>(&self, qualifying_types: &[S]) -> NetworkSnapshot {
        let type_qualifies = qualifying_types
            .iter()
            .any(|t| t.as_ref().eq_ignore_ascii_case(&self.connection_type));
        let is_qualifying_network = type_qualifies && self.is_connected == Some(true);

        let ssid = if type_qualifies {
            self.details
                .as_ref()
                .and_then(|details| details.get("ssid"))
                .and_then(|ssid| ssid.as_str())
                .filter(|ssid| !ssid.is_empty())
                .map(str::to_string)
        } else {
            None
        };

        NetworkSnapshot {
            is_qualifying_network,
            ssid,
            internet_reachable: self.is_internet_reachable.unwrap_or(false),
            ip_address: self.ip_address.clone().filter(|ip| !ip.is_empty()),
        }
    }
}

// ----------------------------------------------------------------------------
// Network Status
// ----------------------------------------------------------------------------

/// The local device's latest view of its own network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub qualifying: bool,
    pub ssid: Option<String>,
    pub strength: SignalStrength,
    pub internet_reachable: bool,
    pub ip_address: Option<String>,
}

impl NetworkStatus {
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Self {
        let Classification {
            qualifies,
            strength,
        } = snapshot.classify();
        Self {
            qualifying: qualifies,
            ssid: snapshot.ssid.clone(),
            strength,
            internet_reachable: snapshot.internet_reachable,
            ip_address: snapshot.ip_address.clone(),
        }
    }

    /// Status reported when no snapshot could be taken
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// One-line description for status panels
    pub fn describe(&self) -> String {
        if self.qualifying {
            format!(
                "Connected to {} ({})",
                self.ssid.as_deref().unwrap_or("WiFi"),
                self.strength
            )
        } else {
            "Not connected to WiFi".to_string()
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
