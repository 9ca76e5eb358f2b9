//! Local identity
//!
//! The display name is the only persisted state. It is stored as a small JSON
//! record under a fixed key so any string key-value store can hold it.

use serde::{Deserialize, Serialize};

use crate::errors::{FireteamError, FireteamResult};

/// Key under which the identity record is stored
pub const IDENTITY_STORAGE_KEY: &str = "@FireTeam:userData";

/// Collapse runs of whitespace to a single space and trim both ends
pub fn normalize_display_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ----------------------------------------------------------------------------
// Identity Record
// ----------------------------------------------------------------------------

/// Persisted form of the identity: `{"name": "..."}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    #[serde(default)]
    pub name: String,
}

impl IdentityRecord {
    pub fn new(name: &str) -> Self {
        Self {
            name: normalize_display_name(name),
        }
    }

    pub fn to_json(&self) -> FireteamResult<String> {
        serde_json::to_string(self)
            .map_err(|e| FireteamError::persistence(format!("Failed to encode identity: {}", e)))
    }

    pub fn from_json(raw: &str) -> FireteamResult<Self> {
        let record: IdentityRecord = serde_json::from_str(raw)
            .map_err(|e| FireteamError::persistence(format!("Failed to decode identity: {}", e)))?;
        Ok(Self::new(&record.name))
    }
}

// ----------------------------------------------------------------------------
// Identity State
// ----------------------------------------------------------------------------

/// Identity as exposed to the presentation layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityState {
    pub display_name: String,
}

impl IdentityState {
    pub fn new(name: &str) -> Self {
        Self {
            display_name: normalize_display_name(name),
        }
    }

    /// Whether alerts and heartbeats are enabled
    pub fn is_set(&self) -> bool {
        !self.display_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_display_name() {
        assert_eq!(normalize_display_name("  Alice  Bravo "), "Alice Bravo");
        assert_eq!(normalize_display_name("Alice\t\nBravo"), "Alice Bravo");
        assert_eq!(normalize_display_name("   "), "");
        assert_eq!(normalize_display_name(""), "");
    }

    #[test]
    fn test_record_json_shape() {
        let record = IdentityRecord::new("  Alice  Bravo ");
        assert_eq!(record.to_json().unwrap(), r#"{"name":"Alice Bravo"}"#);
        assert_eq!(IdentityRecord::from_json(r#"{"name":" Bob "}"#).unwrap().name, "Bob");
        assert_eq!(IdentityRecord::from_json("{}").unwrap().name, "");
        assert!(matches!(
            IdentityRecord::from_json("not json"),
            Err(FireteamError::Persistence { .. })
        ));
    }

    #[test]
    fn test_identity_state() {
        assert!(!IdentityState::default().is_set());
        assert!(IdentityState::new(" Alice ").is_set());
        assert!(!IdentityState::new(" \t ").is_set());
    }
}
