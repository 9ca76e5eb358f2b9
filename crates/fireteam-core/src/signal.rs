//! Signal classification
//!
//! Maps a [`NetworkSnapshot`] to a coarse signal score. The platform never
//! reports real radio strength, so the score only distinguishes "off the
//! qualifying network", "on it without internet" and "on it with internet".

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::network::NetworkSnapshot;

// ----------------------------------------------------------------------------
// Signal Strength
// ----------------------------------------------------------------------------

/// Coarse signal quality score in `0..=100`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SignalStrength(u8);

impl SignalStrength {
    /// No usable network
    pub const NONE: Self = Self(0);
    /// On the qualifying network, internet unreachable
    pub const LOCAL_ONLY: Self = Self(60);
    /// On the qualifying network with internet reachable
    pub const FULL: Self = Self(100);

    /// Create a strength, clamping to 100
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Get the raw value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Display tier used for roster icons
    pub fn tier(&self) -> SignalTier {
        SignalTier::from_strength(*self)
    }
}

impl TryFrom<u8> for SignalStrength {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 100 {
            Err(format!("signal strength {} out of range 0..=100", value))
        } else {
            Ok(Self(value))
        }
    }
}

impl From<SignalStrength> for u8 {
    fn from(strength: SignalStrength) -> u8 {
        strength.0
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ----------------------------------------------------------------------------
// Signal Tier
// ----------------------------------------------------------------------------

/// Roster indicator tier derived from a [`SignalStrength`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalTier {
    Strong,
    Medium,
    Weak,
}

impl SignalTier {
    pub fn from_strength(strength: SignalStrength) -> Self {
        match strength.value() {
            75..=u8::MAX => SignalTier::Strong,
            50..=74 => SignalTier::Medium,
            _ => SignalTier::Weak,
        }
    }

    /// Short glyph for terminal rendering
    pub fn glyph(&self) -> &'static str {
        match self {
            SignalTier::Strong => "▂▄▆█",
            SignalTier::Medium => "▂▄▆_",
            SignalTier::Weak => "▂___",
        }
    }
}

// ----------------------------------------------------------------------------
// Classifier
// ----------------------------------------------------------------------------

/// Result of classifying one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub qualifies: bool,
    pub strength: SignalStrength,
}

/// Total, side-effect free mapping from snapshot to classification
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalClassifier;

impl SignalClassifier {
    pub fn classify(snapshot: &NetworkSnapshot) -> Classification {
        let qualifies = snapshot.is_qualifying_network;
        let strength = if !qualifies {
            SignalStrength::NONE
        } else if snapshot.internet_reachable {
            SignalStrength::FULL
        } else {
            SignalStrength::LOCAL_ONLY
        };

        Classification {
            qualifies,
            strength,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(qualifying: bool, reachable: bool) -> NetworkSnapshot {
        NetworkSnapshot {
            is_qualifying_network: qualifying,
            ssid: Some("station-7".to_string()),
            internet_reachable: reachable,
            ip_address: Some("192.168.1.20".to_string()),
        }
    }

    #[test]
    fn test_classify_reachable_wifi() {
        let c = SignalClassifier::classify(&snapshot(true, true));
        assert!(c.qualifies);
        assert_eq!(c.strength.value(), 100);
    }

    #[test]
    fn test_classify_local_only_wifi() {
        let c = SignalClassifier::classify(&snapshot(true, false));
        assert!(c.qualifies);
        assert_eq!(c.strength.value(), 60);
    }

    #[test]
    fn test_classify_non_qualifying() {
        for reachable in [true, false] {
            let c = SignalClassifier::classify(&snapshot(false, reachable));
            assert!(!c.qualifies);
            assert_eq!(c.strength.value(), 0);
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(SignalStrength::FULL.tier(), SignalTier::Strong);
        assert_eq!(SignalStrength::new(75).tier(), SignalTier::Strong);
        assert_eq!(SignalStrength::LOCAL_ONLY.tier(), SignalTier::Medium);
        assert_eq!(SignalStrength::new(49).tier(), SignalTier::Weak);
        assert_eq!(SignalStrength::NONE.tier(), SignalTier::Weak);
    }

    #[test]
    fn test_strength_clamps_and_rejects() {
        assert_eq!(SignalStrength::new(250).value(), 100);
        assert!(SignalStrength::try_from(101).is_err());
    }
}
