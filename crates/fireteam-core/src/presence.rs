//! Presence registry
//!
//! Holds the participants currently believed to be on the network. Entries are
//! refreshed by heartbeats and removed by age-based pruning. The registry is a
//! plain in-memory structure with no I/O and no failure modes; the runtime's
//! core logic task is its single owner.

use core::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::signal::SignalStrength;
use crate::types::{DeviceId, Timestamp};

// ----------------------------------------------------------------------------
// Participant
// ----------------------------------------------------------------------------

/// A team member's presence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub display_name: String,
    pub device_id: DeviceId,
    pub signal_strength: SignalStrength,
    pub last_seen_at: Timestamp,
    pub ip_address: Option<String>,
}

impl Participant {
    /// Build a record; `last_seen_at` is assigned on upsert
    pub fn new(
        display_name: impl Into<String>,
        device_id: DeviceId,
        signal_strength: SignalStrength,
        ip_address: Option<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            device_id,
            signal_strength,
            last_seen_at: Timestamp::default(),
            ip_address,
        }
    }

    /// Milliseconds since the last heartbeat
    pub fn age(&self, now: Timestamp) -> u64 {
        now - self.last_seen_at
    }

    pub fn is_online(&self, now: Timestamp, timeout: Duration) -> bool {
        u128::from(self.age(now)) < timeout.as_millis()
    }
}

/// Read-only roster entry with its computed online flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    #[serde(flatten)]
    pub participant: Participant,
    pub is_online: bool,
}

// ----------------------------------------------------------------------------
// Presence Registry
// ----------------------------------------------------------------------------

/// Insertion-ordered set of participants keyed by device id
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    participants: Vec<Participant>,
    stats: RegistryStats,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry for `participant.device_id`
    ///
    /// A replaced entry keeps its position in the roster. `last_seen_at` is
    /// always set to `now`, whatever the caller put in the record.
    pub fn upsert_self(&mut self, mut participant: Participant, now: Timestamp) {
        participant.last_seen_at = now;

        match self
            .participants
            .iter_mut()
            .find(|p| p.device_id == participant.device_id)
        {
            Some(existing) => {
                *existing = participant;
                self.stats.refreshed += 1;
            }
            None => {
                debug!(device_id = %participant.device_id, "participant joined registry");
                self.participants.push(participant);
                self.stats.inserted += 1;
            }
        }
    }

    /// Remove every entry whose age is at least `timeout`
    ///
    /// Returns the removed entries. Calling this again with the same `now`
    /// removes nothing.
    pub fn prune(&mut self, now: Timestamp, timeout: Duration) -> Vec<Participant> {
        let (kept, removed): (Vec<_>, Vec<_>) = self
            .participants
            .drain(..)
            .partition(|p| p.is_online(now, timeout));
        self.participants = kept;

        if !removed.is_empty() {
            self.stats.pruned += removed.len() as u64;
            debug!(count = removed.len(), "pruned stale participants");
        }
        removed
    }

    /// Roster view in insertion order, annotated with `is_online`
    pub fn snapshot(&self, now: Timestamp, timeout: Duration) -> Vec<PresenceEntry> {
        self.participants
            .iter()
            .map(|p| PresenceEntry {
                participant: p.clone(),
                is_online: p.is_online(now, timeout),
            })
            .collect()
    }

    pub fn get(&self, device_id: &DeviceId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.device_id == device_id)
    }

    pub fn online_count(&self, now: Timestamp, timeout: Duration) -> usize {
        self.participants
            .iter()
            .filter(|p| p.is_online(now, timeout))
            .count()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Counters for registry activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// First-time upserts
    pub inserted: u64,
    /// Upserts that replaced an existing entry
    pub refreshed: u64,
    /// Entries removed by pruning
    pub pruned: u64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
