//! Test utilities for deterministic testing of FireTeam core components
//!
//! Provides a controllable time source and fixture builders so that
//! time-dependent behavior can be exercised without sleeping.

use fireteam_core::types::{TimeSource, Timestamp};
use fireteam_core::{DeviceId, NetworkSnapshot, Participant, SignalClassifier};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ----------------------------------------------------------------------------
// Mock Time Source
// ----------------------------------------------------------------------------

/// Mock time source for deterministic testing
#[derive(Debug, Clone)]
pub struct MockTimeSource {
    current_time: Arc<AtomicU64>,
}

impl MockTimeSource {
    /// Create a new mock time source starting at time 0
    pub fn new() -> Self {
        Self {
            current_time: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a new mock time source starting at a specific time
    #[allow(dead_code)]
    pub fn new_at(start_time: u64) -> Self {
        Self {
            current_time: Arc::new(AtomicU64::new(start_time)),
        }
    }

    /// Advance time by the specified number of milliseconds
    pub fn advance(&self, millis: u64) {
        self.current_time.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the time to a specific value
    #[allow(dead_code)]
    pub fn set_time(&self, millis: u64) {
        self.current_time.store(millis, Ordering::SeqCst);
    }
}

impl Default for MockTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current_time.load(Ordering::SeqCst))
    }
}

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

/// Snapshot for a device on the team WiFi
#[allow(dead_code)]
pub fn wifi_snapshot(ssid: &str, internet: bool) -> NetworkSnapshot {
    NetworkSnapshot {
        is_qualifying_network: true,
        ssid: Some(ssid.to_string()),
        internet_reachable: internet,
        ip_address: Some("192.168.1.20".to_string()),
    }
}

/// Participant built the way a heartbeat builds it
#[allow(dead_code)]
pub fn heartbeat_participant(name: &str, id: &str, snapshot: &NetworkSnapshot) -> Participant {
    let classification = SignalClassifier::classify(snapshot);
    Participant::new(
        name,
        DeviceId::new(id),
        classification.strength,
        snapshot.ip_address.clone(),
    )
}
