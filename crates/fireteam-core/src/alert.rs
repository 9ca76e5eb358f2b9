//! Alert state machine
//!
//! `Idle` and `Active(sender, raised_at)`, with three ways out of `Active`:
//! a fresh `raise` (last writer wins), an explicit `dismiss`, or the display
//! window elapsing. Each `Active` entry gets its own cycle number; timers
//! armed by the runtime carry that number so a timer from a superseded cycle
//! cannot clear a newer alert. Exactly one of dismiss or expiry is reported
//! per cycle.
//!
//! ```text
//!          raise(by)                    raise(by')
//!   Idle ───────────▶ Active(by, t) ─────────────▶ Active(by', t')
//!    ▲                   │    │
//!    │    dismiss()      │    │ now >= t + window
//!    └───────────────────┴────┘
//! ```

use core::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{FireteamError, FireteamResult};
use crate::types::Timestamp;

// ----------------------------------------------------------------------------
// Public State View
// ----------------------------------------------------------------------------

/// What the presentation layer renders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub visible: bool,
    /// Empty when not visible
    pub sender_name: String,
    pub raised_at: Option<Timestamp>,
}

impl AlertState {
    pub fn hidden() -> Self {
        Self::default()
    }
}

// ----------------------------------------------------------------------------
// Internal Phase
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertPhase {
    Idle,
    Active {
        sender: String,
        raised_at: Timestamp,
        expires_at: Timestamp,
        cycle: u64,
    },
}

impl AlertPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, AlertPhase::Active { .. })
    }
}

/// Why an alert left the `Active` state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClearReason {
    Dismissed,
    Expired,
}

/// A state change, returned so the caller can dispatch side effects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertTransition {
    Raised {
        sender: String,
        cycle: u64,
        raised_at: Timestamp,
        expires_at: Timestamp,
        /// Sender of the alert this one superseded, if any
        superseded: Option<String>,
    },
    Cleared {
        sender: String,
        cycle: u64,
        reason: ClearReason,
    },
}

// ----------------------------------------------------------------------------
// Alert Coordinator
// ----------------------------------------------------------------------------

/// Owner of the alert state
#[derive(Debug)]
pub struct AlertCoordinator {
    phase: AlertPhase,
    display_duration: Duration,
    next_cycle: u64,
    stats: AlertStats,
}

impl AlertCoordinator {
    pub fn new(display_duration: Duration) -> Self {
        Self {
            phase: AlertPhase::Idle,
            display_duration,
            next_cycle: 1,
            stats: AlertStats::default(),
        }
    }

    /// Enter `Active(by, now)`, replacing any current alert
    ///
    /// Fails with [`FireteamError::IdentityRequired`] when `by` is blank; the
    /// state is left untouched in that case.
    pub fn raise(&mut self, by: &str, now: Timestamp) -> FireteamResult<AlertTransition> {
        if by.trim().is_empty() {
            self.stats.rejected += 1;
            return Err(FireteamError::IdentityRequired);
        }

        let superseded = match &self.phase {
            AlertPhase::Active { sender, .. } => {
                self.stats.superseded += 1;
                Some(sender.clone())
            }
            AlertPhase::Idle => None,
        };

        let cycle = self.next_cycle;
        self.next_cycle += 1;
        let expires_at = now + self.display_duration;

        self.phase = AlertPhase::Active {
            sender: by.to_string(),
            raised_at: now,
            expires_at,
            cycle,
        };
        self.stats.raised += 1;
        info!(sender = by, cycle, "alert raised");

        Ok(AlertTransition::Raised {
            sender: by.to_string(),
            cycle,
            raised_at: now,
            expires_at,
            superseded,
        })
    }

    /// Explicit user dismissal; `None` when nothing is showing
    pub fn dismiss(&mut self, now: Timestamp) -> Option<AlertTransition> {
        // A dismissal racing a lapsed window loses to the expiry
        if let Some(expired) = self.expire_due(now) {
            return Some(expired);
        }
        self.clear(ClearReason::Dismissed)
    }

    /// Timer callback for `cycle`; a no-op unless that cycle is still showing
    /// and its window has elapsed
    pub fn expire(&mut self, cycle: u64, now: Timestamp) -> Option<AlertTransition> {
        let due = matches!(
            self.phase,
            AlertPhase::Active { cycle: active, expires_at, .. } if active == cycle && now >= expires_at
        );
        if !due {
            debug!(cycle, "ignoring stale alert timer");
            return None;
        }
        self.clear(ClearReason::Expired)
    }

    /// Apply the expiry transition if the current window has elapsed
    pub fn expire_due(&mut self, now: Timestamp) -> Option<AlertTransition> {
        match self.expires_at() {
            Some(expires_at) if now >= expires_at => self.clear(ClearReason::Expired),
            _ => None,
        }
    }

    fn clear(&mut self, reason: ClearReason) -> Option<AlertTransition> {
        match core::mem::replace(&mut self.phase, AlertPhase::Idle) {
            AlertPhase::Active { sender, cycle, .. } => {
                match reason {
                    ClearReason::Dismissed => self.stats.dismissed += 1,
                    ClearReason::Expired => self.stats.expired += 1,
                }
                info!(sender = %sender, cycle, ?reason, "alert cleared");
                Some(AlertTransition::Cleared {
                    sender,
                    cycle,
                    reason,
                })
            }
            AlertPhase::Idle => None,
        }
    }

    /// Presentation view of the current phase
    pub fn state(&self) -> AlertState {
        match &self.phase {
            AlertPhase::Idle => AlertState::hidden(),
            AlertPhase::Active {
                sender, raised_at, ..
            } => AlertState {
                visible: true,
                sender_name: sender.clone(),
                raised_at: Some(*raised_at),
            },
        }
    }

    pub fn phase(&self) -> &AlertPhase {
        &self.phase
    }

    /// Deadline of the showing alert, if any
    pub fn expires_at(&self) -> Option<Timestamp> {
        match self.phase {
            AlertPhase::Active { expires_at, .. } => Some(expires_at),
            AlertPhase::Idle => None,
        }
    }

    pub fn display_duration(&self) -> Duration {
        self.display_duration
    }

    pub fn stats(&self) -> &AlertStats {
        &self.stats
    }
}

// ----------------------------------------------------------------------------
// Supporting Types
// ----------------------------------------------------------------------------

/// Counters for alert activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStats {
    pub raised: u64,
    /// Raises that replaced a still-visible alert
    pub superseded: u64,
    pub dismissed: u64,
    pub expired: u64,
    /// Raises refused for lack of a display name
    pub rejected: u64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(10_000);

    fn at(ms: u64) -> Timestamp {
        Timestamp::new(ms)
    }

    #[test]
    fn test_starts_hidden() {
        let coordinator = AlertCoordinator::new(WINDOW);
        assert_eq!(coordinator.state(), AlertState::hidden());
        assert!(coordinator.state().sender_name.is_empty());
        assert!(coordinator.expires_at().is_none());
    }

    #[test]
    fn test_blank_sender_is_rejected() {
        let mut coordinator = AlertCoordinator::new(WINDOW);
        assert_eq!(
            coordinator.raise("   ", at(0)),
            Err(FireteamError::IdentityRequired)
        );
        assert!(!coordinator.phase().is_active());
        assert_eq!(coordinator.stats().rejected, 1);
    }

    #[test]
    fn test_raise_then_expire() {
        let mut coordinator = AlertCoordinator::new(WINDOW);
        let transition = coordinator.raise("Alice", at(0)).unwrap();
        let cycle = match transition {
            AlertTransition::Raised {
                cycle, expires_at, ..
            } => {
                assert_eq!(expires_at, at(10_000));
                cycle
            }
            other => panic!("unexpected transition {:?}", other),
        };

        assert!(coordinator.expire(cycle, at(9_999)).is_none());
        assert!(coordinator.state().visible);

        let cleared = coordinator.expire(cycle, at(10_000)).unwrap();
        assert!(matches!(
            cleared,
            AlertTransition::Cleared {
                reason: ClearReason::Expired,
                ..
            }
        ));
        assert!(!coordinator.state().visible);
        // The same timer firing twice is harmless
        assert!(coordinator.expire(cycle, at(10_001)).is_none());
    }

    #[test]
    fn test_reentrant_raise_restarts_window() {
        let mut coordinator = AlertCoordinator::new(WINDOW);
        coordinator.raise("Alice", at(0)).unwrap();
        let transition = coordinator.raise("Bob", at(5_000)).unwrap();

        match transition {
            AlertTransition::Raised {
                superseded,
                expires_at,
                cycle,
                ..
            } => {
                assert_eq!(superseded.as_deref(), Some("Alice"));
                assert_eq!(expires_at, at(15_000));
                assert_eq!(cycle, 2);
            }
            other => panic!("unexpected transition {:?}", other),
        }

        // Alice's timer is stale
        assert!(coordinator.expire(1, at(10_000)).is_none());
        assert_eq!(coordinator.state().sender_name, "Bob");
        assert!(coordinator.expire_due(at(14_999)).is_none());
        assert!(coordinator.expire_due(at(15_000)).is_some());
        assert_eq!(coordinator.stats().superseded, 1);
    }

    #[test]
    fn test_dismiss_cancels_expiry() {
        let mut coordinator = AlertCoordinator::new(WINDOW);
        coordinator.raise("Alice", at(0)).unwrap();

        let cleared = coordinator.dismiss(at(3_000)).unwrap();
        assert!(matches!(
            cleared,
            AlertTransition::Cleared {
                reason: ClearReason::Dismissed,
                ..
            }
        ));
        assert!(coordinator.expire(1, at(10_000)).is_none());
        assert!(coordinator.dismiss(at(10_000)).is_none());

        let stats = coordinator.stats();
        assert_eq!((stats.dismissed, stats.expired), (1, 0));
    }

    #[test]
    fn test_late_dismiss_reports_expiry() {
        let mut coordinator = AlertCoordinator::new(WINDOW);
        coordinator.raise("Alice", at(0)).unwrap();
        let cleared = coordinator.dismiss(at(12_000)).unwrap();
        assert!(matches!(
            cleared,
            AlertTransition::Cleared {
                reason: ClearReason::Expired,
                ..
            }
        ));
    }
}
