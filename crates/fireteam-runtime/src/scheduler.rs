//! Named timers owned by the core logic task
//!
//! [`PeriodicTask`] wraps a tokio interval that can be armed and cancelled
//! at will; an unarmed task never ticks. [`AlertTimer`] is a one-shot
//! deadline tagged with the alert cycle it was armed for. Both are plain
//! values polled from the core task's `select!` loop, so dropping the task
//! drops every timer with it.

use std::future;
use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::debug;

use fireteam_core::PresenceConfig;

// ----------------------------------------------------------------------------
// Periodic Task
// ----------------------------------------------------------------------------

/// A named, cancellable fixed-period timer
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    period: Duration,
    interval: Option<Interval>,
}

impl PeriodicTask {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period,
            interval: None,
        }
    }

    /// Start ticking; the first tick is due now when `immediate`, otherwise
    /// one period from now. Re-arming restarts the phase.
    pub fn arm(&mut self, immediate: bool) {
        let start = if immediate {
            Instant::now()
        } else {
            Instant::now() + self.period
        };
        let mut interval = time::interval_at(start, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
        debug!(
            task = self.name,
            period_ms = self.period.as_millis() as u64,
            immediate,
            "timer armed"
        );
    }

    pub fn cancel(&mut self) {
        if self.interval.take().is_some() {
            debug!(task = self.name, "timer cancelled");
        }
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next tick; pending forever while unarmed
    pub async fn tick(&mut self) -> Instant {
        match self.interval.as_mut() {
            Some(interval) => interval.tick().await,
            None => future::pending().await,
        }
    }
}

// ----------------------------------------------------------------------------
// Heartbeat Scheduler
// ----------------------------------------------------------------------------

/// The broadcast and prune timers
///
/// Broadcast follows identity: armed (with an immediate first tick) while a
/// display name is set. Prune runs for the lifetime of the runtime.
#[derive(Debug)]
pub struct HeartbeatScheduler {
    pub broadcast: PeriodicTask,
    pub prune: PeriodicTask,
}

impl HeartbeatScheduler {
    pub fn new(config: &PresenceConfig) -> Self {
        Self {
            broadcast: PeriodicTask::new("broadcast", config.broadcast_interval()),
            prune: PeriodicTask::new("prune", config.prune_interval()),
        }
    }

    /// Arm the prune timer, and the broadcast timer when identity is present
    pub fn activate(&mut self, identity_set: bool) {
        self.prune.arm(false);
        self.set_identity_present(identity_set);
    }

    /// Follow an identity change. Only the empty/non-empty edge touches the
    /// broadcast timer; renaming keeps the current phase.
    pub fn set_identity_present(&mut self, present: bool) {
        match (present, self.broadcast.is_armed()) {
            (true, false) => self.broadcast.arm(true),
            (false, true) => self.broadcast.cancel(),
            _ => {}
        }
    }

    pub fn shutdown(&mut self) {
        self.broadcast.cancel();
        self.prune.cancel();
    }
}

// ----------------------------------------------------------------------------
// Alert Timer
// ----------------------------------------------------------------------------

/// One-shot deadline for the visible alert
#[derive(Debug, Default)]
pub struct AlertTimer {
    deadline: Option<(Instant, u64)>,
}

impl AlertTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire for `cycle` after `delay`, replacing any earlier deadline
    pub fn arm(&mut self, cycle: u64, delay: Duration) {
        self.deadline = Some((Instant::now() + delay, cycle));
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve with the armed cycle once the deadline passes
    ///
    /// The deadline stays set; the caller decides whether to cancel or re-arm.
    pub async fn fired(&self) -> u64 {
        match self.deadline {
            Some((deadline, cycle)) => {
                time::sleep_until(deadline).await;
                cycle
            }
            None => future::pending().await,
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
