//! Tokio-anchored time source
//!
//! Wall-clock milliseconds derived from tokio's monotonic clock. Under
//! `tokio::time::pause` the timestamps advance only with virtual time, so
//! scheduler timers and the timestamps stored in the registry stay in step.

use fireteam_core::{TimeSource, Timestamp};
use tokio::time::Instant;

/// [`TimeSource`] reading tokio's clock
#[derive(Debug, Clone, Copy)]
pub struct TokioTimeSource {
    anchor: Instant,
    anchor_millis: u64,
}

impl TokioTimeSource {
    /// Anchor to the current wall-clock time
    pub fn new() -> Self {
        Self::starting_at(Timestamp::now())
    }

    /// Anchor so that the current instant reads as `start`
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            anchor: Instant::now(),
            anchor_millis: start.as_millis(),
        }
    }
}

impl Default for TokioTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TokioTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.anchor_millis) + self.anchor.elapsed()
    }
}
