//! Notification content
//!
//! Texts for the outward notifications FireTeam schedules. Delivery is local
//! only; see DESIGN.md on the missing peer transport.

use serde::{Deserialize, Serialize};

/// Default notification title
pub const DEFAULT_TITLE: &str = "FireTeam";

/// What happened to the local participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PresenceNotice {
    Joined,
    Left,
    Alert,
}

impl PresenceNotice {
    pub fn body(&self, name: &str) -> String {
        match self {
            PresenceNotice::Joined => format!("{} joined the network", name),
            PresenceNotice::Left => format!("{} left the network", name),
            PresenceNotice::Alert => format!("ALERT raised by {}", name),
        }
    }
}

/// A ready-to-schedule notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, notice: PresenceNotice, name: &str) -> Self {
        Self {
            title: title.into(),
            body: notice.body(name),
        }
    }
}
