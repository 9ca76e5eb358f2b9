//! Channel message types
//!
//! - [`Command`]: handle → core logic, each carrying its reply sender
//! - [`Effect`]: core logic → effect dispatcher, executed in order
//! - [`AppEvent`]: core logic → subscribers, a hint to re-read state

use fireteam_core::{
    AlertState, ClearReason, FireteamResult, IdentityState, NetworkStatus, Notification,
    PresenceEntry, Timestamp,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::logic::CoreStats;

// ----------------------------------------------------------------------------
// Commands
// ----------------------------------------------------------------------------

pub type Reply<T> = oneshot::Sender<T>;

/// Requests processed by the core logic task
#[derive(Debug)]
pub enum Command {
    SetIdentity {
        name: String,
        reply: Reply<IdentityState>,
    },
    GetIdentity {
        reply: Reply<IdentityState>,
    },
    GetPresence {
        reply: Reply<Vec<PresenceEntry>>,
    },
    SendAlert {
        reply: Reply<FireteamResult<AlertState>>,
    },
    DismissAlert {
        reply: Reply<Option<ClearReason>>,
    },
    GetAlertState {
        reply: Reply<AlertState>,
    },
    Reconnect {
        reply: Reply<NetworkStatus>,
    },
    GetNetworkStatus {
        reply: Reply<NetworkStatus>,
    },
    GetStats {
        reply: Reply<CoreStats>,
    },
    Shutdown,
}

impl Command {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Command::SetIdentity { .. } => "set_identity",
            Command::GetIdentity { .. } => "get_identity",
            Command::GetPresence { .. } => "get_presence",
            Command::SendAlert { .. } => "send_alert",
            Command::DismissAlert { .. } => "dismiss_alert",
            Command::GetAlertState { .. } => "get_alert_state",
            Command::Reconnect { .. } => "reconnect",
            Command::GetNetworkStatus { .. } => "get_network_status",
            Command::GetStats { .. } => "get_stats",
            Command::Shutdown => "shutdown",
        }
    }
}

// ----------------------------------------------------------------------------
// Effects
// ----------------------------------------------------------------------------

/// Side effects dispatched to collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PresentAlert { sender: String },
    PresentDismiss,
    Pulse,
    Notify(Notification),
    SaveIdentity { name: String },
}

// ----------------------------------------------------------------------------
// App Events
// ----------------------------------------------------------------------------

/// State-change notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    IdentityChanged { display_name: String },
    PresenceChanged { participants: usize, online: usize },
    NetworkChanged { status: NetworkStatus },
    AlertRaised { sender: String, raised_at: Timestamp },
    AlertCleared { sender: String, reason: ClearReason },
}
