//! FireTeam Core
//!
//! Pure, synchronous building blocks of the FireTeam presence and alert
//! coordination subsystem:
//! - `signal`: classification of network snapshots into a coarse signal score
//! - `presence`: the registry of participants seen on the local network
//! - `alert`: the Idle/Active alert state machine with auto-expiry
//! - `identity`: display name normalization and the persisted identity record
//!
//! Nothing in this crate performs I/O or owns a timer. Every time-dependent
//! operation takes the current [`Timestamp`] as an argument, which keeps the
//! state machines deterministic under test. The async orchestration lives in
//! `fireteam-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod alert;
pub mod config;
pub mod errors;
pub mod identity;
pub mod network;
pub mod notification;
pub mod presence;
pub mod signal;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use alert::{AlertCoordinator, AlertPhase, AlertState, AlertStats, AlertTransition, ClearReason};
pub use config::{AlertConfig, ChannelConfig, FireteamConfig, NotificationConfig, PresenceConfig};
pub use errors::{FireteamError, FireteamResult};
pub use identity::{normalize_display_name, IdentityRecord, IdentityState, IDENTITY_STORAGE_KEY};
pub use network::{NetworkSnapshot, NetworkStatus, PlatformNetworkState};
pub use notification::{Notification, PresenceNotice};
pub use presence::{Participant, PresenceEntry, PresenceRegistry, RegistryStats};
pub use signal::{Classification, SignalClassifier, SignalStrength, SignalTier};
pub use types::{DeviceId, SystemTimeSource, TimeSource, Timestamp};
