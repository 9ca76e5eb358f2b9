//! FireTeam Runtime
//!
//! The async orchestration around `fireteam-core`:
//! - `FireteamRuntime`: lifecycle of the core logic task and effect dispatcher
//! - `CoreLogicTask`: single owner of all state, driven by commands and timers
//! - `HeartbeatScheduler` / `AlertTimer`: named, cancellable timers on tokio's clock
//! - collaborator traits for network sensing, presentation, notifications and
//!   identity persistence
//!
//! `fireteam-core` holds the pure state machines; this crate decides when they
//! run and carries their side effects out to the platform.

pub mod builder;
pub mod channel;
pub mod clock;
pub mod collaborators;
pub mod logic;
mod runtime;
pub mod scheduler;
pub mod stores;

pub use builder::{RuntimeBuilder, RuntimeHandle};
pub use channel::{AppEvent, Command, Effect};
pub use clock::TokioTimeSource;
pub use collaborators::{
    Collaborators, IdentityStore, KeyValueStore, NetworkSnapshotSource, NotificationSink,
    OfflineNetworkSource, PresentationSink, SilentSink,
};
pub use logic::CoreStats;
pub use runtime::FireteamRuntime;
pub use scheduler::{AlertTimer, HeartbeatScheduler, PeriodicTask};
pub use stores::{KeyValueIdentityStore, MemoryKeyValueStore};

// Re-export core types for convenience
pub use fireteam_core::{
    AlertState, ClearReason, DeviceId, FireteamConfig, FireteamError, FireteamResult,
    IdentityState, NetworkSnapshot, NetworkStatus, PresenceEntry,
};
