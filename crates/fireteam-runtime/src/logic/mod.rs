//! Core Logic Module
//!
//! - `state`: the state owned by the core logic task and its counters
//! - `task`: the `CoreLogicTask` event loop
//! - `dispatcher`: ordered execution of side effects against collaborators
//!
//! All mutable state lives in the single `CoreLogicTask`. Collaborator calls
//! that may suspend (snapshot fetches, presentation, persistence) run in
//! tasks it owns, so a slow platform never delays a timer.

pub mod dispatcher;
pub mod state;
pub mod task;

pub use dispatcher::EffectDispatcher;
pub use state::{CoreState, CoreStats};
pub use task::CoreLogicTask;
