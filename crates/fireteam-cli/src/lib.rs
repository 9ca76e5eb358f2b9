//! FireTeam CLI library
//!
//! Terminal front end for the FireTeam presence and alert runtime: host
//! network probing, a JSON state file for the display name, terminal
//! presentation sinks and the interactive line mode.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod interactive;
pub mod network;
pub mod state;
pub mod terminal;

pub use app::FireteamApp;
pub use cli::{Cli, Commands, IdentityAction};
pub use config::AppConfig;
pub use error::{CliError, Result};
