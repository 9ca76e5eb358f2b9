//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Data directory for the stored identity
    #[arg(short, long, global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join the team and run interactively
    Run {
        /// Display name to use for this session (saved)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show or change the stored display name
    Identity {
        #[command(subcommand)]
        action: IdentityAction,
    },
    /// Probe the network once and show how it classifies
    Status,
    /// Raise an alert and hold it until Enter or expiry
    Alert {
        /// Display name to raise the alert as (saved)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum IdentityAction {
    /// Print the stored display name
    Show,
    /// Store a new display name
    Set { name: String },
    /// Forget the stored display name
    Clear,
}
