//! Command handlers for the FireTeam CLI

use tokio::io::BufReader;
use tracing::{info, warn};

use fireteam_runtime::{FireteamRuntime, IdentityStore};

use crate::app::FireteamApp;
use crate::cli::{Commands, IdentityAction};
use crate::error::Result;
use crate::interactive::{hold_alert, Session, HELP};
use crate::terminal::{render_network, write_line};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(command: Commands, app: FireteamApp) -> Result<()> {
        match command {
            Commands::Run { name } => Self::handle_run_command(app, name).await,
            Commands::Identity { action } => Self::handle_identity_command(app, action).await,
            Commands::Status => Self::handle_status_command(app).await,
            Commands::Alert { name } => Self::handle_alert_command(app, name).await,
            Commands::Config => Self::handle_config_command(app),
        }
    }

    /// Start the runtime, applying a display name given on the command line
    async fn start(app: &FireteamApp, name: Option<String>) -> Result<FireteamRuntime> {
        let runtime = app.start_runtime().await?;
        if let Some(name) = name {
            runtime.handle()?.set_identity(&name).await?;
        }
        Ok(runtime)
    }

    /// Handle the interactive run command
    async fn handle_run_command(app: FireteamApp, name: Option<String>) -> Result<()> {
        let mut runtime = Self::start(&app, name).await?;
        let handle = runtime.handle()?;
        let out = app.writer();

        let identity = handle.identity_state().await?;
        if identity.is_set() {
            write_line(&out, &format!("Joined as {}", identity.display_name))?;
        } else {
            write_line(&out, "No display name yet: name <your name>")?;
        }
        write_line(&out, HELP)?;

        let mut session = Session::new(handle, out);
        let stdin = BufReader::new(tokio::io::stdin());
        let result = session
            .run(stdin, async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            })
            .await;

        runtime.stop().await?;
        info!("FireTeam runtime stopped");
        result
    }

    /// Handle the identity command without starting a runtime
    async fn handle_identity_command(app: FireteamApp, action: IdentityAction) -> Result<()> {
        let store = app.identity_store();
        let out = app.writer();

        match action {
            IdentityAction::Show => match store.load_identity().await? {
                Some(name) => write_line(&out, &name)?,
                None => write_line(&out, "(not set)")?,
            },
            IdentityAction::Set { name } => {
                store.save_identity(&name).await?;
                match store.load_identity().await? {
                    Some(saved) => write_line(&out, &format!("Display name saved: {}", saved))?,
                    None => write_line(&out, "Display name cleared")?,
                }
            }
            IdentityAction::Clear => {
                store.save_identity("").await?;
                write_line(&out, "Display name cleared")?;
            }
        }
        Ok(())
    }

    /// Handle the status command: one probe, classified
    async fn handle_status_command(app: FireteamApp) -> Result<()> {
        let out = app.writer();
        let (connection_type, status) = app.probe_network().await?;

        write_line(&out, "FireTeam Network Status")?;
        write_line(&out, "=======================")?;
        write_line(&out, &format!("Connection: {}", connection_type))?;
        write_line(&out, &render_network(&status))?;
        write_line(
            &out,
            &format!(
                "Qualifying types: {}",
                app.config().fireteam.presence.qualifying_types.join(", ")
            ),
        )?;
        Ok(())
    }

    /// Handle the alert command: raise, then hold until Enter or expiry
    async fn handle_alert_command(app: FireteamApp, name: Option<String>) -> Result<()> {
        let mut runtime = Self::start(&app, name).await?;
        let handle = runtime.handle()?;
        let out = app.writer();

        let stdin = BufReader::new(tokio::io::stdin());
        let result = hold_alert(&handle, stdin, &out).await;

        runtime.stop().await?;
        result
    }

    fn handle_config_command(app: FireteamApp) -> Result<()> {
        let printed = app.config().to_toml()?;
        write_line(&app.writer(), printed.trim_end())?;
        Ok(())
    }
}
