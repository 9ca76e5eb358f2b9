//! Interactive line mode
//!
//! Reads one command per line and answers through the runtime handle, while
//! interleaving runtime events (identity, network, expiry) into the output.

use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use fireteam_core::FireteamError;
use fireteam_runtime::{AppEvent, ClearReason, RuntimeHandle};

use crate::error::Result;
use crate::terminal::{
    render_alert, render_event, render_network, render_roster, write_line, SharedWriter,
};

const NAME_REQUIRED: &str = "Set a display name first: name <your name>";
const NETWORK_REQUIRED: &str = "Connect to the team WiFi to send alerts";

pub const HELP: &str = "\
Commands:
  alert          raise an emergency alert for the team
  dismiss        take down the alert that is showing
  name <name>    set your display name (`name` alone clears it)
  roster         list team members seen on the network
  status         show identity, network and alert state
  reconnect      check the network now
  help           show this help
  quit           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Alert,
    Dismiss,
    Name(String),
    Roster,
    Status,
    Reconnect,
    Help,
    Quit,
}

/// Parse one input line; `Ok(None)` for a blank line
pub fn parse_command(line: &str) -> std::result::Result<Option<InteractiveCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "alert" | "a" => InteractiveCommand::Alert,
        "dismiss" | "d" => InteractiveCommand::Dismiss,
        "name" => InteractiveCommand::Name(rest.to_string()),
        "roster" | "r" => InteractiveCommand::Roster,
        "status" | "s" => InteractiveCommand::Status,
        "reconnect" => InteractiveCommand::Reconnect,
        "help" | "?" => InteractiveCommand::Help,
        "quit" | "exit" | "q" => InteractiveCommand::Quit,
        other => return Err(format!("Unknown command `{}`; type `help`", other)),
    };
    Ok(Some(command))
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

pub struct Session {
    handle: RuntimeHandle,
    events: broadcast::Receiver<AppEvent>,
    out: SharedWriter,
}

impl Session {
    pub fn new(handle: RuntimeHandle, out: SharedWriter) -> Self {
        let events = handle.subscribe();
        Self {
            handle,
            events,
            out,
        }
    }

    /// Serve commands from `input` until `quit`, end of input or `shutdown`
    pub async fn run<R, F>(&mut self, input: R, shutdown: F) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("interactive session interrupted");
                    break;
                }
                event = self.events.recv() => match event {
                    Ok(event) => {
                        if let Some(line) = render_event(&event) {
                            write_line(&self.out, &line)?;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "event display lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_command(&line) {
                        Ok(Some(InteractiveCommand::Quit)) => break,
                        Ok(Some(command)) => self.execute(command).await?,
                        Ok(None) => {}
                        Err(message) => write_line(&self.out, &message)?,
                    }
                }
            }
        }
        Ok(())
    }

    pub async fn execute(&self, command: InteractiveCommand) -> Result<()> {
        let reply = match command {
            InteractiveCommand::Alert => match alert_refusal(&self.handle).await? {
                Some(refusal) => refusal.to_string(),
                None => match self.handle.send_alert().await {
                    Ok(_) => "Alert sent to the team".to_string(),
                    Err(FireteamError::IdentityRequired) => NAME_REQUIRED.to_string(),
                    Err(e) => return Err(e.into()),
                },
            },
            InteractiveCommand::Dismiss => match self.handle.dismiss_alert().await? {
                Some(ClearReason::Dismissed) => "Alert dismissed".to_string(),
                Some(ClearReason::Expired) => "Alert had already expired".to_string(),
                None => "No alert showing".to_string(),
            },
            InteractiveCommand::Name(name) => {
                let identity = self.handle.set_identity(&name).await?;
                if identity.is_set() {
                    format!("You are {}", identity.display_name)
                } else {
                    "Display name cleared".to_string()
                }
            }
            InteractiveCommand::Roster => {
                let entries = self.handle.presence_snapshot().await?;
                render_roster(&entries, self.handle.now())
            }
            InteractiveCommand::Status => self.status_report().await?,
            InteractiveCommand::Reconnect => render_network(&self.handle.reconnect().await?),
            InteractiveCommand::Help => HELP.to_string(),
            InteractiveCommand::Quit => return Ok(()),
        };
        write_line(&self.out, &reply)?;
        Ok(())
    }

    async fn status_report(&self) -> Result<String> {
        let identity = self.handle.identity_state().await?;
        let network = self.handle.network_status().await?;
        let alert = self.handle.alert_state().await?;
        let can_alert = self.handle.can_send_alert().await?;

        let name = if identity.is_set() {
            identity.display_name.as_str()
        } else {
            "(not set)"
        };
        Ok(format!(
            "Name:    {}\nNetwork: {}\nAlert:   {}\nAlert button {}",
            name,
            render_network(&network),
            render_alert(&alert),
            if can_alert { "enabled" } else { "disabled" }
        ))
    }
}

/// Why the alert button is disabled, if it is
async fn alert_refusal(handle: &RuntimeHandle) -> Result<Option<&'static str>> {
    if handle.can_send_alert().await? {
        return Ok(None);
    }
    if handle.identity_state().await?.is_set() {
        Ok(Some(NETWORK_REQUIRED))
    } else {
        Ok(Some(NAME_REQUIRED))
    }
}

// ----------------------------------------------------------------------------
// Alert Hold
// ----------------------------------------------------------------------------

/// Check the network, raise an alert and wait for Enter (dismiss) or expiry
///
/// Nothing is raised when the alert button would be disabled.
pub async fn hold_alert<R>(handle: &RuntimeHandle, input: R, out: &SharedWriter) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    handle.reconnect().await?;
    if let Some(refusal) = alert_refusal(handle).await? {
        write_line(out, refusal)?;
        return Ok(());
    }

    let mut events = handle.subscribe();
    let state = handle.send_alert().await?;
    write_line(
        out,
        &format!("Alert raised as {}; press Enter to dismiss", state.sender_name),
    )?;

    let mut lines = input.lines();
    let mut input_open = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                if line?.is_some() {
                    handle.dismiss_alert().await?;
                    break;
                }
                // No terminal attached; only expiry ends the alert
                input_open = false;
            }
            event = events.recv() => match event {
                Ok(AppEvent::AlertCleared { .. }) => break,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "missed runtime events while holding alert");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}
