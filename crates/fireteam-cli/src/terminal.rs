//! Terminal presentation
//!
//! Stand-ins for the mobile alert modal, vibration and local notifications:
//! everything is rendered as lines on a shared writer (stdout in the binary).

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fireteam_core::{
    AlertState, FireteamError, FireteamResult, NetworkStatus, PresenceEntry, SignalTier,
    Timestamp,
};
use fireteam_runtime::{AppEvent, ClearReason, NotificationSink, PresentationSink};

const BELL: &str = "\x07";

/// Writer shared by the sinks and the interactive loop
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

pub fn stdout_writer() -> SharedWriter {
    let stdout: Box<dyn Write + Send> = Box::new(io::stdout());
    Arc::new(Mutex::new(stdout))
}

/// Write one line and flush
pub fn write_line(out: &SharedWriter, line: &str) -> FireteamResult<()> {
    let mut out = out
        .lock()
        .map_err(|_| FireteamError::presentation("terminal writer poisoned"))?;
    writeln!(out, "{}", line)
        .and_then(|_| out.flush())
        .map_err(|e| FireteamError::presentation(format!("terminal write failed: {}", e)))
}

// ----------------------------------------------------------------------------
// Presentation Sink
// ----------------------------------------------------------------------------

/// Renders the alert modal as a banner and pulses as bell characters
#[derive(Clone)]
pub struct TerminalPresenter {
    out: SharedWriter,
    bell: bool,
}

impl TerminalPresenter {
    pub fn new(out: SharedWriter, bell: bool) -> Self {
        Self { out, bell }
    }
}

#[async_trait]
impl PresentationSink for TerminalPresenter {
    async fn present_alert(&self, sender: &str) -> FireteamResult<()> {
        let bell = if self.bell { BELL } else { "" };
        write_line(
            &self.out,
            &format!("{}!!! EMERGENCY ALERT from {} !!!  (type `dismiss`)", bell, sender),
        )
    }

    async fn present_dismiss(&self) -> FireteamResult<()> {
        write_line(&self.out, "--- alert cleared ---")
    }

    async fn pulse(&self) -> FireteamResult<()> {
        if !self.bell {
            return Ok(());
        }
        let mut out = self
            .out
            .lock()
            .map_err(|_| FireteamError::presentation("terminal writer poisoned"))?;
        out.write_all(BELL.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| FireteamError::presentation(format!("terminal write failed: {}", e)))
    }
}

// ----------------------------------------------------------------------------
// Notification Sink
// ----------------------------------------------------------------------------

#[derive(Clone)]
pub struct TerminalNotifier {
    out: SharedWriter,
}

impl TerminalNotifier {
    pub fn new(out: SharedWriter) -> Self {
        Self { out }
    }
}

#[async_trait]
impl NotificationSink for TerminalNotifier {
    async fn schedule_notification(&self, title: &str, body: &str) -> FireteamResult<()> {
        write_line(&self.out, &format!("[{}] {}", title, body))
    }
}

// ----------------------------------------------------------------------------
// Rendering
// ----------------------------------------------------------------------------

/// Roster table, one line per participant in insertion order
pub fn render_roster(entries: &[PresenceEntry], now: Timestamp) -> String {
    if entries.is_empty() {
        return "No team members on the network".to_string();
    }

    let online = entries.iter().filter(|entry| entry.is_online).count();
    let mut lines = vec![format!("Team ({} online)", online)];
    for entry in entries {
        let participant = &entry.participant;
        let status = if entry.is_online { "online" } else { "stale" };
        lines.push(format!(
            "  {:<20} {} {:>4}  {:<6} seen {}s ago{}",
            participant.display_name,
            SignalTier::from_strength(participant.signal_strength).glyph(),
            participant.signal_strength.to_string(),
            status,
            participant.age(now) / 1_000,
            participant
                .ip_address
                .as_deref()
                .map(|ip| format!("  ({})", ip))
                .unwrap_or_default(),
        ));
    }
    lines.join("\n")
}

pub fn render_network(status: &NetworkStatus) -> String {
    let mut lines = vec![status.describe()];
    lines.push(format!(
        "  internet: {}",
        if status.internet_reachable { "reachable" } else { "unreachable" }
    ));
    if let Some(ip) = &status.ip_address {
        lines.push(format!("  address:  {}", ip));
    }
    lines.join("\n")
}

pub fn render_alert(state: &AlertState) -> String {
    if state.visible {
        format!("Alert showing from {}", state.sender_name)
    } else {
        "No alert showing".to_string()
    }
}

/// One-line summary of an event for the interactive log, if worth showing
pub fn render_event(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::IdentityChanged { display_name } if display_name.is_empty() => {
            Some("Display name cleared; heartbeats stopped".to_string())
        }
        AppEvent::IdentityChanged { display_name } => {
            Some(format!("Display name set to {}", display_name))
        }
        AppEvent::NetworkChanged { status } => Some(status.describe()),
        AppEvent::AlertCleared {
            reason: ClearReason::Expired,
            sender,
        } => Some(format!("Alert from {} expired", sender)),
        AppEvent::PresenceChanged { .. }
        | AppEvent::AlertRaised { .. }
        | AppEvent::AlertCleared { .. } => None,
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
