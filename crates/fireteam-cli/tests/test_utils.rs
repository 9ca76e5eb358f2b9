//! Test utilities for the FireTeam CLI
//!
//! Output capture, a fixed network source and a runtime wired to the terminal
//! sinks.

#![allow(dead_code)]

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fireteam_cli::terminal::{SharedWriter, TerminalNotifier, TerminalPresenter};
use fireteam_core::{FireteamResult, NetworkSnapshot};
use fireteam_runtime::{
    FireteamRuntime, NetworkSnapshotSource, OfflineNetworkSource, RuntimeBuilder,
};

/// In-memory stand-in for stdout
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writer(&self) -> SharedWriter {
        let capture: Box<dyn Write + Send> = Box::new(self.clone());
        Arc::new(Mutex::new(capture))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Always on the team WiFi with internet
#[derive(Clone, Copy, Default)]
pub struct TeamWifi;

#[async_trait]
impl NetworkSnapshotSource for TeamWifi {
    async fn fetch_snapshot(&self) -> FireteamResult<NetworkSnapshot> {
        Ok(NetworkSnapshot {
            is_qualifying_network: true,
            ssid: Some("engine-house".to_string()),
            internet_reachable: true,
            ip_address: Some("192.168.4.20".to_string()),
        })
    }
}

/// Builder rendering to `capture` with the bell disabled
pub fn terminal_builder(capture: &Capture) -> RuntimeBuilder {
    RuntimeBuilder::for_testing()
        .with_network_source(TeamWifi)
        .with_presentation(TerminalPresenter::new(capture.writer(), false))
        .with_notifications(TerminalNotifier::new(capture.writer()))
}

/// Started runtime on the team WiFi rendering to `capture`
pub async fn terminal_runtime(capture: &Capture) -> FireteamRuntime {
    terminal_builder(capture)
        .start()
        .await
        .expect("Failed to start runtime")
}

/// Started runtime with no network at all
pub async fn offline_runtime(capture: &Capture) -> FireteamRuntime {
    terminal_builder(capture)
        .with_network_source(OfflineNetworkSource)
        .start()
        .await
        .expect("Failed to start runtime")
}

/// Let the effect dispatcher catch up
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(10)).await;
}

pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fireteam-cli-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
