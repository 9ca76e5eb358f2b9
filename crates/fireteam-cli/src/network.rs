//! Host network sensing
//!
//! [`SystemNetworkSource`] samples the machine it runs on and produces the
//! same loosely-typed [`PlatformNetworkState`] a mobile platform would, then
//! normalizes it with the configured qualifying connection types.
//!
//! Interface kinds come from sysfs (`/sys/class/net`): an interface that is
//! up and has a `wireless` entry is WiFi, one backed by a `device` is
//! ethernet. Virtual interfaces (bridges, tunnels, `lo`) are ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::net::{TcpStream, UdpSocket};
use tokio::process::Command;
use tracing::debug;

use fireteam_core::{FireteamError, FireteamResult, NetworkSnapshot, PlatformNetworkState};
use fireteam_runtime::NetworkSnapshotSource;

use crate::config::NetworkProbeConfig;

const DEFAULT_SYS_NET: &str = "/sys/class/net";

/// Connection kind of one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InterfaceKind {
    Wifi,
    Ethernet,
}

impl InterfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceKind::Wifi => "wifi",
            InterfaceKind::Ethernet => "ethernet",
        }
    }
}

// ----------------------------------------------------------------------------
// System Network Source
// ----------------------------------------------------------------------------

pub struct SystemNetworkSource {
    probe: NetworkProbeConfig,
    qualifying_types: Vec<String>,
    sys_net: PathBuf,
}

impl SystemNetworkSource {
    pub fn new(probe: NetworkProbeConfig, qualifying_types: Vec<String>) -> Self {
        Self {
            probe,
            qualifying_types,
            sys_net: PathBuf::from(DEFAULT_SYS_NET),
        }
    }

    /// Read interfaces from another sysfs-shaped directory
    pub fn with_sys_net<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.sys_net = path.into();
        self
    }

    /// Sample the host into a raw platform report
    pub async fn probe_state(&self) -> FireteamResult<PlatformNetworkState> {
        let kind = active_interface_kind(&self.sys_net).await.map_err(|e| {
            FireteamError::network_unavailable(format!(
                "Cannot list interfaces in {}: {}",
                self.sys_net.display(),
                e
            ))
        })?;

        let Some(kind) = kind else {
            return Ok(PlatformNetworkState {
                connection_type: "none".to_string(),
                is_connected: Some(false),
                is_internet_reachable: Some(false),
                details: None,
                ip_address: None,
            });
        };

        let ip_address = outbound_ip(&self.probe.route_probe_addr).await;
        let ssid = match kind {
            InterfaceKind::Wifi => current_ssid(&self.probe.ssid_command).await,
            InterfaceKind::Ethernet => None,
        };
        let reachable =
            internet_reachable(&self.probe.reachability_host, self.probe.reachability_timeout())
                .await;

        debug!(
            kind = kind.as_str(),
            ssid = ssid.as_deref().unwrap_or(""),
            ip = ip_address.as_deref().unwrap_or(""),
            reachable,
            "host network probed"
        );

        Ok(PlatformNetworkState {
            connection_type: kind.as_str().to_string(),
            is_connected: Some(true),
            is_internet_reachable: Some(reachable),
            details: ssid.map(|ssid| json!({ "ssid": ssid })),
            ip_address,
        })
    }
}

#[async_trait]
impl NetworkSnapshotSource for SystemNetworkSource {
    async fn fetch_snapshot(&self) -> FireteamResult<NetworkSnapshot> {
        let state = self.probe_state().await?;
        Ok(state.normalize_with(&self.qualifying_types))
    }
}

// ----------------------------------------------------------------------------
// Probes
// ----------------------------------------------------------------------------

/// Best kind among interfaces that are up; WiFi wins over ethernet
pub async fn active_interface_kind(sys_net: &Path) -> std::io::Result<Option<InterfaceKind>> {
    let mut best: Option<InterfaceKind> = None;
    let mut entries = tokio::fs::read_dir(sys_net).await?;

    while let Some(entry) = entries.next_entry().await? {
        let dir = entry.path();
        if entry.file_name() == "lo" || !is_up(&dir).await {
            continue;
        }
        let kind = if path_exists(&dir.join("wireless")).await {
            InterfaceKind::Wifi
        } else if path_exists(&dir.join("device")).await {
            InterfaceKind::Ethernet
        } else {
            continue;
        };
        best = Some(best.map_or(kind, |current| current.min(kind)));
    }

    Ok(best)
}

async fn is_up(dir: &Path) -> bool {
    match tokio::fs::read_to_string(dir.join("operstate")).await {
        Ok(state) => state.trim() == "up",
        Err(_) => false,
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

/// Local address of the interface that routes to `probe_addr`
///
/// Connecting a UDP socket only selects a route; no packet is sent.
pub async fn outbound_ip(probe_addr: &str) -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    socket.connect(probe_addr).await.ok()?;
    let ip = socket.local_addr().ok()?.ip();
    if ip.is_unspecified() {
        None
    } else {
        Some(ip.to_string())
    }
}

async fn current_ssid(command: &str) -> Option<String> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    let output = Command::new(program).args(parts).output().await.ok()?;
    if !output.status.success() {
        debug!(command, "ssid command failed");
        return None;
    }
    let ssid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Some(ssid).filter(|ssid| !ssid.is_empty())
}

async fn internet_reachable(host: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(host)).await,
        Ok(Ok(_))
    )
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_sys_net(name: &str, interfaces: &[(&str, &str, bool, bool)]) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "fireteam-sysnet-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        for (iface, operstate, wireless, device) in interfaces {
            let dir = root.join(iface);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("operstate"), format!("{}\n", operstate)).unwrap();
            if *wireless {
                std::fs::create_dir_all(dir.join("wireless")).unwrap();
            }
            if *device {
                std::fs::create_dir_all(dir.join("device")).unwrap();
            }
        }
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    fn offline_probe() -> NetworkProbeConfig {
        NetworkProbeConfig {
            route_probe_addr: "127.0.0.1:9".to_string(),
            reachability_host: "127.0.0.1:1".to_string(),
            reachability_timeout_ms: 200,
            ssid_command: "fireteam-no-such-command".to_string(),
        }
    }

    #[tokio::test]
    async fn test_wifi_preferred_over_ethernet() {
        let root = fake_sys_net(
            "both",
            &[
                ("lo", "unknown", false, false),
                ("eth0", "up", false, true),
                ("wlan0", "up", true, true),
            ],
        );
        assert_eq!(
            active_interface_kind(&root).await.unwrap(),
            Some(InterfaceKind::Wifi)
        );
    }

    #[tokio::test]
    async fn test_down_and_virtual_interfaces_ignored() {
        let root = fake_sys_net(
            "virtual",
            &[
                ("wlan0", "down", true, true),
                ("docker0", "up", false, false),
                ("eth0", "up", false, true),
            ],
        );
        assert_eq!(
            active_interface_kind(&root).await.unwrap(),
            Some(InterfaceKind::Ethernet)
        );

        let root = fake_sys_net("none", &[("wlan0", "dormant", true, true)]);
        assert_eq!(active_interface_kind(&root).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_interfaces_reports_not_qualifying() {
        let root = fake_sys_net("empty", &[]);
        let source = SystemNetworkSource::new(offline_probe(), vec!["wifi".to_string()])
            .with_sys_net(root);

        let snapshot = source.fetch_snapshot().await.unwrap();
        assert!(!snapshot.is_qualifying_network);
        assert_eq!(snapshot.ssid, None);
    }

    #[tokio::test]
    async fn test_ethernet_qualifies_only_when_configured() {
        let root = fake_sys_net("wired", &[("eth0", "up", false, true)]);

        let wifi_only = SystemNetworkSource::new(offline_probe(), vec!["wifi".to_string()])
            .with_sys_net(&root);
        assert!(!wifi_only.fetch_snapshot().await.unwrap().is_qualifying_network);

        let wired_ok = SystemNetworkSource::new(
            offline_probe(),
            vec!["wifi".to_string(), "ethernet".to_string()],
        )
        .with_sys_net(&root);
        let snapshot = wired_ok.fetch_snapshot().await.unwrap();
        assert!(snapshot.is_qualifying_network);
        assert!(!snapshot.internet_reachable);
    }

    #[tokio::test]
    async fn test_missing_sysfs_is_network_unavailable() {
        let source = SystemNetworkSource::new(offline_probe(), vec!["wifi".to_string()])
            .with_sys_net("/nonexistent/fireteam/sys/class/net");
        assert!(matches!(
            source.fetch_snapshot().await,
            Err(FireteamError::NetworkUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_ssid_command_arguments_are_passed() {
        assert_eq!(
            current_ssid("echo  engine-house").await,
            Some("engine-house".to_string())
        );
        assert_eq!(current_ssid("true").await, None);
        assert_eq!(current_ssid("   ").await, None);
    }
}
