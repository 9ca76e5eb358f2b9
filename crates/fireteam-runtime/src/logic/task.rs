//! Core Logic Task Implementation
//!
//! Contains the CoreLogicTask struct and its event loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use fireteam_core::{
    AlertPhase, AlertState, AlertTransition, ClearReason, FireteamConfig, FireteamError,
    FireteamResult, IdentityState, NetworkSnapshot, NetworkStatus, Notification, Participant,
    PresenceNotice, TimeSource, Timestamp,
};

use super::state::CoreState;
use crate::channel::{AppEvent, Command, Effect, Reply};
use crate::collaborators::NetworkSnapshotSource;
use crate::scheduler::{AlertTimer, HeartbeatScheduler, PeriodicTask};

// ----------------------------------------------------------------------------
// Snapshot Fetches
// ----------------------------------------------------------------------------

/// Why a snapshot was requested
enum FetchPurpose {
    Heartbeat,
    Reconnect(Reply<NetworkStatus>),
}

struct FetchOutcome {
    purpose: FetchPurpose,
    result: FireteamResult<NetworkSnapshot>,
}

// ----------------------------------------------------------------------------
// Core Logic Task
// ----------------------------------------------------------------------------

/// The single owner of registry, alert and identity state
///
/// Commands, timer ticks and fetch results are handled one at a time. Timers
/// are polled first so that a query never observes a deadline that has
/// already passed but not yet been processed.
pub struct CoreLogicTask {
    state: CoreState,
    config: FireteamConfig,
    time_source: Arc<dyn TimeSource>,
    network_source: Arc<dyn NetworkSnapshotSource>,
    scheduler: HeartbeatScheduler,
    alert_timer: AlertTimer,
    haptic: PeriodicTask,
    /// At most one heartbeat fetch at a time
    heartbeats: JoinSet<FetchOutcome>,
    reconnects: JoinSet<FetchOutcome>,
    command_receiver: mpsc::Receiver<Command>,
    effect_sender: mpsc::Sender<Effect>,
    app_event_sender: broadcast::Sender<AppEvent>,
    running: bool,
}

impl CoreLogicTask {
    pub fn new(
        state: CoreState,
        config: FireteamConfig,
        time_source: Arc<dyn TimeSource>,
        network_source: Arc<dyn NetworkSnapshotSource>,
        command_receiver: mpsc::Receiver<Command>,
        effect_sender: mpsc::Sender<Effect>,
        app_event_sender: broadcast::Sender<AppEvent>,
    ) -> Self {
        let scheduler = HeartbeatScheduler::new(&config.presence);
        let haptic = PeriodicTask::new(
            "haptic",
            Duration::from_millis(config.alerts.haptic_pulse_interval_ms),
        );

        Self {
            state,
            config,
            time_source,
            network_source,
            scheduler,
            alert_timer: AlertTimer::new(),
            haptic,
            heartbeats: JoinSet::new(),
            reconnects: JoinSet::new(),
            command_receiver,
            effect_sender,
            app_event_sender,
            running: true,
        }
    }

    /// Run the loop until shutdown or until every handle is gone
    pub async fn run(mut self) -> FireteamResult<()> {
        info!(device_id = %self.state.device_id, "Core Logic task starting");
        self.scheduler.activate(self.state.identity.is_set());

        while self.running {
            tokio::select! {
                biased;

                cycle = self.alert_timer.fired() => {
                    self.on_alert_deadline(cycle);
                }

                _ = self.scheduler.broadcast.tick() => {
                    self.on_broadcast_tick();
                }

                _ = self.scheduler.prune.tick() => {
                    self.on_prune_tick();
                }

                _ = self.haptic.tick() => {
                    self.dispatch(Effect::Pulse);
                }

                Some(joined) = self.heartbeats.join_next(), if !self.heartbeats.is_empty() => {
                    match joined {
                        Ok(outcome) => self.on_fetch_completed(outcome),
                        Err(e) => warn!(error = %e, "heartbeat fetch task failed"),
                    }
                }

                Some(joined) = self.reconnects.join_next(), if !self.reconnects.is_empty() => {
                    match joined {
                        Ok(outcome) => self.on_fetch_completed(outcome),
                        Err(e) => warn!(error = %e, "reconnect fetch task failed"),
                    }
                }

                command = self.command_receiver.recv() => {
                    match command {
                        Some(cmd) => self.process_command(cmd),
                        None => {
                            info!("Command channel closed, shutting down");
                            self.running = false;
                        }
                    }
                }
            }
        }

        self.shutdown();
        info!("Core Logic task stopped");
        Ok(())
    }

    fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    fn process_command(&mut self, command: Command) {
        self.state.stats.commands_processed += 1;
        debug!(command = command.kind(), "processing command");

        match command {
            Command::SetIdentity { name, reply } => {
                let identity = self.set_identity(&name);
                let _ = reply.send(identity);
            }
            Command::GetIdentity { reply } => {
                let _ = reply.send(self.state.identity.clone());
            }
            Command::GetPresence { reply } => {
                let now = self.now();
                let roster = self
                    .state
                    .registry
                    .snapshot(now, self.config.presence.timeout());
                let _ = reply.send(roster);
            }
            Command::SendAlert { reply } => {
                let _ = reply.send(self.send_alert());
            }
            Command::DismissAlert { reply } => {
                let _ = reply.send(self.dismiss_alert());
            }
            Command::GetAlertState { reply } => {
                let _ = reply.send(self.alert_state());
            }
            Command::Reconnect { reply } => {
                self.spawn_fetch(FetchPurpose::Reconnect(reply));
            }
            Command::GetNetworkStatus { reply } => {
                let _ = reply.send(self.state.network.clone());
            }
            Command::GetStats { reply } => {
                let _ = reply.send(self.state.stats_snapshot());
            }
            Command::Shutdown => {
                if self.state.network.qualifying {
                    self.announce(
                        PresenceNotice::Left,
                        self.config.notifications.announce_disconnect,
                    );
                }
                self.running = false;
            }
        }
    }

    fn set_identity(&mut self, name: &str) -> IdentityState {
        let identity = IdentityState::new(name);
        if identity == self.state.identity {
            return identity;
        }

        info!(display_name = %identity.display_name, "identity changed");
        self.state.identity = identity.clone();
        self.scheduler.set_identity_present(identity.is_set());
        self.dispatch(Effect::SaveIdentity {
            name: identity.display_name.clone(),
        });
        self.emit(AppEvent::IdentityChanged {
            display_name: identity.display_name.clone(),
        });
        identity
    }

    // ------------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------------

    fn send_alert(&mut self) -> FireteamResult<AlertState> {
        let now = self.now();
        let transition = self
            .state
            .alerts
            .raise(&self.state.identity.display_name, now)?;

        if let AlertTransition::Raised {
            sender,
            cycle,
            raised_at,
            expires_at,
            superseded,
        } = transition
        {
            if let Some(previous) = superseded {
                debug!(previous = %previous, "replacing visible alert");
            }
            self.alert_timer
                .arm(cycle, Duration::from_millis(expires_at - now));
            if self.config.alerts.haptic_pulse_interval().is_some() {
                self.haptic.arm(false);
            }

            self.dispatch(Effect::PresentAlert {
                sender: sender.clone(),
            });
            self.dispatch(Effect::Notify(Notification::new(
                self.config.notifications.title.clone(),
                PresenceNotice::Alert,
                &sender,
            )));
            self.emit(AppEvent::AlertRaised { sender, raised_at });
        }

        Ok(self.state.alerts.state())
    }

    fn dismiss_alert(&mut self) -> Option<ClearReason> {
        let now = self.now();
        self.state
            .alerts
            .dismiss(now)
            .and_then(|transition| self.on_alert_cleared(transition))
    }

    fn alert_state(&mut self) -> AlertState {
        let now = self.now();
        if let Some(transition) = self.state.alerts.expire_due(now) {
            self.on_alert_cleared(transition);
        }
        self.state.alerts.state()
    }

    fn on_alert_deadline(&mut self, cycle: u64) {
        let now = self.now();
        match self.state.alerts.expire(cycle, now) {
            Some(transition) => {
                self.on_alert_cleared(transition);
            }
            None => self.rearm_alert_timer(now),
        }
    }

    /// Point the timer at the visible alert's deadline, if any
    fn rearm_alert_timer(&mut self, now: Timestamp) {
        if let AlertPhase::Active {
            cycle, expires_at, ..
        } = self.state.alerts.phase()
        {
            let (cycle, expires_at) = (*cycle, *expires_at);
            self.alert_timer
                .arm(cycle, Duration::from_millis(expires_at - now));
        } else {
            self.alert_timer.cancel();
        }
    }

    fn on_alert_cleared(&mut self, transition: AlertTransition) -> Option<ClearReason> {
        match transition {
            AlertTransition::Cleared { sender, reason, .. } => {
                self.alert_timer.cancel();
                self.haptic.cancel();
                self.dispatch(Effect::PresentDismiss);
                self.emit(AppEvent::AlertCleared { sender, reason });
                Some(reason)
            }
            AlertTransition::Raised { .. } => None,
        }
    }

    // ------------------------------------------------------------------------
    // Heartbeat & Pruning
    // ------------------------------------------------------------------------

    fn on_broadcast_tick(&mut self) {
        if !self.heartbeats.is_empty() {
            self.state.stats.heartbeats_skipped += 1;
            debug!("previous heartbeat still fetching, skipping tick");
            return;
        }
        self.state.stats.heartbeats_started += 1;
        self.spawn_fetch(FetchPurpose::Heartbeat);
    }

    fn on_prune_tick(&mut self) {
        let now = self.now();
        self.state.stats.prune_runs += 1;
        let removed = self
            .state
            .registry
            .prune(now, self.config.presence.timeout());

        if !removed.is_empty() {
            for participant in &removed {
                info!(
                    name = %participant.display_name,
                    device_id = %participant.device_id,
                    "participant timed out"
                );
            }
            self.emit_presence_changed(now);
        }
    }

    fn spawn_fetch(&mut self, purpose: FetchPurpose) {
        let source = Arc::clone(&self.network_source);
        let limit = self.config.presence.snapshot_timeout();

        let fetches = match purpose {
            FetchPurpose::Heartbeat => &mut self.heartbeats,
            FetchPurpose::Reconnect(_) => &mut self.reconnects,
        };
        fetches.spawn(async move {
            let result = match tokio::time::timeout(limit, source.fetch_snapshot()).await {
                Ok(result) => result,
                Err(_) => Err(FireteamError::network_unavailable(format!(
                    "snapshot timed out after {}ms",
                    limit.as_millis()
                ))),
            };
            FetchOutcome { purpose, result }
        });
    }

    fn on_fetch_completed(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { purpose, result } = outcome;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.state.stats.snapshot_failures += 1;
                warn!(error = %e, "network snapshot unavailable");
                NetworkSnapshot::unavailable()
            }
        };
        let status = NetworkStatus::from_snapshot(&snapshot);
        self.update_network_status(status.clone());

        match purpose {
            FetchPurpose::Heartbeat => self.apply_heartbeat(&snapshot, &status),
            FetchPurpose::Reconnect(reply) => {
                if status.qualifying {
                    self.announce(
                        PresenceNotice::Joined,
                        self.config.notifications.announce_connect,
                    );
                }
                let _ = reply.send(status);
            }
        }
    }

    /// Upsert the local participant from a completed heartbeat fetch
    ///
    /// Identity is read now, not when the fetch started.
    fn apply_heartbeat(&mut self, snapshot: &NetworkSnapshot, status: &NetworkStatus) {
        if !self.state.identity.is_set() {
            debug!("identity cleared during fetch, skipping upsert");
            return;
        }
        if self.config.presence.require_qualifying_network && !status.qualifying {
            debug!("not on a qualifying network, skipping upsert");
            return;
        }

        let now = self.now();
        let participant = Participant::new(
            self.state.identity.display_name.clone(),
            self.state.device_id.clone(),
            status.strength,
            snapshot.ip_address.clone(),
        );
        self.state.registry.upsert_self(participant, now);
        self.emit_presence_changed(now);
    }

    fn update_network_status(&mut self, status: NetworkStatus) {
        if status == self.state.network {
            return;
        }

        let was_qualifying = self.state.network.qualifying;
        self.state.network = status.clone();
        info!(status = %status.describe(), "network status changed");

        if was_qualifying && !status.qualifying {
            self.announce(
                PresenceNotice::Left,
                self.config.notifications.announce_disconnect,
            );
        }
        self.emit(AppEvent::NetworkChanged { status });
    }

    // ------------------------------------------------------------------------
    // Output
    // ------------------------------------------------------------------------

    /// Schedule a presence notice for the local participant
    fn announce(&mut self, notice: PresenceNotice, enabled: bool) {
        if !enabled || !self.state.identity.is_set() {
            return;
        }
        let notification = Notification::new(
            self.config.notifications.title.clone(),
            notice,
            &self.state.identity.display_name,
        );
        self.dispatch(Effect::Notify(notification));
    }

    fn dispatch(&mut self, effect: Effect) {
        match self.effect_sender.try_send(effect) {
            Ok(()) => {}
            Err(TrySendError::Full(effect)) => {
                self.state.stats.effects_dropped += 1;
                warn!(?effect, "effect queue full, dropping effect");
            }
            Err(TrySendError::Closed(effect)) => {
                warn!(?effect, "effect dispatcher gone, dropping effect");
            }
        }
    }

    fn emit(&self, event: AppEvent) {
        // No subscribers is not an error
        let _ = self.app_event_sender.send(event);
    }

    fn emit_presence_changed(&self, now: Timestamp) {
        let timeout = self.config.presence.timeout();
        self.emit(AppEvent::PresenceChanged {
            participants: self.state.registry.len(),
            online: self.state.registry.online_count(now, timeout),
        });
    }

    fn shutdown(&mut self) {
        self.scheduler.shutdown();
        self.alert_timer.cancel();
        self.haptic.cancel();
        self.heartbeats.abort_all();
        self.reconnects.abort_all();
    }
}
