//! End-to-end tests of the interactive session and command handlers

mod test_utils;

use std::future;

use fireteam_cli::app::FireteamApp;
use fireteam_cli::commands::CommandDispatcher;
use fireteam_cli::interactive::{hold_alert, Session};
use fireteam_cli::{AppConfig, Commands, IdentityAction};
use fireteam_core::Timestamp;
use fireteam_runtime::TokioTimeSource;
use test_utils::{
    offline_runtime, scratch_dir, settle, terminal_builder, terminal_runtime, Capture,
};

#[tokio::test]
async fn test_session_alert_round_trip() {
    let capture = Capture::new();
    let mut runtime = terminal_runtime(&capture).await;
    let handle = runtime.handle().expect("Failed to get handle");

    let script = b"name   Alice  Bravo\nreconnect\nalert\nstatus\ndismiss\ndismiss\nquit\nalert\n";
    let mut session = Session::new(handle.clone(), capture.writer());
    session
        .run(&script[..], future::pending())
        .await
        .expect("Session failed");
    settle().await;

    let text = capture.text();
    assert!(text.contains("You are Alice Bravo"));
    assert!(text.contains("Connected to engine-house (100%)"));
    assert!(text.contains("Alert sent to the team"));
    assert!(text.contains("EMERGENCY ALERT from Alice Bravo"));
    assert!(text.contains("Alert showing from Alice Bravo"));
    assert!(text.contains("Alert dismissed"));
    assert!(text.contains("No alert showing"));
    assert!(text.contains("--- alert cleared ---"));
    // Nothing after `quit` runs
    assert_eq!(text.matches("Alert sent to the team").count(), 1);

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test]
async fn test_session_requires_name_for_alert() {
    let capture = Capture::new();
    let mut runtime = terminal_runtime(&capture).await;
    let handle = runtime.handle().expect("Failed to get handle");

    let mut session = Session::new(handle.clone(), capture.writer());
    session
        .run(&b"alert\nlaunch\nroster\n"[..], future::pending())
        .await
        .expect("Session failed");

    let text = capture.text();
    assert!(text.contains("Set a display name first"));
    assert!(text.contains("Unknown command `launch`"));
    assert!(text.contains("No team members on the network"));
    assert!(!handle.alert_state().await.expect("alert state").visible);

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test]
async fn test_session_refuses_alert_off_team_network() {
    let capture = Capture::new();
    let mut runtime = offline_runtime(&capture).await;
    let handle = runtime.handle().expect("Failed to get handle");

    let mut session = Session::new(handle.clone(), capture.writer());
    session
        .run(&b"name Alice\nreconnect\nstatus\nalert\n"[..], future::pending())
        .await
        .expect("Session failed");
    settle().await;

    let text = capture.text();
    assert!(text.contains("Alert button disabled"));
    assert!(text.contains("Connect to the team WiFi to send alerts"));
    assert!(!text.contains("EMERGENCY ALERT"));
    assert!(!text.contains("ALERT raised by"));
    assert!(!text.contains("Alert sent to the team"));
    assert!(!handle.alert_state().await.expect("alert state").visible);

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test(start_paused = true)]
async fn test_roster_ages_use_runtime_clock() {
    let capture = Capture::new();
    let mut runtime = terminal_builder(&capture)
        .with_time_source(TokioTimeSource::starting_at(Timestamp::new(1_000_000)))
        .start()
        .await
        .expect("Failed to start runtime");
    let handle = runtime.handle().expect("Failed to get handle");
    handle.set_identity("Alice").await.expect("Failed to set identity");
    settle().await;

    let mut session = Session::new(handle.clone(), capture.writer());
    session
        .run(&b"roster\n"[..], future::pending())
        .await
        .expect("Session failed");

    let text = capture.text();
    assert!(text.contains("Team (1 online)"));
    assert!(text.contains("seen 0s ago"));

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test]
async fn test_hold_alert_refused_off_team_network() {
    let capture = Capture::new();
    let mut runtime = offline_runtime(&capture).await;
    let handle = runtime.handle().expect("Failed to get handle");
    handle.set_identity("Alice").await.expect("Failed to set identity");

    hold_alert(&handle, &b"\n"[..], &capture.writer())
        .await
        .expect("Hold failed");
    settle().await;

    let text = capture.text();
    assert!(text.contains("Connect to the team WiFi to send alerts"));
    assert!(!text.contains("Alert raised as Alice"));
    assert!(!text.contains("EMERGENCY ALERT"));
    assert!(!handle.alert_state().await.expect("alert state").visible);

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test]
async fn test_hold_alert_dismissed_by_enter() {
    let capture = Capture::new();
    let mut runtime = terminal_runtime(&capture).await;
    let handle = runtime.handle().expect("Failed to get handle");
    handle.set_identity("Alice").await.expect("Failed to set identity");

    hold_alert(&handle, &b"\n"[..], &capture.writer())
        .await
        .expect("Hold failed");
    settle().await;

    assert!(!handle.alert_state().await.expect("alert state").visible);
    let text = capture.text();
    assert!(text.contains("Alert raised as Alice"));
    assert!(text.contains("--- alert cleared ---"));

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test(start_paused = true)]
async fn test_hold_alert_without_terminal_waits_for_expiry() {
    let capture = Capture::new();
    let mut runtime = terminal_runtime(&capture).await;
    let handle = runtime.handle().expect("Failed to get handle");
    handle.set_identity("Alice").await.expect("Failed to set identity");

    let start = tokio::time::Instant::now();
    hold_alert(&handle, &b""[..], &capture.writer())
        .await
        .expect("Hold failed");

    assert!(tokio::time::Instant::now() - start >= std::time::Duration::from_millis(10_000));
    assert!(!handle.alert_state().await.expect("alert state").visible);

    runtime.stop().await.expect("Failed to stop runtime");
}

#[tokio::test]
async fn test_identity_commands_persist_to_data_dir() {
    let dir = scratch_dir("identity");
    let capture = Capture::new();
    let app = || FireteamApp::with_writer(AppConfig::default(), dir.clone(), capture.writer());

    let identity = |action| Commands::Identity { action };
    CommandDispatcher::execute(
        identity(IdentityAction::Set {
            name: "  Charlie   Delta ".to_string(),
        }),
        app(),
    )
    .await
    .expect("set failed");
    CommandDispatcher::execute(identity(IdentityAction::Show), app())
        .await
        .expect("show failed");
    CommandDispatcher::execute(identity(IdentityAction::Clear), app())
        .await
        .expect("clear failed");
    CommandDispatcher::execute(identity(IdentityAction::Show), app())
        .await
        .expect("show failed");

    let lines: Vec<String> = capture.text().lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "Display name saved: Charlie Delta",
            "Charlie Delta",
            "Display name cleared",
            "(not set)",
        ]
    );
    assert!(dir.join("fireteam.json").exists());
}

#[tokio::test]
async fn test_config_command_prints_toml() {
    let capture = Capture::new();
    let app = FireteamApp::with_writer(
        AppConfig::default(),
        scratch_dir("config"),
        capture.writer(),
    );
    CommandDispatcher::execute(Commands::Config, app)
        .await
        .expect("config failed");

    let printed = capture.text();
    assert!(printed.contains("[fireteam.presence]"));
    assert_eq!(
        AppConfig::from_toml(&printed).expect("printed config reloads"),
        AppConfig::default()
    );
}
