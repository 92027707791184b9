// Integration tests for the supervision loop

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::net::UnixDatagram;
use warden::config::SupervisorConfig;
use warden::supervisor::{Outcome, Supervisor};

fn sh_config(script: &str) -> SupervisorConfig {
    let mut config = SupervisorConfig::new(PathBuf::from("/bin/sh"));
    config.args = vec!["-c".to_string(), script.to_string()];
    config
}

#[tokio::test]
async fn test_clean_exit_yields_success() {
    let mut supervisor = Supervisor::new(sh_config("exit 0"));

    let outcome = supervisor.run().await.unwrap();
    assert_eq!(outcome, Outcome::Clean);
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_nonzero_exit_yields_failure() {
    let mut supervisor = Supervisor::new(sh_config("exit 2"));

    let outcome = supervisor.run().await.unwrap();
    assert_eq!(outcome, Outcome::WorkerFailed);
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_watchdog_timeout_with_no_pulses() {
    let dir = TempDir::new().unwrap();
    let mut config = sh_config("exec sleep 30");
    config.watchdog = true;
    config.watchdog_timer_secs = 2;
    config.poll_interval_secs = 1;
    config.heartbeat_socket = dir.path().join("hb.sock");

    let start = Instant::now();
    let mut supervisor = Supervisor::new(config);
    let outcome = supervisor.run().await.unwrap();

    assert_eq!(outcome, Outcome::WatchdogTimeout);
    assert_eq!(outcome.exit_code(), 1);
    // Fired once the timer elapsed, and the escalation reaped the worker promptly
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_pulses_defer_the_watchdog() {
    let dir = TempDir::new().unwrap();
    let mut config = sh_config("exec sleep 30");
    config.watchdog = true;
    config.watchdog_timer_secs = 2;
    config.poll_interval_secs = 1;
    config.heartbeat_socket = dir.path().join("hb.sock");
    let socket_path = config.heartbeat_socket.clone();

    // Pulse every 500 ms for ~3 s, well past the 2 s timer, then go silent
    let pulser = tokio::spawn(async move {
        let sender = UnixDatagram::unbound().unwrap();
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let _ = sender.send_to(b"WATCHDOG=1", &socket_path).await;
        }
    });

    let start = Instant::now();
    let mut supervisor = Supervisor::new(config);
    let outcome = supervisor.run().await.unwrap();

    // The watchdog still fires in the end, but only after the pulses stop
    assert_eq!(outcome, Outcome::WatchdogTimeout);
    assert!(start.elapsed() >= Duration::from_secs(4));

    pulser.await.unwrap();
}

#[tokio::test]
async fn test_maintenance_holds_until_sentinel_clears() {
    let dir = TempDir::new().unwrap();
    let sentinel = dir.path().join("worker.down");
    fs::write(&sentinel, b"").unwrap();

    let mut config = sh_config("exec sleep 30");
    config.maintenance_path = Some(sentinel.clone());

    let remover = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        fs::remove_file(&sentinel).unwrap();
    });

    let start = Instant::now();
    let mut supervisor = Supervisor::new(config);
    let outcome = supervisor.run().await.unwrap();

    // No failure is recorded from the maintenance path
    assert_eq!(outcome, Outcome::Maintenance);
    assert_eq!(outcome.exit_code(), 0);
    // The supervisor stayed parked until the operator cleared the sentinel
    assert!(start.elapsed() >= Duration::from_millis(2500));

    remover.await.unwrap();
}

#[tokio::test]
async fn test_maintenance_outranks_the_watchdog() {
    let dir = TempDir::new().unwrap();
    let sentinel = dir.path().join("worker.down");
    fs::write(&sentinel, b"").unwrap();

    // No pulses ever arrive, so the watchdog would fire at 2 s if the
    // sentinel did not take precedence
    let mut config = sh_config("exec sleep 30");
    config.watchdog = true;
    config.watchdog_timer_secs = 2;
    config.poll_interval_secs = 1;
    config.heartbeat_socket = dir.path().join("hb.sock");
    config.maintenance_path = Some(sentinel.clone());

    let remover = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        fs::remove_file(&sentinel).unwrap();
    });

    let mut supervisor = Supervisor::new(config);
    let outcome = supervisor.run().await.unwrap();

    assert_eq!(outcome, Outcome::Maintenance);
    remover.await.unwrap();
}

#[tokio::test]
async fn test_resume_relaunches_after_maintenance() {
    let dir = TempDir::new().unwrap();
    let sentinel = dir.path().join("worker.down");
    fs::write(&sentinel, b"").unwrap();

    // First generation parks in sleep; the relaunched generation finds the
    // marker and exits cleanly
    let marker = dir.path().join("generation-one-ran");
    let script = format!(
        "if [ -e {marker} ]; then exit 0; else touch {marker}; exec sleep 30; fi",
        marker = marker.display()
    );
    let mut config = sh_config(&script);
    config.maintenance_path = Some(sentinel.clone());
    config.resume_after_maintenance = true;

    let remover = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        fs::remove_file(&sentinel).unwrap();
    });

    let mut supervisor = Supervisor::new(config);
    let outcome = supervisor.run().await.unwrap();

    assert_eq!(outcome, Outcome::Clean);
    assert!(marker.exists());
    remover.await.unwrap();
}
