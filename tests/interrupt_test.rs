// Operator-interrupt scenario, isolated in its own test binary because it
// raises SIGINT for the whole test process

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::time::Duration;
use warden::config::SupervisorConfig;
use warden::supervisor::{Outcome, Supervisor};

#[tokio::test]
async fn test_operator_interrupt_suppresses_failure() {
    let mut config = SupervisorConfig::new(PathBuf::from("/bin/sh"));
    config.args = vec!["-c".to_string(), "exec sleep 30".to_string()];

    let mut supervisor = Supervisor::new(config);
    let handle = tokio::spawn(async move { supervisor.run().await });

    // Let the supervisor install its signal handlers and launch the worker
    tokio::time::sleep(Duration::from_millis(1500)).await;
    kill(Pid::this(), Signal::SIGINT).unwrap();

    let outcome = handle.await.unwrap().unwrap();

    // The worker was torn down by a signal (a failure status on its own),
    // but an operator-controlled stop always suppresses the failure code
    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(outcome.exit_code(), 0);
}
