use crate::error::{Result, WardenError};
use crate::process::Worker;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::process::ExitStatus;
use std::time::Duration;
use tracing::{info, warn};

/// How long each bounded rung waits for the worker to exit
const STEP_WAIT: Duration = Duration::from_secs(30);

/// One rung of the shutdown ladder
#[derive(Debug, Clone, Copy)]
pub struct ShutdownStep {
    /// Signal sent to the worker at this rung
    pub signal: Signal,
    /// How long to wait for the worker to exit; `None` waits until the OS
    /// confirms termination
    pub wait: Option<Duration>,
}

/// Ordered sequence of shutdown steps, applied strictly in order
///
/// Plans should end with an unbounded SIGKILL step; the escalator forces one
/// if a plan runs dry with the worker still alive.
#[derive(Debug, Clone)]
pub struct ShutdownPlan {
    steps: Vec<ShutdownStep>,
}

impl ShutdownPlan {
    pub fn new(steps: Vec<ShutdownStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ShutdownStep] {
        &self.steps
    }
}

impl Default for ShutdownPlan {
    fn default() -> Self {
        Self {
            steps: vec![
                ShutdownStep {
                    signal: Signal::SIGINT,
                    wait: Some(STEP_WAIT),
                },
                ShutdownStep {
                    signal: Signal::SIGTERM,
                    wait: Some(STEP_WAIT),
                },
                ShutdownStep {
                    signal: Signal::SIGKILL,
                    wait: None,
                },
            ],
        }
    }
}

/// Drives the signal escalation ladder against a worker
pub struct ShutdownEscalator {
    plan: ShutdownPlan,
}

impl ShutdownEscalator {
    pub fn new(plan: ShutdownPlan) -> Self {
        Self { plan }
    }

    /// Create an escalator with the default SIGINT -> SIGTERM -> SIGKILL plan
    pub fn with_defaults() -> Self {
        Self::new(ShutdownPlan::default())
    }

    /// Stop the worker, escalating through the plan until it exits
    ///
    /// Safe to call on an already-exited worker: its cached status is
    /// returned immediately and no signal is sent. Otherwise each step's
    /// signal is sent in order, waiting up to the step's bound before
    /// escalating. The final unbounded step guarantees this never returns
    /// while the worker is still alive.
    pub async fn stop(&self, worker: &mut Worker) -> Result<ExitStatus> {
        if let Some(status) = worker.try_wait()? {
            return Ok(status);
        }

        let pid = Pid::from_raw(worker.pid as i32);

        for step in self.plan.steps() {
            info!(pid = worker.pid, "Stopping worker with {}", step.signal);

            if let Err(errno) = signal::kill(pid, step.signal) {
                if errno == Errno::ESRCH {
                    // Worker exited between the liveness check and the signal
                    return worker.wait().await;
                }
                return Err(WardenError::SignalError(format!(
                    "Failed to send {} to worker (pid {}): {}",
                    step.signal, worker.pid, errno
                )));
            }

            match step.wait {
                Some(bound) => match tokio::time::timeout(bound, worker.wait()).await {
                    Ok(status) => {
                        let status = status?;
                        info!("Worker exited after {} with status: {}", step.signal, status);
                        return Ok(status);
                    }
                    Err(_) => {
                        warn!(
                            "Worker did not exit within {:?} after {}, escalating",
                            bound, step.signal
                        );
                    }
                },
                None => {
                    let status = worker.wait().await?;
                    info!("Worker exited after {} with status: {}", step.signal, status);
                    return Ok(status);
                }
            }
        }

        // Plan ran dry with the worker still alive; force removal
        warn!(pid = worker.pid, "Shutdown plan exhausted, sending SIGKILL");
        if let Err(errno) = signal::kill(pid, Signal::SIGKILL) {
            if errno != Errno::ESRCH {
                return Err(WardenError::SignalError(format!(
                    "Failed to send SIGKILL to worker (pid {}): {}",
                    worker.pid, errno
                )));
            }
        }
        worker.wait().await
    }
}
