use crate::config::SupervisorConfig;
use crate::error::Result;
use crate::heartbeat::HeartbeatMonitor;
use crate::maintenance::MaintenanceGate;
use crate::process::{launch, ShutdownEscalator, Worker};
use std::process::ExitStatus;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::time::timeout;
use tracing::{debug, error, info};

/// Lifecycle of a supervision run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupervisorState::Starting => write!(f, "starting"),
            SupervisorState::Running => write!(f, "running"),
            SupervisorState::Stopping => write!(f, "stopping"),
            SupervisorState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Why the monitoring loop handed the worker over to the shutdown path
#[derive(Debug)]
enum StopReason {
    /// The worker exited on its own with this status
    WorkerExited(ExitStatus),
    /// No pulse arrived within the watchdog timer
    WatchdogTimeout,
    /// The maintenance sentinel was observed present
    Maintenance,
    /// The operator interrupted the supervisor itself
    Interrupted,
    /// The monitoring loop failed in an unanticipated way
    Fault,
}

/// Final outcome of a supervision run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Worker exited successfully
    Clean,
    /// Worker exited with a nonzero code or was killed by a signal
    WorkerFailed,
    /// Watchdog timer elapsed with the worker still alive
    WatchdogTimeout,
    /// Operator interrupt forced a controlled stop
    Interrupted,
    /// Maintenance sentinel cleared and the supervisor is not configured to resume
    Maintenance,
    /// An unexpected fault ended the run
    Fault,
}

impl Outcome {
    /// Process exit code for this outcome
    ///
    /// A controlled stop (operator interrupt, completed maintenance) is not
    /// a failure even when the worker's own exit status was.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Clean | Outcome::Interrupted | Outcome::Maintenance => 0,
            Outcome::WorkerFailed | Outcome::WatchdogTimeout | Outcome::Fault => 1,
        }
    }
}

/// Supervises one worker process from launch to reap
///
/// Runs a single cooperative monitoring loop: every poll interval it performs
/// one bounded wait (a heartbeat receive when the watchdog is enabled, a
/// timed process-wait otherwise), then re-checks the maintenance sentinel,
/// worker liveness, and the watchdog window. Every terminal path funnels
/// through one escalated stop, so the worker is never left behind.
pub struct Supervisor {
    config: SupervisorConfig,
    state: SupervisorState,
    escalator: ShutdownEscalator,
    gate: MaintenanceGate,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        let gate = MaintenanceGate::new(config.maintenance_path.clone());
        Self {
            config,
            state: SupervisorState::Starting,
            escalator: ShutdownEscalator::with_defaults(),
            gate,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Run the supervision loop until a terminal outcome
    ///
    /// Spawn failure is fatal and surfaces as an error; every other ending
    /// is an [`Outcome`].
    pub async fn run(&mut self) -> Result<Outcome> {
        // Bind before the worker starts so the first pulse cannot be missed
        let mut monitor = if self.config.watchdog {
            Some(HeartbeatMonitor::bind(&self.config.heartbeat_socket)?)
        } else {
            None
        };

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        loop {
            let endpoint = monitor.as_ref().map(|m| m.endpoint().to_path_buf());
            let mut worker = launch(&self.config, endpoint.as_deref())?;
            self.state = SupervisorState::Running;
            info!(
                pid = worker.pid,
                command = %self.config.command.display(),
                watchdog = monitor.is_some(),
                "Worker started"
            );

            if let Some(monitor) = monitor.as_mut() {
                monitor.reset();
            }

            let reason = match self
                .watch(&mut worker, monitor.as_mut(), &mut sigint, &mut sigterm)
                .await
            {
                Ok(reason) => reason,
                Err(e) => {
                    error!(error = %e, "Unexpected fault in monitoring loop");
                    StopReason::Fault
                }
            };

            self.state = SupervisorState::Stopping;
            if let Err(e) = self.escalator.stop(&mut worker).await {
                error!(error = %e, "Failed to stop worker");
                if !matches!(reason, StopReason::Interrupted) {
                    self.state = SupervisorState::Stopped;
                    return Ok(Outcome::Fault);
                }
            }

            match reason {
                StopReason::Maintenance => {
                    info!("Entering maintenance mode");
                    // Hold here until the operator clears the sentinel,
                    // still answering interrupts
                    tokio::select! {
                        _ = sigint.recv() => {
                            info!("Interrupted during maintenance");
                            self.state = SupervisorState::Stopped;
                            return Ok(Outcome::Interrupted);
                        }
                        _ = sigterm.recv() => {
                            info!("Interrupted during maintenance");
                            self.state = SupervisorState::Stopped;
                            return Ok(Outcome::Interrupted);
                        }
                        _ = self.gate.await_cleared(self.config.poll_interval()) => {}
                    }
                    info!("Maintenance sentinel cleared");
                    if self.config.resume_after_maintenance {
                        info!("Relaunching worker after maintenance");
                        continue;
                    }
                    self.state = SupervisorState::Stopped;
                    return Ok(Outcome::Maintenance);
                }
                StopReason::Interrupted => {
                    info!("Stopped by operator interrupt");
                    self.state = SupervisorState::Stopped;
                    return Ok(Outcome::Interrupted);
                }
                StopReason::WatchdogTimeout => {
                    error!("watchdog timeout exceeded");
                    self.state = SupervisorState::Stopped;
                    return Ok(Outcome::WatchdogTimeout);
                }
                StopReason::Fault => {
                    self.state = SupervisorState::Stopped;
                    return Ok(Outcome::Fault);
                }
                StopReason::WorkerExited(status) => {
                    self.state = SupervisorState::Stopped;
                    return if status.success() {
                        info!(uptime = ?worker.uptime(), "Worker exited cleanly");
                        Ok(Outcome::Clean)
                    } else {
                        error!(%status, uptime = ?worker.uptime(), "Worker exited with failure");
                        Ok(Outcome::WorkerFailed)
                    };
                }
            }
        }
    }

    /// One monitoring loop for the lifetime of a single worker generation
    async fn watch(
        &self,
        worker: &mut Worker,
        mut monitor: Option<&mut HeartbeatMonitor>,
        sigint: &mut Signal,
        sigterm: &mut Signal,
    ) -> Result<StopReason> {
        let poll = self.config.poll_interval();
        let timer = self.config.watchdog_timer();

        loop {
            // One bounded wait per cycle; in heartbeat mode the timed
            // receive doubles as the poll tick
            let exited = match &mut monitor {
                Some(monitor) => {
                    tokio::select! {
                        _ = sigint.recv() => return Ok(StopReason::Interrupted),
                        _ = sigterm.recv() => return Ok(StopReason::Interrupted),
                        pulse = monitor.await_pulse(poll) => {
                            if pulse {
                                debug!("Heartbeat pulse received");
                            }
                        }
                    }
                    worker.try_wait()?
                }
                None => {
                    tokio::select! {
                        _ = sigint.recv() => return Ok(StopReason::Interrupted),
                        _ = sigterm.recv() => return Ok(StopReason::Interrupted),
                        res = timeout(poll, worker.wait()) => match res {
                            Ok(status) => Some(status?),
                            Err(_) => None,
                        },
                    }
                }
            };

            // The sentinel outranks both a natural exit and the watchdog
            if self.gate.is_raised() {
                return Ok(StopReason::Maintenance);
            }
            if let Some(status) = exited {
                return Ok(StopReason::WorkerExited(status));
            }
            if let Some(monitor) = &monitor {
                if monitor.last_pulse_elapsed() >= timer {
                    return Ok(StopReason::WatchdogTimeout);
                }
            }
        }
    }
}
