// CLI module - User-facing command-line interface

pub mod output;

use crate::config::SupervisorConfig;
use crate::error::{Result, WardenError};
use clap::Parser;
use std::path::PathBuf;

/// Warden - supervises a single worker process with heartbeat watchdog,
/// shutdown escalation and maintenance-sentinel support
#[derive(Parser)]
#[command(name = "warden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Load supervisor configuration from a file (TOML or JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable the heartbeat watchdog
    #[arg(short, long)]
    watchdog: bool,

    /// Watchdog timer: seconds without a pulse before the worker is stopped
    #[arg(short = 'd', long, value_name = "SECS")]
    timer: Option<u64>,

    /// Poll interval in seconds
    #[arg(short = 'o', long, value_name = "SECS")]
    poll: Option<u64>,

    /// Path to the maintenance sentinel file
    #[arg(long, value_name = "FILE")]
    maint: Option<PathBuf>,

    /// Path for the heartbeat datagram socket
    #[arg(long, value_name = "FILE")]
    socket: Option<PathBuf>,

    /// Relaunch the worker once the maintenance sentinel clears
    #[arg(long)]
    resume: bool,

    /// Environment variables for the worker (KEY=VALUE format)
    #[arg(short, long, value_name = "KEY=VALUE")]
    env: Vec<String>,

    /// Worker executable (required unless --config provides one)
    command: Option<PathBuf>,

    /// Arguments passed to the worker
    #[arg(last = true)]
    args: Vec<String>,
}

impl Cli {
    /// Build the supervisor configuration from the file (if any) and the
    /// command-line overrides
    pub fn into_config(self) -> Result<SupervisorConfig> {
        let mut config = match &self.config {
            Some(path) => SupervisorConfig::from_file(path)?,
            None => {
                let command = self
                    .command
                    .clone()
                    .ok_or_else(|| WardenError::MissingConfigField("command".to_string()))?;
                SupervisorConfig::new(command)
            }
        };

        // Command-line values override the file
        if let Some(command) = self.command {
            config.command = command;
        }
        if !self.args.is_empty() {
            config.args = self.args;
        }
        if self.watchdog || watchdog_enabled_by_env() {
            config.watchdog = true;
        }
        if let Some(timer) = self.timer {
            config.watchdog_timer_secs = timer;
        }
        if let Some(poll) = self.poll {
            config.poll_interval_secs = poll;
        }
        if let Some(maint) = self.maint {
            config.maintenance_path = Some(maint);
        }
        if let Some(socket) = self.socket {
            config.heartbeat_socket = socket;
        }
        if self.resume {
            config.resume_after_maintenance = true;
        }

        for pair in &self.env {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                WardenError::ConfigValidationError(format!(
                    "Invalid environment variable '{}', expected KEY=VALUE",
                    pair
                ))
            })?;
            config.env.insert(key.to_string(), value.to_string());
        }

        config.validate()?;
        Ok(config)
    }
}

/// The watchdog can also be switched on from the supervisor's environment
fn watchdog_enabled_by_env() -> bool {
    std::env::var("WARDEN_WATCHDOG").map_or(false, |v| v == "1")
}
