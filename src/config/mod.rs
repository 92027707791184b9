use crate::error::{Result, WardenError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Supervisor configuration with all settings for one supervised worker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Path to the worker executable
    pub command: PathBuf,

    /// Command-line arguments passed to the worker
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the worker
    #[serde(default)]
    pub cwd: Option<PathBuf>,

    /// Environment variables for the worker
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Whether the heartbeat watchdog is enabled
    #[serde(default)]
    pub watchdog: bool,

    /// Watchdog timer: seconds without a pulse before the worker is stopped
    #[serde(default = "default_watchdog_timer")]
    pub watchdog_timer_secs: u64,

    /// Poll interval: how often exit conditions are re-checked (in seconds)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Path to the maintenance sentinel file; its presence holds the worker stopped
    #[serde(default)]
    pub maintenance_path: Option<PathBuf>,

    /// Path for the heartbeat datagram socket
    #[serde(default = "default_heartbeat_socket")]
    pub heartbeat_socket: PathBuf,

    /// Whether to relaunch the worker once the maintenance sentinel clears
    #[serde(default)]
    pub resume_after_maintenance: bool,
}

// Default value functions for serde
fn default_watchdog_timer() -> u64 {
    90
}

fn default_poll_interval() -> u64 {
    1
}

fn default_heartbeat_socket() -> PathBuf {
    PathBuf::from("warden.sock")
}

impl SupervisorConfig {
    /// Create a configuration for the given worker command with default settings
    pub fn new(command: PathBuf) -> Self {
        Self {
            command,
            args: Vec::new(),
            cwd: None,
            env: HashMap::new(),
            watchdog: false,
            watchdog_timer_secs: default_watchdog_timer(),
            poll_interval_secs: default_poll_interval(),
            maintenance_path: None,
            heartbeat_socket: default_heartbeat_socket(),
            resume_after_maintenance: false,
        }
    }

    /// Load a supervisor configuration from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<SupervisorConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WardenError::ConfigError(format!("Failed to read config file: {}", e)))?;

        // Determine format based on file extension
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        match extension {
            "toml" => Self::parse_toml(&contents),
            "json" => Self::parse_json(&contents),
            _ => Err(WardenError::InvalidConfig(format!(
                "Unsupported file format: {}. Use .toml or .json",
                extension
            ))),
        }
    }

    /// Parse a TOML configuration
    fn parse_toml(contents: &str) -> Result<SupervisorConfig> {
        toml::from_str(contents)
            .map_err(|e| WardenError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    /// Parse a JSON configuration
    fn parse_json(contents: &str) -> Result<SupervisorConfig> {
        serde_json::from_str(contents)
            .map_err(|e| WardenError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.command.as_os_str().is_empty() {
            return Err(WardenError::MissingConfigField("command".to_string()));
        }

        if self.poll_interval_secs == 0 {
            return Err(WardenError::ConfigValidationError(
                "poll_interval_secs must be at least 1".to_string(),
            ));
        }

        // A timer shorter than the poll granularity could never observe a pulse in time
        if self.watchdog && self.watchdog_timer_secs <= self.poll_interval_secs {
            return Err(WardenError::ConfigValidationError(
                "watchdog_timer_secs must be greater than poll_interval_secs".to_string(),
            ));
        }

        if self.watchdog && self.heartbeat_socket.as_os_str().is_empty() {
            return Err(WardenError::MissingConfigField("heartbeat_socket".to_string()));
        }

        // Validate working directory exists if specified
        if let Some(ref cwd) = self.cwd {
            if !cwd.exists() {
                return Err(WardenError::ConfigValidationError(format!(
                    "Working directory does not exist: {}",
                    cwd.display()
                )));
            }
            if !cwd.is_dir() {
                return Err(WardenError::ConfigValidationError(format!(
                    "Working directory is not a directory: {}",
                    cwd.display()
                )));
            }
        }

        Ok(())
    }

    /// Get the watchdog timer as Duration
    pub fn watchdog_timer(&self) -> Duration {
        Duration::from_secs(self.watchdog_timer_secs)
    }

    /// Get the poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
