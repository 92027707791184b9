use crate::config::SupervisorConfig;
use crate::error::{Result, WardenError};
use std::path::Path;
use std::process::ExitStatus;
use std::time::{Duration, SystemTime};
use tokio::process::{Child, Command};

/// Handle to the one worker process under supervision
#[derive(Debug)]
pub struct Worker {
    /// The child process handle
    pub child: Child,

    /// Process ID assigned by the OS
    pub pid: u32,

    /// When the worker was launched
    pub started_at: SystemTime,
}

impl Worker {
    /// Check whether the worker has exited without blocking
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Wait for the worker to exit and return its status
    pub async fn wait(&mut self) -> Result<ExitStatus> {
        Ok(self.child.wait().await?)
    }

    pub fn uptime(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.started_at)
            .unwrap_or(Duration::from_secs(0))
    }
}

/// Launch the worker process described by the configuration
///
/// The worker inherits the supervisor's environment, augmented with the
/// configured variables and, when a heartbeat endpoint is given, with
/// `NOTIFY_SOCKET` pointing at the supervisor's datagram socket so the
/// worker knows where to send its pulses.
///
/// # Arguments
/// * `config` - Supervisor configuration with the worker command settings
/// * `heartbeat_endpoint` - Socket path to expose to the worker, if any
///
/// # Returns
/// * `Ok(Worker)` - Successfully launched worker with metadata
/// * `Err(WardenError)` - Failed to launch the worker
pub fn launch(config: &SupervisorConfig, heartbeat_endpoint: Option<&Path>) -> Result<Worker> {
    // Validate that the executable exists before trying to run it
    if !config.command.exists() {
        return Err(WardenError::SpawnError(format!(
            "Worker executable does not exist: {}",
            config.command.display()
        )));
    }

    let mut command = Command::new(&config.command);

    if !config.args.is_empty() {
        command.args(&config.args);
    }

    if let Some(ref cwd) = config.cwd {
        command.current_dir(cwd);
    }

    for (key, value) in &config.env {
        command.env(key, value);
    }

    if let Some(endpoint) = heartbeat_endpoint {
        command.env("NOTIFY_SOCKET", endpoint);
    }

    let child = command.spawn().map_err(|e| {
        WardenError::SpawnError(format!(
            "Failed to spawn worker '{}': {}",
            config.command.display(),
            e
        ))
    })?;

    let pid = child.id().ok_or_else(|| {
        WardenError::SpawnError(format!(
            "Failed to get PID for worker '{}'",
            config.command.display()
        ))
    })?;

    Ok(Worker {
        child,
        pid,
        started_at: SystemTime::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn sh_config(script: &str) -> SupervisorConfig {
        let mut config = SupervisorConfig::new(PathBuf::from("/bin/sh"));
        config.args = vec!["-c".to_string(), script.to_string()];
        config
    }

    #[tokio::test]
    async fn test_launch_simple_worker() {
        let config = SupervisorConfig::new(PathBuf::from("/bin/echo"));

        let mut worker = launch(&config, None).unwrap();
        assert!(worker.pid > 0);

        let status = worker.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_launch_nonexistent_executable() {
        let config = SupervisorConfig::new(PathBuf::from("/nonexistent/worker"));

        let result = launch(&config, None);
        match result {
            Err(WardenError::SpawnError(msg)) => {
                assert!(msg.contains("does not exist"));
            }
            _ => panic!("Expected SpawnError"),
        }
    }

    #[tokio::test]
    async fn test_launch_with_args_and_exit_code() {
        let config = sh_config("exit 7");

        let mut worker = launch(&config, None).unwrap();
        let status = worker.wait().await.unwrap();
        assert_eq!(status.code(), Some(7));
    }

    #[tokio::test]
    async fn test_launch_with_env_vars() {
        let mut config = sh_config("test \"$WORKER_MODE\" = \"standby\"");
        config
            .env
            .insert("WORKER_MODE".to_string(), "standby".to_string());

        let mut worker = launch(&config, None).unwrap();
        let status = worker.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_launch_with_working_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = SupervisorConfig::new(PathBuf::from("/bin/pwd"));
        config.cwd = Some(temp_dir.path().to_path_buf());

        let mut worker = launch(&config, None).unwrap();
        let status = worker.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_launch_exposes_heartbeat_endpoint() {
        let config = sh_config("test \"$NOTIFY_SOCKET\" = \"/tmp/warden-test.sock\"");

        let mut worker = launch(&config, Some(Path::new("/tmp/warden-test.sock"))).unwrap();
        let status = worker.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_no_heartbeat_endpoint_without_monitor() {
        let config = sh_config("test -z \"$NOTIFY_SOCKET\"");

        let mut worker = launch(&config, None).unwrap();
        let status = worker.wait().await.unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn test_try_wait_running_then_exited() {
        let config = sh_config("sleep 5");

        let mut worker = launch(&config, None).unwrap();
        assert!(worker.try_wait().unwrap().is_none());

        worker.child.start_kill().unwrap();
        let status = worker.wait().await.unwrap();
        assert!(!status.success());
        assert!(worker.try_wait().unwrap().is_some());
    }
}
