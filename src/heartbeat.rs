use crate::error::{Result, WardenError};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::net::UnixDatagram;
use tracing::{debug, warn};

/// Datagrams are tiny key-value pulses; anything longer is not a pulse
const RECV_BUF_LEN: usize = 64;

/// Listens for worker liveness pulses on a local datagram socket
///
/// The socket is bound before the worker starts so the first pulse cannot be
/// missed. A pulse is the exact payload `WATCHDOG=1` (fields trimmed of
/// surrounding whitespace); everything else is ignored and does not touch
/// the last-pulse timestamp.
pub struct HeartbeatMonitor {
    socket: UnixDatagram,
    path: PathBuf,
    last_pulse: Instant,
}

impl HeartbeatMonitor {
    /// Bind the monitor at the given socket path
    pub fn bind(path: &Path) -> Result<Self> {
        // Clear a stale socket file left over from a previous run
        if path.exists() {
            std::fs::remove_file(path).map_err(|e| {
                WardenError::HeartbeatError(format!(
                    "Failed to remove stale socket {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        let socket = UnixDatagram::bind(path).map_err(|e| {
            WardenError::HeartbeatError(format!("Failed to bind {}: {}", path.display(), e))
        })?;

        Ok(Self {
            socket,
            path: path.to_path_buf(),
            last_pulse: Instant::now(),
        })
    }

    /// The socket path workers should send pulses to
    pub fn endpoint(&self) -> &Path {
        &self.path
    }

    /// Time since the last well-formed pulse (or the last reset)
    pub fn last_pulse_elapsed(&self) -> Duration {
        self.last_pulse.elapsed()
    }

    /// Restart the pulse window, as if a pulse had just arrived
    ///
    /// Called when a new worker generation launches.
    pub fn reset(&mut self) {
        self.last_pulse = Instant::now();
    }

    /// Wait up to `timeout` for one pulse
    ///
    /// Performs a single timed receive and returns true iff a well-formed
    /// pulse arrived, resetting the last-pulse timestamp. A malformed
    /// datagram or an elapsed timeout returns false. Never blocks beyond
    /// `timeout`, so the caller regains control every poll interval.
    pub async fn await_pulse(&mut self, timeout: Duration) -> bool {
        let mut buf = [0u8; RECV_BUF_LEN];

        let len = match tokio::time::timeout(timeout, self.socket.recv(&mut buf)).await {
            Err(_) => return false,
            Ok(Err(e)) => {
                warn!("Heartbeat receive failed: {}", e);
                return false;
            }
            Ok(Ok(len)) => len,
        };

        let Ok(payload) = std::str::from_utf8(&buf[..len]) else {
            debug!("Ignoring non-UTF-8 heartbeat datagram");
            return false;
        };

        let fields: Vec<&str> = payload.split('=').map(str::trim).collect();
        if fields == ["WATCHDOG", "1"] {
            self.last_pulse = Instant::now();
            true
        } else {
            debug!(payload, "Ignoring unrecognized heartbeat datagram");
            false
        }
    }
}

impl Drop for HeartbeatMonitor {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
