use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;

/// Polls a filesystem sentinel whose presence requests maintenance
///
/// Only existence matters; the file's content is never read and no
/// in-memory mirror is kept, so an operator touching or removing the file
/// is observed within one poll interval. Polling is deliberate: the
/// sentinel is an external operator action with no portable
/// change-notification contract.
pub struct MaintenanceGate {
    path: Option<PathBuf>,
}

impl MaintenanceGate {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Check whether the sentinel is currently present
    ///
    /// Always false when no sentinel path is configured.
    pub fn is_raised(&self) -> bool {
        self.path.as_deref().is_some_and(Path::exists)
    }

    /// Block until the sentinel is removed, re-checking every `poll_interval`
    pub async fn await_cleared(&self, poll_interval: Duration) {
        while self.is_raised() {
            sleep(poll_interval).await;
        }
    }
}
