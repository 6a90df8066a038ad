//! Configuration
//!
//! Monitor configuration and the shared type definitions.

pub mod types;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use types::{MonitorError, Result};

/// Configuration for a [`crate::monitor::SmackMonitor`].
///
/// The defaults carry the well-known kernel interface paths; an embedding
/// server normally only overrides `server_command` and `audit_log`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Primary path of the kernel's access decision interface.
    pub oracle_primary: PathBuf,
    /// Fallback decision interface path, tried when the primary fails.
    pub oracle_fallback: PathBuf,
    /// Virtual-filesystem path exposing this process's own security context.
    pub self_label_path: PathBuf,
    /// Command name recorded for the server's own pseudo-principal.
    pub server_command: String,
    /// Descriptors `0..ceiling` are scanned for inherited sockets to
    /// relabel at bootstrap. Zero disables the scan.
    pub relabel_fd_ceiling: i32,
    /// Optional JSON-lines audit trail. When set, failure to open the file
    /// is fatal at monitor construction.
    pub audit_log: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            oracle_primary: PathBuf::from("/sys/fs/smackfs/access2"),
            oracle_fallback: PathBuf::from("/smack/access2"),
            self_label_path: PathBuf::from("/proc/self/attr/current"),
            server_command: "display-server".to_string(),
            relabel_fd_ceiling: 256,
            audit_log: None,
        }
    }
}

impl MonitorConfig {
    /// Validate the configuration before wiring the monitor.
    pub fn validate(&self) -> Result<()> {
        if self.oracle_primary.as_os_str().is_empty() {
            return Err(MonitorError::Config(
                "oracle_primary must not be empty".to_string(),
            ));
        }
        if self.oracle_fallback.as_os_str().is_empty() {
            return Err(MonitorError::Config(
                "oracle_fallback must not be empty".to_string(),
            ));
        }
        if self.self_label_path.as_os_str().is_empty() {
            return Err(MonitorError::Config(
                "self_label_path must not be empty".to_string(),
            ));
        }
        if self.server_command.is_empty() {
            return Err(MonitorError::Config(
                "server_command must not be empty".to_string(),
            ));
        }
        if self.relabel_fd_ceiling < 0 {
            return Err(MonitorError::Config(format!(
                "relabel_fd_ceiling must be non-negative, got {}",
                self.relabel_fd_ceiling
            )));
        }
        Ok(())
    }
}
