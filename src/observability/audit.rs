//! Structured audit trail for the mediation monitor.
//!
//! Every security-relevant event is mirrored to the `log` facade at a
//! level matching its severity and, when an audit file is configured,
//! appended as one JSON line. The log is owned by the monitor context and
//! carries a per-instance correlation id; there is no process-global
//! logger state.

use crate::config::types::{MonitorError, Result};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Audit event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditSeverity {
    High,
    Medium,
    Low,
}

/// Types of security events the monitor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventKind {
    /// A mediated operation was denied by policy.
    AccessDenied,
    /// The decision interface faulted mid-call (fail-closed denial).
    OracleFault,
    /// The decision interface was found absent; checking is disabled for
    /// the rest of the process lifetime.
    OracleUnavailable,
    /// A newly connected principal finished its labeling sequence.
    SubjectLabeled,
    /// The server's own pseudo-principal was bootstrapped.
    ServerBootstrapped,
    /// An inherited socket descriptor was relabeled at startup.
    DescriptorRelabeled,
    /// A window was tracked and its audit properties computed.
    WindowTracked,
}

impl AuditEventKind {
    pub fn default_severity(self) -> AuditSeverity {
        match self {
            AuditEventKind::AccessDenied => AuditSeverity::Medium,
            AuditEventKind::OracleFault => AuditSeverity::High,
            AuditEventKind::OracleUnavailable => AuditSeverity::High,
            AuditEventKind::SubjectLabeled => AuditSeverity::Low,
            AuditEventKind::ServerBootstrapped => AuditSeverity::Low,
            AuditEventKind::DescriptorRelabeled => AuditSeverity::Low,
            AuditEventKind::WindowTracked => AuditSeverity::Low,
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditEventKind,
    pub severity: AuditSeverity,
    pub details: String,
    pub subject: Option<String>,
    pub object: Option<String>,
    pub access: Option<String>,
}

impl AuditEvent {
    pub fn new(kind: AuditEventKind, details: String) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            details,
            subject: None,
            object: None,
            access: None,
        }
    }

    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn with_object(mut self, object: &str) -> Self {
        self.object = Some(object.to_string());
        self
    }

    pub fn with_access(mut self, access: &str) -> Self {
        self.access = Some(access.to_string());
        self
    }
}

/// Monitor-owned audit sink.
pub struct AuditLog {
    monitor_id: Uuid,
    file: Option<Mutex<File>>,
}

impl AuditLog {
    /// Open the audit trail. A configured path that cannot be opened is an
    /// initialization error; with no path, events only reach the `log`
    /// facade.
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        MonitorError::Init(format!(
                            "failed to create audit log directory: {}",
                            e
                        ))
                    })?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        MonitorError::Init(format!("failed to open audit log: {}", e))
                    })?;
                Some(Mutex::new(file))
            }
            None => None,
        };
        Ok(Self {
            monitor_id: Uuid::new_v4(),
            file,
        })
    }

    pub fn monitor_id(&self) -> Uuid {
        self.monitor_id
    }

    /// Record one event. Failures to append are logged, never propagated;
    /// auditing must not change mediation outcomes.
    pub fn record(&self, event: AuditEvent) {
        match event.severity {
            AuditSeverity::High => error!("audit {:?}: {}", event.kind, event.details),
            AuditSeverity::Medium => warn!("audit {:?}: {}", event.kind, event.details),
            AuditSeverity::Low => info!("audit {:?}: {}", event.kind, event.details),
        }

        if let Some(file) = &self.file {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs();
            let line = serde_json::json!({
                "monitor_id": self.monitor_id.to_string(),
                "timestamp": timestamp,
                "event": event,
            });
            if let Ok(mut file) = file.lock() {
                if let Err(e) = writeln!(file, "{}", line) {
                    error!("failed to append to audit log: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn events_append_as_json_lines() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("audit.log");
        let log = AuditLog::new(Some(&path)).expect("open");

        log.record(
            AuditEvent::new(AuditEventKind::AccessDenied, "write denied".to_string())
                .with_subject("App::A")
                .with_object("App::B")
                .with_access("-w"),
        );
        log.record(AuditEvent::new(
            AuditEventKind::ServerBootstrapped,
            "server labeled".to_string(),
        ));

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            let value: serde_json::Value = serde_json::from_str(line).expect("valid json");
            assert!(value["monitor_id"].is_string());
            assert!(value["event"]["kind"].is_string());
        }
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("audit.log");
        assert!(AuditLog::new(Some(&path)).is_ok());
        assert!(path.parent().map(Path::exists).unwrap_or(false));
    }

    #[test]
    fn no_path_means_log_facade_only() {
        let log = AuditLog::new(None).expect("open");
        // Must not panic without a file sink.
        log.record(AuditEvent::new(
            AuditEventKind::OracleUnavailable,
            "interface absent".to_string(),
        ));
    }

    #[test]
    fn unopenable_path_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        // The path itself is an existing directory; opening it as a file fails.
        assert!(matches!(
            AuditLog::new(Some(dir.path())),
            Err(MonitorError::Init(_))
        ));
    }
}
