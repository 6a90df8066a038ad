//! Synchronous client for the kernel's access decision interface.
//!
//! Each query is a stateless open -> write -> read -> close sequence
//! against a well-known filesystem path (primary, then fallback). The
//! request is one line, `"<subject> <object> <access>\0"`, and the answer
//! is a single byte: `'1'` allows, anything else denies.
//!
//! Availability is decided once: if neither path can be opened before the
//! interface was ever confirmed present, the client marks itself
//! unavailable for the remainder of the process and answers Allow from
//! then on. An I/O fault on an interface that did open is an error the
//! caller must treat as a denial. The Allow/Deny asymmetry between
//! "absent" and "faulting" is deliberate.

use crate::config::types::{MonitorError, Result};
use crate::label::SMACK_SIZE;
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Answer from the decision interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleVerdict {
    Allow,
    Deny,
}

/// Capacity for one `"<subject> <object> <access>\0"` request. Sized for
/// two maximum-length labels, the access string, separators, and the
/// terminator; the query path never allocates.
const REQUEST_CAP: usize = SMACK_SIZE + SMACK_SIZE + 10;

pub struct OracleClient {
    primary: PathBuf,
    fallback: PathBuf,
    /// Monotonic: set once when the interface is found absent, never
    /// cleared for the life of the process. Relaxed ordering suffices;
    /// mediation is single-threaded and the flag only ever goes one way.
    unavailable: AtomicBool,
}

impl OracleClient {
    pub fn new(primary: PathBuf, fallback: PathBuf) -> Self {
        Self {
            primary,
            fallback,
            unavailable: AtomicBool::new(false),
        }
    }

    /// True once the interface has been found absent and the client has
    /// switched to answering Allow unconditionally.
    pub fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::Relaxed)
    }

    /// Ask whether `subject` may perform `access` on `object`.
    ///
    /// `Err` means the interface was present but faulted mid-call; the
    /// caller must treat that as a denial.
    pub fn query(&self, subject: &str, object: &str, access: &str) -> Result<OracleVerdict> {
        if self.is_unavailable() {
            return Ok(OracleVerdict::Allow);
        }

        let mut file = match self.open_interface() {
            Some(file) => file,
            None => {
                warn!("Smack access checking is unavailable");
                self.unavailable.store(true, Ordering::Relaxed);
                return Ok(OracleVerdict::Allow);
            }
        };

        let mut request = [0u8; REQUEST_CAP];
        let len = format_request(&mut request, subject, object, access)?;

        file.write_all(&request[..len]).map_err(|e| {
            MonitorError::Oracle(format!("decision interface write failed: {}", e))
        })?;

        let mut response = [0u8; 1];
        let n = file.read(&mut response).map_err(|e| {
            MonitorError::Oracle(format!("decision interface read failed: {}", e))
        })?;

        let verdict = parse_response(n, response[0]);
        debug!(
            "oracle \"{}\" \"{}\" {} -> {:?}",
            subject, object, access, verdict
        );
        Ok(verdict)
    }

    fn open_interface(&self) -> Option<File> {
        open_rw(&self.primary).or_else(|| open_rw(&self.fallback))
    }
}

fn open_rw(path: &Path) -> Option<File> {
    OpenOptions::new().read(true).write(true).open(path).ok()
}

/// Format the request into a fixed-capacity buffer, returning the number
/// of bytes written (terminator included). Overflow is an oracle error.
fn format_request(buf: &mut [u8], subject: &str, object: &str, access: &str) -> Result<usize> {
    let capacity = buf.len();
    let mut cursor: &mut [u8] = buf;
    write!(cursor, "{} {} {}\0", subject, object, access).map_err(|e| {
        MonitorError::Oracle(format!("access request does not fit: {}", e))
    })?;
    let remaining = cursor.len();
    Ok(capacity - remaining)
}

/// Only a full read of a leading `'1'` allows; a short read or any other
/// byte denies.
fn parse_response(n: usize, byte: u8) -> OracleVerdict {
    if n == 1 && byte == b'1' {
        OracleVerdict::Allow
    } else {
        OracleVerdict::Deny
    }
}
