//! Security labels and the per-entity records that carry them.
//!
//! A label is an opaque security-context name, bounded at [`SMACK_SIZE`]
//! bytes. Subjects (client connections, input devices) carry a label plus
//! privilege and diagnostics; objects (windows, properties, selections,
//! extensions, screens, generic resources) carry only a label.

mod derive;

pub use derive::{create_object, object_from_subject};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum label length in bytes.
pub const SMACK_SIZE: usize = 256;

/// Maximum recorded command-name length in bytes.
pub const COMMAND_LEN: usize = 64;

/// Reserved label: accessible to and from everything.
pub const SMACK_STAR: &str = "*";
/// Reserved label: the lowest label, the fallback when no security context
/// is discoverable for the server process itself.
pub const SMACK_FLOOR: &str = "_";
/// Reserved label: marks network-originated principals. Objects created
/// from a web-labeled subject become wildcard-accessible.
pub const SMACK_WEB: &str = "@";
/// Placeholder assigned before real labeling completes.
pub const SMACK_DEFAULTED: &str = "DEFAULTED";
/// Marks an entity found unlabeled at a point where labeling should
/// already have happened.
pub const SMACK_UNEXPECTED: &str = "UNEXPECTED";

/// An opaque, bounded security-context name.
///
/// Invariant: once non-empty, a label never regresses to empty. Assigning
/// an empty value over a set label is ignored.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SmackLabel(String);

impl SmackLabel {
    pub fn new(value: &str) -> Self {
        let mut label = Self::default();
        label.assign(value);
        label
    }

    /// Assign a new value, truncating to [`SMACK_SIZE`] bytes on a
    /// character boundary.
    pub fn assign(&mut self, value: &str) {
        if value.is_empty() && self.is_set() {
            return;
        }
        self.0 = truncate_on_boundary(value, SMACK_SIZE);
    }

    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }

    /// Wildcard-all and web objects are accessible to every subject.
    pub fn is_universal(&self) -> bool {
        self.0 == SMACK_STAR || self.0 == SMACK_WEB
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SmackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SmackLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SmackLabel({:?})", self.0)
    }
}

fn truncate_on_boundary(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// The kind of active principal a subject record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    Client,
    Device,
}

/// State for an active principal: a client connection or an input device.
///
/// Privileged subjects bypass every check, and objects they create become
/// wildcard-accessible. `command` is diagnostics only, never enforced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub smack: SmackLabel,
    pub command: String,
    pub privileged: bool,
    pub kind: SubjectKind,
}

impl SubjectRecord {
    pub fn new(kind: SubjectKind) -> Self {
        Self {
            smack: SmackLabel::default(),
            command: String::new(),
            privileged: false,
            kind,
        }
    }

    pub fn set_command(&mut self, command: &str) {
        self.command = truncate_on_boundary(command, COMMAND_LEN);
    }
}

/// State for a passive resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub smack: SmackLabel,
}
