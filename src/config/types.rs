//! Shared type definitions and closed enums for the mediation monitor.
//!
//! Everything security-relevant that crosses a module boundary lives here:
//! the error enum, the access-right mask, the wire-form access string, and
//! the decision/status enums the host sees.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

bitflags! {
    /// Access rights requested by a mediated operation.
    ///
    /// The set is closed: the host translates its protocol-level request
    /// into these bits before calling into the monitor. Bit positions are
    /// load-bearing for the screen-saver variant, which shifts the whole
    /// mask by [`AccessFlags::SAVER_SHIFT`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const READ      = 1 << 0;
        const WRITE     = 1 << 1;
        const DESTROY   = 1 << 2;
        const CREATE    = 1 << 3;
        const GET_ATTR  = 1 << 4;
        const SET_ATTR  = 1 << 5;
        const LIST_PROP = 1 << 6;
        const GET_PROP  = 1 << 7;
        const SET_PROP  = 1 << 8;
        const GET_FOCUS = 1 << 9;
        const SET_FOCUS = 1 << 10;
        const LIST      = 1 << 11;
        const ADD       = 1 << 12;
        const REMOVE    = 1 << 13;
        const HIDE      = 1 << 14;
        const SHOW      = 1 << 15;
        const GRAB      = 1 << 16;
        const FREEZE    = 1 << 17;
        const FORCE     = 1 << 18;
        const INSTALL   = 1 << 19;
        const UNINSTALL = 1 << 20;
        const SEND      = 1 << 21;
        const RECEIVE   = 1 << 22;
        const USE       = 1 << 23;
        const MANAGE    = 1 << 24;
        const DEBUG     = 1 << 25;
        const BELL      = 1 << 26;
        const POST      = 1 << 27;
        const BLEND     = 1 << 28;
    }
}

impl AccessFlags {
    /// Shift applied to the mask for screen-saver checks, mapping each
    /// ordinary right to a distinct while-saving right in higher bits.
    pub const SAVER_SHIFT: u32 = 2;

    /// Rights that count as "read" for the two-character access string.
    pub const READ_MASK: AccessFlags = AccessFlags::from_bits_retain(
        AccessFlags::READ.bits()
            | AccessFlags::GET_ATTR.bits()
            | AccessFlags::LIST_PROP.bits()
            | AccessFlags::GET_PROP.bits()
            | AccessFlags::GET_FOCUS.bits()
            | AccessFlags::LIST.bits()
            | AccessFlags::SHOW.bits()
            | AccessFlags::BLEND.bits()
            | AccessFlags::RECEIVE.bits()
            | AccessFlags::USE.bits()
            | AccessFlags::DEBUG.bits(),
    );

    /// Rights that count as "write" for the two-character access string.
    pub const WRITE_MASK: AccessFlags = AccessFlags::from_bits_retain(
        AccessFlags::WRITE.bits()
            | AccessFlags::DESTROY.bits()
            | AccessFlags::CREATE.bits()
            | AccessFlags::SET_ATTR.bits()
            | AccessFlags::SET_PROP.bits()
            | AccessFlags::SET_FOCUS.bits()
            | AccessFlags::ADD.bits()
            | AccessFlags::REMOVE.bits()
            | AccessFlags::HIDE.bits()
            | AccessFlags::GRAB.bits()
            | AccessFlags::FREEZE.bits()
            | AccessFlags::FORCE.bits()
            | AccessFlags::INSTALL.bits()
            | AccessFlags::UNINSTALL.bits()
            | AccessFlags::SEND.bits()
            | AccessFlags::MANAGE.bits()
            | AccessFlags::BELL.bits(),
    );

    pub fn wants_read(self) -> bool {
        self.intersects(Self::READ_MASK)
    }

    pub fn wants_write(self) -> bool {
        self.intersects(Self::WRITE_MASK)
    }

    /// The while-saving rendition of this mask. Bits shifted past the top
    /// of the defined set are retained so the read/write grouping still
    /// sees them.
    pub fn shifted_for_saver(self) -> Self {
        Self::from_bits_retain(self.bits() << Self::SAVER_SHIFT)
    }
}

/// Two-character access request in the decision interface's wire form:
/// `r` or `-`, then `w` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessString([u8; 2]);

impl AccessString {
    pub fn from_flags(mode: AccessFlags) -> Self {
        Self([
            if mode.wants_read() { b'r' } else { b'-' },
            if mode.wants_write() { b'w' } else { b'-' },
        ])
    }

    /// True when neither read nor write is actually requested. A vacuous
    /// request is always granted without consulting the oracle.
    pub fn is_vacuous(self) -> bool {
        self.0[0] == self.0[1]
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or("--")
    }
}

impl fmt::Display for AccessString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the access check algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckDecision {
    /// Access granted, locally or by the policy oracle.
    Allow,
    /// The policy oracle explicitly answered no.
    DenyPolicy,
    /// The oracle faulted mid-call. Treated as a denial, but surfaced to
    /// the host with a different status than a policy denial.
    DenyFault,
}

impl CheckDecision {
    pub fn allowed(self) -> bool {
        matches!(self, CheckDecision::Allow)
    }
}

/// Host-visible result of a mediation entry point. The host maps these onto
/// its protocol error codes.
///
/// Property and selection denials surface as [`MediationStatus::MatchError`]
/// regardless of cause, so a caller cannot tell a security denial from an
/// ordinary protocol mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediationStatus {
    /// The operation may proceed.
    Success,
    /// Policy denial.
    AccessError,
    /// Denial reported as a "no match" condition.
    MatchError,
    /// Malformed or faulted oracle communication.
    ValueError,
}

impl MediationStatus {
    pub fn success(self) -> bool {
        matches!(self, MediationStatus::Success)
    }
}

/// Errors surfaced by the monitor. Construction-time errors are fatal to
/// the embedding server; the monitor never runs partially wired.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Label storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
