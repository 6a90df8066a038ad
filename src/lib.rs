//! smackgate: Smack mandatory access control mediation for windowing servers
//!
//! A reference monitor an embedding display server wires into its request
//! loop. The monitor assigns security labels to active principals (client
//! connections, input devices) and passive resources (windows, properties,
//! selections, extensions, screens, generic resources), and mediates every
//! security-relevant operation by checking the subject/object label pair
//! against kernel policy before the operation proceeds.
//!
//! # Architecture
//!
//! ## Labels ([`label`])
//! - [`label::SmackLabel`]: bounded opaque security-context names
//! - Reserved labels, subject/object records, and object-label derivation
//!
//! ## Storage ([`store`])
//! - [`store::LabelStore`]: typed per-entity slots keyed by entity identity
//!
//! ## Policy oracle ([`oracle`])
//! - [`oracle::OracleClient`]: stateless open/write/read/close queries to
//!   the kernel decision interface, with a monotonic fail-open switch when
//!   the interface is absent
//!
//! ## Mediation ([`monitor`])
//! - [`monitor::SmackMonitor`]: the per-server context value
//! - Subject bootstrap for connecting principals and the server itself
//! - One typed mediation entry point per decision category
//!
//! ## Observability ([`observability`])
//! - [`observability::audit`]: structured audit events (JSON lines + log
//!   facade)
//!
//! ## Configuration & shared types ([`config`])
//! - [`config::MonitorConfig`]: interface paths and bootstrap knobs
//! - [`config::types`]: error enum, access masks, decision/status enums
//!
//! # Design principles
//!
//! 1. **Local truth first** - trusted, equal-label, and vacuous requests
//!    are decided without policy I/O and cannot be denied by a
//!    misconfigured oracle
//! 2. **Fail-open only for absence** - a missing decision interface
//!    disables checking for the process; a faulting one denies
//! 3. **Types prevent errors** - entry points, entity ids, and labelable
//!    kinds are closed sets; there is no runtime capability probing
//! 4. **No hidden state** - one monitor context, no process-global
//!    singletons

pub mod config;
pub mod label;
pub mod monitor;
pub mod observability;
pub mod oracle;
pub mod store;

// Re-export commonly used types for convenience
pub use config::types::*;
pub use config::MonitorConfig;
pub use label::{
    ObjectRecord, SmackLabel, SubjectKind, SubjectRecord, SMACK_DEFAULTED, SMACK_FLOOR,
    SMACK_STAR, SMACK_UNEXPECTED, SMACK_WEB,
};
pub use monitor::{
    ClientTargetAccess, DeviceAccess, ExtensionAccess, PropertyAccess, ReceiveAccess,
    ResourceAccess, ResourceHandle, ResourceVerdict, ScreenAccess, ScreenBootstrap,
    SelectionAccess, SendAccess, ServerAccess, SmackMonitor, WindowAuditLabels,
    AUDIT_PROPERTY_CLIENT_LABEL, AUDIT_PROPERTY_WINDOW_LABEL,
};
pub use oracle::{OracleClient, OracleVerdict};
pub use store::{
    ClientId, DeviceId, ExtensionId, PropertyId, ResourceId, ScreenId, SelectionId, WindowId,
};

// Root alias kept for embedders that import the shared types as a module.
pub mod types {
    pub use crate::config::types::*;
}
