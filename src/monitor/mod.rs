//! The mediation monitor.
//!
//! [`SmackMonitor`] is one explicit context value constructed at server
//! startup and passed by reference into every mediation call. It owns the
//! label store, the oracle client, and the audit trail; there is no
//! file-scope or process-global monitor state.
//!
//! All mediation runs synchronously on the host's request loop thread.
//! The check path holds no locks and never suspends; the only blocking
//! I/O is the oracle's open/write/read/close sequence.

mod bootstrap;
mod mediate;

pub use bootstrap::ScreenBootstrap;
pub use mediate::{
    ClientTargetAccess, DeviceAccess, ExtensionAccess, PropertyAccess, ReceiveAccess,
    ResourceAccess, ResourceHandle, ResourceVerdict, ScreenAccess, SelectionAccess, SendAccess,
    ServerAccess, WindowAuditLabels, AUDIT_PROPERTY_CLIENT_LABEL, AUDIT_PROPERTY_WINDOW_LABEL,
};

use crate::config::types::{AccessFlags, AccessString, CheckDecision, Result};
use crate::config::MonitorConfig;
use crate::label::{ObjectRecord, SmackLabel, SubjectRecord};
use crate::observability::audit::{AuditEvent, AuditEventKind, AuditLog};
use crate::oracle::{OracleClient, OracleVerdict};
use crate::store::{ClientId, DeviceId, LabelStore, WindowId};
use log::{debug, warn};

pub struct SmackMonitor {
    config: MonitorConfig,
    oracle: OracleClient,
    store: LabelStore,
    audit: AuditLog,
}

impl SmackMonitor {
    /// Construct a fully wired monitor.
    ///
    /// Any failure here must be treated as fatal by the embedding server:
    /// the monitor never runs partially wired.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        let audit = AuditLog::new(config.audit_log.as_deref())?;
        let oracle = OracleClient::new(
            config.oracle_primary.clone(),
            config.oracle_fallback.clone(),
        );
        Ok(Self {
            config,
            oracle,
            store: LabelStore::default(),
            audit,
        })
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// True once the decision interface has been found absent and every
    /// delegated check answers Allow.
    pub fn oracle_unavailable(&self) -> bool {
        self.oracle.is_unavailable()
    }

    /// Subject record of a connected client, if one has been created.
    pub fn client_subject(&self, id: ClientId) -> Option<&SubjectRecord> {
        self.store.get_client(id).map(|slot| &slot.subject)
    }

    /// Subject record of a labeled device, if one has been created.
    pub fn device_subject(&self, id: DeviceId) -> Option<&SubjectRecord> {
        self.store.get_device(id).map(|slot| &slot.subject)
    }

    /// Object label of a tracked window, if one has been created.
    pub fn window_label(&self, id: WindowId) -> Option<&SmackLabel> {
        self.store.get_window(id).map(|object| &object.smack)
    }

    /// The core access decision: local short-circuit rules first, oracle
    /// delegation last. Rules 1-4 must not reach the oracle; trusted,
    /// universal, equal-label, and vacuous requests cannot be denied by a
    /// misconfigured policy.
    pub(crate) fn check(
        &self,
        subject: &SubjectRecord,
        object: &ObjectRecord,
        mode: AccessFlags,
    ) -> CheckDecision {
        let access = AccessString::from_flags(mode);

        // 1. Privileged subjects get access.
        if subject.privileged {
            return CheckDecision::Allow;
        }

        // 2. Objects created by privileged or web subjects are accessible
        //    to everyone.
        if object.smack.is_universal() {
            return CheckDecision::Allow;
        }

        // 3. Equal labels: the answer is known.
        if subject.smack == object.smack {
            return CheckDecision::Allow;
        }

        // 4. Vacuous request: nothing to decide.
        if access.is_vacuous() {
            return CheckDecision::Allow;
        }

        match self
            .oracle
            .query(subject.smack.as_str(), object.smack.as_str(), access.as_str())
        {
            Ok(OracleVerdict::Allow) => {
                debug!(
                    "check \"{}\" \"{}\" {} allowed by policy ({})",
                    subject.smack, object.smack, access, subject.command
                );
                CheckDecision::Allow
            }
            Ok(OracleVerdict::Deny) => {
                self.audit.record(
                    AuditEvent::new(
                        AuditEventKind::AccessDenied,
                        format!("policy denied {} access", access),
                    )
                    .with_subject(subject.smack.as_str())
                    .with_object(object.smack.as_str())
                    .with_access(access.as_str()),
                );
                CheckDecision::DenyPolicy
            }
            Err(e) => {
                warn!(
                    "oracle fault checking \"{}\" \"{}\" {}: {}",
                    subject.smack, object.smack, access, e
                );
                self.audit.record(
                    AuditEvent::new(AuditEventKind::OracleFault, e.to_string())
                        .with_subject(subject.smack.as_str())
                        .with_object(object.smack.as_str())
                        .with_access(access.as_str()),
                );
                CheckDecision::DenyFault
            }
        }
    }
}
