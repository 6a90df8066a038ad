//! Mediation dispatch.
//!
//! One strongly-typed entry point per decision category. Each entry point
//! resolves the subject and object records for the participating entities,
//! labels new objects on creation-flagged events, runs the access check,
//! and reports a host-visible status the host maps onto its protocol
//! error codes.

use super::SmackMonitor;
use crate::config::types::{AccessFlags, CheckDecision, MediationStatus};
use crate::label::{create_object, object_from_subject, SmackLabel, SubjectRecord};
use crate::label::{SMACK_STAR, SMACK_UNEXPECTED, SMACK_WEB};
use crate::observability::audit::{AuditEvent, AuditEventKind};
use crate::store::{
    ClientId, DeviceId, ExtensionId, PropertyId, ResourceId, ScreenId, SelectionId, WindowId,
};
use log::warn;

/// Audit property published on every tracked window: the window's object
/// label. Write-only output for external inspection tools.
pub const AUDIT_PROPERTY_WINDOW_LABEL: &str = "_SMACK_LABEL";
/// Audit property published on every tracked window: the owning client's
/// subject label.
pub const AUDIT_PROPERTY_CLIENT_LABEL: &str = "_SMACK_CLIENT_LABEL";

/// A client operating on an input device.
#[derive(Debug, Clone, Copy)]
pub struct DeviceAccess {
    pub client: ClientId,
    pub device: DeviceId,
    pub access: AccessFlags,
}

/// The target of a generic resource access. The set of kinds with their
/// own label storage is closed; everything else resolves to the owning
/// client's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceHandle {
    Window(WindowId),
    Resource(ResourceId),
    /// A resource kind without private label storage; the owning client's
    /// substitute object label applies.
    ClientOwned,
}

/// A client operating on another client's resource.
#[derive(Debug, Clone, Copy)]
pub struct ResourceAccess {
    pub client: ClientId,
    /// The client owning the resource.
    pub owner: ClientId,
    pub target: ResourceHandle,
    /// Parent object for creation-time label inheritance, when the host
    /// knows one. A `ClientOwned` parent is treated as no parent.
    pub parent: Option<ResourceHandle>,
    pub access: AccessFlags,
}

/// Result of a resource mediation.
#[derive(Debug, Clone, Copy)]
pub struct ResourceVerdict {
    pub status: MediationStatus,
    /// Set when a new window failed its blend check: the host must force
    /// the window's background to unpainted instead of failing creation.
    pub forced_background: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PropertyAccess {
    pub client: ClientId,
    pub property: PropertyId,
    pub access: AccessFlags,
}

#[derive(Debug, Clone, Copy)]
pub struct SelectionAccess {
    pub client: ClientId,
    pub selection: SelectionId,
    pub access: AccessFlags,
}

/// An event sent toward a window, by a client or on behalf of a device.
#[derive(Debug, Clone, Copy)]
pub struct SendAccess {
    pub client: ClientId,
    pub device: Option<DeviceId>,
    pub window: WindowId,
}

/// A client receiving events from a window.
#[derive(Debug, Clone, Copy)]
pub struct ReceiveAccess {
    pub client: ClientId,
    pub window: WindowId,
}

#[derive(Debug, Clone, Copy)]
pub struct ExtensionAccess {
    pub client: ClientId,
    pub extension: ExtensionId,
    pub access: AccessFlags,
}

#[derive(Debug, Clone, Copy)]
pub struct ScreenAccess {
    pub client: ClientId,
    pub screen: ScreenId,
    pub access: AccessFlags,
    /// Screen-saver variant: evaluate the while-saving rendition of the
    /// requested rights.
    pub saver: bool,
}

/// A client operating directly on another client.
#[derive(Debug, Clone, Copy)]
pub struct ClientTargetAccess {
    pub client: ClientId,
    pub target: ClientId,
    pub access: AccessFlags,
}

/// A client operating on server-global state.
#[derive(Debug, Clone, Copy)]
pub struct ServerAccess {
    pub client: ClientId,
    pub access: AccessFlags,
}

/// The two audit property values to publish on a tracked window.
#[derive(Debug, Clone)]
pub struct WindowAuditLabels {
    /// Value for [`AUDIT_PROPERTY_CLIENT_LABEL`].
    pub client_label: SmackLabel,
    /// Value for [`AUDIT_PROPERTY_WINDOW_LABEL`].
    pub window_label: SmackLabel,
}

fn protocol_status(decision: CheckDecision) -> MediationStatus {
    match decision {
        CheckDecision::Allow => MediationStatus::Success,
        CheckDecision::DenyPolicy => MediationStatus::AccessError,
        CheckDecision::DenyFault => MediationStatus::ValueError,
    }
}

impl SmackMonitor {
    /// Mediate device access. On creation the device also becomes a
    /// subject: privileged creators produce a web-labeled device that may
    /// write everywhere and be written by anyone; otherwise the device
    /// carries its creator's label.
    pub fn mediate_device(&mut self, req: &DeviceAccess) -> MediationStatus {
        let subject = self.store.client(req.client).subject.clone();

        if req.access.contains(AccessFlags::CREATE) {
            let device = self.store.device(req.device);
            device.subject.privileged = subject.privileged;
            if subject.privileged {
                device.subject.smack.assign(SMACK_WEB);
            } else {
                device.subject.smack.assign(subject.smack.as_str());
            }
            create_object(&subject, &mut device.object);
        }

        let object = self.store.device(req.device).object.clone();
        protocol_status(self.check(&subject, &object, req.access))
    }

    /// Mediate generic resource access.
    ///
    /// A denial suppresses the operation only when neither the requesting
    /// subject nor the owning client is privileged; privilege on either
    /// side of a resource relationship is sufficient.
    pub fn mediate_resource(&mut self, req: &ResourceAccess) -> ResourceVerdict {
        let create = req.access.contains(AccessFlags::CREATE);
        let subject = self.store.client(req.client).subject.clone();
        let owner_subject = self.store.client(req.owner).subject.clone();

        if create {
            self.label_new_resource(&subject, req);
        }

        let object = match req.target {
            ResourceHandle::Window(id) => self.store.window(id).clone(),
            ResourceHandle::Resource(id) => self.store.resource(id).clone(),
            ResourceHandle::ClientOwned => self.store.client(req.owner).object.clone(),
        };

        let decision = self.check(&subject, &object, req.access);
        let status = if !subject.privileged && !owner_subject.privileged && !decision.allowed() {
            protocol_status(decision)
        } else {
            MediationStatus::Success
        };

        // Background-none check on new windows: a blend denial degrades
        // the window instead of failing its creation.
        let mut forced_background = false;
        if create && matches!(req.target, ResourceHandle::Window(_)) {
            if !self.check(&subject, &object, AccessFlags::BLEND).allowed() {
                forced_background = true;
                warn!(
                    "window blend check failed for \"{}\", forcing background",
                    subject.smack
                );
            }
        }

        ResourceVerdict {
            status,
            forced_background,
        }
    }

    /// Label a newly created resource, exactly once per object. The
    /// parent's label is used instead of the subject's own when the
    /// subject can already access the parent with the requested mode.
    fn label_new_resource(&mut self, subject: &SubjectRecord, req: &ResourceAccess) {
        let already_set = match req.target {
            ResourceHandle::Window(id) => self.store.window(id).smack.is_set(),
            ResourceHandle::Resource(id) => self.store.resource(id).smack.is_set(),
            ResourceHandle::ClientOwned => return,
        };
        if already_set {
            return;
        }

        if subject.privileged {
            if let Some(label) = self.resource_label_mut(req.target) {
                label.assign(SMACK_STAR);
            }
            return;
        }

        let mut source = subject.smack.clone();
        if let Some(parent) = req.parent {
            let parent_object = match parent {
                ResourceHandle::Window(id) => Some(self.store.window(id).clone()),
                ResourceHandle::Resource(id) => Some(self.store.resource(id).clone()),
                ResourceHandle::ClientOwned => None,
            };
            if let Some(parent_object) = parent_object {
                if self.check(subject, &parent_object, req.access).allowed() {
                    source = parent_object.smack;
                }
            }
        }

        let derived = object_from_subject(&source);
        if let Some(label) = self.resource_label_mut(req.target) {
            label.assign(derived.as_str());
        }
    }

    fn resource_label_mut(&mut self, target: ResourceHandle) -> Option<&mut SmackLabel> {
        match target {
            ResourceHandle::Window(id) => Some(&mut self.store.window(id).smack),
            ResourceHandle::Resource(id) => Some(&mut self.store.resource(id).smack),
            // ClientOwned resources are never labeled through the handle.
            ResourceHandle::ClientOwned => None,
        }
    }

    /// Mediate property access. Denials surface as a match error, and the
    /// advisory content label is refreshed on successful writes.
    pub fn mediate_property(&mut self, req: &PropertyAccess) -> MediationStatus {
        // Post-notification traffic is not a property access.
        if req.access.contains(AccessFlags::POST) {
            return MediationStatus::Success;
        }

        let subject = self.store.client(req.client).subject.clone();

        if req.access.contains(AccessFlags::CREATE) {
            let slot = self.store.property(req.property);
            create_object(&subject, &mut slot.object);
        }

        let object = self.store.property(req.property).object.clone();
        if !self.check(&subject, &object, req.access).allowed() {
            return MediationStatus::MatchError;
        }

        // Label the content (advisory only).
        if req.access.contains(AccessFlags::WRITE) {
            let slot = self.store.property(req.property);
            slot.content.smack.assign(object.smack.as_str());
        }
        MediationStatus::Success
    }

    /// Mediate selection access. Creation remaps the checked mode to
    /// set-attribute; denials surface as a match error so the data simply
    /// is not passed along.
    pub fn mediate_selection(&mut self, req: &SelectionAccess) -> MediationStatus {
        let subject = self.store.client(req.client).subject.clone();

        let mut mode = req.access;
        if req.access.contains(AccessFlags::CREATE) {
            let slot = self.store.selection(req.selection);
            create_object(&subject, &mut slot.object);
            mode = AccessFlags::SET_ATTR;
        }

        let object = self.store.selection(req.selection).object.clone();
        if !self.check(&subject, &object, mode).allowed() {
            return MediationStatus::MatchError;
        }

        if mode.contains(AccessFlags::SET_ATTR) {
            let slot = self.store.selection(req.selection);
            slot.content.smack.assign(object.smack.as_str());
        }
        MediationStatus::Success
    }

    /// Mediate an event sent toward a window. When a device originates the
    /// event, the device is the subject; otherwise the sending client is.
    pub fn mediate_send(&mut self, req: &SendAccess) -> MediationStatus {
        let subject = match req.device {
            Some(device) => self.store.device(device).subject.clone(),
            None => self.store.client(req.client).subject.clone(),
        };
        let object = self.store.window(req.window).clone();
        protocol_status(self.check(&subject, &object, AccessFlags::SEND))
    }

    /// Mediate a client receiving events from a window.
    pub fn mediate_receive(&mut self, req: &ReceiveAccess) -> MediationStatus {
        let subject = self.store.client(req.client).subject.clone();
        let object = self.store.window(req.window).clone();
        protocol_status(self.check(&subject, &object, AccessFlags::RECEIVE))
    }

    /// Mediate extension access. Extension objects belong to the server,
    /// so an unlabeled extension is labeled from the server's subject, not
    /// the requesting client's.
    pub fn mediate_extension(&mut self, req: &ExtensionAccess) -> MediationStatus {
        let subject = self.store.client(req.client).subject.clone();

        if !self.store.extension(req.extension).smack.is_set() {
            let server = self.store.client(ClientId::SERVER).subject.clone();
            create_object(&server, self.store.extension(req.extension));
        }

        let object = self.store.extension(req.extension).clone();
        protocol_status(self.check(&subject, &object, req.access))
    }

    /// Mediate screen access, including the screen-saver variant.
    pub fn mediate_screen(&mut self, req: &ScreenAccess) -> MediationStatus {
        let subject = self.store.client(req.client).subject.clone();

        if req.access.contains(AccessFlags::CREATE) {
            create_object(&subject, self.store.screen(req.screen));
        }

        // Saver checks reuse the same rights two bits up the mask.
        let mode = if req.saver {
            req.access.shifted_for_saver()
        } else {
            req.access
        };

        let object = self.store.screen(req.screen).clone();
        protocol_status(self.check(&subject, &object, mode))
    }

    /// Mediate direct inter-client access.
    pub fn mediate_client(&mut self, req: &ClientTargetAccess) -> MediationStatus {
        let subject = self.store.client(req.client).subject.clone();
        let object = self.store.client(req.target).object.clone();
        protocol_status(self.check(&subject, &object, req.access))
    }

    /// Mediate access to server-global state. Skipped entirely while the
    /// server's own subject is privileged.
    pub fn mediate_server(&mut self, req: &ServerAccess) -> MediationStatus {
        if self.store.client(ClientId::SERVER).subject.privileged {
            return MediationStatus::Success;
        }
        let subject = self.store.client(req.client).subject.clone();
        let object = self.store.client(ClientId::SERVER).object.clone();
        protocol_status(self.check(&subject, &object, req.access))
    }

    /// Compute the audit property values for a newly added window. Records
    /// found unlabeled at this point are marked `UNEXPECTED`; labeling
    /// should already have happened.
    pub fn track_window(&mut self, window: WindowId, owner: ClientId) -> WindowAuditLabels {
        {
            let subject = &mut self.store.client(owner).subject;
            if !subject.smack.is_set() {
                warn!("unexpected unlabeled client {:?}", owner);
                subject.smack.assign(SMACK_UNEXPECTED);
            }
        }
        let client_label = self.store.client(owner).subject.smack.clone();

        {
            let object = self.store.window(window);
            if !object.smack.is_set() {
                warn!("unexpected unlabeled window {:?}", window);
                object.smack.assign(SMACK_UNEXPECTED);
            }
        }
        let window_label = self.store.window(window).smack.clone();

        self.audit.record(
            AuditEvent::new(
                AuditEventKind::WindowTracked,
                format!("window {} tracked", window.0),
            )
            .with_subject(client_label.as_str())
            .with_object(window_label.as_str()),
        );

        WindowAuditLabels {
            client_label,
            window_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use std::fs;
    use tempfile::TempDir;

    /// Monitor wired to a regular-file oracle: present, answers Deny, and
    /// records the request wire format for inspection.
    fn monitor_with_file_oracle(dir: &TempDir) -> SmackMonitor {
        fs::write(dir.path().join("access2"), b"").expect("create oracle file");
        monitor_without_oracle(dir)
    }

    fn monitor_without_oracle(dir: &TempDir) -> SmackMonitor {
        let config = MonitorConfig {
            oracle_primary: dir.path().join("access2"),
            oracle_fallback: dir.path().join("fallback"),
            self_label_path: dir.path().join("self-label"),
            relabel_fd_ceiling: 0,
            ..MonitorConfig::default()
        };
        SmackMonitor::new(config).expect("monitor")
    }

    /// Install a client the way bootstrap would have labeled it.
    fn seed_client(monitor: &mut SmackMonitor, id: ClientId, label: &str, privileged: bool) {
        let slot = monitor.store.client(id);
        slot.subject.smack.assign(label);
        slot.subject.privileged = privileged;
        let derived = object_from_subject(&slot.subject.smack);
        slot.object.smack.assign(derived.as_str());
    }

    fn oracle_request(dir: &TempDir) -> Vec<u8> {
        fs::read(dir.path().join("access2")).expect("read oracle file")
    }

    #[test]
    fn window_created_by_client_carries_its_label() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let verdict = monitor.mediate_resource(&ResourceAccess {
            client: ClientId(1),
            owner: ClientId(1),
            target: ResourceHandle::Window(WindowId(10)),
            parent: None,
            access: AccessFlags::CREATE,
        });
        assert!(verdict.status.success());
        assert!(!verdict.forced_background);
        assert_eq!(
            monitor.window_label(WindowId(10)).expect("label").as_str(),
            "App::A"
        );
        // Equal labels on every check: the oracle saw nothing.
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn foreign_write_consults_oracle_and_denies() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        seed_client(&mut monitor, ClientId(2), "App::B", false);

        monitor.mediate_resource(&ResourceAccess {
            client: ClientId(1),
            owner: ClientId(1),
            target: ResourceHandle::Window(WindowId(10)),
            parent: None,
            access: AccessFlags::CREATE,
        });

        let verdict = monitor.mediate_resource(&ResourceAccess {
            client: ClientId(2),
            owner: ClientId(1),
            target: ResourceHandle::Window(WindowId(10)),
            parent: None,
            access: AccessFlags::WRITE,
        });
        assert_eq!(verdict.status, MediationStatus::AccessError);
        assert_eq!(&oracle_request(&dir), b"App::B App::A -w\0");
    }

    #[test]
    fn privilege_on_either_side_lets_resource_access_through() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        seed_client(&mut monitor, ClientId(2), "System", true);

        // Owner privileged, requester not: the check may fail but the
        // operation proceeds.
        let verdict = monitor.mediate_resource(&ResourceAccess {
            client: ClientId(1),
            owner: ClientId(2),
            target: ResourceHandle::ClientOwned,
            parent: None,
            access: AccessFlags::WRITE,
        });
        assert!(verdict.status.success());
    }

    #[test]
    fn client_owned_resources_use_owner_substitute_label() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        seed_client(&mut monitor, ClientId(2), "App::B", false);

        let verdict = monitor.mediate_resource(&ResourceAccess {
            client: ClientId(1),
            owner: ClientId(2),
            target: ResourceHandle::ClientOwned,
            parent: None,
            access: AccessFlags::READ,
        });
        assert_eq!(verdict.status, MediationStatus::AccessError);
        assert_eq!(&oracle_request(&dir), b"App::A App::B r-\0");
    }

    #[test]
    fn resource_inherits_accessible_parent_label() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(4), "App::Sub", false);
        monitor.store.window(WindowId(20)).smack.assign("*");

        monitor.mediate_resource(&ResourceAccess {
            client: ClientId(4),
            owner: ClientId(4),
            target: ResourceHandle::Resource(ResourceId(30)),
            parent: Some(ResourceHandle::Window(WindowId(20))),
            access: AccessFlags::CREATE,
        });
        // The wildcard parent is accessible, so the child inherits it.
        assert_eq!(
            monitor.store.get_resource(ResourceId(30)).expect("slot").smack.as_str(),
            "*"
        );
    }

    #[test]
    fn resource_falls_back_to_subject_when_parent_inaccessible() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(4), "App::Sub", false);
        monitor.store.window(WindowId(21)).smack.assign("Par");

        monitor.mediate_resource(&ResourceAccess {
            client: ClientId(4),
            owner: ClientId(4),
            target: ResourceHandle::Resource(ResourceId(31)),
            parent: Some(ResourceHandle::Window(WindowId(21))),
            access: AccessFlags::CREATE,
        });
        // The file oracle denies the parent check; derive from the subject.
        assert_eq!(
            monitor.store.get_resource(ResourceId(31)).expect("slot").smack.as_str(),
            "App::Sub"
        );
    }

    #[test]
    fn labeling_happens_exactly_once() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(4), "App::Sub", false);
        monitor.store.resource(ResourceId(32)).smack.assign("Kept");

        monitor.mediate_resource(&ResourceAccess {
            client: ClientId(4),
            owner: ClientId(4),
            target: ResourceHandle::Resource(ResourceId(32)),
            parent: None,
            access: AccessFlags::CREATE,
        });
        assert_eq!(
            monitor.store.get_resource(ResourceId(32)).expect("slot").smack.as_str(),
            "Kept"
        );
    }

    #[test]
    fn denied_blend_forces_background_without_failing_creation_path() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(4), "App::Sub", false);
        // The window already carries a foreign label, so both the main and
        // the blend check go to the denying oracle.
        monitor.store.window(WindowId(40)).smack.assign("Other");

        let verdict = monitor.mediate_resource(&ResourceAccess {
            client: ClientId(4),
            owner: ClientId(4),
            target: ResourceHandle::Window(WindowId(40)),
            parent: None,
            access: AccessFlags::CREATE,
        });
        assert!(verdict.forced_background);
        assert_eq!(verdict.status, MediationStatus::AccessError);
    }

    #[test]
    fn privileged_creator_makes_web_device() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(3), "System", true);

        let status = monitor.mediate_device(&DeviceAccess {
            client: ClientId(3),
            device: DeviceId(1),
            access: AccessFlags::CREATE,
        });
        assert!(status.success());

        let device = monitor.device_subject(DeviceId(1)).expect("device");
        assert_eq!(device.smack.as_str(), "@");
        assert!(device.privileged);

        // The device object is wildcard: any unprivileged subject reaches
        // it without an oracle call.
        seed_client(&mut monitor, ClientId(5), "App::C", false);
        let status = monitor.mediate_device(&DeviceAccess {
            client: ClientId(5),
            device: DeviceId(1),
            access: AccessFlags::READ | AccessFlags::WRITE,
        });
        assert!(status.success());
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn unprivileged_creator_labels_device_with_own_label() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(6), "App::D", false);

        monitor.mediate_device(&DeviceAccess {
            client: ClientId(6),
            device: DeviceId(2),
            access: AccessFlags::CREATE,
        });
        let device = monitor.device_subject(DeviceId(2)).expect("device");
        assert_eq!(device.smack.as_str(), "App::D");
        assert!(!device.privileged);
    }

    #[test]
    fn property_write_copies_content_label_on_success() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let status = monitor.mediate_property(&PropertyAccess {
            client: ClientId(1),
            property: PropertyId(7),
            access: AccessFlags::CREATE | AccessFlags::WRITE,
        });
        assert!(status.success());

        let slot = monitor.store.get_property(PropertyId(7)).expect("slot");
        assert_eq!(slot.object.smack.as_str(), "App::A");
        assert_eq!(slot.content.smack.as_str(), "App::A");
    }

    #[test]
    fn denied_property_access_is_a_match_error_and_leaves_content_alone() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        monitor.store.property(PropertyId(8)).object.smack.assign("Other");

        let status = monitor.mediate_property(&PropertyAccess {
            client: ClientId(1),
            property: PropertyId(8),
            access: AccessFlags::WRITE,
        });
        assert_eq!(status, MediationStatus::MatchError);
        let slot = monitor.store.get_property(PropertyId(8)).expect("slot");
        assert!(!slot.content.smack.is_set());
    }

    #[test]
    fn post_access_skips_property_mediation() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let status = monitor.mediate_property(&PropertyAccess {
            client: ClientId(1),
            property: PropertyId(9),
            access: AccessFlags::POST,
        });
        assert!(status.success());
        // Nothing was resolved or labeled.
        assert!(monitor.store.get_property(PropertyId(9)).is_none());
    }

    #[test]
    fn selection_creation_remaps_to_set_attr_and_labels_content() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let status = monitor.mediate_selection(&SelectionAccess {
            client: ClientId(1),
            selection: SelectionId(1),
            access: AccessFlags::CREATE,
        });
        assert!(status.success());
        let slot = monitor.store.get_selection(SelectionId(1)).expect("slot");
        assert_eq!(slot.object.smack.as_str(), "App::A");
        assert_eq!(slot.content.smack.as_str(), "App::A");
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn denied_selection_access_is_a_match_error() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        monitor.store.selection(SelectionId(2)).object.smack.assign("Other");

        let status = monitor.mediate_selection(&SelectionAccess {
            client: ClientId(1),
            selection: SelectionId(2),
            access: AccessFlags::READ,
        });
        assert_eq!(status, MediationStatus::MatchError);
    }

    #[test]
    fn send_uses_device_subject_when_present() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        monitor.store.device(DeviceId(3)).subject.smack.assign("Dev");
        monitor.store.window(WindowId(11)).smack.assign("Dev");

        let status = monitor.mediate_send(&SendAccess {
            client: ClientId(1),
            device: Some(DeviceId(3)),
            window: WindowId(11),
        });
        // Device label equals the window label; the client's does not.
        assert!(status.success());
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn receive_checks_client_against_window() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        monitor.store.window(WindowId(12)).smack.assign("Other");

        let status = monitor.mediate_receive(&ReceiveAccess {
            client: ClientId(1),
            window: WindowId(12),
        });
        assert_eq!(status, MediationStatus::AccessError);
        assert_eq!(&oracle_request(&dir), b"App::A Other r-\0");
    }

    #[test]
    fn extensions_are_labeled_from_the_server_subject() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId::SERVER, "System", true);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let status = monitor.mediate_extension(&ExtensionAccess {
            client: ClientId(1),
            extension: ExtensionId(1),
            access: AccessFlags::USE,
        });
        // Privileged server subject labels the extension wildcard, so any
        // client may use it without an oracle call.
        assert!(status.success());
        assert_eq!(
            monitor.store.get_extension(ExtensionId(1)).expect("slot").smack.as_str(),
            "*"
        );
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn saver_variant_shifts_the_checked_mode() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(5), "App::A", false);
        monitor.store.screen(ScreenId(0)).smack.assign("Other");

        let status = monitor.mediate_screen(&ScreenAccess {
            client: ClientId(5),
            screen: ScreenId(0),
            access: AccessFlags::READ,
            saver: true,
        });
        assert_eq!(status, MediationStatus::AccessError);
        // READ shifted into the while-saving range lands on a write-class
        // bit, so the oracle sees "-w".
        assert_eq!(&oracle_request(&dir), b"App::A Other -w\0");
    }

    #[test]
    fn inter_client_access_checks_target_object() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        seed_client(&mut monitor, ClientId(2), "App::B", false);

        let status = monitor.mediate_client(&ClientTargetAccess {
            client: ClientId(1),
            target: ClientId(2),
            access: AccessFlags::MANAGE,
        });
        assert_eq!(status, MediationStatus::AccessError);

        // Equal labels are always fine.
        seed_client(&mut monitor, ClientId(3), "App::A", false);
        let status = monitor.mediate_client(&ClientTargetAccess {
            client: ClientId(1),
            target: ClientId(3),
            access: AccessFlags::MANAGE,
        });
        assert!(status.success());
    }

    #[test]
    fn server_access_is_skipped_while_server_is_privileged() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId::SERVER, "System", true);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let status = monitor.mediate_server(&ServerAccess {
            client: ClientId(1),
            access: AccessFlags::GRAB,
        });
        assert!(status.success());
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn server_access_is_checked_when_server_is_unprivileged() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId::SERVER, "System", false);
        seed_client(&mut monitor, ClientId(1), "App::A", false);

        let status = monitor.mediate_server(&ServerAccess {
            client: ClientId(1),
            access: AccessFlags::GRAB,
        });
        assert_eq!(status, MediationStatus::AccessError);
        assert_eq!(&oracle_request(&dir), b"App::A System -w\0");
    }

    #[test]
    fn vacuous_request_always_succeeds() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        seed_client(&mut monitor, ClientId(2), "App::B", false);

        let status = monitor.mediate_client(&ClientTargetAccess {
            client: ClientId(1),
            target: ClientId(2),
            access: AccessFlags::empty(),
        });
        assert!(status.success());
        assert!(oracle_request(&dir).is_empty());
    }

    #[test]
    fn tracking_an_unlabeled_window_marks_it_unexpected() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);

        let labels = monitor.track_window(WindowId(99), ClientId(9));
        assert_eq!(labels.client_label.as_str(), SMACK_UNEXPECTED);
        assert_eq!(labels.window_label.as_str(), SMACK_UNEXPECTED);
    }

    #[test]
    fn tracking_a_labeled_window_reports_both_labels() {
        let dir = TempDir::new().expect("tempdir");
        let mut monitor = monitor_with_file_oracle(&dir);
        seed_client(&mut monitor, ClientId(1), "App::A", false);
        monitor.mediate_resource(&ResourceAccess {
            client: ClientId(1),
            owner: ClientId(1),
            target: ResourceHandle::Window(WindowId(50)),
            parent: None,
            access: AccessFlags::CREATE,
        });

        let labels = monitor.track_window(WindowId(50), ClientId(1));
        assert_eq!(labels.client_label.as_str(), "App::A");
        assert_eq!(labels.window_label.as_str(), "App::A");
    }

    #[test]
    fn audit_property_names_are_stable() {
        assert_eq!(AUDIT_PROPERTY_WINDOW_LABEL, "_SMACK_LABEL");
        assert_eq!(AUDIT_PROPERTY_CLIENT_LABEL, "_SMACK_CLIENT_LABEL");
    }
}
