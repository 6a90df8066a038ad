//! Typed per-entity label storage.
//!
//! Replaces a generic keyed "private data" side-table with typed slots per
//! entity kind, looked up by entity identity. The set of labelable object
//! kinds is closed at compile time; an entity kind without its own slot
//! (see [`crate::monitor::ResourceHandle::ClientOwned`]) falls back to its
//! owning client's record instead of a runtime capability probe.
//!
//! Slots are created lazily on first lookup, mirroring the host's lazy
//! private-storage allocation; subjects are removed at principal teardown,
//! objects live until the host discards the entity.

use crate::label::{ObjectRecord, SubjectKind, SubjectRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A client connection, identified by the host's client index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(pub u32);

impl ClientId {
    /// The server's own pseudo-principal, by convention slot zero of the
    /// host's client table.
    pub const SERVER: ClientId = ClientId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(pub u32);

/// A generic labelable resource (pixmap, colormap, cursor, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

/// Subject and substitute-object state for a client connection.
#[derive(Debug, Clone)]
pub struct ClientSlot {
    pub subject: SubjectRecord,
    pub object: ObjectRecord,
}

impl Default for ClientSlot {
    fn default() -> Self {
        Self {
            subject: SubjectRecord::new(SubjectKind::Client),
            object: ObjectRecord::default(),
        }
    }
}

/// Subject and object state for an input device. Devices act as subjects
/// when they send events and as objects when clients access them.
#[derive(Debug, Clone)]
pub struct DeviceSlot {
    pub subject: SubjectRecord,
    pub object: ObjectRecord,
}

impl Default for DeviceSlot {
    fn default() -> Self {
        Self {
            subject: SubjectRecord::new(SubjectKind::Device),
            object: ObjectRecord::default(),
        }
    }
}

/// Object state plus the advisory content label carried by properties and
/// selections. The content label is audit-only, never enforced.
#[derive(Debug, Clone, Default)]
pub struct ContentSlot {
    pub object: ObjectRecord,
    pub content: ObjectRecord,
}

/// All per-entity label state owned by one monitor.
#[derive(Debug, Default)]
pub struct LabelStore {
    clients: HashMap<ClientId, ClientSlot>,
    devices: HashMap<DeviceId, DeviceSlot>,
    windows: HashMap<WindowId, ObjectRecord>,
    properties: HashMap<PropertyId, ContentSlot>,
    selections: HashMap<SelectionId, ContentSlot>,
    extensions: HashMap<ExtensionId, ObjectRecord>,
    screens: HashMap<ScreenId, ObjectRecord>,
    resources: HashMap<ResourceId, ObjectRecord>,
}

impl LabelStore {
    pub fn client(&mut self, id: ClientId) -> &mut ClientSlot {
        self.clients.entry(id).or_default()
    }

    pub fn get_client(&self, id: ClientId) -> Option<&ClientSlot> {
        self.clients.get(&id)
    }

    pub fn remove_client(&mut self, id: ClientId) {
        self.clients.remove(&id);
    }

    pub fn device(&mut self, id: DeviceId) -> &mut DeviceSlot {
        self.devices.entry(id).or_default()
    }

    pub fn get_device(&self, id: DeviceId) -> Option<&DeviceSlot> {
        self.devices.get(&id)
    }

    pub fn remove_device(&mut self, id: DeviceId) {
        self.devices.remove(&id);
    }

    pub fn window(&mut self, id: WindowId) -> &mut ObjectRecord {
        self.windows.entry(id).or_default()
    }

    pub fn get_window(&self, id: WindowId) -> Option<&ObjectRecord> {
        self.windows.get(&id)
    }

    pub fn property(&mut self, id: PropertyId) -> &mut ContentSlot {
        self.properties.entry(id).or_default()
    }

    pub fn get_property(&self, id: PropertyId) -> Option<&ContentSlot> {
        self.properties.get(&id)
    }

    pub fn selection(&mut self, id: SelectionId) -> &mut ContentSlot {
        self.selections.entry(id).or_default()
    }

    pub fn get_selection(&self, id: SelectionId) -> Option<&ContentSlot> {
        self.selections.get(&id)
    }

    pub fn extension(&mut self, id: ExtensionId) -> &mut ObjectRecord {
        self.extensions.entry(id).or_default()
    }

    pub fn get_extension(&self, id: ExtensionId) -> Option<&ObjectRecord> {
        self.extensions.get(&id)
    }

    pub fn screen(&mut self, id: ScreenId) -> &mut ObjectRecord {
        self.screens.entry(id).or_default()
    }

    pub fn get_screen(&self, id: ScreenId) -> Option<&ObjectRecord> {
        self.screens.get(&id)
    }

    pub fn resource(&mut self, id: ResourceId) -> &mut ObjectRecord {
        self.resources.entry(id).or_default()
    }

    pub fn get_resource(&self, id: ResourceId) -> Option<&ObjectRecord> {
        self.resources.get(&id)
    }
}
