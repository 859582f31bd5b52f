//! Property sets published for each node and the outbound change event

use super::constants::{GATT_CHRC_IFACE, PROP_VALUE};
use super::path::ObjectPath;
use crate::uuid::Uuid;
use std::collections::BTreeMap;
use std::sync::mpsc;
use std::sync::Arc;

/// A single published property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Bool(bool),
    Uuid(Uuid),
    Path(ObjectPath),
    Paths(Vec<ObjectPath>),
    Strings(Vec<String>),
    Bytes(Vec<u8>),
}

impl PropertyValue {
    pub fn as_path(&self) -> Option<&ObjectPath> {
        match self {
            PropertyValue::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_paths(&self) -> Option<&[ObjectPath]> {
        match self {
            PropertyValue::Paths(paths) => Some(paths),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PropertyValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Property name -> value
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// Interface name -> properties
pub type InterfaceMap = BTreeMap<String, PropertyMap>;

/// Object path -> interfaces, the full managed-object snapshot
pub type ManagedObjects = BTreeMap<ObjectPath, InterfaceMap>;

/// Outbound `PropertiesChanged` signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesChanged {
    /// Node whose properties changed
    pub path: ObjectPath,
    /// Interface the properties belong to
    pub interface: String,
    /// Changed properties with their new values
    pub changed: PropertyMap,
    /// Properties invalidated without a new value
    pub invalidated: Vec<String>,
}

impl PropertiesChanged {
    /// Characteristic value update
    pub fn value(path: ObjectPath, value: Vec<u8>) -> Self {
        let mut changed = PropertyMap::new();
        changed.insert(PROP_VALUE.to_string(), PropertyValue::Bytes(value));
        Self {
            path,
            interface: GATT_CHRC_IFACE.to_string(),
            changed,
            invalidated: Vec::new(),
        }
    }

    /// The new `Value`, if this event carries one
    pub fn new_value(&self) -> Option<&[u8]> {
        self.changed.get(PROP_VALUE).and_then(PropertyValue::as_bytes)
    }
}

/// Receives property-changed events for delivery over the transport.
///
/// The callback runs while the emitting characteristic is locked; it must not
/// call back into that characteristic.
pub type PropertiesChangedCallback = Arc<dyn Fn(PropertiesChanged) + Send + Sync>;

/// Callback that drops every event
pub fn discard_events() -> PropertiesChangedCallback {
    Arc::new(|_| {})
}

/// Callback forwarding events into a channel, plus its receiving end
pub fn event_channel() -> (PropertiesChangedCallback, mpsc::Receiver<PropertiesChanged>) {
    let (tx, rx) = mpsc::channel();
    let callback: PropertiesChangedCallback = Arc::new(move |event| {
        // The receiver going away only means nobody listens anymore
        let _ = tx.send(event);
    });
    (callback, rx)
}
