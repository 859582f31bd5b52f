//! GATT descriptors

use super::constants::*;
use super::flags::{AccessFlags, NodeKind};
use super::handler::{DescriptorHandler, RequestOptions};
use super::path::ObjectPath;
use super::properties::{InterfaceMap, PropertyMap, PropertyValue};
use crate::error::{GattError, GattResult};
use crate::uuid::Uuid;
use log::debug;
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Descriptor declared on a characteristic before the application is built
pub struct DescriptorDefinition {
    pub(crate) uuid: Uuid,
    pub(crate) flags: AccessFlags,
    pub(crate) handler: Box<dyn DescriptorHandler>,
}

impl DescriptorDefinition {
    pub fn new(uuid: Uuid, flags: AccessFlags, handler: impl DescriptorHandler + 'static) -> Self {
        Self {
            uuid,
            flags,
            handler: Box::new(handler),
        }
    }
}

impl fmt::Debug for DescriptorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorDefinition")
            .field("uuid", &self.uuid)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// A published descriptor
pub struct Descriptor {
    path: ObjectPath,
    uuid: Uuid,
    flags: AccessFlags,
    /// Owning characteristic, by path
    characteristic: ObjectPath,
    handler: Mutex<Box<dyn DescriptorHandler>>,
}

impl Descriptor {
    pub(crate) fn new(
        path: ObjectPath,
        characteristic: ObjectPath,
        definition: DescriptorDefinition,
    ) -> Self {
        Self {
            path,
            uuid: definition.uuid,
            flags: definition.flags,
            characteristic,
            handler: Mutex::new(definition.handler),
        }
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn flags(&self) -> AccessFlags {
        self.flags
    }

    pub fn characteristic_path(&self) -> &ObjectPath {
        &self.characteristic
    }

    /// `org.bluez.GattDescriptor1` properties
    pub fn properties(&self) -> InterfaceMap {
        let mut props = PropertyMap::new();
        props.insert(
            PROP_CHARACTERISTIC.to_string(),
            PropertyValue::Path(self.characteristic.clone()),
        );
        props.insert(PROP_UUID.to_string(), PropertyValue::Uuid(self.uuid));
        props.insert(PROP_FLAGS.to_string(), PropertyValue::Strings(self.flags.names()));

        let mut interfaces = InterfaceMap::new();
        interfaces.insert(GATT_DESC_IFACE.to_string(), props);
        interfaces
    }

    /// Properties of one interface; only the descriptor interface exists
    pub fn get_all(&self, interface: &str) -> GattResult<PropertyMap> {
        self.properties()
            .remove(interface)
            .ok_or_else(|| GattError::InvalidArguments(interface.to_string()))
    }

    pub fn read_value(&self, options: &RequestOptions) -> GattResult<Vec<u8>> {
        if !self.flags.is_readable() {
            return Err(GattError::NotSupported);
        }
        debug!("ReadValue {} ({:?})", self.path, options.device);
        self.lock_handler().read_value(options)
    }

    pub fn write_value(&self, value: &[u8], options: &RequestOptions) -> GattResult<()> {
        if !self.flags.is_writable(NodeKind::Descriptor) {
            return Err(GattError::NotSupported);
        }
        debug!("WriteValue {} {:02x?}", self.path, value);
        self.lock_handler().write_value(value, options)
    }

    fn lock_handler(&self) -> std::sync::MutexGuard<'_, Box<dyn DescriptorHandler>> {
        self.handler.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("path", &self.path)
            .field("uuid", &self.uuid)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
