//! GATT services

use super::characteristic::CharacteristicDefinition;
use super::constants::*;
use super::path::ObjectPath;
use super::properties::{InterfaceMap, PropertyMap, PropertyValue};
use crate::error::{GattError, GattResult};
use crate::uuid::Uuid;

/// Service declared before the application is built
#[derive(Debug)]
pub struct ServiceDefinition {
    pub(crate) uuid: Uuid,
    pub(crate) primary: bool,
    pub(crate) characteristics: Vec<CharacteristicDefinition>,
}

impl ServiceDefinition {
    pub fn new(uuid: Uuid, primary: bool) -> Self {
        Self {
            uuid,
            primary,
            characteristics: Vec::new(),
        }
    }

    /// Append a characteristic; it gets the next characteristic index
    pub fn with_characteristic(mut self, characteristic: CharacteristicDefinition) -> Self {
        self.characteristics.push(characteristic);
        self
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

/// A published service
#[derive(Debug, Clone)]
pub struct Service {
    path: ObjectPath,
    uuid: Uuid,
    primary: bool,
    characteristics: Vec<ObjectPath>,
}

impl Service {
    pub(crate) fn new(
        path: ObjectPath,
        uuid: Uuid,
        primary: bool,
        characteristics: Vec<ObjectPath>,
    ) -> Self {
        Self {
            path,
            uuid,
            primary,
            characteristics,
        }
    }

    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn characteristic_paths(&self) -> &[ObjectPath] {
        &self.characteristics
    }

    /// `org.bluez.GattService1` properties
    pub fn properties(&self) -> InterfaceMap {
        let mut props = PropertyMap::new();
        props.insert(PROP_UUID.to_string(), PropertyValue::Uuid(self.uuid));
        props.insert(PROP_PRIMARY.to_string(), PropertyValue::Bool(self.primary));
        props.insert(
            PROP_CHARACTERISTICS.to_string(),
            PropertyValue::Paths(self.characteristics.clone()),
        );

        let mut interfaces = InterfaceMap::new();
        interfaces.insert(GATT_SERVICE_IFACE.to_string(), props);
        interfaces
    }

    /// Properties of one interface; only the service interface exists
    pub fn get_all(&self, interface: &str) -> GattResult<PropertyMap> {
        self.properties()
            .remove(interface)
            .ok_or_else(|| GattError::InvalidArguments(interface.to_string()))
    }
}
