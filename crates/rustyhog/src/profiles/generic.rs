//! Generic Access (`1800`) and Generic Attribute (`1801`) services

use crate::error::GattResult;
use crate::gatt::{
    AccessFlags, CharacteristicDefinition, CharacteristicHandler, ServiceDefinition, StaticValue,
};
use crate::uuid::Uuid;
use byteorder::{ByteOrder, LittleEndian};

pub const GENERIC_ACCESS_UUID: Uuid = Uuid::from_u16(0x1800);
pub const GENERIC_ATTRIBUTE_UUID: Uuid = Uuid::from_u16(0x1801);

pub const DEVICE_NAME_UUID: Uuid = Uuid::from_u16(0x2a00);
pub const APPEARANCE_UUID: Uuid = Uuid::from_u16(0x2a01);
pub const PRIVACY_FLAG_UUID: Uuid = Uuid::from_u16(0x2a02);
pub const RECONNECTION_ADDRESS_UUID: Uuid = Uuid::from_u16(0x2a03);
pub const PREFERRED_CONN_PARAMS_UUID: Uuid = Uuid::from_u16(0x2a04);
pub const SERVICE_CHANGED_UUID: Uuid = Uuid::from_u16(0x2a05);

fn read_only(uuid: Uuid, value: impl Into<Vec<u8>>) -> CharacteristicDefinition {
    CharacteristicDefinition::new(uuid, AccessFlags::READ, StaticValue::new(value))
}

/// Generic Access service advertising the device identity
pub fn generic_access_service(device_name: &str, appearance: u16) -> ServiceDefinition {
    let mut appearance_le = [0u8; 2];
    LittleEndian::write_u16(&mut appearance_le, appearance);

    ServiceDefinition::new(GENERIC_ACCESS_UUID, true)
        .with_characteristic(read_only(DEVICE_NAME_UUID, device_name.as_bytes()))
        .with_characteristic(read_only(APPEARANCE_UUID, appearance_le))
        .with_characteristic(read_only(PRIVACY_FLAG_UUID, [0x00]))
        .with_characteristic(read_only(RECONNECTION_ADDRESS_UUID, [0u8; 6]))
        .with_characteristic(read_only(PREFERRED_CONN_PARAMS_UUID, [0u8; 8]))
}

/// Service Changed (`2a05`).
///
/// The attribute tree never changes after publication, so the indication
/// is accepted but never fires.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceChanged;

impl CharacteristicHandler for ServiceChanged {
    fn start_notify(&mut self) -> GattResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn stop_notify(&mut self) -> GattResult<()> {
        Ok(())
    }
}

pub fn generic_attribute_service() -> ServiceDefinition {
    ServiceDefinition::new(GENERIC_ATTRIBUTE_UUID, true).with_characteristic(
        CharacteristicDefinition::new(SERVICE_CHANGED_UUID, AccessFlags::INDICATE, ServiceChanged),
    )
}
