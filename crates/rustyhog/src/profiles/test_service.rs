//! Vendor test service covering every access-flag class
//!
//! One characteristic per security level (none, encrypted, secure
//! connections), each with a vendor descriptor and a Characteristic User
//! Description. Only the unencrypted characteristic declares
//! `writable-auxiliaries`, so only its user description accepts writes.

use crate::gatt::{
    AccessFlags, CharacteristicDefinition, DescriptorDefinition, ServiceDefinition, StaticValue,
    StoredValue, UserDescription,
};
use crate::uuid::Uuid;

pub const TEST_SERVICE_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef0);
pub const TEST_CHRC_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef1);
pub const TEST_DESC_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef2);
pub const ENCRYPT_CHRC_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef3);
pub const ENCRYPT_DESC_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef4);
pub const SECURE_CHRC_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef5);
pub const SECURE_DESC_UUID: Uuid = Uuid::from_u128(0x12345678_1234_5678_1234_56789abcdef6);

pub const USER_DESCRIPTION_UUID: Uuid = Uuid::from_u16(0x2901);

const DESCRIPTOR_VALUE: &[u8] = b"Test";

fn test_characteristic(
    chrc_uuid: Uuid,
    chrc_flags: AccessFlags,
    desc_uuid: Uuid,
    desc_flags: AccessFlags,
    description: &str,
) -> CharacteristicDefinition {
    let writable_cud = chrc_flags.contains(AccessFlags::WRITABLE_AUXILIARIES);
    CharacteristicDefinition::new(chrc_uuid, chrc_flags, StoredValue::default())
        .with_descriptor(DescriptorDefinition::new(
            desc_uuid,
            desc_flags,
            StaticValue::new(DESCRIPTOR_VALUE),
        ))
        .with_descriptor(DescriptorDefinition::new(
            USER_DESCRIPTION_UUID,
            AccessFlags::READ | AccessFlags::WRITE,
            UserDescription::new(description, writable_cud),
        ))
}

pub fn test_service() -> ServiceDefinition {
    ServiceDefinition::new(TEST_SERVICE_UUID, true)
        .with_characteristic(test_characteristic(
            TEST_CHRC_UUID,
            AccessFlags::READ | AccessFlags::WRITE | AccessFlags::WRITABLE_AUXILIARIES,
            TEST_DESC_UUID,
            AccessFlags::READ | AccessFlags::WRITE,
            "This is a characteristic for testing",
        ))
        .with_characteristic(test_characteristic(
            ENCRYPT_CHRC_UUID,
            AccessFlags::ENCRYPT_READ | AccessFlags::ENCRYPT_WRITE,
            ENCRYPT_DESC_UUID,
            AccessFlags::ENCRYPT_READ | AccessFlags::ENCRYPT_WRITE,
            "This is an encrypted characteristic for testing",
        ))
        .with_characteristic(test_characteristic(
            SECURE_CHRC_UUID,
            AccessFlags::SECURE_READ | AccessFlags::SECURE_WRITE,
            SECURE_DESC_UUID,
            AccessFlags::SECURE_READ | AccessFlags::SECURE_WRITE,
            "This is a secure characteristic for testing",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GattError;
    use crate::gatt::{discard_events, ApplicationBuilder, RequestOptions, SecurityLevel};

    #[test]
    fn test_test_service_access() {
        let mut builder = ApplicationBuilder::new("/t");
        let service = builder.register(test_service());
        let app = builder.build(discard_events()).unwrap();
        let opts = RequestOptions::default();

        let plain = service.characteristic(0);
        app.write_value(&plain, &[1, 2, 3], &opts).unwrap();
        assert_eq!(app.read_value(&plain, &opts).unwrap(), vec![1, 2, 3]);

        // Descriptor value is static even though its flags allow writes
        assert_eq!(app.read_value(&plain.descriptor(0), &opts).unwrap(), b"Test".to_vec());
        assert_eq!(
            app.write_value(&plain.descriptor(0), b"x", &opts),
            Err(GattError::NotSupported)
        );

        // writable-auxiliaries lets the user description change
        let cud = plain.descriptor(1);
        app.write_value(&cud, b"renamed", &opts).unwrap();
        assert_eq!(app.read_value(&cud, &opts).unwrap(), b"renamed".to_vec());

        let encrypted = service.characteristic(1);
        assert_eq!(
            app.write_value(&encrypted.descriptor(1), b"renamed", &opts),
            Err(GattError::NotPermitted)
        );
        assert_eq!(
            app.read_value(&encrypted.descriptor(1), &opts).unwrap(),
            b"This is an encrypted characteristic for testing".to_vec()
        );
    }

    #[test]
    fn test_security_levels() {
        let mut builder = ApplicationBuilder::new("/t");
        let service = builder.register(test_service());
        let app = builder.build(discard_events()).unwrap();

        let level = |i: usize| {
            let chrc = app.characteristic(&service.characteristic(i)).unwrap();
            (chrc.flags().read_security(), chrc.flags().write_security())
        };
        assert_eq!(level(0), (SecurityLevel::None, SecurityLevel::None));
        assert_eq!(level(1), (SecurityLevel::EncryptionOnly, SecurityLevel::EncryptionOnly));
        assert_eq!(level(2), (SecurityLevel::SecureConnections, SecurityLevel::SecureConnections));

        let opts = RequestOptions::default();
        app.write_value(&service.characteristic(2), &[0xAA], &opts).unwrap();
        assert_eq!(app.read_value(&service.characteristic(2), &opts).unwrap(), vec![0xAA]);
    }
}
