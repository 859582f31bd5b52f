//! HID over GATT service (`1812`) emulating a keyboard
//!
//! Characteristic order is fixed: Report Map, HID Information, Control
//! Point, Report, Protocol Mode.

use crate::error::{expect_len, GattError, GattResult};
use crate::gatt::{
    AccessFlags, CharacteristicDefinition, CharacteristicHandler, DescriptorDefinition,
    RequestOptions, ServiceDefinition, StaticValue,
};
use crate::uuid::Uuid;
use byteorder::{ByteOrder, LittleEndian};
use log::{info, trace, warn};
use std::time::Duration;

pub const HID_SERVICE_UUID: Uuid = Uuid::from_u16(0x1812);
pub const HID_INFORMATION_UUID: Uuid = Uuid::from_u16(0x2a4a);
pub const HID_REPORT_MAP_UUID: Uuid = Uuid::from_u16(0x2a4b);
pub const HID_CONTROL_POINT_UUID: Uuid = Uuid::from_u16(0x2a4c);
pub const HID_REPORT_UUID: Uuid = Uuid::from_u16(0x2a4d);
pub const HID_PROTOCOL_MODE_UUID: Uuid = Uuid::from_u16(0x2a4e);
pub const REPORT_REFERENCE_UUID: Uuid = Uuid::from_u16(0x2908);

/// Keyboard report descriptor: usage page Generic Desktop, usage Keyboard,
/// report id 1, eight modifier bits.
pub const REPORT_MAP: [u8; 23] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    0x85, 0x01, //   Report ID (1)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224)
    0x29, 0xE7, //   Usage Maximum (231)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0xC0, // End Collection
];

/// bcdHID of the HID Information value
pub const HID_VERSION: u16 = 0x0101;
/// Not localized
pub const HID_COUNTRY_CODE: u8 = 0x00;
/// RemoteWake | NormallyConnectable
pub const HID_INFO_FLAGS: u8 = 0x03;

/// Boot keyboard input report: modifiers, reserved, six key slots
pub const DEFAULT_REPORT: [u8; 8] = [0x02, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00];
/// Index of the first key slot in a report
const KEY_SLOT: usize = 2;
/// HID usage of 'a'; 'b'..'z' follow consecutively
const USAGE_A: u8 = 0x04;

/// Report id carried by [`REPORT_MAP`]
pub const REPORT_ID: u8 = 0x01;
/// Report Reference type "Input Report"
pub const REPORT_TYPE_INPUT: u8 = 0x01;

pub const CONTROL_POINT_SUSPEND: u8 = 0x01;

pub const PROTOCOL_MODE_BOOT: u8 = 0x00;
pub const PROTOCOL_MODE_REPORT: u8 = 0x01;

/// HID Information value: bcdHID, country code, flags
pub fn hid_information() -> [u8; 4] {
    let mut value = [0u8; 4];
    LittleEndian::write_u16(&mut value[..2], HID_VERSION);
    value[2] = HID_COUNTRY_CODE;
    value[3] = HID_INFO_FLAGS;
    value
}

/// Input report pressing `symbol` on top of [`DEFAULT_REPORT`]'s modifiers
pub fn keyboard_report(symbol: char) -> [u8; 8] {
    let mut report = DEFAULT_REPORT;
    report[KEY_SLOT] = USAGE_A + (symbol as u8 - b'a');
    report
}

/// HID Report characteristic (`2a4d`).
///
/// Every period the pressed key moves one letter forward, `z` wrapping to
/// `a`, and the new report is published. Reads return the report for the
/// current key.
#[derive(Debug, Clone)]
pub struct KeyboardReport {
    symbol: char,
    interval: Duration,
}

impl KeyboardReport {
    pub fn new(interval: Duration) -> Self {
        Self {
            symbol: 'a',
            interval,
        }
    }

    pub fn symbol(&self) -> char {
        self.symbol
    }

    /// Move to the next letter
    pub fn advance(&mut self) -> char {
        self.symbol = match self.symbol {
            'z' => 'a',
            c => (c as u8 + 1) as char,
        };
        trace!("Key pressed: {}", self.symbol);
        self.symbol
    }
}

impl CharacteristicHandler for KeyboardReport {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(keyboard_report(self.symbol).to_vec())
    }

    fn start_notify(&mut self) -> GattResult<Option<Vec<u8>>> {
        Ok(None)
    }

    fn stop_notify(&mut self) -> GattResult<()> {
        Ok(())
    }

    fn notify_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn tick(&mut self) -> Option<Vec<u8>> {
        let symbol = self.advance();
        Some(keyboard_report(symbol).to_vec())
    }
}

/// HID Control Point characteristic (`2a4c`), write-only
#[derive(Debug, Clone, Default)]
pub struct ControlPoint {
    suspended: bool,
}

impl ControlPoint {
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }
}

impl CharacteristicHandler for ControlPoint {
    fn write_value(&mut self, value: &[u8], _options: &RequestOptions) -> GattResult<()> {
        expect_len(value, 1)?;
        if value[0] != CONTROL_POINT_SUSPEND {
            warn!("Control Point command 0x{:02x} rejected", value[0]);
            return Err(GattError::CommandRejected(value[0]));
        }
        info!("Suspend command received");
        self.suspended = true;
        Ok(())
    }
}

/// HID Protocol Mode characteristic (`2a4e`)
#[derive(Debug, Clone)]
pub struct ProtocolMode {
    mode: u8,
}

impl Default for ProtocolMode {
    fn default() -> Self {
        Self {
            mode: PROTOCOL_MODE_REPORT,
        }
    }
}

impl ProtocolMode {
    pub fn mode(&self) -> u8 {
        self.mode
    }
}

impl CharacteristicHandler for ProtocolMode {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(vec![self.mode])
    }

    fn write_value(&mut self, value: &[u8], _options: &RequestOptions) -> GattResult<()> {
        expect_len(value, 1)?;
        match value[0] {
            mode @ (PROTOCOL_MODE_BOOT | PROTOCOL_MODE_REPORT) => {
                info!("Protocol Mode changed to {}", mode);
                self.mode = mode;
                Ok(())
            }
            other => {
                warn!("Protocol Mode 0x{:02x} rejected", other);
                Err(GattError::CommandRejected(other))
            }
        }
    }
}

/// HID service in its fixed characteristic order
pub fn hid_service(key_interval: Duration) -> ServiceDefinition {
    ServiceDefinition::new(HID_SERVICE_UUID, true)
        .with_characteristic(CharacteristicDefinition::new(
            HID_REPORT_MAP_UUID,
            AccessFlags::READ,
            StaticValue::new(REPORT_MAP),
        ))
        .with_characteristic(CharacteristicDefinition::new(
            HID_INFORMATION_UUID,
            AccessFlags::READ,
            StaticValue::new(hid_information()),
        ))
        .with_characteristic(CharacteristicDefinition::new(
            HID_CONTROL_POINT_UUID,
            AccessFlags::WRITE,
            ControlPoint::default(),
        ))
        .with_characteristic(
            CharacteristicDefinition::new(
                HID_REPORT_UUID,
                AccessFlags::READ | AccessFlags::NOTIFY,
                KeyboardReport::new(key_interval),
            )
            .with_descriptor(DescriptorDefinition::new(
                REPORT_REFERENCE_UUID,
                AccessFlags::READ,
                StaticValue::new([REPORT_ID, REPORT_TYPE_INPUT]),
            )),
        )
        .with_characteristic(CharacteristicDefinition::new(
            HID_PROTOCOL_MODE_UUID,
            AccessFlags::READ | AccessFlags::WRITE,
            ProtocolMode::default(),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_payloads() {
        assert_eq!(hid_information(), [0x01, 0x01, 0x00, 0x03]);
        assert_eq!(REPORT_MAP.len(), 23);
        assert_eq!(REPORT_MAP[..4], [0x05, 0x01, 0x09, 0x06]);
        assert_eq!(REPORT_MAP[22], 0xC0);
        // 'e' is usage 0x08, so the default report is the 'e' report
        assert_eq!(keyboard_report('e'), DEFAULT_REPORT);
        assert_eq!(keyboard_report('a'), [0x02, 0x00, 0x04, 0, 0, 0, 0, 0]);
        assert_eq!(keyboard_report('z')[KEY_SLOT], 0x1D);
    }

    #[test]
    fn test_symbol_wraps_after_26_ticks() {
        let mut report = KeyboardReport::new(Duration::from_secs(5));
        assert_eq!(report.symbol(), 'a');
        assert_eq!(report.advance(), 'b');
        for _ in 0..25 {
            report.advance();
        }
        assert_eq!(report.symbol(), 'a');

        for _ in 0..25 {
            report.advance();
        }
        assert_eq!(report.symbol(), 'z');
        assert_eq!(report.tick().unwrap(), keyboard_report('a').to_vec());
    }

    #[test]
    fn test_control_point() {
        let opts = RequestOptions::default();
        let mut cp = ControlPoint::default();
        assert_eq!(cp.write_value(&[0x02], &opts), Err(GattError::CommandRejected(0x02)));
        assert!(!cp.is_suspended());
        assert_eq!(
            cp.write_value(&[], &opts),
            Err(GattError::InvalidValueLength { expected: 1, actual: 0 })
        );
        assert!(cp.write_value(&[0x01], &opts).is_ok());
        assert!(cp.is_suspended());
    }

    #[test]
    fn test_protocol_mode() {
        let opts = RequestOptions::default();
        let mut pm = ProtocolMode::default();
        assert_eq!(pm.read_value(&opts).unwrap(), vec![PROTOCOL_MODE_REPORT]);

        pm.write_value(&[PROTOCOL_MODE_BOOT], &opts).unwrap();
        assert_eq!(pm.read_value(&opts).unwrap(), vec![PROTOCOL_MODE_BOOT]);

        assert_eq!(pm.write_value(&[0x05], &opts), Err(GattError::CommandRejected(0x05)));
        assert_eq!(pm.mode(), PROTOCOL_MODE_BOOT);
        assert!(matches!(
            pm.write_value(&[0x01, 0x00], &opts),
            Err(GattError::InvalidValueLength { .. })
        ));
    }
}
