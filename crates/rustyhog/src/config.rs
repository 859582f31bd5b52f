//! Application configuration

use crate::gatt::constants::DEFAULT_PATH_BASE;
use std::time::Duration;

/// Producer period of the reference device
pub const DEFAULT_NOTIFY_INTERVAL: Duration = Duration::from_secs(5);

/// HID keyboard appearance (category 0x00F, subcategory 0x01)
pub const APPEARANCE_KEYBOARD: u16 = 0x03C1;

/// Configuration of the emulated keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationConfig {
    /// Root path services are published under
    pub path_base: String,
    /// Battery drain period
    pub battery_interval: Duration,
    /// Key rotation period
    pub key_interval: Duration,
    /// Device Name exposed by the Generic Access service
    pub device_name: String,
    /// Appearance exposed by the Generic Access service
    pub appearance: u16,
    /// Publish the Generic Access and Generic Attribute services
    pub generic_services: bool,
    /// Publish the test service exercising every access flag
    pub test_service: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            path_base: DEFAULT_PATH_BASE.to_string(),
            battery_interval: DEFAULT_NOTIFY_INTERVAL,
            key_interval: DEFAULT_NOTIFY_INTERVAL,
            device_name: "RustyHOG".to_string(),
            appearance: APPEARANCE_KEYBOARD,
            generic_services: false,
            test_service: false,
        }
    }
}
