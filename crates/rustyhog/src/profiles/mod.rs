//! Service profiles of the emulated keyboard
//!
//! [`default_application`] assembles the full device: Battery first, then
//! HID, followed by the optional generic and test services.

pub mod battery;
pub mod generic;
pub mod hid;
pub mod test_service;

pub use battery::{battery_service, BatteryLevel};
pub use generic::{generic_access_service, generic_attribute_service, ServiceChanged};
pub use hid::{hid_service, ControlPoint, KeyboardReport, ProtocolMode};
pub use test_service::test_service;

use crate::config::ApplicationConfig;
use crate::error::GattResult;
use crate::gatt::{Application, ApplicationBuilder, PropertiesChangedCallback};

/// Builder with every service `config` enables, in publication order
pub fn default_builder(config: &ApplicationConfig) -> ApplicationBuilder {
    let mut builder = ApplicationBuilder::new(config.path_base.clone());
    builder.register(battery_service(config.battery_interval));
    builder.register(hid_service(config.key_interval));
    if config.generic_services {
        builder.register(generic_access_service(&config.device_name, config.appearance));
        builder.register(generic_attribute_service());
    }
    if config.test_service {
        builder.register(test_service());
    }
    builder
}

/// Build the emulated keyboard application
pub fn default_application(
    config: &ApplicationConfig,
    events: PropertiesChangedCallback,
) -> GattResult<Application> {
    default_builder(config).build(events)
}
