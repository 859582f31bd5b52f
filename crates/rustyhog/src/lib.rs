//! RustyHOG - A Rust GATT server object model for HID over GATT
//!
//! This library provides the attribute tree of a Bluetooth LE peripheral
//! emulating a keyboard: a Battery service whose level drains over time and
//! a HID service that keeps pressing the next letter of the alphabet.
//! Services, characteristics and descriptors are addressed by object path,
//! check every request against their declared access flags, and publish
//! value changes to subscribers through a property-changed callback.
//!
//! The transport carrying these objects to a platform Bluetooth stack is
//! left to the embedding program; so is the event loop, which is reached
//! through the [`scheduler::Timer`] trait.

pub mod config;
pub mod error;
pub mod gatt;
pub mod profiles;
pub mod scheduler;
pub mod uuid;

// Re-export common types for convenience
pub use config::ApplicationConfig;
pub use error::{GattError, GattResult};
pub use gatt::{
    AccessFlags, Application, ApplicationBuilder, Characteristic, CharacteristicDefinition,
    CharacteristicHandler, Descriptor, DescriptorDefinition, DescriptorHandler, ObjectPath,
    PropertiesChanged, RequestOptions, Service, ServiceDefinition,
};
pub use profiles::default_application;
pub use scheduler::{start_producers, ManualTimer, ThreadTimer, Timer, TimerHandle};
pub use uuid::Uuid;
