//! GATT object model
//!
//! This module provides the attribute tree a platform GATT transport serves:
//! services, characteristics and descriptors addressed by object path, their
//! published property sets, access-flag checks, and the subscribe/notify
//! state machine.

pub mod application;
pub mod characteristic;
pub mod constants;
pub mod descriptor;
pub mod flags;
pub mod handler;
pub mod path;
pub mod properties;
pub mod service;

#[cfg(test)]
mod tests;

pub use application::{Application, ApplicationBuilder, APPLICATION_PATH};
pub use characteristic::{Characteristic, CharacteristicDefinition};
pub use descriptor::{Descriptor, DescriptorDefinition};
pub use flags::{AccessFlags, NodeKind, SecurityLevel, UnknownFlag};
pub use handler::{
    CharacteristicHandler, DescriptorHandler, RequestOptions, StaticValue, StoredValue,
    Unsupported, UserDescription,
};
pub use path::ObjectPath;
pub use properties::{
    discard_events, event_channel, InterfaceMap, ManagedObjects, PropertiesChanged,
    PropertiesChangedCallback, PropertyMap, PropertyValue,
};
pub use service::{Service, ServiceDefinition};
