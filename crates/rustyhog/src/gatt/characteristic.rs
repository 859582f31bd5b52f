//! GATT characteristics
//!
//! A characteristic checks every request against its declared flags before
//! handing it to its handler, and owns the subscription state that gates
//! outbound `PropertiesChanged` events.

use super::constants::*;
use super::descriptor::DescriptorDefinition;
use super::flags::{AccessFlags, NodeKind};
use super::handler::{CharacteristicHandler, RequestOptions};
use super::path::ObjectPath;
use super::properties::{
    InterfaceMap, PropertiesChanged, PropertiesChangedCallback, PropertyMap, PropertyValue,
};
use crate::error::{GattError, GattResult};
use crate::scheduler::TimerHandle;
use crate::uuid::Uuid;
use log::{debug, info, trace};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Characteristic declared on a service before the application is built
pub struct CharacteristicDefinition {
    pub(crate) uuid: Uuid,
    pub(crate) flags: AccessFlags,
    pub(crate) handler: Box<dyn CharacteristicHandler>,
    pub(crate) descriptors: Vec<DescriptorDefinition>,
}

impl CharacteristicDefinition {
    pub fn new(
        uuid: Uuid,
        flags: AccessFlags,
        handler: impl CharacteristicHandler + 'static,
    ) -> Self {
        Self {
            uuid,
            flags,
            handler: Box::new(handler),
            descriptors: Vec::new(),
        }
    }

    /// Append a descriptor; it gets the next descriptor index
    pub fn with_descriptor(mut self, descriptor: DescriptorDefinition) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    pub fn flags(&self) -> AccessFlags {
        self.flags
    }
}

impl fmt::Debug for CharacteristicDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacteristicDefinition")
            .field("uuid", &self.uuid)
            .field("flags", &self.flags)
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}

/// Mutable state, guarded by the characteristic's lock
struct CharacteristicState {
    handler: Box<dyn CharacteristicHandler>,
    subscribed: bool,
}

/// A published characteristic
pub struct Characteristic {
    path: ObjectPath,
    uuid: Uuid,
    flags: AccessFlags,
    /// Owning service, by path
    service: ObjectPath,
    descriptors: Vec<ObjectPath>,
    notify_interval: Option<Duration>,
    state: Mutex<CharacteristicState>,
    events: PropertiesChangedCallback,
    /// Periodic producer; cancelled when the characteristic is dropped
    producer: Mutex<Option<TimerHandle>>,
}

impl Characteristic {
    pub(crate) fn new(
        path: ObjectPath,
        service: ObjectPath,
        uuid: Uuid,
        flags: AccessFlags,
        handler: Box<dyn CharacteristicHandler>,
        descriptors: Vec<ObjectPath>,
        events: PropertiesChangedCallback,
    ) -> Self {
        let notify_interval = handler.notify_interval();
        Self {
            path,
            uuid,
            flags,
            service,
            descriptors,
            notify_interval,
            state: Mutex::new(CharacteristicState {
                handler,
                subscribed: false,
            }),
            events,
            producer: Mutex::new(None),
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

    pub fn service_path(&self) -> &ObjectPath {
        &self.service
    }

    pub fn descriptor_paths(&self) -> &[ObjectPath] {
        &self.descriptors
    }

    /// `org.bluez.GattCharacteristic1` properties
    pub fn properties(&self) -> InterfaceMap {
        let mut props = PropertyMap::new();
        props.insert(PROP_SERVICE.to_string(), PropertyValue::Path(self.service.clone()));
        props.insert(PROP_UUID.to_string(), PropertyValue::Uuid(self.uuid));
        props.insert(PROP_FLAGS.to_string(), PropertyValue::Strings(self.flags.names()));
        props.insert(
            PROP_DESCRIPTORS.to_string(),
            PropertyValue::Paths(self.descriptors.clone()),
        );

        let mut interfaces = InterfaceMap::new();
        interfaces.insert(GATT_CHRC_IFACE.to_string(), props);
        interfaces
    }

    /// Properties of one interface; only the characteristic interface exists
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
        self.lock_state().handler.read_value(options)
    }

    pub fn write_value(&self, value: &[u8], options: &RequestOptions) -> GattResult<()> {
        if !self.flags.is_writable(NodeKind::Characteristic) {
            return Err(GattError::NotSupported);
        }
        debug!("WriteValue {} {:02x?}", self.path, value);
        self.lock_state().handler.write_value(value, options)
    }

    /// Enable notifications. Enabling twice is a no-op.
    pub fn start_notify(&self) -> GattResult<()> {
        if !self.flags.can_notify() {
            return Err(GattError::NotSupported);
        }
        let mut state = self.lock_state();
        let initial = state.handler.start_notify()?;
        if state.subscribed {
            debug!("{}: already notifying, nothing to do", self.path);
            return Ok(());
        }
        state.subscribed = true;
        info!("{}: notifications enabled", self.path);

        if let Some(value) = initial {
            self.emit(value);
        }
        Ok(())
    }

    /// Disable notifications. No event for this characteristic is delivered
    /// once this returns.
    pub fn stop_notify(&self) -> GattResult<()> {
        if !self.flags.can_notify() {
            return Err(GattError::NotSupported);
        }
        let mut state = self.lock_state();
        state.handler.stop_notify()?;
        if !state.subscribed {
            debug!("{}: not notifying, nothing to do", self.path);
            return Ok(());
        }
        state.subscribed = false;
        info!("{}: notifications disabled", self.path);
        Ok(())
    }

    pub fn is_notifying(&self) -> bool {
        self.lock_state().subscribed
    }

    /// Publish a new value to subscribers.
    ///
    /// Returns whether an event was raised; without a subscriber this is a
    /// silent no-op.
    pub fn emit_changed(&self, value: Vec<u8>) -> bool {
        let state = self.lock_state();
        if !state.subscribed {
            return false;
        }
        self.emit(value);
        true
    }

    /// Period of this characteristic's producer, if it has one
    pub fn notify_interval(&self) -> Option<Duration> {
        self.notify_interval
    }

    /// Run one producer period: advance the simulated value and publish it
    /// if subscribed.
    pub fn tick(&self) {
        let mut state = self.lock_state();
        let Some(value) = state.handler.tick() else {
            return;
        };
        trace!("{}: tick -> {:02x?}", self.path, value);
        if state.subscribed {
            self.emit(value);
        }
    }

    /// Attach the periodic producer, replacing (and cancelling) any previous
    pub(crate) fn set_producer(&self, handle: TimerHandle) {
        *self.producer.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Whether a periodic producer is attached
    pub fn has_producer(&self) -> bool {
        self.producer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Must be called with the state lock held
    fn emit(&self, value: Vec<u8>) {
        (self.events)(PropertiesChanged::value(self.path.clone(), value));
    }

    fn lock_state(&self) -> MutexGuard<'_, CharacteristicState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Characteristic")
            .field("path", &self.path)
            .field("uuid", &self.uuid)
            .field("flags", &self.flags)
            .field("descriptors", &self.descriptors)
            .finish_non_exhaustive()
    }
}
