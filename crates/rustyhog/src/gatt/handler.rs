//! Per-node behavior
//!
//! A characteristic or descriptor delegates its operations to a handler.
//! Every handler method defaults to [`GattError::NotSupported`]; concrete
//! handlers override the operations they implement.

use super::path::ObjectPath;
use crate::error::{GattError, GattResult};
use std::time::Duration;

/// Options a transport passes along with a read or write.
///
/// The core only logs these; link security is the transport's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Remote device issuing the request
    pub device: Option<ObjectPath>,
    /// Negotiated ATT MTU
    pub mtu: Option<u16>,
    /// Value offset
    pub offset: u16,
    /// Link type ("LE", "BR/EDR")
    pub link: Option<String>,
}

/// Behavior of a characteristic
pub trait CharacteristicHandler: Send {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Err(GattError::NotSupported)
    }

    fn write_value(&mut self, _value: &[u8], _options: &RequestOptions) -> GattResult<()> {
        Err(GattError::NotSupported)
    }

    /// Accept a subscription request.
    ///
    /// Called on every StartNotify; the returned value is emitted only when
    /// the subscription actually goes from off to on.
    fn start_notify(&mut self) -> GattResult<Option<Vec<u8>>> {
        Err(GattError::NotSupported)
    }

    /// Accept an unsubscribe request.
    fn stop_notify(&mut self) -> GattResult<()> {
        Err(GattError::NotSupported)
    }

    /// Period of the simulated producer, if this characteristic has one.
    fn notify_interval(&self) -> Option<Duration> {
        None
    }

    /// Advance the simulated state by one period and return the value to
    /// publish.
    fn tick(&mut self) -> Option<Vec<u8>> {
        None
    }
}

/// Behavior of a descriptor
pub trait DescriptorHandler: Send {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Err(GattError::NotSupported)
    }

    fn write_value(&mut self, _value: &[u8], _options: &RequestOptions) -> GattResult<()> {
        Err(GattError::NotSupported)
    }
}

/// Node that implements nothing; every operation is `NotSupported`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unsupported;

impl CharacteristicHandler for Unsupported {}
impl DescriptorHandler for Unsupported {}

/// Read-only fixed value
#[derive(Debug, Clone)]
pub struct StaticValue(Vec<u8>);

impl StaticValue {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        StaticValue(value.into())
    }
}

impl CharacteristicHandler for StaticValue {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

impl DescriptorHandler for StaticValue {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(self.0.clone())
    }
}

/// Value that reads back whatever was last written
#[derive(Debug, Clone, Default)]
pub struct StoredValue(Vec<u8>);

impl StoredValue {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        StoredValue(value.into())
    }
}

impl CharacteristicHandler for StoredValue {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(self.0.clone())
    }

    fn write_value(&mut self, value: &[u8], _options: &RequestOptions) -> GattResult<()> {
        self.0 = value.to_vec();
        Ok(())
    }
}

/// Characteristic User Description (`2901`).
///
/// Writable only when the owning characteristic declares
/// `writable-auxiliaries`; otherwise writes fail with `NotPermitted`.
#[derive(Debug, Clone)]
pub struct UserDescription {
    value: Vec<u8>,
    writable: bool,
}

impl UserDescription {
    pub fn new(text: &str, writable: bool) -> Self {
        Self {
            value: text.as_bytes().to_vec(),
            writable,
        }
    }
}

impl DescriptorHandler for UserDescription {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(self.value.clone())
    }

    fn write_value(&mut self, value: &[u8], _options: &RequestOptions) -> GattResult<()> {
        if !self.writable {
            return Err(GattError::NotPermitted);
        }
        self.value = value.to_vec();
        Ok(())
    }
}
