//! Battery service (`180f`) with a simulated draining battery

use crate::error::GattResult;
use crate::gatt::{
    AccessFlags, CharacteristicDefinition, CharacteristicHandler, RequestOptions,
    ServiceDefinition,
};
use crate::uuid::Uuid;
use log::trace;
use std::time::Duration;

pub const BATTERY_SERVICE_UUID: Uuid = Uuid::from_u16(0x180f);
pub const BATTERY_LEVEL_UUID: Uuid = Uuid::from_u16(0x2a19);

/// Level a fresh battery starts at
pub const FULL_LEVEL: u8 = 100;
/// Points lost per producer period
pub const DRAIN_STEP: u8 = 2;

/// Battery Level characteristic (`2a19`).
///
/// Loses [`DRAIN_STEP`] points every period and recharges to full once the
/// level would go negative.
#[derive(Debug, Clone)]
pub struct BatteryLevel {
    level: u8,
    interval: Duration,
}

impl BatteryLevel {
    pub fn new(interval: Duration) -> Self {
        Self {
            level: FULL_LEVEL,
            interval,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// One drain step
    pub fn drain(&mut self) -> u8 {
        self.level = self.level.checked_sub(DRAIN_STEP).unwrap_or(FULL_LEVEL);
        trace!("Battery level: {}", self.level);
        self.level
    }
}

impl CharacteristicHandler for BatteryLevel {
    fn read_value(&mut self, _options: &RequestOptions) -> GattResult<Vec<u8>> {
        Ok(vec![self.level])
    }

    /// Subscribers get the current level right away
    fn start_notify(&mut self) -> GattResult<Option<Vec<u8>>> {
        Ok(Some(vec![self.level]))
    }

    fn stop_notify(&mut self) -> GattResult<()> {
        Ok(())
    }

    fn notify_interval(&self) -> Option<Duration> {
        Some(self.interval)
    }

    fn tick(&mut self) -> Option<Vec<u8>> {
        Some(vec![self.drain()])
    }
}

/// Battery service with its single level characteristic
pub fn battery_service(interval: Duration) -> ServiceDefinition {
    ServiceDefinition::new(BATTERY_SERVICE_UUID, true).with_characteristic(
        CharacteristicDefinition::new(
            BATTERY_LEVEL_UUID,
            AccessFlags::READ | AccessFlags::NOTIFY,
            BatteryLevel::new(interval),
        ),
    )
}
