//! Configuration type definitions
//!
//! These types represent the host-facing sensor configuration: where the
//! device lives on the bus, how often it is polled, which outputs are
//! wired up and what ambient conditions to assume.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::descriptor::{DEFAULT_ADDRESS, NO2_O3_SAMPLE_TIME_MS};
use crate::traits::{Ambient, Channel};

/// Default time between measurement cycles
pub const DEFAULT_UPDATE_INTERVAL_MS: u32 = 60_000;

/// Highest valid 7-bit address
pub const MAX_ADDRESS: u8 = 0x7F;

/// Sensor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Time between `update()` calls (ms)
    pub update_interval_ms: u32,
    /// Ambient conditions used when no external sensor is wired in
    pub ambient: Ambient,
    /// Publish NO2 concentration
    pub no2: bool,
    /// Publish O3 concentration
    pub o3: bool,
    /// Publish fast AQI
    pub aqi: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            ambient: Ambient::default(),
            no2: true,
            o3: true,
            aqi: true,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown section header
    InvalidSection,
    /// Unknown key in the sensor section
    UnknownKey,
    /// Value has the wrong type or cannot be parsed
    InvalidValue,
    /// Value parsed but is outside the allowed range
    OutOfRange,
}

impl SensorConfig {
    /// Check the configuration is usable
    ///
    /// The address must be 7-bit and a cycle must fit in the update
    /// interval (each cycle blocks for the conversion time).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address > MAX_ADDRESS {
            return Err(ConfigError::OutOfRange);
        }
        if self.update_interval_ms < NO2_O3_SAMPLE_TIME_MS {
            return Err(ConfigError::OutOfRange);
        }
        if !(0.0..=100.0).contains(&self.ambient.humidity_pct) {
            return Err(ConfigError::OutOfRange);
        }
        Ok(())
    }

    /// Check if any output is enabled
    pub fn any_output(&self) -> bool {
        Channel::ALL.iter().any(|c| self.publishes(*c))
    }

    /// Check if `channel` is enabled
    pub fn publishes(&self, channel: Channel) -> bool {
        match channel {
            Channel::No2 => self.no2,
            Channel::O3 => self.o3,
            Channel::FastAqi => self.aqi,
        }
    }
}
