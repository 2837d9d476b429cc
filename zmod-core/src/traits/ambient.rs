//! Ambient conditions input
//!
//! The gas algorithm compensates for humidity and temperature. Without an
//! external sensor the fixed defaults below are used.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default relative humidity (%)
pub const DEFAULT_HUMIDITY_PCT: f32 = 50.0;

/// Default ambient temperature (°C)
pub const DEFAULT_TEMPERATURE_DEGC: f32 = 25.0;

/// Humidity and temperature at the sensor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ambient {
    /// Relative humidity (%)
    pub humidity_pct: f32,
    /// Temperature (°C)
    pub temperature_degc: f32,
}

impl Default for Ambient {
    fn default() -> Self {
        Self {
            humidity_pct: DEFAULT_HUMIDITY_PCT,
            temperature_degc: DEFAULT_TEMPERATURE_DEGC,
        }
    }
}

impl Ambient {
    /// Create fixed ambient conditions
    pub const fn new(humidity_pct: f32, temperature_degc: f32) -> Self {
        Self {
            humidity_pct,
            temperature_degc,
        }
    }
}

/// Source of ambient conditions
///
/// Implement this for a humidity/temperature sensor to feed live values
/// into each measurement cycle.
pub trait AmbientSource {
    /// Current ambient conditions
    fn ambient(&mut self) -> Ambient;
}

/// Fixed conditions
impl AmbientSource for Ambient {
    fn ambient(&mut self) -> Ambient {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ambient() {
        let mut ambient = Ambient::default();
        assert_eq!(ambient.ambient(), Ambient::new(50.0, 25.0));
    }
}
