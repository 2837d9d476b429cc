//! Gas algorithm trait
//!
//! The NO2/O3 calculation is a vendor black box. The controller only hands
//! it the raw ADC bytes plus ambient conditions and forwards whatever comes
//! back.

use crate::device::DeviceState;
use crate::traits::sink::Channel;

/// Algorithm input for one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlgorithmInput<'a> {
    /// Valid ADC bytes from the result register group
    pub adc_result: &'a [u8],
    /// Relative humidity (%)
    pub humidity_pct: f32,
    /// Ambient temperature (°C)
    pub temperature_degc: f32,
}

/// Calibrated output of one measurement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GasReading {
    /// NO2 concentration (ppb)
    pub no2_ppb: f32,
    /// O3 concentration (ppb)
    pub o3_ppb: f32,
    /// Fast air quality index
    pub fast_aqi: u16,
}

impl GasReading {
    /// Value published on `channel`
    pub fn value(&self, channel: Channel) -> f32 {
        match channel {
            Channel::No2 => self.no2_ppb,
            Channel::O3 => self.o3_ppb,
            Channel::FastAqi => self.fast_aqi as f32,
        }
    }
}

/// Non-normal algorithm status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlgorithmError {
    /// Sensor still warming up; results are not trustworthy yet
    ///
    /// Not a failure: the cycle's output is simply discarded.
    Stabilizing,
    /// Calculation failed with a vendor status code
    Failed(i8),
}

/// Opaque NO2/O3 calculation engine
///
/// Implementations own their internal warm-up counters. The controller
/// calls [`GasAlgorithm::init`] once at setup and
/// [`GasAlgorithm::calculate`] once per measurement cycle.
pub trait GasAlgorithm {
    /// Reset the algorithm state
    fn init(&mut self) -> Result<(), AlgorithmError>;

    /// Turn one ADC result into concentrations
    ///
    /// `device` gives access to the configuration and production data read
    /// from the sensor at initialization.
    fn calculate(
        &mut self,
        device: &DeviceState,
        input: &AlgorithmInput<'_>,
    ) -> Result<GasReading, AlgorithmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_values_by_channel() {
        let reading = GasReading {
            no2_ppb: 12.5,
            o3_ppb: 3.25,
            fast_aqi: 7,
        };
        let values = Channel::ALL.map(|c| reading.value(c));
        assert_eq!(values, [12.5, 3.25, 7.0]);
    }
}
