//! ZMOD4510 device descriptor
//!
//! Static description of how bytes move between the controller and the
//! sensor: register addresses, buffer sizes and the two configuration
//! profiles used by the NO2/O3 operating mode.
//!
//! # Profiles
//!
//! A profile is five register groups written or read in a fixed order:
//! - `h`: heater set points
//! - `d`: device-ID / step data
//! - `m`: mode
//! - `s`: sequencer (start/control) steps
//! - `r`: result, read only
//!
//! The payloads are vendor calibration constants. They have no meaning to
//! the controller and are sent verbatim.

/// Default 7-bit bus address
pub const DEFAULT_ADDRESS: u8 = 0x33;

/// Length of the configuration block read from the device
pub const CONFIG_LEN: usize = 6;

/// Length of the production data block for the ZMOD4510
pub const PROD_DATA_LEN: usize = 10;

/// Length of the product ID register
pub const PID_LEN: usize = 2;

/// Length of the init result readback
pub const INIT_RESULT_LEN: usize = 4;

/// Length of the ADC result for the NO2/O3 mode
pub const ADC_RESULT_LEN: usize = 32;

/// Conversion time of one NO2/O3 measurement
pub const NO2_O3_SAMPLE_TIME_MS: u32 = 6000;

/// ZMOD4xxx register addresses
pub mod reg {
    /// Product ID
    pub const PID: u8 = 0x00;
    /// Configuration block
    pub const CONF: u8 = 0x20;
    /// Production data
    pub const PROD_DATA: u8 = 0x26;
    /// Heater set points
    pub const H: u8 = 0x40;
    /// Device / step data
    pub const D: u8 = 0x50;
    /// Mode
    pub const M: u8 = 0x60;
    /// Sequencer steps
    pub const S: u8 = 0x68;
    /// Command (sequencer start)
    pub const CMD: u8 = 0x93;
    /// Status
    pub const STATUS: u8 = 0x94;
    /// Result
    pub const R: u8 = 0x97;
}

/// Status register bit: measurement sequencer is running
pub const STATUS_SEQUENCER_RUNNING: u8 = 0x80;

/// A contiguous register range on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterGroup {
    /// First register
    pub addr: u8,
    /// Number of bytes
    pub len: usize,
    /// Payload to write; empty for groups that are only read
    pub data: &'static [u8],
}

impl RegisterGroup {
    /// Group that is written with `data`
    pub const fn write(addr: u8, data: &'static [u8]) -> Self {
        Self {
            addr,
            len: data.len(),
            data,
        }
    }

    /// Group that is only read
    pub const fn read(addr: u8, len: usize) -> Self {
        Self {
            addr,
            len,
            data: &[],
        }
    }
}

/// Which profile a [`ConfigProfile`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileKind {
    /// Run once at power-up to establish baseline configuration
    Init,
    /// Loaded before measurements and re-triggered every cycle
    Measurement,
}

/// Named bundle of register groups for one operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigProfile {
    /// Operating mode this profile sets up
    pub kind: ProfileKind,
    /// Byte written to the command register to start the sequencer
    pub start: u8,
    /// Heater set points
    pub h: RegisterGroup,
    /// Step data
    pub d: RegisterGroup,
    /// Mode
    pub m: RegisterGroup,
    /// Sequencer steps
    pub s: RegisterGroup,
    /// Result readback
    pub r: RegisterGroup,
    /// Production data length (measurement profile only)
    pub prod_data_len: usize,
    /// Conversion time after a start command, in ms (measurement profile only)
    pub sample_time_ms: u32,
}

impl ConfigProfile {
    /// Groups written when loading this profile, in bus order
    pub fn write_groups(&self) -> [&RegisterGroup; 4] {
        [&self.h, &self.d, &self.m, &self.s]
    }
}

const INIT_H: [u8; 2] = [0x00, 0x50];
const INIT_D: [u8; 2] = [0x00, 0x28];
const INIT_M: [u8; 2] = [0xC3, 0xE3];
const INIT_S: [u8; 4] = [0x00, 0x00, 0x80, 0x40];

const NO2_O3_H: [u8; 8] = [0x00, 0x50, 0xFF, 0x06, 0xFE, 0xA2, 0xFE, 0x3E];
const NO2_O3_D: [u8; 8] = [0x00, 0x10, 0x00, 0x52, 0x3F, 0x66, 0x00, 0x42];
const NO2_O3_M: [u8; 2] = [0x23, 0x03];
const NO2_O3_S: [u8; 32] = [
    0x00, 0x00, 0x02, 0x41, //
    0x00, 0x41, 0x00, 0x41, //
    0x00, 0x49, 0x00, 0x50, //
    0x02, 0x42, 0x00, 0x42, //
    0x00, 0x42, 0x00, 0x4A, //
    0x00, 0x50, 0x02, 0x43, //
    0x00, 0x43, 0x00, 0x43, //
    0x00, 0x43, 0x80, 0x5B, //
];

/// Initialization profile
pub const INIT: ConfigProfile = ConfigProfile {
    kind: ProfileKind::Init,
    start: 0x80,
    h: RegisterGroup::write(reg::H, &INIT_H),
    d: RegisterGroup::write(reg::D, &INIT_D),
    m: RegisterGroup::write(reg::M, &INIT_M),
    s: RegisterGroup::write(reg::S, &INIT_S),
    r: RegisterGroup::read(reg::R, INIT_RESULT_LEN),
    prod_data_len: 0,
    sample_time_ms: 0,
};

/// NO2/O3 measurement profile
pub const MEASUREMENT: ConfigProfile = ConfigProfile {
    kind: ProfileKind::Measurement,
    start: 0x80,
    h: RegisterGroup::write(reg::H, &NO2_O3_H),
    d: RegisterGroup::write(reg::D, &NO2_O3_D),
    m: RegisterGroup::write(reg::M, &NO2_O3_M),
    s: RegisterGroup::write(reg::S, &NO2_O3_S),
    r: RegisterGroup::read(reg::R, ADC_RESULT_LEN),
    prod_data_len: PROD_DATA_LEN,
    sample_time_ms: NO2_O3_SAMPLE_TIME_MS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_groups_match_lengths() {
        for profile in [&INIT, &MEASUREMENT] {
            for group in profile.write_groups() {
                assert!(!group.data.is_empty());
                assert_eq!(group.len, group.data.len());
            }
            assert!(profile.r.data.is_empty());
            assert_eq!(profile.r.addr, reg::R);
        }
    }

    #[test]
    fn test_init_profile() {
        assert_eq!(INIT.kind, ProfileKind::Init);
        assert_eq!(INIT.start, 0x80);
        assert_eq!(INIT.h.data, &[0x00, 0x50]);
        assert_eq!(INIT.d.data, &[0x00, 0x28]);
        assert_eq!(INIT.m.data, &[0xC3, 0xE3]);
        assert_eq!(INIT.s.data, &[0x00, 0x00, 0x80, 0x40]);
        assert_eq!(INIT.r.len, 4);
    }

    #[test]
    fn test_measurement_profile() {
        assert_eq!(MEASUREMENT.kind, ProfileKind::Measurement);
        assert_eq!(MEASUREMENT.start, 0x80);
        assert_eq!(
            MEASUREMENT.h.data,
            &[0x00, 0x50, 0xFF, 0x06, 0xFE, 0xA2, 0xFE, 0x3E]
        );
        assert_eq!(
            MEASUREMENT.d.data,
            &[0x00, 0x10, 0x00, 0x52, 0x3F, 0x66, 0x00, 0x42]
        );
        assert_eq!(MEASUREMENT.m.data, &[0x23, 0x03]);
        assert_eq!(
            MEASUREMENT.s.data,
            &[
                0x00, 0x00, 0x02, 0x41, 0x00, 0x41, 0x00, 0x41, 0x00, 0x49, 0x00, 0x50, 0x02, 0x42,
                0x00, 0x42, 0x00, 0x42, 0x00, 0x4A, 0x00, 0x50, 0x02, 0x43, 0x00, 0x43, 0x00, 0x43,
                0x00, 0x43, 0x80, 0x5B,
            ]
        );
        assert_eq!(MEASUREMENT.r.len, ADC_RESULT_LEN);
        assert_eq!(MEASUREMENT.prod_data_len, PROD_DATA_LEN);
        assert_eq!(MEASUREMENT.sample_time_ms, 6000);
    }

    #[test]
    fn test_group_addresses_in_bus_order() {
        let addrs = MEASUREMENT.write_groups().map(|g| g.addr);
        assert_eq!(addrs, [0x40, 0x50, 0x60, 0x68]);
    }
}
