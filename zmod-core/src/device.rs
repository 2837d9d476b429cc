//! Live device state
//!
//! Mirrors what was read back from the sensor and holds the buffers the
//! measurement cycle fills. Created once at setup and kept for the life of
//! the process.

use crate::descriptor::{
    ConfigProfile, ADC_RESULT_LEN, CONFIG_LEN, INIT, INIT_RESULT_LEN, MEASUREMENT, PID_LEN,
    PROD_DATA_LEN,
};

/// Device state for one ZMOD4510
///
/// Every buffer has a fixed size. Reads may fill fewer bytes than the
/// buffer holds; the `*_len` counters track how many bytes are valid and
/// the accessors only expose that prefix.
#[derive(Debug, Clone)]
pub struct DeviceState {
    address: u8,
    init_conf: &'static ConfigProfile,
    meas_conf: &'static ConfigProfile,
    pid: [u8; PID_LEN],
    pid_len: usize,
    config: [u8; CONFIG_LEN],
    config_len: usize,
    prod_data: [u8; PROD_DATA_LEN],
    prod_data_len: usize,
    init_result: [u8; INIT_RESULT_LEN],
    init_result_len: usize,
    adc: [u8; ADC_RESULT_LEN],
    adc_len: usize,
}

impl DeviceState {
    /// Create state for a device at `address` using the NO2/O3 profiles
    pub const fn new(address: u8) -> Self {
        Self {
            address,
            init_conf: &INIT,
            meas_conf: &MEASUREMENT,
            pid: [0; PID_LEN],
            pid_len: 0,
            config: [0; CONFIG_LEN],
            config_len: 0,
            prod_data: [0; PROD_DATA_LEN],
            prod_data_len: 0,
            init_result: [0; INIT_RESULT_LEN],
            init_result_len: 0,
            adc: [0; ADC_RESULT_LEN],
            adc_len: 0,
        }
    }

    /// Bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Change the bus address
    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Initialization profile
    pub fn init_conf(&self) -> &'static ConfigProfile {
        self.init_conf
    }

    /// Measurement profile
    pub fn meas_conf(&self) -> &'static ConfigProfile {
        self.meas_conf
    }

    /// Product ID, if fully read
    pub fn product_id(&self) -> Option<u16> {
        (self.pid_len == PID_LEN).then(|| u16::from_be_bytes(self.pid))
    }

    /// Valid bytes of the configuration block
    pub fn config(&self) -> &[u8] {
        &self.config[..self.config_len]
    }

    /// Valid bytes of the production data
    pub fn prod_data(&self) -> &[u8] {
        &self.prod_data[..self.prod_data_len]
    }

    /// Valid bytes of the init result readback
    pub fn init_result(&self) -> &[u8] {
        &self.init_result[..self.init_result_len]
    }

    /// Valid bytes of the last ADC result
    pub fn adc_result(&self) -> &[u8] {
        &self.adc[..self.adc_len]
    }

    /// Buffer for the product ID read
    pub fn pid_buf(&mut self) -> &mut [u8; PID_LEN] {
        &mut self.pid
    }

    /// Buffer for the configuration read
    pub fn config_buf(&mut self) -> &mut [u8; CONFIG_LEN] {
        &mut self.config
    }

    /// Buffer for the production data read
    pub fn prod_data_buf(&mut self) -> &mut [u8; PROD_DATA_LEN] {
        &mut self.prod_data
    }

    /// Buffer for the init result read
    pub fn init_result_buf(&mut self) -> &mut [u8; INIT_RESULT_LEN] {
        &mut self.init_result
    }

    /// Buffer for the ADC result read
    pub fn adc_buf(&mut self) -> &mut [u8; ADC_RESULT_LEN] {
        &mut self.adc
    }

    /// Record how many product ID bytes are valid
    pub fn set_pid_len(&mut self, len: usize) {
        self.pid_len = len.min(PID_LEN);
    }

    /// Record how many configuration bytes are valid
    pub fn set_config_len(&mut self, len: usize) {
        self.config_len = len.min(CONFIG_LEN);
    }

    /// Record how many production data bytes are valid
    pub fn set_prod_data_len(&mut self, len: usize) {
        self.prod_data_len = len.min(PROD_DATA_LEN);
    }

    /// Record how many init result bytes are valid
    pub fn set_init_result_len(&mut self, len: usize) {
        self.init_result_len = len.min(INIT_RESULT_LEN);
    }

    /// Record how many ADC bytes are valid
    pub fn set_adc_len(&mut self, len: usize) {
        self.adc_len = len.min(ADC_RESULT_LEN);
    }

    /// Discard the last ADC result
    pub fn clear_adc(&mut self) {
        self.adc_len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_sizes() {
        let mut dev = DeviceState::new(0x33);
        assert_eq!(dev.config_buf().len(), 6);
        assert_eq!(dev.prod_data_buf().len(), PROD_DATA_LEN);
        assert_eq!(dev.prod_data_buf().len(), dev.meas_conf().prod_data_len);
        assert_eq!(dev.adc_buf().len(), dev.meas_conf().r.len);
        assert_eq!(dev.init_result_buf().len(), dev.init_conf().r.len);
    }

    #[test]
    fn test_nothing_valid_before_reads() {
        let dev = DeviceState::new(0x33);
        assert_eq!(dev.address(), 0x33);
        assert!(dev.config().is_empty());
        assert!(dev.prod_data().is_empty());
        assert!(dev.adc_result().is_empty());
        assert_eq!(dev.product_id(), None);
    }

    #[test]
    fn test_valid_prefix_only() {
        let mut dev = DeviceState::new(0x33);
        dev.adc_buf().copy_from_slice(&[7u8; ADC_RESULT_LEN]);
        dev.set_adc_len(20);
        assert_eq!(dev.adc_result().len(), 20);

        // Counters never exceed the buffer
        dev.set_adc_len(100);
        assert_eq!(dev.adc_result().len(), ADC_RESULT_LEN);

        dev.clear_adc();
        assert!(dev.adc_result().is_empty());
    }

    #[test]
    fn test_product_id() {
        let mut dev = DeviceState::new(0x33);
        *dev.pid_buf() = [0x63, 0x20];
        dev.set_pid_len(1);
        assert_eq!(dev.product_id(), None);
        dev.set_pid_len(2);
        assert_eq!(dev.product_id(), Some(0x6320));
    }
}
