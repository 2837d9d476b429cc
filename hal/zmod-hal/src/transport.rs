//! Bus transport abstraction
//!
//! Provides the addressed block read/write contract that the sensor
//! controller is written against. Implementations exist for real I2C
//! masters ([`crate::bus::I2cTransport`]) and for host testing
//! ([`crate::loopback::Loopback`]).

use crate::error::TransportError;

/// Addressed register transport
///
/// All operations are blocking. Implementations are stateless across calls
/// apart from the bus handle they own, which must be opened before use.
pub trait Transport {
    /// Optionally write, then read from a device
    ///
    /// If `write` is non-empty it is sent first and the read follows after a
    /// repeated start. The peer may supply fewer bytes than `buf` holds;
    /// that is not an error, and only the first `n` bytes of `buf` are
    /// valid.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write` - Bytes to write first (typically the register address)
    /// * `buf` - Buffer to read into
    ///
    /// # Returns
    /// The number of bytes actually filled.
    fn read(&mut self, address: u8, write: &[u8], buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write up to two segments as one bus transaction
    ///
    /// Either segment may be empty. On the wire the segments appear back to
    /// back with no repeated start.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `first` - Leading bytes (typically the register address)
    /// * `second` - Trailing bytes (typically the register payload)
    fn write(&mut self, address: u8, first: &[u8], second: &[u8]) -> Result<(), TransportError>;

    /// Block for `ms` milliseconds
    fn sleep_ms(&mut self, ms: u32);

    /// Hard-reset the device
    ///
    /// Transports without a reset line keep the default no-op.
    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read(&mut self, address: u8, write: &[u8], buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(address, write, buf)
    }

    fn write(&mut self, address: u8, first: &[u8], second: &[u8]) -> Result<(), TransportError> {
        (**self).write(address, first, second)
    }

    fn sleep_ms(&mut self, ms: u32) {
        (**self).sleep_ms(ms)
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        (**self).reset()
    }
}
