//! `embedded-hal` I2C transport
//!
//! Adapts any blocking `embedded-hal` 1.0 I2C master plus delay provider to
//! the [`Transport`] contract. This is the transport used on real hardware.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, I2c, NoAcknowledgeSource, Operation};

use crate::error::{code, ErrorScope, TransportError};
use crate::transport::Transport;

/// Largest single write: one register byte plus a 32-byte payload
pub const MAX_WRITE_LEN: usize = 33;

/// Bus transport configuration
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Pause between the write and read phases of a read, in ms
    ///
    /// Zero issues a single write-read with repeated start. A non-zero
    /// value splits the read into a write, a delay and a plain read, for
    /// masters that cannot hold the bus while the device fetches data.
    pub read_settle_ms: u32,
}

impl BusConfig {
    /// Repeated-start write-read, no settle time
    pub const REPEATED_START: Self = Self { read_settle_ms: 0 };

    /// Split write/read with a 10 ms settle time
    pub const SETTLED: Self = Self { read_settle_ms: 10 };
}

/// Map an `embedded-hal` error kind onto the transport code table
pub fn classify(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address) => code::ADDRESS_NACK,
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => code::DATA_NACK,
        // Source unknown: the data phase is the more common culprit
        ErrorKind::NoAcknowledge(_) => code::DATA_NACK,
        // Bus, arbitration loss, overrun and anything newer
        _ => code::OTHER,
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> TransportError {
    TransportError::new(classify(e.kind()), ErrorScope::EmbeddedHal)
}

/// Transport over an `embedded-hal` I2C master
pub struct I2cTransport<I2C, D> {
    i2c: I2C,
    delay: D,
    config: BusConfig,
}

impl<I2C: I2c, D: DelayNs> I2cTransport<I2C, D> {
    /// Create a transport using repeated-start reads
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, BusConfig::REPEATED_START)
    }

    /// Create a transport with an explicit configuration
    pub fn with_config(i2c: I2C, delay: D, config: BusConfig) -> Self {
        Self { i2c, delay, config }
    }

    /// Get the configuration
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Release the underlying bus and delay provider
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C: I2c, D: DelayNs> Transport for I2cTransport<I2C, D> {
    fn read(&mut self, address: u8, write: &[u8], buf: &mut [u8]) -> Result<usize, TransportError> {
        if write.is_empty() {
            self.i2c.read(address, buf).map_err(bus_error)?;
        } else if self.config.read_settle_ms == 0 {
            self.i2c.write_read(address, write, buf).map_err(bus_error)?;
        } else {
            self.i2c.write(address, write).map_err(bus_error)?;
            self.delay.delay_ms(self.config.read_settle_ms);
            self.i2c.read(address, buf).map_err(bus_error)?;
        }

        // embedded-hal masters always fill the whole buffer or fail
        Ok(buf.len())
    }

    fn write(&mut self, address: u8, first: &[u8], second: &[u8]) -> Result<(), TransportError> {
        if first.len() + second.len() > MAX_WRITE_LEN {
            return Err(TransportError::new(
                code::BUFFER_TOO_LONG,
                ErrorScope::EmbeddedHal,
            ));
        }

        let result = match (first.is_empty(), second.is_empty()) {
            (_, true) => self.i2c.write(address, first),
            (true, false) => self.i2c.write(address, second),
            // Adjacent writes in one transaction are merged on the wire
            (false, false) => self.i2c.transaction(
                address,
                &mut [Operation::Write(first), Operation::Write(second)],
            ),
        };

        result.map_err(bus_error)
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorType;

    #[derive(Debug, PartialEq)]
    enum Op {
        Write(u8, Vec<u8>),
        Read(u8, usize),
        WriteRead(u8, Vec<u8>, usize),
    }

    /// Records every bus operation; optionally fails all of them
    #[derive(Default)]
    struct FakeI2c {
        ops: Vec<Op>,
        fail: Option<ErrorKind>,
    }

    impl ErrorType for FakeI2c {
        type Error = ErrorKind;
    }

    impl I2c for FakeI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(kind) = self.fail {
                return Err(kind);
            }

            let mut pending: Vec<u8> = Vec::new();
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => pending.extend_from_slice(bytes),
                    Operation::Read(buf) => {
                        for (i, b) in buf.iter_mut().enumerate() {
                            *b = i as u8;
                        }
                        if pending.is_empty() {
                            self.ops.push(Op::Read(address, buf.len()));
                        } else {
                            let written = core::mem::take(&mut pending);
                            self.ops.push(Op::WriteRead(address, written, buf.len()));
                        }
                    }
                }
            }
            if !pending.is_empty() {
                self.ops.push(Op::Write(address, pending));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeDelay {
        total_ns: u64,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    #[test]
    fn test_two_segment_write_is_one_transaction() {
        let mut bus = I2cTransport::new(FakeI2c::default(), FakeDelay::default());
        bus.write(0x33, &[0x40], &[0x00, 0x50]).unwrap();

        let (i2c, _) = bus.release();
        assert_eq!(i2c.ops, vec![Op::Write(0x33, vec![0x40, 0x00, 0x50])]);
    }

    #[test]
    fn test_single_segment_write() {
        let mut bus = I2cTransport::new(FakeI2c::default(), FakeDelay::default());
        bus.write(0x33, &[], &[0x93, 0x80]).unwrap();
        bus.write(0x33, &[0x94], &[]).unwrap();

        let (i2c, _) = bus.release();
        assert_eq!(
            i2c.ops,
            vec![Op::Write(0x33, vec![0x93, 0x80]), Op::Write(0x33, vec![0x94])]
        );
    }

    #[test]
    fn test_oversize_write_rejected() {
        let mut bus = I2cTransport::new(FakeI2c::default(), FakeDelay::default());
        let payload = [0u8; MAX_WRITE_LEN];

        let err = bus.write(0x33, &[0x68], &payload).unwrap_err();
        assert_eq!(err.code(), code::BUFFER_TOO_LONG);
        assert_eq!(err.scope(), ErrorScope::EmbeddedHal);

        let (i2c, _) = bus.release();
        assert!(i2c.ops.is_empty());
    }

    #[test]
    fn test_repeated_start_read() {
        let mut bus = I2cTransport::new(FakeI2c::default(), FakeDelay::default());
        assert_eq!(bus.config().read_settle_ms, BusConfig::REPEATED_START.read_settle_ms);
        let mut buf = [0u8; 4];

        let n = bus.read(0x33, &[0x97], &mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(buf, [0, 1, 2, 3]);

        let (i2c, delay) = bus.release();
        assert_eq!(i2c.ops, vec![Op::WriteRead(0x33, vec![0x97], 4)]);
        assert_eq!(delay.total_ns, 0);
    }

    #[test]
    fn test_settled_read_splits_phases() {
        let mut bus = I2cTransport::with_config(
            FakeI2c::default(),
            FakeDelay::default(),
            BusConfig::SETTLED,
        );
        let mut buf = [0u8; 2];
        bus.read(0x33, &[0x00], &mut buf).unwrap();

        let (i2c, delay) = bus.release();
        assert_eq!(
            i2c.ops,
            vec![Op::Write(0x33, vec![0x00]), Op::Read(0x33, 2)]
        );
        assert_eq!(delay.total_ns, 10_000_000);
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(
            classify(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            code::ADDRESS_NACK
        );
        assert_eq!(
            classify(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
            code::DATA_NACK
        );
        assert_eq!(classify(ErrorKind::Bus), code::OTHER);
        assert_eq!(classify(ErrorKind::ArbitrationLoss), code::OTHER);
    }

    #[test]
    fn test_bus_failure_is_reported() {
        let i2c = FakeI2c {
            fail: Some(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            ..Default::default()
        };
        let mut bus = I2cTransport::new(i2c, FakeDelay::default());

        let err = bus.write(0x33, &[0x93], &[0x80]).unwrap_err();
        assert_eq!(err.code(), code::ADDRESS_NACK);
        assert_eq!(
            err.to_string(),
            "I2C Bus Error: Received NACK on transmit of address"
        );
    }

    #[test]
    fn test_sleep_uses_delay() {
        let mut bus = I2cTransport::new(FakeI2c::default(), FakeDelay::default());
        bus.sleep_ms(6000);

        let (_, delay) = bus.release();
        assert_eq!(delay.total_ns, 6_000_000_000);
    }
}
