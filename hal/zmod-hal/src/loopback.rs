//! In-memory loopback transport
//!
//! Models a single device as a flat 256-byte register file. The first byte
//! of every write selects the register; the rest is stored from there on.
//! Reads return bytes starting at the register named by the first write
//! byte. Sleeping only accumulates time.
//!
//! Faults can be injected to exercise error paths: short reads, failing
//! writes or reads after a given number of successful ones.

use heapless::Vec;

use crate::error::{code, ErrorScope, TransportError};
use crate::transport::Transport;

/// Size of the simulated register space
pub const REGISTER_SPACE: usize = 256;

/// Number of transactions kept in the log
pub const LOG_CAPACITY: usize = 64;

/// A completed bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transaction {
    /// Payload written to a register
    Write { register: u8, len: usize },
    /// Read from a register
    Read {
        register: u8,
        requested: usize,
        filled: usize,
    },
}

/// Error injected after a number of successful operations
#[derive(Debug, Clone, Copy)]
struct Fault {
    after: usize,
    code: i32,
}

impl Fault {
    fn check(fault: Option<Fault>, count: usize) -> Result<(), TransportError> {
        match fault {
            Some(f) if count >= f.after => Err(TransportError::new(f.code, ErrorScope::Loopback)),
            _ => Ok(()),
        }
    }
}

/// Loopback transport backed by a register file
pub struct Loopback {
    address: u8,
    registers: [u8; REGISTER_SPACE],
    pointer: u8,
    read_limit: Option<usize>,
    write_fault: Option<Fault>,
    read_fault: Option<Fault>,
    writes: usize,
    reads: usize,
    slept_ms: u64,
    resets: usize,
    log: Vec<Transaction, LOG_CAPACITY>,
}

impl Loopback {
    /// Create a loopback device answering at `address`, registers zeroed
    pub fn new(address: u8) -> Self {
        Self {
            address,
            registers: [0; REGISTER_SPACE],
            pointer: 0,
            read_limit: None,
            write_fault: None,
            read_fault: None,
            writes: 0,
            reads: 0,
            slept_ms: 0,
            resets: 0,
            log: Vec::new(),
        }
    }

    /// Preload registers starting at `register`
    ///
    /// Bytes past the end of the register space are dropped.
    pub fn set_registers(&mut self, register: u8, data: &[u8]) {
        let start = register as usize;
        let end = (start + data.len()).min(REGISTER_SPACE);
        self.registers[start..end].copy_from_slice(&data[..end - start]);
    }

    /// Current contents of `len` registers starting at `register`
    pub fn registers(&self, register: u8, len: usize) -> &[u8] {
        let start = register as usize;
        let end = (start + len).min(REGISTER_SPACE);
        &self.registers[start..end]
    }

    /// Supply at most `limit` bytes per read
    pub fn limit_reads(&mut self, limit: usize) {
        self.read_limit = Some(limit);
    }

    /// Fail every write after the first `after` successful ones
    pub fn fail_writes_after(&mut self, after: usize, code: i32) {
        self.write_fault = Some(Fault { after, code });
    }

    /// Fail every read after the first `after` successful ones
    pub fn fail_reads_after(&mut self, after: usize, code: i32) {
        self.read_fault = Some(Fault { after, code });
    }

    /// Remove all injected faults and read limits
    pub fn clear_faults(&mut self) {
        self.read_limit = None;
        self.write_fault = None;
        self.read_fault = None;
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of successful reads
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Total time slept, in ms
    pub fn slept_ms(&self) -> u64 {
        self.slept_ms
    }

    /// Number of reset requests
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Logged transactions, oldest first
    ///
    /// Logging stops once [`LOG_CAPACITY`] entries are recorded.
    pub fn log(&self) -> &[Transaction] {
        &self.log
    }

    fn check_address(&self, address: u8) -> Result<(), TransportError> {
        if address == self.address {
            Ok(())
        } else {
            Err(TransportError::new(code::ADDRESS_NACK, ErrorScope::Loopback))
        }
    }

    fn record(&mut self, transaction: Transaction) {
        // Full log: keep the oldest entries
        let _ = self.log.push(transaction);
    }
}

impl Transport for Loopback {
    fn read(&mut self, address: u8, write: &[u8], buf: &mut [u8]) -> Result<usize, TransportError> {
        self.check_address(address)?;
        Fault::check(self.read_fault, self.reads)?;

        if let Some(&register) = write.first() {
            self.pointer = register;
        }

        let start = self.pointer as usize;
        let available = REGISTER_SPACE - start;
        let mut filled = buf.len().min(available);
        if let Some(limit) = self.read_limit {
            filled = filled.min(limit);
        }

        buf[..filled].copy_from_slice(&self.registers[start..start + filled]);

        self.reads += 1;
        self.record(Transaction::Read {
            register: self.pointer,
            requested: buf.len(),
            filled,
        });
        Ok(filled)
    }

    fn write(&mut self, address: u8, first: &[u8], second: &[u8]) -> Result<(), TransportError> {
        self.check_address(address)?;
        Fault::check(self.write_fault, self.writes)?;

        let mut bytes = first.iter().chain(second.iter()).copied();
        let Some(register) = bytes.next() else {
            // Address-only probe
            self.writes += 1;
            return Ok(());
        };

        let payload_len = first.len() + second.len() - 1;
        let start = register as usize;
        if start + payload_len > REGISTER_SPACE {
            return Err(TransportError::new(code::BUFFER_TOO_LONG, ErrorScope::Loopback));
        }

        for (slot, byte) in self.registers[start..start + payload_len].iter_mut().zip(bytes) {
            *slot = byte;
        }

        self.pointer = register;
        self.writes += 1;
        self.record(Transaction::Write {
            register,
            len: payload_len,
        });
        Ok(())
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.slept_ms += ms as u64;
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.resets += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_back() {
        let mut lb = Loopback::new(0x33);
        lb.write(0x33, &[0x40], &[0x00, 0x50, 0xFF]).unwrap();

        let mut buf = [0u8; 3];
        let n = lb.read(0x33, &[0x40], &mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(buf, [0x00, 0x50, 0xFF]);

        assert_eq!(
            lb.log(),
            &[
                Transaction::Write {
                    register: 0x40,
                    len: 3
                },
                Transaction::Read {
                    register: 0x40,
                    requested: 3,
                    filled: 3
                },
            ]
        );
    }

    #[test]
    fn test_register_in_second_segment() {
        let mut lb = Loopback::new(0x33);
        lb.write(0x33, &[], &[0x93, 0x80]).unwrap();
        assert_eq!(lb.registers(0x93, 1), &[0x80]);
    }

    #[test]
    fn test_short_fill() {
        let mut lb = Loopback::new(0x33);
        lb.set_registers(0x97, &[1, 2, 3, 4, 5, 6]);
        lb.limit_reads(4);

        let mut buf = [0xAAu8; 6];
        let n = lb.read(0x33, &[0x97], &mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(buf, [1, 2, 3, 4, 0xAA, 0xAA]);
    }

    #[test]
    fn test_read_clamped_to_register_space() {
        let mut lb = Loopback::new(0x33);
        let mut buf = [0u8; 8];
        let n = lb.read(0x33, &[0xFC], &mut buf).unwrap();
        assert_eq!(n, 4);
    }

    #[test]
    fn test_wrong_address_nacks() {
        let mut lb = Loopback::new(0x33);
        let err = lb.write(0x32, &[0x40], &[0x00]).unwrap_err();
        assert_eq!(err.code(), code::ADDRESS_NACK);
        assert_eq!(err.scope(), ErrorScope::Loopback);
        assert_eq!(lb.writes(), 0);
    }

    #[test]
    fn test_write_fault_after_count() {
        let mut lb = Loopback::new(0x33);
        lb.fail_writes_after(1, code::DATA_NACK);

        assert!(lb.write(0x33, &[0x40], &[0x00]).is_ok());
        let err = lb.write(0x33, &[0x50], &[0x00]).unwrap_err();
        assert_eq!(err.code(), code::DATA_NACK);
        assert_eq!(lb.registers(0x50, 1), &[0x00]);

        lb.clear_faults();
        assert!(lb.write(0x33, &[0x50], &[0x01]).is_ok());
    }

    #[test]
    fn test_oversize_write() {
        let mut lb = Loopback::new(0x33);
        let err = lb.write(0x33, &[0xFE], &[0, 1, 2]).unwrap_err();
        assert_eq!(err.code(), code::BUFFER_TOO_LONG);
    }

    #[test]
    fn test_sleep_and_reset_are_counted() {
        let mut lb = Loopback::new(0x33);
        lb.sleep_ms(6000);
        lb.sleep_ms(10);
        lb.reset().unwrap();
        assert_eq!(lb.slept_ms(), 6010);
        assert_eq!(lb.resets(), 1);
    }
}
