//! Transport error classification
//!
//! Every transport failure is a numeric code plus the scope of the
//! implementation that produced it. The code table follows the classic
//! two-wire master status codes; codes outside the table are still
//! renderable, so the mapping from code to message is total.

use core::fmt;

/// Known transport status codes
pub mod code {
    /// Payload did not fit the transmit buffer
    pub const BUFFER_TOO_LONG: i32 = 1;
    /// Peer did not acknowledge its address
    pub const ADDRESS_NACK: i32 = 2;
    /// Peer did not acknowledge a data byte
    pub const DATA_NACK: i32 = 3;
    /// Any other bus failure
    pub const OTHER: i32 = 4;
    /// Bus transaction timed out
    pub const TIMEOUT: i32 = 5;
}

/// Which transport implementation produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorScope {
    /// Two-wire master that reports raw status codes
    Wire,
    /// Adapter over an `embedded-hal` I2C implementation
    EmbeddedHal,
    /// In-memory loopback transport
    Loopback,
}

impl ErrorScope {
    /// Diagnostic prefix for messages from this scope
    pub const fn prefix(self) -> &'static str {
        match self {
            ErrorScope::Wire => "Wire Error",
            ErrorScope::EmbeddedHal => "I2C Bus Error",
            ErrorScope::Loopback => "Loopback Error",
        }
    }
}

/// Class of a transport status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorClass {
    /// Code 1: payload too long for the transmit buffer
    BufferTooLong,
    /// Code 2: address not acknowledged
    AddressNack,
    /// Code 3: data byte not acknowledged
    DataNack,
    /// Code 4: any other bus error
    Other,
    /// Code 5: transaction timed out
    Timeout,
    /// Code outside the known table
    Unknown(i32),
}

impl ErrorClass {
    /// Classify a raw status code
    pub const fn from_code(code: i32) -> Self {
        match code {
            code::BUFFER_TOO_LONG => ErrorClass::BufferTooLong,
            code::ADDRESS_NACK => ErrorClass::AddressNack,
            code::DATA_NACK => ErrorClass::DataNack,
            code::OTHER => ErrorClass::Other,
            code::TIMEOUT => ErrorClass::Timeout,
            other => ErrorClass::Unknown(other),
        }
    }

    /// Fixed message for this class
    ///
    /// For [`ErrorClass::Unknown`] this is only the leading text; the
    /// `Display` impl appends the code.
    pub const fn message(self) -> &'static str {
        match self {
            ErrorClass::BufferTooLong => "Data too long to fit in transmit buffer",
            ErrorClass::AddressNack => "Received NACK on transmit of address",
            ErrorClass::DataNack => "Received NACK on transmit of data",
            ErrorClass::Other => "Other error",
            ErrorClass::Timeout => "Timeout",
            ErrorClass::Unknown(_) => "unknown error",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::Unknown(code) => write!(f, "unknown error {}", code),
            known => f.write_str(known.message()),
        }
    }
}

/// Transport-level failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportError {
    code: i32,
    scope: ErrorScope,
}

impl TransportError {
    /// Create an error from a raw status code
    pub const fn new(code: i32, scope: ErrorScope) -> Self {
        Self { code, scope }
    }

    /// Raw status code
    pub const fn code(&self) -> i32 {
        self.code
    }

    /// Implementation that produced the error
    pub const fn scope(&self) -> ErrorScope {
        self.scope
    }

    /// Classified status code
    pub const fn class(&self) -> ErrorClass {
        ErrorClass::from_code(self.code)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.scope.prefix(), self.class())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransportError {
    fn format(&self, f: defmt::Formatter) {
        match self.class() {
            ErrorClass::Unknown(code) => {
                defmt::write!(f, "{}: unknown error {}", self.scope.prefix(), code)
            }
            class => defmt::write!(f, "{}: {}", self.scope.prefix(), class.message()),
        }
    }
}

/// Render an error into a caller-provided buffer
///
/// Output that does not fit is truncated, like `snprintf`. Returns the
/// rendered text.
pub fn describe<'a>(error: &TransportError, buf: &'a mut [u8]) -> &'a str {
    let mut writer = SliceWriter { buf, len: 0 };
    // SliceWriter never fails; it truncates instead
    let _ = fmt::write(&mut writer, format_args!("{}", error));
    let SliceWriter { buf, len } = writer;
    let buf: &'a [u8] = buf;
    core::str::from_utf8(&buf[..len]).unwrap_or_default()
}

/// `fmt::Write` over a byte slice that silently truncates
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl fmt::Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let mut take = s.len().min(room);
        // Never split a UTF-8 sequence
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_codes() {
        let expected = [
            (1, "Data too long to fit in transmit buffer"),
            (2, "Received NACK on transmit of address"),
            (3, "Received NACK on transmit of data"),
            (4, "Other error"),
            (5, "Timeout"),
        ];

        for (code, message) in expected {
            let err = TransportError::new(code, ErrorScope::Wire);
            assert_eq!(err.to_string(), format!("Wire Error: {}", message));
        }
    }

    #[test]
    fn test_unknown_code() {
        let err = TransportError::new(42, ErrorScope::EmbeddedHal);
        assert_eq!(err.class(), ErrorClass::Unknown(42));
        assert_eq!(err.to_string(), "I2C Bus Error: unknown error 42");

        let err = TransportError::new(0, ErrorScope::Wire);
        assert_eq!(err.to_string(), "Wire Error: unknown error 0");
    }

    #[test]
    fn test_describe_fits() {
        let err = TransportError::new(code::TIMEOUT, ErrorScope::Loopback);
        let mut buf = [0u8; 64];
        assert_eq!(describe(&err, &mut buf), "Loopback Error: Timeout");
    }

    #[test]
    fn test_describe_truncates() {
        let err = TransportError::new(code::ADDRESS_NACK, ErrorScope::Wire);
        let mut buf = [0u8; 10];
        assert_eq!(describe(&err, &mut buf), "Wire Error");

        let mut empty = [0u8; 0];
        assert_eq!(describe(&err, &mut empty), "");
    }

    proptest! {
        #[test]
        fn test_every_code_renders(code in any::<i32>()) {
            let err = TransportError::new(code, ErrorScope::Wire);
            let text = err.to_string();
            prop_assert!(text.starts_with("Wire Error: "));
            if (1..=5).contains(&code) {
                prop_assert!(!text.contains("unknown"));
            } else {
                let tail = format!("unknown error {}", code);
                prop_assert!(text.ends_with(&tail));
            }
        }
    }
}
