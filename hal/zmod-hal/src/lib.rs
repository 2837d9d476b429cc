//! zmod Hardware Abstraction Layer
//!
//! This crate defines the transport contract the sensor controller uses to
//! talk to the ZMOD4510. Chip-specific buses plug in through
//! [`bus::I2cTransport`], which adapts any `embedded-hal` 1.0 I2C master;
//! [`loopback::Loopback`] is an in-memory register file for host testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Lifecycle controller (zmod-drivers)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  zmod-hal (this crate - Transport)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ I2cTransport  │       │   Loopback    │
//! │ (embedded-hal)│       │ (test double) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::Transport`] - Addressed block read/write, delay, reset
//!
//! # Errors
//!
//! - [`error::TransportError`] - Numeric code plus scope, rendered by
//!   [`error::describe`]

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod bus;
pub mod error;
pub mod loopback;
pub mod transport;

// Re-export key types at crate root for convenience
pub use bus::I2cTransport;
pub use error::{ErrorScope, TransportError};
pub use loopback::Loopback;
pub use transport::Transport;
