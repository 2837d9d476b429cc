//! Sensor driver implementations
//!
//! This crate drives the ZMOD4510 through the transport defined in
//! zmod-hal, using the descriptor, state machine and collaborator traits
//! from zmod-core:
//!
//! - Lifecycle controller (initialize, prepare, measurement cycle)
//! - Hand-off of ADC results to the NO2/O3 algorithm
//! - Publishing of results to value sinks

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod sensor;

pub use sensor::{CycleOutcome, DeviceError, Zmod4510};
