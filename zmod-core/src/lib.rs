//! Board-agnostic core logic for the ZMOD4510 sensor
//!
//! This crate contains everything that does not touch the bus:
//!
//! - Device descriptor (register groups and configuration profiles)
//! - Device state (live buffers mirrored from the sensor)
//! - Lifecycle state machine
//! - Collaborator traits (gas algorithm, ambient conditions, value sinks)
//! - Configuration type definitions and parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod descriptor;
pub mod device;
pub mod state;
pub mod traits;
