//! Gas sensor implementations

pub mod zmod4510;

pub use zmod4510::{CycleOutcome, DeviceError, Zmod4510};
