//! Configuration types
//!
//! Board-agnostic sensor configuration and its TOML front end.

pub mod parse;
pub mod types;

pub use parse::parse_config;
pub use types::*;
