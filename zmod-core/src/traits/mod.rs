//! Collaborator traits
//!
//! These traits define the interface between the lifecycle controller and
//! the parts of the system it does not own: the vendor algorithm, the
//! ambient conditions input and the downstream value sinks.

pub mod algorithm;
pub mod ambient;
pub mod sink;

pub use algorithm::{AlgorithmError, AlgorithmInput, GasAlgorithm, GasReading};
pub use ambient::{Ambient, AmbientSource};
pub use sink::{Channel, NullSink, Sinks, ValueSink};
