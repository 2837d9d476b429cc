//! Events that trigger state transitions

use super::machine::FaultKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Setup events
    /// Init profile loaded and configuration read back
    InitComplete,
    /// Measurement profile loaded
    PrepareComplete,

    // Measurement cycle events
    /// Start command accepted by the device
    MeasurementStarted,
    /// Conversion wait elapsed and ADC result read
    ConversionComplete,
    /// Result handed to the algorithm (published or discarded)
    CycleComplete,
    /// Transport failure during a cycle
    CycleAborted,

    // Fault events
    /// Setup step failed
    Fault(FaultKind),
}
