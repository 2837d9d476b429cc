//! Lifecycle state machine
//!
//! All controller behavior is a function of the current state and an
//! event. Setup faults are terminal for the boot cycle.

use super::events::Event;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Nothing sent to the device yet
    #[default]
    Uninitialized,
    /// Init profile loaded, configuration read back
    Initialized,
    /// Measurement profile loaded; ready for cycles
    Prepared,
    /// Start command sent, waiting for the conversion
    Measuring,
    /// ADC result read, not yet handed on
    ResultReady,
    /// Setup failed; no cycles until the next boot
    Degraded(FaultKind),
}

/// Which setup step failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// Initialization sequence failed
    Init,
    /// Measurement profile could not be loaded
    Prepare,
}

impl State {
    /// Check if a measurement cycle may start
    pub fn can_measure(&self) -> bool {
        matches!(self, State::Prepared)
    }

    /// Check if this is the degraded state
    pub fn is_degraded(&self) -> bool {
        matches!(self, State::Degraded(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use State::*;

        match (self, event) {
            // Setup transitions
            (Uninitialized, InitComplete) => Initialized,
            (Uninitialized, Fault(kind)) => Degraded(kind),
            (Initialized, PrepareComplete) => Prepared,
            (Initialized, Fault(kind)) => Degraded(kind),

            // Measurement cycle
            (Prepared, MeasurementStarted) => Measuring,
            (Prepared, CycleAborted) => Prepared,
            (Measuring, ConversionComplete) => ResultReady,
            (Measuring, CycleAborted) => Prepared,
            (ResultReady, CycleComplete) => Prepared,
            (ResultReady, CycleAborted) => Prepared,

            // Default: stay in current state (Degraded never leaves)
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_flow() {
        let state = State::default();
        assert_eq!(state, State::Uninitialized);

        let state = state.transition(Event::InitComplete);
        assert_eq!(state, State::Initialized);

        let state = state.transition(Event::PrepareComplete);
        assert_eq!(state, State::Prepared);
        assert!(state.can_measure());
    }

    #[test]
    fn test_measurement_cycle() {
        let state = State::Prepared;

        let measuring = state.transition(Event::MeasurementStarted);
        assert_eq!(measuring, State::Measuring);
        assert!(!measuring.can_measure());

        let ready = measuring.transition(Event::ConversionComplete);
        assert_eq!(ready, State::ResultReady);

        let back = ready.transition(Event::CycleComplete);
        assert_eq!(back, State::Prepared);
    }

    #[test]
    fn test_abort_returns_to_prepared() {
        for state in [State::Prepared, State::Measuring, State::ResultReady] {
            assert_eq!(state.transition(Event::CycleAborted), State::Prepared);
        }
    }

    #[test]
    fn test_setup_faults_degrade() {
        let degraded = State::Uninitialized.transition(Event::Fault(FaultKind::Init));
        assert_eq!(degraded, State::Degraded(FaultKind::Init));
        assert!(degraded.is_degraded());

        let degraded = State::Initialized.transition(Event::Fault(FaultKind::Prepare));
        assert_eq!(degraded, State::Degraded(FaultKind::Prepare));
    }

    #[test]
    fn test_degraded_is_terminal() {
        let degraded = State::Degraded(FaultKind::Init);
        let events = [
            Event::InitComplete,
            Event::PrepareComplete,
            Event::MeasurementStarted,
            Event::ConversionComplete,
            Event::CycleComplete,
            Event::CycleAborted,
        ];

        for event in events {
            assert_eq!(degraded.transition(event), degraded);
        }
        assert!(!degraded.can_measure());
    }

    #[test]
    fn test_cannot_skip_setup() {
        assert_eq!(
            State::Uninitialized.transition(Event::PrepareComplete),
            State::Uninitialized
        );
        assert_eq!(
            State::Uninitialized.transition(Event::MeasurementStarted),
            State::Uninitialized
        );
        assert_eq!(
            State::Initialized.transition(Event::MeasurementStarted),
            State::Initialized
        );
    }
}
