//! ZMOD4510 NO2/O3 sensor driver
//!
//! Drives the sensor through its lifecycle:
//!
//! 1. `initialize()` - reset, read identity and calibration data, run the
//!    init sequencer program
//! 2. `prepare()` - load the NO2/O3 measurement program
//! 3. `update()` - one measurement cycle per call: start, wait for the
//!    conversion, read the ADC result, run the algorithm, publish
//!
//! Failures never propagate to the host scheduler. A failed setup step
//! leaves the driver `Degraded` and every later `update()` returns
//! [`CycleOutcome::NotReady`] without touching the bus.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use zmod_core::config::{ConfigError, SensorConfig};
use zmod_core::descriptor::{reg, ConfigProfile, CONFIG_LEN, STATUS_SEQUENCER_RUNNING};
use zmod_core::device::DeviceState;
use zmod_core::state::{Event, FaultKind, State};
use zmod_core::traits::{
    AlgorithmError, AlgorithmInput, Ambient, AmbientSource, Channel, GasAlgorithm, GasReading,
    NullSink, Sinks, ValueSink,
};
use zmod_hal::{I2cTransport, Transport, TransportError};

/// Delay between status register polls (ms)
pub const STATUS_POLL_INTERVAL_MS: u32 = 10;

/// Status polls before the sequencer is considered stuck
pub const STATUS_POLL_LIMIT: u32 = 100;

/// Driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Bus transaction failed
    Transport(TransportError),
    /// Register group returned fewer bytes than required
    ShortRead {
        register: u8,
        expected: usize,
        received: usize,
    },
    /// Sequencer still running after the poll limit
    SequencerTimeout,
    /// Operation not allowed in the current state
    InvalidState(State),
    /// Configuration rejected before touching the bus
    InvalidConfig(ConfigError),
}

impl From<TransportError> for DeviceError {
    fn from(err: TransportError) -> Self {
        DeviceError::Transport(err)
    }
}

/// Result of one `update()` call
///
/// Informational only; the host does not need to act on it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Reading published to the configured sinks
    Published(GasReading),
    /// Sensor warming up, result discarded
    Stabilizing,
    /// Algorithm returned an error code, result discarded
    AlgorithmFailed(i8),
    /// Bus failure during the cycle
    Aborted(DeviceError),
    /// Driver not prepared; nothing was done
    NotReady(State),
}

/// ZMOD4510 driver
///
/// Generic over the bus transport, the NO2/O3 algorithm, the output sinks
/// and the ambient conditions source.
pub struct Zmod4510<T, A, S = NullSink, E = Ambient> {
    transport: T,
    algorithm: A,
    ambient: E,
    sinks: Sinks<S>,
    device: DeviceState,
    config: SensorConfig,
    state: State,
}

impl<T: Transport, A: GasAlgorithm> Zmod4510<T, A> {
    /// Create a driver with no sinks and the configured fixed ambient values
    pub fn new(transport: T, algorithm: A, config: SensorConfig) -> Self {
        Self {
            transport,
            algorithm,
            ambient: config.ambient,
            sinks: Sinks::default(),
            device: DeviceState::new(config.address),
            config,
            state: State::Uninitialized,
        }
    }
}

impl<I2C: I2c, D: DelayNs, A: GasAlgorithm> Zmod4510<I2cTransport<I2C, D>, A> {
    /// Create a driver on an embedded-hal I2C bus
    pub fn new_i2c(i2c: I2C, delay: D, algorithm: A, config: SensorConfig) -> Self {
        Self::new(I2cTransport::new(i2c, delay), algorithm, config)
    }
}

impl<T, A, S, E> Zmod4510<T, A, S, E>
where
    T: Transport,
    A: GasAlgorithm,
    S: ValueSink,
    E: AmbientSource,
{
    /// Replace the output sinks
    pub fn with_sinks<S2: ValueSink>(self, sinks: Sinks<S2>) -> Zmod4510<T, A, S2, E> {
        Zmod4510 {
            transport: self.transport,
            algorithm: self.algorithm,
            ambient: self.ambient,
            sinks,
            device: self.device,
            config: self.config,
            state: self.state,
        }
    }

    /// Replace the ambient conditions source
    pub fn with_ambient_source<E2: AmbientSource>(self, ambient: E2) -> Zmod4510<T, A, S, E2> {
        Zmod4510 {
            transport: self.transport,
            algorithm: self.algorithm,
            ambient,
            sinks: self.sinks,
            device: self.device,
            config: self.config,
            state: self.state,
        }
    }

    /// Set the NO2 concentration sink
    pub fn set_no2_sink(&mut self, sink: S) {
        self.sinks.no2 = Some(sink);
    }

    /// Set the O3 concentration sink
    pub fn set_o3_sink(&mut self, sink: S) {
        self.sinks.o3 = Some(sink);
    }

    /// Set the fast AQI sink
    pub fn set_aqi_sink(&mut self, sink: S) {
        self.sinks.aqi = Some(sink);
    }

    /// Get current lifecycle state
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the state read back from the device
    pub fn device(&self) -> &DeviceState {
        &self.device
    }

    /// Get the sensor configuration
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Get access to the gas algorithm
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Get access to the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Interval the host should call `update()` at
    pub fn update_interval_ms(&self) -> u32 {
        self.config.update_interval_ms
    }

    /// Release the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Run the full setup: initialize, prepare, init the algorithm
    ///
    /// Returns the resulting state. Failures are logged; the driver then
    /// stays degraded for the rest of the boot.
    pub fn setup(&mut self) -> State {
        info!("Setting up ZMOD4510 at {=u8:#x}", self.config.address);
        if !self.config.any_output() || self.sinks.configured() == 0 {
            warn!("No output enabled or no sink attached");
        }

        if self.initialize().is_ok() {
            let _ = self.prepare();
        }
        let _ = self.init_algorithm();

        if self.state.can_measure() {
            info!("ZMOD4510 ready, NO2/O3 mode");
        }
        self.state
    }

    /// Reset the sensor and run the init program
    pub fn initialize(&mut self) -> Result<(), DeviceError> {
        if self.state != State::Uninitialized {
            warn!("Initialize skipped in state {}", self.state);
            return Err(DeviceError::InvalidState(self.state));
        }

        if let Err(e) = self.config.validate() {
            error!("Invalid sensor configuration: {}", e);
            self.apply(Event::Fault(FaultKind::Init));
            return Err(DeviceError::InvalidConfig(e));
        }

        self.device.set_address(self.config.address);

        match self.run_init() {
            Ok(()) => {
                self.apply(Event::InitComplete);
                if let Some(pid) = self.device.product_id() {
                    debug!("Product ID {=u16:#x}", pid);
                }
                Ok(())
            }
            Err(e) => {
                error!("Sensor initialization failed: {}", e);
                self.apply(Event::Fault(FaultKind::Init));
                Err(e)
            }
        }
    }

    /// Load the measurement program
    pub fn prepare(&mut self) -> Result<(), DeviceError> {
        if self.state != State::Initialized {
            warn!("Prepare skipped in state {}", self.state);
            return Err(DeviceError::InvalidState(self.state));
        }

        match self.load_profile(self.device.meas_conf()) {
            Ok(()) => {
                self.apply(Event::PrepareComplete);
                Ok(())
            }
            Err(e) => {
                error!("Sensor preparation failed: {}", e);
                self.apply(Event::Fault(FaultKind::Prepare));
                Err(e)
            }
        }
    }

    /// Reset the algorithm state
    pub fn init_algorithm(&mut self) -> Result<(), AlgorithmError> {
        self.algorithm.init().map_err(|e| {
            error!("NO2/O3 algorithm initialization failed: {}", e);
            e
        })
    }

    /// Run one measurement cycle
    ///
    /// Blocks for the conversion time of the measurement profile.
    pub fn update(&mut self) -> CycleOutcome {
        if !self.state.can_measure() {
            warn!("Update skipped, sensor not ready ({})", self.state);
            return CycleOutcome::NotReady(self.state);
        }

        if let Err(e) = self.measure() {
            error!("Measurement failed: {}", e);
            self.apply(Event::CycleAborted);
            return CycleOutcome::Aborted(e);
        }

        let ambient = self.ambient.ambient();
        let input = AlgorithmInput {
            adc_result: self.device.adc_result(),
            humidity_pct: ambient.humidity_pct,
            temperature_degc: ambient.temperature_degc,
        };
        let result = self.algorithm.calculate(&self.device, &input);
        self.apply(Event::CycleComplete);

        match result {
            Ok(reading) => {
                debug!(
                    "NO2 {} ppb, O3 {} ppb, fast AQI {}",
                    reading.no2_ppb,
                    reading.o3_ppb,
                    reading.fast_aqi
                );
                self.publish(&reading);
                CycleOutcome::Published(reading)
            }
            Err(AlgorithmError::Stabilizing) => {
                warn!("Sensor is stabilizing, result ignored");
                CycleOutcome::Stabilizing
            }
            Err(AlgorithmError::Failed(code)) => {
                error!("NO2/O3 calculation failed: {}", code);
                CycleOutcome::AlgorithmFailed(code)
            }
        }
    }

    fn apply(&mut self, event: Event) {
        self.state = self.state.transition(event);
    }

    fn run_init(&mut self) -> Result<(), DeviceError> {
        self.transport.reset()?;

        let address = self.device.address();

        let n = self.transport.read(address, &[reg::PID], self.device.pid_buf())?;
        self.device.set_pid_len(n);

        let n = self.transport.read(address, &[reg::CONF], self.device.config_buf())?;
        self.device.set_config_len(n);
        require(reg::CONF, CONFIG_LEN, n)?;

        let len = self.device.meas_conf().prod_data_len;
        let n = self
            .transport
            .read(address, &[reg::PROD_DATA], &mut self.device.prod_data_buf()[..len])?;
        self.device.set_prod_data_len(n);
        require(reg::PROD_DATA, len, n)?;

        let init = self.device.init_conf();
        self.load_profile(init)?;
        self.start(init)?;
        self.wait_for_sequencer()?;

        let n = self
            .transport
            .read(address, &[init.r.addr], &mut self.device.init_result_buf()[..init.r.len])?;
        self.device.set_init_result_len(n);
        require(init.r.addr, init.r.len, n)
    }

    fn load_profile(&mut self, profile: &ConfigProfile) -> Result<(), DeviceError> {
        debug!("Loading {} profile", profile.kind);
        let address = self.device.address();
        for group in profile.write_groups() {
            self.transport.write(address, &[group.addr], group.data)?;
        }
        Ok(())
    }

    fn start(&mut self, profile: &ConfigProfile) -> Result<(), DeviceError> {
        self.transport
            .write(self.device.address(), &[reg::CMD], &[profile.start])?;
        Ok(())
    }

    fn wait_for_sequencer(&mut self) -> Result<(), DeviceError> {
        let address = self.device.address();
        let mut status = [0u8; 1];

        for _ in 0..STATUS_POLL_LIMIT {
            let n = self.transport.read(address, &[reg::STATUS], &mut status)?;
            if n == 1 && status[0] & STATUS_SEQUENCER_RUNNING == 0 {
                return Ok(());
            }
            self.transport.sleep_ms(STATUS_POLL_INTERVAL_MS);
        }
        Err(DeviceError::SequencerTimeout)
    }

    fn measure(&mut self) -> Result<(), DeviceError> {
        let meas = self.device.meas_conf();

        self.start(meas)?;
        self.apply(Event::MeasurementStarted);
        self.device.clear_adc();

        self.transport.sleep_ms(meas.sample_time_ms);

        let len = meas.r.len;
        let n = self.transport.read(
            self.device.address(),
            &[meas.r.addr],
            &mut self.device.adc_buf()[..len],
        )?;
        self.device.set_adc_len(n);
        if n < len {
            warn!("Short ADC read: {} of {} bytes", n, len);
        }

        self.apply(Event::ConversionComplete);
        Ok(())
    }

    fn publish(&mut self, reading: &GasReading) {
        for channel in Channel::ALL {
            if !self.config.publishes(channel) {
                continue;
            }
            let value = reading.value(channel);
            if self.sinks.publish(channel, value) {
                debug!("Published {}: {} {}", channel, value, channel.unit());
            }
        }
    }
}

/// Check a register group read returned everything
fn require(register: u8, expected: usize, received: usize) -> Result<(), DeviceError> {
    if received < expected {
        Err(DeviceError::ShortRead {
            register,
            expected,
            received,
        })
    } else {
        Ok(())
    }
}
