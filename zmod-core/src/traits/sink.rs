//! Value sink trait
//!
//! Downstream consumers of published numbers (host sensor entities,
//! display fields, radio payloads...).

/// Consumer of a published value
pub trait ValueSink {
    /// Publish a new value
    ///
    /// Publishing is assumed not to fail.
    fn publish(&mut self, value: f32);
}

impl<T: ValueSink + ?Sized> ValueSink for &mut T {
    fn publish(&mut self, value: f32) {
        (**self).publish(value)
    }
}

/// Sink that drops every value
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ValueSink for NullSink {
    fn publish(&mut self, _value: f32) {}
}

/// Output channels of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// NO2 concentration (ppb)
    No2,
    /// O3 concentration (ppb)
    O3,
    /// Fast air quality index
    FastAqi,
}

impl Channel {
    /// All channels in publish order
    pub const ALL: [Channel; 3] = [Channel::No2, Channel::O3, Channel::FastAqi];

    /// Unit of measurement
    pub const fn unit(self) -> &'static str {
        match self {
            Channel::No2 | Channel::O3 => "ppb",
            Channel::FastAqi => "",
        }
    }
}

/// The three optional output sinks
///
/// Unset sinks are skipped silently.
#[derive(Debug, Clone)]
pub struct Sinks<S> {
    /// NO2 concentration sink
    pub no2: Option<S>,
    /// O3 concentration sink
    pub o3: Option<S>,
    /// Fast AQI sink
    pub aqi: Option<S>,
}

impl<S> Default for Sinks<S> {
    fn default() -> Self {
        Self {
            no2: None,
            o3: None,
            aqi: None,
        }
    }
}

impl<S: ValueSink> Sinks<S> {
    /// Sink slot for a channel
    pub fn get_mut(&mut self, channel: Channel) -> &mut Option<S> {
        match channel {
            Channel::No2 => &mut self.no2,
            Channel::O3 => &mut self.o3,
            Channel::FastAqi => &mut self.aqi,
        }
    }

    /// Publish to one channel if a sink is set
    ///
    /// Returns true if a sink received the value.
    pub fn publish(&mut self, channel: Channel, value: f32) -> bool {
        match self.get_mut(channel) {
            Some(sink) => {
                sink.publish(value);
                true
            }
            None => false,
        }
    }

    /// Number of configured sinks
    pub fn configured(&self) -> usize {
        [self.no2.is_some(), self.o3.is_some(), self.aqi.is_some()]
            .iter()
            .filter(|set| **set)
            .count()
    }
}
