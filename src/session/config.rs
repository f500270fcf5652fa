//! Observer session configuration

use std::time::Duration;

/// Timing options for observer sessions
#[derive(Debug, Clone)]
pub struct ObserverConfig {
    /// Interval between tally pushes
    pub tick_interval: Duration,

    /// Maximum time a single push may take before the observer is dropped
    pub push_timeout: Duration,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            push_timeout: Duration::from_secs(5),
        }
    }
}

impl ObserverConfig {
    /// Set the tick interval
    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// Set the push timeout
    pub fn push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = timeout;
        self
    }
}
