//! Reconnect backoff policy.

use std::time::Duration;

use crate::config::ReconnectSettings;

/// Bounded exponential backoff for the live channel.
///
/// `delay(n) = min(base * growth^n, cap)`, truncated to whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub growth_factor: f64,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, growth_factor: f64, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            growth_factor,
            max_delay,
            max_attempts,
        }
    }

    /// Delay to wait before the retry that follows `attempts` consecutive failures.
    pub fn delay(&self, attempts: u32) -> Duration {
        let cap_ms = self.max_delay.as_millis() as f64;
        let exponent = attempts.min(i32::MAX as u32) as i32;
        let raw_ms = self.base_delay.as_millis() as f64 * self.growth_factor.powi(exponent);
        // powi overflows to +inf for large exponents; min() keeps that at the cap
        Duration::from_millis(raw_ms.min(cap_ms).floor() as u64)
    }

    /// Whether another retry may be scheduled after `attempts` failures.
    pub fn allows_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 1.5, Duration::from_secs(30), 10)
    }
}

impl From<&ReconnectSettings> for ReconnectPolicy {
    fn from(settings: &ReconnectSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.base_delay_ms),
            settings.growth_factor,
            Duration::from_millis(settings.max_delay_ms),
            settings.max_attempts,
        )
    }
}
