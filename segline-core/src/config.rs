//! Driver configuration
//!
//! Defaults reproduce the power-on timing the LCD controllers were brought
//! up with: 100 kHz bus, 2 ms between controller writes, a 750 ms
//! all-segments-on self-test.

use segline_hal::I2cConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How status polling loops behave when hardware never answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PollMode {
    /// Spin until the condition is met
    #[default]
    Blocking,
    /// Give up after `max_polls` unsuccessful polls
    ///
    /// Applies to every wait, including the forced-stop attempts made while
    /// the bus is busy before a start condition.
    Bounded { max_polls: u32 },
}

impl PollMode {
    /// Poll limit, `None` when unbounded
    pub const fn limit(self) -> Option<u32> {
        match self {
            PollMode::Blocking => None,
            PollMode::Bounded { max_polls } => Some(max_polls),
        }
    }
}

/// Segment driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// Bus clock
    pub i2c: I2cConfig,
    /// Status polling behavior
    pub poll: PollMode,
    /// Pause after each forced stop while the bus is busy
    pub recovery_delay_ms: u32,
    /// Settling time after power-on before the first bus access
    pub power_on_delay_ms: u32,
    /// Settling time after enabling the bus peripheral
    pub enable_delay_ms: u32,
    /// Pause after each controller mode-set write
    pub mode_set_delay_ms: u32,
    /// How long the self-test keeps every segment on
    pub self_test_on_ms: u32,
    /// Pause after the self-test blanks the displays
    pub self_test_off_ms: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            i2c: I2cConfig::STANDARD,
            poll: PollMode::Blocking,
            recovery_delay_ms: 2,
            power_on_delay_ms: 2,
            enable_delay_ms: 10,
            mode_set_delay_ms: 2,
            self_test_on_ms: 750,
            self_test_off_ms: 200,
        }
    }
}

impl DriverConfig {
    /// Default timing with bounded polling
    pub fn bounded(max_polls: u32) -> Self {
        Self {
            poll: PollMode::Bounded { max_polls },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_blocking() {
        let config = DriverConfig::default();
        assert_eq!(config.poll, PollMode::Blocking);
        assert_eq!(config.poll.limit(), None);
        assert_eq!(config.i2c.frequency, 100_000);
    }

    #[test]
    fn test_bounded() {
        let config = DriverConfig::bounded(50);
        assert_eq!(config.poll.limit(), Some(50));
        assert_eq!(config.recovery_delay_ms, 2);
    }
}
