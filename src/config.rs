use crate::error::MachineError;
use std::time::Duration;

/// Run-time knobs. The three cadences are independent of one another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// time between fetch/decode/execute cycles
    pub cycle_interval: Duration,
    /// time between delay timer decrements
    pub delay_interval: Duration,
    /// time between sound timer decrements
    pub sound_interval: Duration,
    /// fixed RND seed; OS entropy when absent
    pub seed: Option<u64>,
}

pub const DEFAULT_CYCLE_HZ: u32 = 500;
pub const DEFAULT_TIMER_HZ: u32 = 60;

impl Default for Config {
    fn default() -> Self {
        Config {
            cycle_interval: hz_to_interval(DEFAULT_CYCLE_HZ),
            delay_interval: hz_to_interval(DEFAULT_TIMER_HZ),
            sound_interval: hz_to_interval(DEFAULT_TIMER_HZ),
            seed: None,
        }
    }
}

fn hz_to_interval(hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / hz as u64)
}

impl Config {
    pub fn from_hz(cycle_hz: u32, delay_hz: u32, sound_hz: u32) -> Result<Self, MachineError> {
        for (name, hz) in [("cycle", cycle_hz), ("delay", delay_hz), ("sound", sound_hz)] {
            if hz == 0 {
                return Err(MachineError::InvalidConfig(format!(
                    "{} frequency must be above zero",
                    name
                )));
            }
        }
        Ok(Config {
            cycle_interval: hz_to_interval(cycle_hz),
            delay_interval: hz_to_interval(delay_hz),
            sound_interval: hz_to_interval(sound_hz),
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), MachineError> {
        for (name, interval) in [
            ("cycle", self.cycle_interval),
            ("delay", self.delay_interval),
            ("sound", self.sound_interval),
        ] {
            if interval.is_zero() {
                return Err(MachineError::InvalidConfig(format!(
                    "{} interval must be above zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cadence() {
        let c = Config::default();
        assert_eq!(c.cycle_interval, Duration::from_millis(2));
        assert_eq!(c.delay_interval, Duration::from_nanos(16_666_666));
        assert_eq!(c.delay_interval, c.sound_interval);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_hz() -> Result<(), MachineError> {
        let c = Config::from_hz(1000, 60, 30)?;
        assert_eq!(c.cycle_interval, Duration::from_millis(1));
        assert_eq!(c.sound_interval, Duration::from_nanos(33_333_333));
        Ok(())
    }

    #[test]
    fn test_zero_rejected() {
        assert!(Config::from_hz(0, 60, 60).is_err());
        let c = Config {
            delay_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(c.validate(), Err(MachineError::InvalidConfig(_))));
    }
}
