//! Fault injection for the simulated network
//!
//! Decides, per call, how long delivery takes and whether the request or
//! the reply is lost.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for injected faults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultConfig {
    /// When false, calls are delayed and may lose their request or reply
    pub reliable: bool,
    /// Calls to dead ends take up to `max_long_delay_ms` to fail
    pub long_delays: bool,
    /// Some replies are held back up to `max_reorder_delay_ms`
    pub long_reordering: bool,
    /// Chance an unreliable call loses its request
    pub drop_request_rate: f64,
    /// Chance an unreliable call loses its reply
    pub drop_reply_rate: f64,
    /// Upper bound on the delay added to unreliable calls
    pub max_short_delay_ms: u64,
    /// Upper bound on the time a call to a dead end takes to fail
    pub max_failure_delay_ms: u64,
    /// Failure delay used when `long_delays` is set
    pub max_long_delay_ms: u64,
    /// Reorder delay used when `long_reordering` is set
    pub max_reorder_delay_ms: u64,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            reliable: true,
            long_delays: false,
            long_reordering: false,
            drop_request_rate: 0.1,
            drop_reply_rate: 0.1,
            max_short_delay_ms: 27,
            max_failure_delay_ms: 100,
            max_long_delay_ms: 7000,
            max_reorder_delay_ms: 2000,
        }
    }
}

impl FaultConfig {
    /// Fault-free delivery with instant failures, for tests
    pub fn reliable() -> Self {
        Self {
            max_failure_delay_ms: 0,
            ..Default::default()
        }
    }

    /// Lossy delivery with the default drop rates
    pub fn unreliable() -> Self {
        Self {
            reliable: false,
            ..Default::default()
        }
    }

    /// Delay added to an unreliable call before delivery
    pub fn short_delay(&self) -> Option<Duration> {
        if self.reliable {
            return None;
        }
        Some(random_delay(self.max_short_delay_ms))
    }

    /// Time a call to a dead end or missing server takes to fail
    pub fn failure_delay(&self) -> Duration {
        if self.long_delays {
            random_delay(self.max_long_delay_ms)
        } else {
            random_delay(self.max_failure_delay_ms)
        }
    }

    /// Extra delay holding back a reply, if reordering kicks in
    pub fn reorder_delay(&self) -> Option<Duration> {
        if !self.long_reordering || !roll(2.0 / 3.0) {
            return None;
        }
        Some(random_delay(self.max_reorder_delay_ms))
    }

    pub fn drop_request(&self) -> bool {
        !self.reliable && roll(self.drop_request_rate)
    }

    pub fn drop_reply(&self) -> bool {
        !self.reliable && roll(self.drop_reply_rate)
    }
}

fn roll(probability: f64) -> bool {
    rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
}

fn random_delay(max_ms: u64) -> Duration {
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reliable_never_drops() {
        let config = FaultConfig {
            drop_request_rate: 1.0,
            drop_reply_rate: 1.0,
            ..FaultConfig::reliable()
        };
        assert!(!config.drop_request());
        assert!(!config.drop_reply());
        assert!(config.short_delay().is_none());
        assert_eq!(config.failure_delay(), Duration::ZERO);
    }

    #[test]
    fn test_unreliable_drop_rates() {
        let always = FaultConfig {
            drop_request_rate: 1.0,
            drop_reply_rate: 1.0,
            ..FaultConfig::unreliable()
        };
        assert!(always.drop_request());
        assert!(always.drop_reply());

        let never = FaultConfig {
            drop_request_rate: 0.0,
            drop_reply_rate: 0.0,
            ..FaultConfig::unreliable()
        };
        assert!(!never.drop_request());
        assert!(!never.drop_reply());
    }

    #[test]
    fn test_delays_are_bounded() {
        let config = FaultConfig {
            max_short_delay_ms: 5,
            long_delays: true,
            max_long_delay_ms: 10,
            ..FaultConfig::unreliable()
        };
        for _ in 0..100 {
            assert!(config.short_delay().unwrap() <= Duration::from_millis(5));
            assert!(config.failure_delay() <= Duration::from_millis(10));
        }
        assert!(config.reorder_delay().is_none());
    }

    #[test]
    fn test_reordering_holds_back_some_replies() {
        let config = FaultConfig {
            long_reordering: true,
            max_reorder_delay_ms: 10,
            ..FaultConfig::reliable()
        };
        let delays: Vec<Option<Duration>> = (0..200).map(|_| config.reorder_delay()).collect();

        assert!(delays.iter().any(|d| d.is_some()));
        assert!(delays.iter().flatten().all(|d| *d <= Duration::from_millis(10)));
    }
}
