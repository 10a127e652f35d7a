//! Reconnect backoff.
//!
//! The delay used for the Nth reconnect attempt is the initial delay for
//! the first two attempts, then doubles each attempt after that, capped at
//! `max_delay`. Expressed as a 0-based closed form: `attempt` 0 and 1 both
//! yield `initial_delay`; `attempt >= 2` yields
//! `min(initial_delay * 2^(attempt - 1), max_delay)`.

use crate::config::ReconnectConfig;
use std::time::Duration;

/// Delay before the reconnect attempt identified by `attempt` (0-based).
pub fn delay_for_attempt(config: &ReconnectConfig, attempt: u64) -> Duration {
    if attempt == 0 {
        return config.initial_delay;
    }
    let exponent = (attempt - 1) as i32;
    let factor = 2f64.powi(exponent);
    let secs = (config.initial_delay.as_secs_f64() * factor).min(config.max_delay.as_secs_f64());
    Duration::from_secs_f64(secs)
}

/// Whether the reconnect loop should give up after `attempts` failed tries.
pub fn exhausted(config: &ReconnectConfig, attempts: u64) -> bool {
    config.max_attempts > 0 && attempts > config.max_attempts
}

/// Stateful counterpart used by the live reconnect loop: each call to
/// [`BackoffState::next`] returns the delay to wait before the next dial and
/// advances internal state, so the loop doesn't need to track an attempt
/// counter itself.
pub struct BackoffState {
    current: Duration,
    calls: u64,
    initial: Duration,
}

impl BackoffState {
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            current: config.initial_delay,
            calls: 0,
            initial: config.initial_delay,
        }
    }

    /// Return the delay for the next attempt and advance.
    pub fn next(&mut self, config: &ReconnectConfig) -> Duration {
        let delay = self.current;
        self.calls += 1;
        if self.calls >= 2 {
            self.current = self.current.mul_f64(2.0).min(config.max_delay);
        }
        delay
    }

    /// Reset to the initial delay, e.g. after a successful reconnect.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.calls = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_with_initial_1s_max_60s() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: 0,
        };
        let got: Vec<u64> = (0..11)
            .map(|attempt| delay_for_attempt(&config, attempt).as_secs())
            .collect();
        assert_eq!(got, vec![1, 1, 2, 4, 8, 16, 32, 60, 60, 60, 60]);
    }

    #[test]
    fn sequence_with_initial_1s_max_5s() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            max_attempts: 0,
        };
        let got: Vec<u64> = (0..8)
            .map(|attempt| delay_for_attempt(&config, attempt).as_secs())
            .collect();
        assert_eq!(got, vec![1, 1, 2, 4, 5, 5, 5, 5]);
    }

    #[test]
    fn stateful_backoff_matches_the_closed_form() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: 0,
        };
        let mut state = BackoffState::new(&config);
        let got: Vec<u64> = (0..11).map(|_| state.next(&config).as_secs()).collect();
        assert_eq!(got, vec![1, 1, 2, 4, 8, 16, 32, 60, 60, 60, 60]);
    }

    #[test]
    fn reset_returns_to_the_initial_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            max_attempts: 0,
        };
        let mut state = BackoffState::new(&config);
        state.next(&config);
        state.next(&config);
        state.next(&config);
        state.reset();
        assert_eq!(state.next(&config), Duration::from_secs(1));
    }

    #[test]
    fn zero_max_attempts_means_unbounded() {
        let config = ReconnectConfig {
            max_attempts: 0,
            ..ReconnectConfig::default()
        };
        assert!(!exhausted(&config, 10_000));
    }

    #[test]
    fn nonzero_max_attempts_stops_once_exceeded() {
        let config = ReconnectConfig {
            max_attempts: 3,
            ..ReconnectConfig::default()
        };
        assert!(!exhausted(&config, 3));
        assert!(exhausted(&config, 4));
    }
}
