use crate::types::constants::{
    INITIAL_RECONNECT_DELAY, MAX_RECONNECT_ATTEMPTS, MAX_RECONNECT_DELAY,
};
use std::time::Duration;

/// Tuning for [`ReconnectPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(INITIAL_RECONNECT_DELAY),
            max_delay: Duration::from_millis(MAX_RECONNECT_DELAY),
            max_attempts: MAX_RECONNECT_ATTEMPTS,
        }
    }
}

/// Exponential backoff with a bounded attempt budget.
///
/// Each scheduled attempt uses the current delay, then the delay doubles up to
/// `max_delay`. Once `max_attempts` delays have been handed out the policy is
/// exhausted until [`reset`](Self::reset) is called after a successful
/// authentication.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    config: BackoffConfig,
    attempts: u32,
    current: Duration,
}

impl ReconnectPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            attempts: 0,
            current: config.initial_delay,
        }
    }

    /// Get the next delay, or `None` when the attempt budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        let delay = self.current;
        self.current = (self.current * 2).min(self.config.max_delay);
        self.attempts += 1;
        Some(delay)
    }

    /// Reset after a successful authenticated connection
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current = self.config.initial_delay;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn current_delay(&self) -> Duration {
        self.current
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|v| Duration::from_millis(*v)).collect()
    }

    #[test]
    fn test_default_schedule_then_exhausted() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<Duration> = std::iter::from_fn(|| policy.next_delay()).collect();

        assert_eq!(delays, ms(&[1000, 2000, 4000, 8000, 16000]));
        assert!(policy.is_exhausted());
        assert_eq!(policy.next_delay(), None);
    }

    #[test]
    fn test_delay_is_capped() {
        let mut policy = ReconnectPolicy::new(BackoffConfig {
            max_attempts: 8,
            ..Default::default()
        });
        let delays: Vec<Duration> = std::iter::from_fn(|| policy.next_delay()).collect();

        assert_eq!(
            delays,
            ms(&[1000, 2000, 4000, 8000, 16000, 30000, 30000, 30000])
        );
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut policy = ReconnectPolicy::default();
        policy.next_delay();
        policy.next_delay();
        policy.next_delay();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.current_delay(), Duration::from_millis(8000));

        policy.reset();
        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(1000)));
    }
}
