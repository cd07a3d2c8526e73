//! Reconnect backoff schedule.
//!
//! The delay sequence is part of the dashboard's observable behavior
//! (2s, 4s, 8s, 16s, 30s, then stop), so the schedule is deterministic:
//! no jitter.

use std::time::Duration;

/// Exponential backoff configuration for reconnect attempts.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Base delay multiplied by `2^attempt`.
    pub base_delay: Duration,
    /// Ceiling for any single delay.
    pub max_delay: Duration,
    /// Maximum number of automatic attempts (0 means none).
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            max_attempts: 5,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the given attempt (1-based): `min(base * 2^attempt, max)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_delay)
    }
}

/// Attempt counter for one reconnect sequence.
///
/// Destroyed (reset to zero) by any successful fetch; once the ceiling
/// is reached no further automatic attempt is scheduled until a
/// periodic or manual fetch restarts the sequence through its own
/// failure path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
}

impl RetryState {
    /// Number of attempts recorded so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a failure. Returns the delay before the next automatic
    /// attempt, or `None` once the ceiling is reached.
    pub fn next_delay(&mut self, policy: &BackoffPolicy) -> Option<Duration> {
        if self.attempts >= policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(policy.delay_for_attempt(self.attempts))
    }

    /// Any success resets the sequence.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_sequence_is_capped_exponential() {
        let policy = BackoffPolicy::default();
        let mut retry = RetryState::default();

        let delays: Vec<u64> = std::iter::from_fn(|| retry.next_delay(&policy))
            .map(|d| d.as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![2000, 4000, 8000, 16000, 30000]);
    }

    #[test]
    fn test_no_sixth_attempt() {
        let policy = BackoffPolicy::default();
        let mut retry = RetryState::default();

        for _ in 0..5 {
            assert!(retry.next_delay(&policy).is_some());
        }
        assert_eq!(retry.attempts(), 5);
        assert!(retry.next_delay(&policy).is_none());
        assert_eq!(retry.attempts(), 5);
    }

    #[test]
    fn test_success_resets_sequence() {
        let policy = BackoffPolicy::default();
        let mut retry = RetryState::default();

        retry.next_delay(&policy);
        retry.next_delay(&policy);
        assert_eq!(retry.attempts(), 2);

        retry.reset();
        assert_eq!(retry.attempts(), 0);
        assert_eq!(
            retry.next_delay(&policy),
            Some(Duration::from_millis(2000))
        );
    }

    #[test]
    fn test_zero_attempts_policy() {
        let policy = BackoffPolicy {
            max_attempts: 0,
            ..Default::default()
        };
        let mut retry = RetryState::default();
        assert!(retry.next_delay(&policy).is_none());
    }
}
