use std::time::Duration;

use super::constants::{MAX_RECONNECT_ATTEMPTS, RECONNECT_DELAY_BASE};

/// Exponential backoff with a bounded number of consecutive attempts.
///
/// The attempt counter only goes back to zero through [`reset`](Self::reset),
/// which the session calls when a transport opens.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl ReconnectPolicy {
    #[must_use]
    pub const fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            attempts: 0,
        }
    }

    /// Registers one more attempt and returns its delay, or `None` once the
    /// ceiling is reached.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(calculate_backoff_delay(self.base_delay, self.attempts))
    }

    pub const fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(RECONNECT_DELAY_BASE, MAX_RECONNECT_ATTEMPTS)
    }
}

/// `base * 2^(attempt - 1)`, saturating.
#[must_use]
pub fn calculate_backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1_u32 << exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_delay_sequence() {
        let mut policy = ReconnectPolicy::default();
        let delays: Vec<u128> = std::iter::from_fn(|| policy.next_delay())
            .map(|d| d.as_millis())
            .collect();

        assert_eq!(delays, vec![1000, 2000, 4000, 8000, 16000]);
        assert!(policy.is_exhausted());
        assert_eq!(policy.next_delay(), None);
        assert_eq!(policy.attempts(), 5);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut policy = ReconnectPolicy::default();
        policy.next_delay();
        policy.next_delay();

        policy.reset();

        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn test_zero_ceiling_never_retries() {
        let mut policy = ReconnectPolicy::new(Duration::from_millis(10), 0);
        assert_eq!(policy.next_delay(), None);
    }

    #[test_case(1, 250 ; "first")]
    #[test_case(2, 500 ; "second")]
    #[test_case(4, 2000 ; "fourth")]
    fn test_backoff_delay(attempt: u32, expected_ms: u64) {
        assert_eq!(
            calculate_backoff_delay(Duration::from_millis(250), attempt),
            Duration::from_millis(expected_ms)
        );
    }

    #[test]
    fn test_backoff_saturates() {
        let delay = calculate_backoff_delay(Duration::from_secs(u64::MAX / 2), 64);
        assert_eq!(delay, Duration::MAX);
    }
}
