//! Delay schedule between confirmation poll attempts.

use std::time::Duration;

/// Default cap on a single delay.
const DEFAULT_MAX_DELAY_SECS: u64 = 60;

/// How the delay between poll attempts evolves.
///
/// The default keeps the caller's interval constant. With exponential
/// backoff the delay after attempt `n` is `interval * factor^(n-1)`, capped
/// at `max_delay` but never shorter than `interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backoff {
    /// Whether to grow the delay after each pending attempt.
    pub exponential_backoff: bool,
    /// Growth factor for exponential backoff.
    pub factor: u32,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
}

impl Backoff {
    /// Constant delay equal to the poll interval.
    pub fn fixed() -> Self {
        Self {
            exponential_backoff: false,
            factor: 1,
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
        }
    }

    /// Exponential backoff with the given growth factor.
    pub fn exponential(factor: u32) -> Self {
        Self {
            exponential_backoff: true,
            factor: factor.max(1),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
        }
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Calculates the delay after the given (1-based) attempt.
    pub fn delay_for_attempt(&self, interval: Duration, attempt: u32) -> Duration {
        if !self.exponential_backoff {
            return interval;
        }

        let growth = self.factor.saturating_pow(attempt.saturating_sub(1));
        interval
            .saturating_mul(growth)
            .min(self.max_delay)
            .max(interval)
    }

    /// Longest delay this schedule can produce for the interval.
    pub fn max_delay_for(&self, interval: Duration) -> Duration {
        if self.exponential_backoff {
            self.max_delay.max(interval)
        } else {
            interval
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_delay() {
        let backoff = Backoff::default();
        let interval = Duration::from_millis(1500);

        assert_eq!(backoff.delay_for_attempt(interval, 1), interval);
        assert_eq!(backoff.delay_for_attempt(interval, 50), interval);
        assert_eq!(backoff.max_delay_for(interval), interval);
    }

    #[test]
    fn test_exponential_backoff() {
        let backoff = Backoff::exponential(2);
        let interval = Duration::from_secs(1);

        assert_eq!(backoff.delay_for_attempt(interval, 1), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(interval, 2), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(interval, 3), Duration::from_secs(4));
        assert_eq!(backoff.delay_for_attempt(interval, 4), Duration::from_secs(8));
    }

    #[test]
    fn test_max_delay_cap() {
        let backoff = Backoff::exponential(10).with_max_delay(Duration::from_secs(30));
        let interval = Duration::from_secs(1);

        assert_eq!(backoff.delay_for_attempt(interval, 5), Duration::from_secs(30));
        // Overflowing exponents still saturate at the cap
        assert_eq!(backoff.delay_for_attempt(interval, 200), Duration::from_secs(30));
    }

    #[test]
    fn test_cap_below_interval_keeps_interval() {
        let backoff = Backoff::exponential(2).with_max_delay(Duration::from_millis(10));
        let interval = Duration::from_secs(1);

        assert_eq!(backoff.delay_for_attempt(interval, 3), interval);
        assert_eq!(backoff.max_delay_for(interval), interval);
    }
}
