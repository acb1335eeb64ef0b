//! Batch execution options.

use std::time::Duration;

/// Options governing one batch run.
///
/// Immutable for the duration of one `run` call.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of items with unsettled work at any moment (min 1).
    pub concurrency: usize,
    /// Retries allowed per item after its first attempt (0 = no retries).
    pub retry_limit: u32,
    /// Base delay before a retry.
    pub retry_delay: Duration,
    /// Double the delay on each successive retry of the same item.
    pub exponential_backoff: bool,
    /// Keep launching new items after one fails permanently.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            retry_limit: 2,
            retry_delay: Duration::from_millis(500),
            exponential_backoff: true,
            continue_on_error: true,
        }
    }
}

impl BatchOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrency cap.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-item retry budget.
    pub fn with_retry_limit(mut self, retry_limit: u32) -> Self {
        self.retry_limit = retry_limit;
        self
    }

    /// Set the base retry delay.
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Enable or disable exponential backoff between retries.
    pub fn with_exponential_backoff(mut self, exponential_backoff: bool) -> Self {
        self.exponential_backoff = exponential_backoff;
        self
    }

    /// Set whether a permanent item failure halts further launches.
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Concurrency cap clamped to at least one.
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    /// Delay before retry `attempt` (0-based) of one item.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if self.exponential_backoff {
            self.retry_delay
                .saturating_mul(2u32.saturating_pow(attempt))
        } else {
            self.retry_delay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BatchOptions::default();
        assert_eq!(options.concurrency, 3);
        assert_eq!(options.retry_limit, 2);
        assert_eq!(options.retry_delay, Duration::from_millis(500));
        assert!(options.exponential_backoff);
        assert!(options.continue_on_error);
    }

    #[test]
    fn test_builder_pattern() {
        let options = BatchOptions::new()
            .with_concurrency(8)
            .with_retry_limit(1)
            .with_retry_delay(Duration::from_millis(200))
            .with_exponential_backoff(false)
            .with_continue_on_error(false);

        assert_eq!(options.concurrency, 8);
        assert_eq!(options.retry_limit, 1);
        assert_eq!(options.retry_delay, Duration::from_millis(200));
        assert!(!options.exponential_backoff);
        assert!(!options.continue_on_error);
    }

    #[test]
    fn test_effective_concurrency_clamps_to_one() {
        assert_eq!(BatchOptions::new().with_concurrency(0).effective_concurrency(), 1);
        assert_eq!(BatchOptions::new().with_concurrency(5).effective_concurrency(), 5);
    }

    #[test]
    fn test_constant_delay() {
        let options = BatchOptions::new()
            .with_retry_delay(Duration::from_millis(250))
            .with_exponential_backoff(false);
        assert_eq!(options.delay_for_attempt(0), Duration::from_millis(250));
        assert_eq!(options.delay_for_attempt(3), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_delay_doubles_per_attempt() {
        let options = BatchOptions::new()
            .with_retry_delay(Duration::from_millis(200))
            .with_exponential_backoff(true);
        assert_eq!(options.delay_for_attempt(0), Duration::from_millis(200));
        assert_eq!(options.delay_for_attempt(1), Duration::from_millis(400));
        assert_eq!(options.delay_for_attempt(2), Duration::from_millis(800));
    }

    #[test]
    fn test_exponential_delay_saturates() {
        let options = BatchOptions::new()
            .with_retry_delay(Duration::from_secs(1))
            .with_exponential_backoff(true);
        // Must not panic for absurd attempt counts.
        let _ = options.delay_for_attempt(200);
    }
}
