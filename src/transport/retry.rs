//! Status-based retry decisions for the transport client.

use std::time::Duration;

/// Header consulted for the 429 retry delay, in whole seconds.
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// Delay applied to a 429 without a parseable reset header.
const RATE_LIMIT_FALLBACK: Duration = Duration::from_millis(1000);

/// Compute the delay before retrying a response, or `None` when the status
/// is not retryable.
///
/// A 429 waits out the advertised reset window plus one second; 502, 503,
/// and 504 back off exponentially from `base_backoff` (`attempt` is 0-based
/// per request); every other status is final.
pub(crate) fn retry_delay(
    status: u16,
    reset_header: Option<&str>,
    attempt: u32,
    base_backoff: Duration,
) -> Option<Duration> {
    match status {
        429 => {
            let delay = match reset_header.and_then(|value| value.trim().parse::<u64>().ok()) {
                Some(reset_secs) => {
                    Duration::from_millis(reset_secs.saturating_add(1).saturating_mul(1000))
                }
                None => RATE_LIMIT_FALLBACK,
            };
            Some(delay)
        }
        502 | 503 | 504 => Some(base_backoff.saturating_mul(2u32.saturating_pow(attempt))),
        _ => None,
    }
}
