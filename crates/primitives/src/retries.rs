use std::time::Duration;

use alloy::transports::layers::RetryBackoffLayer;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

/// The maximum number of retries for rate-limited RPC requests.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 10;

/// The initial backoff for rate-limited RPC requests, in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 500;

/// The compute units per second budget assumed for RPC providers.
pub const COMPUTE_UNITS_PER_SECOND: u64 = 100;

/// The maximum delay between two startup attempts.
const MAX_STARTUP_DELAY: Duration = Duration::from_secs(10);

/// Returns the default retry layer for JSON-RPC clients.
pub fn default_retry_layer() -> RetryBackoffLayer {
    RetryBackoffLayer::new(MAX_RATE_LIMIT_RETRIES, INITIAL_BACKOFF_MS, COMPUTE_UNITS_PER_SECOND)
}

/// Returns the retry strategy used for operations that must succeed before the service can
/// start, such as fetching the initial L1 head.
///
/// The strategy is an exponential backoff starting at 100ms, capped at 10s, with jitter and
/// at most `attempts` retries.
pub fn startup_backoff(attempts: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(10)
        .factor(10)
        .max_delay(MAX_STARTUP_DELAY)
        .map(jitter)
        .take(attempts)
}
