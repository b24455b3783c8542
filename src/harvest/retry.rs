//! Retry decisions and backoff delays
//!
//! Pure functions: the random source for jitter is always passed in, so a
//! seeded RNG makes every delay reproducible.

use crate::config::HarvestConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

/// Retry parameters for one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per page, including the first one
    pub max_attempts: u32,

    /// Exponential base of the delay, in seconds
    pub backoff_base: f64,

    /// Upper bound (exclusive) of the random jitter, in seconds
    pub jitter_max: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backoff_base: 2.0,
            jitter_max: 1.0,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            max_attempts: config.max_attempts_per_page,
            backoff_base: config.backoff_base,
            jitter_max: config.jitter_max,
        }
    }

    /// Whether a failed `attempt_index` may be followed by another attempt
    pub fn should_retry(&self, attempt_index: u32) -> bool {
        should_retry(attempt_index, self.max_attempts)
    }

    /// Delay to wait after the failed `attempt_index`
    pub fn backoff_delay<R: Rng + ?Sized>(&self, attempt_index: u32, rng: &mut R) -> Duration {
        backoff_delay(attempt_index, self.backoff_base, self.jitter_max, rng)
    }
}

/// True while `attempt_index < max_attempts`
pub fn should_retry(attempt_index: u32, max_attempts: u32) -> bool {
    attempt_index < max_attempts
}

/// `base^attempt_index + uniform(0, jitter_max)` seconds
///
/// The result always lies in `[base^attempt_index, base^attempt_index + jitter_max)`.
/// A zero, negative or non-finite `jitter_max` yields the bare exponential
/// delay.
pub fn backoff_delay<R: Rng + ?Sized>(
    attempt_index: u32,
    base: f64,
    jitter_max: f64,
    rng: &mut R,
) -> Duration {
    let exponent = attempt_index.min(i32::MAX as u32) as i32;
    let exponential = base.powi(exponent);

    let jitter = if jitter_max.is_finite() && jitter_max > 0.0 {
        rng.random_range(0.0..jitter_max)
    } else {
        0.0
    };

    Duration::try_from_secs_f64((exponential + jitter).max(0.0)).unwrap_or(Duration::MAX)
}

/// Jitter source for one page
///
/// With a seed every page gets its own reproducible stream, so concurrent
/// retries are still spread apart. Without one the stream comes from the OS.
pub fn jitter_rng(seed: Option<u64>, page_number: u32) -> StdRng {
    match seed {
        Some(seed) => {
            StdRng::seed_from_u64(seed ^ u64::from(page_number).wrapping_mul(0x9E37_79B9_7F4A_7C15))
        }
        None => StdRng::from_os_rng(),
    }
}
