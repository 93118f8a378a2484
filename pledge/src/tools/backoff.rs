//! Exponential backoff between retry attempts.
//!
//! The delay after failed attempt `n` (1-based) is `first × factor^(n-1)`,
//! clamped to `max`.
//!
//! ```rust
//! use std::time::Duration;
//! use pledge::BackoffPolicy;
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(100),
//!     max: Duration::from_secs(10),
//!     factor: 2.0,
//! };
//!
//! assert_eq!(backoff.delay_for(1), Duration::from_millis(100));
//! assert_eq!(backoff.delay_for(2), Duration::from_millis(200));
//! assert_eq!(backoff.delay_for(20), Duration::from_secs(10));
//! ```

use std::time::Duration;

/// Retry backoff parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failed attempt.
    pub first: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
}

impl Default for BackoffPolicy {
    /// Returns a policy doubling from 100ms up to 30s.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(100),
            max: Duration::from_secs(30),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay that follows failed attempt `attempt` (1-based).
    ///
    /// Attempt `0` is treated like attempt `1`. Non-finite or negative
    /// intermediate values saturate to [`max`](Self::max).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exponent);

        if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}
