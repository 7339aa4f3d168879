//! # Polling policy with a failure budget.
//!
//! [`RetryPolicy`] drives the pending-count poll of the revision tracker. The
//! delay before poll `n` is `interval × factor^n`, clamped to `max_interval`,
//! then jittered. The base delay is derived from `n` only, so jitter output
//! never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use widgetvisor::{Jitter, RetryPolicy};
//!
//! let policy = RetryPolicy {
//!     interval: Duration::from_secs(1),
//!     factor: 2.0,
//!     max_interval: Duration::from_secs(5),
//!     jitter: Jitter::None,
//!     max_failures: 3,
//! };
//! assert_eq!(policy.delay(0), Duration::from_secs(1));
//! assert_eq!(policy.delay(2), Duration::from_secs(4));
//! assert_eq!(policy.delay(3), Duration::from_secs(5));
//! assert!(!policy.exhausted(3));
//! assert!(policy.exhausted(4));
//! ```

use std::time::Duration;

use crate::policies::jitter::Jitter;

/// Poll cadence and failure budget.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first poll.
    pub interval: Duration,
    /// Multiplicative growth factor (`1.0` = constant cadence).
    pub factor: f64,
    /// Cap of the computed delay.
    pub max_interval: Duration,
    /// Randomization of each delay.
    pub jitter: Jitter,
    /// Consecutive failures tolerated before giving up (`0` = unlimited).
    pub max_failures: u32,
}

impl Default for RetryPolicy {
    /// Returns a policy with:
    /// - `interval = 1s`, `factor = 1.0` (constant cadence);
    /// - `max_interval = 30s`;
    /// - `jitter = None`;
    /// - `max_failures = 150`.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            factor: 1.0,
            max_interval: Duration::from_secs(30),
            jitter: Jitter::None,
            max_failures: 150,
        }
    }
}

impl RetryPolicy {
    /// Delay before poll number `n` (0-indexed).
    pub fn delay(&self, n: u32) -> Duration {
        let max_secs = self.max_interval.as_secs_f64();
        let exp = n.min(i32::MAX as u32) as i32;
        let secs = self.interval.as_secs_f64() * self.factor.powi(exp);

        let base = if !secs.is_finite() || secs < 0.0 || secs > max_secs {
            self.max_interval
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }

    /// Failure budget as an `Option` (`None` = unlimited).
    #[inline]
    pub fn budget(&self) -> Option<u32> {
        if self.max_failures == 0 {
            None
        } else {
            Some(self.max_failures)
        }
    }

    /// `true` once `failures` consecutive failures exceed the budget.
    #[inline]
    pub fn exhausted(&self, failures: u32) -> bool {
        self.budget().is_some_and(|max| failures > max)
    }
}
