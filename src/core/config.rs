//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized defaults for every component mounted by a
//! [`Runtime`](crate::Runtime).
//!
//! Config is used in two ways:
//! 1. **Runtime creation**: `Runtime::builder(config)`
//! 2. **Widget fallbacks**: a widget returning `None` from `timeout()`, `delay_rate()`
//!    or `transient_error_delay()` inherits the value configured here
//!
//! ## Sentinel values
//! - `timeout = 0s` → no request timeout
//! - `delay_rate = 0s` → delayed errors are displayed on the next tick

use std::time::Duration;

/// Global configuration for the component runtime.
///
/// ## Field semantics
/// - `timeout`: Default per-request timeout (`0s` = none)
/// - `delay_rate`: Delay before a `set_error` message is displayed
/// - `transient_error_delay`: How long transport failures stay invisible
/// - `retry_rate`: Retry cadence after a failure for widgets without a refresh rate
/// - `error_field`: Field of a success payload that carries an application error
/// - `cache_buster`: Query parameter name appended by `Ctx::bust_cache`
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid sprinkling
/// sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Default request timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = applied to every fetch cycle
    pub timeout: Duration,

    /// Delay before a delayed validation error is shown.
    ///
    /// Avoids flicker when a prerequisite (date range, machine id) arrives
    /// shortly after the widget is mounted.
    pub delay_rate: Duration,

    /// Grace window for transport failures.
    ///
    /// Before it elapses the widget keeps its last content and retries on
    /// schedule; afterwards it enters the `Error` display.
    pub transient_error_delay: Duration,

    /// Retry cadence after a transport failure when the widget has no refresh rate.
    pub retry_rate: Duration,

    /// Field of a success payload that carries an application-level error.
    pub error_field: String,

    /// Query parameter name used to skip caches on reload.
    pub cache_buster: String,
}

impl Config {
    /// Returns the default request timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per request
    #[inline]
    pub fn default_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Retry cadence clamped to at least one millisecond.
    #[inline]
    pub fn retry_rate_clamped(&self) -> Duration {
        self.retry_rate.max(Duration::from_millis(1))
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `timeout = 20s`
    /// - `delay_rate = 2s`
    /// - `transient_error_delay = 3min`
    /// - `retry_rate = 10s`
    /// - `error_field = "ErrorMessage"`
    /// - `cache_buster = "_"`
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            delay_rate: Duration::from_secs(2),
            transient_error_delay: Duration::from_secs(180),
            retry_rate: Duration::from_secs(10),
            error_field: "ErrorMessage".to_string(),
            cache_buster: "_".to_string(),
        }
    }
}
