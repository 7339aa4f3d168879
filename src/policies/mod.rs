//! Polling policies.
//!
//! ## Contents
//! - [`RetryPolicy`] poll cadence (interval / factor / max + jitter) and failure budget
//! - [`Jitter`] randomization strategy to avoid synchronized polls
//!
//! ## Quick wiring
//! ```text
//! Runtime::revision_tracker(RetryPolicy)
//!      └─► revision poller uses:
//!           - policy.delay(n) to schedule the next pending-count poll
//!           - policy.exhausted(failures) to give up
//! ```
//!
//! ## Defaults
//! - `RetryPolicy::default()` → interval=1s, factor=1.0, max=30s, jitter=None, max_failures=150.

mod jitter;
mod retry;

pub use jitter::Jitter;
pub use retry::RetryPolicy;
