//! Progress of submitted modifications.
//!
//! ## Contents
//! - [`Revision`] a submitted modification (id, kind, machine, ranges, total)
//! - [`Progress`] `modificationEvent` payload (revision + remaining + failed)
//! - [`RevisionTracker`] polls pending counts and publishes progress
//!
//! ## Quick wiring
//! ```text
//! widget saves a modification ──► tracker.track(revision, pending-count request)
//!      └─► poller ──► modificationEvent ──► context = revision.kind
//!                                       └─► global listeners
//! ```

mod progress;
mod tracker;

pub use progress::{Progress, Revision};
pub use tracker::RevisionTracker;
