//! # Revision tracker.
//!
//! Follows submitted modifications until the backend has processed them. Each
//! tracked revision gets one poller task that asks the transport for the number
//! of modifications still pending and publishes every change as
//! `modificationEvent`.
//!
//! ## Flow
//! ```text
//! track(revision, request)
//!   ├─► publish Progress{remaining = total}
//!   └─► spawn poller
//!         loop {
//!           ├─► sleep(policy.delay(n))            (cancellable)
//!           ├─► fetch_once(request)               (cancellable)
//!           │     ├─ Ok(count) ─► publish Progress{remaining = count}
//!           │     │               └─ count == 0 ─► remove, exit
//!           │     └─ Err       ─► failures += 1
//!           │                     └─ policy.exhausted ─► publish {failed}, remove, exit
//!         }
//! ```
//!
//! ## Rules
//! - Progress is published to the revision kind's context **and** to global
//!   listeners of `modificationEvent`.
//! - Tracking an id again replaces the previous entry and stops its poller.
//! - A cancelled poller never publishes again.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::select;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::runner::fetch_once;
use crate::error::{FetchError, RevisionError};
use crate::events::{signals, EventBus};
use crate::policies::RetryPolicy;
use crate::revision::{Progress, Revision};
use crate::transport::{Request, Transport};

struct Entry {
    progress: Progress,
    cancel: CancellationToken,
}

/// Tracks submitted modifications and publishes their progress.
#[derive(Clone)]
pub struct RevisionTracker {
    bus: EventBus,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    timeout: Option<Duration>,
    pending_field: Arc<str>,
    entries: Arc<Mutex<IndexMap<String, Entry>>>,
    cancel: CancellationToken,
}

impl RevisionTracker {
    /// Field of the pending-count reply read by default.
    pub const DEFAULT_PENDING_FIELD: &'static str = "Number";

    /// Creates a tracker publishing on `bus`.
    pub fn new(bus: EventBus, transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            bus,
            transport,
            policy,
            timeout: None,
            pending_field: Arc::from(Self::DEFAULT_PENDING_FIELD),
            entries: Arc::new(Mutex::new(IndexMap::new())),
            cancel: CancellationToken::new(),
        }
    }

    /// Per-poll request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Field of the reply that carries the pending count.
    pub fn with_pending_field(mut self, field: &str) -> Self {
        self.pending_field = Arc::from(field);
        self
    }

    /// Stops every poller when `parent` is cancelled.
    pub(crate) fn with_parent(mut self, parent: &CancellationToken) -> Self {
        self.cancel = parent.child_token();
        self
    }

    /// Starts tracking `revision`; `request` asks for its pending count.
    pub fn track(&self, revision: Revision, request: Request) {
        let id = revision.id.clone();
        let progress = Progress::start(revision);
        let cancel = self.cancel.child_token();
        {
            let mut entries = self.entries.lock();
            let entry = Entry {
                progress: progress.clone(),
                cancel: cancel.clone(),
            };
            if let Some(previous) = entries.insert(id.clone(), entry) {
                previous.cancel.cancel();
                debug!(revision = %id, "revision tracked again, previous poller stopped");
            }
        }
        info!(revision = %id, kind = %progress.revision.kind, total = progress.revision.total, "tracking revision");
        self.publish(&progress);

        let tracker = self.clone();
        tokio::spawn(async move { tracker.poll(id, request, cancel).await });
    }

    /// Current progress of a tracked revision.
    pub fn get(&self, id: &str) -> Option<Progress> {
        self.entries.lock().get(id).map(|e| e.progress.clone())
    }

    /// Progress of every tracked revision, in tracking order.
    pub fn snapshot(&self) -> Vec<Progress> {
        self.entries
            .lock()
            .values()
            .map(|e| e.progress.clone())
            .collect()
    }

    /// Stops tracking `id`; returns its last progress.
    ///
    /// # Errors
    /// [`RevisionError::Unknown`] if `id` is not tracked.
    pub fn cancel(&self, id: &str) -> Result<Progress, RevisionError> {
        let entry = self
            .entries
            .lock()
            .shift_remove(id)
            .ok_or_else(|| RevisionError::Unknown { id: id.to_string() })?;
        entry.cancel.cancel();
        Ok(entry.progress)
    }

    /// Number of tracked revisions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// `true` when no revision is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Stops every poller.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.entries.lock().clear();
    }

    async fn poll(self, id: String, request: Request, cancel: CancellationToken) {
        let mut failures: u32 = 0;
        let mut n: u32 = 0;
        loop {
            select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = time::sleep(self.policy.delay(n)) => {}
            }
            n = n.saturating_add(1);

            let outcome = select! {
                biased;
                _ = cancel.cancelled() => return,
                res = fetch_once(self.transport.as_ref(), request.clone(), self.timeout) => res,
            };
            let failure = match outcome.and_then(|data| self.pending_count(&data)) {
                Ok(remaining) => {
                    failures = 0;
                    match self.advance(&id, &cancel, remaining) {
                        Some(progress) if progress.is_final() => {
                            info!(revision = %id, "revision processed");
                            return;
                        }
                        Some(_) => continue,
                        None => return,
                    }
                }
                Err(failure) => failure,
            };

            failures = failures.saturating_add(1);
            warn!(
                revision = %id,
                failures,
                error = failure.as_label(),
                "pending count poll failed: {}",
                failure.as_message()
            );
            if self.policy.exhausted(failures) {
                let err = RevisionError::Exhausted { failures };
                warn!(revision = %id, error = err.as_label(), "{err}");
                self.give_up(&id, &cancel);
                return;
            }
        }
    }

    fn pending_count(&self, data: &Value) -> Result<u32, FetchError> {
        data.get(&*self.pending_field)
            .unwrap_or(data)
            .as_u64()
            .map(|n| n.min(u32::MAX as u64) as u32)
            .ok_or_else(|| FetchError::Decode {
                message: format!("no pending count in {data}"),
            })
    }

    /// Records `remaining` and publishes it; `None` if the entry was replaced,
    /// cancelled or removed meanwhile.
    fn advance(&self, id: &str, cancel: &CancellationToken, remaining: u32) -> Option<Progress> {
        let progress = {
            let mut entries = self.entries.lock();
            if cancel.is_cancelled() {
                return None;
            }
            let entry = entries.get_mut(id)?;
            if entry.progress.remaining == remaining {
                return Some(entry.progress.clone());
            }
            entry.progress.update(remaining);
            let progress = entry.progress.clone();
            if progress.is_final() {
                entries.shift_remove(id);
            }
            progress
        };
        self.publish(&progress);
        Some(progress)
    }

    fn give_up(&self, id: &str, cancel: &CancellationToken) {
        let progress = {
            let mut entries = self.entries.lock();
            if cancel.is_cancelled() {
                return;
            }
            match entries.shift_remove(id) {
                Some(mut entry) => {
                    entry.progress.failed = true;
                    entry.progress
                }
                None => return,
            }
        };
        self.publish(&progress);
    }

    fn publish(&self, progress: &Progress) {
        let payload = match serde_json::to_value(progress) {
            Ok(v) => v,
            Err(e) => {
                warn!(revision = %progress.revision.id, "cannot encode progress: {e}");
                return;
            }
        };
        let kind = &progress.revision.kind;
        let reached = self
            .bus
            .dispatch_to_context(signals::MODIFICATION, kind, payload.clone())
            + self
                .bus
                .dispatch_to_global_only(signals::MODIFICATION, payload);
        debug!(
            revision = %progress.revision.id,
            remaining = progress.remaining,
            failed = progress.failed,
            reached,
            "progress published"
        );
    }
}

impl std::fmt::Debug for RevisionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevisionTracker")
            .field("policy", &self.policy)
            .field("tracked", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::events::Scope;

    /// Replays scripted pending counts, then fails forever.
    #[derive(Default)]
    struct Backlog {
        replies: Mutex<VecDeque<Result<Value, FetchError>>>,
    }

    impl Backlog {
        fn with(replies: Vec<Result<Value, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl Transport for Backlog {
        async fn fetch(&self, _request: Request) -> Result<Value, FetchError> {
            self.replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(FetchError::Connect {
                        message: "down".into(),
                    })
                })
        }
    }

    fn collect(bus: &EventBus, context: Option<&str>) -> Arc<Mutex<Vec<Progress>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback = move |ev: &crate::events::Event| {
            if let Ok(p) = serde_json::from_value::<Progress>(ev.target.clone()) {
                sink.lock().push(p);
            }
        };
        match context {
            Some(c) => bus.add_event_listener(Scope::next(), signals::MODIFICATION, c, callback),
            None => bus.add_global_event_listener(Scope::next(), signals::MODIFICATION, callback),
        }
        seen
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_forgets_the_revision() {
        let bus = EventBus::new();
        let scoped = collect(&bus, Some("reason"));
        let global = collect(&bus, None);
        let other = collect(&bus, Some("cycle"));

        let transport = Backlog::with(vec![
            Ok(json!({"Number": 2})),
            Ok(json!({"Number": 2})),
            Ok(json!({"Number": 1})),
            Ok(json!({"Number": 0})),
        ]);
        let tracker = RevisionTracker::new(bus, transport, RetryPolicy::default());
        tracker.track(
            Revision::new("r1", "reason", 3).with_machine(5),
            Request::get("http://pulse/Revision/PendingModifications?Id=r1"),
        );
        assert_eq!(tracker.get("r1").map(|p| p.remaining), Some(3));

        time::sleep(Duration::from_millis(4500)).await;
        let remaining: Vec<u32> = scoped.lock().iter().map(|p| p.remaining).collect();
        assert_eq!(remaining, vec![3, 2, 1, 0]);
        assert_eq!(global.lock().len(), 4);
        assert!(other.lock().is_empty());
        assert!(tracker.is_empty());
        assert_eq!(scoped.lock()[3].revision.machine_id, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_once_the_budget_is_exhausted() {
        let bus = EventBus::new();
        let global = collect(&bus, None);
        let policy = RetryPolicy {
            max_failures: 3,
            ..RetryPolicy::default()
        };
        let tracker = RevisionTracker::new(bus, Backlog::with(Vec::new()), policy);
        tracker.track(Revision::new("r2", "reason", 1), Request::get("u"));

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(tracker.len(), 1);

        time::sleep(Duration::from_secs(1)).await;
        assert!(tracker.is_empty());
        let seen = global.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen[1].failed);
        assert_eq!(seen[1].remaining, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn replies_without_a_count_are_failures() {
        let bus = EventBus::new();
        let transport = Backlog::with(vec![Ok(json!({"Other": 1})), Ok(json!(0))]);
        let tracker = RevisionTracker::new(bus, transport, RetryPolicy::default());
        tracker.track(Revision::new("r3", "reason", 2), Request::get("u"));

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(tracker.get("r3").map(|p| p.remaining), Some(2));

        time::sleep(Duration::from_secs(1)).await;
        assert!(tracker.get("r3").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_revisions_stop_publishing() {
        let bus = EventBus::new();
        let global = collect(&bus, None);
        let transport = Backlog::with(vec![Ok(json!({"Number": 1}))]);
        let tracker = RevisionTracker::new(bus, transport, RetryPolicy::default());
        tracker.track(Revision::new("r4", "reason", 2), Request::get("u"));

        let last = tracker.cancel("r4").unwrap();
        assert_eq!(last.remaining, 2);
        assert_eq!(
            tracker.cancel("r4").unwrap_err(),
            RevisionError::Unknown { id: "r4".into() }
        );

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(global.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_keeps_tracking_order() {
        let bus = EventBus::new();
        let tracker = RevisionTracker::new(bus, Backlog::with(Vec::new()), RetryPolicy::default());
        tracker.track(Revision::new("b", "reason", 1), Request::get("u"));
        tracker.track(Revision::new("a", "reason", 1), Request::get("u"));
        let ids: Vec<String> = tracker.snapshot().into_iter().map(|p| p.revision.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        tracker.shutdown();
        assert!(tracker.is_empty());
    }
}
