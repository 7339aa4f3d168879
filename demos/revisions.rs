//! # Revision progress
//!
//! Tracks a submitted batch of reason modifications until the backend has
//! processed all of them, printing every `modificationEvent`.
//!
//! ## Run
//! ```bash
//! RUST_LOG=widgetvisor=debug cargo run --example revisions
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;
use widgetvisor::{
    signals, Config, Event, FetchError, Jitter, Progress, Request, RetryPolicy, Revision,
    Runtime, Scope, Transport,
};

/// Processes one modification per poll; the third poll fails.
struct Backlog {
    pending: AtomicU32,
    polls: AtomicU32,
}

#[async_trait]
impl Transport for Backlog {
    async fn fetch(&self, _request: Request) -> Result<Value, FetchError> {
        if self.polls.fetch_add(1, Ordering::Relaxed) == 2 {
            return Err(FetchError::Status {
                status: 503,
                message: "maintenance".into(),
            });
        }
        let left = self
            .pending
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .map(|n| n - 1)
            .unwrap_or(0);
        Ok(json!({ "Number": left }))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let rt = Runtime::builder(Config::default())
        .with_transport(Arc::new(Backlog {
            pending: AtomicU32::new(4),
            polls: AtomicU32::new(0),
        }))
        .build();

    rt.bus().add_event_listener(
        Scope::next(),
        signals::MODIFICATION,
        "reason",
        |ev: &Event| match serde_json::from_value::<Progress>(ev.target.clone()) {
            Ok(p) => println!(
                "[reason] {} {}/{} done{}",
                p.revision.id,
                p.completed(),
                p.revision.total,
                if p.failed { " (gave up)" } else { "" }
            ),
            Err(e) => println!("[reason] unreadable progress: {e}"),
        },
    );

    let tracker = rt.revision_tracker(RetryPolicy {
        interval: Duration::from_millis(300),
        jitter: Jitter::Equal,
        max_failures: 10,
        ..RetryPolicy::default()
    });
    tracker.track(
        Revision::new("rev-1", "reason", 4)
            .with_machine(1)
            .with_range("[2024-05-01T06:00:00Z,2024-05-01T14:00:00Z)"),
        Request::get("http://pulse/Revision/PendingModifications?RevisionId=rev-1"),
    );

    while !tracker.is_empty() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    rt.shutdown();
    Ok(())
}
