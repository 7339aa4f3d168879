//! # Run a single fetch cycle.
//!
//! Executes one request through the [`Transport`] with an optional timeout and
//! reports the outcome to the owning component, tagged with the request token.
//!
//! ## Flow
//! ```text
//! Success:  transport.fetch() → Ok(payload)        → Command::Response{token, Ok}
//! Failure:  transport.fetch() → Err(FetchError)    → Command::Response{token, Err}
//! Timeout:  timeout exceeded  → Err(Timeout)       → Command::Response{token, Err}
//! ```
//!
//! ## Rules
//! - Always reports **exactly one** response per issued token.
//! - The transport is not cancelled when the component moves on; a late
//!   response carries a stale token and is discarded by the actor.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time;

use crate::core::command::Command;
use crate::error::FetchError;
use crate::transport::{Request, Transport};

/// Executes one request with an optional timeout.
///
/// `timeout` of `None` or zero disables the timeout.
pub(crate) async fn fetch_once(
    transport: &dyn Transport,
    request: Request,
    timeout: Option<Duration>,
) -> Result<Value, FetchError> {
    match timeout.filter(|d| *d > Duration::ZERO) {
        Some(dur) => match time::timeout(dur, transport.fetch(request)).await {
            Ok(res) => res,
            Err(_elapsed) => Err(FetchError::Timeout { timeout: dur }),
        },
        None => transport.fetch(request).await,
    }
}

/// Spawns one fetch cycle; the outcome is sent back as [`Command::Response`].
pub(crate) fn spawn_fetch(
    transport: Arc<dyn Transport>,
    request: Request,
    timeout: Option<Duration>,
    token: u64,
    reply: mpsc::UnboundedSender<Command>,
) {
    tokio::spawn(async move {
        let outcome = fetch_once(transport.as_ref(), request, timeout).await;
        // The component may be gone already.
        let _ = reply.send(Command::Response { token, outcome });
    });
}
