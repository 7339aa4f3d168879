//! # Signal envelope delivered to event bus listeners.
//!
//! Every callback registered on the [`EventBus`](crate::EventBus) receives one [`Event`]:
//! the dispatched payload as [`Event::target`], followed by the extra positional values
//! of the dispatch call in [`Event::extra`], order preserved.
//!
//! ## Ordering guarantees
//! Each event has a process-wide sequence number (`seq`) that increases monotonically.
//! All listeners invoked by one dispatch of one context group share the same `seq`.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use widgetvisor::{Event, Payload};
//!
//! let payload = Payload::new(json!({"daterange": "[2024-01-01;2024-01-02)"}))
//!     .with_extra(json!(3))
//!     .with_extra(json!("shift"));
//! let ev = Event::from_payload("dateTimeRangeChangeEvent", Some("A"), payload);
//!
//! assert_eq!(ev.signal.as_ref(), "dateTimeRangeChangeEvent");
//! assert_eq!(ev.context.as_deref(), Some("A"));
//! assert_eq!(ev.extra, vec![json!(3), json!("shift")]);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde_json::Value;

/// Global sequence counter for dispatch ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Payload of one dispatch call: the target plus extra positional values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    /// Main payload, exposed to listeners as [`Event::target`].
    pub target: Value,
    /// Extra positional values, in call order.
    pub extra: Vec<Value>,
}

impl Payload {
    /// Creates a payload with no extra values.
    pub fn new(target: impl Into<Value>) -> Self {
        Self {
            target: target.into(),
            extra: Vec::new(),
        }
    }

    /// Appends one extra positional value.
    #[inline]
    pub fn with_extra(mut self, value: impl Into<Value>) -> Self {
        self.extra.push(value.into());
        self
    }
}

impl From<Value> for Payload {
    fn from(target: Value) -> Self {
        Payload::new(target)
    }
}

/// Event handed to listener callbacks.
///
/// - `signal`: signal name the event was dispatched under
/// - `context`: context the listener was registered for (`None` for global listeners)
/// - `target` / `extra`: the dispatched [`Payload`]
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Monotonic sequence number of the dispatch.
    pub seq: u64,
    /// Signal name.
    pub signal: Arc<str>,
    /// Context of the receiving listener group; `None` for global listeners.
    pub context: Option<Arc<str>>,
    /// Dispatched payload.
    pub target: Value,
    /// Extra positional values of the dispatch call.
    pub extra: Vec<Value>,
}

impl Event {
    /// Builds an event from a payload, assigning the next sequence number.
    pub fn from_payload(signal: &str, context: Option<&str>, payload: Payload) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            signal: Arc::from(signal),
            context: context.map(Arc::from),
            target: payload.target,
            extra: payload.extra,
        }
    }

    /// Same event re-addressed to another listener group.
    #[inline]
    pub(crate) fn readdressed(&self, context: Option<&Arc<str>>) -> Self {
        Self {
            seq: self.seq,
            signal: Arc::clone(&self.signal),
            context: context.cloned(),
            target: self.target.clone(),
            extra: self.extra.clone(),
        }
    }

    /// `true` if the event was dispatched under `signal`.
    #[inline]
    pub fn is(&self, signal: &str) -> bool {
        self.signal.as_ref() == signal
    }

    /// Extra positional value at `index`, if present.
    #[inline]
    pub fn extra(&self, index: usize) -> Option<&Value> {
        self.extra.get(index)
    }
}
