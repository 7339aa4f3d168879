use serde_json::Value;

use crate::transport::Request;

/// What a `Load`/`Reload` entry does.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Issue this request.
    Fetch(Request),
    /// A prerequisite is unknown: ask for it and re-validate instead of fetching.
    Await(Prerequisite),
    /// Nothing to fetch: advance to `Loaded` directly.
    Skip,
}

/// Missing input a widget asks other widgets for over the event bus.
///
/// ## Example
/// ```rust
/// use widgetvisor::{signals, Plan, Prerequisite};
///
/// let plan = Plan::Await(Prerequisite::ask(signals::ASK_FOR_DATE_TIME_RANGE).in_context("A"));
/// assert!(matches!(plan, Plan::Await(ref p) if p.context.as_deref() == Some("A")));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Prerequisite {
    /// Signal dispatched to ask for the missing input.
    pub signal: String,
    /// Context to dispatch to; `None` dispatches to all listeners.
    pub context: Option<String>,
    /// Payload of the ask.
    pub target: Value,
}

impl Prerequisite {
    /// Asks all listeners of `signal`.
    pub fn ask(signal: impl Into<String>) -> Self {
        Self {
            signal: signal.into(),
            context: None,
            target: Value::Null,
        }
    }

    /// Restricts the ask to one context.
    #[inline]
    pub fn in_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_target(mut self, target: Value) -> Self {
        self.target = target;
        self
    }
}

/// Classification of a success payload without an application error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Success {
    /// Render with `refresh`, then `Loaded`.
    Display,
    /// Not applicable to this configuration (`NotApplicable`, usually hidden).
    NotApplicable,
    /// Data exists but is older than the widget's threshold (`NotAvailable`).
    NotAvailable(String),
}
