//! # Lifecycle states and the state factory.
//!
//! A component's state is a `(context, key)` pair: the [`Context`] is the coarse
//! phase, the [`Key`] the fine-grained state within it. Behaviors are looked up
//! lazily with [`lookup`]; a pair without a definition is a programming error.
//!
//! ## Defined states
//! ```text
//! Initialization/Default   build skeleton, subscribe, default attributes
//! ParamValidation/Default  validate parameters (delayed errors)
//! ParamValidation/Error    immediate validation error (paired display)
//! Load/Default             one request per entry
//! Loaded/Default           steady; poll timer ──► Reload
//! Loaded/Transient         transport failure inside the grace window; retry timer
//! Reload/Default           before_reload hook, one request per entry
//! Error/Default            application or persistent transport error (paired display)
//! NotAvailable/Default     stale data (paired display)
//! NotApplicable/Default    not applicable to this configuration (paired hide/show)
//! Stop/Default             halted until started again
//! ```
//!
//! ## Next context
//! ```text
//! Initialization ─► ParamValidation ─► Load ─► Loaded ─► Reload ─► Loaded ─► ...
//! Error | NotAvailable | NotApplicable ─► Reload
//! Stop ─► ParamValidation
//! ```

use std::fmt;

use crate::error::LifecycleError;

/// Coarse lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Initialization,
    ParamValidation,
    Load,
    Loaded,
    Reload,
    Error,
    NotAvailable,
    NotApplicable,
    Stop,
}

impl Context {
    /// Context reached by "switch to next context".
    ///
    /// # Example
    /// ```
    /// use widgetvisor::Context;
    ///
    /// assert_eq!(Context::Loaded.next(), Context::Reload);
    /// assert_eq!(Context::Reload.next(), Context::Loaded);
    /// assert_eq!(Context::Error.next(), Context::Reload);
    /// ```
    pub fn next(self) -> Context {
        match self {
            Context::Initialization => Context::ParamValidation,
            Context::ParamValidation => Context::Load,
            Context::Load => Context::Loaded,
            Context::Loaded => Context::Reload,
            Context::Reload => Context::Loaded,
            Context::Error | Context::NotAvailable | Context::NotApplicable => Context::Reload,
            Context::Stop => Context::ParamValidation,
        }
    }

    /// Stable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Context::Initialization => "Initialization",
            Context::ParamValidation => "ParamValidation",
            Context::Load => "Load",
            Context::Loaded => "Loaded",
            Context::Reload => "Reload",
            Context::Error => "Error",
            Context::NotAvailable => "NotAvailable",
            Context::NotApplicable => "NotApplicable",
            Context::Stop => "Stop",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fine-grained state within a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Default,
    Error,
    Transient,
}

impl Key {
    /// Stable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Key::Default => "Default",
            Key::Error => "Error",
            Key::Transient => "Transient",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `(context, key)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId {
    pub context: Context,
    pub key: Key,
}

impl StateId {
    pub const fn new(context: Context, key: Key) -> Self {
        Self { context, key }
    }

    /// The `Default` key of `context`.
    pub const fn of(context: Context) -> Self {
        Self::new(context, Key::Default)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.context, self.key)
    }
}

/// Behavior bound to a defined state; drives the engine's enter/exit hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Initialize,
    Validate,
    InvalidParams,
    Fetch,
    Steady,
    Transient,
    Failed,
    Unavailable,
    Inapplicable,
    Stopped,
}

impl Behavior {
    /// States that re-arm the poll timer while active.
    pub(crate) fn polls(self) -> bool {
        matches!(
            self,
            Behavior::Steady
                | Behavior::Transient
                | Behavior::Failed
                | Behavior::Unavailable
                | Behavior::Inapplicable
        )
    }
}

/// State factory.
///
/// # Errors
/// [`LifecycleError::UnknownState`] for pairs without a definition.
pub(crate) fn lookup(id: StateId) -> Result<Behavior, LifecycleError> {
    use Context as C;
    use Key as K;

    let behavior = match (id.context, id.key) {
        (C::Initialization, K::Default) => Behavior::Initialize,
        (C::ParamValidation, K::Default) => Behavior::Validate,
        (C::ParamValidation, K::Error) => Behavior::InvalidParams,
        (C::Load, K::Default) | (C::Reload, K::Default) => Behavior::Fetch,
        (C::Loaded, K::Default) => Behavior::Steady,
        (C::Loaded, K::Transient) => Behavior::Transient,
        (C::Error, K::Default) => Behavior::Failed,
        (C::NotAvailable, K::Default) => Behavior::Unavailable,
        (C::NotApplicable, K::Default) => Behavior::Inapplicable,
        (C::Stop, K::Default) => Behavior::Stopped,
        (context, key) => return Err(LifecycleError::UnknownState { context, key }),
    };
    Ok(behavior)
}

/// Transition request: target state plus the error message bound to it, if any.
///
/// A bound message is displayed on entry and removed on exit, so every entry into a
/// displaying state is visually reversible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub(crate) id: StateId,
    pub(crate) display: Option<String>,
}

impl Target {
    pub(crate) fn to(id: StateId) -> Self {
        Self { id, display: None }
    }

    pub(crate) fn context(context: Context) -> Self {
        Self::to(StateId::of(context))
    }

    pub(crate) fn next(from: StateId) -> Self {
        Self::context(from.context.next())
    }

    pub(crate) fn displaying(mut self, message: impl Into<String>) -> Self {
        self.display = Some(message.into());
        self
    }
}
