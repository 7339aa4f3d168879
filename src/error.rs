//! Error types used by the widgetvisor runtime and its widgets.
//!
//! This module defines four error enums:
//!
//! - [`LifecycleError`] — errors raised by the component lifecycle engine itself.
//! - [`FetchError`] — transport failures of one fetch cycle.
//! - [`ValidationError`] — a widget's own parameter problem.
//! - [`RevisionError`] — failures of the revision tracker.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

use crate::core::{Context, Key};

/// # Errors produced by the lifecycle engine.
///
/// [`LifecycleError::UnknownState`] is a programming error: a widget or the engine asked
/// for a `(context, key)` pair that has no state definition. It halts the component.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// No state is defined for the requested `(context, key)` pair.
    #[error("no state defined for context={context:?} key={key:?}")]
    UnknownState {
        /// Requested context.
        context: Context,
        /// Requested key.
        key: Key,
    },

    /// The component actor has exited; the command could not be delivered.
    #[error("component is detached")]
    Detached,

    /// A widget hook panicked and took the component actor down.
    #[error("component panicked: {message}")]
    Panicked {
        /// Panic payload, when it is a string.
        message: String,
    },
}

impl LifecycleError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use widgetvisor::{Context, Key, LifecycleError};
    ///
    /// let err = LifecycleError::UnknownState { context: Context::Stop, key: Key::Error };
    /// assert_eq!(err.as_label(), "lifecycle_unknown_state");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LifecycleError::UnknownState { .. } => "lifecycle_unknown_state",
            LifecycleError::Detached => "lifecycle_detached",
            LifecycleError::Panicked { .. } => "lifecycle_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LifecycleError::UnknownState { context, key } => {
                format!("missing state definition for {context}/{key}")
            }
            LifecycleError::Detached => "component actor has exited".to_string(),
            LifecycleError::Panicked { message } => format!("component panicked: {message}"),
        }
    }
}

/// # Transport failures of a fetch cycle.
///
/// Every variant is treated as *transient* by the engine until it has persisted
/// past the widget's transient error delay.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not complete within its timeout.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// The server answered with a non-success HTTP status.
    #[error("http status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response text or reason phrase.
        message: String,
    },

    /// The server could not be reached.
    #[error("connection failed: {message}")]
    Connect {
        /// The underlying error message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {message}")]
    Decode {
        /// The underlying error message.
        message: String,
    },
}

impl FetchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "fetch_timeout",
            FetchError::Status { .. } => "fetch_status",
            FetchError::Connect { .. } => "fetch_connect",
            FetchError::Decode { .. } => "fetch_decode",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FetchError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            FetchError::Status { status, message } => format!("status {status}: {message}"),
            FetchError::Connect { message } => format!("connect: {message}"),
            FetchError::Decode { message } => format!("decode: {message}"),
        }
    }

    /// `true` when the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }

    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for 401 and 403 answers.
    ///
    /// # Example
    /// ```
    /// use widgetvisor::FetchError;
    ///
    /// let err = FetchError::Status { status: 401, message: "unauthorized".into() };
    /// assert!(err.is_authorization());
    /// assert!(!FetchError::Connect { message: "refused".into() }.is_authorization());
    /// ```
    pub fn is_authorization(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

/// How a validation failure is reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStyle {
    /// Displayed only after the widget's delay rate, unless the problem clears first.
    Delayed,
    /// Displayed at once through the `ParamValidation/Error` state.
    Immediate,
}

/// # A widget's own parameter problem.
///
/// Resolved locally by the component; never published on the event bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Message handed to `display_error`.
    pub message: String,
    /// Reporting style.
    pub style: ErrorStyle,
}

impl ValidationError {
    /// A failure displayed after the delay rate.
    ///
    /// # Example
    /// ```
    /// use widgetvisor::{ErrorStyle, ValidationError};
    ///
    /// let err = ValidationError::delayed("missing machine-id");
    /// assert_eq!(err.style, ErrorStyle::Delayed);
    /// assert_eq!(err.to_string(), "missing machine-id");
    /// ```
    pub fn delayed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: ErrorStyle::Delayed,
        }
    }

    /// A failure displayed immediately.
    pub fn immediate(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            style: ErrorStyle::Immediate,
        }
    }
}

/// # Errors produced by the revision tracker.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevisionError {
    /// The pending-count poll failed more often than the budget allows.
    #[error("revision poll gave up after {failures} failures")]
    Exhausted {
        /// Number of consecutive failures.
        failures: u32,
    },

    /// No revision with this id is tracked.
    #[error("unknown revision {id}")]
    Unknown {
        /// Revision id.
        id: String,
    },
}

impl RevisionError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RevisionError::Exhausted { .. } => "revision_exhausted",
            RevisionError::Unknown { .. } => "revision_unknown",
        }
    }
}
