//! # Widget capability trait
//!
//! `Widget` is the extension point implemented once per widget type. Every hook
//! has a default body, so a widget overrides only the part of the lifecycle it
//! customizes; the engine owns sequencing, timers and network classification.
//!
//! ## Contract
//! - Hooks run on the component actor, one at a time, never concurrently.
//! - Hooks must not block; they react and return.
//! - `display_error` / `remove_error` are always called in pairs by the engine.
//!
//! ## Example
//! ```rust
//! use serde_json::Value;
//! use widgetvisor::{Ctx, Plan, Request, ValidationError, Widget};
//!
//! struct MachineStatus {
//!     text: String,
//! }
//!
//! impl Widget for MachineStatus {
//!     fn validate_parameters(&mut self, ctx: &mut Ctx<'_>) -> Result<(), ValidationError> {
//!         match ctx.attributes().parse::<u32>("machine-id") {
//!             Some(Ok(_)) => Ok(()),
//!             Some(Err(_)) => Err(ValidationError::immediate("bad machine-id")),
//!             None => Err(ValidationError::delayed("missing machine-id")),
//!         }
//!     }
//!
//!     fn plan(&mut self, ctx: &mut Ctx<'_>) -> Plan {
//!         let id = ctx.attribute("machine-id").unwrap_or_default();
//!         Plan::Fetch(Request::get(format!("http://pulse/Machine/Status?MachineId={id}")))
//!     }
//!
//!     fn refresh(&mut self, _ctx: &mut Ctx<'_>, data: &Value) {
//!         self.text = data["Value"].as_str().unwrap_or_default().to_string();
//!     }
//! }
//! ```

use std::time::Duration;

use serde_json::Value;

use crate::error::{FetchError, ValidationError};
use crate::events::{signals, Event};
use crate::widget::{Ctx, Plan, Success};

/// Contract for widgets driven by the lifecycle engine.
pub trait Widget: Send + 'static {
    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Attributes whose changes reach [`attribute_changed`](Self::attribute_changed).
    fn observed_attributes(&self) -> &[&str] {
        &[]
    }

    /// Widgets that keep polling while hidden.
    fn always_visible(&self) -> bool {
        false
    }

    /// Poll period in `Loaded`; `None` disables re-polling.
    fn refresh_rate(&self) -> Option<Duration> {
        None
    }

    /// Request timeout; `None` inherits the runtime configuration.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Delay before a `set_error` message is displayed; `None` inherits.
    fn delay_rate(&self) -> Option<Duration> {
        None
    }

    /// Grace window for transport failures; `None` inherits.
    fn transient_error_delay(&self) -> Option<Duration> {
        None
    }

    /// Builds the skeleton, subscribes, defaults attributes. Runs once per
    /// initialization; the engine advances to `ParamValidation` afterwards.
    fn initialize(&mut self, _ctx: &mut Ctx<'_>) {}

    /// Releases everything `initialize` built. May be called repeatedly.
    fn clear_initialization(&mut self) {}

    /// Checks the widget's parameters on every entry into `ParamValidation`.
    fn validate_parameters(&mut self, _ctx: &mut Ctx<'_>) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Builds the request of a `Load`/`Reload` entry. Default: no request.
    fn plan(&mut self, _ctx: &mut Ctx<'_>) -> Plan {
        Plan::Skip
    }

    /// Runs before every `Reload` request.
    fn before_reload(&mut self, _ctx: &mut Ctx<'_>) {}

    /// Classifies a payload that carries no application error.
    fn manage_success(&mut self, _ctx: &mut Ctx<'_>, _data: &Value) -> Success {
        Success::Display
    }

    /// Renders displayable data.
    fn refresh(&mut self, _ctx: &mut Ctx<'_>, _data: &Value) {}

    /// Handles an application error payload; returns the message to display.
    fn manage_error(&mut self, _ctx: &mut Ctx<'_>, _data: &Value, message: &str) -> String {
        message.to_string()
    }

    /// Observes every transport failure, before the grace window is applied.
    fn manage_failure(&mut self, _ctx: &mut Ctx<'_>, _failure: &FetchError) {}

    /// Message displayed once transport failures outlast the grace window.
    fn failure_message(&self, failure: &FetchError) -> String {
        failure.as_message()
    }

    /// Entering `NotApplicable` (usually hides the widget).
    fn manage_not_applicable(&mut self) {}

    /// Leaving `NotApplicable`.
    fn manage_applicable(&mut self) {}

    /// Shows an error message.
    fn display_error(&mut self, _message: &str) {}

    /// Removes the error message shown by `display_error`.
    fn remove_error(&mut self) {}

    /// An observed attribute changed. Default: restart validation.
    fn attribute_changed(
        &mut self,
        ctx: &mut Ctx<'_>,
        _name: &str,
        _old: Option<&str>,
        _new: Option<&str>,
    ) {
        ctx.start();
    }

    /// `configChangeEvent` received. Default: restart validation.
    fn on_config_change(&mut self, ctx: &mut Ctx<'_>, _event: &Event) {
        ctx.start();
    }

    /// Any other signal the widget listens to.
    fn on_signal(&mut self, _ctx: &mut Ctx<'_>, _event: &Event) {}
}

/// `true` for the signal routed to [`Widget::on_config_change`].
pub(crate) fn is_config_change(event: &Event) -> bool {
    event.is(signals::CONFIG_CHANGE)
}
