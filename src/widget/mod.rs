//! Widget-facing API of the lifecycle engine.
//!
//! ## Contents
//! - [`Widget`] capability trait with default hooks
//! - [`Ctx`] hook context: attributes, transitions, delayed errors, bus access
//! - [`Attributes`] attribute map with parsing helpers
//! - [`Plan`], [`Prerequisite`], [`Success`] hook outcomes
//!
//! ## Quick wiring
//! ```text
//! Runtime::mount(widget) ──► component actor
//!     ├─► Widget::initialize(ctx)          (once, until clear_initialization)
//!     ├─► Widget::validate_parameters(ctx) (every ParamValidation entry)
//!     ├─► Widget::plan(ctx)                (every Load/Reload entry)
//!     └─► Widget::manage_success / refresh / manage_error / manage_failure
//! ```

mod attributes;
mod context;
mod hooks;
mod outcome;

pub use attributes::Attributes;
pub use context::Ctx;
pub(crate) use context::{Directive, Effects};
pub(crate) use hooks::is_config_change;
pub use hooks::Widget;
pub use outcome::{Plan, Prerequisite, Success};
