//! Component runtime: lifecycle engine and mounting.
//!
//! The public API of this module is [`Runtime`] (mounts widgets), the
//! [`ComponentHandle`] it returns, [`Config`], and the state vocabulary
//! ([`Context`], [`Key`], [`StateId`]).
//!
//! Internal modules:
//! - [`actor`]: one component's state machine, timers and error display;
//! - [`runner`]: executes one fetch cycle with timeout, tagged with its token;
//! - [`state`]: `(context, key)` states and the state factory;
//! - [`timers`]: poll, delayed-error and transient-error deadlines;
//! - [`listeners`]: per-component bus subscriptions, one per signal;
//! - [`command`]: messages processed by the actor.

mod actor;
mod builder;
mod command;
mod config;
mod handle;
pub(crate) mod listeners;
pub(crate) mod runner;
mod runtime;
mod state;
mod timers;

pub use builder::RuntimeBuilder;
pub use command::Snapshot;
pub use config::Config;
pub use handle::ComponentHandle;
pub use listeners::Binding;
pub use runtime::Runtime;
pub use state::{Context, Key, StateId};
pub use timers::ArmedTimers;
