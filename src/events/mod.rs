//! Page-wide signals: envelope, owners and the publish/subscribe bus.
//!
//! ## Contents
//! - [`EventBus`] contextual and global listener registry with snapshot dispatch
//! - [`Event`], [`Payload`] envelope handed to callbacks (`target` + `extra`)
//! - [`Scope`] owner id used for bulk unsubscription
//! - [`signals`] catalog of signal names used between widgets
//!
//! ## Quick reference
//! - **Publishers**: widgets (through `Ctx::bus`), the component engine
//!   (prerequisite asks, authorization errors), the revision tracker.
//! - **Consumers**: component listeners (forwarded to the owning actor as commands),
//!   transports following the login token, application code.
//!
//! The bus knows nothing about lifecycle states; the lifecycle engine knows nothing
//! about specific signals beyond `configChangeEvent`.

mod bus;
mod event;
mod scope;
pub mod signals;

pub use bus::{Callback, EventBus};
pub use event::{Event, Payload};
pub use scope::Scope;
