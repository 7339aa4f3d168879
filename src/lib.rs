//! # widgetvisor
//!
//! **Widgetvisor** is a component runtime for polling dashboard widgets.
//!
//! Every mounted widget is driven by its own lifecycle state machine (initialize,
//! validate parameters, fetch, display, re-poll) and coordinates with the other
//! widgets of the page over a shared publish/subscribe event bus, without holding
//! references to them.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Widget    │   │    Widget    │   │    Widget    │
//!     │ (impl hooks) │   │ (impl hooks) │   │ (impl hooks) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Runtime                                                          │
//! │  - Config (timeouts, delays, error field)                         │
//! │  - Transport (one request per fetch cycle)                        │
//! │  - EventBus (page-wide signals)                                   │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ComponentActor│   │ComponentActor│   │ComponentActor│ ◄── ComponentHandle
//!     │ (state FSM)  │   │ (state FSM)  │   │ (state FSM)  │     (start, attributes,
//!     └┬─────────▲───┘   └┬─────────▲───┘   └┬─────────▲───┘      visibility, teardown)
//!      │ listen  │ signal │         │        │         │
//!      ▼         │        ▼         │        ▼         │
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventBus: signal → context → [listener]   signal → [global]      │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Initialization ─► ParamValidation ─► Load ─► Loaded ─► Reload ─► Loaded ─► ...
//!                        │   ▲           │        ▲  │
//!                        │   └─ Await ───┘        │  └─ poll timer (visible only)
//!                        ▼                        │
//!                ParamValidation/Error      Loaded/Transient (grace window)
//!
//! response ─► error field?      ─► Error          (application error)
//!          ─► manage_success    ─► Loaded | NotApplicable | NotAvailable
//!          ─► transport failure ─► Loaded/Transient ─► Error once the grace window closes
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                     |
//! |-------------------|---------------------------------------------------------------|----------------------------------------|
//! | **Widgets**       | Override only the hooks a widget customizes.                  | [`Widget`], [`Ctx`], [`Plan`]          |
//! | **Runtime**       | Mount widgets, drive their lifecycle, tear them down.          | [`Runtime`], [`ComponentHandle`]       |
//! | **Event bus**     | Contextual and global listeners, snapshot dispatch.            | [`EventBus`], [`Event`], [`signals`]   |
//! | **Transport**     | One request per fetch cycle, timeout applied by the engine.    | [`Transport`], [`Request`]             |
//! | **Revisions**     | Follow submitted modifications until processed.                | [`RevisionTracker`], [`RetryPolicy`]   |
//! | **Errors**        | Typed lifecycle, fetch, validation and revision errors.        | [`LifecycleError`], [`FetchError`]     |
//! | **Configuration** | Centralize runtime defaults.                                   | [`Config`]                             |
//!
//! ## Optional features
//! - `http`: exposes [`HttpTransport`](crate::HttpTransport), a `reqwest` backend
//!   following the login token published on the bus.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use widgetvisor::{Config, Ctx, FetchError, Plan, Request, Runtime, Transport, Widget};
//!
//! struct Backend;
//!
//! #[async_trait]
//! impl Transport for Backend {
//!     async fn fetch(&self, _request: Request) -> Result<Value, FetchError> {
//!         Ok(json!({"Value": "Running"}))
//!     }
//! }
//!
//! struct MachineMode;
//!
//! impl Widget for MachineMode {
//!     fn refresh_rate(&self) -> Option<Duration> {
//!         Some(Duration::from_secs(10))
//!     }
//!
//!     fn plan(&mut self, _ctx: &mut Ctx<'_>) -> Plan {
//!         Plan::Fetch(Request::get("http://pulse/Machine/Mode?MachineId=1"))
//!     }
//!
//!     fn refresh(&mut self, _ctx: &mut Ctx<'_>, data: &Value) {
//!         println!("mode: {}", data["Value"]);
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rt = Runtime::builder(Config::default())
//!         .with_transport(Arc::new(Backend))
//!         .build();
//!
//!     let mode = rt.mount(MachineMode);
//!     let snapshot = mode.snapshot().await?;
//!     println!("state: {}", snapshot.state);
//!
//!     rt.shutdown();
//!     mode.join().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod policies;
mod revision;
mod transport;
mod widget;

// ---- Public re-exports ----

pub use core::{
    ArmedTimers, Binding, ComponentHandle, Config, Context, Key, Runtime, RuntimeBuilder,
    Snapshot, StateId,
};
pub use error::{ErrorStyle, FetchError, LifecycleError, RevisionError, ValidationError};
pub use events::{signals, Callback, Event, EventBus, Payload, Scope};
pub use policies::{Jitter, RetryPolicy};
pub use revision::{Progress, Revision, RevisionTracker};
pub use transport::{Method, Offline, Request, Transport};
pub use widget::{Attributes, Ctx, Plan, Prerequisite, Success, Widget};

// Optional: expose the reqwest backend.
// Enable with: `--features http`
#[cfg(feature = "http")]
pub use transport::HttpTransport;
