//! # Runtime: mounts widgets and owns the shared collaborators.
//!
//! The [`Runtime`] holds the page-wide [`EventBus`], the [`Transport`] and the
//! global [`Config`]. Mounting a widget spawns its component actor and returns a
//! [`ComponentHandle`].
//!
//! ## Architecture
//! ```text
//! Runtime::mount(widget)
//!   ├─► Scope::next()                      (owner of the widget's subscriptions)
//!   ├─► mpsc channel ─► Listeners{bus, scope, tx}
//!   ├─► ComponentActor::new(widget, cfg, transport, listeners, attributes)
//!   └─► tokio::spawn(actor.run(rx, root_token.child_token()))
//!                 └─► ComponentHandle{tx, scope, token, join}
//!
//! Runtime::shutdown()
//!   └─► root_token.cancel() ─► every actor tears down (listeners removed) and exits
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use widgetvisor::{Config, Offline, Runtime, Widget};
//!
//! struct Clock;
//! impl Widget for Clock {}
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let rt = Runtime::builder(Config::default())
//!         .with_transport(Arc::new(Offline))
//!         .build();
//!     let clock = rt.mount(Clock);
//!     clock.disconnect();
//!     clock.join().await.unwrap();
//! }
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::actor::ComponentActor;
use crate::core::listeners::Listeners;
use crate::core::{ComponentHandle, Config, RuntimeBuilder};
use crate::events::{EventBus, Scope};
use crate::policies::RetryPolicy;
use crate::revision::RevisionTracker;
use crate::transport::Transport;
use crate::widget::{Attributes, Widget};

/// Mounts widgets onto a shared bus and transport.
///
/// Must be used from within a tokio runtime: mounting spawns a task.
pub struct Runtime {
    cfg: Arc<Config>,
    bus: EventBus,
    transport: Arc<dyn Transport>,
    token: CancellationToken,
}

impl Runtime {
    pub(crate) fn new_internal(
        cfg: Config,
        bus: EventBus,
        transport: Arc<dyn Transport>,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            bus,
            transport,
            token,
        }
    }

    /// Creates a new builder.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    /// The page event bus.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Global configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Network backend shared by every component.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Mounts `widget` without attributes.
    pub fn mount<W: Widget>(&self, widget: W) -> ComponentHandle {
        self.mount_with(widget, Attributes::new())
    }

    /// Mounts `widget` with its initial attributes; it initializes at once.
    pub fn mount_with<W: Widget>(&self, widget: W, attributes: Attributes) -> ComponentHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let scope = Scope::next();
        let name: Arc<str> = Arc::from(widget.name());
        let listeners = Listeners::new(self.bus.clone(), scope, tx.clone());
        let actor = ComponentActor::new(
            widget,
            Arc::clone(&self.cfg),
            Arc::clone(&self.transport),
            listeners,
            attributes,
            tx.clone(),
        );

        let cancel = self.token.child_token();
        let join = tokio::spawn(actor.run(rx, cancel.clone()));
        ComponentHandle::new(name, scope, tx, cancel, join)
    }

    /// Creates a revision tracker on this runtime's bus and transport.
    ///
    /// Its pollers use the configured request timeout and stop on [`shutdown`](Self::shutdown).
    pub fn revision_tracker(&self, policy: RetryPolicy) -> RevisionTracker {
        RevisionTracker::new(self.bus.clone(), Arc::clone(&self.transport), policy)
            .with_timeout(self.cfg.default_timeout())
            .with_parent(&self.token)
    }

    /// Unmounts every component and stops every revision poller.
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.cfg)
            .field("transport", &self.transport.name())
            .finish()
    }
}
