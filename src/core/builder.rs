use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::{Config, Runtime};
use crate::events::EventBus;
use crate::transport::{Offline, Transport};

/// Builder for constructing a [`Runtime`] with optional collaborators.
pub struct RuntimeBuilder {
    cfg: Config,
    bus: Option<EventBus>,
    transport: Option<Arc<dyn Transport>>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            bus: None,
            transport: None,
        }
    }

    /// Shares an existing event bus (e.g. with non-widget publishers).
    ///
    /// Without it, the runtime creates its own bus.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Sets the network backend of every component.
    ///
    /// Without it, every fetch fails with a connect error ([`Offline`]).
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds and returns the runtime.
    pub fn build(self) -> Runtime {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(Offline) as Arc<dyn Transport>);
        Runtime::new_internal(
            self.cfg,
            self.bus.unwrap_or_default(),
            transport,
            CancellationToken::new(),
        )
    }
}
