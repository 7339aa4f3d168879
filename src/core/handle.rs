//! # Handle to a mounted component.
//!
//! [`ComponentHandle`] is what the page holds for one mounted widget. Every
//! method only enqueues a command; the actor applies them in order.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::command::{Command, Snapshot};
use crate::error::LifecycleError;
use crate::events::Scope;

/// Owner-side handle of one component actor.
///
/// Dropping the handle does not unmount the component; call
/// [`disconnect`](Self::disconnect) (or shut the runtime down) for that.
pub struct ComponentHandle {
    name: Arc<str>,
    scope: Scope,
    tx: mpsc::UnboundedSender<Command>,
    cancel: CancellationToken,
    join: JoinHandle<Result<(), LifecycleError>>,
}

impl ComponentHandle {
    pub(crate) fn new(
        name: Arc<str>,
        scope: Scope,
        tx: mpsc::UnboundedSender<Command>,
        cancel: CancellationToken,
        join: JoinHandle<Result<(), LifecycleError>>,
    ) -> Self {
        Self {
            name,
            scope,
            tx,
            cancel,
            join,
        }
    }

    /// Widget name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owner scope of the component's bus subscriptions.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Forces re-entry into `ParamValidation`. Ignored until initialized.
    pub fn start(&self) -> Result<(), LifecycleError> {
        self.send(Command::Start)
    }

    /// Sets (`Some`) or removes (`None`) an attribute.
    pub fn set_attribute(&self, name: &str, value: Option<&str>) -> Result<(), LifecycleError> {
        self.send(Command::SetAttribute {
            name: name.to_string(),
            value: value.map(str::to_string),
        })
    }

    /// Reports connectedness/CSS visibility.
    pub fn set_visible(&self, visible: bool) -> Result<(), LifecycleError> {
        self.send(Command::SetVisible(visible))
    }

    /// Enters `Initialization` if the component is not initialized.
    pub fn initialize(&self) -> Result<(), LifecycleError> {
        self.send(Command::Initialize)
    }

    /// Tears the component down to its freshly constructed state. Idempotent.
    pub fn clear_initialization(&self) -> Result<(), LifecycleError> {
        self.send(Command::ClearInitialization)
    }

    /// `clear_initialization` followed by `initialize`.
    pub fn reinitialize(&self) -> Result<(), LifecycleError> {
        self.clear_initialization()?;
        self.initialize()
    }

    /// Unmounts the component: the actor tears down and exits.
    pub fn disconnect(&self) {
        self.cancel.cancel();
    }

    /// `true` once the actor has exited.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Observable state, after every previously sent command was applied.
    pub async fn snapshot(&self) -> Result<Snapshot, LifecycleError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| LifecycleError::Detached)
    }

    /// Waits for the actor to exit.
    ///
    /// # Errors
    /// The fatal [`LifecycleError`] that halted the component, or
    /// [`LifecycleError::Panicked`] if a widget hook panicked.
    pub async fn join(self) -> Result<(), LifecycleError> {
        match self.join.await {
            Ok(res) => res,
            Err(e) if e.is_panic() => {
                let payload = e.into_panic();
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(LifecycleError::Panicked { message })
            }
            Err(_) => Err(LifecycleError::Detached),
        }
    }

    fn send(&self, cmd: Command) -> Result<(), LifecycleError> {
        self.tx.send(cmd).map_err(|_| LifecycleError::Detached)
    }
}

impl std::fmt::Debug for ComponentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentHandle")
            .field("name", &self.name)
            .field("scope", &self.scope)
            .field("finished", &self.join.is_finished())
            .finish()
    }
}
