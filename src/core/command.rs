use serde_json::Value;
use tokio::sync::oneshot;

use crate::core::state::StateId;
use crate::core::timers::ArmedTimers;
use crate::error::FetchError;
use crate::events::Event;

/// Messages processed by a component actor, one at a time.
#[derive(Debug)]
pub(crate) enum Command {
    /// Re-enter `ParamValidation`.
    Start,
    /// Attribute set (`Some`) or removed (`None`).
    SetAttribute { name: String, value: Option<String> },
    /// Connectedness/CSS visibility changed.
    SetVisible(bool),
    /// A bus signal the component listens to.
    Signal(Event),
    /// Outcome of the fetch cycle identified by `token`.
    Response {
        token: u64,
        outcome: Result<Value, FetchError>,
    },
    /// Enter `Initialization` if not initialized.
    Initialize,
    /// Tear down to the freshly constructed state.
    ClearInitialization,
    /// Report a [`Snapshot`].
    Snapshot(oneshot::Sender<Snapshot>),
}

/// Observable state of one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current `(context, key)`.
    pub state: StateId,
    /// `Initialization` has completed and not been cleared since.
    pub initialized: bool,
    /// Effective visibility (visible or always visible).
    pub visible: bool,
    /// Timers currently armed.
    pub timers: ArmedTimers,
    /// Event bus subscriptions owned by the component.
    pub listeners: usize,
    /// Error message currently displayed by the widget.
    pub shown_error: Option<String>,
    /// Token of the request awaited, if any.
    pub pending_request: Option<u64>,
}
