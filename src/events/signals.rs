//! Signal names exchanged between widgets.
//!
//! Plain strings; context strings are chosen by the widgets and must match
//! exactly between publisher and subscriber.

/// A widget changed the active date/time range. Target: `{"daterange": ...}`.
pub const DATE_TIME_RANGE_CHANGE: &str = "dateTimeRangeChangeEvent";
/// A widget needs the active date/time range; the owner re-dispatches [`DATE_TIME_RANGE_CHANGE`].
pub const ASK_FOR_DATE_TIME_RANGE: &str = "askForDateTimeRangeEvent";
/// The selected machine changed. Target: `{"newMachineId": ...}`.
pub const MACHINE_ID_CHANGE: &str = "machineIdChangeSignal";
/// A displayed parameter changed.
pub const PARAM_CHANGE: &str = "paramChangeSignal";
/// Page configuration changed; routed to `Widget::on_config_change`.
pub const CONFIG_CHANGE: &str = "configChangeEvent";
/// The login token changed. Target: the new token string, or `null` after logout.
pub const TOKEN_HAS_CHANGED: &str = "TokenHasChangedEvent";
/// A request was rejected with 401/403. Target: the HTTP status.
pub const AUTHORIZATION_ERROR: &str = "AuthorizationErrorEvent";
/// Progress of a tracked modification. Target: a revision `Progress`.
pub const MODIFICATION: &str = "modificationEvent";
/// Show a page-wide message.
pub const SHOW_MESSAGE: &str = "showMessageSignal";
/// Clear the page-wide message.
pub const CLEAR_MESSAGE: &str = "clearMessageSignal";
/// Several widgets failed to reach the server.
pub const SERVER_PROBABLY_DISCONNECTED: &str = "serverProbablyDisconnected";
/// The server answered again.
pub const SERVER_PROBABLY_AVAILABLE: &str = "serverProbablyAvailable";
/// The server is in maintenance.
pub const PULSE_MAINTENANCE: &str = "pulseMaintenance";
