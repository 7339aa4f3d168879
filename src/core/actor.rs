//! # ComponentActor: one mounted widget.
//!
//! Owns the lifecycle state machine of a single widget. The actor is the only
//! mutator of its component: commands from the handle, forwarded bus signals,
//! fetch responses and timer deadlines are processed one at a time, so every
//! widget hook runs sequentially and no intermediate state is observable.
//!
//! ## Architecture
//! ```text
//! ComponentHandle ──► Command ──┐
//! EventBus callback ─► Command ─┼─► ComponentActor::drive()
//! spawn_fetch ─────► Response ──┘          │
//!                                          ├─► handle(command)
//!                                          ├─► on_expired(timer)
//!                                          └─► transition(target)
//!                                                 ├─► lookup(target)   (fatal if undefined)
//!                                                 ├─► exit(current)
//!                                                 └─► enter(next) ──► follow-up target?
//! ```
//!
//! ## Rules
//! - A transition looks the target up **before** leaving the current state.
//! - At most **one** request is awaited; leaving `Load`/`Reload` invalidates it.
//! - `display_error`/`remove_error` are paired: a message is displayed at most once
//!   and removed before another one is displayed.
//! - Leaving a displaying state keeps its message on screen (*carried*) until the
//!   next outcome is known, so a retry that fails the same way does not flicker.
//! - Teardown is idempotent and always removes every bus subscription of the scope.

use std::sync::Arc;
use std::time::Duration;

use futures::future::OptionFuture;
use serde_json::Value;
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::command::{Command, Snapshot};
use crate::core::config::Config;
use crate::core::listeners::Listeners;
use crate::core::runner::spawn_fetch;
use crate::core::state::{lookup, Behavior, Context, Key, StateId, Target};
use crate::core::timers::{Expired, Timers};
use crate::error::{ErrorStyle, FetchError, LifecycleError, ValidationError};
use crate::events::signals;
use crate::transport::Transport;
use crate::widget::{
    is_config_change, Attributes, Ctx, Directive, Effects, Plan, Prerequisite, Success, Widget,
};

/// Where the message currently displayed by the widget comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    /// Bound to the current state; removed on exit.
    Bound,
    /// Displayed by the delayed-error timer; removed when validation succeeds
    /// or the context changes.
    Delayed,
    /// Left over from a previous state; removed once the next outcome is known.
    Carried,
}

#[derive(Debug)]
struct Shown {
    message: String,
    source: Source,
}

/// Lifecycle engine of one widget.
pub(crate) struct ComponentActor<W: Widget> {
    widget: W,
    name: Arc<str>,
    cfg: Arc<Config>,
    transport: Arc<dyn Transport>,
    listeners: Listeners,
    attributes: Attributes,
    /// Reply channel handed to spawned fetches.
    tx: mpsc::UnboundedSender<Command>,

    state: StateId,
    behavior: Option<Behavior>,
    initialized: bool,
    visible: bool,
    timers: Timers,

    /// Last issued request token (monotonic).
    token: u64,
    /// Token of the request currently awaited.
    pending: Option<u64>,
    shown: Option<Shown>,
    /// A prerequisite was asked for; validation waits for an explicit start.
    awaiting: bool,
    /// Transport failures since the last success.
    failing: bool,
    /// The grace window of the current failure streak has elapsed.
    transient_expired: bool,
    last_failure: Option<String>,
}

impl<W: Widget> ComponentActor<W> {
    pub(crate) fn new(
        widget: W,
        cfg: Arc<Config>,
        transport: Arc<dyn Transport>,
        listeners: Listeners,
        attributes: Attributes,
        tx: mpsc::UnboundedSender<Command>,
    ) -> Self {
        let name: Arc<str> = Arc::from(widget.name());
        Self {
            widget,
            name,
            cfg,
            transport,
            listeners,
            attributes,
            tx,
            state: StateId::of(Context::Initialization),
            behavior: None,
            initialized: false,
            visible: true,
            timers: Timers::default(),
            token: 0,
            pending: None,
            shown: None,
            awaiting: false,
            failing: false,
            transient_expired: false,
            last_failure: None,
        }
    }

    /// Initializes the widget, then processes commands and timers until `cancel`
    /// fires or a fatal lifecycle error occurs. Always tears down on exit.
    ///
    /// # Errors
    /// [`LifecycleError::UnknownState`] when an undefined `(context, key)` pair is
    /// requested; the component halts.
    pub(crate) async fn run(
        mut self,
        mut rx: mpsc::UnboundedReceiver<Command>,
        cancel: CancellationToken,
    ) -> Result<(), LifecycleError> {
        info!(component = %self.name, scope = %self.listeners.scope(), "mounted");

        let res = match self.transition(Target::context(Context::Initialization)) {
            Ok(()) => self.drive(&mut rx, &cancel).await,
            Err(e) => Err(e),
        };
        self.teardown();

        match &res {
            Ok(()) => info!(component = %self.name, "disconnected"),
            Err(e) => error!(
                component = %self.name,
                error = e.as_label(),
                state = %self.state,
                "{}",
                e.as_message()
            ),
        }
        res
    }

    async fn drive(
        &mut self,
        rx: &mut mpsc::UnboundedReceiver<Command>,
        cancel: &CancellationToken,
    ) -> Result<(), LifecycleError> {
        loop {
            let deadline = self.timers.next_deadline();
            select! {
                biased;
                _ = cancel.cancelled() => return Ok(()),
                cmd = rx.recv() => match cmd {
                    Some(cmd) => self.handle(cmd)?,
                    None => return Ok(()),
                },
                Some(()) = OptionFuture::from(deadline.map(time::sleep_until)) => {
                    let now = Instant::now();
                    while let Some(expired) = self.timers.pop_expired(now) {
                        self.on_expired(expired)?;
                    }
                }
            }
        }
    }

    fn handle(&mut self, cmd: Command) -> Result<(), LifecycleError> {
        match cmd {
            Command::Start => {
                if !self.initialized {
                    debug!(component = %self.name, "start ignored: not initialized");
                    return Ok(());
                }
                self.awaiting = false;
                self.transition(Target::context(Context::ParamValidation))
            }
            Command::SetAttribute { name, value } => {
                let old = self.attributes.apply(&name, value.clone());
                if old == value
                    || !self.initialized
                    || !self.widget.observed_attributes().contains(&name.as_str())
                {
                    return Ok(());
                }
                let ((), fx) = self.hook(|w, ctx| {
                    w.attribute_changed(ctx, &name, old.as_deref(), value.as_deref())
                });
                self.apply(fx)
            }
            Command::SetVisible(visible) => {
                self.visible = visible;
                if self.is_visible() && self.timers.take_poll_due() {
                    debug!(component = %self.name, "visible again: running the deferred poll");
                    return self.transition(Target::next(self.state));
                }
                Ok(())
            }
            Command::Signal(event) => {
                if !self.initialized {
                    return Ok(());
                }
                let ((), fx) = if is_config_change(&event) {
                    self.hook(|w, ctx| w.on_config_change(ctx, &event))
                } else {
                    self.hook(|w, ctx| w.on_signal(ctx, &event))
                };
                self.apply(fx)
            }
            Command::Response { token, outcome } => self.on_response(token, outcome),
            Command::Initialize => {
                if self.initialized {
                    return Ok(());
                }
                self.transition(Target::context(Context::Initialization))
            }
            Command::ClearInitialization => {
                self.teardown();
                Ok(())
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
                Ok(())
            }
        }
    }

    fn on_expired(&mut self, expired: Expired) -> Result<(), LifecycleError> {
        match expired {
            Expired::DelayedError(message) => {
                self.show(message, Source::Delayed);
                Ok(())
            }
            Expired::Transient => {
                self.transient_expired = true;
                if self.behavior == Some(Behavior::Transient) {
                    let message = self.last_failure.clone().unwrap_or_default();
                    return self.transition(Target::context(Context::Error).displaying(message));
                }
                Ok(())
            }
            Expired::Poll => {
                if self.is_visible() {
                    self.transition(Target::next(self.state))
                } else {
                    debug!(component = %self.name, "hidden: poll deferred");
                    self.timers.mark_poll_due();
                    Ok(())
                }
            }
        }
    }

    // ---- transitions ----

    /// Moves to `target`, then to every follow-up target entry hooks produce.
    fn transition(&mut self, target: Target) -> Result<(), LifecycleError> {
        let mut next = Some(target);
        while let Some(target) = next.take() {
            let behavior = lookup(target.id)?;
            if let Some(current) = self.behavior {
                self.exit(current);
            }
            let from = self.state;
            if from.context != target.id.context {
                self.timers.disarm_delayed_error();
                self.demote(Source::Delayed);
            }
            self.state = target.id;
            self.behavior = Some(behavior);
            debug!(component = %self.name, from = %from, to = %self.state, "transition");

            next = self.enter(behavior, target.display);
        }
        Ok(())
    }

    fn exit(&mut self, current: Behavior) {
        match current {
            Behavior::Fetch => self.pending = None,
            Behavior::InvalidParams | Behavior::Failed | Behavior::Unavailable => {
                self.demote(Source::Bound)
            }
            Behavior::Inapplicable => self.widget.manage_applicable(),
            _ => {}
        }
        if current.polls() {
            self.timers.disarm_poll();
        }
    }

    fn enter(&mut self, behavior: Behavior, display: Option<String>) -> Option<Target> {
        match behavior {
            Behavior::Initialize => {
                self.listeners.listen_global(signals::CONFIG_CHANGE);
                let ((), fx) = self.hook(|w, ctx| w.initialize(ctx));
                self.initialized = true;
                self.follow(fx).or(Some(Target::next(self.state)))
            }
            Behavior::Validate => self.validate(),
            Behavior::InvalidParams => {
                self.show_bound(display);
                None
            }
            Behavior::Fetch => self.fetch(),
            Behavior::Steady => {
                self.hide_carried();
                if let Some(rate) = self.refresh_rate() {
                    self.arm_poll(rate);
                }
                None
            }
            Behavior::Transient => {
                self.hide_carried();
                self.arm_poll(self.retry_delay());
                None
            }
            Behavior::Failed | Behavior::Unavailable => {
                self.show_bound(display);
                let delay = if self.failing {
                    Some(self.retry_delay())
                } else {
                    self.refresh_rate()
                };
                if let Some(delay) = delay {
                    self.arm_poll(delay);
                }
                None
            }
            Behavior::Inapplicable => {
                self.hide_carried();
                self.widget.manage_not_applicable();
                if let Some(rate) = self.refresh_rate() {
                    self.arm_poll(rate);
                }
                None
            }
            Behavior::Stopped => {
                self.hide_carried();
                self.clear_streak();
                None
            }
        }
    }

    fn validate(&mut self) -> Option<Target> {
        let (res, fx) = self.hook(|w, ctx| w.validate_parameters(ctx));
        let set_error = fx.delayed_error.is_some();
        if let Some(target) = self.follow(fx) {
            return Some(target);
        }
        match res {
            Ok(()) if set_error => None,
            Ok(()) => {
                self.timers.disarm_delayed_error();
                self.hide_if(Source::Delayed);
                if self.awaiting {
                    debug!(component = %self.name, "waiting for a prerequisite");
                    None
                } else {
                    Some(Target::next(self.state))
                }
            }
            Err(ValidationError {
                message,
                style: ErrorStyle::Delayed,
            }) => {
                self.set_delayed_error(message);
                None
            }
            Err(ValidationError {
                message,
                style: ErrorStyle::Immediate,
            }) => Some(
                Target::to(StateId::new(Context::ParamValidation, Key::Error)).displaying(message),
            ),
        }
    }

    fn fetch(&mut self) -> Option<Target> {
        if self.state.context == Context::Reload {
            let ((), fx) = self.hook(|w, ctx| w.before_reload(ctx));
            if let Some(target) = self.follow(fx) {
                return Some(target);
            }
        }
        let (plan, fx) = self.hook(|w, ctx| w.plan(ctx));
        if let Some(target) = self.follow(fx) {
            return Some(target);
        }
        match plan {
            Plan::Fetch(request) => {
                self.token += 1;
                self.pending = Some(self.token);
                debug!(component = %self.name, token = self.token, url = %request.url, "fetch");
                spawn_fetch(
                    Arc::clone(&self.transport),
                    request,
                    self.timeout(),
                    self.token,
                    self.tx.clone(),
                );
                None
            }
            Plan::Await(prerequisite) => {
                self.ask(&prerequisite);
                self.awaiting = true;
                Some(Target::context(Context::ParamValidation))
            }
            Plan::Skip => Some(Target::next(self.state)),
        }
    }

    fn ask(&self, prerequisite: &Prerequisite) {
        let bus = self.listeners.bus();
        let reached = match &prerequisite.context {
            Some(context) => {
                bus.dispatch_to_context(&prerequisite.signal, context, prerequisite.target.clone())
            }
            None => bus.dispatch_to_all(&prerequisite.signal, prerequisite.target.clone()),
        };
        debug!(
            component = %self.name,
            signal = %prerequisite.signal,
            reached,
            "asked for a missing prerequisite"
        );
    }

    // ---- responses ----

    fn on_response(
        &mut self,
        token: u64,
        outcome: Result<Value, FetchError>,
    ) -> Result<(), LifecycleError> {
        if self.pending != Some(token) {
            warn!(
                component = %self.name,
                token,
                pending = ?self.pending,
                "discarding stale response"
            );
            return Ok(());
        }
        self.pending = None;

        let target = match outcome {
            Ok(data) => self.on_success(data),
            Err(failure) => self.on_failure(failure),
        };
        match target {
            Some(target) => self.transition(target),
            None => Ok(()),
        }
    }

    fn on_success(&mut self, data: Value) -> Option<Target> {
        self.clear_streak();

        if let Some(message) = self.application_error(&data) {
            let (message, fx) = self.hook(|w, ctx| w.manage_error(ctx, &data, &message));
            return self
                .follow(fx)
                .or_else(|| Some(Target::context(Context::Error).displaying(message)));
        }

        let (success, fx) = self.hook(|w, ctx| w.manage_success(ctx, &data));
        if let Some(target) = self.follow(fx) {
            return Some(target);
        }
        match success {
            Success::Display => {
                let ((), fx) = self.hook(|w, ctx| w.refresh(ctx, &data));
                self.follow(fx).or(Some(Target::next(self.state)))
            }
            Success::NotApplicable => Some(Target::context(Context::NotApplicable)),
            Success::NotAvailable(message) => {
                Some(Target::context(Context::NotAvailable).displaying(message))
            }
        }
    }

    fn on_failure(&mut self, failure: FetchError) -> Option<Target> {
        warn!(
            component = %self.name,
            error = failure.as_label(),
            "fetch failed: {}",
            failure.as_message()
        );
        let ((), fx) = self.hook(|w, ctx| w.manage_failure(ctx, &failure));

        if let Some(status) = failure.status().filter(|_| failure.is_authorization()) {
            self.listeners
                .bus()
                .dispatch_to_global_only(signals::AUTHORIZATION_ERROR, Value::from(status));
        }

        let message = self.widget.failure_message(&failure);
        self.last_failure = Some(message.clone());
        if !self.failing {
            self.failing = true;
            let grace = self.transient_error_delay();
            if grace.is_zero() {
                self.transient_expired = true;
            } else {
                self.timers.arm_transient(Instant::now() + grace);
            }
        }

        if let Some(target) = self.follow(fx) {
            return Some(target);
        }
        if self.transient_expired {
            Some(Target::context(Context::Error).displaying(message))
        } else {
            Some(Target::to(StateId::new(Context::Loaded, Key::Transient)))
        }
    }

    /// Message of the application error field, if the payload carries one.
    fn application_error(&self, data: &Value) -> Option<String> {
        match data.get(&self.cfg.error_field)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn clear_streak(&mut self) {
        self.failing = false;
        self.transient_expired = false;
        self.last_failure = None;
        self.timers.disarm_transient();
    }

    // ---- hooks ----

    fn hook<R>(&mut self, f: impl FnOnce(&mut W, &mut Ctx<'_>) -> R) -> (R, Effects) {
        let mut ctx = Ctx::new(
            &self.name,
            self.state,
            &self.attributes,
            &mut self.listeners,
            &self.cfg.cache_buster,
        );
        let out = f(&mut self.widget, &mut ctx);
        (out, ctx.into_effects())
    }

    /// Applies the side effects of a hook; returns the transition it requested.
    fn follow(&mut self, fx: Effects) -> Option<Target> {
        if let Some(message) = fx.delayed_error {
            self.set_delayed_error(message);
        }
        fx.directive.map(|directive| match directive {
            Directive::Switch(id, display) => Target { id, display },
            Directive::Next => Target::next(self.state),
            Directive::Start => {
                self.awaiting = false;
                Target::context(Context::ParamValidation)
            }
        })
    }

    fn apply(&mut self, fx: Effects) -> Result<(), LifecycleError> {
        match self.follow(fx) {
            Some(target) => self.transition(target),
            None => Ok(()),
        }
    }

    // ---- error display ----

    fn show(&mut self, message: String, source: Source) {
        if let Some(shown) = self.shown.as_mut() {
            if shown.message == message {
                shown.source = source;
                return;
            }
            self.widget.remove_error();
        }
        self.widget.display_error(&message);
        self.shown = Some(Shown { message, source });
    }

    fn show_bound(&mut self, display: Option<String>) {
        match display {
            Some(message) => self.show(message, Source::Bound),
            None => self.hide_carried(),
        }
    }

    fn hide(&mut self) {
        if self.shown.take().is_some() {
            self.widget.remove_error();
        }
    }

    fn hide_if(&mut self, source: Source) {
        if self.shown.as_ref().is_some_and(|s| s.source == source) {
            self.hide();
        }
    }

    fn hide_carried(&mut self) {
        self.hide_if(Source::Carried);
    }

    fn demote(&mut self, source: Source) {
        if let Some(shown) = self.shown.as_mut().filter(|s| s.source == source) {
            shown.source = Source::Carried;
        }
    }

    fn set_delayed_error(&mut self, message: String) {
        if self.timers.delayed_error() == Some(message.as_str()) {
            return;
        }
        if let Some(shown) = self.shown.as_mut().filter(|s| s.message == message) {
            shown.source = Source::Delayed;
            self.timers.disarm_delayed_error();
            return;
        }
        let at = Instant::now() + self.delay_rate();
        self.timers.arm_delayed_error(at, message);
    }

    // ---- timing ----

    fn is_visible(&self) -> bool {
        self.visible || self.widget.always_visible()
    }

    fn arm_poll(&mut self, delay: Duration) {
        self.timers.arm_poll(Instant::now() + delay);
    }

    fn refresh_rate(&self) -> Option<Duration> {
        self.widget.refresh_rate().filter(|d| !d.is_zero())
    }

    fn retry_delay(&self) -> Duration {
        self.refresh_rate()
            .unwrap_or_else(|| self.cfg.retry_rate_clamped())
    }

    fn timeout(&self) -> Option<Duration> {
        match self.widget.timeout() {
            Some(d) => Some(d).filter(|d| !d.is_zero()),
            None => self.cfg.default_timeout(),
        }
    }

    fn delay_rate(&self) -> Duration {
        self.widget.delay_rate().unwrap_or(self.cfg.delay_rate)
    }

    fn transient_error_delay(&self) -> Duration {
        self.widget
            .transient_error_delay()
            .unwrap_or(self.cfg.transient_error_delay)
    }

    // ---- teardown ----

    /// Leaves the component as if freshly constructed.
    fn teardown(&mut self) {
        if let Some(current) = self.behavior.take() {
            self.exit(current);
        }
        self.hide();
        self.timers.clear();
        self.pending = None;
        self.clear_streak();
        self.awaiting = false;
        self.listeners.clear();
        self.widget.clear_initialization();
        if self.initialized {
            debug!(component = %self.name, "initialization cleared");
        }
        self.initialized = false;
        self.state = StateId::of(Context::Initialization);
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            initialized: self.initialized,
            visible: self.is_visible(),
            timers: self.timers.armed(),
            listeners: self.listeners.live(),
            shown_error: self.shown.as_ref().map(|s| s.message.clone()),
            pending_request: self.pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use crate::core::Runtime;
    use crate::events::{Event, Scope};
    use crate::core::ComponentHandle;
    use crate::transport::Request;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Transport replaying scripted outcomes, then `{"Value": "X"}` forever.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<Result<Value, FetchError>>>,
        latency: Duration,
        urls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn slow(latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                latency,
                ..Self::default()
            })
        }

        fn then(&self, reply: Result<Value, FetchError>) {
            self.replies.lock().push_back(reply);
        }

        fn calls(&self) -> usize {
            self.urls.lock().len()
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn fetch(&self, request: Request) -> Result<Value, FetchError> {
            self.urls.lock().push(request.url);
            let reply = self.replies.lock().pop_front();
            if !self.latency.is_zero() {
                time::sleep(self.latency).await;
            }
            reply.unwrap_or_else(|| Ok(json!({"Value": "X"})))
        }
    }

    /// Widget recording every hook call.
    #[derive(Default)]
    struct Probe {
        log: Log,
        refresh_rate: Option<Duration>,
        transient: Option<Duration>,
        require: Option<&'static str>,
        observed: &'static [&'static str],
        needs_range: bool,
        range: Option<Value>,
        follow: Option<&'static str>,
        follow_globally: Option<&'static str>,
        stop_after_refresh: bool,
        bad_key_after_refresh: bool,
        always_visible: bool,
        trace_plans: bool,
        page_messages: bool,
        panic_on_plan: bool,
    }

    impl Probe {
        fn new() -> (Self, Log) {
            let probe = Self::default();
            let log = Arc::clone(&probe.log);
            (probe, log)
        }

        fn record(&self, entry: impl Into<String>) {
            self.log.lock().push(entry.into());
        }
    }

    impl Widget for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn observed_attributes(&self) -> &[&str] {
            self.observed
        }

        fn always_visible(&self) -> bool {
            self.always_visible
        }

        fn refresh_rate(&self) -> Option<Duration> {
            self.refresh_rate
        }

        fn transient_error_delay(&self) -> Option<Duration> {
            self.transient
        }

        fn initialize(&mut self, ctx: &mut Ctx<'_>) {
            self.record("init");
            if let Some(signal) = self.follow {
                let group = ctx.attribute("group").unwrap_or("default").to_string();
                ctx.listen(signal, &group);
            }
            if let Some(signal) = self.follow_globally {
                ctx.listen_global(signal);
            }
            if self.needs_range {
                ctx.listen(signals::DATE_TIME_RANGE_CHANGE, "A");
            }
            if self.page_messages {
                ctx.listen_global(signals::SHOW_MESSAGE);
                ctx.listen_global(signals::CLEAR_MESSAGE);
            }
        }

        fn clear_initialization(&mut self) {
            self.record("clear");
            self.range = None;
        }

        fn validate_parameters(&mut self, ctx: &mut Ctx<'_>) -> Result<(), ValidationError> {
            if ctx.attribute("mode") == Some("manual") {
                ctx.switch_to_key_displaying(Key::Error, "manual mode");
                return Ok(());
            }
            let Some(attr) = self.require else {
                return Ok(());
            };
            match ctx.attributes().parse::<u32>(attr) {
                Some(Ok(_)) => Ok(()),
                Some(Err(_)) => Err(ValidationError::immediate(format!("bad {attr}"))),
                None => Err(ValidationError::delayed(format!("missing {attr}"))),
            }
        }

        fn plan(&mut self, ctx: &mut Ctx<'_>) -> Plan {
            if self.panic_on_plan {
                panic!("dom is gone");
            }
            if self.trace_plans {
                self.record(if ctx.is_reload() { "plan:reload" } else { "plan:load" });
            }
            if self.needs_range && self.range.is_none() {
                return Plan::Await(Prerequisite::ask(signals::ASK_FOR_DATE_TIME_RANGE));
            }
            let request = Request::get("http://pulse/probe");
            if ctx.is_reload() {
                Plan::Fetch(ctx.bust_cache(request))
            } else {
                Plan::Fetch(request)
            }
        }

        fn before_reload(&mut self, _ctx: &mut Ctx<'_>) {
            if self.trace_plans {
                self.record("before_reload");
            }
        }

        fn manage_success(&mut self, _ctx: &mut Ctx<'_>, data: &Value) -> Success {
            match data["Value"].as_str() {
                Some("NA") => Success::NotApplicable,
                Some("OLD") => Success::NotAvailable("stale".into()),
                _ => Success::Display,
            }
        }

        fn refresh(&mut self, ctx: &mut Ctx<'_>, data: &Value) {
            self.record(format!("refresh:{}", data["Value"].as_str().unwrap_or("?")));
            if self.stop_after_refresh {
                ctx.stop();
            }
            if self.bad_key_after_refresh {
                ctx.switch_to_key(Key::Transient);
            }
        }

        fn manage_failure(&mut self, _ctx: &mut Ctx<'_>, failure: &FetchError) {
            self.record(format!("failure:{}", failure.as_label()));
        }

        fn manage_not_applicable(&mut self) {
            self.record("not_applicable");
        }

        fn manage_applicable(&mut self) {
            self.record("applicable");
        }

        fn display_error(&mut self, message: &str) {
            self.record(format!("display:{message}"));
        }

        fn remove_error(&mut self) {
            self.record("remove");
        }

        fn attribute_changed(
            &mut self,
            ctx: &mut Ctx<'_>,
            name: &str,
            _old: Option<&str>,
            new: Option<&str>,
        ) {
            self.record(format!("attr:{name}"));
            if let (Some(signal), "group") = (self.follow, name) {
                ctx.resubscribe(signal, new);
                return;
            }
            ctx.start();
        }

        fn on_signal(&mut self, ctx: &mut Ctx<'_>, event: &Event) {
            self.record(format!("signal:{}", event.signal));
            match event.signal.as_ref() {
                signals::DATE_TIME_RANGE_CHANGE => {
                    self.range = Some(event.target.clone());
                    ctx.start();
                }
                signals::SHOW_MESSAGE => ctx.switch_to_context_displaying(
                    Context::NotAvailable,
                    event.target.as_str().unwrap_or_default(),
                ),
                signals::CLEAR_MESSAGE => ctx.switch_to_next_context(),
                _ => {}
            }
        }
    }

    fn runtime(transport: Arc<Scripted>) -> Runtime {
        Runtime::builder(Config::default())
            .with_transport(transport)
            .build()
    }

    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().clone()
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.lock().iter().filter(|e| *e == entry).count()
    }

    async fn state(h: &ComponentHandle) -> StateId {
        h.snapshot().await.unwrap().state
    }

    #[tokio::test(start_paused = true)]
    async fn polls_again_after_the_refresh_rate() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        let h = rt.mount(probe);

        settle().await;
        assert_eq!(entries(&log), vec!["init", "refresh:X"]);
        assert_eq!(state(&h).await, StateId::of(Context::Loaded));
        assert_eq!(transport.calls(), 1);

        time::sleep(Duration::from_secs(9)).await;
        assert_eq!(transport.calls(), 1);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(transport.calls(), 2);
        assert_eq!(count(&log, "refresh:X"), 2);
        assert!(transport.urls.lock()[1].contains("?_="));
    }

    #[tokio::test(start_paused = true)]
    async fn without_refresh_rate_the_component_stays_loaded() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (probe, _log) = Probe::new();
        let h = rt.mount(probe);

        time::sleep(Duration::from_secs(600)).await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Loaded));
        assert!(snap.timers.is_idle());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_attribute_is_displayed_only_after_the_delay() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.require = Some("machine-id");
        probe.observed = &["machine-id"];
        let h = rt.mount(probe);

        settle().await;
        assert_eq!(state(&h).await, StateId::of(Context::ParamValidation));
        assert!(h.snapshot().await.unwrap().timers.delayed_error);

        time::sleep(Duration::from_millis(1900)).await;
        assert_eq!(entries(&log), vec!["init"]);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(entries(&log), vec!["init", "display:missing machine-id"]);

        h.set_attribute("machine-id", Some("3")).unwrap();
        settle().await;
        assert_eq!(
            entries(&log)[2..],
            ["attr:machine-id", "remove", "refresh:X"]
        );
        assert_eq!(h.snapshot().await.unwrap().shown_error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_error_is_dropped_when_validation_recovers_in_time() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.require = Some("machine-id");
        probe.observed = &["machine-id"];
        let h = rt.mount(probe);

        time::sleep(Duration::from_secs(1)).await;
        h.set_attribute("machine-id", Some("7")).unwrap();
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(entries(&log), vec!["init", "attr:machine-id", "refresh:X"]);
        assert!(!h.snapshot().await.unwrap().timers.delayed_error);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_validation_error_is_displayed_and_removed_in_pairs() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.require = Some("machine-id");
        probe.observed = &["machine-id"];
        let h = rt.mount_with(probe, Attributes::new().with("machine-id", "abc"));

        settle().await;
        assert_eq!(
            state(&h).await,
            StateId::new(Context::ParamValidation, Key::Error)
        );
        assert_eq!(entries(&log), vec!["init", "display:bad machine-id"]);

        h.set_attribute("machine-id", Some("4")).unwrap();
        settle().await;
        assert_eq!(state(&h).await, StateId::of(Context::Loaded));
        assert_eq!(count(&log, "display:bad machine-id"), 1);
        assert_eq!(count(&log, "remove"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn double_start_applies_only_the_last_response() {
        let transport = Scripted::slow(Duration::from_secs(5));
        let rt = runtime(Arc::clone(&transport));
        let (probe, log) = Probe::new();
        let h = rt.mount(probe);

        h.start().unwrap();
        h.start().unwrap();
        settle().await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.pending_request, Some(3));

        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(transport.calls(), 3);
        assert_eq!(count(&log, "refresh:X"), 1);
        assert_eq!(state(&h).await, StateId::of(Context::Loaded));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_initialization_is_idempotent() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        probe.follow = Some(signals::MACHINE_ID_CHANGE);
        let h = rt.mount(probe);
        settle().await;
        assert_eq!(h.snapshot().await.unwrap().listeners, 2);

        h.clear_initialization().unwrap();
        let once = h.snapshot().await.unwrap();
        h.clear_initialization().unwrap();
        h.clear_initialization().unwrap();
        let thrice = h.snapshot().await.unwrap();

        assert_eq!(once, thrice);
        assert!(!thrice.initialized);
        assert!(thrice.timers.is_idle());
        assert_eq!(thrice.listeners, 0);
        assert_eq!(thrice.state, StateId::of(Context::Initialization));
        assert_eq!(rt.bus().owned_by(h.scope()), 0);

        h.initialize().unwrap();
        settle().await;
        let again = h.snapshot().await.unwrap();
        assert!(again.initialized);
        assert_eq!(again.listeners, 2);
        assert_eq!(count(&log, "init"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_ignored_until_initialized() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (probe, _log) = Probe::new();
        let h = rt.mount(probe);
        settle().await;

        h.clear_initialization().unwrap();
        h.start().unwrap();
        settle().await;
        assert_eq!(transport.calls(), 1);
        assert_eq!(state(&h).await, StateId::of(Context::Initialization));

        h.reinitialize().unwrap();
        settle().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_widgets_do_not_poll_and_catch_up_when_shown() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, _log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        let h = rt.mount(probe);
        settle().await;

        h.set_visible(false).unwrap();
        time::sleep(Duration::from_secs(35)).await;
        assert_eq!(transport.calls(), 1);
        let snap = h.snapshot().await.unwrap();
        assert!(!snap.visible);
        assert!(snap.timers.poll_due);

        h.set_visible(true).unwrap();
        settle().await;
        assert_eq!(transport.calls(), 2);
        assert!(h.snapshot().await.unwrap().timers.poll);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failures_stay_invisible_during_the_grace_window() {
        let transport = Scripted::new();
        transport.then(Ok(json!({"Value": "X"})));
        for _ in 0..3 {
            transport.then(Err(FetchError::Connect {
                message: "refused".into(),
            }));
        }
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        probe.transient = Some(Duration::from_secs(25));
        let h = rt.mount(probe);

        // failures at 10s, 20s and 30s; the window closes at 35s
        time::sleep(Duration::from_secs(31)).await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::new(Context::Loaded, Key::Transient));
        assert_eq!(snap.shown_error, None);
        assert_eq!(count(&log, "failure:fetch_connect"), 3);

        time::sleep(Duration::from_secs(5)).await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Error));
        assert_eq!(snap.shown_error.as_deref(), Some("connect: refused"));

        // retry at 45s succeeds
        time::sleep(Duration::from_secs(10)).await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Loaded));
        assert_eq!(snap.shown_error, None);
        assert_eq!(count(&log, "display:connect: refused"), 1);
        assert_eq!(count(&log, "remove"), 1);
        assert!(!snap.timers.transient);
    }

    #[tokio::test(start_paused = true)]
    async fn application_error_field_routes_to_error() {
        let transport = Scripted::new();
        transport.then(Ok(json!({"ErrorMessage": "no data for this machine"})));
        let rt = runtime(Arc::clone(&transport));
        let (probe, log) = Probe::new();
        let h = rt.mount(probe);
        settle().await;

        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Error));
        assert_eq!(snap.shown_error.as_deref(), Some("no data for this machine"));
        assert_eq!(count(&log, "refresh:X"), 0);
        // not retried without a refresh rate
        assert!(snap.timers.is_idle());

        h.start().unwrap();
        settle().await;
        assert_eq!(state(&h).await, StateId::of(Context::Loaded));
        assert_eq!(count(&log, "remove"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn not_applicable_and_not_available_are_reversible() {
        let transport = Scripted::new();
        transport.then(Ok(json!({"Value": "NA"})));
        transport.then(Ok(json!({"Value": "OLD"})));
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        let h = rt.mount(probe);
        settle().await;
        assert_eq!(state(&h).await, StateId::of(Context::NotApplicable));

        time::sleep(Duration::from_secs(10)).await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::NotAvailable));
        assert_eq!(snap.shown_error.as_deref(), Some("stale"));

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(state(&h).await, StateId::of(Context::Loaded));
        assert_eq!(
            entries(&log),
            vec![
                "init",
                "not_applicable",
                "applicable",
                "display:stale",
                "refresh:X",
                "remove"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_state_halts_the_component() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.bad_key_after_refresh = true;
        let h = rt.mount(probe);
        let scope = h.scope();

        let err = h.join().await.unwrap_err();
        assert_eq!(
            err,
            LifecycleError::UnknownState {
                context: Context::Load,
                key: Key::Transient
            }
        );
        assert_eq!(rt.bus().owned_by(scope), 0);
        assert_eq!(entries(&log).last().map(String::as_str), Some("clear"));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_prerequisite_is_asked_for_on_the_bus() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let asks = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&asks);
        rt.bus().add_global_event_listener(
            Scope::next(),
            signals::ASK_FOR_DATE_TIME_RANGE,
            move |_| *seen.lock() += 1,
        );

        let (mut probe, log) = Probe::new();
        probe.needs_range = true;
        let h = rt.mount(probe);
        settle().await;

        assert_eq!(*asks.lock(), 1);
        assert_eq!(transport.calls(), 0);
        assert_eq!(state(&h).await, StateId::of(Context::ParamValidation));

        rt.bus()
            .dispatch_to_context(signals::DATE_TIME_RANGE_CHANGE, "A", json!({"daterange": "R"}));
        settle().await;
        assert_eq!(transport.calls(), 1);
        assert_eq!(state(&h).await, StateId::of(Context::Loaded));
        assert!(entries(&log).contains(&"signal:dateTimeRangeChangeEvent".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn group_change_moves_the_subscription() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.follow = Some(signals::MACHINE_ID_CHANGE);
        probe.observed = &["group"];
        let h = rt.mount_with(probe, Attributes::new().with("group", "left"));
        settle().await;

        h.set_attribute("group", Some("right")).unwrap();
        settle().await;
        assert_eq!(h.snapshot().await.unwrap().listeners, 2);

        let bus = rt.bus();
        assert_eq!(bus.dispatch_to_context(signals::MACHINE_ID_CHANGE, "left", json!(1)), 0);
        assert_eq!(bus.dispatch_to_context(signals::MACHINE_ID_CHANGE, "right", json!(2)), 1);
        settle().await;
        assert_eq!(count(&log, "signal:machineIdChangeSignal"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn global_and_contextual_widgets_are_isolated() {
        let rt = runtime(Scripted::new());
        let (mut global, global_log) = Probe::new();
        global.follow_globally = Some(signals::DATE_TIME_RANGE_CHANGE);
        let (mut scoped, scoped_log) = Probe::new();
        scoped.follow = Some(signals::DATE_TIME_RANGE_CHANGE);
        let _g = rt.mount(global);
        let _s = rt.mount_with(scoped, Attributes::new().with("group", "A"));
        settle().await;

        let bus = rt.bus();
        bus.dispatch_to_context(signals::DATE_TIME_RANGE_CHANGE, "A", json!({"daterange": "R"}));
        settle().await;
        assert_eq!(count(&global_log, "signal:dateTimeRangeChangeEvent"), 0);
        assert_eq!(count(&scoped_log, "signal:dateTimeRangeChangeEvent"), 1);

        bus.dispatch_to_all(signals::DATE_TIME_RANGE_CHANGE, json!({"daterange": "R2"}));
        settle().await;
        assert_eq!(count(&global_log, "signal:dateTimeRangeChangeEvent"), 1);
        assert_eq!(count(&scoped_log, "signal:dateTimeRangeChangeEvent"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_polling_until_started() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, _log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        probe.stop_after_refresh = true;
        let h = rt.mount(probe);

        time::sleep(Duration::from_secs(60)).await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Stop));
        assert!(snap.timers.is_idle());
        assert_eq!(transport.calls(), 1);

        h.start().unwrap();
        settle().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn authorization_failures_are_announced_globally() {
        let transport = Scripted::new();
        transport.then(Err(FetchError::Status {
            status: 401,
            message: "unauthorized".into(),
        }));
        let rt = runtime(Arc::clone(&transport));
        let statuses = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&statuses);
        rt.bus().add_global_event_listener(
            Scope::next(),
            signals::AUTHORIZATION_ERROR,
            move |ev| seen.lock().push(ev.target.clone()),
        );

        let (probe, _log) = Probe::new();
        let _h = rt.mount(probe);
        settle().await;
        assert_eq!(*statuses.lock(), vec![json!(401)]);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_tears_down() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        let h = rt.mount(probe);
        settle().await;
        let scope = h.scope();

        h.disconnect();
        h.join().await.unwrap();
        assert_eq!(rt.bus().owned_by(scope), 0);
        assert_eq!(entries(&log).last().map(String::as_str), Some("clear"));
    }

    #[tokio::test(start_paused = true)]
    async fn config_change_restarts_validation() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (probe, _log) = Probe::new();
        let _h = rt.mount(probe);
        settle().await;

        rt.bus()
            .dispatch_to_global_only(signals::CONFIG_CHANGE, json!({"key": "threshold"}));
        settle().await;
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn before_reload_runs_ahead_of_every_reload_only() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        probe.trace_plans = true;
        let _h = rt.mount(probe);

        time::sleep(Duration::from_secs(25)).await;
        let planning: Vec<String> = entries(&log)
            .into_iter()
            .filter(|e| e.starts_with("plan") || e == "before_reload")
            .collect();
        assert_eq!(
            planning,
            vec![
                "plan:load",
                "before_reload",
                "plan:reload",
                "before_reload",
                "plan:reload"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn always_visible_widgets_keep_polling_while_hidden() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, _log) = Probe::new();
        probe.refresh_rate = Some(Duration::from_secs(10));
        probe.always_visible = true;
        let h = rt.mount(probe);
        settle().await;

        h.set_visible(false).unwrap();
        time::sleep(Duration::from_secs(35)).await;
        assert_eq!(transport.calls(), 4);
        let snap = h.snapshot().await.unwrap();
        assert!(snap.visible);
        assert!(!snap.timers.poll_due);
        assert!(snap.timers.poll);
    }

    #[tokio::test(start_paused = true)]
    async fn hooks_can_jump_to_a_displaying_context_and_advance() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, log) = Probe::new();
        probe.page_messages = true;
        let h = rt.mount(probe);
        settle().await;
        assert_eq!(transport.calls(), 1);

        rt.bus()
            .dispatch_to_global_only(signals::SHOW_MESSAGE, json!("maintenance"));
        settle().await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::NotAvailable));
        assert_eq!(snap.shown_error.as_deref(), Some("maintenance"));

        rt.bus()
            .dispatch_to_global_only(signals::CLEAR_MESSAGE, Value::Null);
        settle().await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Loaded));
        assert_eq!(snap.shown_error, None);
        assert_eq!(transport.calls(), 2);
        assert!(transport.urls.lock()[1].contains("?_="));
        assert_eq!(count(&log, "display:maintenance"), 1);
        assert_eq!(count(&log, "remove"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn validation_can_jump_to_the_error_key_with_a_message() {
        let transport = Scripted::new();
        let rt = runtime(Arc::clone(&transport));
        let (mut probe, log) = Probe::new();
        probe.observed = &["mode"];
        let h = rt.mount_with(probe, Attributes::new().with("mode", "manual"));
        settle().await;

        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::new(Context::ParamValidation, Key::Error));
        assert_eq!(snap.shown_error.as_deref(), Some("manual mode"));
        assert_eq!(transport.calls(), 0);

        h.set_attribute("mode", Some("auto")).unwrap();
        settle().await;
        let snap = h.snapshot().await.unwrap();
        assert_eq!(snap.state, StateId::of(Context::Loaded));
        assert_eq!(snap.shown_error, None);
        assert_eq!(
            entries(&log),
            vec!["init", "display:manual mode", "attr:mode", "refresh:X", "remove"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn removing_the_group_moves_the_subscription_to_global() {
        let rt = runtime(Scripted::new());
        let (mut probe, log) = Probe::new();
        probe.follow = Some(signals::MACHINE_ID_CHANGE);
        probe.observed = &["group"];
        let h = rt.mount_with(probe, Attributes::new().with("group", "left"));
        settle().await;

        h.set_attribute("group", None).unwrap();
        settle().await;
        assert_eq!(h.snapshot().await.unwrap().listeners, 2);

        let bus = rt.bus();
        assert_eq!(bus.listener_count(signals::MACHINE_ID_CHANGE), 1);
        assert_eq!(bus.dispatch_to_context(signals::MACHINE_ID_CHANGE, "left", json!(1)), 0);
        assert_eq!(bus.dispatch_to_global_only(signals::MACHINE_ID_CHANGE, json!(2)), 1);
        settle().await;
        assert_eq!(count(&log, "signal:machineIdChangeSignal"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_hook_releases_its_subscriptions() {
        let rt = runtime(Scripted::new());
        let (mut probe, _log) = Probe::new();
        probe.follow = Some(signals::MACHINE_ID_CHANGE);
        probe.panic_on_plan = true;
        let h = rt.mount_with(probe, Attributes::new().with("group", "A"));
        let scope = h.scope();

        assert_eq!(
            h.join().await,
            Err(LifecycleError::Panicked {
                message: "dom is gone".into()
            })
        );
        assert_eq!(rt.bus().owned_by(scope), 0);
        assert_eq!(
            rt.bus()
                .dispatch_to_context(signals::MACHINE_ID_CHANGE, "A", json!(1)),
            0
        );
    }
}
