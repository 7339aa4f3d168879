//! # Hook context
//!
//! [`Ctx`] is the only handle a widget has on its component while a hook runs.
//! Transition requests are recorded and applied by the engine once the hook
//! returns; when a hook issues several, the last one wins.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::core::listeners::{Binding, Listeners};
use crate::core::{Context, Key, StateId};
use crate::events::{EventBus, Scope};
use crate::transport::Request;
use crate::widget::Attributes;

/// Transition requested from a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    /// Direct jump, with an optional error message bound to the target state.
    Switch(StateId, Option<String>),
    /// One step along the context sequence.
    Next,
    /// Full restart from `ParamValidation`.
    Start,
}

/// Side effects collected while a hook ran.
#[derive(Debug, Default)]
pub(crate) struct Effects {
    pub(crate) directive: Option<Directive>,
    pub(crate) delayed_error: Option<String>,
}

/// Context handed to [`Widget`](crate::Widget) hooks.
pub struct Ctx<'a> {
    name: &'a str,
    state: StateId,
    attributes: &'a Attributes,
    listeners: &'a mut Listeners,
    cache_buster: &'a str,
    effects: Effects,
}

impl<'a> Ctx<'a> {
    pub(crate) fn new(
        name: &'a str,
        state: StateId,
        attributes: &'a Attributes,
        listeners: &'a mut Listeners,
        cache_buster: &'a str,
    ) -> Self {
        Self {
            name,
            state,
            attributes,
            listeners,
            cache_buster,
            effects: Effects::default(),
        }
    }

    pub(crate) fn into_effects(self) -> Effects {
        self.effects
    }

    /// Component name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// State the component is in while the hook runs.
    pub fn state(&self) -> StateId {
        self.state
    }

    /// `true` while entering `Reload`.
    pub fn is_reload(&self) -> bool {
        self.state.context == Context::Reload
    }

    /// Current attributes.
    pub fn attributes(&self) -> &Attributes {
        self.attributes
    }

    /// Shorthand for `attributes().get(name)`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// The page event bus, for dispatching.
    pub fn bus(&self) -> &EventBus {
        self.listeners.bus()
    }

    /// Owner scope of this component's subscriptions.
    pub fn scope(&self) -> Scope {
        self.listeners.scope()
    }

    /// Listens to `signal` in `context`, replacing any previous subscription of
    /// this component to `signal`.
    pub fn listen(&mut self, signal: &str, context: &str) {
        self.listeners.listen(signal, context);
    }

    /// Listens to global dispatches of `signal`, replacing any previous
    /// subscription of this component to `signal`.
    pub fn listen_global(&mut self, signal: &str) {
        self.listeners.listen_global(signal);
    }

    /// Moves the subscription to `signal` under `context` (`None` = global),
    /// removing the previous one first.
    pub fn resubscribe(&mut self, signal: &str, context: Option<&str>) {
        match context {
            Some(context) => self.listen(signal, context),
            None => self.listen_global(signal),
        }
    }

    /// Drops the subscription to `signal`, if any.
    pub fn forget(&mut self, signal: &str) {
        self.listeners.forget(signal);
    }

    /// Current subscription to `signal`.
    pub fn binding(&self, signal: &str) -> Option<&Binding> {
        self.listeners.binding(signal)
    }

    /// Re-enters `ParamValidation` once the hook returns.
    pub fn start(&mut self) {
        self.effects.directive = Some(Directive::Start);
    }

    /// Displays `message` after the delay rate, unless the component leaves the
    /// current context or validation succeeds first.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.effects.delayed_error = Some(message.into());
    }

    /// Jumps to `key` within the current context.
    pub fn switch_to_key(&mut self, key: Key) {
        self.effects.directive = Some(Directive::Switch(
            StateId::new(self.state.context, key),
            None,
        ));
    }

    /// Jumps to `key` within the current context, displaying `message` while there.
    pub fn switch_to_key_displaying(&mut self, key: Key, message: impl Into<String>) {
        self.effects.directive = Some(Directive::Switch(
            StateId::new(self.state.context, key),
            Some(message.into()),
        ));
    }

    /// Jumps to the `Default` key of `context`.
    pub fn switch_to_context(&mut self, context: Context) {
        self.effects.directive = Some(Directive::Switch(StateId::of(context), None));
    }

    /// Jumps to the `Default` key of `context`, displaying `message` while there.
    pub fn switch_to_context_displaying(&mut self, context: Context, message: impl Into<String>) {
        self.effects.directive = Some(Directive::Switch(
            StateId::of(context),
            Some(message.into()),
        ));
    }

    /// Advances one step along the context sequence.
    pub fn switch_to_next_context(&mut self) {
        self.effects.directive = Some(Directive::Next);
    }

    /// Halts polling until started again.
    pub fn stop(&mut self) {
        self.switch_to_context(Context::Stop);
    }

    /// Appends the configured cache-busting parameter to `request`.
    pub fn bust_cache(&self, request: Request) -> Request {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        request.bust_cache(self.cache_buster, stamp)
    }
}
