//! # Event bus subscriptions owned by one component.
//!
//! Each signal has at most one live subscription per component, tracked as a
//! [`Binding`]. Changing the binding removes the old subscription before adding
//! the new one, so the two are never held at the same time.
//!
//! Listener callbacks do no work themselves: they forward the event to the
//! owning actor as a command, so widget hooks only ever run on the actor.

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::core::command::Command;
use crate::events::{Event, EventBus, Scope};

/// Current subscription of a component for one signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Contextual subscription.
    Context(String),
    /// Global subscription.
    Global,
}

pub(crate) struct Listeners {
    bus: EventBus,
    scope: Scope,
    tx: mpsc::UnboundedSender<Command>,
    bindings: HashMap<String, Binding>,
}

impl Listeners {
    pub(crate) fn new(bus: EventBus, scope: Scope, tx: mpsc::UnboundedSender<Command>) -> Self {
        Self {
            bus,
            scope,
            tx,
            bindings: HashMap::new(),
        }
    }

    pub(crate) fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub(crate) fn scope(&self) -> Scope {
        self.scope
    }

    pub(crate) fn listen(&mut self, signal: &str, context: &str) {
        self.bind(signal, Binding::Context(context.to_string()));
    }

    pub(crate) fn listen_global(&mut self, signal: &str) {
        self.bind(signal, Binding::Global);
    }

    pub(crate) fn forget(&mut self, signal: &str) {
        if self.bindings.remove(signal).is_some() {
            self.bus.remove_listener_by_signal(self.scope, signal);
        }
    }

    pub(crate) fn binding(&self, signal: &str) -> Option<&Binding> {
        self.bindings.get(signal)
    }

    /// Removes every subscription of the scope, tracked or not.
    pub(crate) fn clear(&mut self) {
        self.bindings.clear();
        self.bus.remove_listener_by_scope(self.scope);
    }

    pub(crate) fn live(&self) -> usize {
        self.bus.owned_by(self.scope)
    }

    fn bind(&mut self, signal: &str, binding: Binding) {
        if self.bindings.get(signal) == Some(&binding) {
            return;
        }
        self.bus.remove_listener_by_signal(self.scope, signal);

        let tx = self.tx.clone();
        let forward = move |ev: &Event| {
            let _ = tx.send(Command::Signal(ev.clone()));
        };
        match &binding {
            Binding::Context(context) => {
                self.bus
                    .add_event_listener(self.scope, signal, context, forward)
            }
            Binding::Global => self.bus.add_global_event_listener(self.scope, signal, forward),
        }
        self.bindings.insert(signal.to_string(), binding);
    }
}

impl Drop for Listeners {
    /// Unwinding out of a widget hook skips teardown; the scope is released here.
    fn drop(&mut self) {
        self.bus.remove_listener_by_scope(self.scope);
    }
}
