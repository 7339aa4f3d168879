//! # Process-wide publish/subscribe registry.
//!
//! [`EventBus`] routes named signals either to listeners scoped to a matching
//! context string or to listeners registered globally. Producers and consumers
//! never hold references to each other.
//!
//! ## Architecture
//! ```text
//! Registry:
//!   contextual: signal ──► context ──► [ {owner, callback}, ... ]   (subscription order)
//!   global:     signal ──────────────► [ {owner, callback}, ... ]
//!
//! dispatch_to_context(S, C) ──► contextual[S][C]
//! dispatch_to_global_only(S) ──► global[S]
//! dispatch_to_all(S)        ──► contextual[S][*] (context order) ──► global[S]
//! ```
//!
//! ## Rules
//! - **Isolation**: a contextual dispatch never reaches global listeners and vice versa.
//! - **Uniqueness**: one entry per (owner, signal, context); re-adding replaces the callback
//!   in place, keeping its position.
//! - **Snapshot dispatch**: the listener list is copied before invocation and the lock is
//!   released, so callbacks may add/remove listeners or dispatch again.
//! - **Panic isolation**: a panicking callback is logged and skipped; the remaining
//!   listeners of the dispatch still run.
//! - **Idempotent removal**: removing a missing subscription is a no-op.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::{trace, warn};

use super::event::{Event, Payload};
use super::scope::Scope;

/// Listener callback type.
pub type Callback = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

#[derive(Clone)]
struct Listener {
    owner: Scope,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    contextual: HashMap<Arc<str>, IndexMap<Arc<str>, Vec<Listener>>>,
    global: HashMap<Arc<str>, Vec<Listener>>,
}

impl Registry {
    fn upsert(list: &mut Vec<Listener>, owner: Scope, callback: Callback) {
        match list.iter_mut().find(|l| l.owner == owner) {
            Some(existing) => existing.callback = callback,
            None => list.push(Listener { owner, callback }),
        }
    }

    fn remove_signal(&mut self, owner: Scope, signal: &str) {
        if let Some(contexts) = self.contextual.get_mut(signal) {
            for list in contexts.values_mut() {
                list.retain(|l| l.owner != owner);
            }
            contexts.retain(|_, list| !list.is_empty());
            if contexts.is_empty() {
                self.contextual.remove(signal);
            }
        }
        if let Some(list) = self.global.get_mut(signal) {
            list.retain(|l| l.owner != owner);
            if list.is_empty() {
                self.global.remove(signal);
            }
        }
    }

    fn signals(&self) -> Vec<Arc<str>> {
        let mut out: Vec<Arc<str>> = self.contextual.keys().cloned().collect();
        for s in self.global.keys() {
            if !self.contextual.contains_key(s) {
                out.push(Arc::clone(s));
            }
        }
        out
    }
}

/// Shared publish/subscribe registry.
///
/// Cheap to clone (internally an `Arc`); every clone sees the same registry.
/// Construct one per page (or per test) and hand it to the runtime.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reg = self.registry.lock();
        f.debug_struct("EventBus")
            .field("contextual_signals", &reg.contextual.len())
            .field("global_signals", &reg.global.len())
            .finish()
    }
}

impl EventBus {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to `signal` restricted to `context`.
    ///
    /// Several owners may share one (signal, context). If `owner` already listens
    /// to this (signal, context) the callback is replaced.
    pub fn add_event_listener<F>(&self, owner: Scope, signal: &str, context: &str, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut reg = self.registry.lock();
        let list = reg
            .contextual
            .entry(Arc::from(signal))
            .or_default()
            .entry(Arc::from(context))
            .or_default();
        Registry::upsert(list, owner, Arc::new(callback));
        trace!(%owner, signal, context, "listener added");
    }

    /// Subscribes `callback` to `signal` for global dispatches.
    ///
    /// Global listeners are never reached by [`dispatch_to_context`](Self::dispatch_to_context).
    pub fn add_global_event_listener<F>(&self, owner: Scope, signal: &str, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let mut reg = self.registry.lock();
        let list = reg.global.entry(Arc::from(signal)).or_default();
        Registry::upsert(list, owner, Arc::new(callback));
        trace!(%owner, signal, "global listener added");
    }

    /// Removes every subscription (contextual and global) `owner` holds for `signal`.
    pub fn remove_listener_by_signal(&self, owner: Scope, signal: &str) {
        self.registry.lock().remove_signal(owner, signal);
    }

    /// Removes every subscription `owner` holds, for every signal.
    pub fn remove_listener_by_scope(&self, owner: Scope) {
        let mut reg = self.registry.lock();
        for signal in reg.signals() {
            reg.remove_signal(owner, &signal);
        }
    }

    /// Invokes the listeners of (`signal`, `context`) in subscription order.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch_to_context(
        &self,
        signal: &str,
        context: &str,
        payload: impl Into<Payload>,
    ) -> usize {
        let snapshot: Vec<Callback> = {
            let reg = self.registry.lock();
            reg.contextual
                .get(signal)
                .and_then(|contexts| contexts.get(context))
                .map(|list| list.iter().map(|l| Arc::clone(&l.callback)).collect())
                .unwrap_or_default()
        };
        let ev = Event::from_payload(signal, Some(context), payload.into());
        invoke(&snapshot, &ev)
    }

    /// Invokes only the global listeners of `signal`.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch_to_global_only(&self, signal: &str, payload: impl Into<Payload>) -> usize {
        let snapshot: Vec<Callback> = {
            let reg = self.registry.lock();
            reg.global
                .get(signal)
                .map(|list| list.iter().map(|l| Arc::clone(&l.callback)).collect())
                .unwrap_or_default()
        };
        let ev = Event::from_payload(signal, None, payload.into());
        invoke(&snapshot, &ev)
    }

    /// Invokes every contextual listener of `signal` (contexts in first-subscription
    /// order), then every global listener.
    ///
    /// Returns the number of callbacks invoked.
    pub fn dispatch_to_all(&self, signal: &str, payload: impl Into<Payload>) -> usize {
        let (groups, global): (Vec<(Arc<str>, Vec<Callback>)>, Vec<Callback>) = {
            let reg = self.registry.lock();
            let groups = reg
                .contextual
                .get(signal)
                .map(|contexts| {
                    contexts
                        .iter()
                        .map(|(ctx, list)| {
                            (
                                Arc::clone(ctx),
                                list.iter().map(|l| Arc::clone(&l.callback)).collect(),
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            let global = reg
                .global
                .get(signal)
                .map(|list| list.iter().map(|l| Arc::clone(&l.callback)).collect())
                .unwrap_or_default();
            (groups, global)
        };

        let ev = Event::from_payload(signal, None, payload.into());
        let mut invoked = 0;
        for (ctx, callbacks) in &groups {
            invoked += invoke(callbacks, &ev.readdressed(Some(ctx)));
        }
        invoked + invoke(&global, &ev)
    }

    /// Number of live subscriptions (contextual and global) for `signal`.
    pub fn listener_count(&self, signal: &str) -> usize {
        let reg = self.registry.lock();
        let contextual: usize = reg
            .contextual
            .get(signal)
            .map(|contexts| contexts.values().map(Vec::len).sum())
            .unwrap_or(0);
        contextual + reg.global.get(signal).map(Vec::len).unwrap_or(0)
    }

    /// Number of live subscriptions held by `owner`, across all signals.
    pub fn owned_by(&self, owner: Scope) -> usize {
        let reg = self.registry.lock();
        let contextual: usize = reg
            .contextual
            .values()
            .flat_map(|contexts| contexts.values())
            .map(|list| list.iter().filter(|l| l.owner == owner).count())
            .sum();
        let global: usize = reg
            .global
            .values()
            .map(|list| list.iter().filter(|l| l.owner == owner).count())
            .sum();
        contextual + global
    }
}

fn invoke(callbacks: &[Callback], ev: &Event) -> usize {
    for cb in callbacks {
        if let Err(panic_err) = catch_unwind(AssertUnwindSafe(|| cb(ev))) {
            let info = if let Some(msg) = panic_err.downcast_ref::<&'static str>() {
                (*msg).to_string()
            } else if let Some(msg) = panic_err.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            warn!(signal = %ev.signal, context = ?ev.context, info, "listener panicked");
        }
    }
    callbacks.len()
}
