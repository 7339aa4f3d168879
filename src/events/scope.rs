use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static SCOPE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Owner of event bus subscriptions.
///
/// Every component gets its own scope at mount; bulk removal
/// ([`EventBus::remove_listener_by_scope`](crate::EventBus::remove_listener_by_scope))
/// is keyed by it. Scopes are never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(u64);

impl Scope {
    /// Allocates a fresh scope.
    pub fn next() -> Self {
        Scope(SCOPE_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw id (for logs).
    #[inline]
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}
