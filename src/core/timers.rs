//! # Timers owned by one component.
//!
//! A component owns at most three deadlines: the poll timer, the delayed-error
//! timer and the transient-error timer. The actor sleeps until the nearest one;
//! clearing a deadline is the only cancellation mechanism.
//!
//! ## Rules
//! - Arming a timer replaces its previous deadline.
//! - A poll that expires while the widget is hidden is recorded as *due*
//!   and fires as soon as the widget becomes visible.

use tokio::time::Instant;

/// Which timer expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Expired {
    DelayedError(String),
    Transient,
    Poll,
}

/// Armed/disarmed view of a component's timers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmedTimers {
    /// Poll (or retry) timer is armed.
    pub poll: bool,
    /// A poll expired while hidden and waits for visibility.
    pub poll_due: bool,
    /// A delayed error is waiting to be displayed.
    pub delayed_error: bool,
    /// The transient-error grace window is running.
    pub transient: bool,
}

impl ArmedTimers {
    /// `true` if nothing is armed or due.
    pub fn is_idle(&self) -> bool {
        !(self.poll || self.poll_due || self.delayed_error || self.transient)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Timers {
    poll: Option<Instant>,
    poll_due: bool,
    delayed_error: Option<(Instant, String)>,
    transient: Option<Instant>,
}

impl Timers {
    pub(crate) fn arm_poll(&mut self, at: Instant) {
        self.poll = Some(at);
        self.poll_due = false;
    }

    pub(crate) fn disarm_poll(&mut self) {
        self.poll = None;
        self.poll_due = false;
    }

    pub(crate) fn mark_poll_due(&mut self) {
        self.poll = None;
        self.poll_due = true;
    }

    /// Consumes a due poll, if any.
    pub(crate) fn take_poll_due(&mut self) -> bool {
        std::mem::take(&mut self.poll_due)
    }

    pub(crate) fn arm_delayed_error(&mut self, at: Instant, message: String) {
        self.delayed_error = Some((at, message));
    }

    pub(crate) fn delayed_error(&self) -> Option<&str> {
        self.delayed_error.as_ref().map(|(_, msg)| msg.as_str())
    }

    pub(crate) fn disarm_delayed_error(&mut self) {
        self.delayed_error = None;
    }

    pub(crate) fn arm_transient(&mut self, at: Instant) {
        self.transient = Some(at);
    }

    pub(crate) fn disarm_transient(&mut self) {
        self.transient = None;
    }

    pub(crate) fn clear(&mut self) {
        *self = Timers::default();
    }

    /// Nearest armed deadline.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        [
            self.poll,
            self.delayed_error.as_ref().map(|(at, _)| *at),
            self.transient,
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Removes and returns one expired timer; delayed errors first, then the
    /// transient window, then the poll.
    pub(crate) fn pop_expired(&mut self, now: Instant) -> Option<Expired> {
        if self.delayed_error.as_ref().is_some_and(|(at, _)| *at <= now) {
            return self
                .delayed_error
                .take()
                .map(|(_, msg)| Expired::DelayedError(msg));
        }
        if self.transient.is_some_and(|at| at <= now) {
            self.transient = None;
            return Some(Expired::Transient);
        }
        if self.poll.is_some_and(|at| at <= now) {
            self.poll = None;
            return Some(Expired::Poll);
        }
        None
    }

    pub(crate) fn armed(&self) -> ArmedTimers {
        ArmedTimers {
            poll: self.poll.is_some(),
            poll_due: self.poll_due,
            delayed_error: self.delayed_error.is_some(),
            transient: self.transient.is_some(),
        }
    }
}
