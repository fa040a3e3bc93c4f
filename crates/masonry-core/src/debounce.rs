//! Trailing-edge debounce.

use web_time::{Duration, Instant};

use crate::cancellation::CancellationToken;
use crate::clock::Clock;

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    value: T,
}

/// Coalesces a burst of calls into the last one.
///
/// Each [`call`](Debounce::call) replaces the pending value and pushes the deadline
/// to `now + delay`. [`poll`](Debounce::poll) hands the value out once the deadline
/// has passed without a newer call. Nothing runs from inside `call`; the owner polls
/// from its own scheduling point (for the engine, the start of a frame).
#[derive(Debug)]
pub struct Debounce<T, C: Clock> {
    clock: C,
    delay: Duration,
    pending: Option<Pending<T>>,
    token: CancellationToken,
}

impl<T, C: Clock> Debounce<T, C> {
    pub fn new(clock: C, delay: Duration, token: CancellationToken) -> Self {
        Self {
            clock,
            delay,
            pending: None,
            token,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Records `value`, restarting the delay window. Ignored after cancellation.
    pub fn call(&mut self, value: T) {
        if self.token.is_cancelled() {
            return;
        }
        self.pending = Some(Pending {
            deadline: self.clock.now() + self.delay,
            value,
        });
    }

    /// Returns the coalesced value if its delay window has elapsed.
    pub fn poll(&mut self) -> Option<T> {
        if self.token.is_cancelled() {
            self.pending = None;
            return None;
        }
        let due = self
            .pending
            .as_ref()
            .is_some_and(|pending| self.clock.now() >= pending.deadline);
        if due {
            self.pending.take().map(|pending| pending.value)
        } else {
            None
        }
    }

    /// Fires immediately, ignoring the remaining delay.
    pub fn flush(&mut self) -> Option<T> {
        if self.token.is_cancelled() {
            self.pending = None;
            return None;
        }
        self.pending.take().map(|pending| pending.value)
    }

    /// Drops the pending value without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some() && !self.token.is_cancelled()
    }

    /// Instant at which the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }
}
