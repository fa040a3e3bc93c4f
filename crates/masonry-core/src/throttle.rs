//! Rate limiting for high-frequency events such as native scroll callbacks.

use web_time::{Duration, Instant};

use crate::cancellation::CancellationToken;
use crate::clock::Clock;

/// Lets at most one value through per `quantum`.
///
/// Calls only record the latest value; delivery happens in [`poll`](Throttle::poll),
/// outside the triggering event. The first poll after an idle period delivers
/// immediately, later ones wait until a full quantum has passed since the last
/// delivery. The newest value always wins, so the trailing event is never lost.
#[derive(Debug)]
pub struct Throttle<T, C: Clock> {
    clock: C,
    quantum: Duration,
    last_fired: Option<Instant>,
    pending: Option<T>,
    token: CancellationToken,
}

impl<T, C: Clock> Throttle<T, C> {
    pub fn new(clock: C, quantum: Duration, token: CancellationToken) -> Self {
        Self {
            clock,
            quantum,
            last_fired: None,
            pending: None,
            token,
        }
    }

    pub fn quantum(&self) -> Duration {
        self.quantum
    }

    pub fn call(&mut self, value: T) {
        if self.token.is_cancelled() {
            return;
        }
        self.pending = Some(value);
    }

    pub fn poll(&mut self) -> Option<T> {
        if self.token.is_cancelled() {
            self.pending = None;
            return None;
        }
        self.pending.as_ref()?;
        let now = self.clock.now();
        let ready = self
            .last_fired
            .map_or(true, |last| now.saturating_duration_since(last) >= self.quantum);
        if !ready {
            return None;
        }
        self.last_fired = Some(now);
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some() && !self.token.is_cancelled()
    }

    /// Earliest instant at which a pending value can be delivered.
    pub fn next_delivery(&self) -> Option<Instant> {
        self.pending.as_ref()?;
        Some(match self.last_fired {
            Some(last) => last + self.quantum,
            None => self.clock.now(),
        })
    }
}
