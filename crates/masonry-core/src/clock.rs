//! Time sources for the scheduling wrappers.
//!
//! [`SystemClock`] reads wall time through `web-time`, so it works on native and
//! wasm hosts alike. [`FrameClock`] is advanced by the host, usually once per frame
//! with the frame timestamp, which keeps debounce and throttle decisions aligned
//! with the frames the host actually paints.

use std::cell::Cell;
use std::rc::Rc;

use web_time::{Duration, Instant};

/// A source of monotonic instants.
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Host-driven clock.
///
/// Clones share the same underlying instant, so a host can hand one clone to the
/// engine and keep another to advance.
#[derive(Clone, Debug)]
pub struct FrameClock {
    now: Rc<Cell<Instant>>,
}

impl FrameClock {
    /// Creates a clock starting at the current wall time.
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Sets the clock to `instant`. Instants earlier than the current time are ignored.
    pub fn set(&self, instant: Instant) {
        if instant > self.now.get() {
            self.now.set(instant);
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
