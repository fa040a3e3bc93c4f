use std::cell::Cell;
use std::rc::Rc;

/// Shared cancellation flag.
///
/// Every scheduling wrapper owned by an engine holds a clone of the same token, so
/// a single [`cancel`](CancellationToken::cancel) on teardown stops all pending
/// debounced, throttled and frame-queued work. Cancellation is permanent.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
