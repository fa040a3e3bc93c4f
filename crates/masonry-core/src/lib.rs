//! Runtime primitives for the masonry layout engine.
//!
//! Everything here is single-threaded and cooperative: nothing fires on its own.
//! Owners poll debounces and throttles and drain the frame queue from the host's
//! frame callback, which keeps ordering deterministic and makes teardown a matter
//! of cancelling one [`CancellationToken`].

mod cancellation;
mod clock;
pub mod collections;
mod debounce;
mod frame_queue;
mod throttle;

pub use cancellation::CancellationToken;
pub use clock::{Clock, FrameClock, SystemClock};
pub use debounce::Debounce;
pub use frame_queue::{FrameQueue, TaskHandle};
pub use throttle::Throttle;

pub use web_time::{Duration, Instant};
