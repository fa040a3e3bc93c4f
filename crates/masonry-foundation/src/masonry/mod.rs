//! Virtualized masonry engine.
//!
//! Items of unknown height are measured a few at a time off-screen, placed into
//! the currently shortest column, and culled against the viewport of a scroll
//! source. See [`MasonryEngine`] for the frame protocol the host follows.

mod batch_measurer;
mod config;
mod engine;
mod engine_state;
mod error;
mod item;
mod scroll_source;
mod viewport;

pub use batch_measurer::{BatchEntry, BatchMeasurer, MeasureBatch};
pub use config::{
    MasonryConfig, DEFAULT_COLUMN_WIDTH, DEFAULT_MIN_COLUMNS, DEFAULT_OVERSCAN_FACTOR,
    DEFAULT_RESIZE_DEBOUNCE, DEFAULT_SCROLL_THROTTLE,
};
pub use engine::{FrameOutcome, MasonryEngine, MasonryStats};
pub use engine_state::{Effects, EnginePhase, EngineState};
pub use error::MasonryConfigError;
pub use item::{ContainerGeometry, ItemKeyFn, ItemSlot, MasonryHost};
pub use scroll_source::{ScrollSource, ScrollState, ScrollStateData};
pub use viewport::ViewportTracker;
