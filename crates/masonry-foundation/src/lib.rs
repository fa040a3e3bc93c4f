//! Virtualized masonry layouts.
//!
//! The [`masonry`] module holds the engine that turns a stream of items with
//! unknown heights into positioned, viewport-culled render slots.

pub mod masonry;

pub use masonry_layout::{ColumnSpec, LayoutStrategy, MeasurementCache, Position};
