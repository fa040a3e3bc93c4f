//! Layout contracts for masonry grids.
//!
//! - [`MeasurementCache`] - measured item heights keyed by item key
//! - [`ColumnGeometry`] - column count and widths for a container width
//! - [`solve_layout`] / [`solve_positions`] - greedy column-balancing solver
//!
//! Nothing in this crate schedules work or talks to a host; the engine in
//! `masonry-foundation` drives it.

mod geometry;
mod measurement_cache;
mod solver;

pub use geometry::{ColumnGeometry, ColumnSpec, Position};
pub use measurement_cache::MeasurementCache;
pub use solver::{
    shortest_column, solve_layout, solve_positions, ColumnHeights, LayoutResult, LayoutStrategy,
};
