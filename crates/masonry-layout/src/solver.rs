//! Greedy column-balancing position solver.
//!
//! Positions are derived from the measurement cache alone, so solving is a pure
//! function of `(keys, cache, spec, strategy, width)`. Items without a cached height
//! get the unresolved sentinel and never advance a column, which keeps every
//! already-placed item where it was when more items arrive: placements are
//! append-stable as long as earlier heights do not change.

use std::hash::Hash;

use smallvec::SmallVec;

use crate::geometry::{ColumnGeometry, ColumnSpec, Position};
use crate::measurement_cache::MeasurementCache;

/// How measured items are distributed over the columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// Columns stretch to the container; each item goes to the shortest column.
    #[default]
    Basic,
    /// Fixed-width columns centred in the container; each item goes to the
    /// shortest column and the gutter also separates stacked items.
    BasicCentered,
    /// Items fill rows left to right; a row is as tall as its tallest item.
    UniformRow,
}

impl LayoutStrategy {
    pub fn geometry(self, width: f32, spec: &ColumnSpec) -> ColumnGeometry {
        match self {
            LayoutStrategy::Basic | LayoutStrategy::UniformRow => {
                ColumnGeometry::flexible(width, spec)
            }
            LayoutStrategy::BasicCentered => ColumnGeometry::centered(width, spec),
        }
    }
}

pub type ColumnHeights = SmallVec<[f32; 8]>;

/// Output of a full solve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutResult {
    /// One entry per input key, in input order.
    pub positions: Vec<Position>,
    /// Final running height of every column. Empty when the width is unknown.
    pub column_heights: ColumnHeights,
    /// Column layout used for the solve. `None` when the width is unknown.
    pub geometry: Option<ColumnGeometry>,
}

impl LayoutResult {
    /// Height of the tallest column.
    pub fn content_height(&self) -> f32 {
        self.column_heights.iter().copied().fold(0.0, f32::max)
    }

    pub fn resolved_count(&self) -> usize {
        self.positions.iter().filter(|p| p.is_resolved()).count()
    }
}

/// Solves positions with the [`LayoutStrategy::Basic`] strategy.
pub fn solve_positions<K: Hash + Eq>(
    keys: &[K],
    cache: &MeasurementCache<K>,
    spec: &ColumnSpec,
    width: Option<f32>,
) -> Vec<Position> {
    solve_layout(keys, cache, spec, LayoutStrategy::Basic, width).positions
}

/// Solves positions for every key.
///
/// With an unknown `width` every entry is the unresolved sentinel carrying the
/// ideal column width and no column math is performed.
pub fn solve_layout<K: Hash + Eq>(
    keys: &[K],
    cache: &MeasurementCache<K>,
    spec: &ColumnSpec,
    strategy: LayoutStrategy,
    width: Option<f32>,
) -> LayoutResult {
    let Some(width) = width else {
        return LayoutResult {
            positions: vec![Position::unresolved(spec.ideal_column_width); keys.len()],
            column_heights: ColumnHeights::new(),
            geometry: None,
        };
    };

    let geometry = strategy.geometry(width, spec);
    let mut column_heights: ColumnHeights = SmallVec::from_elem(0.0, geometry.column_count);
    let positions = match strategy {
        LayoutStrategy::Basic => {
            place_shortest_column(keys, cache, &geometry, 0.0, &mut column_heights)
        }
        LayoutStrategy::BasicCentered => {
            place_shortest_column(keys, cache, &geometry, spec.gutter, &mut column_heights)
        }
        LayoutStrategy::UniformRow => {
            place_rows(keys, cache, &geometry, spec.gutter, &mut column_heights)
        }
    };

    LayoutResult {
        positions,
        column_heights,
        geometry: Some(geometry),
    }
}

/// Index of the shortest column; the lowest index wins ties.
pub fn shortest_column(heights: &[f32]) -> usize {
    let mut best = 0;
    for (index, &height) in heights.iter().enumerate().skip(1) {
        if height < heights[best] {
            best = index;
        }
    }
    best
}

fn place_shortest_column<K: Hash + Eq>(
    keys: &[K],
    cache: &MeasurementCache<K>,
    geometry: &ColumnGeometry,
    vertical_gutter: f32,
    heights: &mut ColumnHeights,
) -> Vec<Position> {
    keys.iter()
        .map(|key| {
            let Some(height) = cache.get(key) else {
                return Position::unresolved(geometry.item_width);
            };
            let column = shortest_column(heights);
            let top = heights[column];
            heights[column] += height + vertical_gutter;
            Position::new(top, geometry.column_left(column), geometry.item_width, height)
        })
        .collect()
}

fn place_rows<K: Hash + Eq>(
    keys: &[K],
    cache: &MeasurementCache<K>,
    geometry: &ColumnGeometry,
    gutter: f32,
    heights: &mut ColumnHeights,
) -> Vec<Position> {
    let mut slot = 0usize;
    let mut row_top = 0.0f32;
    let mut row_height = 0.0f32;
    keys.iter()
        .map(|key| {
            let Some(height) = cache.get(key) else {
                return Position::unresolved(geometry.item_width);
            };
            let column = slot % geometry.column_count;
            if column == 0 && slot > 0 {
                row_top += row_height + gutter;
                row_height = 0.0;
            }
            slot += 1;
            row_height = row_height.max(height);
            heights[column] = row_top + height;
            Position::new(row_top, geometry.column_left(column), geometry.item_width, height)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache_with(heights: &[(u64, f32)]) -> MeasurementCache {
        let mut cache = MeasurementCache::new();
        for &(key, height) in heights {
            cache.set(key, height);
        }
        cache
    }

    #[test]
    fn test_empty_input() {
        let cache = MeasurementCache::new();
        let spec = ColumnSpec::default();
        assert!(solve_positions::<u64>(&[], &cache, &spec, Some(800.0)).is_empty());
        assert!(solve_positions::<u64>(&[], &cache, &spec, None).is_empty());
    }

    #[test]
    fn test_unknown_width_yields_sentinels() {
        let cache = cache_with(&[(0, 100.0), (1, 50.0)]);
        let spec = ColumnSpec::default();

        let result = solve_layout(&[0, 1], &cache, &spec, LayoutStrategy::Basic, None);

        assert_eq!(result.positions.len(), 2);
        assert!(result.positions.iter().all(|p| !p.is_resolved()));
        assert!(result.geometry.is_none());
        assert!(result.column_heights.is_empty());
    }

    #[test]
    fn test_two_column_pack() {
        let cache = cache_with(&[(0, 100.0), (1, 50.0), (2, 80.0)]);
        let spec = ColumnSpec::new(100.0, 0.0, 2);

        let result = solve_layout(&[0, 1, 2], &cache, &spec, LayoutStrategy::Basic, Some(200.0));

        assert_eq!(result.positions[0], Position::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(result.positions[1], Position::new(0.0, 100.0, 100.0, 50.0));
        assert_eq!(result.positions[2], Position::new(50.0, 100.0, 100.0, 80.0));
        assert_eq!(result.column_heights.as_slice(), &[100.0, 130.0]);
        assert_eq!(result.content_height(), 130.0);
    }

    #[test]
    fn test_gutter_insets_items_horizontally_only() {
        let cache = cache_with(&[(0, 40.0), (1, 40.0), (2, 40.0)]);
        let spec = ColumnSpec::new(100.0, 10.0, 2);

        // guess = 2, (200 - 20) / 100 = 1.8 -> 1, floored to min_columns = 2
        let positions = solve_positions(&[0, 1, 2], &cache, &spec, Some(200.0));

        assert_eq!(positions[0], Position::new(0.0, 5.0, 90.0, 40.0));
        assert_eq!(positions[1], Position::new(0.0, 105.0, 90.0, 40.0));
        assert_eq!(positions[2], Position::new(40.0, 5.0, 90.0, 40.0));
    }

    #[test]
    fn test_unmeasured_items_do_not_advance_columns() {
        let cache = cache_with(&[(0, 100.0), (2, 30.0)]);
        let spec = ColumnSpec::new(100.0, 0.0, 2);

        let positions = solve_positions(&[0, 1, 2], &cache, &spec, Some(200.0));

        assert!(!positions[1].is_resolved());
        assert_eq!(positions[1].width, 100.0);
        assert_eq!(positions[2], Position::new(0.0, 100.0, 100.0, 30.0));
    }

    #[test]
    fn test_tie_break_prefers_lowest_column() {
        assert_eq!(shortest_column(&[10.0, 10.0, 10.0]), 0);
        assert_eq!(shortest_column(&[20.0, 10.0, 10.0]), 1);
        assert_eq!(shortest_column(&[5.0]), 0);
    }

    #[test]
    fn test_solve_is_deterministic() {
        let heights: Vec<(u64, f32)> = (0..40).map(|i| (i, ((i * 37) % 200) as f32)).collect();
        let cache = cache_with(&heights);
        let keys: Vec<u64> = heights.iter().map(|(k, _)| *k).collect();
        let spec = ColumnSpec::new(120.0, 8.0, 3);

        let first = solve_layout(&keys, &cache, &spec, LayoutStrategy::Basic, Some(777.0));
        let second = solve_layout(&keys, &cache, &spec, LayoutStrategy::Basic, Some(777.0));

        assert_eq!(first, second);
    }

    #[test]
    fn test_column_balance_bound() {
        let heights: Vec<(u64, f32)> = (0..200)
            .map(|i| (i, 20.0 + ((i * 7919) % 331) as f32))
            .collect();
        let cache = cache_with(&heights);
        let keys: Vec<u64> = heights.iter().map(|(k, _)| *k).collect();
        let spec = ColumnSpec::new(150.0, 0.0, 3);
        let tallest = heights.iter().map(|(_, h)| *h).fold(0.0, f32::max);

        let result = solve_layout(&keys, &cache, &spec, LayoutStrategy::Basic, Some(1000.0));
        let max = result.content_height();
        let min = result.column_heights.iter().copied().fold(f32::INFINITY, f32::min);

        assert!(max - min <= tallest);
    }

    #[test]
    fn test_appending_items_keeps_earlier_positions() {
        let heights: Vec<(u64, f32)> = (0..30).map(|i| (i, 30.0 + (i % 5) as f32 * 25.0)).collect();
        let cache = cache_with(&heights);
        let keys: Vec<u64> = heights.iter().map(|(k, _)| *k).collect();
        let spec = ColumnSpec::new(200.0, 4.0, 3);

        let partial = solve_positions(&keys[..12], &cache, &spec, Some(900.0));
        let full = solve_positions(&keys, &cache, &spec, Some(900.0));

        assert_eq!(partial.as_slice(), &full[..12]);
    }

    #[test]
    fn test_zero_height_item_is_placed() {
        let cache = cache_with(&[(0, 0.0), (1, 10.0)]);
        let spec = ColumnSpec::new(100.0, 0.0, 2);

        let positions = solve_positions(&[0, 1], &cache, &spec, Some(200.0));

        assert_eq!(positions[0], Position::new(0.0, 0.0, 100.0, 0.0));
        assert_eq!(positions[1], Position::new(0.0, 100.0, 100.0, 10.0));
    }

    #[test]
    fn test_basic_centered_adds_vertical_gutter() {
        let cache = cache_with(&[(0, 50.0), (1, 50.0), (2, 20.0)]);
        let spec = ColumnSpec::new(100.0, 10.0, 2);

        // 2 columns of stride 110 in 300px: block = 210, offset = 45
        let result = solve_layout(
            &[0, 1, 2],
            &cache,
            &spec,
            LayoutStrategy::BasicCentered,
            Some(300.0),
        );

        assert_eq!(result.positions[0], Position::new(0.0, 45.0, 100.0, 50.0));
        assert_eq!(result.positions[1], Position::new(0.0, 155.0, 100.0, 50.0));
        assert_eq!(result.positions[2], Position::new(60.0, 45.0, 100.0, 20.0));
    }

    #[test]
    fn test_uniform_row_aligns_rows() {
        let cache = cache_with(&[(0, 30.0), (1, 80.0), (2, 50.0), (3, 10.0)]);
        let spec = ColumnSpec::new(100.0, 0.0, 3);

        let result = solve_layout(
            &[0, 1, 2, 3],
            &cache,
            &spec,
            LayoutStrategy::UniformRow,
            Some(300.0),
        );

        assert_eq!(result.positions[0].top, 0.0);
        assert_eq!(result.positions[1].top, 0.0);
        assert_eq!(result.positions[2].top, 0.0);
        assert_eq!(result.positions[3], Position::new(80.0, 0.0, 100.0, 10.0));
        assert_eq!(result.content_height(), 90.0);
    }

    #[test]
    fn test_uniform_row_skips_unmeasured_slots() {
        let cache = cache_with(&[(0, 30.0), (2, 40.0)]);
        let spec = ColumnSpec::new(100.0, 0.0, 2);

        let positions = solve_layout(
            &[0, 1, 2],
            &cache,
            &spec,
            LayoutStrategy::UniformRow,
            Some(200.0),
        )
        .positions;

        assert!(!positions[1].is_resolved());
        assert_eq!(positions[2], Position::new(0.0, 100.0, 100.0, 40.0));
    }
}
