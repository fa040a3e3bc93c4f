//! Engine configuration.

use masonry_layout::{ColumnSpec, LayoutStrategy};
use web_time::Duration;

use super::error::MasonryConfigError;

/// Default ideal column width.
pub const DEFAULT_COLUMN_WIDTH: f32 = 228.0;

/// Default column floor, also the per-frame measurement batch size.
pub const DEFAULT_MIN_COLUMNS: usize = 3;

/// Default overscan: one extra viewport above and below.
pub const DEFAULT_OVERSCAN_FACTOR: f32 = 1.0;

/// Quiet period after the last resize event before the layout reflows.
pub const DEFAULT_RESIZE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Minimum spacing between two scroll offset updates.
pub const DEFAULT_SCROLL_THROTTLE: Duration = Duration::from_millis(100);

/// Layout and virtualization settings for a [`MasonryEngine`](super::MasonryEngine).
///
/// Item keys and the scroll source are attached to the engine itself since they
/// hold host closures and handles.
#[derive(Clone, Debug, PartialEq)]
pub struct MasonryConfig {
    /// Target column width used to derive the column count.
    pub column_width: f32,
    /// Spacing between columns.
    pub gutter: f32,
    /// Floor on the column count. Also caps how many items are measured per frame.
    pub min_columns: usize,
    /// Multiplier on the viewport height added above and below it as render buffer.
    pub overscan_factor: f32,
    /// Placement strategy.
    pub layout: LayoutStrategy,
    /// Cull items outside the viewport. Only effective with a scroll source.
    pub virtualize: bool,
    pub resize_debounce: Duration,
    pub scroll_throttle: Duration,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            column_width: DEFAULT_COLUMN_WIDTH,
            gutter: 0.0,
            min_columns: DEFAULT_MIN_COLUMNS,
            overscan_factor: DEFAULT_OVERSCAN_FACTOR,
            layout: LayoutStrategy::Basic,
            virtualize: true,
            resize_debounce: DEFAULT_RESIZE_DEBOUNCE,
            scroll_throttle: DEFAULT_SCROLL_THROTTLE,
        }
    }
}

impl MasonryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column_width(mut self, column_width: f32) -> Self {
        self.column_width = column_width;
        self
    }

    pub fn gutter(mut self, gutter: f32) -> Self {
        self.gutter = gutter;
        self
    }

    pub fn min_columns(mut self, min_columns: usize) -> Self {
        self.min_columns = min_columns;
        self
    }

    pub fn overscan_factor(mut self, overscan_factor: f32) -> Self {
        self.overscan_factor = overscan_factor;
        self
    }

    pub fn layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = layout;
        self
    }

    pub fn virtualize(mut self, virtualize: bool) -> Self {
        self.virtualize = virtualize;
        self
    }

    pub fn resize_debounce(mut self, delay: Duration) -> Self {
        self.resize_debounce = delay;
        self
    }

    pub fn scroll_throttle(mut self, quantum: Duration) -> Self {
        self.scroll_throttle = quantum;
        self
    }

    /// Column settings handed to the solver.
    pub fn column_spec(&self) -> ColumnSpec {
        ColumnSpec::new(self.column_width, self.gutter, self.min_columns)
    }

    /// Maximum number of items measured in one frame.
    pub fn batch_size(&self) -> usize {
        self.min_columns
    }

    pub fn validate(&self) -> Result<(), MasonryConfigError> {
        // NaN fails every comparison, so `!(x > 0.0)` also rejects it.
        if !(self.column_width > 0.0) {
            return Err(MasonryConfigError::NonPositiveColumnWidth {
                column_width: self.column_width,
            });
        }
        if self.min_columns < 1 {
            return Err(MasonryConfigError::NoColumns);
        }
        if !(self.gutter >= 0.0) {
            return Err(MasonryConfigError::InvalidGutter {
                gutter: self.gutter,
            });
        }
        if !(self.overscan_factor >= 0.0) {
            return Err(MasonryConfigError::InvalidOverscan {
                overscan_factor: self.overscan_factor,
            });
        }
        Ok(())
    }
}
