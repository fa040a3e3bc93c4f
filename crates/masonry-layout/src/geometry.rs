//! Item positions and column geometry.

/// Placement of a single item inside the masonry container.
///
/// All values are in layout units relative to the container's top-left corner.
/// Items that cannot be placed yet carry the [unresolved](Position::unresolved)
/// sentinel: infinite `top`, `left` and `height`, but a real provisional `width`
/// so the item can still be measured at the right column width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

impl Position {
    pub const fn new(top: f32, left: f32, width: f32, height: f32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Placeholder for an item whose height or container width is not known yet.
    pub const fn unresolved(width: f32) -> Self {
        Self {
            top: f32::INFINITY,
            left: f32::INFINITY,
            width,
            height: f32::INFINITY,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.top.is_finite() && self.left.is_finite() && self.height.is_finite()
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Column configuration as supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSpec {
    /// Target width of a column; the real width is derived from the container.
    pub ideal_column_width: f32,
    /// Horizontal spacing between columns.
    pub gutter: f32,
    /// Lower bound on the column count, whatever the container width.
    pub min_columns: usize,
}

impl ColumnSpec {
    pub const fn new(ideal_column_width: f32, gutter: f32, min_columns: usize) -> Self {
        Self {
            ideal_column_width,
            gutter,
            min_columns,
        }
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self::new(228.0, 0.0, 3)
    }
}

/// Resolved columns for a concrete container width.
///
/// Column `n` starts at `origin + n * stride`; every item placed in any column is
/// `item_width` wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnGeometry {
    pub column_count: usize,
    pub stride: f32,
    pub item_width: f32,
    pub origin: f32,
}

impl ColumnGeometry {
    /// Columns stretch to share the container width.
    ///
    /// `columnGuess = floor(width / ideal)`,
    /// `count = max(floor((width - columnGuess * gutter) / ideal), min_columns)`,
    /// `stride = floor(width / count)`; items are inset by half a gutter on each side.
    pub fn flexible(width: f32, spec: &ColumnSpec) -> Self {
        let ideal = spec.ideal_column_width;
        let column_guess = (width / ideal).floor().max(0.0);
        let fitted = ((width - column_guess * spec.gutter) / ideal).floor().max(0.0) as usize;
        let column_count = fitted.max(spec.min_columns).max(1);
        let stride = (width / column_count as f32).floor();
        Self {
            column_count,
            stride,
            item_width: (stride - spec.gutter).max(0.0),
            origin: spec.gutter / 2.0,
        }
    }

    /// Columns keep the ideal width and the whole block is centred in the container.
    pub fn centered(width: f32, spec: &ColumnSpec) -> Self {
        let ideal = spec.ideal_column_width;
        let stride = ideal + spec.gutter;
        let fitted = ((width + spec.gutter) / stride).floor().max(0.0) as usize;
        let column_count = fitted.max(spec.min_columns).max(1);
        let used = column_count as f32 * stride - spec.gutter;
        let origin = ((width - used) / 2.0).floor().max(0.0);
        Self {
            column_count,
            stride,
            item_width: ideal,
            origin,
        }
    }

    pub fn column_left(&self, column: usize) -> f32 {
        self.origin + column as f32 * self.stride
    }
}
