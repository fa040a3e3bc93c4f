//! Viewport tracking and visibility culling.

use std::ops::RangeInclusive;

use masonry_layout::Position;

/// Tracks where the masonry container sits relative to the visible viewport.
///
/// `container_offset` is the distance from the top of the scrolled content to the
/// top of the masonry container, so an item at `top` is on screen when
/// `top + container_offset` lies within `[scroll_offset, scroll_offset + container_height]`.
/// The overscan buffer of `container_height * overscan_factor` extends that window
/// on both sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTracker {
    container_height: f32,
    container_offset: f32,
    scroll_offset: f32,
    overscan_factor: f32,
    culling: bool,
}

impl ViewportTracker {
    /// Creates a tracker with culling disabled.
    pub fn new(overscan_factor: f32) -> Self {
        Self {
            container_height: 0.0,
            container_offset: 0.0,
            scroll_offset: 0.0,
            overscan_factor,
            culling: false,
        }
    }

    pub fn set_culling(&mut self, culling: bool) {
        self.culling = culling;
    }

    pub fn is_culling(&self) -> bool {
        self.culling
    }

    /// Returns `true` if the geometry changed.
    pub fn update_container(&mut self, height: f32, offset: f32) -> bool {
        let height = height.max(0.0);
        let changed = self.container_height != height || self.container_offset != offset;
        self.container_height = height;
        self.container_offset = offset;
        changed
    }

    /// Returns `true` if the offset changed.
    pub fn update_scroll_offset(&mut self, offset: f32) -> bool {
        let changed = self.scroll_offset != offset;
        self.scroll_offset = offset;
        changed
    }

    pub fn container_height(&self) -> f32 {
        self.container_height
    }

    pub fn container_offset(&self) -> f32 {
        self.container_offset
    }

    pub fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    pub fn buffer(&self) -> f32 {
        self.container_height * self.overscan_factor
    }

    /// Overscanned window in container coordinates, or `None` when not culling.
    pub fn visible_range(&self) -> Option<RangeInclusive<f32>> {
        if !self.culling {
            return None;
        }
        let start = self.scroll_offset - self.container_offset;
        let buffer = self.buffer();
        Some((start - buffer)..=(start + self.container_height + buffer))
    }

    /// Whether an item at `position` falls inside the overscanned window.
    ///
    /// Without culling every position counts as visible. Unresolved positions
    /// never intersect an active window.
    pub fn is_visible(&self, position: &Position) -> bool {
        let Some(range) = self.visible_range() else {
            return true;
        };
        !(position.top + position.height < *range.start() || position.top > *range.end())
    }
}
