//! Scrollable regions the engine reads its viewport from.

use std::cell::RefCell;
use std::rc::Rc;

/// A scrollable region that can be queried for its scroll position.
///
/// The region may be the masonry container itself or any ancestor that scrolls
/// it (a page, a panel). Offsets are in the same units as item positions.
pub trait ScrollSource {
    /// Distance scrolled from the top of the region's content.
    fn scroll_offset(&self) -> f32;

    /// Height of the visible part of the region.
    fn viewport_height(&self) -> f32;
}

impl<S: ScrollSource + ?Sized> ScrollSource for Rc<S> {
    fn scroll_offset(&self) -> f32 {
        (**self).scroll_offset()
    }

    fn viewport_height(&self) -> f32 {
        (**self).viewport_height()
    }
}

/// Internal state for [`ScrollState`].
#[derive(Debug)]
pub struct ScrollStateData {
    offset: f32,
    viewport_height: f32,
    /// Largest reachable offset (content height minus viewport height).
    max_offset: f32,
}

/// Host-updated scroll position.
///
/// Clones share state: the host keeps one clone and writes native scroll events
/// into it, the engine reads through another.
#[derive(Clone, Debug)]
pub struct ScrollState {
    data: Rc<RefCell<ScrollStateData>>,
}

impl ScrollState {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            data: Rc::new(RefCell::new(ScrollStateData {
                offset: 0.0,
                viewport_height: viewport_height.max(0.0),
                max_offset: f32::INFINITY,
            })),
        }
    }

    pub fn offset(&self) -> f32 {
        self.data.borrow().offset
    }

    pub fn max_offset(&self) -> f32 {
        self.data.borrow().max_offset
    }

    /// Moves to `offset`, clamped to `[0, max_offset]`.
    pub fn set_offset(&self, offset: f32) {
        let mut data = self.data.borrow_mut();
        data.offset = offset.clamp(0.0, data.max_offset);
    }

    /// Scrolls by `delta` and returns the distance actually moved.
    pub fn scroll_by(&self, delta: f32) -> f32 {
        let mut data = self.data.borrow_mut();
        let before = data.offset;
        data.offset = (before + delta).clamp(0.0, data.max_offset);
        data.offset - before
    }

    pub fn set_viewport_height(&self, height: f32) {
        let mut data = self.data.borrow_mut();
        data.viewport_height = height.max(0.0);
    }

    /// Updates the scroll range from the scrolled content's height.
    pub fn set_content_height(&self, content_height: f32) {
        let mut data = self.data.borrow_mut();
        data.max_offset = (content_height - data.viewport_height).max(0.0);
        if data.offset > data.max_offset {
            data.offset = data.max_offset;
        }
    }
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ScrollSource for ScrollState {
    fn scroll_offset(&self) -> f32 {
        self.offset()
    }

    fn viewport_height(&self) -> f32 {
        self.data.borrow().viewport_height
    }
}
