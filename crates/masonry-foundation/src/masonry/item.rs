//! Items as seen by the host's render and measure callbacks.

use std::rc::Rc;

use masonry_layout::Position;

/// Maps an item to its stable cache key.
pub type ItemKeyFn<T> = Rc<dyn Fn(&T) -> u64>;

/// An item handed to the host for rendering or measurement.
#[derive(Debug)]
pub struct ItemSlot<'a, T> {
    /// The caller's item, borrowed.
    pub data: &'a T,
    /// Index in the current item list.
    pub index: usize,
    /// Cache key of the item.
    pub key: u64,
    /// `true` when the item is being rendered off-screen only to read its height.
    pub is_measuring: bool,
    /// Resolved position, or the unresolved sentinel with the provisional width
    /// when `is_measuring` is set.
    pub position: Position,
}

impl<T> Clone for ItemSlot<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ItemSlot<'_, T> {}

/// Capabilities the engine needs from the view layer hosting it.
pub trait MasonryHost<T> {
    /// Reads the container's current width and its offset inside the scrolled content.
    fn container_geometry(&mut self) -> ContainerGeometry;

    /// Renders `slot` invisibly at `slot.position.width` and returns its height.
    fn measure_item(&mut self, slot: ItemSlot<'_, T>) -> f32;
}

/// Container measurements reported by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContainerGeometry {
    /// Layout width, `None` while the container is not laid out.
    pub width: Option<f32>,
    /// Distance from the top of the scrolled content to the top of the container.
    pub offset: f32,
}

impl ContainerGeometry {
    pub fn new(width: Option<f32>, offset: f32) -> Self {
        Self { width, offset }
    }

    pub fn with_width(width: f32) -> Self {
        Self::new(Some(width), 0.0)
    }
}

pub(crate) fn item_keys<T>(items: &[T], key_fn: Option<&ItemKeyFn<T>>) -> Vec<u64> {
    match key_fn {
        Some(key_fn) => items.iter().map(|item| key_fn(item)).collect(),
        None => (0..items.len() as u64).collect(),
    }
}
