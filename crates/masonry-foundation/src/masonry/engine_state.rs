//! Engine state and its transitions.
//!
//! Transitions only touch [`EngineState`] and describe what has to happen next as
//! [`Effects`]; the engine carries out the effects (clearing the cache, solving,
//! scheduling a batch, notifying the host).

/// Coarse lifecycle phase, derived from the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnginePhase {
    /// No container width known yet; nothing can be placed.
    Uninitialized,
    /// Some items have no cached height.
    Measuring,
    /// Every item is measured and placed.
    Settled,
}

/// Mutable inputs of the engine.
#[derive(Clone, Debug)]
pub struct EngineState<T> {
    pub items: Vec<T>,
    /// `true` iff some item in `items` has no cached height.
    pub has_pending_measurements: bool,
    pub scroll_offset: f32,
    pub container_width: Option<f32>,
}

/// Work requested by a transition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effects {
    /// Drop every cached measurement and stored position.
    pub reflow: bool,
    /// The item list became empty: drop positions and any queued batch.
    pub hard_reset: bool,
    /// Re-run the position solver.
    pub resolve: bool,
    /// Queue a measurement batch for the next frame.
    pub schedule_batch: bool,
    /// The render set may have changed.
    pub request_render: bool,
}

impl Effects {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }
}

impl<T> EngineState<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            has_pending_measurements: false,
            scroll_offset: 0.0,
            container_width: None,
        }
    }

    pub fn phase(&self) -> EnginePhase {
        if self.container_width.is_none() {
            EnginePhase::Uninitialized
        } else if self.has_pending_measurements {
            EnginePhase::Measuring
        } else {
            EnginePhase::Settled
        }
    }

    /// New item list. `pending` tells whether any of `items` lacks a cached height.
    pub fn replace_items(&mut self, items: Vec<T>, pending: bool) -> Effects {
        let hard_reset = !self.items.is_empty() && items.is_empty();
        self.items = items;
        self.has_pending_measurements = pending;
        Effects {
            hard_reset,
            resolve: true,
            schedule_batch: self.can_measure(),
            request_render: true,
            ..Effects::none()
        }
    }

    /// New container width.
    ///
    /// The first width only unblocks placement. Any later change, including
    /// losing the width, invalidates every measurement since column widths change.
    pub fn resize(&mut self, width: Option<f32>) -> Effects {
        if self.container_width == width {
            return Effects::none();
        }
        let had_width = self.container_width.is_some();
        self.container_width = width;
        if had_width {
            self.has_pending_measurements = !self.items.is_empty();
        }
        Effects {
            reflow: had_width,
            resolve: true,
            schedule_batch: self.can_measure(),
            request_render: true,
            ..Effects::none()
        }
    }

    pub fn scroll(&mut self, offset: f32) -> Effects {
        if self.scroll_offset == offset {
            return Effects::none();
        }
        self.scroll_offset = offset;
        Effects {
            request_render: true,
            ..Effects::none()
        }
    }

    /// A measurement batch was committed. `pending` is recomputed by the caller.
    pub fn batch_committed(&mut self, pending: bool) -> Effects {
        self.has_pending_measurements = pending;
        Effects {
            resolve: true,
            schedule_batch: self.can_measure(),
            request_render: true,
            ..Effects::none()
        }
    }

    /// Explicit full invalidation.
    pub fn reflow(&mut self) -> Effects {
        self.has_pending_measurements = !self.items.is_empty();
        Effects {
            reflow: true,
            resolve: true,
            schedule_batch: self.can_measure(),
            request_render: true,
            ..Effects::none()
        }
    }

    fn can_measure(&self) -> bool {
        self.has_pending_measurements && self.container_width.is_some()
    }
}

impl<T> Default for EngineState<T> {
    fn default() -> Self {
        Self::new()
    }
}
