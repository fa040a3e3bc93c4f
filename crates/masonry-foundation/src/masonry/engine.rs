//! The masonry orchestrator.
//!
//! [`MasonryEngine`] owns the measurement cache, the solved layout and the
//! scheduling state of one masonry container. The host drives it through lifecycle
//! calls (`on_mount`, `set_items`, `on_resize`, `on_scroll`, `teardown`) and one
//! [`run_frame`](MasonryEngine::run_frame) per frame, and renders whatever
//! [`render_with`](MasonryEngine::render_with) hands back.
//!
//! A measurement round spans two frames: the batch is chosen when the layout is
//! solved and rendered off-screen with the next render pass, then measured and
//! committed by the frame task that runs on the following frame.

use std::ops::RangeInclusive;
use std::rc::Rc;

use masonry_core::collections::map::HashMap;
use masonry_core::{CancellationToken, Clock, Debounce, FrameQueue, SystemClock, Throttle};
use masonry_layout::{solve_layout, ColumnSpec, LayoutResult, MeasurementCache, Position};

use super::batch_measurer::{BatchMeasurer, MeasureBatch};
use super::config::MasonryConfig;
use super::engine_state::{Effects, EnginePhase, EngineState};
use super::error::MasonryConfigError;
use super::item::{item_keys, ContainerGeometry, ItemKeyFn, ItemSlot, MasonryHost};
use super::scroll_source::ScrollSource;
use super::viewport::ViewportTracker;

/// Counters describing the engine's current output and lifetime work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasonryStats {
    /// Items in the current list.
    pub total_items: usize,
    /// Items of the current list with a cached height.
    pub measured_items: usize,
    /// Resolved items passing the viewport cull.
    pub visible_items: usize,
    /// Measurement batches committed since construction.
    pub batches_committed: usize,
    /// Individual measurements committed since construction.
    pub items_measured: usize,
    /// Full invalidations, explicit or caused by a width change.
    pub reflows: usize,
}

/// What happened during one [`MasonryEngine::run_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameOutcome {
    /// The render set changed; the host should call `render_with` again.
    pub render_requested: bool,
    /// Items measured and committed this frame.
    pub measured_items: usize,
    pub phase: EnginePhase,
    /// Frame tasks, a debounced resize or a throttled scroll are still waiting.
    pub has_pending_work: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameTask {
    MeasureContainer,
    /// Measures the pending batch if it still belongs to `generation`.
    MeasureBatch { generation: u64 },
}

/// Virtualized masonry layout for one container.
pub struct MasonryEngine<T, C: Clock = SystemClock> {
    config: MasonryConfig,
    spec: ColumnSpec,
    state: EngineState<T>,
    keys: Vec<u64>,
    key_index: HashMap<u64, usize>,
    item_key: Option<ItemKeyFn<T>>,
    cache: MeasurementCache,
    layout: LayoutResult,
    visible: Vec<usize>,
    viewport: ViewportTracker,
    scroll_source: Option<Rc<dyn ScrollSource>>,
    measurer: BatchMeasurer,
    /// Bumped whenever a queued batch becomes stale.
    batch_generation: u64,
    frames: FrameQueue<FrameTask>,
    resize: Debounce<(), C>,
    scroll: Throttle<(), C>,
    token: CancellationToken,
    invalidate_callbacks: Vec<(u64, Box<dyn Fn()>)>,
    next_callback_id: u64,
    stats: MasonryStats,
    last_phase: EnginePhase,
    mounted: bool,
}

impl<T> MasonryEngine<T, SystemClock> {
    /// Creates an engine timed by the wall clock.
    pub fn new(config: MasonryConfig) -> Result<Self, MasonryConfigError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<T, C: Clock + Clone> MasonryEngine<T, C> {
    /// Creates an engine whose debounce and throttle read time from `clock`.
    pub fn with_clock(config: MasonryConfig, clock: C) -> Result<Self, MasonryConfigError> {
        config.validate()?;
        let token = CancellationToken::new();
        Ok(Self {
            spec: config.column_spec(),
            state: EngineState::new(),
            keys: Vec::new(),
            key_index: HashMap::default(),
            item_key: None,
            cache: MeasurementCache::new(),
            layout: LayoutResult::default(),
            visible: Vec::new(),
            viewport: ViewportTracker::new(config.overscan_factor),
            scroll_source: None,
            measurer: BatchMeasurer::new(config.batch_size()),
            batch_generation: 0,
            frames: FrameQueue::new(token.clone()),
            resize: Debounce::new(clock.clone(), config.resize_debounce, token.clone()),
            scroll: Throttle::new(clock, config.scroll_throttle, token.clone()),
            token,
            invalidate_callbacks: Vec::new(),
            next_callback_id: 1,
            stats: MasonryStats::default(),
            last_phase: EnginePhase::Uninitialized,
            mounted: false,
            config,
        })
    }
}

impl<T, C: Clock> MasonryEngine<T, C> {
    /// Derives cache keys from items instead of their indices.
    ///
    /// Set this before the first `set_items`; keys of the current list are not
    /// recomputed.
    pub fn with_item_key(mut self, key: impl Fn(&T) -> u64 + 'static) -> Self {
        self.item_key = Some(Rc::new(key));
        self
    }

    pub fn with_scroll_source(mut self, source: impl ScrollSource + 'static) -> Self {
        self.set_scroll_source(Some(Rc::new(source)));
        self
    }

    /// Attaches or detaches the scrollable region used for culling.
    pub fn set_scroll_source(&mut self, source: Option<Rc<dyn ScrollSource>>) {
        self.scroll_source = source;
        self.viewport
            .set_culling(self.config.virtualize && self.scroll_source.is_some());
        if self.mounted {
            self.sync_scroll();
        }
        self.recull();
        self.invalidate();
    }

    /// The container is attached. Its geometry is applied immediately.
    pub fn on_mount(&mut self, geometry: ContainerGeometry) {
        if self.token.is_cancelled() {
            return;
        }
        self.mounted = true;
        self.sync_scroll();
        self.apply_geometry(geometry);
    }

    /// Replaces the item list.
    ///
    /// Heights already cached under the new keys are reused. When mounted, the
    /// container geometry is re-read on the next frame.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.keys = item_keys(&items, self.item_key.as_ref());
        self.key_index.clear();
        for (index, &key) in self.keys.iter().enumerate() {
            self.key_index.entry(key).or_insert(index);
        }
        // Batch entries index into the old list.
        self.discard_batch();
        let pending = self.has_unmeasured_keys();
        let effects = self.state.replace_items(items, pending);
        if self.mounted {
            self.frames.schedule_unique(FrameTask::MeasureContainer);
        }
        self.apply_effects(effects);
    }

    /// The container may have changed size. Debounced.
    pub fn on_resize(&mut self) {
        self.resize.call(());
    }

    /// The scroll source moved. Throttled.
    pub fn on_scroll(&mut self) {
        self.scroll.call(());
    }

    /// Drops every measurement and re-measures all items.
    pub fn reflow(&mut self) {
        let effects = self.state.reflow();
        self.apply_effects(effects);
    }

    /// Cancels pending resize and scroll handling and every queued frame task.
    /// The engine stays readable but does no further work.
    pub fn teardown(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();
        self.resize.cancel();
        self.scroll.cancel();
        self.frames.clear();
        self.measurer.discard();
        self.mounted = false;
        log::debug!("masonry: torn down");
    }

    /// Runs the work due this frame.
    ///
    /// Only tasks queued before this call run. A settled resize then re-reads the
    /// container and a due scroll update re-culls before those tasks execute.
    /// Anything scheduled meanwhile waits for the next frame, so at most one batch
    /// is measured per call and every batch is rendered before it is measured.
    pub fn run_frame(&mut self, host: &mut impl MasonryHost<T>) -> FrameOutcome {
        let mut render_requested = false;
        let mut measured_items = 0;
        let tasks = self.frames.take_frame();

        if self.resize.poll().is_some() {
            render_requested |= self.apply_geometry(host.container_geometry());
        }
        if self.scroll.poll().is_some() {
            render_requested |= self.sync_scroll();
        }

        for task in tasks {
            match task {
                FrameTask::MeasureContainer => {
                    render_requested |= self.apply_geometry(host.container_geometry());
                }
                FrameTask::MeasureBatch { generation } => {
                    if generation != self.batch_generation {
                        continue;
                    }
                    let committed = self.commit_batch(host);
                    if committed > 0 {
                        render_requested = true;
                    }
                    measured_items += committed;
                }
            }
        }

        FrameOutcome {
            render_requested,
            measured_items,
            phase: self.phase(),
            has_pending_work: self.has_scheduled_work(),
        }
    }

    /// Calls `render` for every visible resolved item, then for every item of the
    /// pending measurement batch with `is_measuring` set.
    pub fn render_with<'a, R>(&'a self, mut render: impl FnMut(ItemSlot<'a, T>) -> R) -> Vec<R> {
        let batch = self.measurer.pending();
        let mut out = Vec::with_capacity(self.visible.len() + batch.map_or(0, MeasureBatch::len));
        for &index in &self.visible {
            let (Some(data), Some(&position)) =
                (self.state.items.get(index), self.layout.positions.get(index))
            else {
                continue;
            };
            out.push(render(ItemSlot {
                data,
                index,
                key: self.keys[index],
                is_measuring: false,
                position,
            }));
        }
        if let Some(batch) = batch {
            for entry in batch.entries() {
                let Some(data) = self.state.items.get(entry.index) else {
                    continue;
                };
                out.push(render(ItemSlot {
                    data,
                    index: entry.index,
                    key: entry.key,
                    is_measuring: true,
                    position: entry.position,
                }));
            }
        }
        out
    }

    /// The slots [`render_with`](Self::render_with) would hand out.
    pub fn visible_slots(&self) -> Vec<ItemSlot<'_, T>> {
        self.render_with(|slot| slot)
    }

    pub fn phase(&self) -> EnginePhase {
        self.state.phase()
    }

    pub fn state(&self) -> &EngineState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        &self.state.items
    }

    pub fn has_pending_measurements(&self) -> bool {
        self.state.has_pending_measurements
    }

    pub fn cache(&self) -> &MeasurementCache {
        &self.cache
    }

    /// One position per item, unresolved sentinels included.
    pub fn positions(&self) -> &[Position] {
        &self.layout.positions
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    /// Position of the first item with `key`.
    pub fn position_of(&self, key: u64) -> Option<Position> {
        let index = *self.key_index.get(&key)?;
        self.layout.positions.get(index).copied()
    }

    /// Height of the tallest column.
    pub fn content_height(&self) -> f32 {
        self.layout.content_height()
    }

    /// Indices of the items that pass the viewport cull, in item order.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Overscanned window in container coordinates, `None` when not culling.
    pub fn visible_range(&self) -> Option<RangeInclusive<f32>> {
        self.viewport.visible_range()
    }

    pub fn is_culling(&self) -> bool {
        self.viewport.is_culling()
    }

    pub fn column_count(&self) -> Option<usize> {
        self.layout.geometry.map(|geometry| geometry.column_count)
    }

    pub fn pending_batch(&self) -> Option<&MeasureBatch> {
        self.measurer.pending()
    }

    pub fn stats(&self) -> MasonryStats {
        self.stats
    }

    pub fn config(&self) -> &MasonryConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_torn_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether a later `run_frame` has anything to do.
    pub fn has_scheduled_work(&self) -> bool {
        !self.frames.is_empty() || self.resize.is_pending() || self.scroll.is_pending()
    }

    /// Registers a callback fired whenever the render set changes.
    pub fn add_invalidate_callback(&mut self, callback: Box<dyn Fn()>) -> u64 {
        let id = self.next_callback_id;
        self.next_callback_id += 1;
        self.invalidate_callbacks.push((id, callback));
        id
    }

    pub fn remove_invalidate_callback(&mut self, id: u64) {
        self.invalidate_callbacks.retain(|(cb_id, _)| *cb_id != id);
    }

    fn invalidate(&self) {
        for (_, callback) in &self.invalidate_callbacks {
            callback();
        }
    }

    fn has_unmeasured_keys(&self) -> bool {
        self.keys.iter().any(|key| !self.cache.has(key))
    }

    /// Applies freshly read container geometry. Returns `true` if a render was requested.
    fn apply_geometry(&mut self, geometry: ContainerGeometry) -> bool {
        let width = match geometry.width {
            Some(width) if !width.is_finite() => {
                log::warn!("masonry: ignoring non-finite container width {width}");
                None
            }
            Some(width) if width <= 0.0 => None,
            width => width,
        };
        let height = self
            .scroll_source
            .as_ref()
            .map_or(self.viewport.container_height(), |source| source.viewport_height());
        let moved = self.viewport.update_container(height, geometry.offset);

        let effects = self.state.resize(width);
        if effects.reflow {
            log::debug!(
                "masonry: container width changed to {:?}, reflowing",
                self.state.container_width
            );
        }
        if self.apply_effects(effects) {
            return true;
        }
        moved && self.recull_and_notify()
    }

    /// Reads the scroll source. Returns `true` if the visible set changed.
    fn sync_scroll(&mut self) -> bool {
        let Some(source) = self.scroll_source.clone() else {
            return false;
        };
        let offset = source.scroll_offset();
        let container_offset = self.viewport.container_offset();
        let resized = self
            .viewport
            .update_container(source.viewport_height(), container_offset);
        self.viewport.update_scroll_offset(offset);
        let effects = self.state.scroll(offset);
        log::trace!("masonry: scroll offset {offset}");
        (resized || effects.request_render) && self.recull_and_notify()
    }

    /// Measures the pending batch through the host and folds the heights in.
    fn commit_batch(&mut self, host: &mut impl MasonryHost<T>) -> usize {
        let Some(batch) =
            self.measurer
                .measure(&self.state.items, &mut self.cache, |slot| host.measure_item(slot))
        else {
            return 0;
        };
        let pending = self.has_unmeasured_keys();
        let effects = self.state.batch_committed(pending);
        self.apply_effects(effects);
        batch.len()
    }

    /// Carries out `effects`. Returns `true` if a render was requested.
    fn apply_effects(&mut self, effects: Effects) -> bool {
        if effects.is_empty() {
            return false;
        }
        if effects.reflow {
            self.cache.reset();
            self.discard_batch();
            self.stats.reflows += 1;
        }
        if effects.hard_reset {
            self.discard_batch();
            self.layout = LayoutResult::default();
            log::debug!("masonry: item list emptied, dropping layout");
        }
        if effects.resolve {
            self.layout = solve_layout(
                &self.keys,
                &self.cache,
                &self.spec,
                self.config.layout,
                self.state.container_width,
            );
        }
        if effects.schedule_batch {
            self.schedule_batch();
        }
        self.refresh_stats();
        self.note_phase();
        if effects.request_render {
            self.recull();
            self.invalidate();
        }
        effects.request_render
    }

    fn schedule_batch(&mut self) {
        if self.token.is_cancelled() {
            return;
        }
        if self
            .measurer
            .prepare(&self.keys, &self.layout.positions, &self.cache)
            .is_some()
        {
            self.frames.schedule_unique(FrameTask::MeasureBatch {
                generation: self.batch_generation,
            });
        }
    }

    fn discard_batch(&mut self) {
        self.measurer.discard();
        self.batch_generation += 1;
        self.frames
            .cancel_where(|task| matches!(task, FrameTask::MeasureBatch { .. }));
    }

    fn recull(&mut self) {
        let viewport = &self.viewport;
        self.visible = self
            .layout
            .positions
            .iter()
            .enumerate()
            .filter(|(_, position)| position.is_resolved() && viewport.is_visible(position))
            .map(|(index, _)| index)
            .collect();
        self.stats.visible_items = self.visible.len();
    }

    fn recull_and_notify(&mut self) -> bool {
        let before = std::mem::take(&mut self.visible);
        self.recull();
        if before == self.visible {
            return false;
        }
        log::trace!("masonry: {} items visible", self.visible.len());
        self.invalidate();
        true
    }

    fn refresh_stats(&mut self) {
        self.stats.total_items = self.state.items.len();
        self.stats.measured_items = self.keys.iter().filter(|key| self.cache.has(key)).count();
        self.stats.batches_committed = self.measurer.batches_committed();
        self.stats.items_measured = self.measurer.items_measured();
    }

    fn note_phase(&mut self) {
        let phase = self.state.phase();
        if phase != self.last_phase {
            log::debug!("masonry: {:?} -> {:?}", self.last_phase, phase);
            self.last_phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masonry::ScrollState;
    use std::cell::Cell;

    struct FixedHost {
        width: Option<f32>,
        measured: Vec<u64>,
    }

    impl MasonryHost<f32> for FixedHost {
        fn container_geometry(&mut self) -> ContainerGeometry {
            ContainerGeometry::new(self.width, 0.0)
        }

        fn measure_item(&mut self, slot: ItemSlot<'_, f32>) -> f32 {
            self.measured.push(slot.key);
            *slot.data
        }
    }

    fn engine() -> MasonryEngine<f32> {
        MasonryEngine::new(MasonryConfig::new().column_width(100.0).min_columns(2)).unwrap()
    }

    fn host(width: f32) -> FixedHost {
        FixedHost {
            width: Some(width),
            measured: Vec::new(),
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = MasonryEngine::<f32>::new(MasonryConfig::new().min_columns(0));
        assert_eq!(result.err(), Some(MasonryConfigError::NoColumns));
    }

    #[test]
    fn test_unmounted_engine_yields_sentinels() {
        let mut engine = engine();
        engine.set_items(vec![10.0, 20.0]);

        assert_eq!(engine.phase(), EnginePhase::Uninitialized);
        assert!(engine.positions().iter().all(|p| !p.is_resolved()));
        assert!(engine.positions().iter().all(|p| p.width == 100.0));
        assert!(engine.pending_batch().is_none());
    }

    #[test]
    fn test_two_column_pack() {
        let mut engine = engine();
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![100.0, 50.0, 80.0]);

        // First frame: container re-read, first batch of two.
        let outcome = engine.run_frame(&mut host);
        assert_eq!(outcome.measured_items, 2);
        let outcome = engine.run_frame(&mut host);
        assert_eq!(outcome.measured_items, 1);
        assert_eq!(outcome.phase, EnginePhase::Settled);

        let positions = engine.positions();
        assert_eq!(positions[0], Position::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(positions[1], Position::new(0.0, 100.0, 100.0, 50.0));
        assert_eq!(positions[2], Position::new(50.0, 100.0, 100.0, 80.0));
        assert_eq!(engine.layout().column_heights.as_slice(), &[100.0, 130.0]);
        assert_eq!(engine.content_height(), 130.0);
        assert_eq!(host.measured, vec![0, 1, 2]);
    }

    #[test]
    fn test_batch_is_rendered_before_it_is_measured() {
        let mut engine = engine();
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![10.0, 20.0, 30.0]);

        let slots = engine.visible_slots();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|slot| slot.is_measuring));
        assert!(host.measured.is_empty());
    }

    #[test]
    fn test_reflow_clears_cache() {
        let mut engine = engine();
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![10.0, 20.0]);
        engine.run_frame(&mut host);
        assert_eq!(engine.phase(), EnginePhase::Settled);

        engine.reflow();

        assert!(engine.cache().is_empty());
        assert_eq!(engine.phase(), EnginePhase::Measuring);
        assert_eq!(engine.stats().reflows, 1);
        assert_eq!(engine.pending_batch().map(MeasureBatch::len), Some(2));
    }

    #[test]
    fn test_invalidate_callbacks_fire_and_unregister() {
        let mut engine = engine();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        let id = engine.add_invalidate_callback(Box::new(move || seen.set(seen.get() + 1)));

        engine.set_items(vec![1.0]);
        assert_eq!(count.get(), 1);

        engine.remove_invalidate_callback(id);
        engine.set_items(vec![2.0]);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_item_key_reuses_heights() {
        let mut engine = engine().with_item_key(|height: &f32| *height as u64);
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![10.0, 20.0]);
        engine.run_frame(&mut host);

        engine.set_items(vec![20.0, 10.0]);

        assert_eq!(engine.phase(), EnginePhase::Settled);
        assert_eq!(engine.position_of(20).map(|p| p.left), Some(0.0));
    }

    #[test]
    fn test_teardown_stops_work() {
        let mut engine = engine();
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![10.0, 20.0, 30.0]);
        engine.on_resize();

        engine.teardown();
        let outcome = engine.run_frame(&mut host);

        assert!(engine.is_torn_down());
        assert_eq!(outcome.measured_items, 0);
        assert!(!outcome.has_pending_work);
        assert!(host.measured.is_empty());
    }

    #[test]
    fn test_replacing_items_drops_stale_batch() {
        let mut engine = engine().with_item_key(|height: &f32| *height as u64);
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![10.0, 30.0]);
        engine.run_frame(&mut host);

        // 20 is queued for measurement, then the list goes back to measured items.
        engine.set_items(vec![10.0, 20.0]);
        assert_eq!(engine.pending_batch().map(MeasureBatch::len), Some(1));
        engine.set_items(vec![10.0, 30.0]);

        assert!(engine.pending_batch().is_none());
        let outcome = engine.run_frame(&mut host);
        assert_eq!(outcome.measured_items, 0);
        assert!(!engine.cache().has(&20));
        assert_eq!(host.measured, vec![10, 30]);
    }

    #[test]
    fn test_unchanged_scroll_offset_does_not_invalidate() {
        let scroll = ScrollState::new(400.0);
        let mut engine = engine().with_scroll_source(scroll.clone());
        let mut host = host(200.0);
        engine.on_mount(host.container_geometry());
        engine.set_items(vec![100.0, 100.0]);
        engine.run_frame(&mut host);

        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        engine.add_invalidate_callback(Box::new(move || seen.set(seen.get() + 1)));

        engine.on_scroll();
        let outcome = engine.run_frame(&mut host);

        assert!(!outcome.render_requested);
        assert_eq!(count.get(), 0);
        assert_eq!(engine.state().scroll_offset, 0.0);
    }
}
