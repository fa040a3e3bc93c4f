use masonry_core::{Duration, FrameClock};
use masonry_foundation::masonry::{
    ContainerGeometry, EnginePhase, FrameOutcome, ItemSlot, MasonryConfig, MasonryEngine,
    MasonryHost, ScrollState,
};
use masonry_layout::Position;

/// Time the rule advances the clock by before every frame.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Frames [`MasonryTestRule::settle`] runs before giving up.
const MAX_SETTLE_FRAMES: usize = 1_000;

/// One call the engine made to [`MasonryHost::measure_item`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasureCall {
    pub index: usize,
    pub key: u64,
    /// Width the item was laid out at.
    pub width: f32,
}

/// Scripted host: reports a configurable container and answers measurements
/// from a height function.
pub struct TestHost<T> {
    pub width: Option<f32>,
    pub offset: f32,
    height_of: Box<dyn Fn(&T) -> f32>,
    measure_calls: Vec<MeasureCall>,
}

impl<T> TestHost<T> {
    pub fn new(height_of: impl Fn(&T) -> f32 + 'static) -> Self {
        Self {
            width: None,
            offset: 0.0,
            height_of: Box::new(height_of),
            measure_calls: Vec::new(),
        }
    }

    pub fn measure_calls(&self) -> &[MeasureCall] {
        &self.measure_calls
    }

    pub fn clear_measure_calls(&mut self) {
        self.measure_calls.clear();
    }

    pub fn geometry(&self) -> ContainerGeometry {
        ContainerGeometry::new(self.width, self.offset)
    }
}

impl<T> MasonryHost<T> for TestHost<T> {
    fn container_geometry(&mut self) -> ContainerGeometry {
        self.geometry()
    }

    fn measure_item(&mut self, slot: ItemSlot<'_, T>) -> f32 {
        self.measure_calls.push(MeasureCall {
            index: slot.index,
            key: slot.key,
            width: slot.position.width,
        });
        (self.height_of)(slot.data)
    }
}

/// Drives a [`MasonryEngine`] frame by frame against a [`TestHost`].
///
/// The engine runs on a [`FrameClock`] that advances by [`FRAME_INTERVAL`] per
/// frame, so debounce and throttle windows are crossed deterministically.
pub struct MasonryTestRule<T> {
    engine: MasonryEngine<T, FrameClock>,
    host: TestHost<T>,
    clock: FrameClock,
    scroll: Option<ScrollState>,
    frames: usize,
}

impl<T> MasonryTestRule<T> {
    /// Panics if `config` is invalid.
    pub fn new(config: MasonryConfig, height_of: impl Fn(&T) -> f32 + 'static) -> Self {
        let clock = FrameClock::new();
        let engine = match MasonryEngine::with_clock(config, clock.clone()) {
            Ok(engine) => engine,
            Err(err) => panic!("invalid masonry config: {err}"),
        };
        Self {
            engine,
            host: TestHost::new(height_of),
            clock,
            scroll: None,
            frames: 0,
        }
    }

    pub fn with_item_key(mut self, key: impl Fn(&T) -> u64 + 'static) -> Self {
        self.engine = self.engine.with_item_key(key);
        self
    }

    /// Attaches a [`ScrollState`] with the given viewport height as scroll source.
    pub fn with_scroll_viewport(mut self, viewport_height: f32) -> Self {
        let scroll = ScrollState::new(viewport_height);
        self.engine = self.engine.with_scroll_source(scroll.clone());
        self.scroll = Some(scroll);
        self
    }

    /// Mounts the engine in a container of `width`.
    pub fn mount(&mut self, width: f32) {
        self.host.width = Some(width);
        self.engine.on_mount(self.host.geometry());
    }

    /// Mounts the engine in a container that has not been laid out yet.
    pub fn mount_unsized(&mut self) {
        self.host.width = None;
        self.engine.on_mount(self.host.geometry());
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.engine.set_items(items);
    }

    /// Advances the clock by one frame interval and runs a frame.
    pub fn advance_frame(&mut self) -> FrameOutcome {
        self.clock.advance(FRAME_INTERVAL);
        let outcome = self.engine.run_frame(&mut self.host);
        self.frames += 1;
        if let Some(scroll) = &self.scroll {
            scroll.set_content_height(self.host.offset + self.engine.content_height());
        }
        outcome
    }

    /// Advances the clock without running a frame.
    pub fn advance_time(&mut self, delta: Duration) {
        self.clock.advance(delta);
    }

    /// Runs frames until nothing is pending. Returns the number of frames run.
    pub fn settle(&mut self) -> usize {
        for frame in 1..=MAX_SETTLE_FRAMES {
            let outcome = self.advance_frame();
            if !outcome.has_pending_work && outcome.phase != EnginePhase::Measuring {
                log::debug!("masonry test rule: settled after {frame} frames");
                return frame;
            }
        }
        panic!("engine did not settle within {MAX_SETTLE_FRAMES} frames");
    }

    /// Moves the scroll source and reports the scroll event.
    ///
    /// Panics without a scroll source.
    pub fn scroll_to(&mut self, offset: f32) {
        let Some(scroll) = &self.scroll else {
            panic!("scroll_to requires with_scroll_viewport");
        };
        scroll.set_offset(offset);
        self.engine.on_scroll();
    }

    /// Changes the container width and reports the resize event.
    pub fn resize(&mut self, width: Option<f32>) {
        self.host.width = width;
        self.engine.on_resize();
    }

    pub fn teardown(&mut self) {
        self.engine.teardown();
    }

    /// `(index, is_measuring)` of every slot the engine would render now.
    pub fn rendered(&self) -> Vec<(usize, bool)> {
        self.engine.render_with(|slot| (slot.index, slot.is_measuring))
    }

    /// Indices of resolved, visible items.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.engine.visible_indices().to_vec()
    }

    pub fn position(&self, index: usize) -> Position {
        self.engine.positions()[index]
    }

    pub fn engine(&self) -> &MasonryEngine<T, FrameClock> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MasonryEngine<T, FrameClock> {
        &mut self.engine
    }

    pub fn host(&self) -> &TestHost<T> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut TestHost<T> {
        &mut self.host
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn scroll_state(&self) -> Option<&ScrollState> {
        self.scroll.as_ref()
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> usize {
        self.frames
    }
}
