//! Headless masonry feed.
//!
//! Simulates a photo feed in a scrolling page: cards of varying aspect ratio are
//! measured in batches, the page scrolls down, the window is widened and more
//! cards are appended. Frames are driven by a [`FrameClock`] at 60 fps, so the
//! run is deterministic and finishes instantly.
//!
//! Run with:
//! ```bash
//! cargo run -p masonry-demo --features logging -- 2000
//! ```

use anyhow::{Context, Result};
use masonry_core::{Duration, FrameClock};
use masonry_foundation::masonry::{
    ContainerGeometry, FrameOutcome, ItemSlot, MasonryConfig, MasonryEngine, MasonryHost,
    ScrollState,
};

const FRAME: Duration = Duration::from_millis(16);
const VIEWPORT_HEIGHT: f32 = 900.0;
/// Header above the feed, inside the scrolled page.
const HEADER_HEIGHT: f32 = 120.0;
const CAPTION_HEIGHT: f32 = 48.0;

#[derive(Clone, Debug)]
struct Card {
    id: u64,
    /// Image height divided by image width.
    aspect: f32,
}

impl Card {
    fn new(id: u64) -> Self {
        // Deterministic spread between 0.5 and 1.8.
        let hash = id.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 40;
        let aspect = 0.5 + (hash % 1300) as f32 / 1000.0;
        Self { id, aspect }
    }
}

struct FeedHost {
    width: f32,
    measured: usize,
}

impl MasonryHost<Card> for FeedHost {
    fn container_geometry(&mut self) -> ContainerGeometry {
        ContainerGeometry::new(Some(self.width), HEADER_HEIGHT)
    }

    fn measure_item(&mut self, slot: ItemSlot<'_, Card>) -> f32 {
        self.measured += 1;
        (slot.position.width * slot.data.aspect).round() + CAPTION_HEIGHT
    }
}

struct Feed {
    engine: MasonryEngine<Card, FrameClock>,
    host: FeedHost,
    clock: FrameClock,
    scroll: ScrollState,
    frames: usize,
}

impl Feed {
    fn frame(&mut self) -> FrameOutcome {
        self.clock.advance(FRAME);
        self.frames += 1;
        let outcome = self.engine.run_frame(&mut self.host);
        self.scroll.set_content_height(HEADER_HEIGHT + self.engine.content_height());
        if outcome.render_requested {
            let rendered = self.engine.render_with(|slot| slot.key).len();
            log::trace!("frame {}: {} slots rendered", self.frames, rendered);
        }
        outcome
    }

    fn settle(&mut self) -> usize {
        let start = self.frames;
        loop {
            let outcome = self.frame();
            if !outcome.has_pending_work {
                return self.frames - start;
            }
        }
    }

    fn scroll_by(&mut self, delta: f32) {
        self.scroll.scroll_by(delta);
        self.engine.on_scroll();
        self.settle();
    }

    fn report(&self, label: &str) {
        let stats = self.engine.stats();
        let range = self
            .engine
            .visible_range()
            .map(|range| format!("{:.0}..={:.0}", range.start(), range.end()))
            .unwrap_or_else(|| "all".to_string());
        println!(
            "{label:<14} columns={:<2} content={:>8.0} scroll={:>8.0} window={:<16} visible={:<4} measured={}/{} batches={} reflows={}",
            self.engine.column_count().unwrap_or(0),
            self.engine.content_height(),
            self.scroll.offset(),
            range,
            stats.visible_items,
            stats.measured_items,
            stats.total_items,
            stats.batches_committed,
            stats.reflows,
        );
    }
}

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    env_logger::init();

    let count = std::env::args()
        .nth(1)
        .map(|arg| arg.parse::<usize>())
        .transpose()
        .context("card count must be a non-negative integer")?
        .unwrap_or(500);

    let clock = FrameClock::new();
    let scroll = ScrollState::new(VIEWPORT_HEIGHT);
    let config = MasonryConfig::new().column_width(236.0).gutter(16.0);
    let engine = MasonryEngine::with_clock(config, clock.clone())
        .context("invalid masonry configuration")?
        .with_item_key(|card: &Card| card.id)
        .with_scroll_source(scroll.clone());

    let mut feed = Feed {
        engine,
        host: FeedHost {
            width: 1024.0,
            measured: 0,
        },
        clock,
        scroll,
        frames: 0,
    };

    let cards: Vec<Card> = (0..count as u64).map(Card::new).collect();
    feed.engine.on_mount(feed.host.container_geometry());
    feed.engine.set_items(cards.clone());
    let frames = feed.settle();
    log::info!("initial load settled after {frames} frames");
    feed.report("loaded");

    for _ in 0..5 {
        feed.scroll_by(VIEWPORT_HEIGHT * 2.0);
        feed.report("scrolled");
    }

    feed.host.width = 1440.0;
    feed.engine.on_resize();
    let frames = feed.settle();
    log::info!("resize settled after {frames} frames");
    feed.report("widened");

    let more: Vec<Card> = cards
        .into_iter()
        .chain((count as u64..count as u64 * 2).map(Card::new))
        .collect();
    feed.engine.set_items(more);
    feed.settle();
    feed.report("appended");

    feed.scroll_by(-feed.scroll.offset());
    feed.report("top");

    println!("{} frames, {} measurements", feed.frames, feed.host.measured);
    feed.engine.teardown();
    Ok(())
}
