use std::cell::Cell;
use std::rc::Rc;

use masonry_core::Duration;
use masonry_foundation::masonry::{EnginePhase, MasonryConfig};
use masonry_testing::{MasonryTestRule, FRAME_INTERVAL};

fn settled_rule(width: f32) -> MasonryTestRule<f32> {
    let mut rule = MasonryTestRule::new(
        MasonryConfig::new().column_width(100.0).min_columns(2),
        |height: &f32| *height,
    );
    rule.mount(width);
    rule.set_items(vec![100.0, 50.0, 80.0]);
    rule.settle();
    rule.host_mut().clear_measure_calls();
    rule
}

#[test]
fn test_resize_to_three_columns_remeasures_everything() {
    let mut rule = settled_rule(240.0);
    assert_eq!(rule.engine().column_count(), Some(2));

    rule.resize(Some(300.0));
    while rule.engine().stats().reflows == 0 {
        rule.advance_frame();
    }

    // Width applied, cache gone, nothing placed until re-measured.
    assert!(rule.engine().cache().is_empty());
    assert_eq!(rule.engine().phase(), EnginePhase::Measuring);
    assert!(rule.engine().positions().iter().all(|p| !p.is_resolved()));
    assert!(rule.host().measure_calls().is_empty());

    rule.settle();

    assert_eq!(rule.engine().column_count(), Some(3));
    let calls = rule.host().measure_calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|call| call.width == 100.0));
    assert_eq!(rule.position(2).left, 200.0);
    assert_eq!(rule.position(2).top, 0.0);
}

#[test]
fn test_resize_is_debounced() {
    let mut rule = settled_rule(200.0);

    rule.resize(Some(300.0));
    for _ in 0..10 {
        rule.advance_frame();
    }
    // A second event restarts the window.
    rule.resize(Some(400.0));
    for _ in 0..10 {
        rule.advance_frame();
    }
    assert_eq!(rule.engine().stats().reflows, 0);
    assert_eq!(rule.engine().state().container_width, Some(200.0));

    rule.advance_time(Duration::from_millis(300) - FRAME_INTERVAL * 10);
    rule.advance_frame();

    assert_eq!(rule.engine().stats().reflows, 1);
    assert_eq!(rule.engine().state().container_width, Some(400.0));
}

#[test]
fn test_resize_to_same_width_keeps_measurements() {
    let mut rule = settled_rule(200.0);

    rule.resize(Some(200.0));
    rule.advance_time(Duration::from_millis(300));
    rule.settle();

    assert_eq!(rule.engine().stats().reflows, 0);
    assert_eq!(rule.engine().cache().len(), 3);
    assert!(rule.host().measure_calls().is_empty());
}

#[test]
fn test_losing_width_resets_to_uninitialized() {
    let mut rule = settled_rule(200.0);

    rule.resize(None);
    rule.advance_time(Duration::from_millis(300));
    rule.settle();

    assert_eq!(rule.engine().phase(), EnginePhase::Uninitialized);
    assert!(rule.engine().cache().is_empty());
    assert!(rule.rendered().is_empty());
}

#[test]
fn test_one_batch_per_frame() {
    let mut rule = MasonryTestRule::new(
        MasonryConfig::new().column_width(100.0).min_columns(2),
        |height: &f32| *height,
    );
    rule.mount(200.0);
    rule.set_items(vec![10.0; 7]);

    let measured: Vec<usize> = (0..5)
        .map(|_| rule.advance_frame().measured_items)
        .collect();

    assert_eq!(measured, vec![2, 2, 2, 1, 0]);
}

#[test]
fn test_teardown_cancels_pending_work() {
    let mut rule = MasonryTestRule::new(
        MasonryConfig::new().column_width(100.0).min_columns(2),
        |height: &f32| *height,
    );
    rule.mount(200.0);
    rule.set_items(vec![10.0; 6]);
    rule.resize(Some(400.0));

    rule.teardown();
    for _ in 0..30 {
        let outcome = rule.advance_frame();
        assert_eq!(outcome.measured_items, 0);
        assert!(!outcome.has_pending_work);
    }

    assert!(rule.engine().is_torn_down());
    assert!(rule.host().measure_calls().is_empty());
    assert!(rule.engine().pending_batch().is_none());
    assert_eq!(rule.engine().state().container_width, Some(200.0));
}

#[test]
fn test_invalidate_callback_fires_per_committed_batch() {
    let mut rule = MasonryTestRule::new(
        MasonryConfig::new().column_width(100.0).min_columns(2),
        |height: &f32| *height,
    );
    rule.mount(200.0);
    let renders = Rc::new(Cell::new(0));
    let counter = renders.clone();
    rule.engine_mut()
        .add_invalidate_callback(Box::new(move || counter.set(counter.get() + 1)));

    rule.set_items(vec![10.0; 4]);
    assert_eq!(renders.get(), 1);

    rule.settle();

    // One per committed batch.
    assert_eq!(renders.get(), 3);
    assert_eq!(rule.engine().stats().batches_committed, 2);
}
