//! Bounded off-screen measurement of unmeasured items.
//!
//! Only a handful of unmeasured items are materialized at a time: a batch is
//! picked from the solver's output, measured in one pass at the provisional
//! column width, and committed to the cache in one go. The next batch is picked
//! on a later frame, after the layout has been re-solved with the new heights.

use masonry_layout::{MeasurementCache, Position};
use smallvec::SmallVec;

use super::item::ItemSlot;

/// An item waiting to be measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchEntry {
    pub index: usize,
    pub key: u64,
    /// Provisional position from the solver; only `width` is meaningful.
    pub position: Position,
}

/// A group of at most `batch_size` items measured together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasureBatch {
    entries: SmallVec<[BatchEntry; 8]>,
}

impl MeasureBatch {
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.entries.iter().any(|entry| entry.index == index)
    }
}

/// Selects, measures and commits batches of unmeasured items.
#[derive(Debug)]
pub struct BatchMeasurer {
    batch_size: usize,
    pending: Option<MeasureBatch>,
    batches_committed: usize,
    items_measured: usize,
}

impl BatchMeasurer {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            pending: None,
            batches_committed: 0,
            items_measured: 0,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Picks the next batch: the first `batch_size` keys absent from `cache`, in
    /// item order. Replaces any batch already pending. Returns `None` when every
    /// item is measured.
    pub fn prepare(
        &mut self,
        keys: &[u64],
        positions: &[Position],
        cache: &MeasurementCache,
    ) -> Option<&MeasureBatch> {
        let mut entries: SmallVec<[BatchEntry; 8]> = SmallVec::new();
        for (index, (&key, &position)) in keys.iter().zip(positions).enumerate() {
            if entries.len() == self.batch_size {
                break;
            }
            if cache.has(&key) || entries.iter().any(|e| e.key == key) {
                continue;
            }
            entries.push(BatchEntry {
                index,
                key,
                position,
            });
        }
        self.pending = (!entries.is_empty()).then_some(MeasureBatch { entries });
        self.pending.as_ref()
    }

    pub fn pending(&self) -> Option<&MeasureBatch> {
        self.pending.as_ref()
    }

    /// Drops the pending batch without measuring it.
    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Measures the pending batch and commits its heights.
    ///
    /// Every entry is measured first and the heights are written to the cache only
    /// after the whole batch has been read back. The batch is returned to the caller
    /// for disposal; the measurer holds no batch afterwards.
    pub fn measure<T, F>(
        &mut self,
        items: &[T],
        cache: &mut MeasurementCache,
        mut measure_item: F,
    ) -> Option<MeasureBatch>
    where
        F: FnMut(ItemSlot<'_, T>) -> f32,
    {
        let batch = self.pending.take()?;
        let mut heights: SmallVec<[(u64, f32); 8]> = SmallVec::with_capacity(batch.len());
        for entry in batch.entries() {
            let Some(data) = items.get(entry.index) else {
                continue;
            };
            let measured = measure_item(ItemSlot {
                data,
                index: entry.index,
                key: entry.key,
                is_measuring: true,
                position: entry.position,
            });
            heights.push((entry.key, sanitize_height(measured, entry.index)));
        }

        for &(key, height) in &heights {
            cache.set(key, height);
        }
        self.batches_committed += 1;
        self.items_measured += heights.len();
        log::debug!(
            "masonry: committed batch of {} measurements ({} batches so far)",
            heights.len(),
            self.batches_committed
        );
        Some(batch)
    }

    pub fn batches_committed(&self) -> usize {
        self.batches_committed
    }

    pub fn items_measured(&self) -> usize {
        self.items_measured
    }
}

fn sanitize_height(height: f32, index: usize) -> f32 {
    if height.is_finite() && height >= 0.0 {
        height
    } else {
        log::warn!("masonry: item {index} measured to {height}, using 0");
        0.0
    }
}
