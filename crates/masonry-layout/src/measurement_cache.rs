//! Measured item heights.

use std::hash::Hash;

use masonry_core::collections::map::HashMap;

/// Maps item keys to their measured heights.
///
/// This is the single source of truth for "is this item's size known". Heights are
/// only replaced through [`set`](MeasurementCache::set) and only dropped through
/// [`remove`](MeasurementCache::remove) or [`reset`](MeasurementCache::reset).
#[derive(Clone, Debug)]
pub struct MeasurementCache<K = u64> {
    heights: HashMap<K, f32>,
}

impl<K: Hash + Eq> MeasurementCache<K> {
    pub fn new() -> Self {
        Self {
            heights: HashMap::default(),
        }
    }

    pub fn has(&self, key: &K) -> bool {
        self.heights.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<f32> {
        self.heights.get(key).copied()
    }

    pub fn set(&mut self, key: K, height: f32) {
        self.heights.insert(key, height);
    }

    pub fn remove(&mut self, key: &K) -> Option<f32> {
        self.heights.remove(key)
    }

    /// Drops every measurement.
    pub fn reset(&mut self) {
        self.heights.clear();
    }

    /// Keeps only the entries whose key satisfies `keep`.
    pub fn retain_keys(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.heights.retain(|key, _| keep(key));
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}

impl<K: Hash + Eq> Default for MeasurementCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key() {
        let cache: MeasurementCache = MeasurementCache::new();
        assert!(!cache.has(&1));
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut cache = MeasurementCache::new();
        cache.set(7u64, 120.0);
        cache.set(7u64, 120.0);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&7), Some(120.0));
    }

    #[test]
    fn test_zero_height_is_a_measurement() {
        let mut cache = MeasurementCache::new();
        cache.set(3u64, 0.0);
        assert!(cache.has(&3));
    }

    #[test]
    fn test_reset_clears_every_key() {
        let mut cache = MeasurementCache::new();
        for key in 0u64..10 {
            cache.set(key, key as f32 * 10.0);
        }

        cache.reset();

        assert!(cache.is_empty());
        assert!((0u64..10).all(|key| !cache.has(&key)));
    }

    #[test]
    fn test_retain_keys() {
        let mut cache = MeasurementCache::new();
        for key in 0u64..6 {
            cache.set(key, 10.0);
        }

        cache.retain_keys(|key| key % 2 == 0);

        assert_eq!(cache.len(), 3);
        assert!(cache.has(&4));
        assert!(!cache.has(&5));
    }
}
