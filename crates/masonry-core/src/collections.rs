//! Hash map aliases used across the masonry crates.
//!
//! FxHash is the default: cache keys are `u64` item keys supplied by the host, so a
//! fast non-cryptographic hasher is sufficient. The `std-hash` feature switches back
//! to the standard SipHash maps.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::hash_map::Entry;
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
    pub use std::collections::hash_map::Entry;
}
