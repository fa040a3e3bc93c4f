//! Testing utilities and harness for the masonry engine.

pub mod test_rule;

pub use test_rule::*;
