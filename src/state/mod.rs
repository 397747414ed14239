//! Value types for one update check.
//!
//! Everything here is created and dropped within a single check; nothing is
//! shared or mutated across concurrent checks.

pub mod types;

pub use types::{
    CategorizedUpdates, CategoryBucket, CheckSnapshot, DeferredSet, Selector, UpdateRecord,
    UpdateType,
};
