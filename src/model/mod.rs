//! Data types for PatternSync.

mod pattern;

pub use pattern::{slugify, LifecycleState, Pattern};
