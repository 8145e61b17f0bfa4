//! Testing utilities for regionscan detection.
//!
//! Provides synthetic screenshot construction and tolerant comparison of
//! detected boxes against expectations.

pub mod region_match;
pub mod scene;

pub use region_match::{RegionDiff, RegionMatch, RegionMatcher};
pub use scene::SceneBuilder;
