//! # regionscan-detector
//!
//! Region detection engine for regionscan.
//!
//! This crate provides:
//! - Background color estimation and foreground masks
//! - Iterative connected-component and color flood fill
//! - Bounds tightening and gradient edge refinement
//! - Overlap/adjacency region merging and size-based classification
//! - Region detectors (contour, components, flood fill, sections, grid,
//!   solid-color, bordered, shadow) and the multi-pass card detector
//! - Priority-ordered detection pipeline
//!
//! ## Architecture
//!
//! This is Layer 2 in the architecture - it depends on regionscan-core
//! and regionscan-raster and never touches encoded image bytes.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod background;
pub mod cards;
pub mod classify;
pub mod components;
pub mod detection;
pub mod detectors;
pub mod edges;
pub mod mask;
pub mod merge;
pub mod testing;
pub mod tighten;

// Re-export commonly used types
pub use background::estimate_background;
pub use cards::CardMultiPassDetector;
pub use classify::{ClassifierThresholds, RegionClassifier};
pub use components::{
    find_components, flood_fill_color, flood_fill_color_with, ColorFill, Component, FillScratch,
    VisitedMask, FLOOD_FILL_PIXEL_CAP,
};
pub use detection::{DetectionContext, DetectionPipeline, RegionDetector};
pub use detectors::{
    tile, BorderedRegionFinder, ComponentDetector, ContourDetector, FloodFillDetector, GridTiler,
    SectionDetector, ShadowBoundedRegionFinder, SolidColorRegionFinder,
};
pub use edges::{EdgeRefiner, DEFAULT_EDGE_PADDING};
pub use mask::ForegroundMask;
pub use merge::RegionMerger;
pub use tighten::tighten_bounds;
