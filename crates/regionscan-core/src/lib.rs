//! # regionscan-core
//!
//! Core types for the regionscan segmentation engine.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other regionscan crates. It provides:
//!
//! - Geometry types (Point, Dimensions, Rect, BoundingBox)
//! - Color type and the two similarity metrics
//! - Region candidate and extracted region types
//! - Extraction options, modes and the YAML engine configuration
//! - Extraction result type
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other regionscan crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod color;
pub mod config;
pub mod error;
pub mod geometry;
pub mod region;
pub mod result;

// Re-export commonly used types
pub use color::{colors_similar, ColorMetric, Rgba};
pub use config::{
    EngineConfig, ExtractionMode, ExtractionOptions, ImageFormat, LoggingSettings, MergeSettings,
};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Dimensions, Point, Rect};
pub use region::{Confidence, ExtractedRegion, ImagePayload, RegionCandidate, RegionLabel, RegionSource};
pub use result::{CropFailure, ExtractionResult};
