//! # regionscan
//!
//! Model-free region segmentation for screenshots and UI composites.
//!
//! Given image bytes and [`ExtractionOptions`], [`RegionExtractor`] returns
//! the interesting rectangular regions (cards, icons, banners, sections) as
//! classified boxes with encoded crops.
//!
//! ```no_run
//! use regionscan::{ExtractionMode, ExtractionOptions, RegionExtractor};
//!
//! let bytes = std::fs::read("dashboard.png").unwrap();
//! let options = ExtractionOptions::for_mode(ExtractionMode::SmartUiCards);
//! let result = RegionExtractor::new().extract(&bytes, Some("image/png"), &options);
//! for region in &result.regions {
//!     println!("{} {:?}", region.label.as_str(), region.bounds.rect());
//! }
//! ```
//!
//! ## Architecture
//!
//! This is Layer 3 - the extraction surface that ties together:
//! - regionscan-core: Core types, options and errors
//! - regionscan-raster: Pixel buffer and image codec
//! - regionscan-detector: Detection primitives and detectors
//!
//! The `regionscan` binary in main.rs is a thin CLI over this library.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod crop;
pub mod external;
pub mod extractor;
pub mod modes;
pub mod schema;

// Re-export commonly used types
pub use crop::CropExecutor;
pub use external::{
    seeds_to_candidates, ExternalDetector, ExternalRegion, SeedBounds, SeedSpec, StaticSeedDetector,
};
pub use extractor::RegionExtractor;
pub use modes::{ModeInput, ModeRegistry, ModeStrategy};
pub use regionscan_core::{
    EngineConfig, Error, ExtractedRegion, ExtractionMode, ExtractionOptions, ExtractionResult,
    ImageFormat, RegionLabel, Result,
};
