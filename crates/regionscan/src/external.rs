//! External detector seam.
//!
//! Cloud models, OCR services and the like live outside this workspace. They
//! plug in through [`ExternalDetector`] and hand the engine seed boxes that
//! the smart-detect and hybrid modes refine and crop.

use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::warn;

use regionscan_core::{
    BoundingBox, Confidence, Dimensions, Error, Rect, RegionCandidate, RegionSource, Result,
};
use regionscan_raster::RasterBuffer;

/// A region proposed by an external detector, in pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExternalRegion {
    /// Proposed box
    pub rect: Rect,
    /// Caption supplied by the detector
    pub caption: String,
    /// Detector confidence
    pub confidence: Confidence,
}

/// Source of seed regions outside the engine.
pub trait ExternalDetector: Send + Sync {
    /// Detector name for logging.
    fn name(&self) -> &str;

    /// Propose regions for a raster.
    fn detect(&self, raster: &RasterBuffer) -> Result<Vec<ExternalRegion>>;
}

/// Convert external regions into candidates.
///
/// Boxes are clamped to the image; boxes with nothing left inside it are
/// dropped with a warning.
pub fn seeds_to_candidates(regions: Vec<ExternalRegion>, image: Dimensions) -> Vec<RegionCandidate> {
    regions
        .into_iter()
        .filter_map(|region| match region.rect.clamp_to(image) {
            Some(rect) => Some(RegionCandidate::new(
                rect,
                image,
                RegionSource::ExternalSeed,
                region.confidence,
                region.caption,
            )),
            None => {
                warn!(rect = ?region.rect, caption = %region.caption, "Dropping seed outside the image");
                None
            }
        })
        .collect()
}

/// Seed box in a seed file: pixels or fractions of the image size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SeedBounds {
    /// Pixel rectangle
    Pixels {
        /// Left column
        x: u32,
        /// Top row
        y: u32,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Normalized rectangle, each value in 0.0-1.0
    Normalized {
        /// Normalized left
        nx: f64,
        /// Normalized top
        ny: f64,
        /// Normalized width
        nw: f64,
        /// Normalized height
        nh: f64,
    },
}

impl SeedBounds {
    /// Resolve to a pixel rectangle for an image of the given size.
    pub fn resolve(&self, image: Dimensions) -> Rect {
        match *self {
            SeedBounds::Pixels {
                x,
                y,
                width,
                height,
            } => Rect::new(x, y, width, height),
            SeedBounds::Normalized { nx, ny, nw, nh } => {
                BoundingBox::from_normalized(nx, ny, nw, nh, image).rect()
            }
        }
    }
}

/// One entry of a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeedSpec {
    /// Seed box
    #[serde(flatten)]
    pub bounds: SeedBounds,
    /// Caption
    #[serde(default)]
    pub caption: String,
    /// Confidence (defaults to 100)
    #[serde(default = "default_seed_confidence")]
    pub confidence: Confidence,
}

fn default_seed_confidence() -> Confidence {
    Confidence::CERTAIN
}

/// External detector returning a fixed list of seeds.
///
/// Seed files are JSON arrays:
///
/// ```json
/// [
///   { "x": 10, "y": 20, "width": 200, "height": 120, "caption": "chart" },
///   { "nx": 0.5, "ny": 0.0, "nw": 0.5, "nh": 0.25, "confidence": 70 }
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticSeedDetector {
    seeds: Vec<SeedSpec>,
}

impl StaticSeedDetector {
    /// Create a detector from seed specs.
    pub fn new(seeds: Vec<SeedSpec>) -> Self {
        Self { seeds }
    }

    /// Parse seeds from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let seeds: Vec<SeedSpec> = serde_json::from_str(json)?;
        Ok(Self::new(seeds))
    }

    /// Load seeds from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Number of seeds.
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Whether there are no seeds.
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

impl ExternalDetector for StaticSeedDetector {
    fn name(&self) -> &str {
        "static-seeds"
    }

    fn detect(&self, raster: &RasterBuffer) -> Result<Vec<ExternalRegion>> {
        let image = raster.dimensions();
        if image.is_empty() {
            return Err(Error::ExternalDetector("cannot seed an empty image".to_string()));
        }
        Ok(self
            .seeds
            .iter()
            .map(|seed| ExternalRegion {
                rect: seed.bounds.resolve(image),
                caption: seed.caption.clone(),
                confidence: seed.confidence,
            })
            .collect())
    }
}
