//! Seeded color flood fill over a coarse scan grid.

use tracing::trace;

use regionscan_core::{colors_similar, ColorMetric, Confidence, Point, RegionCandidate, RegionSource};
use regionscan_raster::RasterBuffer;

use crate::components::{flood_fill_color_with, FillScratch, VisitedMask};
use crate::detection::{DetectionContext, RegionDetector};

/// Default spacing of the seed grid.
pub const DEFAULT_SEED_STRIDE: u32 = 20;

/// Grows color regions from a sparse grid of seeds.
///
/// Seeds that match the background or land on an already filled pixel are
/// skipped. Fills that hit the pixel cap are still reported, with lower
/// confidence.
#[derive(Debug, Clone)]
pub struct FloodFillDetector {
    stride: u32,
}

impl FloodFillDetector {
    /// Create a new flood fill detector.
    pub fn new() -> Self {
        Self {
            stride: DEFAULT_SEED_STRIDE,
        }
    }

    /// Set the seed grid spacing (at least 1).
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride.max(1);
        self
    }
}

impl Default for FloodFillDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionDetector for FloodFillDetector {
    fn name(&self) -> &'static str {
        "flood-fill"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let dims = raster.dimensions();
        let mut visited = VisitedMask::new(dims);
        let mut scratch = FillScratch::new(dims);
        let mut results = Vec::new();

        for y in (0..dims.height).step_by(self.stride as usize) {
            for x in (0..dims.width).step_by(self.stride as usize) {
                if visited.is_visited(x, y) {
                    continue;
                }
                let pixel = raster.pixel_at(x, y);
                if colors_similar(pixel, context.background, context.color_tolerance, ColorMetric::MaxChannel) {
                    continue;
                }

                let fill = flood_fill_color_with(
                    raster,
                    Point::new(x, y),
                    context.color_tolerance,
                    &mut visited,
                    &mut scratch,
                );
                if fill.truncated {
                    trace!(x, y, "Flood fill hit the pixel cap");
                }
                if !context.is_large_enough(fill.rect.width, fill.rect.height) {
                    continue;
                }

                let confidence = if fill.truncated { 40 } else { 70 };
                results.push(RegionCandidate::new(
                    fill.rect,
                    dims,
                    RegionSource::FloodFill,
                    Confidence::new(confidence),
                    format!("Flood fill from {} {}", x, y),
                ));
            }
        }

        results
    }
}
