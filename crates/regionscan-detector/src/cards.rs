//! Multi-pass UI card detection.

use std::sync::Arc;

use tracing::debug;

use regionscan_core::RegionCandidate;
use regionscan_raster::RasterBuffer;

use crate::detection::{DetectionContext, DetectionPipeline, RegionDetector};
use crate::detectors::{BorderedRegionFinder, ShadowBoundedRegionFinder, SolidColorRegionFinder};
use crate::merge::RegionMerger;

/// Overlap ratio used to fuse finder outputs.
///
/// No adjacency merging: bordered cells share edges with their neighbours.
pub const CARD_OVERLAP_THRESHOLD: f32 = 0.5;

/// Runs the solid-color, bordered and shadow finders and fuses their output.
///
/// Candidates from all finders are merged, then sorted largest first.
/// Labels are assigned later, after merging.
pub struct CardMultiPassDetector {
    pipeline: DetectionPipeline,
    merger: RegionMerger,
}

impl CardMultiPassDetector {
    /// Create the detector with the standard finders.
    pub fn new() -> Self {
        let mut pipeline = DetectionPipeline::new();
        pipeline.add_detector(Arc::new(SolidColorRegionFinder::new()));
        pipeline.add_detector(Arc::new(BorderedRegionFinder::new()));
        pipeline.add_detector(Arc::new(ShadowBoundedRegionFinder::new()));

        Self {
            pipeline,
            merger: RegionMerger::new(CARD_OVERLAP_THRESHOLD),
        }
    }

    /// Number of finders in the pipeline.
    pub fn finder_count(&self) -> usize {
        self.pipeline.len()
    }
}

impl Default for CardMultiPassDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionDetector for CardMultiPassDetector {
    fn name(&self) -> &'static str {
        "ui-cards"
    }

    fn priority(&self) -> u32 {
        90
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let candidates = self.pipeline.detect(raster, context);
        let found = candidates.len();

        let mut merged = self.merger.merge(candidates, raster.dimensions());
        merged.sort_by(|a, b| b.bounds.area().cmp(&a.bounds.area()));

        debug!(candidates = found, merged = merged.len(), "Card passes fused");
        merged
    }
}
