//! Shadow-bounded region finder.

use tracing::trace;

use regionscan_core::RegionCandidate;
use regionscan_raster::RasterBuffer;

use crate::detection::{DetectionContext, RegionDetector};

/// Finder for cards outlined only by a drop shadow.
///
/// Shadow detection is not implemented; this finder holds its slot in the
/// card pipeline and always reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShadowBoundedRegionFinder;

impl ShadowBoundedRegionFinder {
    /// Create a new shadow finder.
    pub fn new() -> Self {
        Self
    }
}

impl RegionDetector for ShadowBoundedRegionFinder {
    fn name(&self) -> &'static str {
        "shadow"
    }

    fn priority(&self) -> u32 {
        70
    }

    fn detect(&self, raster: &RasterBuffer, _context: &DetectionContext) -> Vec<RegionCandidate> {
        trace!(
            width = raster.width(),
            height = raster.height(),
            "Shadow finder not implemented, skipping"
        );
        Vec::new()
    }
}
