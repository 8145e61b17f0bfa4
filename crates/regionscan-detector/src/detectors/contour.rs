//! Contour detector: foreground mask components.

use regionscan_core::{Confidence, RegionCandidate, RegionSource};
use regionscan_raster::RasterBuffer;

use crate::components::find_components;
use crate::detection::{DetectionContext, RegionDetector};
use crate::mask::ForegroundMask;
use crate::tighten::tighten_bounds;

/// Reports each connected foreground blob as a region.
///
/// Confidence grows with how much of the box the blob fills: 50 for an
/// empty outline, 100 for a solid rectangle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourDetector;

impl ContourDetector {
    /// Create a new contour detector.
    pub fn new() -> Self {
        Self
    }

    /// Detect regions using a prebuilt mask.
    pub fn detect_in_mask(
        &self,
        mask: &ForegroundMask,
        context: &DetectionContext,
    ) -> Vec<RegionCandidate> {
        let dims = mask.dimensions();
        find_components(mask)
            .into_iter()
            .filter(|c| context.is_large_enough(c.rect.width, c.rect.height))
            .map(|component| {
                let rect = tighten_bounds(component.rect, mask);
                let fill = component.pixel_count as f32 / rect.area().max(1) as f32;
                RegionCandidate::new(
                    rect,
                    dims,
                    RegionSource::Contour,
                    Confidence::from_fraction(0.5 + 0.5 * fill),
                    format!("Contour {}x{}", rect.width, rect.height),
                )
            })
            .collect()
    }
}

impl RegionDetector for ContourDetector {
    fn name(&self) -> &'static str {
        "contour"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let mask = ForegroundMask::build(raster, context.background, context.color_tolerance);
        self.detect_in_mask(&mask, context)
    }
}
