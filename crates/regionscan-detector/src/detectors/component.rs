//! UI component detector: dilated mask components with a text filter.

use regionscan_core::{Confidence, Rect, RegionCandidate, RegionSource};
use regionscan_raster::RasterBuffer;

use crate::components::find_components;
use crate::detection::{DetectionContext, RegionDetector};
use crate::mask::ForegroundMask;
use crate::tighten::tighten_bounds;

/// Default dilation radius joining nearby foreground pixels.
pub const DEFAULT_DILATION_RADIUS: u32 = 3;

/// Groups nearby foreground into UI components.
///
/// The foreground mask is dilated so that a button's label and border (or
/// an icon and its caption) become one component. Boxes are then tightened
/// against the undilated mask. Thin, wide, sparse boxes look like lines of
/// text and are dropped.
#[derive(Debug, Clone)]
pub struct ComponentDetector {
    dilation_radius: u32,
    text_max_height: u32,
    text_min_aspect: f32,
    text_max_fill: f32,
}

impl ComponentDetector {
    /// Create a new component detector.
    pub fn new() -> Self {
        Self {
            dilation_radius: DEFAULT_DILATION_RADIUS,
            text_max_height: 30,
            text_min_aspect: 3.0,
            text_max_fill: 0.35,
        }
    }

    /// Set the dilation radius.
    pub fn with_dilation_radius(mut self, radius: u32) -> Self {
        self.dilation_radius = radius;
        self
    }

    /// Whether a box with the given foreground fill looks like a text line.
    pub fn looks_like_text(&self, rect: &Rect, fill: f32) -> bool {
        rect.height <= self.text_max_height
            && rect.aspect_ratio() >= self.text_min_aspect
            && fill < self.text_max_fill
    }
}

impl Default for ComponentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionDetector for ComponentDetector {
    fn name(&self) -> &'static str {
        "component"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let dims = raster.dimensions();
        let mask = ForegroundMask::build(raster, context.background, context.color_tolerance);
        let dilated = mask.dilate(self.dilation_radius);

        let mut results = Vec::new();
        for component in find_components(&dilated) {
            let rect = tighten_bounds(component.rect, &mask);
            if !context.is_large_enough(rect.width, rect.height) {
                continue;
            }

            let fill = mask.count_in(rect) as f32 / rect.area().max(1) as f32;
            if self.looks_like_text(&rect, fill) {
                continue;
            }

            results.push(RegionCandidate::new(
                rect,
                dims,
                RegionSource::Component,
                Confidence::from_fraction(0.6 + 0.4 * fill),
                format!("Component {}x{}", rect.width, rect.height),
            ));
        }

        results
    }
}
