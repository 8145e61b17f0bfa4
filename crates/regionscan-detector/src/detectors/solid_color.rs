//! Solid color block finder.

use regionscan_core::{
    colors_similar, ColorMetric, Confidence, Dimensions, Point, Rect, RegionCandidate,
    RegionSource, Rgba,
};
use regionscan_raster::RasterBuffer;

use crate::detection::{DetectionContext, RegionDetector};

/// Spacing of the seed grid.
pub const SEED_STRIDE: u32 = 10;

/// Side of the neighbourhood checked around each seed.
pub const PATCH_SIZE: u32 = 20;

/// Fraction of the neighbourhood that must match the seed color.
pub const PATCH_UNIFORMITY: f32 = 0.8;

/// Edge lines less uniform than this are trimmed away.
pub const EDGE_UNIFORMITY: f32 = 0.7;

const METRIC: ColorMetric = ColorMetric::MaxChannel;

/// Finds flat-colored blocks such as filled cards and buttons.
///
/// Seeds on a sparse grid start a search when their neighbourhood is mostly
/// one non-background color. The block is grown along the seed's row and
/// column while pixels keep matching, then each side is trimmed inward
/// while its line is mostly something else.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolidColorRegionFinder;

impl SolidColorRegionFinder {
    /// Create a new finder.
    pub fn new() -> Self {
        Self
    }

    fn uniformity(raster: &RasterBuffer, rect: Rect, color: Rgba, tolerance: u32) -> f32 {
        if rect.is_empty() {
            return 0.0;
        }
        let mut matching = 0u64;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if colors_similar(raster.pixel_at(x, y), color, tolerance, METRIC) {
                    matching += 1;
                }
            }
        }
        matching as f32 / rect.area() as f32
    }

    /// Grow a cross from the seed and return its bounding box.
    fn expand(raster: &RasterBuffer, seed: Point, color: Rgba, tolerance: u32) -> Rect {
        let dims = raster.dimensions();
        let matches = |x: u32, y: u32| colors_similar(raster.pixel_at(x, y), color, tolerance, METRIC);

        let mut left = seed.x;
        while left > 0 && matches(left - 1, seed.y) {
            left -= 1;
        }
        let mut right = seed.x;
        while right + 1 < dims.width && matches(right + 1, seed.y) {
            right += 1;
        }
        let mut top = seed.y;
        while top > 0 && matches(seed.x, top - 1) {
            top -= 1;
        }
        let mut bottom = seed.y;
        while bottom + 1 < dims.height && matches(seed.x, bottom + 1) {
            bottom += 1;
        }

        Rect::from_extent(left, top, right, bottom)
    }

    /// Trim sides whose full line is less than [`EDGE_UNIFORMITY`] uniform.
    fn trim(raster: &RasterBuffer, mut rect: Rect, color: Rgba, tolerance: u32) -> Rect {
        let line_ok = |line: Rect| Self::uniformity(raster, line, color, tolerance) >= EDGE_UNIFORMITY;

        loop {
            if rect.is_empty() {
                return rect;
            }
            let top = Rect::new(rect.x, rect.y, rect.width, 1);
            let bottom = Rect::new(rect.x, rect.bottom() - 1, rect.width, 1);
            let left = Rect::new(rect.x, rect.y, 1, rect.height);
            let right = Rect::new(rect.right() - 1, rect.y, 1, rect.height);

            if !line_ok(top) {
                rect = Rect::new(rect.x, rect.y + 1, rect.width, rect.height - 1);
            } else if !line_ok(bottom) {
                rect.height -= 1;
            } else if !line_ok(left) {
                rect = Rect::new(rect.x + 1, rect.y, rect.width - 1, rect.height);
            } else if !line_ok(right) {
                rect.width -= 1;
            } else {
                return rect;
            }
        }
    }

    fn seed_patch(seed: Point, dims: Dimensions) -> Option<Rect> {
        let half = PATCH_SIZE / 2;
        Rect::new(seed.x.saturating_sub(half), seed.y.saturating_sub(half), PATCH_SIZE, PATCH_SIZE)
            .clamp_to(dims)
    }
}

impl RegionDetector for SolidColorRegionFinder {
    fn name(&self) -> &'static str {
        "solid-color"
    }

    fn priority(&self) -> u32 {
        100
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let dims = raster.dimensions();
        let tolerance = context.color_tolerance;
        let mut found: Vec<Rect> = Vec::new();
        let mut results = Vec::new();

        for y in (0..dims.height).step_by(SEED_STRIDE as usize) {
            for x in (0..dims.width).step_by(SEED_STRIDE as usize) {
                let seed = Point::new(x, y);
                if found.iter().any(|r| r.contains(&seed)) {
                    continue;
                }
                let color = raster.pixel_at(x, y);
                if colors_similar(color, context.background, tolerance, METRIC) {
                    continue;
                }
                let Some(patch) = Self::seed_patch(seed, dims) else {
                    continue;
                };
                if Self::uniformity(raster, patch, color, tolerance) < PATCH_UNIFORMITY {
                    continue;
                }

                let rect = Self::expand(raster, seed, color, tolerance);
                let rect = Self::trim(raster, rect, color, tolerance);
                if !context.is_large_enough(rect.width, rect.height) {
                    continue;
                }

                let uniformity = Self::uniformity(raster, rect, color, tolerance);
                found.push(rect);
                results.push(RegionCandidate::new(
                    rect,
                    dims,
                    RegionSource::SolidColor,
                    Confidence::from_fraction(uniformity),
                    format!("Solid {} block", color.to_hex()),
                ));
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_with_text_inside() {
        let mut raster = RasterBuffer::filled(Dimensions::new(200, 200), Rgba::WHITE);
        raster.fill_rect(Rect::new(40, 40, 100, 60), Rgba::rgb(30, 90, 200));
        raster.fill_rect(Rect::new(60, 60, 40, 8), Rgba::BLACK);
        let context = DetectionContext::new(Rgba::WHITE);

        let regions = SolidColorRegionFinder::new().detect(&raster, &context);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect(), Rect::new(40, 40, 100, 60));
        assert_eq!(regions[0].source, RegionSource::SolidColor);
        assert_eq!(regions[0].confidence.value(), 95);
    }

    #[test]
    fn test_separate_blocks() {
        let mut raster = RasterBuffer::filled(Dimensions::new(300, 200), Rgba::WHITE);
        raster.fill_rect(Rect::new(20, 20, 80, 60), Rgba::rgb(220, 60, 60));
        raster.fill_rect(Rect::new(150, 100, 120, 80), Rgba::rgb(60, 180, 60));
        let context = DetectionContext::new(Rgba::WHITE);

        let regions = SolidColorRegionFinder::new().detect(&raster, &context);
        let rects: Vec<Rect> = regions.iter().map(|r| r.rect()).collect();
        assert_eq!(rects, vec![Rect::new(20, 20, 80, 60), Rect::new(150, 100, 120, 80)]);
    }

    #[test]
    fn test_trim_removes_ragged_edge() {
        let mut raster = RasterBuffer::filled(Dimensions::new(100, 100), Rgba::WHITE);
        raster.fill_rect(Rect::new(10, 10, 50, 50), Rgba::BLACK);
        // A one-pixel spur on the seed row
        raster.fill_rect(Rect::new(60, 20, 10, 1), Rgba::BLACK);
        let context = DetectionContext::new(Rgba::WHITE);

        let regions = SolidColorRegionFinder::new().detect(&raster, &context);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect(), Rect::new(10, 10, 50, 50));
    }

    #[test]
    fn test_noise_is_ignored() {
        let mut raster = RasterBuffer::filled(Dimensions::new(100, 100), Rgba::WHITE);
        for i in 0..50 {
            raster.set_pixel(i * 2, i * 2, Rgba::BLACK);
        }
        let context = DetectionContext::new(Rgba::WHITE);
        assert!(SolidColorRegionFinder::new().detect(&raster, &context).is_empty());
    }
}
