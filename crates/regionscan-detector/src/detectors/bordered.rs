//! Bordered region finder based on edge lines.

use regionscan_core::{Confidence, Rect, RegionCandidate, RegionSource};
use regionscan_raster::RasterBuffer;

use crate::detection::{DetectionContext, RegionDetector};

/// Sampling step along a candidate edge line.
pub const SAMPLE_STEP: u32 = 4;

/// Fraction of samples that must show a gradient for a line to count.
pub const EDGE_LINE_FRACTION: f32 = 0.3;

/// Finds regions enclosed by horizontal and vertical edge lines.
///
/// A row `y` is an edge line when enough samples differ in luma from row
/// `y - 1`; columns likewise. Every cell formed by consecutive horizontal
/// and consecutive vertical edge lines becomes a candidate when it exceeds
/// the minimum size in both dimensions. The result is a dense grid that the
/// card pipeline collapses by merging; cells between cards are kept.
///
/// With side verification on, a cell is only kept when all four of its own
/// sides show a gradient along the cell's span.
#[derive(Debug, Clone, Copy, Default)]
pub struct BorderedRegionFinder {
    verify_sides: bool,
}

impl BorderedRegionFinder {
    /// Create a new finder emitting the full grid.
    pub fn new() -> Self {
        Self { verify_sides: false }
    }

    /// Require each cell's own sides to be edges.
    pub fn with_side_verification(mut self, verify: bool) -> Self {
        self.verify_sides = verify;
        self
    }

    fn gradient(a: u8, b: u8, threshold: u32) -> bool {
        (a as i32 - b as i32).unsigned_abs() > threshold
    }

    /// Fraction of samples in `[x0, x1)` where row `y` differs from `y - 1`.
    fn row_edge_fraction(raster: &RasterBuffer, y: u32, x0: u32, x1: u32, threshold: u32) -> f32 {
        let mut samples = 0u32;
        let mut hits = 0u32;
        for x in (x0..x1).step_by(SAMPLE_STEP as usize) {
            samples += 1;
            if Self::gradient(raster.luma_at(x, y), raster.luma_at(x, y - 1), threshold) {
                hits += 1;
            }
        }
        if samples == 0 {
            0.0
        } else {
            hits as f32 / samples as f32
        }
    }

    /// Fraction of samples in `[y0, y1)` where column `x` differs from `x - 1`.
    fn column_edge_fraction(raster: &RasterBuffer, x: u32, y0: u32, y1: u32, threshold: u32) -> f32 {
        let mut samples = 0u32;
        let mut hits = 0u32;
        for y in (y0..y1).step_by(SAMPLE_STEP as usize) {
            samples += 1;
            if Self::gradient(raster.luma_at(x, y), raster.luma_at(x - 1, y), threshold) {
                hits += 1;
            }
        }
        if samples == 0 {
            0.0
        } else {
            hits as f32 / samples as f32
        }
    }

    /// Positions of horizontal and vertical edge lines.
    pub fn edge_lines(raster: &RasterBuffer, threshold: u32) -> (Vec<u32>, Vec<u32>) {
        let (w, h) = (raster.width(), raster.height());
        let rows = (1..h)
            .filter(|&y| Self::row_edge_fraction(raster, y, 0, w, threshold) >= EDGE_LINE_FRACTION)
            .collect();
        let columns = (1..w)
            .filter(|&x| Self::column_edge_fraction(raster, x, 0, h, threshold) >= EDGE_LINE_FRACTION)
            .collect();
        (rows, columns)
    }

    fn sides_are_edges(raster: &RasterBuffer, rect: &Rect, threshold: u32) -> bool {
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.right(), rect.bottom());
        Self::row_edge_fraction(raster, y0, x0, x1, threshold) >= EDGE_LINE_FRACTION
            && Self::row_edge_fraction(raster, y1, x0, x1, threshold) >= EDGE_LINE_FRACTION
            && Self::column_edge_fraction(raster, x0, y0, y1, threshold) >= EDGE_LINE_FRACTION
            && Self::column_edge_fraction(raster, x1, y0, y1, threshold) >= EDGE_LINE_FRACTION
    }
}

impl RegionDetector for BorderedRegionFinder {
    fn name(&self) -> &'static str {
        "bordered"
    }

    fn priority(&self) -> u32 {
        80
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let dims = raster.dimensions();
        if dims.width < 2 || dims.height < 2 {
            return Vec::new();
        }
        let threshold = context.edge_threshold;
        let (rows, columns) = Self::edge_lines(raster, threshold);

        let mut results = Vec::new();
        for ys in rows.windows(2) {
            for xs in columns.windows(2) {
                let rect = Rect::new(xs[0], ys[0], xs[1] - xs[0], ys[1] - ys[0]);
                if rect.width <= context.min_size || rect.height <= context.min_size {
                    continue;
                }
                if self.verify_sides && !Self::sides_are_edges(raster, &rect, threshold) {
                    continue;
                }
                results.push(RegionCandidate::new(
                    rect,
                    dims,
                    RegionSource::Bordered,
                    Confidence::new(60),
                    format!("Bordered region {}x{}", rect.width, rect.height),
                ));
            }
        }

        results
    }
}
