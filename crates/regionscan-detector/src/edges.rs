//! Gradient edge refinement for approximate boxes.

use regionscan_core::{Dimensions, Rect, RegionCandidate, RegionSource};
use regionscan_raster::RasterBuffer;

/// Default search padding around each edge, in pixels.
pub const DEFAULT_EDGE_PADDING: u32 = 10;

/// Smallest width/height a refined box may have.
pub const MIN_REFINED_SIZE: u32 = 4;

/// Fraction of a scanline that must show a gradient for an edge to count.
pub const EDGE_COVERAGE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    /// Edge is a column; gradients are taken along x.
    Vertical,
    /// Edge is a row; gradients are taken along y.
    Horizontal,
}

/// Snaps the sides of an approximate box to nearby luma edges.
///
/// Each side is searched on its own inside `[pos - padding, pos + padding]`,
/// clamped to the image. A candidate coordinate qualifies when at least
/// [`EDGE_COVERAGE`] of the perpendicular scanline (the central half of the
/// box's span) shows an adjacent-pixel luma difference above the threshold.
/// Candidates are scanned in increasing order: left and top take the first
/// qualifying coordinate, right and bottom the last. A side with no
/// qualifying coordinate stays where it was.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRefiner {
    padding: u32,
    threshold: u32,
    min_size: u32,
    coverage: f32,
}

impl EdgeRefiner {
    /// Create a refiner with the given luma threshold and default padding.
    pub fn new(threshold: u32) -> Self {
        Self {
            padding: DEFAULT_EDGE_PADDING,
            threshold,
            min_size: MIN_REFINED_SIZE,
            coverage: EDGE_COVERAGE,
        }
    }

    /// Set the search padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Search padding.
    pub fn padding(&self) -> u32 {
        self.padding
    }

    /// Refine a pixel rectangle.
    ///
    /// The input is clamped to the image first. An axis whose refined span
    /// would fall below the minimum size reverts to the clamped input, so a
    /// box that was already under the minimum comes back unchanged. The
    /// extractor's size floor drops such boxes.
    pub fn refine(&self, raster: &RasterBuffer, rect: Rect) -> Rect {
        let dims = raster.dimensions();
        let Some(rect) = rect.clamp_to(dims) else {
            return rect;
        };

        let (x0, x1) = self.refine_axis(raster, rect, Axis::Vertical, dims);
        let (y0, y1) = self.refine_axis(raster, rect, Axis::Horizontal, dims);

        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Refine a candidate, tagging it as edge-refined when the box moved.
    pub fn refine_candidate(
        &self,
        raster: &RasterBuffer,
        candidate: &RegionCandidate,
    ) -> RegionCandidate {
        let original = candidate.rect();
        let refined = self.refine(raster, original);
        if refined == original {
            return candidate.clone();
        }

        let mut out = candidate.clone();
        out.bounds = candidate.bounds.with_rect(refined, raster.dimensions());
        out.source = RegionSource::EdgeRefined;
        out
    }

    /// Refine the two sides along one axis, returning `(start, end)` with an
    /// exclusive end.
    fn refine_axis(&self, raster: &RasterBuffer, rect: Rect, axis: Axis, dims: Dimensions) -> (u32, u32) {
        let (start, end, limit) = match axis {
            Axis::Vertical => (rect.x, rect.right(), dims.width),
            Axis::Horizontal => (rect.y, rect.bottom(), dims.height),
        };

        let new_start = self
            .window(start, limit)
            .find(|&pos| self.is_edge(raster, rect, axis, pos))
            .unwrap_or(start);
        let new_end = self
            .window(end, limit)
            .rev()
            .find(|&pos| self.is_edge(raster, rect, axis, pos))
            .unwrap_or(end);

        if new_end <= new_start || new_end - new_start < self.min_size {
            (start, end)
        } else {
            (new_start, new_end)
        }
    }

    /// Candidate edge coordinates around `pos`.
    ///
    /// An edge at `c` sits between pixels `c - 1` and `c`, so candidates
    /// lie in `[1, limit - 1]`.
    fn window(&self, pos: u32, limit: u32) -> std::ops::RangeInclusive<u32> {
        let lo = pos.saturating_sub(self.padding).max(1);
        let hi = pos.saturating_add(self.padding).min(limit.saturating_sub(1));
        if lo > hi {
            // Empty range
            return 1..=0;
        }
        lo..=hi
    }

    fn is_edge(&self, raster: &RasterBuffer, rect: Rect, axis: Axis, pos: u32) -> bool {
        let (span_start, span_len) = match axis {
            Axis::Vertical => (rect.y, rect.height),
            Axis::Horizontal => (rect.x, rect.width),
        };
        let scan_start = span_start + span_len / 4;
        let scan_len = (span_len / 2).max(1);

        let mut samples = 0u32;
        let mut hits = 0u32;
        for along in scan_start..scan_start + scan_len {
            let (a, b) = match axis {
                Axis::Vertical => (raster.pixel(pos - 1, along), raster.pixel(pos, along)),
                Axis::Horizontal => (raster.pixel(along, pos - 1), raster.pixel(along, pos)),
            };
            let (Some(a), Some(b)) = (a, b) else {
                continue;
            };
            samples += 1;
            if (a.luma() as i32 - b.luma() as i32).unsigned_abs() > self.threshold {
                hits += 1;
            }
        }

        samples > 0 && hits as f32 >= self.coverage * samples as f32
    }
}

impl Default for EdgeRefiner {
    fn default() -> Self {
        Self::new(regionscan_core::ExtractionOptions::default().edge_detection_threshold)
    }
}
