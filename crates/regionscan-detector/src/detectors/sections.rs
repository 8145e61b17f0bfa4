//! Horizontal section detector.

use regionscan_core::{colors_similar, ColorMetric, Confidence, Rect, RegionCandidate, RegionSource, Rgba};
use regionscan_raster::RasterBuffer;

use crate::detection::{DetectionContext, RegionDetector};

/// Horizontal sampling step within a row.
const ROW_SAMPLE_STEP: u32 = 4;

/// Fraction of samples that must match for a row to count as uniform.
const ROW_UNIFORMITY: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Band {
    /// Consecutive rows of one color
    Uniform { start: u32, color: Rgba },
    /// Consecutive non-uniform rows
    Content { start: u32 },
}

/// Splits a page into full-width horizontal bands.
///
/// Rows of a single color act as dividers. Runs of non-uniform rows between
/// dividers become sections, and so do solid bands whose color differs from
/// the background (headers, footers). Both must be at least `min_size` rows
/// tall.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionDetector;

impl SectionDetector {
    /// Create a new section detector.
    pub fn new() -> Self {
        Self
    }

    /// Uniform color of a row, or `None` when the row has content.
    fn row_color(raster: &RasterBuffer, y: u32, tolerance: u32) -> Option<Rgba> {
        let first = raster.pixel(0, y)?;
        let mut samples = 0u32;
        let mut matching = 0u32;
        for x in (0..raster.width()).step_by(ROW_SAMPLE_STEP as usize) {
            samples += 1;
            if colors_similar(raster.pixel_at(x, y), first, tolerance, ColorMetric::MaxChannel) {
                matching += 1;
            }
        }
        (matching as f32 >= ROW_UNIFORMITY * samples as f32).then_some(first)
    }

    /// Split rows into bands of uniform and content rows.
    fn bands(raster: &RasterBuffer, tolerance: u32) -> Vec<(Band, u32)> {
        let mut bands = Vec::new();
        let mut current: Option<Band> = None;

        for y in 0..raster.height() {
            let row = Self::row_color(raster, y, tolerance);
            let continues = match (current, row) {
                (Some(Band::Uniform { color, .. }), Some(row_color)) => {
                    colors_similar(color, row_color, tolerance, ColorMetric::MaxChannel)
                }
                (Some(Band::Content { .. }), None) => true,
                _ => false,
            };
            if continues {
                continue;
            }

            if let Some(band) = current {
                bands.push((band, y));
            }
            current = Some(match row {
                Some(color) => Band::Uniform { start: y, color },
                None => Band::Content { start: y },
            });
        }

        if let Some(band) = current {
            bands.push((band, raster.height()));
        }
        bands
    }
}

impl RegionDetector for SectionDetector {
    fn name(&self) -> &'static str {
        "sections"
    }

    fn priority(&self) -> u32 {
        60
    }

    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let dims = raster.dimensions();
        let mut results = Vec::new();

        for (band, end) in Self::bands(raster, context.color_tolerance) {
            let (start, description, confidence) = match band {
                Band::Content { start } => (start, "Content section", 80),
                Band::Uniform { start, color } => {
                    if colors_similar(color, context.background, context.color_tolerance, ColorMetric::MaxChannel) {
                        continue;
                    }
                    (start, "Solid band", 70)
                }
            };

            let height = end - start;
            if height < context.min_size || dims.width == 0 {
                continue;
            }

            results.push(RegionCandidate::new(
                Rect::new(0, start, dims.width, height),
                dims,
                RegionSource::Section,
                Confidence::new(confidence),
                format!("{} rows {}-{}", description, start, end),
            ));
        }

        results
    }
}
