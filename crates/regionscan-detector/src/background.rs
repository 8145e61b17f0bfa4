//! Background color estimation from border samples.

use std::collections::HashMap;

use regionscan_core::Rgba;
use regionscan_raster::RasterBuffer;

/// Evenly spaced samples taken along each image edge.
pub const EDGE_SAMPLES: u32 = 20;

/// Channel quantization step used for voting.
pub const QUANTIZE_STEP: u8 = 10;

/// Collect the border samples used for background voting.
///
/// Order: the four corners, then top, bottom, left and right edges.
pub fn sample_border(raster: &RasterBuffer) -> Vec<Rgba> {
    let (w, h) = (raster.width(), raster.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let (last_x, last_y) = (w - 1, h - 1);
    let mut samples = Vec::with_capacity(4 + 4 * EDGE_SAMPLES as usize);

    for (x, y) in [(0, 0), (last_x, 0), (0, last_y), (last_x, last_y)] {
        samples.push(raster.pixel_at(x, y));
    }

    let spaced = |i: u32, last: u32| -> u32 {
        (i as u64 * last as u64 / (EDGE_SAMPLES - 1) as u64) as u32
    };

    for i in 0..EDGE_SAMPLES {
        samples.push(raster.pixel_at(spaced(i, last_x), 0));
    }
    for i in 0..EDGE_SAMPLES {
        samples.push(raster.pixel_at(spaced(i, last_x), last_y));
    }
    for i in 0..EDGE_SAMPLES {
        samples.push(raster.pixel_at(0, spaced(i, last_y)));
    }
    for i in 0..EDGE_SAMPLES {
        samples.push(raster.pixel_at(last_x, spaced(i, last_y)));
    }

    samples
}

/// Estimate the background color of a raster.
///
/// Border samples are quantized to multiples of [`QUANTIZE_STEP`] and the
/// most frequent bucket wins; ties go to the bucket seen first. The returned
/// color is the first sample that fell into the winning bucket, so it is
/// always a real border pixel. An empty raster yields white.
pub fn estimate_background(raster: &RasterBuffer) -> Rgba {
    let samples = sample_border(raster);

    // bucket -> (count, first index, representative)
    let mut votes: HashMap<Rgba, (usize, usize, Rgba)> = HashMap::new();
    for (index, sample) in samples.iter().enumerate() {
        votes
            .entry(sample.quantized(QUANTIZE_STEP))
            .and_modify(|(count, _, _)| *count += 1)
            .or_insert((1, index, *sample));
    }

    votes
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(_, _, representative)| *representative)
        .unwrap_or(Rgba::WHITE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regionscan_core::{Dimensions, Rect};

    #[test]
    fn test_uniform_image() {
        let raster = RasterBuffer::filled(Dimensions::new(50, 30), Rgba::rgb(120, 120, 120));
        assert_eq!(estimate_background(&raster), Rgba::rgb(120, 120, 120));
    }

    #[test]
    fn test_single_pixel_image() {
        let raster = RasterBuffer::filled(Dimensions::new(1, 1), Rgba::rgb(7, 8, 9));
        assert_eq!(estimate_background(&raster), Rgba::rgb(7, 8, 9));
        assert_eq!(sample_border(&raster).len(), 84);
    }

    #[test]
    fn test_empty_image() {
        let raster = RasterBuffer::new(Dimensions::new(0, 0));
        assert!(sample_border(&raster).is_empty());
        assert_eq!(estimate_background(&raster), Rgba::WHITE);
    }

    #[test]
    fn test_majority_border_color_wins() {
        let mut raster = RasterBuffer::filled(Dimensions::new(200, 100), Rgba::WHITE);
        // Dark header strip along the top edge
        raster.fill_rect(Rect::new(0, 0, 200, 10), Rgba::rgb(20, 20, 40));

        assert_eq!(estimate_background(&raster), Rgba::WHITE);
    }

    #[test]
    fn test_near_colors_share_a_bucket() {
        let mut raster = RasterBuffer::filled(Dimensions::new(100, 100), Rgba::rgb(241, 241, 241));
        // Slightly different shade in the same bucket on the left edge
        raster.fill_rect(Rect::new(0, 0, 1, 100), Rgba::rgb(248, 243, 245));

        let bg = estimate_background(&raster);
        assert_eq!(bg.quantized(QUANTIZE_STEP), Rgba::rgb(240, 240, 240));
        // Representative is the first sample seen (top-left corner)
        assert_eq!(bg, Rgba::rgb(248, 243, 245));
    }
}
