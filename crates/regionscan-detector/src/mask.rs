//! Foreground mask construction and dilation.

use regionscan_core::{colors_similar, ColorMetric, Dimensions, Rect, Rgba};
use regionscan_raster::RasterBuffer;

/// Metric used to compare pixels against the background.
pub const MASK_METRIC: ColorMetric = ColorMetric::MaxChannel;

/// Boolean foreground grid, stored flat (`y * width + x`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundMask {
    bits: Vec<bool>,
    dimensions: Dimensions,
}

impl ForegroundMask {
    /// Create an all-background mask.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            bits: vec![false; dimensions.pixel_count()],
            dimensions,
        }
    }

    /// Mark every pixel that is not similar to `background`.
    pub fn build(raster: &RasterBuffer, background: Rgba, threshold: u32) -> Self {
        let dimensions = raster.dimensions();
        let mut bits = Vec::with_capacity(dimensions.pixel_count());
        for y in 0..dimensions.height {
            for x in 0..dimensions.width {
                let pixel = raster.pixel_at(x, y);
                bits.push(!colors_similar(pixel, background, threshold, MASK_METRIC));
            }
        }
        Self { bits, dimensions }
    }

    /// Mask dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.dimensions.width as usize + x as usize
    }

    /// Whether a pixel is foreground. Out-of-bounds reads are background.
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.dimensions.width && y < self.dimensions.height && self.bits[self.index(x, y)]
    }

    /// Set a pixel. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.dimensions.width && y < self.dimensions.height {
            let i = self.index(x, y);
            self.bits[i] = on;
        }
    }

    /// Number of foreground pixels.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&on| on).count()
    }

    /// Number of foreground pixels inside a rectangle.
    pub fn count_in(&self, rect: Rect) -> usize {
        let Some(rect) = rect.clamp_to(self.dimensions) else {
            return 0;
        };
        let mut count = 0;
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if self.bits[self.index(x, y)] {
                    count += 1;
                }
            }
        }
        count
    }

    /// Square dilation with the given radius.
    ///
    /// Runs as two separable passes (horizontal then vertical).
    pub fn dilate(&self, radius: u32) -> ForegroundMask {
        if radius == 0 {
            return self.clone();
        }
        let (w, h) = (self.dimensions.width, self.dimensions.height);

        let mut horizontal = ForegroundMask::new(self.dimensions);
        for y in 0..h {
            for x in 0..w {
                if self.bits[self.index(x, y)] {
                    let x0 = x.saturating_sub(radius);
                    let x1 = (x + radius).min(w - 1);
                    for nx in x0..=x1 {
                        horizontal.set(nx, y, true);
                    }
                }
            }
        }

        let mut out = ForegroundMask::new(self.dimensions);
        for y in 0..h {
            for x in 0..w {
                if horizontal.bits[horizontal.index(x, y)] {
                    let y0 = y.saturating_sub(radius);
                    let y1 = (y + radius).min(h - 1);
                    for ny in y0..=y1 {
                        out.set(x, ny, true);
                    }
                }
            }
        }
        out
    }
}
