//! Synthetic screenshot builder.

use regionscan_core::{Dimensions, Rect, Rgba};
use regionscan_raster::RasterBuffer;

/// Builds rasters out of simple UI shapes.
///
/// Shapes are painted in call order, later shapes on top.
///
/// ```
/// use regionscan_core::{Rect, Rgba};
/// use regionscan_detector::testing::SceneBuilder;
///
/// let raster = SceneBuilder::new(200, 100, Rgba::WHITE)
///     .rect(Rect::new(10, 10, 40, 40), Rgba::rgb(200, 0, 0))
///     .build();
/// assert_eq!(raster.width(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    raster: RasterBuffer,
}

impl SceneBuilder {
    /// Start a scene filled with `background`.
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            raster: RasterBuffer::filled(Dimensions::new(width, height), background),
        }
    }

    /// Paint a filled rectangle.
    pub fn rect(mut self, rect: Rect, color: Rgba) -> Self {
        self.raster.fill_rect(rect, color);
        self
    }

    /// Paint a rectangle outline of the given thickness over a filled body.
    pub fn bordered_rect(mut self, rect: Rect, border: Rgba, thickness: u32, fill: Rgba) -> Self {
        self.raster.fill_rect(rect, border);
        let inset = thickness.saturating_mul(2);
        if rect.width > inset && rect.height > inset {
            self.raster.fill_rect(
                Rect::new(rect.x + thickness, rect.y + thickness, rect.width - inset, rect.height - inset),
                fill,
            );
        }
        self
    }

    /// Paint a line of fake glyphs: 1px strokes every 4px.
    pub fn text_line(mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) -> Self {
        let mut cx = x;
        while cx < x + width {
            self.raster.fill_rect(Rect::new(cx, y, 1, height), color);
            cx += 4;
        }
        self
    }

    /// Finish the scene.
    pub fn build(self) -> RasterBuffer {
        self.raster
    }
}
