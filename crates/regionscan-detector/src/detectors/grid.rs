//! Fixed grid tiling.

use regionscan_core::{Confidence, Dimensions, Rect, RegionCandidate, RegionSource};
use regionscan_raster::RasterBuffer;

use crate::detection::{DetectionContext, RegionDetector};

/// Split an image into `rows` x `columns` tiles in row-major order.
///
/// Every tile has the base size `width / columns` by `height / rows`; the
/// last column and row absorb the remainder. Tiles cover the image exactly
/// once. Zero rows or columns yield no tiles.
pub fn tile(dims: Dimensions, rows: u32, columns: u32) -> Vec<Rect> {
    if rows == 0 || columns == 0 {
        return Vec::new();
    }
    let base_w = dims.width / columns;
    let base_h = dims.height / rows;

    let mut tiles = Vec::with_capacity(rows as usize * columns as usize);
    for r in 0..rows {
        let y = r * base_h;
        let h = if r == rows - 1 { dims.height - y } else { base_h };
        for c in 0..columns {
            let x = c * base_w;
            let w = if c == columns - 1 { dims.width - x } else { base_w };
            tiles.push(Rect::new(x, y, w, h));
        }
    }
    tiles
}

/// Reports grid tiles as regions. Empty tiles are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTiler {
    rows: u32,
    columns: u32,
}

impl GridTiler {
    /// Create a tiler.
    pub fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }
}

impl RegionDetector for GridTiler {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn detect(&self, raster: &RasterBuffer, _context: &DetectionContext) -> Vec<RegionCandidate> {
        let dims = raster.dimensions();
        tile(dims, self.rows, self.columns)
            .into_iter()
            .enumerate()
            .filter(|(_, rect)| !rect.is_empty())
            .map(|(i, rect)| {
                let (row, column) = (i as u32 / self.columns + 1, i as u32 % self.columns + 1);
                RegionCandidate::new(
                    rect,
                    dims,
                    RegionSource::Grid,
                    Confidence::CERTAIN,
                    format!("Grid cell row {} column {}", row, column),
                )
            })
            .collect()
    }
}
