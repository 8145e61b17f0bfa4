//! Connected components and color flood fill.
//!
//! Both fills are iterative over an explicit queue. Image-sized recursion
//! would overflow the stack.

use std::collections::VecDeque;

use regionscan_core::{colors_similar, ColorMetric, Dimensions, Point, Rect};
use regionscan_raster::RasterBuffer;

use crate::mask::ForegroundMask;

/// Hard ceiling on pixels accepted by one color flood fill.
pub const FLOOD_FILL_PIXEL_CAP: usize = 50_000;

/// Extra tolerance granted while growing a color fill.
///
/// Keeps regions contiguous across anti-aliased edges.
pub const FLOOD_TOLERANCE_SLACK: u32 = 20;

/// Metric used while growing a color fill.
pub const FLOOD_METRIC: ColorMetric = ColorMetric::Euclidean;

const NEIGHBORS_4: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Flat visited buffer indexed by `y * width + x`.
#[derive(Debug, Clone)]
pub struct VisitedMask {
    bits: Vec<bool>,
    dimensions: Dimensions,
}

impl VisitedMask {
    /// Create an all-unvisited buffer.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            bits: vec![false; dimensions.pixel_count()],
            dimensions,
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.dimensions.width as usize + x as usize
    }

    /// Whether a pixel was visited. Out-of-bounds pixels count as visited.
    pub fn is_visited(&self, x: u32, y: u32) -> bool {
        x >= self.dimensions.width || y >= self.dimensions.height || self.bits[self.index(x, y)]
    }

    /// Mark a pixel visited.
    pub fn mark(&mut self, x: u32, y: u32) {
        if x < self.dimensions.width && y < self.dimensions.height {
            let i = self.index(x, y);
            self.bits[i] = true;
        }
    }

    /// Mark every pixel of a rectangle visited.
    pub fn mark_rect(&mut self, rect: Rect) {
        let Some(rect) = rect.clamp_to(self.dimensions) else {
            return;
        };
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.mark(x, y);
            }
        }
    }
}

/// One connected set of foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Tight bounding box
    pub rect: Rect,
    /// Number of pixels in the set
    pub pixel_count: usize,
}

impl Component {
    /// Fraction of the bounding box covered by the component.
    pub fn fill_ratio(&self) -> f32 {
        let area = self.rect.area();
        if area == 0 {
            0.0
        } else {
            self.pixel_count as f32 / area as f32
        }
    }
}

/// Running min/max extent of a pixel set.
struct Extent {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Extent {
    fn at(p: Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    fn include(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    fn rect(&self) -> Rect {
        Rect::from_extent(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

fn neighbor(p: (u32, u32), d: (i64, i64), dims: Dimensions) -> Option<(u32, u32)> {
    let nx = p.0 as i64 + d.0;
    let ny = p.1 as i64 + d.1;
    if nx >= 0 && ny >= 0 && nx < dims.width as i64 && ny < dims.height as i64 {
        Some((nx as u32, ny as u32))
    } else {
        None
    }
}

/// Flood-fill one 4-connected foreground component from `seed`.
///
/// Returns `None` when the seed is background or already visited. Every
/// filled pixel is marked in `visited`.
pub fn fill_mask_component(
    mask: &ForegroundMask,
    visited: &mut VisitedMask,
    seed: Point,
) -> Option<Component> {
    if !mask.get(seed.x, seed.y) || visited.is_visited(seed.x, seed.y) {
        return None;
    }

    let dims = mask.dimensions();
    let mut extent = Extent::at(seed);
    let mut pixel_count = 0;
    let mut queue = VecDeque::new();

    visited.mark(seed.x, seed.y);
    queue.push_back((seed.x, seed.y));

    while let Some((x, y)) = queue.pop_front() {
        pixel_count += 1;
        extent.include(x, y);

        for d in NEIGHBORS_4 {
            if let Some((nx, ny)) = neighbor((x, y), d, dims) {
                if mask.get(nx, ny) && !visited.is_visited(nx, ny) {
                    visited.mark(nx, ny);
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    Some(Component {
        rect: extent.rect(),
        pixel_count,
    })
}

/// Find every 4-connected foreground component, in scan order.
///
/// No size filtering happens here; callers discard small components.
pub fn find_components(mask: &ForegroundMask) -> Vec<Component> {
    let dims = mask.dimensions();
    let mut visited = VisitedMask::new(dims);
    let mut components = Vec::new();

    for y in 0..dims.height {
        for x in 0..dims.width {
            if let Some(component) = fill_mask_component(mask, &mut visited, Point::new(x, y)) {
                components.push(component);
            }
        }
    }

    components
}

/// Result of a color flood fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorFill {
    /// Bounding box of the accepted pixels
    pub rect: Rect,
    /// Number of accepted pixels
    pub pixel_count: usize,
    /// Whether the pixel cap stopped the fill early
    pub truncated: bool,
}

/// Per-fill marker for pixels already queued or rejected.
///
/// Reusable across fills over the same image: each fill bumps a generation
/// counter instead of clearing the buffer.
#[derive(Debug, Clone)]
pub struct FillScratch {
    stamps: Vec<u32>,
    generation: u32,
    dimensions: Dimensions,
}

impl FillScratch {
    /// Scratch space for an image of size `dimensions`.
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            stamps: vec![0; dimensions.pixel_count()],
            generation: 0,
            dimensions,
        }
    }

    /// Start a new fill, forgetting all marks of the previous one.
    fn begin(&mut self, dimensions: Dimensions) {
        if dimensions != self.dimensions {
            *self = Self::new(dimensions);
        }
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.stamps.fill(0);
            self.generation = 1;
        }
    }

    /// Mark index `i`, returning whether it was already marked in this fill.
    fn check_and_mark(&mut self, i: usize) -> bool {
        let seen = self.stamps[i] == self.generation;
        self.stamps[i] = self.generation;
        seen
    }
}

/// 8-connected flood fill from `seed` against the seed's exact color.
///
/// Neighbors join while within `tolerance + FLOOD_TOLERANCE_SLACK` of the
/// seed color. Stops after [`FLOOD_FILL_PIXEL_CAP`] accepted pixels; the box
/// then covers only what was accepted. The seed is always part of the fill.
/// Accepted pixels are marked in `visited`; pixels tested and rejected are
/// not, so neighboring fills can still claim them.
///
/// Allocates fresh scratch space; use [`flood_fill_color_with`] when filling
/// from many seeds.
pub fn flood_fill_color(
    raster: &RasterBuffer,
    seed: Point,
    tolerance: u32,
    visited: &mut VisitedMask,
) -> ColorFill {
    let mut scratch = FillScratch::new(raster.dimensions());
    flood_fill_color_with(raster, seed, tolerance, visited, &mut scratch)
}

/// [`flood_fill_color`] with caller-owned scratch space.
pub fn flood_fill_color_with(
    raster: &RasterBuffer,
    seed: Point,
    tolerance: u32,
    visited: &mut VisitedMask,
    scratch: &mut FillScratch,
) -> ColorFill {
    let dims = raster.dimensions();
    let target = raster.pixel_at(seed.x, seed.y);
    let grow_tolerance = tolerance.saturating_add(FLOOD_TOLERANCE_SLACK);

    scratch.begin(dims);
    let index = |x: u32, y: u32| y as usize * dims.width as usize + x as usize;

    let mut extent = Extent::at(seed);
    let mut pixel_count = 0;
    let mut truncated = false;
    let mut queue = VecDeque::new();

    scratch.check_and_mark(index(seed.x, seed.y));
    queue.push_back((seed.x, seed.y));

    while let Some((x, y)) = queue.pop_front() {
        if pixel_count >= FLOOD_FILL_PIXEL_CAP {
            truncated = true;
            break;
        }
        pixel_count += 1;
        visited.mark(x, y);
        extent.include(x, y);

        for d in NEIGHBORS_8 {
            if let Some((nx, ny)) = neighbor((x, y), d, dims) {
                if visited.is_visited(nx, ny) || scratch.check_and_mark(index(nx, ny)) {
                    continue;
                }
                if colors_similar(raster.pixel_at(nx, ny), target, grow_tolerance, FLOOD_METRIC) {
                    queue.push_back((nx, ny));
                }
            }
        }
    }

    ColorFill {
        rect: extent.rect(),
        pixel_count,
        truncated,
    }
}
