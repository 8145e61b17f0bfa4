//! Geometry types for pixel coordinates and regions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Position in the image (x = column, y = row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    /// Column index (0-based)
    pub x: u32,
    /// Row index (0-based)
    pub y: u32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Origin point (0, 0).
    pub fn origin() -> Self {
        Self { x: 0, y: 0 }
    }
}

/// Dimensions of an image or region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create new dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count (width * height).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Rectangle covering the whole image.
    pub fn full_rect(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }
}

/// Axis-aligned rectangle in pixel space.
///
/// `right()` and `bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from inclusive pixel extents.
    ///
    /// `max_x`/`max_y` are the last covered column/row.
    pub fn from_extent(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            x: min_x,
            y: min_y,
            width: max_x.saturating_sub(min_x) + 1,
            height: max_y.saturating_sub(min_y) + 1,
        }
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height (0.0 for an empty rectangle).
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Check if a point lies within this rectangle.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Check if `other` lies completely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.right() <= other.x
            || other.right() <= self.x
            || self.bottom() <= other.y
            || other.bottom() <= self.y)
    }

    /// Overlapping part of two rectangles, if any.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Area of the overlapping part (0 when disjoint).
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        self.intersection(other).map_or(0, |r| r.area())
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Clamp to image bounds.
    ///
    /// Returns `None` if nothing of the rectangle remains inside the image.
    pub fn clamp_to(&self, dims: Dimensions) -> Option<Rect> {
        if self.x >= dims.width || self.y >= dims.height {
            return None;
        }
        let right = self.right().min(dims.width);
        let bottom = self.bottom().min(dims.height);
        let clamped = Rect::new(self.x, self.y, right - self.x, bottom - self.y);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}

/// Bounding box in pixel space with its normalized equivalent.
///
/// Normalized fields are fractions of the source image's width/height and are
/// always derived from the pixel fields; use [`BoundingBox::from_rect`] or
/// [`BoundingBox::with_rect`] to change a box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    /// Left column
    pub x: u32,
    /// Top row
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Normalized left (0.0-1.0)
    pub nx: f64,
    /// Normalized top (0.0-1.0)
    pub ny: f64,
    /// Normalized width (0.0-1.0)
    pub nw: f64,
    /// Normalized height (0.0-1.0)
    pub nh: f64,
}

impl BoundingBox {
    /// Create a bounding box for `rect` inside an image of size `image`.
    pub fn from_rect(rect: Rect, image: Dimensions) -> Self {
        let w = image.width.max(1) as f64;
        let h = image.height.max(1) as f64;
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            nx: rect.x as f64 / w,
            ny: rect.y as f64 / h,
            nw: rect.width as f64 / w,
            nh: rect.height as f64 / h,
        }
    }

    /// Create a bounding box from normalized coordinates.
    ///
    /// The pixel rectangle is rounded and the normalized fields recomputed
    /// from it so both forms agree.
    pub fn from_normalized(nx: f64, ny: f64, nw: f64, nh: f64, image: Dimensions) -> Self {
        let w = image.width as f64;
        let h = image.height as f64;
        let x = (nx.clamp(0.0, 1.0) * w).round() as u32;
        let y = (ny.clamp(0.0, 1.0) * h).round() as u32;
        let width = (nw.clamp(0.0, 1.0) * w).round() as u32;
        let height = (nh.clamp(0.0, 1.0) * h).round() as u32;
        Self::from_rect(Rect::new(x, y, width, height), image)
    }

    /// Pixel rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Replace the pixel rectangle, recomputing normalized fields.
    pub fn with_rect(&self, rect: Rect, image: Dimensions) -> Self {
        Self::from_rect(rect, image)
    }

    /// Area in pixels.
    pub fn area(&self) -> u64 {
        self.rect().area()
    }
}
