//! Bounds tightening against a foreground mask.

use regionscan_core::Rect;

use crate::mask::ForegroundMask;

/// Shrink `rect` to the extent of the foreground pixels inside it.
///
/// The rectangle is clipped to the mask first. A box with no foreground
/// pixels is returned unchanged.
pub fn tighten_bounds(rect: Rect, mask: &ForegroundMask) -> Rect {
    let Some(area) = rect.clamp_to(mask.dimensions()) else {
        return rect;
    };

    let mut extent: Option<(u32, u32, u32, u32)> = None;
    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            if !mask.get(x, y) {
                continue;
            }
            extent = Some(match extent {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
    }

    match extent {
        Some((min_x, min_y, max_x, max_y)) => Rect::from_extent(min_x, min_y, max_x, max_y),
        None => rect,
    }
}
