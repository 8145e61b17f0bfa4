//! Overlap and adjacency based region merging.

use regionscan_core::{BoundingBox, Dimensions, MergeSettings, Rect, RegionCandidate};

/// Unions boxes that overlap or sit next to each other.
///
/// Two boxes merge when their intersection exceeds `overlap_threshold` times
/// the smaller box's area, or (when an adjacency margin is set) when they are
/// separated by at most `margin` pixels along one axis while overlapping on
/// the other. Merging repeats until no pair qualifies, so feeding the output
/// back in returns it unchanged. The grouping depends on input order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionMerger {
    overlap_threshold: f32,
    adjacency_margin: Option<u32>,
}

impl RegionMerger {
    /// Merger using overlap only.
    pub fn new(overlap_threshold: f32) -> Self {
        Self {
            overlap_threshold,
            adjacency_margin: None,
        }
    }

    /// Also merge boxes within `margin` pixels of each other.
    pub fn with_adjacency(mut self, margin: u32) -> Self {
        self.adjacency_margin = Some(margin);
        self
    }

    /// Merger configured from engine settings.
    pub fn from_settings(settings: &MergeSettings) -> Self {
        Self::new(settings.overlap_threshold).with_adjacency(settings.adjacency_margin)
    }

    /// Overlap threshold.
    pub fn overlap_threshold(&self) -> f32 {
        self.overlap_threshold
    }

    /// Whether two boxes should be merged.
    pub fn should_merge(&self, a: &Rect, b: &Rect) -> bool {
        self.overlaps_enough(a, b) || self.is_adjacent(a, b)
    }

    fn overlaps_enough(&self, a: &Rect, b: &Rect) -> bool {
        let smaller = a.area().min(b.area());
        if smaller == 0 {
            return false;
        }
        let overlap = a.intersection_area(b);
        overlap as f64 > self.overlap_threshold as f64 * smaller as f64
    }

    fn is_adjacent(&self, a: &Rect, b: &Rect) -> bool {
        let Some(margin) = self.adjacency_margin else {
            return false;
        };
        let overlap_x = a.x < b.right() && b.x < a.right();
        let overlap_y = a.y < b.bottom() && b.y < a.bottom();

        if overlap_y && !overlap_x {
            let gap = if a.right() <= b.x { b.x - a.right() } else { a.x - b.right() };
            return gap <= margin;
        }
        if overlap_x && !overlap_y {
            let gap = if a.bottom() <= b.y { b.y - a.bottom() } else { a.y - b.bottom() };
            return gap <= margin;
        }
        false
    }

    /// Merge plain rectangles.
    pub fn merge_rects(&self, rects: Vec<Rect>) -> Vec<Rect> {
        self.merge_by(rects, |r| *r, |a, b| a.union(&b))
    }

    /// Merge candidates.
    ///
    /// A merged candidate keeps the highest confidence of its members and
    /// the source and description of the largest member. Normalized bounds
    /// are recomputed for `image`.
    pub fn merge(&self, candidates: Vec<RegionCandidate>, image: Dimensions) -> Vec<RegionCandidate> {
        self.merge_by(
            candidates,
            |c| c.rect(),
            |a, b| {
                let union = a.rect().union(&b.rect());
                let confidence = a.confidence.max(b.confidence);
                let mut keep = if b.bounds.area() > a.bounds.area() { b } else { a };
                keep.bounds = BoundingBox::from_rect(union, image);
                keep.confidence = confidence;
                keep
            },
        )
    }

    fn merge_by<T, R, C>(&self, mut items: Vec<T>, rect_of: R, combine: C) -> Vec<T>
    where
        T: Clone,
        R: Fn(&T) -> Rect,
        C: Fn(T, T) -> T,
    {
        let mut changed = true;
        while changed {
            changed = false;
            let mut i = 0;
            while i < items.len() {
                let mut j = i + 1;
                while j < items.len() {
                    if self.should_merge(&rect_of(&items[i]), &rect_of(&items[j])) {
                        let other = items.remove(j);
                        items[i] = combine(items[i].clone(), other);
                        changed = true;
                        // items[i] grew; recheck everything after it
                        j = i + 1;
                    } else {
                        j += 1;
                    }
                }
                i += 1;
            }
        }
        items
    }
}

impl Default for RegionMerger {
    fn default() -> Self {
        Self::from_settings(&MergeSettings::default())
    }
}
