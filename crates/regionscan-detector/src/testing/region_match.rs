//! Tolerant comparison of detected boxes against expectations.

use serde::{Deserialize, Serialize};

use regionscan_core::{Rect, RegionCandidate};

/// An expected box paired with the detected box that matched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionMatch {
    /// Expected box
    pub expected: Rect,
    /// Detected box
    pub actual: Rect,
}

/// Result of comparing detected boxes against expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionDiff {
    /// Expected boxes with a detected counterpart
    pub matched: Vec<RegionMatch>,
    /// Expected boxes nothing matched
    pub missing: Vec<Rect>,
    /// Detected boxes matching no expectation
    pub unexpected: Vec<Rect>,
}

impl RegionDiff {
    /// Check if every expectation matched and nothing extra was found.
    pub fn is_match(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty()
    }

    /// Get total number of differences.
    pub fn diff_count(&self) -> usize {
        self.missing.len() + self.unexpected.len()
    }

    /// Generate a human-readable summary.
    pub fn summary(&self) -> String {
        if self.is_match() {
            return format!("All {} regions match", self.matched.len());
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("{} missing", self.missing.len()));
        }
        if !self.unexpected.is_empty() {
            parts.push(format!("{} unexpected", self.unexpected.len()));
        }

        format!("Differences: {}", parts.join(", "))
    }
}

/// Matches boxes whose edges all lie within a pixel tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionMatcher {
    /// Maximum per-edge difference in pixels
    pub bounds_tolerance: u32,
}

impl RegionMatcher {
    /// Create a new matcher with exact comparison.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounds tolerance for comparison.
    pub fn with_bounds_tolerance(mut self, tolerance: u32) -> Self {
        self.bounds_tolerance = tolerance;
        self
    }

    /// Check if two boxes match within tolerance.
    pub fn bounds_match(&self, a: &Rect, b: &Rect) -> bool {
        let close = |p: u32, q: u32| p.abs_diff(q) <= self.bounds_tolerance;
        close(a.x, b.x) && close(a.y, b.y) && close(a.right(), b.right()) && close(a.bottom(), b.bottom())
    }

    /// Compare expected boxes with detected boxes.
    ///
    /// Each detected box matches at most one expectation, first fit wins.
    pub fn compare(&self, expected: &[Rect], actual: &[Rect]) -> RegionDiff {
        let mut diff = RegionDiff::default();
        let mut used = vec![false; actual.len()];

        for exp in expected {
            let found = actual
                .iter()
                .enumerate()
                .find(|(i, act)| !used[*i] && self.bounds_match(exp, act));

            match found {
                Some((i, act)) => {
                    used[i] = true;
                    diff.matched.push(RegionMatch {
                        expected: *exp,
                        actual: *act,
                    });
                }
                None => diff.missing.push(*exp),
            }
        }

        diff.unexpected = actual
            .iter()
            .zip(&used)
            .filter(|(_, &u)| !u)
            .map(|(r, _)| *r)
            .collect();

        diff
    }

    /// Compare expected boxes with detector output.
    pub fn compare_candidates(&self, expected: &[Rect], actual: &[RegionCandidate]) -> RegionDiff {
        let rects: Vec<Rect> = actual.iter().map(|c| c.rect()).collect();
        self.compare(expected, &rects)
    }
}
