//! RGBA color type and color similarity metrics.
//!
//! Two distance metrics are in use and they are not interchangeable:
//! [`ColorMetric::MaxChannel`] (largest per-channel difference) and
//! [`ColorMetric::Euclidean`] (RGB distance). Alpha never takes part in
//! a comparison.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Rgba {
    /// Opaque white.
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    /// Create a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Unweighted average of R, G and B.
    pub fn luma(&self) -> u8 {
        ((self.r as u16 + self.g as u16 + self.b as u16) / 3) as u8
    }

    /// Round each RGB channel down to a multiple of `step`.
    ///
    /// Alpha is dropped from the result (set to 255) so quantized values can
    /// be used as histogram keys.
    pub fn quantized(&self, step: u8) -> Rgba {
        let step = step.max(1);
        let q = |c: u8| c - c % step;
        Rgba::rgb(q(self.r), q(self.g), q(self.b))
    }

    /// Largest absolute per-channel difference over R, G and B.
    pub fn max_channel_distance(&self, other: &Rgba) -> u32 {
        let dr = self.r.abs_diff(other.r);
        let dg = self.g.abs_diff(other.g);
        let db = self.b.abs_diff(other.b);
        dr.max(dg).max(db) as u32
    }

    /// Euclidean distance in RGB space.
    pub fn euclidean_distance(&self, other: &Rgba) -> f64 {
        (self.squared_distance(other) as f64).sqrt()
    }

    fn squared_distance(&self, other: &Rgba) -> u32 {
        let dr = self.r.abs_diff(other.r) as u32;
        let dg = self.g.abs_diff(other.g) as u32;
        let db = self.b.abs_diff(other.b) as u32;
        dr * dr + dg * dg + db * db
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color distance metric used by a similarity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColorMetric {
    /// Largest per-channel difference (Chebyshev distance)
    MaxChannel,
    /// Straight-line RGB distance
    Euclidean,
}

/// Whether two colors are within `tolerance` of each other under `metric`.
pub fn colors_similar(a: Rgba, b: Rgba, tolerance: u32, metric: ColorMetric) -> bool {
    match metric {
        ColorMetric::MaxChannel => colors_similar_max_channel(a, b, tolerance),
        ColorMetric::Euclidean => colors_similar_euclidean(a, b, tolerance),
    }
}

/// Every RGB channel differs by at most `tolerance`.
pub fn colors_similar_max_channel(a: Rgba, b: Rgba, tolerance: u32) -> bool {
    a.max_channel_distance(&b) <= tolerance
}

/// RGB distance is at most `tolerance`.
pub fn colors_similar_euclidean(a: Rgba, b: Rgba, tolerance: u32) -> bool {
    a.squared_distance(&b) <= tolerance.saturating_mul(tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_is_unweighted_average() {
        assert_eq!(Rgba::rgb(30, 60, 90).luma(), 60);
        assert_eq!(Rgba::WHITE.luma(), 255);
        assert_eq!(Rgba::BLACK.luma(), 0);
    }

    #[test]
    fn test_quantized() {
        assert_eq!(Rgba::rgb(249, 13, 0).quantized(10), Rgba::rgb(240, 10, 0));
        assert_eq!(Rgba::new(5, 5, 5, 12).quantized(10), Rgba::rgb(0, 0, 0));
    }

    #[test]
    fn test_max_channel_similarity() {
        let a = Rgba::rgb(100, 100, 100);
        let b = Rgba::rgb(110, 95, 100);

        assert_eq!(a.max_channel_distance(&b), 10);
        assert!(colors_similar_max_channel(a, b, 10));
        assert!(!colors_similar_max_channel(a, b, 9));
    }

    #[test]
    fn test_euclidean_similarity() {
        let a = Rgba::rgb(0, 0, 0);
        let b = Rgba::rgb(3, 4, 0);

        assert_eq!(a.euclidean_distance(&b), 5.0);
        assert!(colors_similar_euclidean(a, b, 5));
        assert!(!colors_similar_euclidean(a, b, 4));
    }

    #[test]
    fn test_metrics_are_not_interchangeable() {
        let a = Rgba::rgb(100, 100, 100);
        let b = Rgba::rgb(120, 120, 120);

        // Max channel sees 20, Euclidean sees ~34.6
        assert!(colors_similar(a, b, 20, ColorMetric::MaxChannel));
        assert!(!colors_similar(a, b, 20, ColorMetric::Euclidean));
    }

    #[test]
    fn test_alpha_ignored() {
        let a = Rgba::new(10, 10, 10, 0);
        let b = Rgba::new(10, 10, 10, 255);
        assert!(colors_similar(a, b, 0, ColorMetric::MaxChannel));
        assert!(colors_similar(a, b, 0, ColorMetric::Euclidean));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgba::rgb(255, 0, 16).to_hex(), "#ff0010");
    }
}
