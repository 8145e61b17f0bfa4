//! Region types produced by detection and extraction.

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{BoundingBox, Dimensions, Rect};

/// Which strategy produced a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionSource {
    /// Uniform block of one color
    SolidColor,
    /// Rectangle bounded by gradient edge lines
    Bordered,
    /// Rectangle bounded by a drop shadow
    Shadow,
    /// Seeded color flood fill
    FloodFill,
    /// Foreground mask connected component
    Contour,
    /// Dilated component (Components mode)
    Component,
    /// Box snapped to image edges by the edge refiner
    EdgeRefined,
    /// Supplied by the external detector
    ExternalSeed,
    /// Fixed grid tile
    Grid,
    /// Band between horizontal dividers
    Section,
}

impl RegionSource {
    /// Short name used in descriptions and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionSource::SolidColor => "solid-color",
            RegionSource::Bordered => "bordered",
            RegionSource::Shadow => "shadow",
            RegionSource::FloodFill => "flood-fill",
            RegionSource::Contour => "contour",
            RegionSource::Component => "component",
            RegionSource::EdgeRefined => "edge-refined",
            RegionSource::ExternalSeed => "external-seed",
            RegionSource::Grid => "grid",
            RegionSource::Section => "section",
        }
    }
}

/// Semantic label assigned by the region classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RegionLabel {
    /// Small square-ish graphic
    Icon,
    /// Small square profile picture
    Avatar,
    /// Very wide strip
    Banner,
    /// Very tall strip
    Sidebar,
    /// Roughly square, larger than an avatar
    Square,
    /// Medium to large panel
    Card,
    /// Large panel covering much of a dashboard
    DashboardCard,
    /// Short and wide control
    Button,
    /// Generic picture
    Image,
    /// Anything else
    Component,
}

impl RegionLabel {
    /// Label as used in filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLabel::Icon => "icon",
            RegionLabel::Avatar => "avatar",
            RegionLabel::Banner => "banner",
            RegionLabel::Sidebar => "sidebar",
            RegionLabel::Square => "square",
            RegionLabel::Card => "card",
            RegionLabel::DashboardCard => "dashboard-card",
            RegionLabel::Button => "button",
            RegionLabel::Image => "image",
            RegionLabel::Component => "component",
        }
    }
}

impl std::fmt::Display for RegionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detection confidence score (0-100).
///
/// Deserialization goes through [`Confidence::new`], so out-of-range input
/// is clamped rather than carried through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    /// Highest possible score.
    pub const CERTAIN: Confidence = Confidence(100);

    /// Create a score, clamping to 100.
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Create a score from a 0.0-1.0 fraction.
    pub fn from_fraction(fraction: f32) -> Self {
        Self::new((fraction.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    /// Raw score.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl<'de> Deserialize<'de> for Confidence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u8::deserialize(deserializer).map(Confidence::new)
    }
}

/// Region candidate prior to merging and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegionCandidate {
    /// Bounding box
    pub bounds: BoundingBox,
    /// Producing strategy
    pub source: RegionSource,
    /// Confidence score
    pub confidence: Confidence,
    /// Free-text description for display
    pub description: String,
}

impl RegionCandidate {
    /// Create a candidate for `rect` inside an image of size `image`.
    pub fn new(
        rect: Rect,
        image: Dimensions,
        source: RegionSource,
        confidence: Confidence,
        description: impl Into<String>,
    ) -> Self {
        Self {
            bounds: BoundingBox::from_rect(rect, image),
            source,
            confidence,
            description: description.into(),
        }
    }

    /// Pixel rectangle.
    pub fn rect(&self) -> Rect {
        self.bounds.rect()
    }
}

/// Encoded image bytes with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImagePayload {
    /// MIME type (e.g. "image/png")
    pub mime_type: String,
    /// Encoded bytes (base64 in serialized form)
    #[serde(serialize_with = "serialize_base64", deserialize_with = "deserialize_base64")]
    #[schemars(with = "String")]
    pub data: Vec<u8>,
}

impl ImagePayload {
    /// Create a payload.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Encoded bytes as base64.
    pub fn to_base64(&self) -> String {
        B64.encode(&self.data)
    }

    /// `data:` URL for embedding.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&B64.encode(data))
}

fn deserialize_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let encoded = String::deserialize(deserializer)?;
    B64.decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}

/// Finalized region in an extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedRegion {
    /// 1-based position in the result list
    pub index: usize,
    /// Bounding box (pixel and normalized)
    pub bounds: BoundingBox,
    /// Semantic label
    pub label: RegionLabel,
    /// Producing strategy
    pub source: RegionSource,
    /// Confidence score
    pub confidence: Confidence,
    /// Human-readable description
    pub description: String,
    /// Suggested filename for the crop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Encoded crop (absent in detect-only runs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImagePayload>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamps() {
        assert_eq!(Confidence::new(150).value(), 100);
        assert_eq!(Confidence::new(42).value(), 42);
        assert_eq!(Confidence::from_fraction(0.76).value(), 76);
        assert_eq!(Confidence::from_fraction(3.0), Confidence::CERTAIN);
    }

    #[test]
    fn test_confidence_deserialize_clamps() {
        let confidence: Confidence = serde_json::from_str("250").unwrap();
        assert_eq!(confidence, Confidence::CERTAIN);

        let candidate: RegionCandidate = serde_json::from_value(serde_json::json!({
            "bounds": serde_json::to_value(BoundingBox::from_rect(
                Rect::new(0, 0, 10, 10),
                Dimensions::new(100, 100),
            ))
            .unwrap(),
            "source": "external_seed",
            "confidence": 180,
            "description": "seed"
        }))
        .unwrap();
        assert_eq!(candidate.confidence.value(), 100);
        assert_eq!(serde_json::to_string(&candidate.confidence).unwrap(), "100");
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::new(90) > Confidence::new(60));
    }

    #[test]
    fn test_candidate_bounds() {
        let candidate = RegionCandidate::new(
            Rect::new(10, 10, 20, 20),
            Dimensions::new(100, 100),
            RegionSource::Contour,
            Confidence::new(80),
            "component",
        );
        assert_eq!(candidate.rect(), Rect::new(10, 10, 20, 20));
        assert_eq!(candidate.bounds.nx, 0.1);
    }

    #[test]
    fn test_label_serialization() {
        let json = serde_json::to_string(&RegionLabel::DashboardCard).unwrap();
        assert_eq!(json, "\"dashboard_card\"");
        assert_eq!(RegionLabel::DashboardCard.as_str(), "dashboard-card");
    }

    #[test]
    fn test_payload_base64_round_trip() {
        let payload = ImagePayload::new("image/png", vec![0, 1, 2, 255]);
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("AAEC/w=="));

        let back: ImagePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
        assert_eq!(payload.to_data_url(), "data:image/png;base64,AAEC/w==");
    }
}
