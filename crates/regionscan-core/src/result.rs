//! Extraction result type.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{BoundingBox, Dimensions, ExtractedRegion, ExtractionMode, Rgba};

/// A region whose crop could not be produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CropFailure {
    /// Box that failed to crop
    pub bounds: BoundingBox,
    /// Failure message
    pub message: String,
}

/// Outcome of one extraction call.
///
/// `success` is false both for hard failures (`error` is set) and for runs
/// that found nothing (`error` is `None`, `summary` says so).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    /// Whether at least one region was extracted
    pub success: bool,
    /// Mode that produced this result
    pub mode: ExtractionMode,
    /// Source image dimensions (absent when decoding failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Estimated background color, when the mode computed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Rgba>,
    /// Extracted regions
    pub regions: Vec<ExtractedRegion>,
    /// Boxes whose crop failed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crop_failures: Vec<CropFailure>,
    /// Error message for a failed call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable summary
    pub summary: String,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ExtractionResult {
    /// Failed call with an error message and no regions.
    pub fn failed(mode: ExtractionMode, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            mode,
            dimensions: None,
            background: None,
            regions: Vec::new(),
            crop_failures: Vec::new(),
            summary: format!("{mode} extraction failed: {error}"),
            error: Some(error),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Result assembled from extracted regions.
    ///
    /// An empty region list yields `success = false` with no error message.
    pub fn from_regions(
        mode: ExtractionMode,
        dimensions: Dimensions,
        background: Option<Rgba>,
        regions: Vec<ExtractedRegion>,
        crop_failures: Vec<CropFailure>,
    ) -> Self {
        let summary = if regions.is_empty() {
            format!(
                "No regions found in {}x{} image ({mode})",
                dimensions.width, dimensions.height
            )
        } else {
            let mut summary = format!(
                "Extracted {} region{} from {}x{} image ({mode})",
                regions.len(),
                if regions.len() == 1 { "" } else { "s" },
                dimensions.width,
                dimensions.height
            );
            if !crop_failures.is_empty() {
                summary.push_str(&format!(", {} crop failure(s)", crop_failures.len()));
            }
            summary
        };

        Self {
            success: !regions.is_empty(),
            mode,
            dimensions: Some(dimensions),
            background,
            regions,
            crop_failures,
            error: None,
            summary,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whether the call found nothing without failing.
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.regions.is_empty()
    }
}
