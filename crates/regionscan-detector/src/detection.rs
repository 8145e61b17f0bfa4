//! Core detection types and traits.

use std::sync::Arc;

use tracing::debug;

use regionscan_core::{ExtractionOptions, RegionCandidate, Rgba};
use regionscan_raster::RasterBuffer;

/// Context passed to each detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionContext {
    /// Estimated background color
    pub background: Rgba,

    /// Color tolerance for background and similarity tests
    pub color_tolerance: u32,

    /// Minimum width and height of a reported region
    pub min_size: u32,

    /// Luma gradient threshold for edge tests
    pub edge_threshold: u32,
}

impl DetectionContext {
    /// Create a context with default thresholds.
    pub fn new(background: Rgba) -> Self {
        let defaults = ExtractionOptions::default();
        Self {
            background,
            color_tolerance: defaults.color_tolerance,
            min_size: defaults.min_component_size,
            edge_threshold: defaults.edge_detection_threshold,
        }
    }

    /// Create a context from extraction options.
    pub fn from_options(background: Rgba, options: &ExtractionOptions) -> Self {
        Self {
            background,
            color_tolerance: options.color_tolerance,
            min_size: options.min_component_size,
            edge_threshold: options.edge_detection_threshold,
        }
    }

    /// Set the color tolerance.
    pub fn with_color_tolerance(mut self, tolerance: u32) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    /// Set the minimum region size.
    pub fn with_min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the edge threshold.
    pub fn with_edge_threshold(mut self, threshold: u32) -> Self {
        self.edge_threshold = threshold;
        self
    }

    /// Whether a width/height pair meets the minimum size.
    pub fn is_large_enough(&self, width: u32, height: u32) -> bool {
        width >= self.min_size && height >= self.min_size
    }
}

/// Trait for region detectors.
///
/// Detectors only read the raster; any scratch buffers they need are local
/// to one `detect` call.
pub trait RegionDetector: Send + Sync {
    /// Detector name for debugging/logging.
    fn name(&self) -> &'static str;

    /// Priority (higher = runs first).
    ///
    /// Typical priorities:
    /// - 100: Structural finders (solid color blocks)
    /// - 80-70: Line-based finders (bordered regions, shadows)
    /// - 50: Mask-based finders (contours, components, flood fill)
    fn priority(&self) -> u32;

    /// Detect regions in the raster.
    fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate>;

    /// Whether this detector is enabled.
    fn enabled(&self) -> bool {
        true
    }
}

/// Detection pipeline that runs detectors in priority order.
pub struct DetectionPipeline {
    detectors: Vec<Arc<dyn RegionDetector>>,
}

impl DetectionPipeline {
    /// Create a new detection pipeline.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Add a detector to the pipeline.
    pub fn add_detector(&mut self, detector: Arc<dyn RegionDetector>) {
        self.detectors.push(detector);
        // Sort by priority (descending)
        self.detectors
            .sort_by_key(|b| std::cmp::Reverse(b.priority()));
    }

    /// Number of registered detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Whether no detectors are registered.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run all enabled detectors and union their outputs.
    pub fn detect(&self, raster: &RasterBuffer, context: &DetectionContext) -> Vec<RegionCandidate> {
        let mut all_regions = Vec::new();

        for detector in &self.detectors {
            if !detector.enabled() {
                continue;
            }

            let regions = detector.detect(raster, context);
            debug!(
                detector = detector.name(),
                count = regions.len(),
                "Detector pass complete"
            );
            all_regions.extend(regions);
        }

        all_regions
    }
}

impl Default for DetectionPipeline {
    fn default() -> Self {
        Self::new()
    }
}
