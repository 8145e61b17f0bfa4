//! Region extraction entry point.
//!
//! [`RegionExtractor`] decodes an image, estimates its background, runs the
//! strategy for the requested mode, then classifies, crops and assembles the
//! result. Failures never escape as `Err`: they come back as a failed
//! [`ExtractionResult`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use regionscan_core::{
    CropFailure, EngineConfig, Error, ExtractedRegion, ExtractionMode, ExtractionOptions,
    ExtractionResult, MergeSettings, RegionCandidate, Result,
};
use regionscan_detector::{estimate_background, DetectionContext, RegionClassifier};
use regionscan_raster::{DefaultCodec, ImageCodec, RasterBuffer};

use crate::crop::CropExecutor;
use crate::external::ExternalDetector;
use crate::modes::{ModeInput, ModeRegistry};

/// Smallest width and height a detected region may have.
///
/// Grid and sections partition the image and are exempt.
pub const MIN_REGION_SIDE: u32 = 4;

/// Model-free region extractor.
///
/// Holds no per-call state, so one instance can serve many threads through
/// an `Arc`.
pub struct RegionExtractor {
    codec: Arc<dyn ImageCodec>,
    external: Option<Arc<dyn ExternalDetector>>,
    registry: ModeRegistry,
    classifier: RegionClassifier,
    merge: MergeSettings,
    defaults: ExtractionOptions,
}

impl RegionExtractor {
    /// Extractor with the default codec and no external detector.
    pub fn new() -> Self {
        Self {
            codec: Arc::new(DefaultCodec::new()),
            external: None,
            registry: ModeRegistry::standard(),
            classifier: RegionClassifier::default(),
            merge: MergeSettings::default(),
            defaults: ExtractionOptions::default(),
        }
    }

    /// Extractor configured from an engine config.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new()
            .with_merge_settings(config.merge)
            .with_default_options(config.extraction.clone())
    }

    /// Use a different image codec.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Attach an external detector for the smart-detect and hybrid modes.
    pub fn with_external_detector(mut self, detector: Arc<dyn ExternalDetector>) -> Self {
        self.external = Some(detector);
        self
    }

    /// Override the merge settings used by flood-fill and hybrid modes.
    pub fn with_merge_settings(mut self, merge: MergeSettings) -> Self {
        self.merge = merge;
        self
    }

    /// Override the classifier.
    pub fn with_classifier(mut self, classifier: RegionClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Override the default options.
    pub fn with_default_options(mut self, options: ExtractionOptions) -> Self {
        self.defaults = options;
        self
    }

    /// Options used when a caller has none of its own.
    pub fn default_options(&self) -> &ExtractionOptions {
        &self.defaults
    }

    /// Decode `bytes` and extract regions.
    pub fn extract(
        &self,
        bytes: &[u8],
        mime_type: Option<&str>,
        options: &ExtractionOptions,
    ) -> ExtractionResult {
        if let Err(e) = options.validate() {
            return ExtractionResult::failed(options.mode, e.to_string());
        }

        let raster = match self.codec.decode(bytes, mime_type) {
            Ok(raster) => raster,
            Err(e) => {
                error!(mode = %options.mode, mime = ?mime_type, error = %e, "Failed to decode image");
                return ExtractionResult::failed(options.mode, e.to_string());
            }
        };

        self.extract_raster(&raster, options)
    }

    /// Extract regions from an already decoded raster.
    pub fn extract_raster(&self, raster: &RasterBuffer, options: &ExtractionOptions) -> ExtractionResult {
        let started = Instant::now();
        let mode = options.mode;

        if let Err(e) = options.validate() {
            return ExtractionResult::failed(mode, e.to_string());
        }

        let dimensions = raster.dimensions();
        if dimensions.is_empty() {
            let e = Error::InvalidDimensions {
                width: dimensions.width,
                height: dimensions.height,
            };
            return ExtractionResult::failed(mode, e.to_string());
        }

        let background = estimate_background(raster);
        let context = DetectionContext::from_options(background, options);
        debug!(%mode, background = %background.to_hex(), "Estimated background");

        let candidates = match self.run_strategy(raster, options, &context) {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(%mode, error = %e, "Extraction failed");
                return ExtractionResult::failed(mode, e.to_string());
            }
        };

        let candidates = self.finalize_candidates(candidates, raster, options);
        let (regions, crop_failures) = self.build_regions(candidates, raster, options);

        info!(
            %mode,
            regions = regions.len(),
            crop_failures = crop_failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Extraction complete"
        );

        ExtractionResult::from_regions(mode, dimensions, Some(background), regions, crop_failures)
    }

    /// Extract on tokio's blocking pool, optionally bounded by a timeout.
    ///
    /// On timeout the blocking work is abandoned, not interrupted.
    pub async fn extract_async(
        self: &Arc<Self>,
        bytes: Vec<u8>,
        mime_type: Option<String>,
        options: ExtractionOptions,
        timeout: Option<Duration>,
    ) -> ExtractionResult {
        let mode = options.mode;
        let extractor = Arc::clone(self);
        let task = tokio::task::spawn_blocking(move || {
            extractor.extract(&bytes, mime_type.as_deref(), &options)
        });

        let joined = match timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    let e = Error::Timeout(limit.as_millis() as u64);
                    warn!(%mode, error = %e, "Extraction abandoned");
                    return ExtractionResult::failed(mode, e.to_string());
                }
            },
            None => task.await,
        };

        joined.unwrap_or_else(|e| ExtractionResult::failed(mode, format!("Extraction task failed: {e}")))
    }

    /// Dispatch to the mode strategy, turning panics into errors.
    fn run_strategy(
        &self,
        raster: &RasterBuffer,
        options: &ExtractionOptions,
        context: &DetectionContext,
    ) -> Result<Vec<RegionCandidate>> {
        let mode = options.mode;
        let strategy = self
            .registry
            .get(mode)
            .ok_or_else(|| Error::InvalidOptions(format!("no strategy registered for mode {mode}")))?;

        let input = ModeInput {
            raster,
            options,
            context,
            external: self.external.as_deref(),
            merge: &self.merge,
        };

        catch_unwind(AssertUnwindSafe(|| strategy.detect(&input))).unwrap_or_else(|panic| {
            Err(Error::Detector {
                detector: mode.as_str().to_string(),
                message: panic_message(panic.as_ref()),
            })
        })
    }

    /// Clamp candidates to the image, drop empty and undersized ones and
    /// apply `max_regions`.
    fn finalize_candidates(
        &self,
        candidates: Vec<RegionCandidate>,
        raster: &RasterBuffer,
        options: &ExtractionOptions,
    ) -> Vec<RegionCandidate> {
        let dimensions = raster.dimensions();
        let floor = match options.mode {
            ExtractionMode::Grid | ExtractionMode::Sections => 1,
            _ => MIN_REGION_SIDE,
        };
        let mut kept: Vec<RegionCandidate> = candidates
            .into_iter()
            .filter_map(|mut candidate| {
                let rect = candidate.rect();
                match rect.clamp_to(dimensions) {
                    Some(clamped) if clamped.width < floor || clamped.height < floor => {
                        debug!(rect = ?clamped, source = candidate.source.as_str(), "Dropping undersized region");
                        None
                    }
                    Some(clamped) => {
                        if clamped != rect {
                            candidate.bounds = candidate.bounds.with_rect(clamped, dimensions);
                        }
                        Some(candidate)
                    }
                    None => {
                        debug!(?rect, source = candidate.source.as_str(), "Dropping invalid region");
                        None
                    }
                }
            })
            .collect();

        if let Some(max) = options.max_regions {
            kept.truncate(max);
        }
        kept
    }

    /// Classify and crop each candidate; crop failures are recorded and skipped.
    fn build_regions(
        &self,
        candidates: Vec<RegionCandidate>,
        raster: &RasterBuffer,
        options: &ExtractionOptions,
    ) -> (Vec<ExtractedRegion>, Vec<CropFailure>) {
        let cropper = CropExecutor::new(Arc::clone(&self.codec), options.output_format);
        let mut regions = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();

        for candidate in candidates {
            let rect = candidate.rect();
            let label = self.classifier.classify_rect(&rect);
            let index = regions.len() + 1;

            let (filename, image) = if options.detect_only {
                (None, None)
            } else {
                match cropper.crop(raster, rect) {
                    Ok(payload) => (
                        Some(cropper.filename(options.mode, index, label)),
                        Some(payload),
                    ),
                    Err(e) => {
                        warn!(?rect, error = %e, "Crop failed, skipping region");
                        failures.push(CropFailure {
                            bounds: candidate.bounds,
                            message: e.to_string(),
                        });
                        continue;
                    }
                }
            };

            let description = if candidate.description.is_empty() {
                format!("{} at ({}, {})", label.as_str(), rect.x, rect.y)
            } else {
                candidate.description
            };

            regions.push(ExtractedRegion {
                index,
                bounds: candidate.bounds,
                label,
                source: candidate.source,
                confidence: candidate.confidence,
                description,
                filename,
                image,
            });
        }

        (regions, failures)
    }
}

impl Default for RegionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RegionExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionExtractor")
            .field("codec", &self.codec.name())
            .field("external", &self.external.as_ref().map(|d| d.name().to_string()))
            .field("strategies", &self.registry.len())
            .field("merge", &self.merge)
            .finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}
