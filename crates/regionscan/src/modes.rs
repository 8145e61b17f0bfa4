//! Mode strategy table.
//!
//! Each [`ExtractionMode`] maps to one [`ModeStrategy`] trait object. The
//! [`ModeRegistry`] builds the table once and the extractor dispatches by
//! tag. Strategies only produce candidates; classification, cropping and
//! result assembly happen in the extractor.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use regionscan_core::{
    Error, ExtractionMode, ExtractionOptions, MergeSettings, RegionCandidate, Result,
};
use regionscan_detector::{
    CardMultiPassDetector, ComponentDetector, ContourDetector, DetectionContext, EdgeRefiner,
    FloodFillDetector, GridTiler, RegionDetector, RegionMerger, SectionDetector,
};
use regionscan_raster::RasterBuffer;

use crate::external::{seeds_to_candidates, ExternalDetector};

/// Everything a strategy may look at for one extraction.
#[derive(Clone, Copy)]
pub struct ModeInput<'a> {
    /// Decoded image
    pub raster: &'a RasterBuffer,
    /// Caller options
    pub options: &'a ExtractionOptions,
    /// Background and thresholds derived from the options
    pub context: &'a DetectionContext,
    /// External detector, when one is configured
    pub external: Option<&'a dyn ExternalDetector>,
    /// Merge settings from the engine config
    pub merge: &'a MergeSettings,
}

impl ModeInput<'_> {
    fn refiner(&self) -> EdgeRefiner {
        EdgeRefiner::new(self.options.edge_detection_threshold)
            .with_padding(self.options.edge_search_padding)
    }

    fn external_seeds(&self, detector: &dyn ExternalDetector) -> Result<Vec<RegionCandidate>> {
        let regions = detector.detect(self.raster)?;
        debug!(detector = detector.name(), seeds = regions.len(), "External detector finished");
        Ok(seeds_to_candidates(regions, self.raster.dimensions()))
    }

    /// Drop candidates under `min_component_size` in either dimension.
    fn retain_large_enough(&self, candidates: Vec<RegionCandidate>) -> Vec<RegionCandidate> {
        let before = candidates.len();
        let kept: Vec<RegionCandidate> = candidates
            .into_iter()
            .filter(|c| {
                let rect = c.rect();
                self.context.is_large_enough(rect.width, rect.height)
            })
            .collect();
        if kept.len() < before {
            debug!(dropped = before - kept.len(), min_size = self.context.min_size, "Dropped small seeds");
        }
        kept
    }
}

/// Candidate producer for one extraction mode.
pub trait ModeStrategy: Send + Sync {
    /// Mode served by this strategy.
    fn mode(&self) -> ExtractionMode;

    /// Produce candidate regions.
    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>>;
}

/// Fixed rows x columns tiling.
pub struct GridMode;

impl ModeStrategy for GridMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Grid
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        let tiler = GridTiler::new(input.options.rows, input.options.columns);
        Ok(tiler.detect(input.raster, input.context))
    }
}

/// Horizontal bands between uniform divider rows.
pub struct SectionsMode;

impl ModeStrategy for SectionsMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Sections
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        Ok(SectionDetector::new().detect(input.raster, input.context))
    }
}

/// Dilated components with text-like blobs removed.
pub struct ComponentsMode;

impl ModeStrategy for ComponentsMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Components
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        Ok(ComponentDetector::new().detect(input.raster, input.context))
    }
}

/// Plain foreground components.
pub struct ContourMode;

impl ModeStrategy for ContourMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::ContourDetection
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        Ok(ContourDetector::new().detect(input.raster, input.context))
    }
}

/// Seeded color fills, merged.
pub struct FloodFillMode;

impl ModeStrategy for FloodFillMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::FloodFillRegions
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        let fills = FloodFillDetector::new().detect(input.raster, input.context);
        let merger = RegionMerger::from_settings(input.merge);
        Ok(merger.merge(fills, input.raster.dimensions()))
    }
}

/// Multi-pass card finder.
pub struct UiCardsMode;

impl ModeStrategy for UiCardsMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::SmartUiCards
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        Ok(CardMultiPassDetector::new().detect(input.raster, input.context))
    }
}

/// External seeds, optionally snapped to nearby edges.
pub struct SmartDetectMode;

impl ModeStrategy for SmartDetectMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::SmartDetect
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        let detector = input.external.ok_or_else(|| {
            Error::ExternalDetector("smart-detect requires an external detector".to_string())
        })?;
        let seeds = input.external_seeds(detector)?;

        if !input.options.refine_with_edge_detection {
            return Ok(input.retain_large_enough(seeds));
        }
        let refiner = input.refiner();
        let refined = seeds
            .iter()
            .map(|seed| refiner.refine_candidate(input.raster, seed))
            .collect();
        Ok(input.retain_large_enough(refined))
    }
}

/// External seeds plus contours, all refined, then merged.
///
/// Missing or failing external detectors degrade to contours only.
pub struct HybridMode;

impl ModeStrategy for HybridMode {
    fn mode(&self) -> ExtractionMode {
        ExtractionMode::Hybrid
    }

    fn detect(&self, input: &ModeInput<'_>) -> Result<Vec<RegionCandidate>> {
        let mut candidates = match input.external {
            Some(detector) => match input.external_seeds(detector) {
                Ok(seeds) => seeds,
                Err(e) => {
                    warn!(detector = detector.name(), error = %e, "External detector failed, using contours only");
                    Vec::new()
                }
            },
            None => {
                warn!("No external detector configured, using contours only");
                Vec::new()
            }
        };
        candidates.extend(ContourDetector::new().detect(input.raster, input.context));

        let refiner = input.refiner();
        let refined = candidates
            .iter()
            .map(|candidate| refiner.refine_candidate(input.raster, candidate))
            .collect();
        let refined = input.retain_large_enough(refined);

        let merger = RegionMerger::from_settings(input.merge);
        Ok(merger.merge(refined, input.raster.dimensions()))
    }
}

/// Strategy table keyed by mode.
pub struct ModeRegistry {
    strategies: HashMap<ExtractionMode, Arc<dyn ModeStrategy>>,
}

impl ModeRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Registry with one strategy per mode.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GridMode));
        registry.register(Arc::new(SectionsMode));
        registry.register(Arc::new(ComponentsMode));
        registry.register(Arc::new(ContourMode));
        registry.register(Arc::new(FloodFillMode));
        registry.register(Arc::new(UiCardsMode));
        registry.register(Arc::new(SmartDetectMode));
        registry.register(Arc::new(HybridMode));
        registry
    }

    /// Add or replace the strategy for its mode.
    pub fn register(&mut self, strategy: Arc<dyn ModeStrategy>) {
        self.strategies.insert(strategy.mode(), strategy);
    }

    /// Strategy for a mode.
    pub fn get(&self, mode: ExtractionMode) -> Option<Arc<dyn ModeStrategy>> {
        self.strategies.get(&mode).cloned()
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether no strategy is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for ModeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::{ExternalRegion, StaticSeedDetector};
    use regionscan_core::{Confidence, Dimensions, Rect, RegionSource, Rgba};

    struct FailingDetector;

    impl ExternalDetector for FailingDetector {
        fn name(&self) -> &str {
            "failing"
        }

        fn detect(&self, _raster: &RasterBuffer) -> Result<Vec<ExternalRegion>> {
            Err(Error::ExternalDetector("service unavailable".to_string()))
        }
    }

    fn boxed_scene() -> RasterBuffer {
        let mut raster = RasterBuffer::filled(Dimensions::new(300, 200), Rgba::WHITE);
        raster.fill_rect(Rect::new(50, 40, 200, 120), Rgba::rgb(90, 90, 90));
        raster.fill_rect(Rect::new(51, 41, 198, 118), Rgba::WHITE);
        raster
    }

    fn run(
        strategy: &dyn ModeStrategy,
        raster: &RasterBuffer,
        options: &ExtractionOptions,
        external: Option<&dyn ExternalDetector>,
    ) -> Result<Vec<RegionCandidate>> {
        let context = DetectionContext::from_options(Rgba::WHITE, options);
        let merge = MergeSettings::default();
        strategy.detect(&ModeInput {
            raster,
            options,
            context: &context,
            external,
            merge: &merge,
        })
    }

    #[test]
    fn test_standard_registry_covers_all_modes() {
        let registry = ModeRegistry::standard();
        assert_eq!(registry.len(), ExtractionMode::ALL.len());
        for mode in ExtractionMode::ALL {
            assert_eq!(registry.get(mode).unwrap().mode(), mode);
        }
    }

    #[test]
    fn test_grid_mode() {
        let raster = RasterBuffer::filled(Dimensions::new(90, 60), Rgba::WHITE);
        let mut options = ExtractionOptions::for_mode(ExtractionMode::Grid);
        options.rows = 2;
        options.columns = 3;

        let tiles = run(&GridMode, &raster, &options, None).unwrap();
        assert_eq!(tiles.len(), 6);
        assert!(tiles.iter().all(|t| t.rect().width == 30 && t.rect().height == 30));
    }

    #[test]
    fn test_smart_detect_requires_detector() {
        let raster = boxed_scene();
        let options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);
        assert!(matches!(
            run(&SmartDetectMode, &raster, &options, None),
            Err(Error::ExternalDetector(_))
        ));
    }

    #[test]
    fn test_smart_detect_refines_when_asked() {
        let raster = boxed_scene();
        let seeds = StaticSeedDetector::from_json(
            r#"[{"x": 45, "y": 47, "width": 212, "height": 108, "caption": "panel"}]"#,
        )
        .unwrap();
        let mut options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);

        let raw = run(&SmartDetectMode, &raster, &options, Some(&seeds)).unwrap();
        assert_eq!(raw[0].rect(), Rect::new(45, 47, 212, 108));
        assert_eq!(raw[0].source, RegionSource::ExternalSeed);

        options.refine_with_edge_detection = true;
        let refined = run(&SmartDetectMode, &raster, &options, Some(&seeds)).unwrap();
        assert_eq!(refined[0].rect(), Rect::new(50, 40, 200, 120));
        assert_eq!(refined[0].source, RegionSource::EdgeRefined);
        assert_eq!(refined[0].description, "panel");
    }

    #[test]
    fn test_smart_detect_drops_seeds_under_min_size() {
        let raster = boxed_scene();
        let seeds = StaticSeedDetector::from_json(
            r#"[
                {"x": 10, "y": 10, "width": 1, "height": 2, "caption": "speck"},
                {"x": 60, "y": 60, "width": 30, "height": 30, "caption": "chart"}
            ]"#,
        )
        .unwrap();
        let mut options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);

        let raw = run(&SmartDetectMode, &raster, &options, Some(&seeds)).unwrap();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].description, "chart");

        // Refinement leaves a sub-4px box unchanged; it is still dropped
        options.refine_with_edge_detection = true;
        let refined = run(&SmartDetectMode, &raster, &options, Some(&seeds)).unwrap();
        assert!(refined.iter().all(|c| c.description != "speck"));

        options.refine_with_edge_detection = false;
        options.min_component_size = 1;
        let loose = run(&SmartDetectMode, &raster, &options, Some(&seeds)).unwrap();
        assert_eq!(loose.len(), 2);
    }

    #[test]
    fn test_hybrid_drops_small_seeds() {
        let mut raster = RasterBuffer::filled(Dimensions::new(200, 200), Rgba::WHITE);
        raster.fill_rect(Rect::new(80, 80, 40, 40), Rgba::rgb(255, 0, 0));
        let detector = HybridSeeds(vec![ExternalRegion {
            rect: Rect::new(10, 10, 3, 3),
            caption: "dot".to_string(),
            confidence: Confidence::new(90),
        }]);
        let options = ExtractionOptions::for_mode(ExtractionMode::Hybrid);

        let regions = run(&HybridMode, &raster, &options, Some(&detector)).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect(), Rect::new(80, 80, 40, 40));
    }

    #[test]
    fn test_smart_detect_propagates_detector_error() {
        let raster = boxed_scene();
        let options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);
        assert!(run(&SmartDetectMode, &raster, &options, Some(&FailingDetector)).is_err());
    }

    #[test]
    fn test_hybrid_survives_failing_detector() {
        let mut raster = RasterBuffer::filled(Dimensions::new(200, 200), Rgba::WHITE);
        raster.fill_rect(Rect::new(80, 80, 40, 40), Rgba::rgb(255, 0, 0));
        let options = ExtractionOptions::for_mode(ExtractionMode::Hybrid);

        let regions = run(&HybridMode, &raster, &options, Some(&FailingDetector)).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect(), Rect::new(80, 80, 40, 40));
    }

    #[test]
    fn test_hybrid_merges_seed_with_contour() {
        let mut raster = RasterBuffer::filled(Dimensions::new(200, 200), Rgba::WHITE);
        raster.fill_rect(Rect::new(80, 80, 40, 40), Rgba::rgb(255, 0, 0));
        let detector = HybridSeeds(vec![ExternalRegion {
            rect: Rect::new(82, 78, 40, 44),
            caption: "logo".to_string(),
            confidence: Confidence::new(90),
        }]);
        let options = ExtractionOptions::for_mode(ExtractionMode::Hybrid);

        let regions = run(&HybridMode, &raster, &options, Some(&detector)).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].rect(), Rect::new(80, 80, 40, 40));
        // Solid contour confidence wins over the seed's 90
        assert_eq!(regions[0].confidence, Confidence::CERTAIN);
    }

    struct HybridSeeds(Vec<ExternalRegion>);

    impl ExternalDetector for HybridSeeds {
        fn name(&self) -> &str {
            "fixed"
        }

        fn detect(&self, _raster: &RasterBuffer) -> Result<Vec<ExternalRegion>> {
            Ok(self.0.clone())
        }
    }
}
