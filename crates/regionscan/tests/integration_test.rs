//! End-to-end tests for the regionscan extractor.

use std::sync::Arc;
use std::time::Duration;

use regionscan::{
    ExternalDetector, ExternalRegion, ExtractionMode, ExtractionOptions, ExtractionResult,
    ImageFormat, RegionExtractor, RegionLabel, StaticSeedDetector,
};
use regionscan_core::{Dimensions, Rect, RegionSource, Result, Rgba};
use regionscan_detector::testing::{RegionMatcher, SceneBuilder};
use regionscan_raster::{DefaultCodec, ImageCodec, RasterBuffer};

fn png(raster: &RasterBuffer) -> Vec<u8> {
    DefaultCodec::new().encode(raster, ImageFormat::Png).unwrap()
}

fn red_square() -> Vec<u8> {
    png(&SceneBuilder::new(200, 200, Rgba::WHITE)
        .rect(Rect::new(80, 80, 40, 40), Rgba::rgb(255, 0, 0))
        .build())
}

/// External detector that takes longer than any sensible timeout.
struct SlowDetector;

impl ExternalDetector for SlowDetector {
    fn name(&self) -> &str {
        "slow"
    }

    fn detect(&self, _raster: &RasterBuffer) -> Result<Vec<ExternalRegion>> {
        std::thread::sleep(Duration::from_millis(500));
        Ok(Vec::new())
    }
}

#[test]
fn test_contour_png_round_trip() {
    let options = ExtractionOptions::for_mode(ExtractionMode::ContourDetection);
    let result = RegionExtractor::new().extract(&red_square(), Some("image/png"), &options);

    assert!(result.success, "{}", result.summary);
    assert_eq!(result.dimensions, Some(Dimensions::new(200, 200)));
    assert_eq!(result.background, Some(Rgba::WHITE));
    assert_eq!(result.regions.len(), 1);

    let region = &result.regions[0];
    assert_eq!(region.index, 1);
    assert_eq!(region.label, RegionLabel::Icon);
    assert_eq!(region.filename.as_deref(), Some("contour-1-icon.png"));

    let diff = RegionMatcher::new()
        .with_bounds_tolerance(2)
        .compare(&[Rect::new(80, 80, 40, 40)], &[region.bounds.rect()]);
    assert!(diff.is_match(), "{}", diff.summary());

    let payload = region.image.as_ref().unwrap();
    let crop = DefaultCodec::new().decode(&payload.data, Some(payload.mime_type.as_str())).unwrap();
    assert_eq!(crop.dimensions(), Dimensions::new(region.bounds.rect().width, region.bounds.rect().height));
    assert_eq!(crop.pixel_at(crop.width() / 2, crop.height() / 2), Rgba::rgb(255, 0, 0));
}

#[test]
fn test_decode_failure_fails_whole_call() {
    let options = ExtractionOptions::default();
    let result = RegionExtractor::new().extract(b"definitely not an image", Some("image/png"), &options);

    assert!(!result.success);
    assert!(result.error.is_some());
    assert!(result.regions.is_empty());
    assert!(result.dimensions.is_none());
}

#[test]
fn test_nothing_found_is_not_an_error() {
    let bytes = png(&RasterBuffer::filled(Dimensions::new(100, 100), Rgba::rgb(128, 128, 128)));
    let result = RegionExtractor::new().extract(&bytes, None, &ExtractionOptions::default());

    assert!(!result.success);
    assert!(result.error.is_none());
    assert!(result.is_empty());
    assert!(result.summary.starts_with("No regions found"), "{}", result.summary);
}

#[test]
fn test_grid_on_odd_image() {
    let bytes = png(&RasterBuffer::filled(Dimensions::new(101, 101), Rgba::WHITE));
    let options = ExtractionOptions::for_mode(ExtractionMode::Grid);
    let result = RegionExtractor::new().extract(&bytes, Some("image/png"), &options);

    let sizes: Vec<(u32, u32)> = result
        .regions
        .iter()
        .map(|r| (r.bounds.rect().width, r.bounds.rect().height))
        .collect();
    assert_eq!(sizes, vec![(50, 50), (51, 50), (50, 51), (51, 51)]);
    assert_eq!(result.regions[3].filename.as_deref(), Some("grid-4-icon.png"));
    assert!(result.regions.iter().all(|r| r.source == RegionSource::Grid));
}

#[test]
fn test_smart_detect_with_seed_file() {
    let seeds = StaticSeedDetector::from_json(
        r#"[{"nx": 0.5, "ny": 0.0, "nw": 0.5, "nh": 0.25, "caption": "header logo", "confidence": 70}]"#,
    )
    .unwrap();
    let extractor = RegionExtractor::new().with_external_detector(Arc::new(seeds));
    let bytes = png(&RasterBuffer::filled(Dimensions::new(200, 100), Rgba::WHITE));
    let options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);

    let result = extractor.extract(&bytes, Some("image/png"), &options);
    assert!(result.success, "{}", result.summary);
    assert_eq!(result.regions[0].bounds.rect(), Rect::new(100, 0, 100, 25));
    assert_eq!(result.regions[0].description, "header logo");
    assert_eq!(result.regions[0].confidence.value(), 70);
    assert_eq!(result.regions[0].source, RegionSource::ExternalSeed);
}

#[test]
fn test_smart_detect_survives_runaway_seed() {
    let seeds = StaticSeedDetector::from_json(
        r#"[
            {"x": 10, "y": 10, "width": 4294967295, "height": 20, "caption": "runaway"},
            {"x": 20, "y": 20, "width": 30, "height": 30, "caption": "normal"}
        ]"#,
    )
    .unwrap();
    let extractor = RegionExtractor::new().with_external_detector(Arc::new(seeds));
    let bytes = png(&RasterBuffer::filled(Dimensions::new(200, 100), Rgba::WHITE));
    let options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);

    let result = extractor.extract(&bytes, Some("image/png"), &options);
    assert!(result.success, "{}", result.summary);
    assert!(result.error.is_none());
    assert_eq!(result.regions.len(), 2);
    assert_eq!(result.regions[0].bounds.rect(), Rect::new(10, 10, 190, 20));
    assert_eq!(result.regions[1].bounds.rect(), Rect::new(20, 20, 30, 30));
}

#[test]
fn test_smart_detect_without_detector_fails() {
    let options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);
    let result = RegionExtractor::new().extract(&red_square(), Some("image/png"), &options);

    assert!(!result.success);
    assert!(result.error.unwrap().contains("external detector"));
}

#[test]
fn test_ui_cards_detect_only() {
    let panel = Rgba::rgb(235, 238, 245);
    let bytes = png(&SceneBuilder::new(400, 300, Rgba::WHITE)
        .rect(Rect::new(20, 20, 170, 120), panel)
        .rect(Rect::new(210, 20, 170, 120), panel)
        .rect(Rect::new(20, 160, 360, 120), Rgba::rgb(30, 40, 60))
        .build());
    let mut options = ExtractionOptions::for_mode(ExtractionMode::SmartUiCards);
    options.color_tolerance = 5;
    options.detect_only = true;

    let result = RegionExtractor::new().extract(&bytes, Some("image/png"), &options);
    assert_eq!(result.regions.len(), 3, "{}", result.summary);
    assert!(result.regions.iter().all(|r| r.image.is_none() && r.filename.is_none()));
    assert_eq!(result.regions[0].label, RegionLabel::Card);
}

#[test]
fn test_result_serializes_with_base64_payload() {
    let options = ExtractionOptions::for_mode(ExtractionMode::ContourDetection);
    let result = RegionExtractor::new().extract(&red_square(), Some("image/png"), &options);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["mode"], "contour_detection");
    assert!(json["regions"][0]["image"]["data"].is_string());
    assert!(json.get("error").is_none());

    let back: ExtractionResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.regions, result.regions);
}

#[tokio::test]
async fn test_async_matches_sync() {
    let extractor = Arc::new(RegionExtractor::new());
    let options = ExtractionOptions::for_mode(ExtractionMode::ContourDetection);

    let sync = extractor.extract(&red_square(), Some("image/png"), &options);
    let result = extractor
        .extract_async(red_square(), Some("image/png".to_string()), options, None)
        .await;

    assert_eq!(result.regions, sync.regions);
}

#[tokio::test]
async fn test_async_timeout_yields_failed_result() {
    let extractor = Arc::new(RegionExtractor::new().with_external_detector(Arc::new(SlowDetector)));
    let options = ExtractionOptions::for_mode(ExtractionMode::SmartDetect);

    let result = extractor
        .extract_async(
            red_square(),
            Some("image/png".to_string()),
            options,
            Some(Duration::from_millis(50)),
        )
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("timed out"));
}
