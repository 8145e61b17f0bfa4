//! Scenario tests running detectors over synthetic screenshots.

use std::sync::Arc;

use regionscan_core::{Dimensions, Rect, RegionLabel, RegionSource, Rgba};
use regionscan_detector::testing::{RegionMatcher, SceneBuilder};
use regionscan_detector::{
    estimate_background, tile, CardMultiPassDetector, ContourDetector, DetectionContext,
    DetectionPipeline, EdgeRefiner, FloodFillDetector, RegionClassifier, RegionDetector,
    RegionMerger, SectionDetector,
};

#[test]
fn test_uniform_gray_has_no_contours() {
    let raster = SceneBuilder::new(100, 100, Rgba::rgb(128, 128, 128)).build();
    let context = DetectionContext::new(estimate_background(&raster)).with_min_size(20);

    assert!(ContourDetector::new().detect(&raster, &context).is_empty());
}

#[test]
fn test_red_square_is_an_icon() {
    let raster = SceneBuilder::new(200, 200, Rgba::WHITE)
        .rect(Rect::new(80, 80, 40, 40), Rgba::rgb(255, 0, 0))
        .build();
    let background = estimate_background(&raster);
    assert_eq!(background, Rgba::WHITE);

    let context = DetectionContext::new(background).with_color_tolerance(25);
    let regions = ContourDetector::new().detect(&raster, &context);

    let diff = RegionMatcher::new()
        .with_bounds_tolerance(2)
        .compare_candidates(&[Rect::new(80, 80, 40, 40)], &regions);
    assert!(diff.is_match(), "{}", diff.summary());
    assert_eq!(RegionClassifier::default().classify_rect(&regions[0].rect()), RegionLabel::Icon);
}

#[test]
fn test_merge_examples() {
    let merger = RegionMerger::new(0.3);
    assert_eq!(
        merger.merge_rects(vec![Rect::new(10, 10, 50, 50), Rect::new(30, 30, 50, 50)]),
        vec![Rect::new(10, 10, 70, 70)]
    );
    assert_eq!(
        merger
            .merge_rects(vec![Rect::new(10, 10, 50, 50), Rect::new(40, 40, 50, 50)])
            .len(),
        2
    );
}

#[test]
fn test_grid_on_odd_image() {
    let sizes: Vec<(u32, u32)> = tile(Dimensions::new(101, 101), 2, 2)
        .iter()
        .map(|t| (t.width, t.height))
        .collect();
    assert_eq!(sizes, vec![(50, 50), (51, 50), (50, 51), (51, 51)]);
}

#[test]
fn test_dashboard_cards() {
    let panel = Rgba::rgb(235, 238, 245);
    let raster = SceneBuilder::new(400, 300, Rgba::WHITE)
        .rect(Rect::new(20, 20, 170, 120), panel)
        .rect(Rect::new(210, 20, 170, 120), panel)
        .rect(Rect::new(20, 160, 360, 120), Rgba::rgb(30, 40, 60))
        .text_line(40, 50, 100, 10, Rgba::rgb(60, 60, 60))
        .build();
    let context = DetectionContext::new(Rgba::WHITE).with_color_tolerance(5);

    let regions = CardMultiPassDetector::new().detect(&raster, &context);
    let diff = RegionMatcher::new().with_bounds_tolerance(2).compare_candidates(
        &[
            Rect::new(20, 160, 360, 120),
            Rect::new(20, 20, 170, 120),
            Rect::new(210, 20, 170, 120),
        ],
        &regions,
    );
    assert!(diff.is_match(), "{}", diff.summary());

    // Largest first
    assert_eq!(regions[0].rect(), Rect::new(20, 160, 360, 120));
}

#[test]
fn test_refiner_recovers_loose_box() {
    let raster = SceneBuilder::new(300, 200, Rgba::WHITE)
        .bordered_rect(Rect::new(50, 40, 200, 120), Rgba::rgb(90, 90, 90), 1, Rgba::WHITE)
        .build();

    let refined = EdgeRefiner::new(30).refine(&raster, Rect::new(45, 47, 212, 108));
    assert_eq!(refined, Rect::new(50, 40, 200, 120));
}

#[test]
fn test_pipeline_unions_detectors() {
    let raster = SceneBuilder::new(200, 200, Rgba::WHITE)
        .rect(Rect::new(0, 0, 200, 30), Rgba::rgb(20, 20, 80))
        .rect(Rect::new(60, 80, 60, 60), Rgba::rgb(220, 120, 0))
        .build();
    let context = DetectionContext::new(Rgba::WHITE);

    let mut pipeline = DetectionPipeline::new();
    pipeline.add_detector(Arc::new(FloodFillDetector::new()));
    pipeline.add_detector(Arc::new(SectionDetector::new()));
    let regions = pipeline.detect(&raster, &context);

    // Sections run first
    assert_eq!(regions[0].source, RegionSource::Section);
    assert!(regions.iter().any(|r| r.source == RegionSource::FloodFill
        && r.rect() == Rect::new(60, 80, 60, 60)));
}
