//! # regionscan
//!
//! Command-line front end for the regionscan engine.
//!
//! ## Overview
//!
//! Reads one image, runs the requested extraction mode, writes each crop into
//! the output directory and prints the result as JSON on stdout (image
//! payloads elided). Logs go to stderr.
//!
//! ## Architecture
//!
//! This is Layer 3 - the binary over the regionscan library that ties
//! together config loading, the optional seed file and the extractor.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::Value;

use regionscan::{
    schema, EngineConfig, ExtractionMode, ExtractionOptions, ExtractionResult, ImageFormat,
    RegionExtractor, StaticSeedDetector,
};

/// Find and crop the interesting regions of an image.
#[derive(Parser, Debug)]
#[command(name = "regionscan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image to segment
    #[arg(required_unless_present = "schema")]
    image: Option<PathBuf>,

    /// Extraction mode: grid, sections, components, contour, flood-fill,
    /// ui-cards, smart-detect or hybrid
    #[arg(long)]
    mode: Option<ExtractionMode>,

    /// Grid rows
    #[arg(long)]
    rows: Option<u32>,

    /// Grid columns
    #[arg(long)]
    columns: Option<u32>,

    /// Color tolerance
    #[arg(long)]
    tolerance: Option<u32>,

    /// Minimum region width and height
    #[arg(long)]
    min_size: Option<u32>,

    /// Luma gradient threshold for edges
    #[arg(long)]
    edge_threshold: Option<u32>,

    /// Snap boxes to nearby edges
    #[arg(long)]
    refine: bool,

    /// Report boxes without cropping
    #[arg(long)]
    detect_only: bool,

    /// Seed regions (JSON) for smart-detect and hybrid
    #[arg(long)]
    seeds: Option<PathBuf>,

    /// Engine configuration (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Crop output directory
    #[arg(long, short = 'o', default_value = ".")]
    out: PathBuf,

    /// Abandon the extraction after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Print the result JSON schema and exit
    #[arg(long)]
    schema: bool,
}

impl Args {
    /// Layer command-line overrides on top of the configured defaults.
    fn apply(&self, options: &mut ExtractionOptions) {
        if let Some(mode) = self.mode {
            options.mode = mode;
        }
        if let Some(rows) = self.rows {
            options.rows = rows;
        }
        if let Some(columns) = self.columns {
            options.columns = columns;
        }
        if let Some(tolerance) = self.tolerance {
            options.color_tolerance = tolerance;
        }
        if let Some(min_size) = self.min_size {
            options.min_component_size = min_size;
        }
        if let Some(threshold) = self.edge_threshold {
            options.edge_detection_threshold = threshold;
        }
        options.refine_with_edge_detection |= self.refine;
        options.detect_only |= self.detect_only;
    }
}

/// MIME type guessed from the file extension.
fn guess_mime(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .map(|format| format.mime_type())
}

/// Result as JSON with each image payload replaced by its size.
fn elide_payloads(result: &ExtractionResult) -> anyhow::Result<Value> {
    let mut value = serde_json::to_value(result)?;
    if let Some(regions) = value.get_mut("regions").and_then(Value::as_array_mut) {
        for (region, source) in regions.iter_mut().zip(&result.regions) {
            if let (Some(image), Some(payload)) = (region.get_mut("image"), &source.image) {
                *image = serde_json::json!({
                    "mime_type": payload.mime_type,
                    "bytes": payload.data.len(),
                });
            }
        }
    }
    Ok(value)
}

async fn write_crops(result: &ExtractionResult, out: &Path) -> anyhow::Result<usize> {
    let mut written = 0;
    for region in &result.regions {
        let (Some(filename), Some(image)) = (&region.filename, &region.image) else {
            continue;
        };
        if written == 0 {
            tokio::fs::create_dir_all(out)
                .await
                .with_context(|| format!("creating {}", out.display()))?;
        }
        let path = out.join(filename);
        tokio::fs::write(&path, &image.data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        written += 1;
    }
    Ok(written)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.schema {
        println!("{}", serde_json::to_string_pretty(&schema::result_schema())?);
        return Ok(());
    }
    let Some(image_path) = args.image.clone() else {
        bail!("no image given");
    };

    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let mut options = config.extraction.clone();
    args.apply(&mut options);

    let mut extractor = RegionExtractor::from_config(&config);
    if let Some(seeds) = &args.seeds {
        let detector = StaticSeedDetector::from_file(seeds)
            .with_context(|| format!("loading seeds {}", seeds.display()))?;
        tracing::info!("Loaded {} seed region(s) from {}", detector.len(), seeds.display());
        extractor = extractor.with_external_detector(Arc::new(detector));
    }

    let bytes = tokio::fs::read(&image_path)
        .await
        .with_context(|| format!("reading {}", image_path.display()))?;
    let mime = guess_mime(&image_path).map(str::to_string);
    tracing::info!(
        "Extracting {} ({} bytes) in {} mode",
        image_path.display(),
        bytes.len(),
        options.mode
    );

    let extractor = Arc::new(extractor);
    let timeout = args.timeout_ms.map(Duration::from_millis);
    let result = extractor.extract_async(bytes, mime, options, timeout).await;

    let written = write_crops(&result, &args.out).await?;
    if written > 0 {
        tracing::info!("Wrote {} crop(s) to {}", written, args.out.display());
    }

    println!("{}", serde_json::to_string_pretty(&elide_payloads(&result)?)?);

    if let Some(error) = &result.error {
        bail!("extraction failed: {error}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("regionscan").chain(list.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_full_command_line() {
        let parsed = args(&[
            "shot.png",
            "--mode",
            "grid",
            "--rows",
            "3",
            "--columns",
            "4",
            "--detect-only",
            "--out",
            "crops",
            "--timeout-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(parsed.image, Some(PathBuf::from("shot.png")));
        assert_eq!(parsed.mode, Some(ExtractionMode::Grid));
        assert_eq!(parsed.rows, Some(3));
        assert_eq!(parsed.columns, Some(4));
        assert!(parsed.detect_only);
        assert!(!parsed.refine);
        assert_eq!(parsed.out, PathBuf::from("crops"));
        assert_eq!(parsed.timeout_ms, Some(500));
    }

    #[test]
    fn test_defaults() {
        let parsed = args(&["shot.png"]).unwrap();
        assert_eq!(parsed.out, PathBuf::from("."));
        assert!(parsed.mode.is_none());
        assert!(!parsed.schema);
    }

    #[test]
    fn test_parse_errors() {
        assert!(args(&["a.png", "--mode", "telepathy"]).is_err());
        assert!(args(&["a.png", "--rows"]).is_err());
        assert!(args(&["a.png", "--rows", "-1"]).is_err());
        assert!(args(&["a.png", "--bogus"]).is_err());
        assert!(args(&["a.png", "b.png"]).is_err());
        // An image is required unless only the schema is wanted
        assert!(args(&[]).is_err());
        assert!(args(&["--schema"]).is_ok());
    }

    #[test]
    fn test_help_and_version_are_handled_by_clap() {
        let help = args(&["--help"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
        assert!(help.to_string().contains("--edge-threshold"));

        let version = args(&["--version"]).unwrap_err();
        assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_overrides_apply_on_top_of_config() {
        let mut options = ExtractionOptions::for_mode(ExtractionMode::Sections);
        options.color_tolerance = 40;

        let parsed = args(&["shot.png", "--tolerance", "10", "--refine"]).unwrap();
        parsed.apply(&mut options);

        assert_eq!(options.mode, ExtractionMode::Sections);
        assert_eq!(options.color_tolerance, 10);
        assert!(options.refine_with_edge_detection);
        assert_eq!(options.rows, 2);
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a/b.PNG")), guess_mime(Path::new("b.png")));
        assert_eq!(guess_mime(Path::new("b.jpeg")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("b.txt")), None);
        assert_eq!(guess_mime(Path::new("noext")), None);
    }
}
