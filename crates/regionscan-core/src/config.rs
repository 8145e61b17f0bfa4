//! Extraction options and engine configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// Detection mode selecting one fixed pipeline composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Pure rows x columns tiling
    Grid,
    /// Bands between uniform horizontal divider rows
    Sections,
    /// Dilated foreground components with text filtering
    Components,
    /// Foreground mask connected components
    #[default]
    ContourDetection,
    /// Seeded color flood fill over a coarse scan grid
    FloodFillRegions,
    /// Multi-pass UI card detection
    SmartUiCards,
    /// External seed regions, optionally edge-refined
    SmartDetect,
    /// External seeds plus internal detection, all edge-refined
    Hybrid,
}

impl ExtractionMode {
    /// Every mode, in dispatch-table order.
    pub const ALL: [ExtractionMode; 8] = [
        ExtractionMode::Grid,
        ExtractionMode::Sections,
        ExtractionMode::Components,
        ExtractionMode::ContourDetection,
        ExtractionMode::FloodFillRegions,
        ExtractionMode::SmartUiCards,
        ExtractionMode::SmartDetect,
        ExtractionMode::Hybrid,
    ];

    /// Short name used in filenames and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Grid => "grid",
            ExtractionMode::Sections => "sections",
            ExtractionMode::Components => "components",
            ExtractionMode::ContourDetection => "contour",
            ExtractionMode::FloodFillRegions => "flood-fill",
            ExtractionMode::SmartUiCards => "ui-cards",
            ExtractionMode::SmartDetect => "smart-detect",
            ExtractionMode::Hybrid => "hybrid",
        }
    }

    /// Whether the mode consumes external detector seeds.
    pub fn uses_external_detector(&self) -> bool {
        matches!(self, ExtractionMode::SmartDetect | ExtractionMode::Hybrid)
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "grid" => Ok(ExtractionMode::Grid),
            "sections" => Ok(ExtractionMode::Sections),
            "components" => Ok(ExtractionMode::Components),
            "contour" | "contour-detection" => Ok(ExtractionMode::ContourDetection),
            "flood-fill" | "flood-fill-regions" => Ok(ExtractionMode::FloodFillRegions),
            "ui-cards" | "smart-ui-cards" => Ok(ExtractionMode::SmartUiCards),
            "smart-detect" => Ok(ExtractionMode::SmartDetect),
            "hybrid" => Ok(ExtractionMode::Hybrid),
            _ => Err(Error::InvalidOptions(format!("unknown mode '{s}'"))),
        }
    }
}

/// Image formats the crop encoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    /// PNG (lossless RGBA)
    #[default]
    Png,
    /// JPEG (lossy, no alpha)
    Jpeg,
    /// BMP
    Bmp,
    /// GIF
    Gif,
    /// WebP
    WebP,
}

impl ImageFormat {
    /// MIME type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Gif => "gif",
            ImageFormat::WebP => "webp",
        }
    }

    /// Look up a format by MIME type.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/bmp" | "image/x-bmp" => Some(ImageFormat::Bmp),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Look up a format by file extension (with or without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "bmp" => Some(ImageFormat::Bmp),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }
}

/// Per-call extraction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Detection mode
    pub mode: ExtractionMode,
    /// Minimum width and height of a kept component
    pub min_component_size: u32,
    /// Luma gradient threshold for edge detection
    pub edge_detection_threshold: u32,
    /// Color tolerance for background and flood fill comparisons
    pub color_tolerance: u32,
    /// Grid rows
    pub rows: u32,
    /// Grid columns
    pub columns: u32,
    /// Snap final boxes to image edges
    pub refine_with_edge_detection: bool,
    /// Skip cropping and return boxes only
    pub detect_only: bool,
    /// Crop output format
    pub output_format: ImageFormat,
    /// Cap on the number of returned regions (None = unlimited)
    pub max_regions: Option<usize>,
    /// Search window around each edge for the edge refiner
    pub edge_search_padding: u32,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::default(),
            min_component_size: 20,
            edge_detection_threshold: 30,
            color_tolerance: 25,
            rows: 2,
            columns: 2,
            refine_with_edge_detection: false,
            detect_only: false,
            output_format: ImageFormat::Png,
            max_regions: None,
            edge_search_padding: 10,
        }
    }
}

impl ExtractionOptions {
    /// Default options for a given mode.
    pub fn for_mode(mode: ExtractionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Validate option values.
    pub fn validate(&self) -> Result<()> {
        if self.mode == ExtractionMode::Grid && (self.rows == 0 || self.columns == 0) {
            return Err(Error::InvalidOptions(
                "grid rows and columns must be > 0".to_string(),
            ));
        }

        if self.color_tolerance > 441 {
            return Err(Error::InvalidOptions(format!(
                "color_tolerance {} exceeds the largest RGB distance",
                self.color_tolerance
            )));
        }

        if self.max_regions == Some(0) {
            return Err(Error::InvalidOptions(
                "max_regions must be > 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Engine configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Default extraction options
    pub extraction: ExtractionOptions,
    /// Final merge settings
    pub merge: MergeSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl EngineConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.rows == 0 || self.extraction.columns == 0 {
            return Err(Error::Config(
                "extraction rows and columns must be > 0".to_string(),
            ));
        }

        self.extraction
            .validate()
            .map_err(|e| Error::Config(e.to_string()))?;

        self.merge.validate()?;
        self.logging.validate()?;

        Ok(())
    }
}

/// Settings for the final region merge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeSettings {
    /// Fraction of the smaller box that must overlap to merge
    pub overlap_threshold: f32,
    /// Gap in pixels under which touching boxes merge
    pub adjacency_margin: u32,
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
            adjacency_margin: 5,
        }
    }
}

impl MergeSettings {
    /// Validate merge settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.overlap_threshold > 0.0 && self.overlap_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "merge.overlap_threshold must be in (0, 1], got {}",
                self.overlap_threshold
            )));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];

    /// Validate the log level name.
    pub fn validate(&self) -> Result<()> {
        if Self::LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            Ok(())
        } else {
            Err(Error::Config(format!(
                "logging.level '{}' is not one of {:?}",
                self.level,
                Self::LEVELS
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExtractionOptions::default();
        assert_eq!(options.mode, ExtractionMode::ContourDetection);
        assert_eq!(options.min_component_size, 20);
        assert_eq!(options.color_tolerance, 25);
        assert_eq!(options.edge_search_padding, 10);
        assert!(!options.detect_only);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_grid_requires_rows_and_columns() {
        let mut options = ExtractionOptions::for_mode(ExtractionMode::Grid);
        options.rows = 0;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_zero_max_regions_rejected() {
        let options = ExtractionOptions {
            max_regions: Some(0),
            ..ExtractionOptions::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("grid".parse::<ExtractionMode>().unwrap(), ExtractionMode::Grid);
        assert_eq!(
            "flood_fill".parse::<ExtractionMode>().unwrap(),
            ExtractionMode::FloodFillRegions
        );
        assert_eq!(
            "Smart-UI-Cards".parse::<ExtractionMode>().unwrap(),
            ExtractionMode::SmartUiCards
        );
        assert!("sparkle".parse::<ExtractionMode>().is_err());
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in ExtractionMode::ALL {
            assert_eq!(mode.as_str().parse::<ExtractionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_image_format_lookup() {
        assert_eq!(ImageFormat::from_mime_type("image/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension(".jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime_type("text/plain"), None);
        assert_eq!(ImageFormat::WebP.extension(), "webp");
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.merge.overlap_threshold, 0.5);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
extraction:
  mode: flood_fill_regions
  color_tolerance: 40
  min_component_size: 12
  detect_only: true

merge:
  overlap_threshold: 0.3
  adjacency_margin: 8

logging:
  level: debug
"#;

        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.extraction.mode, ExtractionMode::FloodFillRegions);
        assert_eq!(config.extraction.color_tolerance, 40);
        assert_eq!(config.extraction.min_component_size, 12);
        assert!(config.extraction.detect_only);
        assert_eq!(config.extraction.rows, 2);
        assert_eq!(config.merge.overlap_threshold, 0.3);
        assert_eq!(config.merge.adjacency_margin, 8);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_overlap_threshold() {
        let yaml = "merge:\n  overlap_threshold: 1.5\n";
        assert!(matches!(EngineConfig::from_yaml(yaml), Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_log_level() {
        let yaml = "logging:\n  level: chatty\n";
        assert!(EngineConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(EngineConfig::from_yaml("extraction: [1, 2").is_err());
    }
}
