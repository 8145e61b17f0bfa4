//! Crop execution and encoding.

use std::sync::Arc;

use regionscan_core::{Error, ExtractionMode, ImageFormat, ImagePayload, Rect, RegionLabel, Result};
use regionscan_raster::{ImageCodec, RasterBuffer};

/// Cuts finalized boxes out of a raster and encodes them.
#[derive(Clone)]
pub struct CropExecutor {
    codec: Arc<dyn ImageCodec>,
    format: ImageFormat,
}

impl CropExecutor {
    /// Create an executor encoding with `codec` in `format`.
    pub fn new(codec: Arc<dyn ImageCodec>, format: ImageFormat) -> Self {
        Self { codec, format }
    }

    /// Output format.
    pub fn format(&self) -> ImageFormat {
        self.format
    }

    /// Crop and encode one box.
    ///
    /// The box is clamped to the raster. A box with nothing inside the image
    /// is an [`Error::InvalidRegion`]; encoder failures surface as
    /// [`Error::CropFailed`].
    pub fn crop(&self, raster: &RasterBuffer, rect: Rect) -> Result<ImagePayload> {
        let cropped = raster.crop(rect)?;
        let data = self
            .codec
            .encode(&cropped, self.format)
            .map_err(|e| Error::CropFailed(format!("{} codec: {}", self.codec.name(), e)))?;
        Ok(ImagePayload::new(self.format.mime_type(), data))
    }

    /// Suggested filename: `<mode>-<index>-<label>.<ext>`.
    pub fn filename(&self, mode: ExtractionMode, index: usize, label: RegionLabel) -> String {
        format!("{}-{}-{}.{}", mode.as_str(), index, label.as_str(), self.format.extension())
    }
}

impl std::fmt::Debug for CropExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropExecutor")
            .field("codec", &self.codec.name())
            .field("format", &self.format)
            .finish()
    }
}
