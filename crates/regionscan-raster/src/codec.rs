//! Image decoding and encoding.

use std::io::Cursor;

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use regionscan_core::{Error, ImageFormat, Result};

use crate::RasterBuffer;

/// Codec turning encoded bytes into rasters and back.
pub trait ImageCodec: Send + Sync {
    /// Codec name for logging.
    fn name(&self) -> &'static str;

    /// Decode image bytes.
    ///
    /// `mime_type` is the declared type; when absent or unrecognized the
    /// format is guessed from the content.
    fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<RasterBuffer>;

    /// Encode a raster in the given format.
    fn encode(&self, raster: &RasterBuffer, format: ImageFormat) -> Result<Vec<u8>>;
}

/// Codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCodec;

impl DefaultCodec {
    /// Create a new codec.
    pub fn new() -> Self {
        Self
    }

    fn to_image_format(format: ImageFormat) -> image::ImageFormat {
        match format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

impl ImageCodec for DefaultCodec {
    fn name(&self) -> &'static str {
        "image"
    }

    fn decode(&self, bytes: &[u8], mime_type: Option<&str>) -> Result<RasterBuffer> {
        if bytes.is_empty() {
            return Err(Error::Decode("empty image data".to_string()));
        }

        let declared = mime_type.and_then(ImageFormat::from_mime_type);
        let decoded = match declared {
            Some(format) => image::load_from_memory_with_format(bytes, Self::to_image_format(format)),
            None => {
                debug!(mime_type = ?mime_type, "No known declared format, guessing from content");
                image::load_from_memory(bytes)
            }
        }
        .map_err(|e| Error::Decode(e.to_string()))?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!(width, height, codec = self.name(), "Decoded image");
        RasterBuffer::from_rgba(width, height, rgba.into_raw())
    }

    fn encode(&self, raster: &RasterBuffer, format: ImageFormat) -> Result<Vec<u8>> {
        let rgba = RgbaImage::from_raw(raster.width(), raster.height(), raster.as_raw().to_vec())
            .ok_or(Error::InvalidDimensions {
                width: raster.width(),
                height: raster.height(),
            })?;

        // JPEG has no alpha channel
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
            _ => DynamicImage::ImageRgba8(rgba),
        };

        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, Self::to_image_format(format))
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regionscan_core::{Dimensions, Rect, Rgba};

    fn sample_raster() -> RasterBuffer {
        let mut raster = RasterBuffer::filled(Dimensions::new(8, 6), Rgba::WHITE);
        raster.fill_rect(Rect::new(2, 2, 3, 2), Rgba::rgb(200, 10, 10));
        raster
    }

    #[test]
    fn test_png_is_lossless() {
        let codec = DefaultCodec::new();
        let raster = sample_raster();

        let bytes = codec.encode(&raster, ImageFormat::Png).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let decoded = codec.decode(&bytes, Some("image/png")).unwrap();
        assert_eq!(decoded, raster);
    }

    #[test]
    fn test_decode_guesses_format() {
        let codec = DefaultCodec::new();
        let bytes = codec.encode(&sample_raster(), ImageFormat::Png).unwrap();

        let decoded = codec.decode(&bytes, None).unwrap();
        assert_eq!(decoded.dimensions(), Dimensions::new(8, 6));

        let decoded = codec.decode(&bytes, Some("application/octet-stream")).unwrap();
        assert_eq!(decoded.dimensions(), Dimensions::new(8, 6));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let codec = DefaultCodec::new();
        assert!(matches!(
            codec.decode(b"definitely not an image", Some("image/png")),
            Err(Error::Decode(_))
        ));
        assert!(matches!(codec.decode(&[], None), Err(Error::Decode(_))));
    }

    #[test]
    fn test_jpeg_encode_drops_alpha() {
        let codec = DefaultCodec::new();
        let bytes = codec.encode(&sample_raster(), ImageFormat::Jpeg).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

        let decoded = codec.decode(&bytes, Some("image/jpeg")).unwrap();
        assert_eq!(decoded.dimensions(), Dimensions::new(8, 6));
    }
}
