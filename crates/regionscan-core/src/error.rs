//! Error types for regionscan.

use thiserror::Error;

/// Main error type for regionscan operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Image bytes could not be decoded into a raster
    #[error("Decode error: {0}")]
    Decode(String),

    /// Raster could not be encoded
    #[error("Encode error: {0}")]
    Encode(String),

    /// Image format or MIME type not supported by the codec
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Raster dimensions do not match the pixel data
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// Region is empty or lies outside the image
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Crop of an otherwise valid region failed
    #[error("Crop failed: {0}")]
    CropFailed(String),

    /// Extraction options are inconsistent
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// A detector pass failed
    #[error("Detector '{detector}' failed: {message}")]
    Detector {
        /// Detector name
        detector: String,
        /// Failure message
        message: String,
    },

    /// The external detector collaborator failed
    #[error("External detector error: {0}")]
    ExternalDetector(String),

    /// Extraction did not finish in time
    #[error("Extraction timed out after {0}ms")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error() {
        let err = Error::Decode("truncated PNG".to_string());
        assert_eq!(err.to_string(), "Decode error: truncated PNG");
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = Error::UnsupportedFormat("image/tiff".to_string());
        assert_eq!(err.to_string(), "Unsupported image format: image/tiff");
    }

    #[test]
    fn test_invalid_dimensions_error() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert_eq!(err.to_string(), "Invalid dimensions: 0x100");
    }

    #[test]
    fn test_detector_error() {
        let err = Error::Detector {
            detector: "solid_color".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Detector 'solid_color' failed: boom");
    }

    #[test]
    fn test_timeout_error() {
        let err = Error::Timeout(5000);
        assert_eq!(err.to_string(), "Extraction timed out after 5000ms");
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config("rows must be > 0".to_string());
        assert_eq!(err.to_string(), "Configuration error: rows must be > 0");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_other_error() {
        let err = Error::Other("unknown error".to_string());
        assert_eq!(err.to_string(), "unknown error");
    }
}
