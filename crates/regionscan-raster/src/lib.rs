//! # regionscan-raster
//!
//! Pixel storage and image codec for the regionscan engine.
//!
//! This crate provides:
//! - `RasterBuffer`, the engine's sole input type (row-major RGBA8)
//! - The `ImageCodec` trait for decoding and encoding rasters
//! - `DefaultCodec`, backed by the `image` crate
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on regionscan-core
//! and is consumed by the detector and extraction crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod codec;

// Re-export commonly used types
pub use buffer::RasterBuffer;
pub use codec::{DefaultCodec, ImageCodec};
