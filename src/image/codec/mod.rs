//! Image codec capability.
//!
//! The conversion policy only needs three things from a codec:
//!
//! - [`Codec::probe`]: actual format family and frame count
//! - [`Codec::decode_bitmap`]: turn a legacy bitmap file into raw pixels
//! - [`Codec::encode`]: write a derivative in the requested format
//!
//! [`RasterCodec`] implements them with the `image` crate (raster formats),
//! `usvg`/`resvg` (vector input), libwebp via `webp` (WebP output) and a
//! container sniff for high-efficiency images.

mod bitmap;
mod heif;
mod raster;
mod svg;
mod webp_encode;

pub use raster::RasterCodec;

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use super::format::ImageFormat;

/// Result of probing an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub format: ImageFormat,
    /// Number of frames (pages). Still images report 1.
    pub frames: u32,
}

impl Probe {
    pub const fn still(format: ImageFormat) -> Self {
        Self { format, frames: 1 }
    }

    pub const fn is_animated(&self) -> bool {
        self.frames > 1
    }
}

/// Input handed to the codec.
#[derive(Debug, Clone)]
pub enum Input {
    /// A self-describing file on disk.
    File(PathBuf),
    /// Pixels decoded from a raw bitmap.
    Pixels(RgbaImage),
}

/// Output format of a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    Webp,
    Png,
    Gif,
}

/// Encoder settings chosen by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeParams {
    pub format: TargetFormat,
    /// 1-100.
    pub quality: u8,
    pub lossless: bool,
    /// Encoder effort, 0 (fastest) to 10 (smallest).
    pub effort: u8,
}

impl EncodeParams {
    pub const fn webp(lossless: bool) -> Self {
        Self {
            format: TargetFormat::Webp,
            quality: 100,
            lossless,
            effort: 6,
        }
    }

    pub const fn png() -> Self {
        Self {
            format: TargetFormat::Png,
            quality: 100,
            lossless: true,
            effort: 10,
        }
    }

    pub const fn gif() -> Self {
        Self {
            format: TargetFormat::Gif,
            quality: 100,
            lossless: false,
            effort: 10,
        }
    }
}

/// Codec failures.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("invalid SVG: {0}")]
    Svg(String),

    #[error("unrecognized image format")]
    Unrecognized,

    #[error("{0} images cannot be decoded")]
    Unsupported(ImageFormat),

    #[error("WebP encoding failed: {0}")]
    Webp(String),
}

/// Image codec capability shared by all candidate evaluations.
pub trait Codec: Sync {
    /// Report the actual format and frame count of `input`.
    fn probe(&self, input: &Input) -> Result<Probe, CodecError>;

    /// Decode a legacy bitmap file into pixels.
    fn decode_bitmap(&self, path: &Path) -> Result<Input, CodecError>;

    /// Encode `input` to `target`.
    fn encode(&self, input: &Input, target: &Path, params: &EncodeParams)
    -> Result<(), CodecError>;
}
