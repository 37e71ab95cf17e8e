//! Built-in codec backed by the `image` crate, with libwebp for WebP output.

use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, ImageReader};

use super::{
    Codec, CodecError, EncodeParams, Input, Probe, TargetFormat, bitmap, heif, svg, webp_encode,
};
use crate::image::format::ImageFormat;

/// Codec for everything the crate can decode natively.
///
/// High-efficiency containers are recognized by [`Codec::probe`] but cannot
/// be decoded, so encoding from them fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterCodec;

impl RasterCodec {
    pub const fn new() -> Self {
        Self
    }
}

impl Codec for RasterCodec {
    fn probe(&self, input: &Input) -> Result<Probe, CodecError> {
        match input {
            Input::Pixels(_) => Ok(Probe::still(ImageFormat::Raw)),
            Input::File(path) => probe_bytes(&read(path)?),
        }
    }

    fn decode_bitmap(&self, path: &Path) -> Result<Input, CodecError> {
        bitmap::decode_bmp(path).map(Input::Pixels)
    }

    fn encode(
        &self,
        input: &Input,
        target: &Path,
        params: &EncodeParams,
    ) -> Result<(), CodecError> {
        let file = File::create(target).map_err(|err| CodecError::Io(target.to_path_buf(), err))?;
        let mut writer = BufWriter::new(file);

        let result = write_target(input, &mut writer, params).and_then(|()| {
            writer
                .flush()
                .map_err(|err| CodecError::Io(target.to_path_buf(), err))
        });

        if result.is_err() {
            drop(writer);
            let _ = fs::remove_file(target);
        }
        result
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CodecError> {
    fs::read(path).map_err(|err| CodecError::Io(path.to_path_buf(), err))
}

/// Identify format and frame count from file contents.
fn probe_bytes(bytes: &[u8]) -> Result<Probe, CodecError> {
    if heif::is_heif(bytes) {
        return Ok(Probe::still(ImageFormat::Heif));
    }
    if svg::looks_like_svg(bytes) {
        svg::parse(bytes)?;
        return Ok(Probe::still(ImageFormat::Svg));
    }

    let guessed = image::guess_format(bytes).map_err(|_| CodecError::Unrecognized)?;
    let format = match guessed {
        image::ImageFormat::Jpeg => ImageFormat::Jpeg,
        image::ImageFormat::Png => ImageFormat::Png,
        image::ImageFormat::Gif => ImageFormat::Gif,
        image::ImageFormat::Tiff => ImageFormat::Tiff,
        image::ImageFormat::Bmp => ImageFormat::Bmp,
        image::ImageFormat::WebP => ImageFormat::Webp,
        _ => return Err(CodecError::Unrecognized),
    };

    // Reject files whose magic bytes look right but whose header is broken
    ImageReader::with_format(Cursor::new(bytes), guessed).into_dimensions()?;

    let frames = match format {
        ImageFormat::Gif => count_frames(GifDecoder::new(Cursor::new(bytes))?)?,
        ImageFormat::Webp => {
            let decoder = WebPDecoder::new(Cursor::new(bytes))?;
            if decoder.has_animation() {
                count_frames(decoder)?
            } else {
                1
            }
        }
        _ => 1,
    };

    Ok(Probe { format, frames })
}

fn count_frames<'a>(decoder: impl AnimationDecoder<'a>) -> Result<u32, CodecError> {
    decoder
        .into_frames()
        .try_fold(0u32, |n, frame| frame.map(|_| n + 1))
        .map_err(CodecError::from)
}

/// Decode `input` as a single still image (first frame of animations).
fn load_still(input: &Input) -> Result<DynamicImage, CodecError> {
    let path = match input {
        Input::Pixels(pixels) => return Ok(DynamicImage::ImageRgba8(pixels.clone())),
        Input::File(path) => path,
    };

    let bytes = read(path)?;
    if heif::is_heif(&bytes) {
        return Err(CodecError::Unsupported(ImageFormat::Heif));
    }
    if svg::looks_like_svg(&bytes) {
        return svg::rasterize(&bytes).map(DynamicImage::ImageRgba8);
    }
    Ok(image::load_from_memory(&bytes)?)
}

/// Decode all frames of `input`. Still inputs yield one frame.
fn load_frames(input: &Input) -> Result<Vec<Frame>, CodecError> {
    if let Input::File(path) = input {
        let bytes = read(path)?;
        match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Gif) => {
                return Ok(GifDecoder::new(Cursor::new(&bytes))?
                    .into_frames()
                    .collect_frames()?);
            }
            Ok(image::ImageFormat::WebP) => {
                let decoder = WebPDecoder::new(Cursor::new(&bytes))?;
                if decoder.has_animation() {
                    return Ok(decoder.into_frames().collect_frames()?);
                }
            }
            _ => {}
        }
    }

    Ok(vec![Frame::new(load_still(input)?.to_rgba8())])
}

fn write_target<W: Write>(
    input: &Input,
    writer: &mut W,
    params: &EncodeParams,
) -> Result<(), CodecError> {
    match params.format {
        TargetFormat::Webp => {
            let bytes = webp_encode::encode(&load_frames(input)?, params)?;
            writer
                .write_all(&bytes)
                .map_err(image::ImageError::IoError)?;
        }
        TargetFormat::Png => {
            let compression = if params.effort >= 7 {
                CompressionType::Best
            } else {
                CompressionType::Default
            };
            let encoder = PngEncoder::new_with_quality(writer, compression, FilterType::Adaptive);
            load_still(input)?.write_with_encoder(encoder)?;
        }
        TargetFormat::Gif => {
            let frames = load_frames(input)?;
            let mut encoder = GifEncoder::new_with_speed(writer, gif_speed(params.effort));
            encoder.set_repeat(Repeat::Infinite)?;
            encoder.encode_frames(frames)?;
        }
    }
    Ok(())
}

/// Map effort (0-10) onto the gif quantizer speed (30 fastest, 1 best).
fn gif_speed(effort: u8) -> i32 {
    let effort = i32::from(effort.min(10));
    30 - effort * 29 / 10
}
