//! WebP output through libwebp: lossy, lossless and animated.
//!
//! ```text
//! frames ──► [still]  ──► Encoder::encode_advanced ──► VP8 / VP8L
//!        └─► [a, b..] ──► AnimEncoder (loop forever) ──► ANIM + ANMF
//! ```

use image::Frame;
use libwebp_sys::WebPConfig;
use webp::{AnimEncoder, AnimFrame, Encoder};

use super::{CodecError, EncodeParams};

/// libwebp's slowest, smallest method.
const MAX_METHOD: u8 = 6;

/// Browsers play zero-delay GIF frames at this pace.
const ZERO_DELAY_MS: i32 = 100;

/// Encode one or more RGBA frames as a WebP file.
pub fn encode(frames: &[Frame], params: &EncodeParams) -> Result<Vec<u8>, CodecError> {
    let config = config(params)?;
    match frames {
        [] => Err(CodecError::Webp("no frames to encode".to_string())),
        [still] => encode_still(still, &config),
        [first, ..] => encode_animation(first.buffer().dimensions(), frames, &config),
    }
}

fn config(params: &EncodeParams) -> Result<WebPConfig, CodecError> {
    let mut config = WebPConfig::new()
        .map_err(|()| CodecError::Webp("cannot initialize encoder config".to_string()))?;
    config.lossless = i32::from(params.lossless);
    // For lossless output quality trades speed for size instead of fidelity
    config.quality = f32::from(params.quality.min(100));
    config.method = i32::from(params.effort.min(MAX_METHOD));
    Ok(config)
}

fn encode_still(frame: &Frame, config: &WebPConfig) -> Result<Vec<u8>, CodecError> {
    let buffer = frame.buffer();
    Encoder::from_rgba(buffer.as_raw(), buffer.width(), buffer.height())
        .encode_advanced(config)
        .map(|memory| memory.to_vec())
        .map_err(|err| CodecError::Webp(format!("{err:?}")))
}

fn encode_animation(
    (width, height): (u32, u32),
    frames: &[Frame],
    config: &WebPConfig,
) -> Result<Vec<u8>, CodecError> {
    let mut encoder = AnimEncoder::new(width, height, config);
    encoder.set_loop_count(0);

    let mut timestamp = 0i32;
    for frame in frames {
        let buffer = frame.buffer();
        if buffer.dimensions() != (width, height) {
            return Err(CodecError::Webp(format!(
                "frame is {}x{}, canvas is {width}x{height}",
                buffer.width(),
                buffer.height()
            )));
        }
        encoder.add_frame(AnimFrame::from_rgba(
            buffer.as_raw(),
            width,
            height,
            timestamp,
        ));
        timestamp = timestamp.saturating_add(delay_ms(frame));
    }

    encoder
        .try_encode()
        .map(|memory| memory.to_vec())
        .map_err(|err| CodecError::Webp(format!("{err:?}")))
}

fn delay_ms(frame: &Frame) -> i32 {
    let (numer, denom) = frame.delay().numer_denom_ms();
    match numer / denom.max(1) {
        0 => ZERO_DELAY_MS,
        ms => i32::try_from(ms).unwrap_or(i32::MAX),
    }
}
