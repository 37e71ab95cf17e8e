//! SVG detection and rasterization.
//!
//! SVG sources are parsed with usvg and rendered at their intrinsic size
//! with resvg before being handed to a raster encoder.

use anyhow::Context;
use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};

use super::CodecError;

/// How far into the file to look for the root element.
const SNIFF_LEN: usize = 4096;

/// Cheap check for SVG markup before a full parse.
pub fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let Ok(text) = std::str::from_utf8(trim_utf8_tail(head)) else {
        return false;
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with('<') && text.contains("<svg")
}

/// Cut a possibly split multi-byte sequence off the end of a sniff window.
fn trim_utf8_tail(bytes: &[u8]) -> &[u8] {
    match std::str::from_utf8(bytes) {
        Ok(_) => bytes,
        Err(err) => &bytes[..err.valid_up_to()],
    }
}

/// Parse SVG data into a render tree.
pub fn parse(svg_data: &[u8]) -> Result<usvg::Tree, CodecError> {
    usvg::Tree::from_data(svg_data, &usvg::Options::default())
        .map_err(|err| CodecError::Svg(err.to_string()))
}

/// Render SVG data to straight-alpha RGBA pixels.
pub fn rasterize(svg_data: &[u8]) -> Result<RgbaImage, CodecError> {
    let tree = parse(svg_data)?;
    render(&tree).map_err(|err| CodecError::Svg(format!("{err:#}")))
}

fn render(tree: &usvg::Tree) -> anyhow::Result<RgbaImage> {
    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());

    let mut pixmap = Pixmap::new(width, height)
        .with_context(|| format!("invalid SVG dimensions: {width}x{height}"))?;
    resvg::render(tree, Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(width, height, data).context("pixel buffer size mismatch")
}
