//! Legacy bitmap decoding.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::codecs::bmp::BmpDecoder;
use image::{DynamicImage, RgbaImage};

use super::CodecError;

/// Decode a BMP file into RGBA pixels.
pub fn decode_bmp(path: &Path) -> Result<RgbaImage, CodecError> {
    let bytes = fs::read(path).map_err(|err| CodecError::Io(path.to_path_buf(), err))?;
    decode_bmp_bytes(&bytes)
}

fn decode_bmp_bytes(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    let decoder = BmpDecoder::new(Cursor::new(bytes))?;
    Ok(DynamicImage::from_decoder(decoder)?.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    #[test]
    fn test_decode_bmp_roundtrip_pixels() {
        let img = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Bmp)
            .unwrap();

        let decoded = decode_bmp_bytes(buf.get_ref()).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_bmp_rejects_png() {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(1, 1))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();

        assert!(decode_bmp_bytes(buf.get_ref()).is_err());
    }
}
