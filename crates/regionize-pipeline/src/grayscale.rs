//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! 3-channel color image the detection strategies work from, plus the
//! single-channel luminance image the structural and edge strategies
//! threshold.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::types::PipelineError;

/// Decode raw image bytes into an 8-bit RGB image.
///
/// Alpha, if present, is dropped.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    load(bytes).map(|img| img.to_rgb8())
}

/// Decode raw image bytes into an 8-bit RGBA image, keeping alpha.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    load(bytes).map(|img| img.to_rgba8())
}

fn load(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Convert to grayscale with the BT.601 luma weights
/// `0.299*R + 0.587*G + 0.114*B`, rounded.
#[must_use = "returns the grayscale image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_gray(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let luma = 0.114f32.mul_add(
            f32::from(b),
            0.299f32.mul_add(f32::from(r), 0.587 * f32::from(g)),
        );
        image::Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGB image as a PNG byte buffer.
    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn text_is_not_an_image() {
        let result = decode(b"regions are not pixels\n");
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn png_round_trips_pixels() {
        let img = RgbImage::from_fn(17, 31, |x, y| {
            image::Rgb([u8::try_from(x).unwrap(), u8::try_from(y).unwrap(), 7])
        });
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn rgba_input_drops_alpha() {
        let img = image::RgbaImage::from_pixel(3, 3, image::Rgba([10, 20, 30, 40]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            3,
            3,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        let decoded = decode(&buf).unwrap();
        assert_eq!(decoded.get_pixel(1, 1).0, [10, 20, 30]);
    }

    #[test]
    fn rgba_decode_keeps_alpha() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 40]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            2,
            2,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        assert_eq!(decode_rgba(&buf).unwrap(), img);
        assert!(matches!(decode_rgba(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn luma_weights() {
        let img = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => image::Rgb([255, 0, 0]),
            1 => image::Rgb([0, 255, 0]),
            2 => image::Rgb([0, 0, 255]),
            _ => image::Rgb([255, 255, 255]),
        });
        let gray = to_gray(&img);
        assert_eq!(gray.get_pixel(0, 0).0[0], 76);
        assert_eq!(gray.get_pixel(1, 0).0[0], 150);
        assert_eq!(gray.get_pixel(2, 0).0[0], 29);
        assert_eq!(gray.get_pixel(3, 0).0[0], 255);
    }
}
