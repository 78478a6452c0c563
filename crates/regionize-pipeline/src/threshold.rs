//! Structural segmentation: intensity thresholding followed by
//! morphological cleanup.
//!
//! Both thresholds are inverted so that darker-than-surroundings (or
//! darker-than-level) pixels become foreground (255). The cleanup is one
//! 3x3 closing followed by one 3x3 opening.

use image::GrayImage;
use imageproc::distance_transform::Norm;

use crate::blur;

/// Neighborhood size of the adaptive threshold.
pub const ADAPTIVE_BLOCK_SIZE: usize = 11;

/// Bias subtracted from the local mean before comparing.
pub const ADAPTIVE_BIAS: f32 = 2.0;

/// Inverted Gaussian-weighted adaptive threshold.
///
/// A pixel is foreground when it is no brighter than its rounded
/// neighborhood mean minus `bias`.
#[must_use = "returns the binary mask"]
pub fn adaptive_inverted(image: &GrayImage, block_size: usize, bias: f32) -> GrayImage {
    let mean = blur::gaussian_mean(image, block_size);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let v = f32::from(image.get_pixel(x, y).0[0]);
        let m = mean.get_pixel(x, y).0[0];
        image::Luma([if v > m.round() - bias { 0 } else { 255 }])
    })
}

/// Inverted global threshold at the Otsu level.
///
/// An image with a single intensity has no two classes to separate and
/// yields an all-background mask.
#[must_use = "returns the binary mask"]
pub fn otsu_inverted(image: &GrayImage) -> GrayImage {
    if is_single_intensity(image) {
        return GrayImage::new(image.width(), image.height());
    }
    let level = imageproc::contrast::otsu_level(image);
    log::trace!("otsu level {level}");
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([if image.get_pixel(x, y).0[0] > level { 0 } else { 255 }])
    })
}

/// One 3x3 closing then one 3x3 opening.
///
/// Closing fills pinholes and hairline gaps; opening then removes
/// isolated speckles.
#[must_use = "returns the cleaned mask"]
pub fn clean(mask: &GrayImage) -> GrayImage {
    let closed = imageproc::morphology::close(mask, Norm::LInf, 1);
    imageproc::morphology::open(&closed, Norm::LInf, 1)
}

fn is_single_intensity(image: &GrayImage) -> bool {
    let mut values = image.as_raw().iter();
    values
        .next()
        .is_none_or(|first| values.all(|v| v == first))
}
