//! Fixed-size Gaussian smoothing.
//!
//! The structural and edge strategies are tuned in terms of kernel
//! size (a 5x5 smoothing blur, an 11x11 adaptive-threshold block),
//! while [`imageproc::filter::gaussian_blur_f32`] derives its kernel
//! extent from sigma. This module builds the kernel from its size and
//! hands it to [`imageproc::filter::separable_filter_equal`], which
//! replicates edge pixels at the border.
//!
//! Filtering runs on an `f32` copy of the image so the intermediate
//! horizontal pass is not truncated to `u8`.

use image::{GrayImage, ImageBuffer, Luma};

/// Single-channel `f32` image, as produced by [`gaussian_mean`].
pub type GrayImageF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Kernel size of the pre-segmentation smoothing blur.
pub const SMOOTHING_KERNEL_SIZE: usize = 5;

/// Standard deviation conventionally paired with an odd kernel size.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sigma_for_size(size: usize) -> f32 {
    0.3f32.mul_add((size as f32 - 1.0).mul_add(0.5, -1.0), 0.8)
}

/// Normalized 1D Gaussian weights for an odd kernel `size`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gaussian_kernel(size: usize) -> Vec<f32> {
    let size = size.max(1) | 1;
    let sigma = sigma_for_size(size);
    let half = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - half;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Gaussian-weighted neighborhood mean of every pixel, unrounded.
#[must_use]
pub fn gaussian_mean(image: &GrayImage, size: usize) -> GrayImageF32 {
    let src = GrayImageF32::from_fn(image.width(), image.height(), |x, y| {
        Luma([f32::from(image.get_pixel(x, y).0[0])])
    });
    imageproc::filter::separable_filter_equal(&src, &gaussian_kernel(size))
}

/// Blur a grayscale image with a `size`x`size` Gaussian kernel.
#[must_use = "returns the blurred image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gaussian_blur(image: &GrayImage, size: usize) -> GrayImage {
    let mean = gaussian_mean(image, size);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        Luma([mean.get_pixel(x, y).0[0].round().clamp(0.0, 255.0) as u8])
    })
}
