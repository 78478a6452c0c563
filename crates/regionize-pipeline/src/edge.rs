//! Canny edge detection and edge dilation.
//!
//! Wraps [`imageproc::edges::canny`] to detect edges in the blurred
//! grayscale image, then thickens them with a square dilation so that
//! nearly-closed boundaries become closed rings that contour tracing can
//! follow.

use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Low hysteresis threshold of the edge strategy.
pub const CANNY_LOW: f32 = 50.0;

/// High hysteresis threshold of the edge strategy.
pub const CANNY_HIGH: f32 = 150.0;

/// Dilation radius under the L-infinity norm; 2 gives a 5x5 square.
pub const DILATION_RADIUS: u8 = 2;

/// Minimum allowed Canny threshold.
///
/// A low threshold of zero lets hysteresis walk onto border pixels
/// whose suppressed magnitude is zero.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges using the Canny algorithm.
///
/// Returns a binary image: 255 for edge pixels, 0 for non-edge. Both
/// thresholds are clamped to at least [`MIN_THRESHOLD`] and `low` to at
/// most `high`. Images smaller than 3x3 have no interior to suppress
/// and produce an empty edge map.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    if image.width() < 3 || image.height() < 3 {
        return GrayImage::new(image.width(), image.height());
    }
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(image, low, high)
}

/// Thicken edges with a `(2r+1)`x`(2r+1)` square structuring element.
#[must_use = "returns the dilated edge map"]
pub fn dilate(edges: &GrayImage, radius: u8) -> GrayImage {
    imageproc::morphology::dilate(edges, Norm::LInf, radius)
}

/// Edge map of the edge strategy: Canny at the fixed thresholds,
/// dilated to close small gaps.
#[must_use = "returns the closed edge mask"]
pub fn closed_edges(blurred: &GrayImage) -> GrayImage {
    dilate(&canny(blurred, CANNY_LOW, CANNY_HIGH), DILATION_RADIUS)
}
