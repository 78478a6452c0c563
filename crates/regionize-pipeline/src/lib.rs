//! regionize-pipeline: Region detection for photographs (sans-IO).
//!
//! Finds the large, visually coherent areas of an image and returns
//! each as a simplified polygon, by escalating through increasingly
//! expensive strategies until one produces a usable region set:
//!
//! adaptive threshold -> Otsu threshold -> Canny edges ->
//! L\*a\*b\* color clustering -> centered fallback rectangle.
//!
//! [`swatch`] additionally extracts a small palette of dominant colors
//! with the same seeded k-means.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Reading files and printing
//! results lives in the `regionize` binary.

pub mod blur;
pub mod cluster;
pub mod contour;
pub mod diagnostics;
pub mod edge;
pub mod fallback;
pub mod geometry;
pub mod grayscale;
pub mod pipeline;
pub mod strategy;
pub mod swatch;
pub mod threshold;
pub mod types;

pub use diagnostics::{DetectDiagnostics, StrategyAttempt};
pub use strategy::{Strategy, StrategyKind};
pub use swatch::Swatch;
pub use types::{
    DetectConfig, Dimensions, PipelineError, Point, Polygon, RegionLimits, Regions, RgbImage,
};

use web_time::Instant;

/// Decode image bytes and detect regions.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP) and a configuration,
/// then produces the detected [`Regions`] together with the source
/// image dimensions.
///
/// # Pipeline steps
///
/// 1. Validate the configuration
/// 2. Decode the image
/// 3. Grayscale and 5x5 Gaussian blur (shared by all strategies)
/// 4. Escalate through the strategies (see [`pipeline`])
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(image_bytes: &[u8], config: &DetectConfig) -> Result<Regions, PipelineError> {
    diagnostics::process_with_diagnostics(image_bytes, config).map(|(regions, _)| regions)
}

/// Detect regions in an already-decoded image.
///
/// On success the region set is never empty.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
pub fn detect(image: &RgbImage, config: &DetectConfig) -> Result<Regions, PipelineError> {
    config.validate()?;
    let (regions, _) = diagnostics::run(image, config, Instant::now());
    Ok(regions)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Create a PNG whose left half is black and right half white.
    fn split_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, _y| {
            if x < width / 2 {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &DetectConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &DetectConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn process_rejects_invalid_ratio() {
        let config = DetectConfig {
            min_area_ratio: f64::NAN,
            ..DetectConfig::default()
        };
        let result = process(&split_png(20, 20), &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn process_split_image_finds_regions() {
        let result = process(&split_png(40, 40), &DetectConfig::default()).unwrap();
        assert!(!result.regions.is_empty());
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 40,
                height: 40
            }
        );
    }

    #[test]
    fn detect_matches_process() {
        let png = split_png(40, 30);
        let decoded = grayscale::decode(&png).unwrap();
        let config = DetectConfig::default();
        assert_eq!(
            detect(&decoded, &config).unwrap(),
            process(&png, &config).unwrap(),
        );
    }

    #[test]
    fn detect_one_pixel_image_uses_fallback() {
        let img = RgbImage::from_pixel(1, 1, image::Rgb([5, 5, 5]));
        let result = detect(&img, &DetectConfig::default()).unwrap();
        assert_eq!(result.regions.len(), 1);
        let coords: Vec<[i32; 2]> = result.regions[0]
            .points()
            .iter()
            .map(|&p| p.into())
            .collect();
        assert_eq!(coords, vec![[0, 0], [1, 0], [1, 1], [0, 1]]);
    }

    #[test]
    fn regions_serialize_flat() {
        let img = RgbImage::from_pixel(10, 10, image::Rgb([200, 10, 10]));
        let result = detect(&img, &DetectConfig::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["width"], 10);
        assert_eq!(json["height"], 10);
        assert_eq!(
            json["regions"],
            serde_json::json!([[[2, 2], [8, 2], [8, 8], [2, 8]]])
        );
    }
}
