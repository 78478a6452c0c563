//! Dominant color swatches.
//!
//! Opaque pixels are clustered with the same seeded k-means used for
//! region detection, but in plain sRGB so that centroids are directly
//! printable colors. Centroids that are nearly black or nearly white
//! are discarded, and the rest are returned darkest first as at most
//! [`MAX_SWATCHES`] swatches.

use std::fmt;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::cluster::{self, KMeansParams};
use crate::grayscale;
use crate::types::PipelineError;

/// Clusters requested when the caller does not choose.
pub const DEFAULT_CLUSTERS: usize = 7;

/// Smallest accepted cluster count.
pub const MIN_CLUSTERS: usize = 2;

/// Largest accepted cluster count.
pub const MAX_CLUSTERS: usize = 20;

/// Upper bound on the number of swatches returned.
pub const MAX_SWATCHES: usize = 5;

/// Pixels with alpha at or below this are ignored.
pub const ALPHA_CUTOFF: u8 = 128;

/// Centroids darker than this luminance (0-255 scale) are dropped.
pub const MIN_LUMINANCE: f64 = 25.0;

/// Centroids brighter than this luminance (0-255 scale) are dropped.
pub const MAX_LUMINANCE: f64 = 185.0;

/// One palette color. Serializes as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Swatch {
    /// sRGB components.
    pub rgb: [u8; 3],
}

impl Swatch {
    /// Swatch from sRGB components.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { rgb: [r, g, b] }
    }

    /// Relative luminance with Rec. 709 weights, on a 0-255 scale.
    #[must_use]
    pub fn luminance(self) -> f64 {
        let [r, g, b] = self.rgb.map(f64::from);
        0.0722f64.mul_add(b, 0.2126f64.mul_add(r, 0.7152 * g))
    }
}

impl fmt::Display for Swatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.rgb;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl From<Swatch> for String {
    fn from(swatch: Swatch) -> Self {
        swatch.to_string()
    }
}

impl TryFrom<String> for Swatch {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, got {value:?}"))?;
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("bad hex color {value:?}: {e}"))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Clamp a requested cluster count into [`MIN_CLUSTERS`]..=[`MAX_CLUSTERS`].
#[must_use]
pub fn clamp_clusters(clusters: usize) -> usize {
    clusters.clamp(MIN_CLUSTERS, MAX_CLUSTERS)
}

/// Extract up to [`MAX_SWATCHES`] mid-luminance swatches, darkest first.
///
/// `clusters` is clamped with [`clamp_clusters`]. An image without
/// opaque pixels has no swatches.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn extract(image: &RgbaImage, clusters: usize) -> Vec<Swatch> {
    let samples: Vec<[f32; 3]> = image
        .pixels()
        .filter(|p| p.0[3] > ALPHA_CUTOFF)
        .map(|p| [f32::from(p.0[0]), f32::from(p.0[1]), f32::from(p.0[2])])
        .collect();

    let params = KMeansParams {
        clusters: clamp_clusters(clusters),
        ..KMeansParams::default()
    };
    let Some(clustering) = cluster::kmeans(&samples, &params, &mut cluster::seeded_rng()) else {
        log::debug!("no opaque pixels to extract swatches from");
        return Vec::new();
    };

    let mut swatches: Vec<(f64, Swatch)> = clustering
        .centers
        .iter()
        .zip(clustering.sizes())
        .filter(|&(_, size)| size > 0)
        .map(|(center, _)| {
            let [r, g, b] = center.map(|c| c.round().clamp(0.0, 255.0) as u8);
            let swatch = Swatch::new(r, g, b);
            (swatch.luminance(), swatch)
        })
        .filter(|(luminance, _)| (MIN_LUMINANCE..=MAX_LUMINANCE).contains(luminance))
        .collect();
    log::debug!(
        "{} of {} centroids within luminance bounds",
        swatches.len(),
        clustering.centers.len(),
    );

    swatches.sort_by(|a, b| a.0.total_cmp(&b.0));
    swatches.truncate(MAX_SWATCHES);
    swatches.into_iter().map(|(_, swatch)| swatch).collect()
}

/// Decode image bytes and extract swatches.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] or [`PipelineError::ImageDecode`]
/// if the bytes are not a readable image.
pub fn process_swatches(image_bytes: &[u8], clusters: usize) -> Result<Vec<Swatch>, PipelineError> {
    let image = grayscale::decode_rgba(image_bytes)?;
    Ok(extract(&image, clusters))
}
