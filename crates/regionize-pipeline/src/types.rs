//! Shared types for the regionize detection pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// intermediate raster data without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so callers can hand an already-decoded image
/// to [`detect`](crate::detect) without depending on `image` directly.
pub use image::RgbImage;

/// A 2D point in integer pixel coordinates.
///
/// Serialized as a two-element `[x, y]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A simplified closed region boundary.
///
/// The ring is implicitly closed: the last point connects back to the
/// first. Winding order is whatever the contour tracer produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a new polygon from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polygon has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polygon and returns the underlying vertices.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Unsigned enclosed area (shoelace formula).
    #[must_use]
    pub fn area(&self) -> f64 {
        crate::geometry::polygon_area(&self.0)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Per-invocation limits every data-driven strategy filters against.
///
/// Derived once from [`DetectConfig`] and the image dimensions, then
/// held fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionLimits {
    /// Minimum enclosed area in square pixels.
    pub min_area: f64,
    /// Maximum number of regions returned.
    pub max_regions: usize,
}

/// Configuration for region detection.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Minimum region area as a fraction of the total image area.
    pub min_area_ratio: f64,

    /// Maximum number of regions to return.
    pub max_regions: usize,
}

impl DetectConfig {
    /// Default for [`min_area_ratio`](Self::min_area_ratio).
    pub const DEFAULT_MIN_AREA_RATIO: f64 = 0.005;

    /// Default for [`max_regions`](Self::max_regions).
    pub const DEFAULT_MAX_REGIONS: usize = 20;

    /// Check the configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `min_area_ratio` is
    /// not a finite value in `[0, 1]` or `max_regions` is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.min_area_ratio.is_finite() || !(0.0..=1.0).contains(&self.min_area_ratio) {
            return Err(PipelineError::InvalidConfig(format!(
                "min_area_ratio must be within [0, 1], got {}",
                self.min_area_ratio,
            )));
        }
        if self.max_regions == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_regions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the absolute limits for an image of the given size.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn limits(&self, dimensions: Dimensions) -> RegionLimits {
        RegionLimits {
            min_area: self.min_area_ratio * dimensions.pixel_count() as f64,
            max_regions: self.max_regions,
        }
    }
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            min_area_ratio: Self::DEFAULT_MIN_AREA_RATIO,
            max_regions: Self::DEFAULT_MAX_REGIONS,
        }
    }
}

/// Result of running region detection.
///
/// Serializes flat as `{"regions": [...], "width": W, "height": H}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regions {
    /// Region polygons, largest first.
    pub regions: Vec<Polygon>,

    /// Dimensions of the source image, echoed unchanged.
    #[serde(flatten)]
    pub dimensions: Dimensions,
}

/// Errors that can occur during region detection.
///
/// Only decoding and configuration problems surface here. A strategy
/// that finds nothing is not an error: the fallback always produces
/// a region.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("could not read image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("could not read image: input is empty")]
    EmptyInput,

    /// Detection configuration is invalid.
    #[error("invalid detection configuration: {0}")]
    InvalidConfig(String),
}
