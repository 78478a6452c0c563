//! Region detection strategies.
//!
//! This module defines the [`Strategy`] trait every segmentation
//! approach implements and the [`StrategyKind`] enum naming them. The
//! orchestrator in [`crate::pipeline`] decides which to run and which
//! result to keep; each strategy on its own only turns a [`Scene`] into
//! a region set.
//!
//! # Buffers
//!
//! The blurred grayscale image is computed once per invocation and
//! shared read-only through the [`Scene`]. Every strategy allocates its
//! own threshold, edge, or label buffers and drops them on return, so a
//! strategy that is skipped can never leave stale data for the next one.

use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, Polygon, RegionLimits};
use crate::{blur, cluster, contour, edge, fallback, grayscale, threshold};

/// Read-only inputs shared by all strategies of one invocation.
#[derive(Debug)]
pub struct Scene<'a> {
    image: &'a RgbImage,
    blurred: GrayImage,
}

impl<'a> Scene<'a> {
    /// Prepare the shared grayscale buffer for `image`.
    #[must_use]
    pub fn new(image: &'a RgbImage) -> Self {
        let gray = grayscale::to_gray(image);
        let blurred = blur::gaussian_blur(&gray, blur::SMOOTHING_KERNEL_SIZE);
        Self { image, blurred }
    }

    /// The source color image.
    #[must_use]
    pub const fn image(&self) -> &RgbImage {
        self.image
    }

    /// Grayscale after the 5x5 smoothing blur.
    #[must_use]
    pub const fn blurred(&self) -> &GrayImage {
        &self.blurred
    }

    /// Source image dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }
}

/// Names a detection strategy, in escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Gaussian adaptive threshold on the blurred grayscale.
    StructuralAdaptive,
    /// Otsu global threshold on the blurred grayscale.
    StructuralOtsu,
    /// Dilated Canny edges.
    Edge,
    /// k-means in L\*a\*b\*, one mask per cluster.
    ColorCluster,
    /// Centered rectangle, independent of pixel content.
    Fallback,
}

impl StrategyKind {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StructuralAdaptive => "Structural (adaptive)",
            Self::StructuralOtsu => "Structural (Otsu)",
            Self::Edge => "Edge",
            Self::ColorCluster => "Color cluster",
            Self::Fallback => "Fallback",
        }
    }
}

/// Trait for region detection strategies.
///
/// Output always satisfies the region set invariants for data-driven
/// strategies: at least 3 points and `limits.min_area` per polygon,
/// largest first, at most `limits.max_regions` polygons.
pub trait Strategy {
    /// Produce candidate regions for the scene.
    fn run(&self, scene: &Scene<'_>, limits: &RegionLimits) -> Vec<Polygon>;
}

impl Strategy for StrategyKind {
    fn run(&self, scene: &Scene<'_>, limits: &RegionLimits) -> Vec<Polygon> {
        match *self {
            Self::StructuralAdaptive => {
                let mask = threshold::adaptive_inverted(
                    scene.blurred(),
                    threshold::ADAPTIVE_BLOCK_SIZE,
                    threshold::ADAPTIVE_BIAS,
                );
                contour::mask_to_regions(&threshold::clean(&mask), limits)
            }
            Self::StructuralOtsu => {
                let mask = threshold::otsu_inverted(scene.blurred());
                contour::mask_to_regions(&threshold::clean(&mask), limits)
            }
            Self::Edge => contour::mask_to_regions(&edge::closed_edges(scene.blurred()), limits),
            Self::ColorCluster => cluster::segment(scene.image(), limits),
            Self::Fallback => vec![fallback::center_rectangle(scene.dimensions())],
        }
    }
}
