//! Color-cluster segmentation.
//!
//! Pixels are converted to CIE L\*a\*b\* (D65) so that Euclidean
//! distance tracks perceived color difference, grouped with k-means,
//! and every cluster label becomes a binary mask whose external
//! contours are candidate regions.
//!
//! Initialization is k-means++ driven by a generator seeded from a
//! fixed constant, so the same image always clusters the same way.

use image::{GrayImage, RgbImage};
use palette::{FromColor, Lab, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::contour;
use crate::types::{Polygon, RegionLimits};

/// Seed for k-means++ initialization.
const SEED: u64 = 0x7265_6769_6f6e_697a;

/// Generator every k-means run in this crate starts from.
pub(crate) fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(SEED)
}

/// Parameters of the k-means run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    /// Number of clusters requested.
    pub clusters: usize,
    /// Independent initializations; the most compact one wins.
    pub attempts: usize,
    /// Upper bound on Lloyd iterations per attempt.
    pub max_iterations: usize,
    /// Stop early once no centroid moves further than this.
    pub epsilon: f32,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            clusters: 12,
            attempts: 3,
            max_iterations: 10,
            epsilon: 1.0,
        }
    }
}

/// Outcome of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Final centroids. May be fewer than requested when the input has
    /// fewer distinct colors than clusters.
    pub centers: Vec<[f32; 3]>,
    /// Index into `centers` for every sample.
    pub labels: Vec<usize>,
    /// Sum of squared distances from each sample to its centroid.
    pub compactness: f64,
}

impl Clustering {
    /// Number of samples carrying each label.
    #[must_use]
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centers.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }

    /// Number of clusters that own at least one sample.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.sizes().into_iter().filter(|&n| n > 0).count()
    }
}

/// Convert every pixel to L\*a\*b\*, row-major.
#[must_use]
pub fn to_lab(image: &RgbImage) -> Vec<[f32; 3]> {
    image
        .pixels()
        .map(|p| {
            let srgb = Srgb::new(p.0[0], p.0[1], p.0[2]).into_format::<f32>();
            let lab = Lab::from_color(srgb.into_linear());
            [lab.l, lab.a, lab.b]
        })
        .collect()
}

/// Cluster `samples` with k-means.
///
/// Returns `None` when there is nothing to cluster.
#[must_use]
pub fn kmeans<R: Rng>(
    samples: &[[f32; 3]],
    params: &KMeansParams,
    rng: &mut R,
) -> Option<Clustering> {
    let k = params.clusters.min(samples.len());
    if k == 0 {
        return None;
    }

    let mut best: Option<Clustering> = None;
    for attempt in 0..params.attempts.max(1) {
        let result = run_attempt(samples, k, params, rng);
        log::trace!(
            "k-means attempt {attempt}: {} centers, compactness {:.1}",
            result.centers.len(),
            result.compactness,
        );
        if best
            .as_ref()
            .is_none_or(|b| result.compactness < b.compactness)
        {
            best = Some(result);
        }
    }
    best
}

/// Segment an image into regions by color.
///
/// A clustering that leaves fewer than two occupied clusters cannot
/// separate anything and yields no regions.
#[must_use]
pub fn segment(image: &RgbImage, limits: &RegionLimits) -> Vec<Polygon> {
    let samples = to_lab(image);
    let mut rng = seeded_rng();
    let Some(clustering) = kmeans(&samples, &KMeansParams::default(), &mut rng) else {
        return Vec::new();
    };

    let occupied = clustering.occupied();
    if occupied < 2 {
        log::debug!("color clustering degenerate ({occupied} occupied clusters)");
        return Vec::new();
    }

    let (w, h) = image.dimensions();
    let contours: Vec<_> = (0..clustering.centers.len())
        .filter_map(|label| label_mask(&clustering.labels, label, w, h))
        .flat_map(|mask| contour::trace_external(&mask))
        .collect();
    contour::to_regions(&contours, limits)
}

/// Binary mask of the pixels carrying `label`.
fn label_mask(labels: &[usize], label: usize, width: u32, height: u32) -> Option<GrayImage> {
    let raw = labels
        .iter()
        .map(|&l| if l == label { 255 } else { 0 })
        .collect();
    GrayImage::from_raw(width, height, raw)
}

fn run_attempt<R: Rng>(
    samples: &[[f32; 3]],
    k: usize,
    params: &KMeansParams,
    rng: &mut R,
) -> Clustering {
    let mut centers = init_plus_plus(samples, k, rng);
    let mut labels = vec![0; samples.len()];
    let mut compactness = assign(samples, &centers, &mut labels);

    for _ in 0..params.max_iterations {
        let shift = update(samples, &labels, &mut centers);
        compactness = assign(samples, &centers, &mut labels);
        if shift <= params.epsilon {
            break;
        }
    }

    Clustering {
        centers,
        labels,
        compactness,
    }
}

/// k-means++ seeding: each further center is drawn with probability
/// proportional to its squared distance from the nearest chosen center.
///
/// Stops early once every sample coincides with a chosen center.
fn init_plus_plus<R: Rng>(samples: &[[f32; 3]], k: usize, rng: &mut R) -> Vec<[f32; 3]> {
    let first = samples[rng.random_range(0..samples.len())];
    let mut centers = Vec::with_capacity(k);
    centers.push(first);
    let mut nearest: Vec<f64> = samples
        .iter()
        .map(|s| f64::from(distance_sq(s, &first)))
        .collect();

    while centers.len() < k {
        let total: f64 = nearest.iter().sum();
        if total <= 0.0 {
            break;
        }

        let mut target = rng.random::<f64>() * total;
        let mut chosen = None;
        for (i, &d) in nearest.iter().enumerate() {
            if d <= 0.0 {
                continue;
            }
            chosen = Some(i);
            if target < d {
                break;
            }
            target -= d;
        }
        let Some(chosen) = chosen else { break };

        let center = samples[chosen];
        centers.push(center);
        for (d, s) in nearest.iter_mut().zip(samples) {
            *d = d.min(f64::from(distance_sq(s, &center)));
        }
    }
    centers
}

/// Label every sample with its nearest center; returns compactness.
fn assign(samples: &[[f32; 3]], centers: &[[f32; 3]], labels: &mut [usize]) -> f64 {
    let mut total = 0.0;
    for (label, s) in labels.iter_mut().zip(samples) {
        let (best, d) = nearest_center(s, centers);
        *label = best;
        total += f64::from(d);
    }
    total
}

/// Move each center to the mean of its samples; returns the largest
/// distance any center moved.
///
/// A center that lost all its samples is moved onto the sample lying
/// farthest from its own (updated) center, and that sample is not
/// offered to another empty cluster in the same pass. When every sample
/// already sits on its center, empty clusters are left where they are.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn update(samples: &[[f32; 3]], labels: &[usize], centers: &mut [[f32; 3]]) -> f32 {
    let mut sums = vec![[0.0f64; 3]; centers.len()];
    let mut counts = vec![0usize; centers.len()];
    for (s, &label) in samples.iter().zip(labels) {
        for c in 0..3 {
            sums[label][c] += f64::from(s[c]);
        }
        counts[label] += 1;
    }

    let mut max_shift = 0.0f32;
    for ((center, sum), &count) in centers.iter_mut().zip(&sums).zip(&counts) {
        if count == 0 {
            continue;
        }
        let n = count as f64;
        let moved = [
            (sum[0] / n) as f32,
            (sum[1] / n) as f32,
            (sum[2] / n) as f32,
        ];
        max_shift = max_shift.max(distance_sq(center, &moved).sqrt());
        *center = moved;
    }

    let mut taken = vec![false; samples.len()];
    for empty in (0..centers.len()).filter(|&i| counts[i] == 0) {
        let Some(far) = farthest_sample(samples, labels, centers, &taken) else {
            break;
        };
        taken[far] = true;
        let reseeded = samples[far];
        log::trace!("re-seeding empty cluster {empty} from sample {far}");
        max_shift = max_shift.max(distance_sq(&centers[empty], &reseeded).sqrt());
        centers[empty] = reseeded;
    }
    max_shift
}

/// Sample farthest from the center of its own cluster, skipping `taken`
/// samples. `None` when no remaining sample is away from its center.
fn farthest_sample(
    samples: &[[f32; 3]],
    labels: &[usize],
    centers: &[[f32; 3]],
    taken: &[bool],
) -> Option<usize> {
    samples
        .iter()
        .zip(labels)
        .enumerate()
        .filter(|&(i, _)| !taken[i])
        .map(|(i, (s, &label))| (i, distance_sq(s, &centers[label])))
        .filter(|&(_, d)| d > 0.0)
        .fold(None, |best: Option<(usize, f32)>, (i, d)| match best {
            Some((_, best_d)) if best_d >= d => best,
            _ => Some((i, d)),
        })
        .map(|(i, _)| i)
}

/// Index of and squared distance to the nearest center; ties go to the
/// lower index.
fn nearest_center(sample: &[f32; 3], centers: &[[f32; 3]]) -> (usize, f32) {
    centers
        .iter()
        .enumerate()
        .fold((0, f32::INFINITY), |(best, best_d), (i, c)| {
            let d = distance_sq(sample, c);
            if d < best_d { (i, d) } else { (best, best_d) }
        })
}

fn distance_sq(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let d0 = a[0] - b[0];
    let d1 = a[1] - b[1];
    let d2 = a[2] - b[2];
    d2.mul_add(d2, d0.mul_add(d0, d1 * d1))
}
