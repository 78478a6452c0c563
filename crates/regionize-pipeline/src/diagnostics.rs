//! Detection diagnostics: which strategies ran, what each found, and
//! how long it took.
//!
//! Every call to [`detect_with_diagnostics`] or
//! [`process_with_diagnostics`] records one [`StrategyAttempt`] per
//! strategy the orchestrator actually ran, in order, together with the
//! strategy whose regions were kept.
//!
//! Timestamps are captured via the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::grayscale;
use crate::pipeline::Orchestrator;
use crate::strategy::StrategyKind;
use crate::types::{DetectConfig, Dimensions, PipelineError, Regions};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom("duration seconds must be finite and non-negative")
        })
    }
}

/// One strategy run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    /// Which strategy ran.
    pub strategy: StrategyKind,
    /// Regions it produced after filtering and truncation.
    pub region_count: usize,
    /// Wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Diagnostics collected from a single detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectDiagnostics {
    /// Strategies in the order they ran. Skipped strategies are absent.
    pub attempts: Vec<StrategyAttempt>,
    /// Strategy whose regions were returned.
    pub selected: StrategyKind,
    /// Total wall-clock duration, including decoding and shared
    /// preprocessing (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary of inputs and output.
    pub summary: DetectSummary,
}

/// High-level summary for one detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Minimum region area in square pixels.
    pub min_area: f64,
    /// Region cap.
    pub max_regions: usize,
    /// Regions returned.
    pub region_count: usize,
    /// Polygon vertices across all returned regions.
    pub vertex_count: usize,
}

impl DetectDiagnostics {
    /// Whether `kind` ran during this detection.
    #[must_use]
    pub fn ran(&self, kind: StrategyKind) -> bool {
        self.attempts.iter().any(|a| a.strategy == kind)
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Region Detection Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Min area: {:.1}px  |  Max regions: {}",
            self.summary.min_area, self.summary.max_regions,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10} {:>8}",
            "Strategy", "Duration", "% Total", "Regions"
        ));
        lines.push("-".repeat(60));

        let total_ms = duration_ms(self.total_duration);
        for attempt in &self.attempts {
            let ms = duration_ms(attempt.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let marker = if attempt.strategy == self.selected {
                " *"
            } else {
                ""
            };
            lines.push(format!(
                "{:<24} {ms:>8.3}ms {pct:>9.1}% {:>8}{marker}",
                attempt.strategy.name(),
                attempt.region_count,
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Selected: {}  |  Regions: {}  |  Vertices: {}",
            self.selected.name(),
            self.summary.region_count,
            self.summary.vertex_count,
        ));

        lines.join("\n")
    }
}

/// Detect regions in an already-decoded image, collecting diagnostics.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation.
pub fn detect_with_diagnostics(
    image: &RgbImage,
    config: &DetectConfig,
) -> Result<(Regions, DetectDiagnostics), PipelineError> {
    config.validate()?;
    Ok(run(image, config, Instant::now()))
}

/// Decode and detect, collecting diagnostics.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// validation, and [`PipelineError::EmptyInput`] or
/// [`PipelineError::ImageDecode`] if the bytes are not a readable image.
pub fn process_with_diagnostics(
    image_bytes: &[u8],
    config: &DetectConfig,
) -> Result<(Regions, DetectDiagnostics), PipelineError> {
    config.validate()?;
    let start = Instant::now();
    let image = grayscale::decode(image_bytes)?;
    Ok(run(&image, config, start))
}

/// Run the orchestrator on a validated config.
pub(crate) fn run(
    image: &RgbImage,
    config: &DetectConfig,
    start: Instant,
) -> (Regions, DetectDiagnostics) {
    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    let limits = config.limits(dimensions);
    let outcome = Orchestrator::new(image, limits).run();

    let summary = DetectSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        pixel_count: dimensions.pixel_count(),
        min_area: limits.min_area,
        max_regions: limits.max_regions,
        region_count: outcome.regions.len(),
        vertex_count: outcome.regions.iter().map(crate::Polygon::len).sum(),
    };
    let diagnostics = DetectDiagnostics {
        attempts: outcome.attempts,
        selected: outcome.selected,
        total_duration: start.elapsed(),
        summary,
    };
    let regions = Regions {
        regions: outcome.regions,
        dimensions,
    };
    (regions, diagnostics)
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
