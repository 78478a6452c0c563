//! regionize: print the salient regions of an image as JSON polygons.
//!
//! Reads an image file, runs region detection, and writes
//! `{"regions": [[[x, y], ...], ...], "width": W, "height": H}` to
//! stdout. Any failure is reported as `{"error": "..."}` on stderr with
//! a non-zero exit status, so stdout only ever carries a valid result.
//!
//! With `--palette`, the object also carries a `"palette"` array of up
//! to five `"#rrggbb"` dominant colors.
//!
//! Log output (`RUST_LOG=debug`) also goes to stderr.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin regionize -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use regionize_pipeline::{DetectConfig, Regions, Swatch, swatch};

/// Detect large, visually coherent regions in an image.
///
/// Tries threshold, edge, and color-clustering strategies in turn and
/// prints the best region set as simplified polygons.
#[derive(Parser)]
#[command(name = "regionize", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Minimum region area as a fraction of the image area.
    #[arg(long, default_value_t = DetectConfig::DEFAULT_MIN_AREA_RATIO)]
    min_area: f64,

    /// Maximum number of regions to return.
    #[arg(long, default_value_t = DetectConfig::DEFAULT_MAX_REGIONS)]
    max_regions: usize,

    /// Full detection config as a JSON string.
    ///
    /// When provided, `--min-area` and `--max-regions` are ignored.
    /// Missing fields take their defaults.
    #[arg(long)]
    config_json: Option<String>,

    /// Print a per-strategy diagnostics report to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// Also extract dominant color swatches into a `"palette"` field.
    #[arg(long)]
    palette: bool,

    /// Number of k-means clusters for `--palette` (clamped to 2..=20).
    #[arg(long, default_value_t = swatch::DEFAULT_CLUSTERS)]
    palette_clusters: usize,
}

/// Build a [`DetectConfig`] from CLI arguments.
fn config_from_cli(cli: &Cli) -> Result<DetectConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("invalid --config-json: {e}"));
    }

    Ok(DetectConfig {
        min_area_ratio: cli.min_area,
        max_regions: cli.max_regions,
    })
}

/// Read, detect, and serialize. Errors are already user-facing messages.
fn run(cli: &Cli) -> Result<String, String> {
    let config = config_from_cli(cli)?;
    log::debug!("config: {config:?}");

    let image_bytes = std::fs::read(&cli.image_path)
        .map_err(|e| format!("could not read image: {}: {e}", cli.image_path.display()))?;
    log::debug!(
        "read {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );

    let (regions, diagnostics) =
        regionize_pipeline::diagnostics::process_with_diagnostics(&image_bytes, &config)
            .map_err(|e| e.to_string())?;
    if cli.diagnostics {
        eprintln!("{}", diagnostics.report());
    }

    let palette = if cli.palette {
        let swatches = swatch::process_swatches(&image_bytes, cli.palette_clusters)
            .map_err(|e| e.to_string())?;
        log::debug!("palette: {} swatches", swatches.len());
        Some(swatches)
    } else {
        None
    };

    render(&regions, palette.as_deref())
}

/// Serialize the result object, adding `"palette"` when requested.
fn render(regions: &Regions, palette: Option<&[Swatch]>) -> Result<String, String> {
    let mut value =
        serde_json::to_value(regions).map_err(|e| format!("could not serialize result: {e}"))?;
    if let (Some(swatches), Some(object)) = (palette, value.as_object_mut()) {
        let swatches = serde_json::to_value(swatches)
            .map_err(|e| format!("could not serialize palette: {e}"))?;
        object.insert("palette".to_owned(), swatches);
    }
    Ok(value.to_string())
}

/// The `{"error": ...}` object printed on failure.
fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(msg) => {
            log::debug!("detection failed: {msg}");
            eprintln!("{}", error_json(&msg));
            ExitCode::FAILURE
        }
    }
}
