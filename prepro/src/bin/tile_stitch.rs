//! Tile stitching on simulated projections
//!
//! Projects a phantom onto a wide virtual detector, cuts the projections
//! into overlapping tiles (optionally misplaced by a known subpixel shift),
//! and stitches them back into one stack. Reports how closely the stitched
//! stack matches the simulated field.
//!
//! Usage:
//! ```
//! cargo run --bin tile_stitch -- [OPTIONS]
//! ```

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{Array3, Zip};
use prepro::correction::{apply_edge_ramp, remove_residual_rings, translate};
use prepro::{append_tile, PreprocessConfig};
use shared::algo::crop_axis;
use shared::{Geometry, GeometryParameter};
use simulator::{parallel_project, phantom, Phantom};
use std::path::PathBuf;

/// Command line arguments for tile stitching
#[derive(Parser, Debug)]
#[command(
    name = "Tile Stitch",
    about = "Stitches simulated detector tiles into a single projection stack",
    long_about = None
)]
struct Args {
    /// Number of tiles across the field
    #[arg(long, default_value_t = 3)]
    tiles: usize,

    /// Tile width in detector columns
    #[arg(long, default_value_t = 96)]
    tile_width: usize,

    /// Overlap between neighbouring tiles in columns
    #[arg(long, default_value_t = 32)]
    overlap: usize,

    /// Detector rows
    #[arg(long, default_value_t = 48)]
    rows: usize,

    /// Number of projection angles over 360 degrees
    #[arg(long, default_value_t = 201)]
    angles: usize,

    /// Detector pixel pitch in mm
    #[arg(long, default_value_t = 0.1)]
    pixel: f64,

    /// Horizontal misplacement of every tile after the first, in pixels
    #[arg(long, default_value_t = 0.0)]
    jitter: f64,

    /// Fade tile edges over this many columns before stitching
    #[arg(long, default_value_t = 0)]
    ramp: usize,

    /// Remove residual rings from the stitched stack
    #[arg(long, default_value_t = false)]
    remove_rings: bool,

    /// Preprocessing settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the stitched stack's geometry to this JSON file
    #[arg(long)]
    output_geometry: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    if args.tiles == 0 || args.overlap >= args.tile_width {
        return Err("need at least one tile and an overlap smaller than the tile width".into());
    }
    let config = match &args.config {
        Some(path) => PreprocessConfig::load_from_file(path)?,
        None => PreprocessConfig::default(),
    };

    let step = args.tile_width - args.overlap;
    let total_cols = step * (args.tiles - 1) + args.tile_width;
    let thetas: Vec<f64> = (0..args.angles)
        .map(|i| i as f64 * 360.0 / args.angles as f64)
        .collect();

    let volume = phantom(
        (args.rows, total_cols, total_cols),
        Phantom::Bubble {
            outer_radius: total_cols as f64 / 3.0,
            wall: total_cols as f64 / 12.0,
        },
    )?;
    let field = parallel_project(&volume.view(), &thetas, 0.0)?;
    println!("Simulated field of {:?} (rows, angles, columns)", field.dim());

    let total_geometry = Geometry::new(args.pixel, 500.0, 100.0)?.with_thetas(thetas);
    let mut total = Array3::<f32>::zeros(field.raw_dim());

    let progress = ProgressBar::new(args.tiles as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    progress.set_message("Stitching tiles");

    for index in 0..args.tiles {
        let start = index * step;
        let mut tile = crop_axis(
            &field.view(),
            2,
            start,
            total_cols - start - args.tile_width,
        )?;
        if index > 0 && args.jitter != 0.0 {
            translate(&mut tile, (0.0, args.jitter), 1)?;
        }
        if args.ramp > 0 {
            tile = apply_edge_ramp(tile, (0, args.ramp), false)?;
        }

        // detector centre of this tile relative to the field centre
        let det_hrz = (start as f64 + args.tile_width as f64 / 2.0 - total_cols as f64 / 2.0)
            * args.pixel;
        let geometry = total_geometry
            .with_parameter(GeometryParameter::DetectorHorizontal, det_hrz)?;

        append_tile(&tile.view(), &geometry, &mut total, &total_geometry, &config.shift)?;
        progress.inc(1);
    }
    progress.finish_with_message("Tiles stitched");

    if args.remove_rings {
        remove_residual_rings(&mut total, (3, 3));
    }

    let mut max_error = 0.0f32;
    Zip::from(&total)
        .and(&field)
        .for_each(|&a, &b| max_error = max_error.max((a - b).abs()));
    let peak = field.iter().copied().fold(0.0f32, f32::max);
    println!(
        "Maximum deviation from the simulated field: {max_error:.4} ({:.2}% of peak)",
        100.0 * max_error / peak.max(f32::EPSILON)
    );

    if let Some(path) = &args.output_geometry {
        total_geometry.save_to_file(path)?;
        println!("Wrote stitched geometry to {}", path.display());
    }
    Ok(())
}
