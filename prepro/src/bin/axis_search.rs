//! Rotation-axis search on simulated projections
//!
//! Builds a bubble phantom, projects it with a known rotation-axis offset,
//! optionally adds counting noise and removes air, then searches for the
//! axis offset with the mock reconstruction oracle.
//!
//! Usage:
//! ```
//! cargo run --bin axis_search -- [OPTIONS]
//! ```
//!
//! See --help for detailed options.

use clap::Parser;
use ndarray::Array3;
use prepro::correction::subtract_air;
use prepro::{optimize_rotation_center, PreprocessConfig};
use shared::algo::bin_axis;
use shared::{Geometry, GeometryParameter, MockReconstructor};
use simulator::{apply_noise_stack, parallel_project, phantom, NoiseModel, Phantom};
use std::path::PathBuf;

/// Command line arguments for the axis search
#[derive(Parser, Debug)]
#[command(
    name = "Axis Search",
    about = "Estimates the rotation-axis offset of a simulated scan",
    long_about = None
)]
struct Args {
    /// Geometry JSON file (defaults to a 0.2 mm detector at magnification 2)
    #[arg(long)]
    geometry: Option<PathBuf>,

    /// Preprocessing settings JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Phantom edge length in voxels
    #[arg(long, default_value_t = 64)]
    size: usize,

    /// Number of projection angles over 360 degrees
    #[arg(long, default_value_t = 90)]
    angles: usize,

    /// Rotation-axis offset injected into the simulation, in mm
    #[arg(long, default_value_t = 0.5)]
    axis_offset: f64,

    /// Initial horizontal subscale (power of two)
    #[arg(long, default_value_t = 8)]
    subscale: usize,

    /// Starting guess in mm (derived from the data when omitted)
    #[arg(long)]
    guess: Option<f64>,

    /// Start from the geometry's axis offset instead of the centre of mass
    #[arg(long, default_value_t = false)]
    no_centre_of_mass: bool,

    /// Poisson noise scale (counts per unit intensity); no noise when omitted
    #[arg(long)]
    noise: Option<f64>,

    /// Subtract the air intensity estimated from the projection borders
    #[arg(long, default_value_t = false)]
    subtract_air: bool,

    /// Bin projections 2x2 before the search
    #[arg(long, default_value_t = false)]
    bin: bool,

    /// Random seed for the noise
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PreprocessConfig::load_from_file(path)?,
        None => PreprocessConfig::default(),
    };
    let thetas: Vec<f64> = (0..args.angles)
        .map(|i| i as f64 * 360.0 / args.angles as f64)
        .collect();
    let mut geometry = match &args.geometry {
        Some(path) => Geometry::load_from_file(path)?,
        None => Geometry::new(0.2, 100.0, 100.0)?,
    }
    .with_thetas(thetas.clone());

    let size = args.size;
    let volume = phantom(
        (size, size, size),
        Phantom::Bubble {
            outer_radius: size as f64 / 4.0,
            wall: (size as f64 / 16.0).max(1.0),
        },
    )?;

    let offset_px = args.axis_offset / geometry.pixel_footprint();
    println!(
        "Simulating {} projections with the axis {:.3} mm ({offset_px:.2} px) off centre",
        args.angles, args.axis_offset
    );
    let mut projections = parallel_project(&volume.view(), &thetas, offset_px)?;

    if let Some(scale) = args.noise {
        let counts = apply_noise_stack(projections, NoiseModel::Poisson { scale }, args.seed)?;
        projections = counts / scale as f32;
    }
    if args.subtract_air {
        let air = subtract_air(&mut projections, None, &config.air)?;
        println!("Subtracted air intensity {air:.4}");
    }
    if args.bin {
        projections = bin2(&projections)?;
        let pixel = geometry.det_pixel() * 2.0;
        geometry.set_parameter(GeometryParameter::DetectorPixel, pixel)?;
        println!("Binned projections to {:?}", projections.dim());
    }

    println!(
        "Initial search window: +/- {:.3} mm",
        geometry.pixels_to_mm(args.subscale as f64)
    );

    let oracle = MockReconstructor::new(volume, args.axis_offset);
    let axis = optimize_rotation_center(
        &oracle,
        &projections.view(),
        &geometry,
        args.guess,
        args.subscale,
        !args.no_centre_of_mass,
        &config.rotation,
    )?;

    println!(
        "Rotation axis offset: {axis:.4} mm (error {:+.4} mm, {} reconstructions)",
        axis - args.axis_offset,
        oracle.calls()
    );
    Ok(())
}

/// Bin detector rows and columns by two.
fn bin2(projections: &Array3<f32>) -> Result<Array3<f32>, Box<dyn std::error::Error>> {
    let rows = bin_axis(&projections.view(), 0)?;
    Ok(bin_axis(&rows.view(), 2)?)
}
