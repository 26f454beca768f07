use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

use nebbia::config::{Config, FileConfig};
use nebbia::domain::Coordinates;
use nebbia::output::write_json;
use nebbia::pipeline::run_with;

/// Find restaurants above the fog line
///
/// Queries OpenStreetMap for amenities around a center point, looks up
/// their elevation, prints those above the fog limit and saves everything
/// to a JSON file. With no arguments, searches 45km around Zürich.
///
/// Examples:
///   # Default run: restaurants within 45km of Zürich above 400m
///   nebbia
///
///   # Cafes around Bern above 600m
///   nebbia --lat 46.948 --lon 7.4474 -r 20000 --amenity cafe --fog-limit 600 -o bern.json
///
///   # Use a config file
///   nebbia --config my-settings.toml
#[derive(Parser, Debug)]
#[command(name = "nebbia")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches nebbia.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Center latitude (use with --lon)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Center longitude (use with --lat)
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Search radius in meters
    #[arg(short = 'r', long)]
    radius: Option<u32>,

    /// Value of the OSM amenity tag to search for
    #[arg(long)]
    amenity: Option<String>,

    /// Elevation in meters a record must exceed to be reported
    #[arg(long)]
    fog_limit: Option<f64>,

    /// Output JSON file path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.center = Coordinates::new(lat, lon);
        }
        if let Some(radius) = self.radius {
            config.radius_m = radius;
        }
        if let Some(ref amenity) = self.amenity {
            config.amenity = amenity.clone();
        }
        if let Some(fog_limit) = self.fog_limit {
            config.fog_limit_m = fog_limit;
        }
        if let Some(ref output) = self.output {
            config.output = output.clone();
        }
        if self.verbose {
            config.verbose = true;
        }
    }
}

/// Built-in defaults, then the config file, then command-line flags
fn resolve_config(args: &Args, file_config: Option<&FileConfig>) -> Config {
    let mut config = Config::default();
    if let Some(file) = file_config {
        file.apply(&mut config);
    }
    args.apply(&mut config);
    config
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = match args.config {
        Some(ref path) => Some(FileConfig::from_path(path)?),
        None => FileConfig::load(),
    };
    let config = resolve_config(&args, file_config.as_ref());

    println!("nebbia - Restaurants above the fog");
    println!("==================================");
    println!();

    if config.verbose {
        println!("Configuration:");
        println!(
            "  Center: ({:.4}, {:.4})",
            config.center.lat, config.center.lon
        );
        println!("  Radius: {}m", config.radius_m);
        println!("  Amenity: {}", config.amenity);
        println!("  Fog limit: {}m", config.fog_limit_m);
        println!("  Overpass: {}", config.overpass_url);
        println!("  Elevation: {}", config.elevation_url);
        println!("  Output: {}", config.output.display());
        println!();
    }

    let summary = run_with(&config, |path, records| {
        let spinner = create_spinner("Writing results...");
        let start = Instant::now();
        write_json(path, records)?;
        spinner.finish_with_message(format!(
            "Wrote {} records [{:.1}s]",
            records.len(),
            start.elapsed().as_secs_f32()
        ));
        Ok(())
    })?;

    println!(
        "Done! {} records ({} above {}m) [{:.1}s]",
        summary.total,
        summary.above_limit,
        config.fog_limit_m,
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
