use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::api::{enrich, fetch_points};
use crate::config::Config;
use crate::domain::PointRecord;
use crate::output::{to_pretty_json, write_json};

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Records written to the output file
    pub total: usize,
    /// Records strictly above the fog limit
    pub above_limit: usize,
    pub output: PathBuf,
}

/// Records whose elevation is known and strictly above `limit`, in order
///
/// Records without an elevation never pass.
pub fn filter_above(records: &[PointRecord], limit: f64) -> Vec<PointRecord> {
    records
        .iter()
        .filter(|r| r.is_above(limit))
        .cloned()
        .collect()
}

/// Query points and enrich them with elevations, in fetch order
pub fn gather(config: &Config) -> Vec<PointRecord> {
    let points = fetch_points(
        &config.overpass_url,
        config.center,
        config.radius_m,
        &config.amenity,
        config.overpass_timeout_secs,
        config.verbose,
    );

    enrich(&config.elevation_url, points, config.elevation_timeout_secs)
}

/// Print the records above `limit` and return them
pub fn report(merged: &[PointRecord], limit: f64) -> Result<Vec<PointRecord>> {
    let above = filter_above(merged, limit);

    println!();
    println!("--- Final Results ---");
    println!("{}", to_pretty_json(&above)?);
    println!("{} of {} records above {}m", above.len(), merged.len(), limit);

    Ok(above)
}

/// Gather, report and persist the full merged list to `config.output`
///
/// Service failures only degrade the data; the only fatal errors are
/// serialization and writing the output file.
pub fn run(config: &Config) -> Result<RunSummary> {
    run_with(config, |path, records| write_json(path, records))
}

/// Same as [`run`], with `persist` doing the write to the output path
pub fn run_with<F>(config: &Config, persist: F) -> Result<RunSummary>
where
    F: FnOnce(&Path, &[PointRecord]) -> Result<()>,
{
    let merged = gather(config);
    let above = report(&merged, config.fog_limit_m)?;

    persist(&config.output, &merged).context("Failed to write results")?;
    println!();
    println!("Data saved to {}", config.output.display());

    Ok(RunSummary {
        total: merged.len(),
        above_limit: above.len(),
        output: config.output.clone(),
    })
}
