use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::Coordinates;

/// Built-in run parameters: restaurants within 45km of Zürich, fog at 400m
pub mod defaults {
    pub const CENTER_LAT: f64 = 47.3769;
    pub const CENTER_LON: f64 = 8.5417;
    pub const RADIUS_M: u32 = 45_000;
    pub const AMENITY: &str = "restaurant";
    pub const FOG_LIMIT_M: f64 = 400.0;
    pub const OUTPUT: &str = "zurich_restaurants_with_elevation.json";
    pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
    pub const ELEVATION_URL: &str = "https://api.open-elevation.com/api/v1/lookup";
    pub const OVERPASS_TIMEOUT_SECS: u64 = 60;
    pub const ELEVATION_TIMEOUT_SECS: u64 = 30;
}

/// Everything a pipeline run needs
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub center: Coordinates,
    pub radius_m: u32,
    pub amenity: String,
    /// Records strictly above this elevation (meters) are reported
    pub fog_limit_m: f64,
    pub output: PathBuf,
    pub overpass_url: String,
    pub elevation_url: String,
    /// Server-side `[timeout:N]` hint in the Overpass query
    pub overpass_timeout_secs: u64,
    /// Client-side timeout for the elevation lookup
    pub elevation_timeout_secs: u64,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center: Coordinates::new(defaults::CENTER_LAT, defaults::CENTER_LON),
            radius_m: defaults::RADIUS_M,
            amenity: defaults::AMENITY.to_string(),
            fog_limit_m: defaults::FOG_LIMIT_M,
            output: PathBuf::from(defaults::OUTPUT),
            overpass_url: defaults::OVERPASS_URL.to_string(),
            elevation_url: defaults::ELEVATION_URL.to_string(),
            overpass_timeout_secs: defaults::OVERPASS_TIMEOUT_SECS,
            elevation_timeout_secs: defaults::ELEVATION_TIMEOUT_SECS,
            verbose: false,
        }
    }
}

/// Optional settings read from a TOML file
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub radius: Option<u32>,
    #[serde(default)]
    pub amenity: Option<String>,
    #[serde(default)]
    pub fog_limit: Option<f64>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub verbose: Option<bool>,
    #[serde(default)]
    pub overpass: Option<EndpointConfig>,
    #[serde(default)]
    pub elevation: Option<EndpointConfig>,
}

/// `[overpass]` / `[elevation]` tables
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct EndpointConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load the first parseable config file from the standard locations
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly requested config file; missing or invalid is an error
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {:?}", path);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Layer these settings over `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(lat) = self.lat {
            config.center.lat = lat;
        }
        if let Some(lon) = self.lon {
            config.center.lon = lon;
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
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
        if let Some(ref overpass) = self.overpass {
            if let Some(ref url) = overpass.url {
                config.overpass_url = url.clone();
            }
            if let Some(timeout) = overpass.timeout_secs {
                config.overpass_timeout_secs = timeout;
            }
        }
        if let Some(ref elevation) = self.elevation {
            if let Some(ref url) = elevation.url {
                config.elevation_url = url.clone();
            }
            if let Some(timeout) = elevation.timeout_secs {
                config.elevation_timeout_secs = timeout;
            }
        }
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("nebbia.toml"));
    paths.push(PathBuf::from(".nebbia.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("nebbia").join("config.toml"));
        paths.push(config_dir.join("nebbia.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".nebbia.toml"));
    }

    paths
}
