use serde::{Deserialize, Serialize};

/// Name used when an OSM feature carries no `name` tag
pub const UNNAMED: &str = "N/A";

/// A WGS84 position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A point of interest with its (optional) elevation in meters
///
/// Serialized as `{"name", "lat", "lon", "elevation"}`, with `elevation`
/// written as `null` until the elevation service has filled it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl PointRecord {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            elevation: None,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }

    /// True only when the elevation is known and strictly above `limit`
    pub fn is_above(&self, limit: f64) -> bool {
        self.elevation.is_some_and(|e| e > limit)
    }
}
