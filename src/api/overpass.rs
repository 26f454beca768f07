use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{ServiceError, USER_AGENT};
use crate::domain::{Coordinates, PointRecord};
use crate::osm::parse_points;

const SERVICE: &str = "Overpass API";

/// Raw Overpass API response
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    pub elements: Vec<Element>,
}

/// A single element from Overpass (node, way or relation)
///
/// Nodes carry `lat`/`lon` directly. Ways and relations only carry a
/// `center` when the query ends in `out center`.
#[derive(Debug, Deserialize)]
pub struct Element {
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub center: Option<Center>,
}

/// Representative point Overpass computes for ways and relations
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

/// Build the Overpass QL query for every node, way and relation tagged
/// `amenity=<amenity>` within `radius_m` of `center`
pub fn build_query(center: Coordinates, radius_m: u32, amenity: &str, timeout_secs: u64) -> String {
    let around = format!("around:{},{},{}", radius_m, center.lat, center.lon);
    let amenity = escape_ql_string(amenity);
    format!(
        r#"[out:json][timeout:{timeout}];
node({around})["amenity"="{amenity}"]->.nodes;
way({around})["amenity"="{amenity}"]->.ways;
relation({around})["amenity"="{amenity}"]->.relations;
(.nodes; .ways; .relations;);
out center;"#,
        timeout = timeout_secs,
        around = around,
        amenity = amenity
    )
}

/// Escape a value for use inside a double-quoted Overpass QL string
fn escape_ql_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fetch points of interest from the Overpass API
///
/// Any failure (transport, non-success status, unexpected body) is printed
/// and yields an empty list; there is no retry.
///
/// # Arguments
/// * `url` - Overpass interpreter endpoint
/// * `center` - Center of the search circle
/// * `radius_m` - Radius in meters
/// * `amenity` - Value matched against the `amenity` tag
/// * `timeout_secs` - Server-side timeout hint embedded in the query
/// * `verbose` - Print every raw element as it is normalized
pub fn fetch_points(
    url: &str,
    center: Coordinates,
    radius_m: u32,
    amenity: &str,
    timeout_secs: u64,
    verbose: bool,
) -> Vec<PointRecord> {
    println!(
        "-> Querying OpenStreetMap for amenity={} within {:.1}km of ({:.4}, {:.4})...",
        amenity,
        radius_m as f64 / 1000.0,
        center.lat,
        center.lon
    );

    let query = build_query(center, radius_m, amenity, timeout_secs);
    let response = match execute_overpass_query(url, &query) {
        Ok(response) => response,
        Err(e) => {
            println!("Error querying Overpass API: {}", e);
            return Vec::new();
        }
    };

    if verbose {
        for element in &response.elements {
            println!("  {:?}", element);
        }
    }

    let points = parse_points(&response);
    println!(
        "-> Found {} {} features ({} elements skipped without coordinates).",
        points.len(),
        amenity,
        response.elements.len() - points.len()
    );
    points
}

fn execute_overpass_query(url: &str, query: &str) -> Result<OverpassResponse, ServiceError> {
    // No client-side timeout: the query carries its own [timeout:N] hint
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(None::<Duration>)
        .build()
        .map_err(ServiceError::Client)?;

    // Overpass expects form-encoded POST data: data=<query>
    let response = client
        .post(url)
        .form(&[("data", query)])
        .send()
        .map_err(|source| ServiceError::Transport {
            service: SERVICE,
            source,
        })?;

    if !response.status().is_success() {
        return Err(ServiceError::Status {
            service: SERVICE,
            status: response.status(),
        });
    }

    response.json().map_err(|source| ServiceError::Decode {
        service: SERVICE,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query() {
        let query = build_query(Coordinates::new(47.3769, 8.5417), 45000, "restaurant", 60);

        assert!(query.starts_with("[out:json][timeout:60];"));
        assert!(query.contains(r#"node(around:45000,47.3769,8.5417)["amenity"="restaurant"]->.nodes;"#));
        assert!(query.contains(r#"way(around:45000,47.3769,8.5417)["amenity"="restaurant"]->.ways;"#));
        assert!(query.contains(
            r#"relation(around:45000,47.3769,8.5417)["amenity"="restaurant"]->.relations;"#
        ));
        assert!(query.ends_with("out center;"));
    }

    #[test]
    fn test_build_query_escapes_amenity() {
        let query = build_query(Coordinates::new(47.0, 8.0), 1000, r#"bar"]["x\y"#, 60);

        assert!(query.contains(r#"["amenity"="bar\"][\"x\\y"]->.nodes;"#));
        assert_eq!(escape_ql_string("line\nbreak"), r"line\nbreak");
        assert_eq!(escape_ql_string("ice_cream"), "ice_cream");
    }

    #[test]
    fn test_parse_overpass_response() {
        let json = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 47.4, "lon": 8.5, "tags": {"name": "Cafe X"}},
                {"type": "way", "id": 2, "center": {"lat": 47.1, "lon": 8.2}, "tags": {"amenity": "restaurant"}},
                {"type": "relation", "id": 3}
            ]
        }"#;

        let response: OverpassResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.elements.len(), 3);
        assert_eq!(response.elements[0].type_.as_deref(), Some("node"));
        assert_eq!(response.elements[1].center.and_then(|c| c.lat), Some(47.1));
        assert!(response.elements[2].tags.is_none());
    }
}
