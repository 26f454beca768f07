use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ServiceError, USER_AGENT};
use crate::domain::PointRecord;

const SERVICE: &str = "Elevation API";

/// Batch lookup body for Open-Elevation
#[derive(Debug, Serialize)]
pub struct LookupRequest {
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Open-Elevation lookup response
#[derive(Debug, Deserialize)]
pub struct ElevationResponse {
    #[serde(default)]
    pub results: Vec<ElevationResult>,
}

#[derive(Debug, Deserialize)]
pub struct ElevationResult {
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl LookupRequest {
    /// One location per record, in record order
    pub fn from_records(records: &[PointRecord]) -> Self {
        Self {
            locations: records
                .iter()
                .map(|r| Location {
                    latitude: r.lat,
                    longitude: r.lon,
                })
                .collect(),
        }
    }
}

/// How a positional merge lined up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    /// Records that received a response entry
    pub updated: usize,
    /// Trailing records with no corresponding response entry
    pub missing: usize,
    /// Trailing response entries with no corresponding record
    pub excess: usize,
}

impl MergeOutcome {
    pub fn is_aligned(&self) -> bool {
        self.missing == 0 && self.excess == 0
    }
}

/// Assign `elevations[i]` to `records[i]` for every index both sides have
///
/// The service is assumed to answer in request order. Records past the end
/// of `elevations` are left untouched and extra elevations are ignored.
pub fn merge_elevations(records: &mut [PointRecord], elevations: &[Option<f64>]) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for (record, elevation) in records.iter_mut().zip(elevations) {
        record.elevation = *elevation;
        outcome.updated += 1;
    }

    outcome.missing = records.len().saturating_sub(elevations.len());
    outcome.excess = elevations.len().saturating_sub(records.len());
    outcome
}

/// Enrich records in place with elevations from the Open-Elevation API
///
/// Sends a single batch request. On any failure the error is printed and
/// the records are returned with their elevations unchanged.
///
/// # Arguments
/// * `url` - Open-Elevation lookup endpoint
/// * `records` - Records to enrich, in the order they were fetched
/// * `timeout_secs` - Client-side request timeout
pub fn enrich(url: &str, mut records: Vec<PointRecord>, timeout_secs: u64) -> Vec<PointRecord> {
    if records.is_empty() {
        return records;
    }

    println!("-> Fetching elevation for {} coordinates...", records.len());

    match lookup_elevations(url, &mut records, timeout_secs) {
        Ok(outcome) => {
            if !outcome.is_aligned() {
                println!(
                    "Warning: Elevation API result count did not match {} coordinates ({} records left without elevation, {} results ignored)",
                    records.len(),
                    outcome.missing,
                    outcome.excess
                );
            }
            println!("-> Merged {} elevation values.", outcome.updated);
        }
        Err(e) => println!("Error querying Elevation API: {}", e),
    }

    records
}

/// Look up elevations for `records` and merge them by position
///
/// Records are only touched once a response has been decoded, so on error
/// every elevation is exactly what it was before the call.
pub fn lookup_elevations(
    url: &str,
    records: &mut [PointRecord],
    timeout_secs: u64,
) -> Result<MergeOutcome, ServiceError> {
    let request = LookupRequest::from_records(records);
    let response = execute_lookup(url, &request, timeout_secs)?;

    let elevations: Vec<Option<f64>> = response.results.iter().map(|r| r.elevation).collect();
    Ok(merge_elevations(records, &elevations))
}

fn execute_lookup(
    url: &str,
    request: &LookupRequest,
    timeout_secs: u64,
) -> Result<ElevationResponse, ServiceError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(ServiceError::Client)?;

    let response = client
        .post(url)
        .json(request)
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

    fn records(n: usize) -> Vec<PointRecord> {
        (0..n)
            .map(|i| PointRecord::new(format!("R{}", i), 47.0 + i as f64, 8.0 + i as f64))
            .collect()
    }

    #[test]
    fn test_lookup_request_preserves_order() {
        let request = LookupRequest::from_records(&records(3));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value,
            serde_json::json!({"locations": [
                {"latitude": 47.0, "longitude": 8.0},
                {"latitude": 48.0, "longitude": 9.0},
                {"latitude": 49.0, "longitude": 10.0}
            ]})
        );
    }

    #[test]
    fn test_parse_elevation_response() {
        let json = r#"{"results": [
            {"latitude": 47.4, "longitude": 8.5, "elevation": 450},
            {"latitude": 47.5, "longitude": 8.6, "elevation": null},
            {"latitude": 47.6, "longitude": 8.7}
        ]}"#;

        let response: ElevationResponse = serde_json::from_str(json).unwrap();
        let elevations: Vec<Option<f64>> = response.results.iter().map(|r| r.elevation).collect();
        assert_eq!(elevations, vec![Some(450.0), None, None]);
    }

    #[test]
    fn test_merge_equal_lengths() {
        let mut recs = records(3);
        let outcome = merge_elevations(&mut recs, &[Some(410.0), Some(390.5), Some(1200.0)]);

        assert_eq!(outcome.updated, 3);
        assert!(outcome.is_aligned());
        assert_eq!(recs[0].elevation, Some(410.0));
        assert_eq!(recs[1].elevation, Some(390.5));
        assert_eq!(recs[2].elevation, Some(1200.0));
    }

    #[test]
    fn test_merge_short_response() {
        let mut recs = records(3);
        let outcome = merge_elevations(&mut recs, &[Some(500.0)]);

        assert_eq!(
            outcome,
            MergeOutcome {
                updated: 1,
                missing: 2,
                excess: 0
            }
        );
        assert_eq!(recs[0].elevation, Some(500.0));
        assert_eq!(recs[1].elevation, None);
        assert_eq!(recs[2].elevation, None);
    }

    #[test]
    fn test_merge_long_response() {
        let mut recs = records(1);
        let outcome = merge_elevations(&mut recs, &[Some(450.0), Some(1.0), Some(2.0)]);

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.excess, 2);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].elevation, Some(450.0));
    }

    #[test]
    fn test_enrich_empty_is_noop() {
        // Unroutable URL: must not be contacted for an empty list
        let out = enrich("http://127.0.0.1:9/unused", Vec::new(), 1);
        assert!(out.is_empty());
    }
}
