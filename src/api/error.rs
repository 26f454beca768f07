use reqwest::StatusCode;
use thiserror::Error;

/// Failure talking to one of the outbound services
///
/// Both pipeline stages catch these and degrade instead of aborting the run.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned error status: {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("failed to parse {service} JSON response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}
