pub mod elevation;
pub mod error;
pub mod overpass;

pub use elevation::{MergeOutcome, enrich, lookup_elevations, merge_elevations};
pub use error::ServiceError;
pub use overpass::{OverpassResponse, build_query, fetch_points};

const USER_AGENT: &str = "nebbia/0.1.0 (restaurants above the fog line)";
