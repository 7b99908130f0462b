//! Clients for the three backing services and the plumbing they share.

pub mod config;
pub mod geocode;
pub mod search;
pub mod static_map;

use once_cell::sync::Lazy;
use thiserror::Error;

// Re-export the essential types
pub use config::{ConfigError, ServiceConfig, ServiceEndpoint};
pub use geocode::{Geocoder, GeocoderClient};
pub use search::{OrganisationInfo, PlaceSearch, PlaceSearchClient, SearchHit};
pub use static_map::{FetchError, ImageBytes, StaticMapClient, StaticMapSource};

/// Shared async HTTP client for all service backends.
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent("mapnav/0.1.0")
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .expect("failed to build reqwest async client")
});

/// Failures of the place-search and geocoder stages.
///
/// String payloads instead of source-chained transport errors keep the type
/// comparable and constructible from test doubles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// The search produced no features for the query.
    #[error("no places matched the query")]
    NoMatch,
    /// The service answered with a non-success status.
    #[error("place service rejected the request (HTTP {status})")]
    UpstreamRejected { status: u16 },
    /// The service could not be reached at the transport level.
    #[error("place service is unreachable: {0}")]
    Unreachable(String),
    /// A mandatory field was absent from an otherwise parsable response.
    /// Optional fields (such as the postal code) never produce this.
    #[error("place service response is missing {0}")]
    MalformedResponse(&'static str),
}
