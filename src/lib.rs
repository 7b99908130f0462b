//! # mapnav
//!
//! A UI-free map navigation engine over static-map, place-search, and
//! geocoder web services.
//!
//! The engine owns the coordinate math, the view-state de-duplication, the
//! place-resolution pipeline, and the navigation state machine; hosts own
//! widgets, focus, and presentation. Every user gesture enters as a typed
//! [`NavigationIntent`] and leaves as an [`Outcome`] plus, at most, one
//! fetched map image.

pub mod core;
pub mod engine;
pub mod prelude;
pub mod services;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    geo::{Axis, Coordinate, CoordinateError},
    view::{MapTheme, MarkerPoint, ViewProposal, ViewState},
};

pub use crate::engine::{
    controller::{EnginePhase, NavigationController, Outcome},
    intent::{NavigationIntent, PanDirection, ZoomStep},
    pipeline::{AddressDetails, PlaceMatch, ResolutionPipeline},
};

pub use crate::services::{
    config::{ConfigError, ServiceConfig, ServiceEndpoint},
    geocode::{Geocoder, GeocoderClient},
    search::{OrganisationInfo, PlaceSearch, PlaceSearchClient, SearchHit},
    static_map::{FetchError, ImageBytes, StaticMapClient, StaticMapSource},
    ResolveError,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fixed title for every user-facing error message.
pub const ERROR_TITLE: &str = "Error";

/// Common error type of the navigation engine
///
/// Each stage failure converts into exactly one of these kinds at its stage
/// boundary; raw transport and decode faults never surface past the services
/// layer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidInput(#[from] CoordinateError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl EngineError {
    /// The fixed message body shown to the user, paired with [`ERROR_TITLE`].
    pub fn user_message(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "Invalid latitude or longitude values.",
            EngineError::Resolve(ResolveError::NoMatch) => {
                "Nothing was found. The address is probably wrong."
            }
            EngineError::Fetch(FetchError::UpstreamRejected { .. })
            | EngineError::Resolve(ResolveError::UpstreamRejected { .. }) => {
                "The map service rejected the request."
            }
            EngineError::Fetch(FetchError::Unreachable(_))
            | EngineError::Resolve(ResolveError::Unreachable(_)) => {
                "The map service could not be reached."
            }
            EngineError::Resolve(ResolveError::MalformedResponse(_)) => {
                "The map service returned an unexpected response."
            }
        }
    }
}
