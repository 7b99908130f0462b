//! Prelude module for common mapnav types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapnav::prelude::*;`

pub use crate::core::{
    constants,
    geo::{
        key_step_delta, normalize_latitude, normalize_longitude, pan_delta, Axis, Coordinate,
        CoordinateError,
    },
    view::{clamp_zoom, propose_view, MapTheme, MarkerPoint, ViewProposal, ViewState},
};

pub use crate::engine::{
    controller::{EnginePhase, NavigationController, Outcome},
    intent::{within_image, NavigationIntent, PanDirection, ZoomStep},
    pipeline::{AddressDetails, PlaceMatch, ResolutionPipeline},
};

pub use crate::services::{
    config::{ConfigError, ServiceConfig, ServiceEndpoint},
    geocode::{Geocoder, GeocoderClient},
    search::{OrganisationInfo, PlaceSearch, PlaceSearchClient, SearchHit},
    static_map::{FetchError, ImageBytes, StaticMapClient, StaticMapSource},
    ResolveError,
};

pub use crate::{EngineError, Result, ERROR_TITLE};
