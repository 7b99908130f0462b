//! Pure view-state and coordinate math; no I/O anywhere in this module.

pub mod constants;
pub mod geo;
pub mod view;

// Re-export the essential types
pub use geo::{
    key_step_delta, normalize_latitude, normalize_longitude, pan_delta, Axis, Coordinate,
    CoordinateError,
};
pub use view::{clamp_zoom, propose_view, MapTheme, MarkerPoint, ViewProposal, ViewState};
