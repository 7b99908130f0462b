use serde::{Deserialize, Serialize};

use crate::core::constants::{DEFAULT_ZOOM, MARKER_STYLE, MAX_ZOOM, MIN_ZOOM};
use crate::core::geo::Coordinate;

/// Rendering theme of the fetched map image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapTheme {
    Light,
    Dark,
}

impl MapTheme {
    /// The `theme` query value the static-map service expects.
    pub fn as_param(&self) -> &'static str {
        match self {
            MapTheme::Light => "light",
            MapTheme::Dark => "dark",
        }
    }

    /// Returns the opposite theme.
    pub fn toggled(self) -> Self {
        match self {
            MapTheme::Light => MapTheme::Dark,
            MapTheme::Dark => MapTheme::Light,
        }
    }
}

impl Default for MapTheme {
    fn default() -> Self {
        MapTheme::Light
    }
}

/// A pinned location drawn on the map image, distinct from the view center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerPoint {
    pub position: Coordinate,
}

impl MarkerPoint {
    /// Pins the marker at the given position.
    pub fn at(position: Coordinate) -> Self {
        Self { position }
    }

    /// The `pt` query value: `"{lon},{lat},{style}"`.
    pub fn as_param(&self) -> String {
        format!("{},{}", self.position.as_lon_lat(), MARKER_STYLE)
    }
}

/// Clamps a zoom level into the serviceable [1, 20] band.
pub fn clamp_zoom(zoom: u8) -> u8 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// The authoritative description of one displayed map view.
///
/// Exclusively owned by the navigation controller and replaced atomically on
/// every transition; all other components read it by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: Coordinate,
    pub zoom: u8,
    pub theme: MapTheme,
    pub marker: Option<MarkerPoint>,
}

impl ViewState {
    /// Creates a view with no marker, clamping the zoom.
    pub fn new(center: Coordinate, zoom: u8, theme: MapTheme) -> Self {
        Self {
            center,
            zoom: clamp_zoom(zoom),
            theme,
            marker: None,
        }
    }

    /// Same view re-centered; the marker is carried over.
    pub fn with_center(mut self, center: Coordinate) -> Self {
        self.center = center;
        self
    }

    /// Same view at another (clamped) zoom; the marker is carried over.
    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = clamp_zoom(zoom);
        self
    }

    /// Same view under the other theme; the marker is carried over.
    pub fn with_theme(mut self, theme: MapTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Same view with the marker replaced or removed.
    pub fn with_marker(mut self, marker: Option<MarkerPoint>) -> Self {
        self.marker = marker;
        self
    }

    /// Equality over (latitude, longitude, zoom, theme).
    ///
    /// The marker is deliberately not compared here; [`propose_view`] handles
    /// the explicitly-requested-pin case. Coordinates compare as the exact
    /// `f64` values computed once: repeats through the identical code path
    /// are equal, while independently recomputed values may differ and cause
    /// an acceptable duplicate fetch.
    pub fn same_view(&self, other: &ViewState) -> bool {
        self.center.latitude == other.center.latitude
            && self.center.longitude == other.center.longitude
            && self.zoom == other.zoom
            && self.theme == other.theme
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Coordinate::default(), DEFAULT_ZOOM, MapTheme::default())
    }
}

/// Outcome of de-duplicating a candidate view against the rendered snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewProposal {
    /// The candidate would re-render exactly what is already displayed.
    Unchanged,
    /// The candidate needs a fetch.
    Changed(ViewState),
}

/// Decides whether `candidate` requires a network fetch given the last
/// successfully rendered view.
///
/// With no rendered view the proposal is always `Changed`. Otherwise the
/// candidate is compared with [`ViewState::same_view`], so pure zoom, pan,
/// and theme repeats are suppressed regardless of the carried marker. When
/// `new_marker` is set the candidate carries an explicitly requested pin; a
/// pin that differs from the rendered one forces `Changed` even at an equal
/// view, so the new pin is actually drawn.
pub fn propose_view(
    rendered: Option<&ViewState>,
    candidate: ViewState,
    new_marker: bool,
) -> ViewProposal {
    match rendered {
        Some(current) if current.same_view(&candidate) => {
            if new_marker && current.marker != candidate.marker {
                ViewProposal::Changed(candidate)
            } else {
                ViewProposal::Unchanged
            }
        }
        _ => ViewProposal::Changed(candidate),
    }
}
