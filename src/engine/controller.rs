use std::mem;

use crate::core::constants::{ADDRESS_PLACEHOLDER, DEFAULT_ZOOM, MAP_IMAGE_SIZE};
use crate::core::{
    clamp_zoom, key_step_delta, normalize_latitude, normalize_longitude, pan_delta, propose_view,
    Axis, Coordinate, MapTheme, MarkerPoint, ViewProposal, ViewState,
};
use crate::engine::intent::{within_image, NavigationIntent, PanDirection, ZoomStep};
use crate::engine::pipeline::{AddressDetails, ResolutionPipeline};
use crate::services::{
    GeocoderClient, ImageBytes, PlaceSearchClient, ServiceConfig, StaticMapClient, StaticMapSource,
};
use crate::{EngineError, Result};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePhase {
    /// Nothing rendered yet; the shell shows its placeholder.
    Idle,
    /// A map image for this view is on screen. The payload doubles as the
    /// snapshot that fetch de-duplication compares against.
    Displaying(ViewState),
    /// The last intent failed. Behaviorally the same as `Idle`; the payload
    /// keeps the view that was on screen when the failure happened, for
    /// diagnostics only.
    Error(Option<ViewState>),
}

impl EnginePhase {
    /// The rendered view, when one is on screen.
    pub fn current_view(&self) -> Option<&ViewState> {
        match self {
            EnginePhase::Displaying(view) => Some(view),
            _ => None,
        }
    }
}

/// What an intent did, for shells deciding what to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing to redraw: the candidate equalled the rendered view, or the
    /// intent had nothing to act on in the current phase.
    Unchanged,
    /// A fresh image was fetched for `view`.
    Rendered { view: ViewState, image: ImageBytes },
    /// The engine returned to the placeholder.
    Cleared,
}

/// The navigation state machine.
///
/// Owns the only mutable view state in the engine. Every user gesture enters
/// through [`handle`](NavigationController::handle) as a typed intent, is
/// validated, de-duplicated against the rendered snapshot, and either
/// suppressed or turned into exactly one service call.
pub struct NavigationController {
    map: Box<dyn StaticMapSource>,
    pipeline: ResolutionPipeline,
    phase: EnginePhase,
    theme: MapTheme,
    /// The value the shell's zoom selector would show; seeds every newly
    /// built candidate view.
    zoom_setting: u8,
    postal_enabled: bool,
    address: Option<AddressDetails>,
}

impl NavigationController {
    /// Builds a controller over explicit service implementations; this is
    /// the seam the tests use.
    pub fn new(map: Box<dyn StaticMapSource>, pipeline: ResolutionPipeline) -> Self {
        Self {
            map,
            pipeline,
            phase: EnginePhase::Idle,
            theme: MapTheme::default(),
            zoom_setting: DEFAULT_ZOOM,
            postal_enabled: false,
            address: None,
        }
    }

    /// Wires the production clients from a [`ServiceConfig`].
    pub fn from_config(config: ServiceConfig) -> Self {
        let pipeline = ResolutionPipeline::new(
            Box::new(PlaceSearchClient::new(config.search, config.lang.clone())),
            Box::new(GeocoderClient::new(config.geocoder, config.lang)),
        );
        Self::new(Box::new(StaticMapClient::new(config.static_map)), pipeline)
    }

    /// Runs one intent to completion.
    ///
    /// `&mut self` keeps at most one resolution or fetch in flight; shells
    /// that want to drop gestures arriving mid-flight do so on their side.
    pub async fn handle(&mut self, intent: NavigationIntent) -> Result<Outcome> {
        match intent {
            NavigationIntent::Submit {
                address,
                latitude,
                longitude,
            } => {
                // The shell's single submit action: placeholder text means
                // the user typed coordinates, anything else is a query.
                if address.trim().is_empty() || address == ADDRESS_PLACEHOLDER {
                    self.submit_coordinates(&latitude, &longitude, true).await
                } else {
                    self.submit_text(&address).await
                }
            }
            NavigationIntent::SubmitText { text } => self.submit_text(&text).await,
            NavigationIntent::SubmitCoordinates {
                latitude,
                longitude,
                pin,
            } => self.submit_coordinates(&latitude, &longitude, pin).await,
            NavigationIntent::Zoom(step) => self.zoom(step).await,
            NavigationIntent::Pan(direction) => self.pan(direction).await,
            NavigationIntent::ClickAt { x, y } => self.click_at(x, y).await,
            NavigationIntent::ToggleTheme => self.toggle_theme().await,
            NavigationIntent::TogglePostalCode => self.toggle_postal_code().await,
            NavigationIntent::LocateNearest => self.locate_nearest().await,
            NavigationIntent::Clear => Ok(self.clear()),
        }
    }

    async fn submit_text(&mut self, text: &str) -> Result<Outcome> {
        let place = match self.pipeline.resolve_by_text(text, self.postal_enabled).await {
            Ok(place) => place,
            Err(error) => return Err(self.fail(error)),
        };
        log::info!("resolved \"{}\" to {}", text, place.coordinate.as_lon_lat());
        let candidate = ViewState::new(place.coordinate, self.zoom_setting, self.theme)
            .with_marker(Some(MarkerPoint::at(place.coordinate)));
        self.address = Some(place.address);
        self.render(candidate, true).await
    }

    async fn submit_coordinates(
        &mut self,
        latitude: &str,
        longitude: &str,
        pin: bool,
    ) -> Result<Outcome> {
        let center = match Coordinate::from_user_input(latitude, longitude) {
            Ok(center) => center,
            Err(error) => return Err(self.fail(error)),
        };
        let candidate = ViewState::new(center, self.zoom_setting, self.theme)
            .with_marker(pin.then(|| MarkerPoint::at(center)));
        self.render(candidate, pin).await
    }

    async fn zoom(&mut self, step: ZoomStep) -> Result<Outcome> {
        let Some(view) = self.phase.current_view().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        let stepped = clamp_zoom(self.zoom_setting.saturating_add_signed(step.delta()));
        self.zoom_setting = stepped;
        // At a zoom bound the candidate equals the rendered view and the
        // fetch is suppressed downstream.
        self.render(view.with_zoom(stepped), false).await
    }

    async fn pan(&mut self, direction: PanDirection) -> Result<Outcome> {
        let Some(view) = self.phase.current_view().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        let mut center = view.center;
        match direction {
            PanDirection::North => {
                center.latitude =
                    normalize_latitude(center.latitude + key_step_delta(Axis::Latitude, view.zoom));
            }
            PanDirection::South => {
                center.latitude =
                    normalize_latitude(center.latitude - key_step_delta(Axis::Latitude, view.zoom));
            }
            PanDirection::East => {
                center.longitude = normalize_longitude(
                    center.longitude + key_step_delta(Axis::Longitude, view.zoom),
                );
            }
            PanDirection::West => {
                center.longitude = normalize_longitude(
                    center.longitude - key_step_delta(Axis::Longitude, view.zoom),
                );
            }
        }
        // A wrap can land outside the serviceable band, e.g. a large
        // latitude step at low zoom.
        let center = match center.validate_service_range() {
            Ok(center) => center,
            Err(error) => return Err(self.fail(error)),
        };
        self.render(view.with_center(center), false).await
    }

    async fn click_at(&mut self, x: f64, y: f64) -> Result<Outcome> {
        let Some(view) = self.phase.current_view().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        if !within_image(x, y) {
            return Ok(Outcome::Unchanged);
        }
        let half = f64::from(MAP_IMAGE_SIZE) / 2.0;
        let (d_lat, d_lon) = pan_delta(x - half, y - half, view.zoom);
        let clicked = Coordinate::new(view.center.latitude + d_lat, view.center.longitude + d_lon);
        let clicked = match clicked.validate_service_range() {
            Ok(clicked) => clicked,
            Err(error) => return Err(self.fail(error)),
        };
        let candidate = view
            .with_center(clicked)
            .with_marker(Some(MarkerPoint::at(clicked)));
        self.render(candidate, true).await
    }

    async fn toggle_theme(&mut self) -> Result<Outcome> {
        self.theme = self.theme.toggled();
        let Some(view) = self.phase.current_view().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        self.render(view.with_theme(self.theme), false).await
    }

    async fn toggle_postal_code(&mut self) -> Result<Outcome> {
        self.postal_enabled = !self.postal_enabled;
        if !self.postal_enabled {
            return Ok(Outcome::Unchanged);
        }
        // Toggled on with the code still unknown: ask the geocoder once.
        let line = match &self.address {
            Some(details) if details.postal_code.is_none() => details.address_line.clone(),
            _ => return Ok(Outcome::Unchanged),
        };
        match self.pipeline.enrich_postal_code(&line).await {
            Ok(code) => {
                if let Some(details) = self.address.as_mut() {
                    details.postal_code = code;
                }
                Ok(Outcome::Unchanged)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    async fn locate_nearest(&mut self) -> Result<Outcome> {
        let Some(view) = self.phase.current_view().cloned() else {
            return Ok(Outcome::Unchanged);
        };
        // Only the first stored line biases the search; a prior nearest
        // lookup leaves a multi-line description behind.
        let query = self
            .address
            .as_ref()
            .and_then(|details| details.address_line.lines().next())
            .map(String::from);
        let organisation = match self
            .pipeline
            .resolve_nearest(view.center, query.as_deref())
            .await
        {
            Ok(organisation) => organisation,
            Err(error) => return Err(self.fail(error)),
        };
        log::info!("nearest organisation: {}", organisation.name);
        self.address = Some(AddressDetails::new(organisation.describe()));
        let candidate = view
            .with_center(organisation.coordinate)
            .with_marker(Some(MarkerPoint::at(organisation.coordinate)));
        self.render(candidate, true).await
    }

    fn clear(&mut self) -> Outcome {
        self.phase = EnginePhase::Idle;
        self.address = None;
        self.zoom_setting = DEFAULT_ZOOM;
        Outcome::Cleared
    }

    /// De-duplicates `candidate` against the snapshot and fetches when it
    /// differs. The snapshot only advances after the image arrives, so the
    /// displayed image and the stored view never disagree.
    async fn render(&mut self, candidate: ViewState, new_marker: bool) -> Result<Outcome> {
        match propose_view(self.phase.current_view(), candidate, new_marker) {
            ViewProposal::Unchanged => {
                log::debug!("candidate view equals the rendered one; fetch suppressed");
                Ok(Outcome::Unchanged)
            }
            ViewProposal::Changed(candidate) => match self.map.fetch(&candidate).await {
                Ok(image) => {
                    log::info!(
                        "rendered {} at z{}",
                        candidate.center.as_lon_lat(),
                        candidate.zoom
                    );
                    self.phase = EnginePhase::Displaying(candidate.clone());
                    Ok(Outcome::Rendered {
                        view: candidate,
                        image,
                    })
                }
                Err(error) => Err(self.fail(error)),
            },
        }
    }

    /// Funnels any stage failure into the error phase. The snapshot is
    /// dropped so no stale image survives next to an error message; the
    /// theme, zoom setting, and address details stay put.
    fn fail(&mut self, error: impl Into<EngineError>) -> EngineError {
        let error = error.into();
        log::warn!("{}", error);
        let previous = match mem::replace(&mut self.phase, EnginePhase::Idle) {
            EnginePhase::Displaying(view) => Some(view),
            EnginePhase::Error(view) => view,
            EnginePhase::Idle => None,
        };
        self.phase = EnginePhase::Error(previous);
        error
    }

    pub fn phase(&self) -> &EnginePhase {
        &self.phase
    }

    pub fn current_view(&self) -> Option<&ViewState> {
        self.phase.current_view()
    }

    pub fn theme(&self) -> MapTheme {
        self.theme
    }

    pub fn zoom_setting(&self) -> u8 {
        self.zoom_setting
    }

    pub fn postal_code_enabled(&self) -> bool {
        self.postal_enabled
    }

    /// Text for the shell's status line: the stored address line, with the
    /// postal code appended while the toggle is on and a code is known.
    pub fn status_line(&self) -> Option<String> {
        self.address
            .as_ref()
            .map(|details| details.display_line(self.postal_enabled))
    }
}
