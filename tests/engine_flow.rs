use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mapnav::prelude::*;

// End-to-end intent flows over scripted service doubles. These drive the
// controller exactly the way a shell would, one gesture at a time, and
// assert on the rendered views and the number of backend calls.

/// Static-map double: records every requested view and can be switched into
/// a failing mode mid-test.
struct RecordingMap {
    fetches: Arc<AtomicUsize>,
    views: Arc<Mutex<Vec<ViewState>>>,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl StaticMapSource for RecordingMap {
    async fn fetch(&self, view: &ViewState) -> std::result::Result<ImageBytes, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.views.lock().unwrap().push(view.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::UpstreamRejected { status: 502 });
        }
        Ok(vec![0xA5; 16])
    }
}

/// Place-search double answering from a fixed script.
struct ScriptedSearch {
    calls: Arc<AtomicUsize>,
    nearest_queries: Arc<Mutex<Vec<Option<String>>>>,
    hit: Option<SearchHit>,
    organisation: Option<OrganisationInfo>,
}

#[async_trait]
impl PlaceSearch for ScriptedSearch {
    async fn search_text(&self, _query: &str) -> std::result::Result<SearchHit, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.hit.clone().ok_or(ResolveError::NoMatch)
    }

    async fn search_nearest(
        &self,
        _anchor: Coordinate,
        query: Option<&str>,
    ) -> std::result::Result<OrganisationInfo, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.nearest_queries
            .lock()
            .unwrap()
            .push(query.map(String::from));
        self.organisation.clone().ok_or(ResolveError::NoMatch)
    }
}

struct ScriptedGeocoder {
    calls: Arc<AtomicUsize>,
    code: Option<String>,
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn postal_code(
        &self,
        _address_line: &str,
    ) -> std::result::Result<Option<String>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.code.clone())
    }
}

/// What the scripted services should answer with.
#[derive(Default)]
struct Script {
    hit: Option<SearchHit>,
    organisation: Option<OrganisationInfo>,
    postal_code: Option<String>,
}

struct Harness {
    controller: NavigationController,
    fetches: Arc<AtomicUsize>,
    views: Arc<Mutex<Vec<ViewState>>>,
    failing: Arc<AtomicBool>,
    search_calls: Arc<AtomicUsize>,
    nearest_queries: Arc<Mutex<Vec<Option<String>>>>,
    geocoder_calls: Arc<AtomicUsize>,
}

impl Harness {
    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn search_count(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    fn geocoder_count(&self) -> usize {
        self.geocoder_calls.load(Ordering::SeqCst)
    }

    fn last_view(&self) -> ViewState {
        self.views.lock().unwrap().last().cloned().unwrap()
    }
}

fn harness() -> Harness {
    harness_with(Script::default())
}

fn harness_with(script: Script) -> Harness {
    let fetches = Arc::new(AtomicUsize::new(0));
    let views = Arc::new(Mutex::new(Vec::new()));
    let failing = Arc::new(AtomicBool::new(false));
    let search_calls = Arc::new(AtomicUsize::new(0));
    let nearest_queries = Arc::new(Mutex::new(Vec::new()));
    let geocoder_calls = Arc::new(AtomicUsize::new(0));

    let map = RecordingMap {
        fetches: fetches.clone(),
        views: views.clone(),
        failing: failing.clone(),
    };
    let search = ScriptedSearch {
        calls: search_calls.clone(),
        nearest_queries: nearest_queries.clone(),
        hit: script.hit,
        organisation: script.organisation,
    };
    let geocoder = ScriptedGeocoder {
        calls: geocoder_calls.clone(),
        code: script.postal_code,
    };
    let pipeline = ResolutionPipeline::new(Box::new(search), Box::new(geocoder));

    Harness {
        controller: NavigationController::new(Box::new(map), pipeline),
        fetches,
        views,
        failing,
        search_calls,
        nearest_queries,
        geocoder_calls,
    }
}

fn red_square_hit() -> SearchHit {
    SearchHit {
        coordinate: Coordinate::new(55.7539, 37.6208),
        address_line: "Москва, Красная площадь".to_string(),
    }
}

fn museum() -> OrganisationInfo {
    OrganisationInfo {
        name: "Государственный исторический музей".to_string(),
        address: "Красная площадь, 1".to_string(),
        url: Some("https://shm.ru".to_string()),
        phones: vec!["+7 (495) 692-40-19".to_string()],
        coordinate: Coordinate::new(55.7557, 37.6217),
    }
}

fn rendered(outcome: Outcome) -> (ViewState, ImageBytes) {
    match outcome {
        Outcome::Rendered { view, image } => (view, image),
        other => panic!("expected a rendered outcome, got {:?}", other),
    }
}

async fn submit_coords(harness: &mut Harness, lat: &str, lon: &str, pin: bool) -> Outcome {
    harness
        .controller
        .handle(NavigationIntent::SubmitCoordinates {
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            pin,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_submit_coordinates_renders_and_dedups() {
    let mut harness = harness();

    let outcome = submit_coords(&mut harness, "55,5", "37,6", true).await;
    let (view, image) = rendered(outcome);
    assert_eq!(view.center, Coordinate::new(55.5, 37.6));
    assert_eq!(view.zoom, constants::DEFAULT_ZOOM);
    assert_eq!(view.theme, MapTheme::Light);
    assert_eq!(view.marker, Some(MarkerPoint::at(Coordinate::new(55.5, 37.6))));
    assert_eq!(image.len(), 16);
    assert_eq!(harness.fetch_count(), 1);
    // The view handed to the service is the one the outcome reports and the
    // snapshot keeps.
    assert_eq!(harness.last_view(), view);
    assert_eq!(harness.controller.current_view(), Some(&view));

    // The identical submission parses to the identical view; no second call.
    let repeat = submit_coords(&mut harness, "55,5", "37,6", true).await;
    assert_eq!(repeat, Outcome::Unchanged);
    assert_eq!(harness.fetch_count(), 1);
}

#[tokio::test]
async fn test_invalid_coordinates_fail_before_any_fetch() {
    let mut harness = harness();

    for (lat, lon) in [("86", "0"), ("0", "200"), ("abc", "0"), ("", "")] {
        let error = harness
            .controller
            .handle(NavigationIntent::SubmitCoordinates {
                latitude: lat.to_string(),
                longitude: lon.to_string(),
                pin: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(error, EngineError::InvalidInput(_)));
        assert_eq!(error.user_message(), "Invalid latitude or longitude values.");
    }

    assert_eq!(harness.fetch_count(), 0);
    assert!(matches!(harness.controller.phase(), EnginePhase::Error(None)));
}

#[tokio::test]
async fn test_fractional_overshoot_is_serviceable() {
    let mut harness = harness();

    // Truncation admits values up to but excluding the next integer.
    let (view, _) = rendered(submit_coords(&mut harness, "85.9", "-180.9", false).await);
    assert_eq!(view.center, Coordinate::new(85.9, -180.9));
    assert_eq!(view.marker, None);
    assert_eq!(harness.fetch_count(), 1);
}

#[tokio::test]
async fn test_zoom_steps_clamp_and_dedup_at_bounds() {
    let mut harness = harness();
    submit_coords(&mut harness, "55.5", "37.6", false).await;

    for _ in 0..8 {
        harness
            .controller
            .handle(NavigationIntent::Zoom(ZoomStep::In))
            .await
            .unwrap();
    }
    assert_eq!(harness.controller.zoom_setting(), constants::MAX_ZOOM);
    let at_max = harness.fetch_count();

    // One more step in: the clamp leaves the candidate equal, so nothing
    // goes out.
    let outcome = harness
        .controller
        .handle(NavigationIntent::Zoom(ZoomStep::In))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(harness.controller.zoom_setting(), constants::MAX_ZOOM);
    assert_eq!(harness.fetch_count(), at_max);

    for _ in 0..19 {
        harness
            .controller
            .handle(NavigationIntent::Zoom(ZoomStep::Out))
            .await
            .unwrap();
    }
    assert_eq!(harness.controller.zoom_setting(), constants::MIN_ZOOM);
    let at_min = harness.fetch_count();

    let outcome = harness
        .controller
        .handle(NavigationIntent::Zoom(ZoomStep::Out))
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(harness.fetch_count(), at_min);
}

#[tokio::test]
async fn test_theme_toggle_always_fetches() {
    let mut harness = harness();
    submit_coords(&mut harness, "55.5", "37.6", false).await;

    let (view, _) = rendered(
        harness
            .controller
            .handle(NavigationIntent::ToggleTheme)
            .await
            .unwrap(),
    );
    assert_eq!(view.theme, MapTheme::Dark);
    assert_eq!(harness.fetch_count(), 2);

    // Toggling back lands on a view rendered before, but theme is part of
    // the equality so the fetch is never suppressed.
    let (view, _) = rendered(
        harness
            .controller
            .handle(NavigationIntent::ToggleTheme)
            .await
            .unwrap(),
    );
    assert_eq!(view.theme, MapTheme::Light);
    assert_eq!(harness.fetch_count(), 3);
}

#[tokio::test]
async fn test_pan_wraps_longitude() {
    let mut harness = harness();
    submit_coords(&mut harness, "0", "179.99", false).await;

    let (view, _) = rendered(
        harness
            .controller
            .handle(NavigationIntent::Pan(PanDirection::East))
            .await
            .unwrap(),
    );
    let expected =
        normalize_longitude(179.99 + key_step_delta(Axis::Longitude, constants::DEFAULT_ZOOM));
    assert!(expected < -179.0);
    assert_eq!(view.center.longitude, expected);
    assert_eq!(view.center.latitude, 0.0);
    assert_eq!(view.marker, None);
}

#[tokio::test]
async fn test_pan_past_the_serviceable_band_fails() {
    let mut harness = harness();
    submit_coords(&mut harness, "85.99", "0", false).await;

    // One step north stays below the pole wrap but crosses the truncated
    // 85-degree bound.
    let error = harness
        .controller
        .handle(NavigationIntent::Pan(PanDirection::North))
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        EngineError::InvalidInput(CoordinateError::LatitudeOutOfRange(_))
    ));
    assert_eq!(harness.fetch_count(), 1);
    assert_eq!(harness.controller.current_view(), None);
}

#[tokio::test]
async fn test_click_recenters_and_pins() {
    let mut harness = harness();
    submit_coords(&mut harness, "55.5", "37.6", false).await;

    // Clicking the exact center moves nothing, but the explicitly requested
    // pin differs from the absent one and forces a redraw.
    let (view, _) = rendered(
        harness
            .controller
            .handle(NavigationIntent::ClickAt { x: 225.0, y: 225.0 })
            .await
            .unwrap(),
    );
    assert_eq!(view.center, Coordinate::new(55.5, 37.6));
    assert_eq!(view.marker, Some(MarkerPoint::at(view.center)));
    assert_eq!(harness.fetch_count(), 2);

    // An off-center click recenters by the pixel offset converted at the
    // current zoom.
    let (view, _) = rendered(
        harness
            .controller
            .handle(NavigationIntent::ClickAt { x: 325.0, y: 125.0 })
            .await
            .unwrap(),
    );
    let (d_lat, d_lon) = pan_delta(100.0, -100.0, constants::DEFAULT_ZOOM);
    assert_eq!(view.center, Coordinate::new(55.5 + d_lat, 37.6 + d_lon));
    assert!(view.center.latitude > 55.5);
    assert_eq!(view.marker, Some(MarkerPoint::at(view.center)));
    assert_eq!(harness.fetch_count(), 3);
}

#[tokio::test]
async fn test_click_outside_image_is_ignored() {
    let mut harness = harness();
    submit_coords(&mut harness, "55.5", "37.6", false).await;

    for (x, y) in [(-1.0, 10.0), (451.0, 10.0), (10.0, 450.5)] {
        let outcome = harness
            .controller
            .handle(NavigationIntent::ClickAt { x, y })
            .await
            .unwrap();
        assert_eq!(outcome, Outcome::Unchanged);
    }
    assert_eq!(harness.fetch_count(), 1);
}

#[tokio::test]
async fn test_failed_fetch_clears_snapshot_and_recovers() {
    let mut harness = harness();
    submit_coords(&mut harness, "55.5", "37.6", false).await;
    assert!(matches!(
        harness.controller.phase(),
        EnginePhase::Displaying(_)
    ));

    harness.failing.store(true, Ordering::SeqCst);
    let error = harness
        .controller
        .handle(NavigationIntent::Zoom(ZoomStep::In))
        .await
        .unwrap_err();
    assert_eq!(
        error,
        EngineError::Fetch(FetchError::UpstreamRejected { status: 502 })
    );
    assert_eq!(error.user_message(), "The map service rejected the request.");

    // The snapshot goes with the image; only the diagnostic payload keeps
    // the old view. The zoom setting is not rolled back.
    assert!(matches!(
        harness.controller.phase(),
        EnginePhase::Error(Some(_))
    ));
    assert_eq!(harness.controller.current_view(), None);
    assert_eq!(harness.controller.zoom_setting(), constants::DEFAULT_ZOOM + 1);

    harness.failing.store(false, Ordering::SeqCst);
    let (view, _) = rendered(submit_coords(&mut harness, "55.5", "37.6", false).await);
    assert_eq!(view.zoom, constants::DEFAULT_ZOOM + 1);
    assert!(matches!(
        harness.controller.phase(),
        EnginePhase::Displaying(_)
    ));
}

#[tokio::test]
async fn test_failed_fetch_after_resolution_keeps_the_address() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        ..Script::default()
    });
    harness.failing.store(true, Ordering::SeqCst);

    let error = harness
        .controller
        .handle(NavigationIntent::SubmitText {
            text: "Красная площадь".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(error, EngineError::Fetch(_)));
    assert_eq!(harness.search_count(), 1);
    assert_eq!(harness.fetch_count(), 1);

    // The resolution already happened, so the address details stay; only
    // the image and its snapshot are gone.
    assert_eq!(harness.controller.current_view(), None);
    assert_eq!(
        harness.controller.status_line(),
        Some("Москва, Красная площадь".to_string())
    );
}

#[tokio::test]
async fn test_submit_routes_by_placeholder() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        ..Script::default()
    });

    // Placeholder text in the address field: the coordinate fields win and
    // the search service is never asked.
    let outcome = harness
        .controller
        .handle(NavigationIntent::Submit {
            address: constants::ADDRESS_PLACEHOLDER.to_string(),
            latitude: "55,75".to_string(),
            longitude: "37,62".to_string(),
        })
        .await
        .unwrap();
    let (view, _) = rendered(outcome);
    assert_eq!(view.center, Coordinate::new(55.75, 37.62));
    assert_eq!(view.marker, Some(MarkerPoint::at(view.center)));
    assert_eq!(harness.search_count(), 0);

    // Real text routes to the search pipeline; the coordinate fields are
    // not even parsed.
    let outcome = harness
        .controller
        .handle(NavigationIntent::Submit {
            address: "Красная площадь".to_string(),
            latitude: String::new(),
            longitude: String::new(),
        })
        .await
        .unwrap();
    let (view, _) = rendered(outcome);
    assert_eq!(view.center, red_square_hit().coordinate);
    assert_eq!(harness.search_count(), 1);
    assert_eq!(
        harness.controller.status_line(),
        Some("Москва, Красная площадь".to_string())
    );
}

#[tokio::test]
async fn test_blank_query_fails_without_requests() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        ..Script::default()
    });

    let error = harness
        .controller
        .handle(NavigationIntent::SubmitText {
            text: "   ".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(error, EngineError::Resolve(ResolveError::NoMatch));
    assert_eq!(
        error.user_message(),
        "Nothing was found. The address is probably wrong."
    );
    assert_eq!(harness.search_count(), 0);
    assert_eq!(harness.geocoder_count(), 0);
    assert_eq!(harness.fetch_count(), 0);
}

#[tokio::test]
async fn test_locate_nearest_recenters_on_organisation() {
    let mut harness = harness_with(Script {
        organisation: Some(museum()),
        ..Script::default()
    });

    // Idle: nothing to anchor the search at.
    let outcome = harness
        .controller
        .handle(NavigationIntent::LocateNearest)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(harness.search_count(), 0);

    submit_coords(&mut harness, "55,75", "37,62", true).await;
    let (view, _) = rendered(
        harness
            .controller
            .handle(NavigationIntent::LocateNearest)
            .await
            .unwrap(),
    );
    assert_eq!(view.center, museum().coordinate);
    assert_eq!(view.marker, Some(MarkerPoint::at(museum().coordinate)));
    assert_eq!(harness.controller.status_line(), Some(museum().describe()));
    // No address was stored before, so the anchor itself was the query.
    assert_eq!(*harness.nearest_queries.lock().unwrap(), vec![None]);
    assert_eq!(harness.fetch_count(), 2);
}

#[tokio::test]
async fn test_locate_nearest_uses_the_stored_address_line() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        organisation: Some(museum()),
        ..Script::default()
    });

    harness
        .controller
        .handle(NavigationIntent::SubmitText {
            text: "Красная площадь".to_string(),
        })
        .await
        .unwrap();
    harness
        .controller
        .handle(NavigationIntent::LocateNearest)
        .await
        .unwrap();

    assert_eq!(
        *harness.nearest_queries.lock().unwrap(),
        vec![Some("Москва, Красная площадь".to_string())]
    );
}

#[tokio::test]
async fn test_postal_code_is_fetched_lazily() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        postal_code: Some("109012".to_string()),
        ..Script::default()
    });

    harness
        .controller
        .handle(NavigationIntent::SubmitText {
            text: "Красная площадь".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(harness.geocoder_count(), 0);

    // Toggling on asks the geocoder once and keeps the answer.
    let outcome = harness
        .controller
        .handle(NavigationIntent::TogglePostalCode)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Unchanged);
    assert_eq!(harness.geocoder_count(), 1);
    assert!(harness.controller.postal_code_enabled());
    assert_eq!(
        harness.controller.status_line(),
        Some("Москва, Красная площадь, postal code: 109012".to_string())
    );

    harness
        .controller
        .handle(NavigationIntent::TogglePostalCode)
        .await
        .unwrap();
    assert_eq!(
        harness.controller.status_line(),
        Some("Москва, Красная площадь".to_string())
    );

    harness
        .controller
        .handle(NavigationIntent::TogglePostalCode)
        .await
        .unwrap();
    assert_eq!(harness.geocoder_count(), 1);
}

#[tokio::test]
async fn test_postal_preference_applies_to_later_submits() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        postal_code: Some("109012".to_string()),
        ..Script::default()
    });

    // Toggling with no address stored only flips the preference.
    harness
        .controller
        .handle(NavigationIntent::TogglePostalCode)
        .await
        .unwrap();
    assert_eq!(harness.geocoder_count(), 0);

    // A later text submit enriches inline.
    harness
        .controller
        .handle(NavigationIntent::SubmitText {
            text: "Красная площадь".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(harness.geocoder_count(), 1);
    assert_eq!(
        harness.controller.status_line(),
        Some("Москва, Красная площадь, postal code: 109012".to_string())
    );
}

#[tokio::test]
async fn test_clear_returns_to_placeholder() {
    let mut harness = harness_with(Script {
        hit: Some(red_square_hit()),
        ..Script::default()
    });

    harness
        .controller
        .handle(NavigationIntent::SubmitText {
            text: "Красная площадь".to_string(),
        })
        .await
        .unwrap();
    harness
        .controller
        .handle(NavigationIntent::Zoom(ZoomStep::Out))
        .await
        .unwrap();
    harness
        .controller
        .handle(NavigationIntent::TogglePostalCode)
        .await
        .unwrap();

    let outcome = harness
        .controller
        .handle(NavigationIntent::Clear)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Cleared);
    assert_eq!(*harness.controller.phase(), EnginePhase::Idle);
    assert_eq!(harness.controller.current_view(), None);
    assert_eq!(harness.controller.status_line(), None);
    assert_eq!(harness.controller.zoom_setting(), constants::DEFAULT_ZOOM);
    // Presentation preferences survive a clear.
    assert!(harness.controller.postal_code_enabled());
}

#[test]
fn test_user_messages_are_fixed_per_kind() {
    assert_eq!(ERROR_TITLE, "Error");
    assert_eq!(
        EngineError::from(CoordinateError::NotANumber).user_message(),
        "Invalid latitude or longitude values."
    );
    assert_eq!(
        EngineError::from(ResolveError::NoMatch).user_message(),
        "Nothing was found. The address is probably wrong."
    );
    assert_eq!(
        EngineError::from(FetchError::Unreachable("timed out".to_string())).user_message(),
        "The map service could not be reached."
    );
    assert_eq!(
        EngineError::from(ResolveError::UpstreamRejected { status: 403 }).user_message(),
        "The map service rejected the request."
    );
    assert_eq!(
        EngineError::from(ResolveError::MalformedResponse("feature collection")).user_message(),
        "The map service returned an unexpected response."
    );
}
