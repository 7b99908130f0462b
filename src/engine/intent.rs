use crate::core::constants::MAP_IMAGE_SIZE;

/// One user gesture, already translated out of the host toolkit's event
/// vocabulary by the shell.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationIntent {
    /// The shell's single submit action, carrying the raw contents of the
    /// address field and both coordinate fields. A blank or placeholder
    /// address routes to the coordinate path with a fresh pin; anything else
    /// goes through the search pipeline.
    Submit {
        address: String,
        latitude: String,
        longitude: String,
    },
    /// Resolve free text through the search pipeline.
    SubmitText { text: String },
    /// Show the typed coordinates; `pin` drops a marker on them.
    SubmitCoordinates {
        latitude: String,
        longitude: String,
        pin: bool,
    },
    /// One zoom step on the current view.
    Zoom(ZoomStep),
    /// One keyboard nudge of the current view.
    Pan(PanDirection),
    /// A click at image-relative pixel coordinates, origin top-left.
    ClickAt { x: f64, y: f64 },
    /// Switch between the light and dark map.
    ToggleTheme,
    /// Show or hide the postal code on the status line.
    TogglePostalCode,
    /// Find one organisation near the current view center.
    LocateNearest,
    /// Back to the placeholder; forget the view and the address details.
    Clear,
}

/// Direction of one arrow-key pan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    North,
    South,
    East,
    West,
}

/// Direction of one zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStep {
    In,
    Out,
}

impl ZoomStep {
    /// Signed step applied to the zoom setting.
    pub fn delta(&self) -> i8 {
        match self {
            ZoomStep::In => 1,
            ZoomStep::Out => -1,
        }
    }
}

/// Whether an image-relative click position lies inside the map image.
pub fn within_image(x: f64, y: f64) -> bool {
    let size = MAP_IMAGE_SIZE as f64;
    (0.0..=size).contains(&x) && (0.0..=size).contains(&y)
}
