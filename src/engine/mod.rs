//! The navigation state machine and the intent/pipeline types around it.

pub mod controller;
pub mod intent;
pub mod pipeline;

// Re-export the essential types
pub use controller::{EnginePhase, NavigationController, Outcome};
pub use intent::{within_image, NavigationIntent, PanDirection, ZoomStep};
pub use pipeline::{AddressDetails, PlaceMatch, ResolutionPipeline};
