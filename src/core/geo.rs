use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::constants::{PAN_SCALE_LAT, PAN_SCALE_LON};

/// Serviceable band of the static-map renderer, applied to the truncated
/// integer value of a coordinate.
const LAT_BOUND: f64 = 85.0;
const LON_BOUND: f64 = 180.0;

/// Why a typed coordinate was refused before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The text did not parse as a decimal number.
    #[error("latitude and longitude must be decimal numbers")]
    NotANumber,
    /// Truncated latitude fell outside [-85, 85].
    #[error("latitude {0} is outside the serviceable range")]
    LatitudeOutOfRange(f64),
    /// Truncated longitude fell outside [-180, 180].
    #[error("longitude {0} is outside the serviceable range")]
    LongitudeOutOfRange(f64),
}

/// A geographical coordinate with latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without range checks. Pan and click math produce
    /// transient out-of-range values on purpose; they are validated against
    /// the serviceable range before any fetch.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Admits user-typed latitude/longitude text.
    ///
    /// Decimal commas are normalized to dots before parsing, then both values
    /// go through the truncated-integer range check: `trunc(lat)` must lie in
    /// [-85, 85] and `trunc(lon)` in [-180, 180]. The fractional part is not
    /// checked, so `85.9` is admitted while `86` is not.
    pub fn from_user_input(lat: &str, lon: &str) -> Result<Self, CoordinateError> {
        let latitude = parse_decimal(lat)?;
        let longitude = parse_decimal(lon)?;
        Self::new(latitude, longitude).validate_service_range()
    }

    /// Applies the truncated-integer range check, returning the coordinate
    /// unchanged when it is serviceable.
    pub fn validate_service_range(self) -> Result<Self, CoordinateError> {
        if !truncated_in_range(self.latitude, LAT_BOUND) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !truncated_in_range(self.longitude, LON_BOUND) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(self)
    }

    /// Whether the coordinate passes the truncated-integer range check.
    pub fn is_within_service_range(&self) -> bool {
        truncated_in_range(self.latitude, LAT_BOUND)
            && truncated_in_range(self.longitude, LON_BOUND)
    }

    /// Formats as the `{lon},{lat}` pair the map services expect.
    pub fn as_lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Axis selector for [`key_step_delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

/// Converts a pixel offset into geodetic deltas at the given zoom.
///
/// `d_lat = -pixel_dy * 15.5 / 2^(zoom+4)` and
/// `d_lon = pixel_dx * 22 / 2^(zoom+4)`; the latitude sign is inverted
/// because increasing pixel-y moves south on the image.
pub fn pan_delta(pixel_dx: f64, pixel_dy: f64, zoom: u8) -> (f64, f64) {
    let scale = 2_f64.powi(zoom as i32 + 4);
    let d_lat = -pixel_dy * PAN_SCALE_LAT / scale;
    let d_lon = pixel_dx * PAN_SCALE_LON / scale;
    (d_lat, d_lon)
}

/// Angular distance of one discrete keyboard nudge at the given zoom:
/// `90 / 2^zoom` degrees along latitude, `180 / 2^zoom` along longitude.
pub fn key_step_delta(axis: Axis, zoom: u8) -> f64 {
    let scale = 2_f64.powi(zoom as i32);
    match axis {
        Axis::Latitude => 90.0 / scale,
        Axis::Longitude => 180.0 / scale,
    }
}

/// Wraps a longitude that ran off either edge back onto the map:
/// `lon <= -180` becomes `180 - (|lon| mod 180)` and `lon >= 180` becomes
/// `-180 + (lon mod 180)`; anything in between passes through.
pub fn normalize_longitude(lon: f64) -> f64 {
    if lon <= -180.0 {
        180.0 - lon.abs() % 180.0
    } else if lon >= 180.0 {
        -180.0 + lon % 180.0
    } else {
        lon
    }
}

/// Wraps a latitude with the same modulus rule bounded at 90 degrees.
///
/// The wrap is purely numeric: panning across a pole re-enters on the same
/// meridian instead of mirroring the longitude by 180 degrees, so polar
/// navigation is discontinuous. Kept as-is; the serviceable range check
/// stops most polar views before a fetch anyway.
pub fn normalize_latitude(lat: f64) -> f64 {
    if lat <= -90.0 {
        90.0 - lat.abs() % 90.0
    } else if lat >= 90.0 {
        -90.0 + lat % 90.0
    } else {
        lat
    }
}

fn parse_decimal(text: &str) -> Result<f64, CoordinateError> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| CoordinateError::NotANumber)
}

fn truncated_in_range(value: f64, bound: f64) -> bool {
    value.is_finite() && value.trunc().abs() <= bound
}
