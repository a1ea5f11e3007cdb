//! Geodesic primitives: coordinates, great-circle distance, display labels.
//!
//! Distances are metres. An unknown distance is represented by
//! [`f64::INFINITY`] so that it orders after every known distance under
//! [`f64::total_cmp`]; formatters render it as [`UNKNOWN_LABEL`] instead of
//! failing.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Average walking speed in metres per minute.
pub const WALK_SPEED_METERS_PER_MINUTE: f64 = 80.0;

/// Placeholder rendered when a distance or ETA cannot be computed.
pub const UNKNOWN_LABEL: &str = "--";

/// A WGS84 position in decimal degrees.
///
/// Coordinates are immutable; a new device fix produces a new value rather
/// than mutating an old one.
///
/// # Examples
/// ```
/// use dashboard::domain::Coordinate;
///
/// let origin = Coordinate::new(40.0, -73.0);
/// assert!(origin.is_finite());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl Coordinate {
    /// Construct a coordinate from latitude-first degrees.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Great-circle distance between two coordinates in metres.
///
/// Returns a non-negative finite number for two finite coordinates.
///
/// # Examples
/// ```
/// use dashboard::domain::{distance, Coordinate};
///
/// let a = Coordinate::new(40.0, -73.0);
/// let b = Coordinate::new(40.001, -73.0);
/// let metres = distance(a, b);
/// assert!((metres - 111.2).abs() < 1.0);
/// ```
#[must_use]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return f64::INFINITY;
    }
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_METERS * 2.0 * h.sqrt().asin()
}

/// Distance from an optional origin, [`f64::INFINITY`] when absent.
#[must_use]
pub fn distance_from(origin: Option<Coordinate>, point: Coordinate) -> f64 {
    origin.map_or(f64::INFINITY, |from| distance(from, point))
}

/// Render metres for display: integer metres below one kilometre, one-decimal
/// kilometres at or above it, [`UNKNOWN_LABEL`] for non-finite input.
///
/// # Examples
/// ```
/// use dashboard::domain::format_distance;
///
/// assert_eq!(format_distance(999.0), "999 m");
/// assert_eq!(format_distance(1000.0), "1.0 km");
/// assert_eq!(format_distance(f64::INFINITY), "--");
/// ```
#[must_use]
pub fn format_distance(meters: f64) -> String {
    if !meters.is_finite() {
        return UNKNOWN_LABEL.to_owned();
    }
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

/// Estimated walking time in whole minutes, never below one.
///
/// Returns `None` for a non-finite distance.
#[must_use]
pub fn estimate_walk_minutes(meters: f64) -> Option<u64> {
    if !meters.is_finite() {
        return None;
    }
    let minutes = (meters / WALK_SPEED_METERS_PER_MINUTE).round() as u64;
    Some(minutes.max(1))
}

/// Render the walking estimate, e.g. `"~2 min walk"`.
///
/// # Examples
/// ```
/// use dashboard::domain::format_walk_eta;
///
/// assert_eq!(format_walk_eta(111.0), "~1 min walk");
/// assert_eq!(format_walk_eta(f64::NAN), "--");
/// ```
#[must_use]
pub fn format_walk_eta(meters: f64) -> String {
    estimate_walk_minutes(meters)
        .map_or_else(|| UNKNOWN_LABEL.to_owned(), |m| format!("~{m} min walk"))
}
