//! Geographic utilities: surface distance, 3D displacement and speed.
//!
//! All distances are meters and all speeds are meters per second.

use geo::{Distance, Geodesic};

use crate::TrackPoint;

/// Geodesic (WGS84 ellipsoid) surface distance between two points in meters.
///
/// Elevation is ignored.
pub fn horizontal_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    Geodesic::distance(a.to_point(), b.to_point())
}

/// 3D displacement in meters: the Euclidean norm of the surface distance
/// and the elevation difference.
///
/// # Example
/// ```
/// use chrono::DateTime;
/// use speedline::{displacement, TrackPoint};
///
/// let t = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z").unwrap();
/// let base = TrackPoint::new(40.0, -105.0, 1600.0, t);
/// let above = TrackPoint::new(40.0, -105.0, 1630.0, t);
/// assert!((displacement(&base, &above) - 30.0).abs() < 1e-9);
/// ```
pub fn displacement(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let horizontal = horizontal_distance(a, b);
    let vertical = a.elevation - b.elevation;
    horizontal.hypot(vertical)
}

/// Absolute time between two points in seconds.
pub fn time_delta_seconds(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let delta = a.time.signed_duration_since(b.time);
    match delta.num_microseconds() {
        Some(us) => us.abs() as f64 / 1_000_000.0,
        None => delta.num_milliseconds().abs() as f64 / 1000.0,
    }
}

/// Average speed between two points in m/s.
///
/// Returns 0 when both points share a timestamp.
pub fn average_speed(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let seconds = time_delta_seconds(a, b);
    if seconds == 0.0 {
        return 0.0;
    }
    displacement(a, b) / seconds
}

/// Convert m/s to miles per hour.
pub fn mps_to_mph(speed: f64) -> f64 {
    speed * 3600.0 / crate::METERS_PER_MILE
}
