//! # Algorithm Toolbox
//!
//! Direct access to the building blocks of the pipeline, for callers who
//! want to combine them differently than [`crate::run`] does.
//!
//! ## Core Algorithms
//!
//! - **Segmentation**: anchor-based grouping with a distance threshold
//! - **Speed Normalization**: percentile bounds over consecutive-pair speeds
//! - **Color Mapping**: clamped red-to-green gradient
//!
//! ## Geographic Utilities
//!
//! - **Horizontal Distance**: geodesic distance on the WGS84 ellipsoid
//! - **Displacement**: horizontal and vertical distance combined
//! - **Average Speed**: displacement over absolute time delta
//!
//! # Example
//!
//! ```rust
//! use chrono::DateTime;
//! use speedline::algorithms::{displacement, horizontal_distance, TrackPoint};
//!
//! let t = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z").unwrap();
//! let denver = TrackPoint::new(39.7392, -104.9903, 1609.0, t);
//! let boulder = TrackPoint::new(40.0150, -105.2705, 1655.0, t);
//!
//! let flat = horizontal_distance(&denver, &boulder);
//! let full = displacement(&denver, &boulder);
//! assert!(full >= flat);
//! println!("Denver to Boulder: {:.1} km", full / 1000.0);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{Segment, SpeedBounds, SpeedlineConfig, Track, TrackPoint};

// =============================================================================
// Geographic Utilities
// =============================================================================

pub use crate::geo_utils::{
    average_speed, displacement, horizontal_distance, mps_to_mph, time_delta_seconds,
};

// =============================================================================
// Segmentation
// =============================================================================

/// Partition a track into threshold-bounded segments.
///
/// Algorithm:
/// 1. The first point is the anchor of the first segment
/// 2. A point within the threshold of the anchor joins the current segment
/// 3. A point farther than the threshold closes the current segment before
///    it; the next segment starts at the closed segment's last point and the
///    breaching point becomes the new anchor
pub use crate::segmenter::segment_track;

// =============================================================================
// Speed Normalization
// =============================================================================

/// Speeds between consecutive points.
pub use crate::normalizer::pairwise_speeds;
/// Linear-interpolation percentile.
pub use crate::normalizer::percentile;
/// Low/high percentile speed bounds of a track.
pub use crate::normalizer::speed_bounds;

// =============================================================================
// Color Mapping
// =============================================================================

pub use crate::color::{color_for_speed, Color, ColorScale, RatioMode};

/// Speed of every segment, first point to last.
///
/// # Example
/// ```rust
/// use chrono::{DateTime, Duration};
/// use speedline::algorithms::{segment_speeds, segment_track, SpeedlineConfig, Track, TrackPoint};
///
/// let t = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z").unwrap();
/// let track = Track::new(vec![
///     TrackPoint::new(40.0, -105.0, 1600.0, t),
///     TrackPoint::new(40.01, -105.0, 1600.0, t + Duration::minutes(2)),
/// ])
/// .unwrap();
///
/// let segments = segment_track(&track, &SpeedlineConfig::default()).unwrap();
/// let speeds = segment_speeds(&segments);
/// assert_eq!(speeds.len(), segments.len());
/// ```
pub fn segment_speeds(segments: &[Segment]) -> Vec<f64> {
    segments.iter().map(Segment::average_speed).collect()
}
