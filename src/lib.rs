//! # Speedline
//!
//! Split a GPS track into spatially coherent segments and color each segment
//! by the average speed travelled along it.
//!
//! This library provides:
//! - 3D displacement (geodesic surface distance plus elevation change)
//! - Anchor-based segmentation of a track with a distance threshold
//! - Percentile speed bounds over the whole track
//! - A red-to-green color gradient for per-segment speeds
//! - GPX reading and KML/JSON overlay rendering
//!
//! ## Features
//!
//! - **`parallel`** - Run segmentation and speed normalization concurrently with rayon
//! - **`cli`** - Build the `speedline` command-line binary (enabled by default)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{DateTime, Duration};
//! use speedline::{run, SpeedlineConfig, Track, TrackPoint};
//!
//! let start = DateTime::parse_from_rfc3339("2024-05-01T15:00:00Z").unwrap();
//! let points: Vec<TrackPoint> = (0..20)
//!     .map(|i| {
//!         TrackPoint::new(
//!             40.0 + i as f64 * 0.001,
//!             -105.0,
//!             1600.0,
//!             start + Duration::seconds(i * 30),
//!         )
//!     })
//!     .collect();
//!
//! let track = Track::new(points).unwrap();
//! let segments = run(&track, &SpeedlineConfig::default()).unwrap();
//! for colored in &segments {
//!     println!("{} -> #{}", colored.label(), colored.color.to_rgba_hex());
//! }
//! ```

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, SpeedlineError, Stage};

// Geographic utilities (displacement, speed)
pub mod geo_utils;
pub use geo_utils::{average_speed, displacement, horizontal_distance};

// Anchor-based track segmentation
pub mod segmenter;
pub use segmenter::segment_track;

// Percentile speed bounds
pub mod normalizer;
pub use normalizer::{pairwise_speeds, percentile, speed_bounds};

// Speed to color mapping
pub mod color;
pub use color::{color_for_speed, Color, ColorScale, RatioMode};

// Per-segment summary labels
pub mod summary;
pub use summary::SegmentSummary;

// End-to-end pipeline
pub mod pipeline;
pub use pipeline::{build_report, process_gpx, run, ColoredSegment, TrackReport};

// GPX point source
pub mod source;
pub use source::parse_gpx;

// KML / JSON overlay writers
pub mod render;
pub use render::{JsonRenderer, KmlRenderer, OverlayRenderer};

// Algorithm toolbox - standalone access to the building blocks
pub mod algorithms;

// ============================================================================
// Constants
// ============================================================================

/// Meters in one statute mile.
pub const METERS_PER_MILE: f64 = 1609.344;

/// Default segmentation threshold: a quarter mile.
pub const DEFAULT_SEGMENT_THRESHOLD_METERS: f64 = METERS_PER_MILE / 4.0;

/// Default label offset in minutes (UTC-07:00).
pub const DEFAULT_DISPLAY_OFFSET_MINUTES: i32 = -7 * 60;

// ============================================================================
// Core Types
// ============================================================================

/// One sampled track point.
///
/// # Example
/// ```
/// use chrono::DateTime;
/// use speedline::TrackPoint;
///
/// let time = DateTime::parse_from_rfc3339("2024-05-01T09:00:00-06:00").unwrap();
/// let point = TrackPoint::new(39.7392, -104.9903, 1609.0, time);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters
    pub elevation: f64,
    pub time: DateTime<FixedOffset>,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(latitude: f64, longitude: f64, elevation: f64, time: DateTime<FixedOffset>) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            time,
        }
    }

    /// Check if the point has valid coordinates and a finite elevation.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.elevation.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Surface position as a geo point (x = longitude, y = latitude).
    pub fn to_point(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }
}

/// The full ordered sequence of points for one run.
///
/// A track may be empty; the stage that needs points reports it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Track {
    points: Vec<TrackPoint>,
}

impl Track {
    /// Build a track, rejecting invalid coordinates and timestamps that go
    /// backwards. Equal consecutive timestamps are accepted.
    pub fn new(points: Vec<TrackPoint>) -> Result<Self> {
        for (index, point) in points.iter().enumerate() {
            if !point.is_valid() {
                return Err(SpeedlineError::InvalidCoordinates {
                    index,
                    latitude: point.latitude,
                    longitude: point.longitude,
                });
            }
        }

        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[1].time < pair[0].time)
        {
            return Err(SpeedlineError::OutOfOrder { index: index + 1 });
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A non-empty run of consecutive track points.
///
/// Adjacent segments share one boundary point: the last point of one segment
/// is the first point of the next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Index of the first point within the source track
    start_index: usize,
    points: Vec<TrackPoint>,
}

impl Segment {
    /// Callers guarantee `points` is non-empty.
    pub(crate) fn new(start_index: usize, points: Vec<TrackPoint>) -> Self {
        debug_assert!(!points.is_empty());
        Self {
            start_index,
            points,
        }
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn first(&self) -> &TrackPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &TrackPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// A constructed segment always holds at least one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first point within the source track.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Index of the last point within the source track.
    pub fn end_index(&self) -> usize {
        self.start_index + self.points.len() - 1
    }

    /// Whole-segment average speed in m/s (first to last point).
    pub fn average_speed(&self) -> f64 {
        average_speed(self.first(), self.last())
    }
}

/// 10th/90th percentile (by default) of consecutive-pair speeds, in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedBounds {
    pub low: f64,
    pub high: f64,
}

impl SpeedBounds {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Width of the gradient domain.
    pub fn span(&self) -> f64 {
        self.high - self.low
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for segmentation, normalization and coloring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedlineConfig {
    /// Maximum displacement from a segment's anchor before the segment closes.
    /// Default: 402.336 meters (a quarter mile)
    pub segment_threshold_meters: f64,

    /// Percentile of pairwise speeds mapped to pure red.
    /// Default: 10.0
    pub low_percentile: f64,

    /// Percentile of pairwise speeds mapped to pure green.
    /// Default: 90.0
    pub high_percentile: f64,

    /// Top of the color channel range.
    /// Default: 255
    pub max_channel: u8,

    /// How a clamped speed is turned into a gradient ratio.
    /// Default: min-max normalization
    pub ratio_mode: RatioMode,

    /// UTC offset, in minutes, used for label start times.
    /// Default: -420 (UTC-07:00)
    pub display_offset_minutes: i32,
}

impl Default for SpeedlineConfig {
    fn default() -> Self {
        Self {
            segment_threshold_meters: DEFAULT_SEGMENT_THRESHOLD_METERS,
            low_percentile: 10.0,
            high_percentile: 90.0,
            max_channel: u8::MAX,
            ratio_mode: RatioMode::default(),
            display_offset_minutes: DEFAULT_DISPLAY_OFFSET_MINUTES,
        }
    }
}

impl SpeedlineConfig {
    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.segment_threshold_meters.is_finite() || self.segment_threshold_meters <= 0.0 {
            return Err(SpeedlineError::ConfigError {
                message: format!(
                    "segment threshold must be a positive distance, got {}",
                    self.segment_threshold_meters
                ),
            });
        }

        for p in [self.low_percentile, self.high_percentile] {
            if !(0.0..=100.0).contains(&p) {
                return Err(SpeedlineError::ConfigError {
                    message: format!("percentile {} is outside [0, 100]", p),
                });
            }
        }

        if self.low_percentile > self.high_percentile {
            return Err(SpeedlineError::ConfigError {
                message: format!(
                    "low percentile {} exceeds high percentile {}",
                    self.low_percentile, self.high_percentile
                ),
            });
        }

        self.display_offset().map(|_| ())
    }

    /// The label offset as a chrono offset.
    pub fn display_offset(&self) -> Result<FixedOffset> {
        self.display_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_config("display offset must be within +/-24 hours")
    }
}

// ============================================================================
// Tests
// ============================================================================
