//! Per-segment summary labels.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::geo_utils::{mps_to_mph, time_delta_seconds};
use crate::Segment;

/// Whole-segment statistics shown alongside each colored segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    /// First-to-last average speed in m/s (not a mean of pairwise speeds)
    pub average_speed_mps: f64,
    /// Absolute time between the first and last point, in minutes
    pub time_delta_minutes: f64,
    /// First point's timestamp in the display offset
    pub start_time: DateTime<FixedOffset>,
}

impl SegmentSummary {
    pub fn from_segment(segment: &Segment, display_offset: FixedOffset) -> Self {
        let first = segment.first();
        let last = segment.last();
        Self {
            average_speed_mps: segment.average_speed(),
            time_delta_minutes: time_delta_seconds(first, last) / 60.0,
            start_time: first.time.with_timezone(&display_offset),
        }
    }

    pub fn average_speed_mph(&self) -> f64 {
        mps_to_mph(self.average_speed_mps)
    }
}

impl fmt::Display for SegmentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Average speed {:.2}mph | Time Delta: {:.1}min | Start Time: {}",
            self.average_speed_mph(),
            self.time_delta_minutes,
            self.start_time.format("%Y-%m-%d %H:%M:%S %:z")
        )
    }
}
