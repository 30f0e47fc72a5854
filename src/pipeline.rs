//! End-to-end pipeline: segment a track, normalize its speeds, then color
//! and label every segment.
//!
//! Segmentation and normalization are independent read-only passes over the
//! same track. With the `parallel` feature they run concurrently on the
//! rayon pool; otherwise one after the other.

use log::{debug, info};
use serde::Serialize;

use crate::color::{Color, ColorScale};
use crate::error::Result;
use crate::normalizer::speed_bounds;
use crate::segmenter::segment_track;
use crate::source::parse_gpx;
use crate::summary::SegmentSummary;
use crate::{Segment, SpeedBounds, SpeedlineConfig, Track};

/// A segment with its gradient color and summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoredSegment {
    pub segment: Segment,
    pub color: Color,
    pub summary: SegmentSummary,
}

impl ColoredSegment {
    /// Human-readable summary text for this segment.
    pub fn label(&self) -> String {
        self.summary.to_string()
    }
}

/// Everything a renderer needs for one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    pub bounds: SpeedBounds,
    pub segments: Vec<ColoredSegment>,
}

/// Run the pipeline and return the ordered (segment, color, summary) list.
pub fn run(track: &Track, config: &SpeedlineConfig) -> Result<Vec<ColoredSegment>> {
    build_report(track, config).map(|report| report.segments)
}

/// Run the pipeline, keeping the speed bounds alongside the segments.
///
/// Segmentation errors take precedence over normalization errors.
pub fn build_report(track: &Track, config: &SpeedlineConfig) -> Result<TrackReport> {
    config.validate()?;
    let display_offset = config.display_offset()?;

    #[cfg(feature = "parallel")]
    let (segments, bounds) = rayon::join(
        || segment_track(track, config),
        || speed_bounds(track, config),
    );
    #[cfg(not(feature = "parallel"))]
    let (segments, bounds) = (segment_track(track, config), speed_bounds(track, config));

    let segments = segments?;
    let bounds = bounds?;

    let scale = ColorScale::from_config(bounds, config);
    let colored: Vec<ColoredSegment> = segments
        .into_iter()
        .map(|segment| {
            let summary = SegmentSummary::from_segment(&segment, display_offset);
            let color = scale.color_for(summary.average_speed_mps);
            debug!(
                "[Pipeline] Segment {}..={}: {:.2} m/s -> #{}",
                segment.start_index(),
                segment.end_index(),
                summary.average_speed_mps,
                color.to_rgba_hex()
            );
            ColoredSegment {
                segment,
                color,
                summary,
            }
        })
        .collect();

    info!(
        "[Pipeline] Colored {} segments from {} points",
        colored.len(),
        track.len()
    );

    Ok(TrackReport {
        bounds,
        segments: colored,
    })
}

/// Parse a GPX document and run the pipeline over its track points.
pub fn process_gpx(xml: &str, config: &SpeedlineConfig) -> Result<TrackReport> {
    let track = parse_gpx(xml)?;
    build_report(&track, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SpeedlineError, Stage};
    use crate::geo_utils::mps_to_mph;
    use crate::test_support::*;
    use crate::{RatioMode, METERS_PER_MILE};

    fn scenario_track() -> Track {
        let offsets: Vec<f64> = [0.0, 0.1, 0.2, 2.0]
            .iter()
            .map(|m| m * METERS_PER_MILE)
            .collect();
        track_along_line(&offsets)
    }

    #[test]
    fn test_scenario_segments_get_distinct_colors() {
        let report = build_report(&scenario_track(), &SpeedlineConfig::default()).unwrap();

        assert_eq!(report.segments.len(), 2);
        let slow = &report.segments[0];
        let fast = &report.segments[1];
        assert_eq!((slow.segment.start_index(), slow.segment.end_index()), (0, 2));
        assert_eq!((fast.segment.start_index(), fast.segment.end_index()), (2, 3));

        // 0.2 miles in two minutes, then 1.8 miles in one
        assert!((slow.summary.average_speed_mph() - 6.0).abs() < 0.05);
        assert!((fast.summary.average_speed_mph() - 108.0).abs() < 0.1);

        assert_ne!(slow.color, fast.color);
        assert!(slow.color.red > slow.color.green);
        assert!(slow.color.green <= 1);
        assert_eq!(fast.color, Color::new(0, 255, 0, 255));
    }

    #[test]
    fn test_scenario_bounds() {
        let report = build_report(&scenario_track(), &SpeedlineConfig::default()).unwrap();
        // Pairwise speeds are 6, 6 and 108 mph
        assert!((mps_to_mph(report.bounds.low) - 6.0).abs() < 0.05);
        assert!((mps_to_mph(report.bounds.high) - 87.6).abs() < 0.1);
    }

    #[test]
    fn test_run_returns_segments_in_order() {
        let offsets: Vec<f64> = (0..50).map(|i| i as f64 * 90.0).collect();
        let track = track_along_line(&offsets);
        let segments = run(&track, &SpeedlineConfig::default()).unwrap();

        assert!(segments.len() > 2);
        for pair in segments.windows(2) {
            assert_eq!(pair[0].segment.end_index(), pair[1].segment.start_index());
        }
    }

    #[test]
    fn test_empty_track_reports_segmentation() {
        let err = run(&Track::default(), &SpeedlineConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SpeedlineError::EmptyInput {
                stage: Stage::Segmentation
            }
        );
    }

    #[test]
    fn test_single_point_track_fails_normalization() {
        let err = run(&track_along_line(&[0.0]), &SpeedlineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SpeedlineError::InsufficientData {
                stage: Stage::Normalization,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SpeedlineConfig {
            segment_threshold_meters: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            run(&scenario_track(), &config),
            Err(SpeedlineError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_ratio_mode_changes_colors() {
        let min_max = run(&scenario_track(), &SpeedlineConfig::default()).unwrap();
        let fixed = run(
            &scenario_track(),
            &SpeedlineConfig {
                ratio_mode: RatioMode::FixedDenominator,
                ..Default::default()
            },
        )
        .unwrap();

        // The 6 mph segment sits on the lower bound: red only under min-max
        assert!(min_max[0].color.green <= 1);
        assert!(fixed[0].color.green > 10);
        assert_eq!(min_max[1].color, fixed[1].color);
    }
}
