//! Anchor-based track segmentation.
//!
//! A single forward pass groups points into segments. Points join the open
//! segment while their displacement from the anchor stays within the
//! threshold. When a point breaches it, the open segment is closed as it
//! stands and the next one starts from its last point, so adjacent segments
//! share exactly one boundary point. The breaching point becomes the new
//! anchor, which makes the anchor of every later segment its second point.

use log::{debug, info};

use crate::error::{Result, SpeedlineError, Stage};
use crate::geo_utils::displacement;
use crate::{Segment, SpeedlineConfig, Track};

/// Partition a track into segments using `config.segment_threshold_meters`.
///
/// Every segment of a track with two or more points holds at least two
/// points; a single-point track yields one single-point segment.
///
/// # Example
/// ```
/// use chrono::{DateTime, Duration};
/// use speedline::{segment_track, SpeedlineConfig, Track, TrackPoint};
///
/// let t = DateTime::parse_from_rfc3339("2024-05-01T09:00:00Z").unwrap();
/// let track = Track::new(vec![TrackPoint::new(40.0, -105.0, 1600.0, t)]).unwrap();
/// let segments = segment_track(&track, &SpeedlineConfig::default()).unwrap();
/// assert_eq!(segments.len(), 1);
/// assert_eq!(segments[0].len(), 1);
/// ```
pub fn segment_track(track: &Track, config: &SpeedlineConfig) -> Result<Vec<Segment>> {
    let points = track.points();
    let Some(&first) = points.first() else {
        return Err(SpeedlineError::EmptyInput {
            stage: Stage::Segmentation,
        });
    };

    let threshold = config.segment_threshold_meters;
    let mut segments = Vec::new();
    let mut anchor = first;
    let mut start_index = 0;
    let mut current = vec![first];

    for (index, &point) in points.iter().enumerate().skip(1) {
        if displacement(&point, &anchor) > threshold {
            anchor = point;
            // Breach right after the first point: nothing to close yet
            if current.len() > 1 {
                let boundary = current[current.len() - 1];
                debug!(
                    "[Segmenter] Closing segment {}..={} ({} points)",
                    start_index,
                    index - 1,
                    current.len()
                );
                let closed = std::mem::replace(&mut current, vec![boundary]);
                segments.push(Segment::new(start_index, closed));
                start_index = index - 1;
            }
        }
        current.push(point);
    }

    segments.push(Segment::new(start_index, current));

    info!(
        "[Segmenter] Split {} points into {} segments (threshold {:.1}m)",
        points.len(),
        segments.len(),
        threshold
    );

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::TrackPoint;

    fn config_with_threshold(meters: f64) -> SpeedlineConfig {
        SpeedlineConfig {
            segment_threshold_meters: meters,
            ..Default::default()
        }
    }

    fn ranges(segments: &[Segment]) -> Vec<(usize, usize)> {
        segments
            .iter()
            .map(|s| (s.start_index(), s.end_index()))
            .collect()
    }

    /// Drop the shared boundary point from every segment after the first.
    fn reconstruct(segments: &[Segment]) -> Vec<TrackPoint> {
        let mut points = segments[0].points().to_vec();
        for segment in &segments[1..] {
            assert_eq!(segment.first(), points.last().unwrap());
            points.extend_from_slice(&segment.points()[1..]);
        }
        points
    }

    #[test]
    fn test_empty_track_fails() {
        let err = segment_track(&Track::default(), &SpeedlineConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SpeedlineError::EmptyInput {
                stage: Stage::Segmentation
            }
        );
    }

    #[test]
    fn test_single_point_track() {
        let track = track_along_line(&[0.0]);
        let segments = segment_track(&track, &SpeedlineConfig::default()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].points(), track.points());
    }

    #[test]
    fn test_all_points_within_threshold() {
        let track = track_along_line(&[0.0, 50.0, 100.0, 150.0]);
        let segments = segment_track(&track, &config_with_threshold(200.0)).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].len(), 4);
    }

    #[test]
    fn test_quarter_mile_scenario() {
        // 0, 0.1, 0.2 and 2.0 miles along a line
        let miles = [0.0, 0.1, 0.2, 2.0];
        let offsets: Vec<f64> = miles.iter().map(|m| m * crate::METERS_PER_MILE).collect();
        let track = track_along_line(&offsets);

        let segments = segment_track(&track, &SpeedlineConfig::default()).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].points(), &track.points()[0..=2]);
        assert_eq!(segments[1].points(), &track.points()[2..=3]);
        assert_eq!(segments[1].start_index(), 2);
    }

    #[test]
    fn test_anchor_resets_to_breaching_point() {
        // Threshold 100m: 150 breaches from 0 and becomes the anchor.
        // 220 and 240 stay within 100m of 150 (but not of 0); 400 breaches again.
        let track = track_along_line(&[0.0, 60.0, 150.0, 220.0, 240.0, 400.0]);
        let segments = segment_track(&track, &config_with_threshold(100.0)).unwrap();

        assert_eq!(ranges(&segments), vec![(0, 1), (1, 4), (4, 5)]);
    }

    #[test]
    fn test_breach_after_first_point_keeps_going() {
        let track = track_along_line(&[0.0, 500.0, 520.0, 540.0]);
        let segments = segment_track(&track, &config_with_threshold(100.0)).unwrap();

        // No single-point segment at the start; 500 becomes the anchor.
        assert_eq!(ranges(&segments), vec![(0, 3)]);
    }

    #[test]
    fn test_breaching_last_point_has_no_single_point_tail() {
        let track = track_along_line(&[0.0, 40.0, 80.0, 900.0]);
        let segments = segment_track(&track, &config_with_threshold(100.0)).unwrap();

        assert_eq!(ranges(&segments), vec![(0, 2), (2, 3)]);
        assert!(segments.iter().all(|s| s.len() >= 2));
    }

    #[test]
    fn test_segments_reconstruct_track() {
        let offsets: Vec<f64> = (0..40).map(|i| (i as f64 * 37.0) % 500.0 + i as f64 * 20.0).collect();
        let track = track_along_line(&offsets);
        let segments = segment_track(&track, &config_with_threshold(120.0)).unwrap();

        assert!(segments.len() > 1);
        assert_eq!(reconstruct(&segments), track.points());
    }

    #[test]
    fn test_next_point_breaches_threshold() {
        let threshold = 120.0;
        let offsets: Vec<f64> = (0..30).map(|i| i as f64 * 45.0).collect();
        let track = track_along_line(&offsets);
        let points = track.points();
        let segments = segment_track(&track, &config_with_threshold(threshold)).unwrap();
        assert!(segments.len() > 2);

        for (n, segment) in segments.iter().enumerate() {
            // First segment is anchored on its first point, later ones on their second
            let anchor_offset = if n == 0 { 0 } else { 1 };
            let anchor = &segment.points()[anchor_offset];

            for point in &segment.points()[anchor_offset..] {
                assert!(displacement(point, anchor) <= threshold);
            }
            if n + 1 < segments.len() {
                let next = &points[segment.end_index() + 1];
                assert!(displacement(next, anchor) > threshold);
            }
        }
    }

    #[test]
    fn test_elevation_counts_toward_threshold() {
        // 50m north, then climbing 150m in place: only the vertical change breaches 100m.
        let mut points = vec![point_at(0.0, 0), point_at(50.0, 60), point_at(50.0, 120)];
        points[2].elevation += 150.0;
        let track = Track::new(points).unwrap();

        let segments = segment_track(&track, &config_with_threshold(100.0)).unwrap();
        assert_eq!(ranges(&segments), vec![(0, 1), (1, 2)]);
    }
}
