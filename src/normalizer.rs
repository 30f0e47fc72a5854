//! Speed normalization over the whole track.
//!
//! Speeds between every consecutive pair of points are ranked, and two
//! percentiles of that distribution (10th and 90th by default) become the
//! domain of the color gradient.

use log::info;

use crate::error::{Result, SpeedlineError, Stage};
use crate::geo_utils::average_speed;
use crate::{SpeedBounds, SpeedlineConfig, Track};

/// Average speed for every consecutive pair of points, in track order.
///
/// Returns `len - 1` speeds (none for tracks shorter than 2 points).
pub fn pairwise_speeds(track: &Track) -> Vec<f64> {
    track
        .points()
        .windows(2)
        .map(|pair| average_speed(&pair[1], &pair[0]))
        .collect()
}

/// Percentile of `values` using linear interpolation between closest ranks.
///
/// `p` is in `[0, 100]`. Returns `None` for an empty slice.
///
/// # Example
/// ```
/// use speedline::percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(percentile(&values, 50.0), Some(2.5));
/// assert_eq!(percentile(&values, 100.0), Some(4.0));
/// ```
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Compute the speed bounds of a track from its pairwise speeds.
pub fn speed_bounds(track: &Track, config: &SpeedlineConfig) -> Result<SpeedBounds> {
    if track.len() < 2 {
        return Err(SpeedlineError::InsufficientData {
            stage: Stage::Normalization,
            point_count: track.len(),
            minimum_required: 2,
        });
    }

    let speeds = pairwise_speeds(track);
    let low = percentile(&speeds, config.low_percentile).unwrap_or(0.0);
    let high = percentile(&speeds, config.high_percentile).unwrap_or(0.0);

    info!(
        "[Normalizer] {} pairwise speeds, p{}={:.2} m/s, p{}={:.2} m/s",
        speeds.len(),
        config.low_percentile,
        low,
        config.high_percentile,
        high
    );

    Ok(SpeedBounds::new(low, high))
}
