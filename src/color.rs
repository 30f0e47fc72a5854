//! Speed to color mapping on a red (slow) to green (fast) gradient.

use serde::{Deserialize, Serialize};

use crate::{SpeedBounds, SpeedlineConfig};

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// KML color string: `aabbggrr`, lowercase hex.
    pub fn to_kml_hex(&self) -> String {
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            self.alpha, self.blue, self.green, self.red
        )
    }

    /// Conventional `rrggbbaa` hex string.
    pub fn to_rgba_hex(&self) -> String {
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            self.red, self.green, self.blue, self.alpha
        )
    }
}

/// How a clamped speed becomes a position on the gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatioMode {
    /// `(speed - low) / (high - low)`: `low` is pure red, `high` pure green.
    #[default]
    MinMax,
    /// `speed / high`: the lower bound only clamps, so `low` maps to a
    /// red-green mix unless it is zero.
    FixedDenominator,
}

/// A gradient bound to one track's speed distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub bounds: SpeedBounds,
    pub mode: RatioMode,
    pub max_channel: u8,
}

impl ColorScale {
    pub fn new(bounds: SpeedBounds, mode: RatioMode, max_channel: u8) -> Self {
        Self {
            bounds,
            mode,
            max_channel,
        }
    }

    pub fn from_config(bounds: SpeedBounds, config: &SpeedlineConfig) -> Self {
        Self::new(bounds, config.ratio_mode, config.max_channel)
    }

    /// Position of `speed` on the gradient, in `[0, 1]`.
    ///
    /// Equal bounds give 1 (fully green).
    pub fn ratio(&self, speed: f64) -> f64 {
        let SpeedBounds { low, high } = self.bounds;
        if high == low {
            return 1.0;
        }

        // f64::clamp panics when low > high
        let clamped = speed.max(low).min(high);
        let ratio = match self.mode {
            RatioMode::MinMax => (clamped - low) / (high - low),
            RatioMode::FixedDenominator => clamped / high,
        };
        ratio.clamp(0.0, 1.0)
    }

    pub fn color_for(&self, speed: f64) -> Color {
        let ratio = self.ratio(speed);
        let max = self.max_channel as f64;
        Color {
            red: ((1.0 - ratio) * max).round() as u8,
            green: (ratio * max).round() as u8,
            blue: 0,
            alpha: self.max_channel,
        }
    }
}

/// Color for `speed` with min-max normalization and full 0-255 channels.
///
/// # Example
/// ```
/// use speedline::{color_for_speed, Color, SpeedBounds};
///
/// let bounds = SpeedBounds::new(2.0, 8.0);
/// assert_eq!(color_for_speed(2.0, &bounds), Color::new(255, 0, 0, 255));
/// assert_eq!(color_for_speed(8.0, &bounds), Color::new(0, 255, 0, 255));
/// ```
pub fn color_for_speed(speed: f64, bounds: &SpeedBounds) -> Color {
    ColorScale::new(*bounds, RatioMode::MinMax, u8::MAX).color_for(speed)
}
