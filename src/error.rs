//! Unified error handling for the speedline library.
//!
//! Every fatal condition aborts the whole run, so each variant carries enough
//! context (pipeline stage, point index) to diagnose the input.

use std::fmt;

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parse,
    Segmentation,
    Normalization,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Segmentation => "segmentation",
            Stage::Normalization => "normalization",
            Stage::Render => "render",
        };
        f.write_str(name)
    }
}

/// Unified error type for speedline operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SpeedlineError {
    /// Track has no points at all
    EmptyInput { stage: Stage },
    /// Track has too few points for the stage
    InsufficientData {
        stage: Stage,
        point_count: usize,
        minimum_required: usize,
    },
    /// A point's required fields are missing or unparseable
    MalformedPoint { index: usize, message: String },
    /// A point has out-of-range or non-finite coordinates
    InvalidCoordinates {
        index: usize,
        latitude: f64,
        longitude: f64,
    },
    /// A point's timestamp is earlier than its predecessor's
    OutOfOrder { index: usize },
    /// Configuration error
    ConfigError { message: String },
    /// Overlay rendering failed
    RenderError { message: String },
    /// Reading input or writing output failed
    Io { message: String },
}

impl fmt::Display for SpeedlineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedlineError::EmptyInput { stage } => {
                write!(f, "Track has no points ({} stage)", stage)
            }
            SpeedlineError::InsufficientData {
                stage,
                point_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "Track has {} points, minimum {} required ({} stage)",
                    point_count, minimum_required, stage
                )
            }
            SpeedlineError::MalformedPoint { index, message } => {
                write!(
                    f,
                    "Track point {} is malformed: {} ({} stage)",
                    index,
                    message,
                    Stage::Parse
                )
            }
            SpeedlineError::InvalidCoordinates {
                index,
                latitude,
                longitude,
            } => {
                write!(
                    f,
                    "Track point {} has invalid coordinates ({}, {})",
                    index, latitude, longitude
                )
            }
            SpeedlineError::OutOfOrder { index } => {
                write!(
                    f,
                    "Track point {} is earlier than the point before it",
                    index
                )
            }
            SpeedlineError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            SpeedlineError::RenderError { message } => {
                write!(f, "Render error: {} ({} stage)", message, Stage::Render)
            }
            SpeedlineError::Io { message } => {
                write!(f, "I/O error: {}", message)
            }
        }
    }
}

impl SpeedlineError {
    /// Pipeline stage the error belongs to, if any.
    ///
    /// Point-level validation failures belong to the parse stage wherever the
    /// track was built.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SpeedlineError::EmptyInput { stage } => Some(*stage),
            SpeedlineError::InsufficientData { stage, .. } => Some(*stage),
            SpeedlineError::MalformedPoint { .. }
            | SpeedlineError::InvalidCoordinates { .. }
            | SpeedlineError::OutOfOrder { .. } => Some(Stage::Parse),
            SpeedlineError::RenderError { .. } => Some(Stage::Render),
            SpeedlineError::ConfigError { .. } | SpeedlineError::Io { .. } => None,
        }
    }
}

impl std::error::Error for SpeedlineError {}

impl From<std::io::Error> for SpeedlineError {
    fn from(err: std::io::Error) -> Self {
        SpeedlineError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias for speedline operations.
pub type Result<T> = std::result::Result<T, SpeedlineError>;

/// Extension trait for converting Option to SpeedlineError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a malformed point error.
    fn ok_or_malformed(self, index: usize, message: &str) -> Result<T>;

    /// Convert Option to Result with a configuration error.
    fn ok_or_config(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_malformed(self, index: usize, message: &str) -> Result<T> {
        self.ok_or_else(|| SpeedlineError::MalformedPoint {
            index,
            message: message.to_string(),
        })
    }

    fn ok_or_config(self, message: &str) -> Result<T> {
        self.ok_or_else(|| SpeedlineError::ConfigError {
            message: message.to_string(),
        })
    }
}
