//! Error types for the gaze pipeline

use crate::types::Axis;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazeError {
    /// A calibration axis cannot be normalized (zero, inverted or non-finite span)
    #[error("uncalibrated {axis} axis (span {span})")]
    DegenerateCalibration { axis: Axis, span: f64 },

    /// Camera could not be opened or read
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, GazeError>;
