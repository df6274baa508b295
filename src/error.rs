//! Error types
//!
//! Only configuration can fail. Per-tick operations are total.

use std::path::PathBuf;

use thiserror::Error;

/// Display axis, used to name the offending axis in errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Inconsistent motion configuration, raised at initialization
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("capacity {capacity} exceeds the {max} available sprite slots")]
    CapacityTooLarge { capacity: usize, max: usize },
    #[error("entity count {count} exceeds capacity {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },
    #[error("margin {margin} leaves no room on the {axis} axis (bounds {bounds})")]
    MarginTooLarge { axis: Axis, margin: i32, bounds: i32 },
    #[error("sprite size {size} does not fit the {axis} axis (bounds {bounds})")]
    SpriteTooLarge { axis: Axis, size: i32, bounds: i32 },
    #[error("spawn region on the {axis} axis is empty ([{low}, {high}))")]
    EmptySpawnRegion { axis: Axis, low: i32, high: i32 },
    #[error("margin {margin} must be at least 1")]
    MarginTooSmall { margin: i32 },
    #[error("speed {speed} must be positive")]
    InvalidSpeed { speed: i32 },
    #[error("entity {index} has a zero velocity component")]
    ZeroVelocity { index: usize },
    #[error("vsync cycle must be at least 1")]
    ZeroCycle,
}

/// Failure loading or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings: {0}")]
    Invalid(#[from] ConfigurationError),
}
