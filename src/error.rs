use std::path::PathBuf;
use thiserror::Error;

/// Raised by the random sampling helpers when asked for an empty range.
#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("max ({max}) must be greater than min ({min})")]
    InvalidRange { min: f64, max: f64 },
}

/// Broken grid invariants. None of these are recoverable: they mean the
/// cached cell coordinates and the bucket contents no longer agree.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GridError {
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f64),
    #[error("plane dimensions must be finite and non-negative, got {width}x{height}")]
    InvalidPlane { width: f64, height: f64 },
    #[error("position ({x}, {y}) lies outside the {width}x{height} plane")]
    OutOfBounds { x: f64, y: f64, width: f64, height: f64 },
    #[error("particle {id} is not registered in cell ({col}, {row})")]
    Desync { id: usize, col: i32, row: i32 },
}

/// Anything that can stop the particle network mid-run.
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Range(#[from] RangeError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("unrecognised color '{0}'")]
    Malformed(String),
    #[error("color component '{component}' in '{input}' is out of range")]
    Component { input: String, component: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid options: {0}")]
    Invalid(String),
}
