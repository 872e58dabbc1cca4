//! Error types for formcheck

use std::path::PathBuf;

use thiserror::Error;

/// Core formcheck errors
#[derive(Error, Debug)]
pub enum FormError {
    // Input errors
    #[error("Invalid image size: {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },

    #[error("No pose detected")]
    NoPoseDetected,

    // Aggregation errors
    #[error("No valid pose data extracted from any sample")]
    NoSamples,

    // Baseline errors
    #[error("No baseline loaded")]
    BaselineNotLoaded,

    #[error("Baseline file not found: {}", .0.display())]
    BaselineNotFound(PathBuf),

    #[error("Malformed baseline {}: {reason}", path.display())]
    MalformedBaseline { path: PathBuf, reason: String },

    #[error("Baseline serialization failed: {0}")]
    Serialize(String),

    // Configuration errors
    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Invalid configuration {}: {reason}", path.display())]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for formcheck operations
pub type FormResult<T> = Result<T, FormError>;
