//! Error types for the Pixmorph transformation core.
//!
//! Errors are organized by stage so callers can tell a bad request from an
//! unreachable source or a corrupt image without parsing messages. Every
//! [`TransformError`] maps to exactly one machine-readable [`ErrorKind`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for Pixmorph operations.
#[derive(Error, Debug)]
pub enum PixmorphError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transformation errors (any stage of a submit call)
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised while serving a transformation request, organized by stage.
#[derive(Error, Debug)]
pub enum TransformError {
    /// Caller exceeded the configured request ceiling
    #[error("Rate limit exceeded: {limit} requests per {window_secs}s, retry in {retry_after_secs}s")]
    RateLimitExceeded {
        limit: u32,
        window_secs: u64,
        retry_after_secs: u64,
    },

    /// Malformed transformation request
    #[error("Invalid transformation request: {0}")]
    Validation(String),

    /// Requested output format is not in the supported set
    #[error("Unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    /// Rotation angle is not a finite whole number of degrees
    #[error("Invalid rotation angle: {degrees}")]
    InvalidRotationAngle { degrees: f64 },

    /// No image record for the given identifier
    #[error("Image not found: {id}")]
    ImageNotFound { id: String },

    /// Source bytes could not be retrieved
    #[error("Failed to retrieve {location}: {message}")]
    Retrieval { location: String, message: String },

    /// Source bytes are not a recognizable image
    #[error("Decode error: {0}")]
    Decode(String),

    /// Decoded image exceeds the dimension limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Crop rectangle does not fit inside the current buffer
    #[error("Crop {width}x{height}+{x}+{y} exceeds image bounds {image_width}x{image_height}")]
    CropOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        image_width: u32,
        image_height: u32,
    },

    /// Encoding into the target container failed
    #[error("Encode error ({format}): {message}")]
    Encode { format: String, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage after {timeout_ms}ms")]
    Timeout { stage: String, timeout_ms: u64 },

    /// Worker failure that is not the caller's fault
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error classification carried in failure responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimitExceeded,
    Validation,
    UnsupportedFormat,
    InvalidRotationAngle,
    NotFound,
    Retrieval,
    Decode,
    ImageTooLarge,
    CropOutOfBounds,
    Encode,
    Timeout,
    Internal,
}

impl ErrorKind {
    /// HTTP status a transport layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation
            | ErrorKind::UnsupportedFormat
            | ErrorKind::InvalidRotationAngle => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::ImageTooLarge => 413,
            ErrorKind::CropOutOfBounds | ErrorKind::Decode | ErrorKind::Encode => 422,
            ErrorKind::RateLimitExceeded => 429,
            ErrorKind::Retrieval => 502,
            ErrorKind::Timeout => 504,
            ErrorKind::Internal => 500,
        }
    }
}

impl TransformError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransformError::RateLimitExceeded { .. } => ErrorKind::RateLimitExceeded,
            TransformError::Validation(_) => ErrorKind::Validation,
            TransformError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            TransformError::InvalidRotationAngle { .. } => ErrorKind::InvalidRotationAngle,
            TransformError::ImageNotFound { .. } => ErrorKind::NotFound,
            TransformError::Retrieval { .. } => ErrorKind::Retrieval,
            TransformError::Decode(_) => ErrorKind::Decode,
            TransformError::ImageTooLarge { .. } => ErrorKind::ImageTooLarge,
            TransformError::CropOutOfBounds { .. } => ErrorKind::CropOutOfBounds,
            TransformError::Encode { .. } => ErrorKind::Encode,
            TransformError::Timeout { .. } => ErrorKind::Timeout,
            TransformError::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Structured failure body returned at the request boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Machine-readable kind
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl From<&TransformError> for ErrorResponse {
    fn from(err: &TransformError) -> Self {
        Self {
            success: false,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Convenience type alias for Pixmorph results.
pub type Result<T> = std::result::Result<T, PixmorphError>;

/// Convenience type alias for transformation results.
pub type TransformResult<T> = std::result::Result<T, TransformError>;
