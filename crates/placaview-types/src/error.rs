//! Error types for placaview

use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    NotFound,

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Camera-related errors
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("Camera support is not available in this build")]
    Unavailable,

    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Failed to grab frame: {0}")]
    Capture(String),

    #[error("Camera stream is not open")]
    NotOpen,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Backend answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered with any other non-2xx status
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// Request never produced a response (connection refused, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Invalid base64 data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Message already worded for the operator, shown as is
    #[error("{0}")]
    Message(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Backend-provided `detail` text, if the error carries one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::NotFound(detail) | Error::Api { detail, .. } if !detail.is_empty() => {
                Some(detail.as_str())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
