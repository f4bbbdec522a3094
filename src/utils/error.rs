//! Error Handling Module
//!
//! Defines the error type shared by every stage of the food classification
//! service. Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for food classification operations
#[derive(Error, Debug)]
pub enum FoodVisionError {
    /// The request carried no `image` upload
    #[error("No image uploaded")]
    MissingImage,

    /// The uploaded bytes could not be decoded as an image
    #[error("Invalid image: {0}")]
    ImageDecode(String),

    /// The classifier produced an index with no label
    #[error("Unknown class index: {0}")]
    UnknownIndex(usize),

    /// Class index file could not be loaded or is inconsistent
    #[error("Class index error: {0}")]
    ClassIndex(String),

    /// Nutrition table could not be loaded
    #[error("Nutrition table error: {0}")]
    Nutrition(String),

    /// Error with model construction or checkpoint loading
    #[error("Model error: {0}")]
    Model(String),

    /// Error while running the forward pass
    #[error("Inference error: {0}")]
    Inference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FoodVisionError {
    /// HTTP status code for errors surfaced to a caller.
    ///
    /// Client input problems map to 400, everything else is a server fault.
    pub fn status_code(&self) -> u16 {
        match self {
            FoodVisionError::MissingImage | FoodVisionError::ImageDecode(_) => 400,
            _ => 500,
        }
    }

    /// Whether the error was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<serde_json::Error> for FoodVisionError {
    fn from(err: serde_json::Error) -> Self {
        FoodVisionError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for FoodVisionError {
    fn from(err: image::ImageError) -> Self {
        FoodVisionError::ImageDecode(err.to_string())
    }
}

impl From<csv::Error> for FoodVisionError {
    fn from(err: csv::Error) -> Self {
        FoodVisionError::Nutrition(err.to_string())
    }
}

/// Convenience Result type for food classification operations
pub type Result<T> = std::result::Result<T, FoodVisionError>;
