//! Error types for skywave app services
//!
//! Application-level errors that wrap engine errors and add app-specific
//! variants.

use skywave::error::PlaybackError;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error("Directory error: {0}")]
    Directory(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Playback(PlaybackError::from(e))
    }
}

/// Result type alias for skywave app services
pub type Result<T> = std::result::Result<T, AppError>;
