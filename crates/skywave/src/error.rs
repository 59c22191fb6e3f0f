//! Error types for the skywave engine
//!
//! Centralized error handling using thiserror. `PlaybackError` travels in
//! engine events, so it carries owned strings rather than source errors.

use thiserror::Error;

/// Why a playback attempt failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("{0}")]
    Network(String),

    #[error("Unsupported stream format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio output unavailable: {0}")]
    Output(String),

    #[error("Superseded by a newer request")]
    Aborted,
}

/// Result type alias for the skywave engine
pub type Result<T> = std::result::Result<T, PlaybackError>;

impl From<reqwest::Error> for PlaybackError {
    fn from(e: reqwest::Error) -> Self {
        PlaybackError::Network(friendly_network_error(&e))
    }
}

fn friendly_network_error(e: &reqwest::Error) -> String {
    if e.is_builder() {
        if let Some(url) = e.url() {
            return format!("Invalid URL: {url}");
        }
        return "Invalid URL".to_string();
    }
    if e.is_connect() {
        if let Some(url) = e.url() {
            return format!("Could not connect to {}", url.host_str().unwrap_or("server"));
        }
        return "Could not connect to server".to_string();
    }
    if e.is_timeout() {
        return "Connection timed out".to_string();
    }
    if e.is_status() {
        if let Some(status) = e.status() {
            return format!("Server returned {status}");
        }
    }
    format!("Network error: {e}")
}
