//! Skywave — network audio playback engine
//!
//! Owns the platform audio output and turns a stream URL into sound.
//! The `AudioBackend` trait is the seam the rest of the application
//! drives; `StreamEngine` is the production implementation.

pub mod audio;
pub mod config;
pub mod error;
