//! Shared audio types
//!
//! Pure data types used across the audio subsystem.

use std::fmt;

use crate::error::PlaybackError;

/// Identifies one play request.
///
/// Tokens are issued in strictly increasing order by the caller; the engine
/// stamps every lifecycle event with the token of the request that produced
/// it, so late results from superseded requests can be recognized and
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayToken(pub u64);

impl fmt::Display for PlayToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands sent to the engine thread
#[derive(Debug)]
pub enum AudioCommand {
    /// Stop current output, clear buffers, record a new stream address.
    /// Does not start playback.
    SetSource(String),
    /// Request playback of the current source
    Play(PlayToken),
    /// Stop output immediately
    Pause,
    /// Set volume (0.0..=1.0)
    SetVolume(f32),
    /// Shut down the engine thread
    Shutdown,
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// Audio is flowing for the given request
    Playing(PlayToken),
    /// Output stopped after an explicit pause
    Paused,
    /// Network stall while nominally playing
    Buffering(PlayToken),
    /// The play request failed
    Failed(PlayToken, PlaybackError),
    /// The stream was terminated by the server
    Ended,
}
