//! Error types for preview playback

use std::time::Duration;
use thiserror::Error;

/// Playback errors
///
/// None of these are fatal. Callers absorb them and fall back to
/// "nothing is playing".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    /// The platform declined to start playback (e.g. autoplay policy)
    #[error("Playback start failed: {0}")]
    PlaybackStartFailed(String),

    /// Track has no playable stream reference
    #[error("Track has no preview URL: {track}")]
    MissingStreamUrl {
        /// Display name of the track
        track: String,
    },

    /// Cursor operation on a zero-length playlist
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// No resource is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Invalid seek position
    #[error("Invalid seek position: {0:?}")]
    InvalidSeekPosition(Duration),

    /// Media backend error (stream could not be opened, etc.)
    #[error("Media error: {0}")]
    Media(String),

    /// Session was already disposed
    #[error("Session disposed")]
    Disposed,
}

impl PlaybackError {
    /// Whether the caller can retry the same operation later
    ///
    /// Start failures usually clear after a user gesture.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlaybackError::PlaybackStartFailed(_) | PlaybackError::Media(_)
        )
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
