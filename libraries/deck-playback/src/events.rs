//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are queued by
//! the session and drained by whoever owns it:
//! - State changes (play/pause/idle)
//! - Track loads and finishes
//! - Position updates (each poll)
//! - Volume changes
//! - Absorbed errors (e.g. autoplay blocked)

use crate::types::SessionState;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session state changed
    StateChanged {
        /// The new state
        state: SessionState,
    },

    /// A resource was bound to a track
    TrackLoaded {
        /// Playlist index of the track
        index: usize,
        /// Display name
        name: String,
    },

    /// Selected track has no preview URL; session stays idle
    TrackUnavailable {
        /// Playlist index of the track
        index: usize,
        /// Display name
        name: String,
    },

    /// Track played to its end
    TrackFinished {
        /// Playlist index of the finished track
        index: usize,
    },

    /// Position update (each poll)
    PositionUpdate {
        /// Current playback position
        elapsed_ms: u64,
        /// Stream duration, if known
        duration_ms: Option<u64>,
    },

    /// Volume changed
    VolumeChanged {
        /// Slider level (0.0-1.0)
        level: f32,
        /// Whether audio is muted
        is_muted: bool,
    },

    /// Recoverable error, already absorbed
    Error {
        /// Error message
        message: String,
    },

    /// Session torn down; nothing further will be emitted
    Disposed,
}
