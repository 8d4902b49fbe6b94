//! Core types for preview playback

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Nominal length of a preview clip
pub const PREVIEW_LENGTH: Duration = Duration::from_secs(30);

/// Default poll cadence for progress updates
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Track descriptor supplied by the playlist source
///
/// Immutable. The player never fetches or edits track metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name
    pub name: String,

    /// Short streaming reference (absent = not playable)
    #[serde(default)]
    pub preview_url: Option<String>,

    /// Album artwork image reference
    #[serde(default)]
    pub album_artwork_url: Option<String>,

    /// Artist names in credit order
    #[serde(default)]
    pub artist_names: Vec<String>,
}

impl Track {
    /// Create a track with a preview URL and no artwork
    pub fn new(name: impl Into<String>, preview_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            preview_url,
            album_artwork_url: None,
            artist_names: Vec::new(),
        }
    }

    /// Builder: set artist names
    pub fn with_artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artist_names = artists.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set artwork reference
    pub fn with_artwork(mut self, url: impl Into<String>) -> Self {
        self.album_artwork_url = Some(url.into());
        self
    }

    /// Preview URL, if the track has a non-empty one
    pub fn stream_url(&self) -> Option<&str> {
        self.preview_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Whether the track can be loaded at all
    pub fn is_playable(&self) -> bool {
        self.stream_url().is_some()
    }

    /// Artist names joined for display ("A | B")
    pub fn artists_label(&self) -> String {
        self.artist_names.join(" | ")
    }
}

/// Playback session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No resource loaded
    Idle,

    /// Resource loaded, not playing
    Paused,

    /// Currently playing
    Playing,
}

/// Configuration for a playback session and its owning player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Progress poll cadence (default: 1s)
    pub poll_interval: Duration,

    /// Preview length used for labels when the stream reports no duration
    /// (default: 30s)
    pub preview_length: Duration,

    /// Initial slider level (0.0-1.0, default: 0.6)
    pub initial_volume: f32,

    /// Autoplay tracks loaded after the first one (default: true)
    pub autoplay_on_advance: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            preview_length: PREVIEW_LENGTH,
            initial_volume: crate::volume::DEFAULT_LEVEL,
            autoplay_on_advance: true,
        }
    }
}
