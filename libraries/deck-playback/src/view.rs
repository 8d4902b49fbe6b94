//! UI state snapshot
//!
//! Everything a renderer needs to draw the player, precomputed.

use crate::types::SessionState;
use serde::{Deserialize, Serialize};

/// Render-ready player state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Current track name (empty when the playlist is empty)
    pub title: String,
    /// Artist names joined with " | "
    pub artists: String,
    pub artwork_url: Option<String>,
    /// Cursor position
    pub index: usize,
    /// Playlist length
    pub total: usize,
    pub state: SessionState,
    pub is_playing: bool,
    /// Elapsed time rounded to whole seconds
    pub elapsed_seconds: u64,
    /// Elapsed time as `m:ss`
    pub elapsed_label: String,
    /// Preview length as `m:ss`
    pub length_label: String,
    /// 0-100, 0 when duration is unknown
    pub progress_percent: f64,
    pub effective_volume: f32,
    /// Slider position (0 while muted)
    pub slider_value: f32,
    pub muted: bool,
}

/// Format whole seconds as `m:ss`
///
/// ```
/// assert_eq!(deck_playback::format_clock(7), "0:07");
/// assert_eq!(deck_playback::format_clock(30), "0:30");
/// assert_eq!(deck_playback::format_clock(75), "1:15");
/// ```
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(10), "0:10");
        assert_eq!(format_clock(600), "10:00");
    }
}
