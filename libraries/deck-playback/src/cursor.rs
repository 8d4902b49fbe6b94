//! Playlist cursor
//!
//! Pure index arithmetic over an externally owned playlist. Both
//! directions wrap around, so the playlist behaves like a ring:
//!
//! ```text
//!   previous(0, 3) = 2      next(2, 3) = 0
//!   ┌───┬───┬───┐
//!   │ 0 │ 1 │ 2 │
//!   └───┴───┴───┘
//! ```

use crate::error::{PlaybackError, Result};

/// Index after `current`, wrapping to 0 past the end
///
/// An out-of-range `current` (playlist shrank underneath us) also wraps to 0.
pub fn next(current: usize, len: usize) -> Result<usize> {
    if len == 0 {
        return Err(PlaybackError::EmptyPlaylist);
    }

    if current < len - 1 {
        Ok(current + 1)
    } else {
        Ok(0)
    }
}

/// Index before `current`, wrapping to the last track from 0
///
/// An out-of-range `current` lands on the last track.
pub fn previous(current: usize, len: usize) -> Result<usize> {
    if len == 0 {
        return Err(PlaybackError::EmptyPlaylist);
    }

    match current.checked_sub(1) {
        Some(index) if index < len => Ok(index),
        _ => Ok(len - 1),
    }
}

/// Current position within the playlist
///
/// Holds only the index; the playlist length is passed per call because
/// the list is owned elsewhere and may be replaced at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaylistCursor {
    index: usize,
}

impl PlaylistCursor {
    /// Create cursor at the first track
    pub fn new() -> Self {
        Self::default()
    }

    /// Current index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next track (wraps)
    pub fn advance(&mut self, len: usize) -> Result<usize> {
        self.index = next(self.index, len)?;
        Ok(self.index)
    }

    /// Move to the previous track (wraps)
    pub fn retreat(&mut self, len: usize) -> Result<usize> {
        self.index = previous(self.index, len)?;
        Ok(self.index)
    }

    /// Jump to a specific index
    pub fn select(&mut self, index: usize, len: usize) -> Result<usize> {
        if len == 0 {
            return Err(PlaybackError::EmptyPlaylist);
        }
        if index >= len {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.index = index;
        Ok(index)
    }

    /// Back to the first track
    pub fn reset(&mut self) {
        self.index = 0;
    }
}
