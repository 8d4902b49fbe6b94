//! Platform-agnostic media primitives
//!
//! Abstracts the platform's streaming audio element (browser `<audio>`,
//! a desktop decoder, a test double) behind two traits. The session never
//! fetches stream bytes itself.

use crate::error::Result;
use std::time::Duration;

/// One live, bound connection to a playable stream
///
/// A resource is created per track and released when the track changes.
/// Implementors must tolerate `pause`/`release` being called more than once.
pub trait MediaResource: Send {
    /// Request playback from the current position
    ///
    /// # Returns
    /// * `Ok(())` - Playback started
    /// * `Err(PlaybackStartFailed)` - Platform declined (autoplay policy, etc.)
    fn play(&mut self) -> Result<()>;

    /// Pause playback, keeping position
    fn pause(&mut self);

    /// Apply output volume (0.0-1.0) without interrupting playback
    fn set_volume(&mut self, volume: f32);

    /// Current playback position
    fn position(&self) -> Duration;

    /// Total duration, if the stream has reported it yet
    fn duration(&self) -> Option<Duration>;

    /// Check if the stream has played to its end
    fn is_ended(&self) -> bool;

    /// Move to position in stream
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Drop the underlying stream
    ///
    /// Equivalent to `pause()` for platforms that free on drop.
    fn release(&mut self) {
        self.pause();
    }
}

/// Factory for media resources
///
/// Opening binds a fresh resource to `url`. Failure leaves no resource behind.
pub trait MediaBackend: Send {
    fn open(&mut self, url: &str) -> Result<Box<dyn MediaResource>>;
}
