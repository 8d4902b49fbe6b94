//! Clock-driven media backend
//!
//! Stands in for a real streaming element: every stream is a fixed-length
//! clip whose position advances with `tokio::time`, so paused-clock tests
//! and the terminal host share the same behavior. Can refuse the first N
//! play requests (an autoplay policy) and fail to open chosen URLs.

use crate::{
    error::{PlaybackError, Result},
    media::{MediaBackend, MediaResource},
    types::PREVIEW_LENGTH,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Backend producing [`SimulatedMedia`] clips
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    length: Duration,
    blocked_plays: Arc<AtomicU32>,
    unreachable: HashSet<String>,
    opened: Arc<AtomicUsize>,
}

impl SimulatedBackend {
    /// Backend whose clips last the standard preview length
    pub fn new() -> Self {
        Self::with_length(PREVIEW_LENGTH)
    }

    /// Backend whose clips last `length`
    pub fn with_length(length: Duration) -> Self {
        Self {
            length,
            blocked_plays: Arc::new(AtomicU32::new(0)),
            unreachable: HashSet::new(),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Refuse the next `attempts` play requests across all clips
    pub fn block_autoplay(self, attempts: u32) -> Self {
        self.blocked_plays.store(attempts, Ordering::SeqCst);
        self
    }

    /// Fail to open `url`
    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.unreachable.insert(url.into());
        self
    }

    /// Number of streams opened so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaBackend for SimulatedBackend {
    fn open(&mut self, url: &str) -> Result<Box<dyn MediaResource>> {
        if url.is_empty() {
            return Err(PlaybackError::MissingStreamUrl {
                track: "(empty stream url)".to_string(),
            });
        }
        if self.unreachable.contains(url) {
            return Err(PlaybackError::Media(format!("stream unreachable: {url}")));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedMedia {
            url: url.to_string(),
            length: self.length,
            volume: 1.0,
            offset: Duration::ZERO,
            started_at: None,
            released: false,
            blocked_plays: Arc::clone(&self.blocked_plays),
        }))
    }
}

/// Fixed-length clip advancing with the tokio clock
#[derive(Debug)]
pub struct SimulatedMedia {
    url: String,
    length: Duration,
    volume: f32,
    /// Position accumulated before the current run
    offset: Duration,
    /// Start of the current run (None = paused)
    started_at: Option<Instant>,
    released: bool,
    blocked_plays: Arc<AtomicU32>,
}

impl SimulatedMedia {
    fn take_block(&self) -> bool {
        self.blocked_plays
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl MediaResource for SimulatedMedia {
    fn play(&mut self) -> Result<()> {
        if self.released {
            return Err(PlaybackError::Media(format!("{} was released", self.url)));
        }
        if self.take_block() {
            return Err(PlaybackError::PlaybackStartFailed(
                "play() request not allowed without user interaction".to_string(),
            ));
        }
        if self.started_at.is_some() {
            return Ok(());
        }
        // Playing an ended clip starts it over
        if self.is_ended() {
            self.offset = Duration::ZERO;
        }
        self.started_at = Some(Instant::now());
        trace!(
            url = %self.url,
            volume = self.volume,
            offset = ?self.offset,
            "Simulated clip running"
        );
        Ok(())
    }

    fn pause(&mut self) {
        self.offset = self.position();
        self.started_at = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn position(&self) -> Duration {
        let running = self
            .started_at
            .map(|start| Instant::now().saturating_duration_since(start))
            .unwrap_or_default();
        (self.offset + running).min(self.length)
    }

    fn duration(&self) -> Option<Duration> {
        Some(self.length)
    }

    fn is_ended(&self) -> bool {
        self.position() >= self.length
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        if position > self.length {
            return Err(PlaybackError::InvalidSeekPosition(position));
        }
        self.offset = position;
        if self.started_at.is_some() {
            self.started_at = Some(Instant::now());
        }
        Ok(())
    }

    fn release(&mut self) {
        self.pause();
        self.released = true;
    }
}
