//! Preview Deck - Playback Session
//!
//! Framework-agnostic playback control for short streaming previews.
//!
//! This crate provides:
//! - A playback session owning exactly one media resource and one poll timer
//! - Generation-checked resource replacement (stale ticks are ignored)
//! - A wrapping playlist cursor
//! - Volume with mute (zero level mutes, raising the level unmutes)
//! - A render-ready view snapshot (`m:ss` labels, progress percentage)
//! - A tokio task that drives the poll timer and fans out events
//!
//! # Architecture
//!
//! `deck-playback` knows nothing about rendering or about how streams are
//! fetched. Platform media (a browser audio element, a desktop decoder)
//! plugs in through [`MediaBackend`] and [`MediaResource`].
//!
//! # Example: Driving a player by hand
//!
//! ```rust
//! use deck_playback::{PreviewPlayer, SessionConfig, SessionState, SimulatedBackend, Track};
//!
//! let tracks = vec![
//!     Track::new("So What", Some("https://cdn.example/so-what.mp3".into()))
//!         .with_artists(["Miles Davis"]),
//!     Track::new("Blue in Green", Some("https://cdn.example/blue.mp3".into())),
//! ];
//!
//! let mut player = PreviewPlayer::new(
//!     tracks,
//!     Box::new(SimulatedBackend::new()),
//!     SessionConfig::default(),
//! );
//!
//! // First track waits for an explicit play
//! assert_eq!(player.load_initial().unwrap(), SessionState::Paused);
//!
//! // Later loads autoplay
//! assert_eq!(player.next().unwrap(), SessionState::Playing);
//!
//! player.set_volume(0.0);
//! assert!(player.view().muted);
//! ```
//!
//! # Example: Running on tokio
//!
//! ```rust,no_run
//! use deck_playback::{spawn_player, PlayerCommand, PreviewPlayer, SessionConfig, SimulatedBackend};
//!
//! # async fn run(tracks: Vec<deck_playback::Track>) -> deck_playback::Result<()> {
//! let mut player = PreviewPlayer::new(tracks, Box::new(SimulatedBackend::new()), SessionConfig::default());
//! player.load_initial()?;
//!
//! let handle = spawn_player(player);
//! handle.send(PlayerCommand::TogglePlay).await?;
//! let view = handle.view().await?;
//! println!("{} {}", view.title, view.elapsed_label);
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod cursor;
mod error;
mod events;
mod media;
mod player;
mod runtime;
mod session;
mod simulated;
mod slot;
mod timer;
pub mod types;
mod view;
mod volume;

// Public exports
pub use cursor::PlaylistCursor;
pub use error::{PlaybackError, Result};
pub use events::SessionEvent;
pub use media::{MediaBackend, MediaResource};
pub use player::{Playlist, PreviewPlayer};
pub use runtime::{spawn_player, PlayerCommand, PlayerHandle};
pub use session::{PlaybackSession, TickOutcome};
pub use simulated::{SimulatedBackend, SimulatedMedia};
pub use slot::{Generation, ResourceSlot};
pub use timer::PollTimer;
pub use types::{SessionConfig, SessionState, Track};
pub use view::{format_clock, PlayerView};
pub use volume::VolumeState;
