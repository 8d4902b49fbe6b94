//! Preview player - owns cursor, volume and session
//!
//! Maps UI events onto the session and keeps the playlist cursor and the
//! loaded resource in step. The first track is loaded paused; every load
//! after that autoplays (unless disabled in config).

use crate::{
    cursor::PlaylistCursor,
    error::{PlaybackError, Result},
    events::SessionEvent,
    media::MediaBackend,
    session::{PlaybackSession, TickOutcome},
    slot::Generation,
    types::{SessionConfig, SessionState, Track},
    view::{format_clock, PlayerView},
    volume::VolumeState,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Playlist shared with the source that owns it
pub type Playlist = Arc<[Track]>;

/// Central playback control for one widget instance
#[derive(Debug)]
pub struct PreviewPlayer {
    playlist: Playlist,
    cursor: PlaylistCursor,
    volume: VolumeState,
    session: PlaybackSession,
    config: SessionConfig,

    // First load happened; later loads may autoplay
    is_ready: bool,
}

impl PreviewPlayer {
    /// Create a player; nothing is loaded until [`load_initial`](Self::load_initial)
    pub fn new(
        playlist: impl Into<Playlist>,
        backend: Box<dyn MediaBackend>,
        config: SessionConfig,
    ) -> Self {
        Self {
            playlist: playlist.into(),
            cursor: PlaylistCursor::new(),
            volume: VolumeState::new(config.initial_volume),
            session: PlaybackSession::new(backend, config.poll_interval),
            config,
            is_ready: false,
        }
    }

    /// Load the cursor's track, paused
    pub fn load_initial(&mut self) -> Result<SessionState> {
        if self.playlist.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }
        self.load_current()
    }

    // ===== Transport =====

    /// Play/pause button
    pub fn toggle_play(&mut self) -> Result<()> {
        if self.session.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    pub fn play(&mut self) -> Result<()> {
        if self.session.state() == SessionState::Idle && !self.is_ready {
            self.load_initial()?;
        }
        self.session.play()
    }

    pub fn pause(&mut self) {
        self.session.pause();
    }

    /// Skip to the next track (wraps)
    pub fn next(&mut self) -> Result<SessionState> {
        self.cursor.advance(self.playlist.len())?;
        self.load_current()
    }

    /// Go back to the previous track (wraps)
    pub fn previous(&mut self) -> Result<SessionState> {
        self.cursor.retreat(self.playlist.len())?;
        self.load_current()
    }

    /// Jump to a playlist index
    pub fn select(&mut self, index: usize) -> Result<SessionState> {
        self.cursor.select(index, self.playlist.len())?;
        self.load_current()
    }

    pub fn seek(&mut self, position: Duration) -> Result<()> {
        self.session.seek(position)
    }

    // ===== Volume =====

    /// Volume slider moved (0.0-1.0)
    pub fn set_volume(&mut self, level: f32) {
        self.volume.set_level(level);
        self.apply_volume();
    }

    /// Mute icon clicked
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    pub fn volume(&self) -> &VolumeState {
        &self.volume
    }

    // ===== Playlist =====

    /// Swap in a new playlist from the source
    ///
    /// The cursor returns to the first track. An empty playlist unloads.
    pub fn replace_playlist(&mut self, playlist: impl Into<Playlist>) -> Result<SessionState> {
        self.playlist = playlist.into();
        self.cursor.reset();

        if self.playlist.is_empty() {
            self.session.unload();
            return Ok(self.session.state());
        }
        self.load_current()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_index(&self) -> usize {
        self.cursor.index()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.cursor.index())
    }

    // ===== Polling =====

    /// Handle a poll for `generation`, advancing on end-of-track
    pub fn on_poll(&mut self, generation: Generation) -> Result<TickOutcome> {
        let outcome = self.session.tick(generation);
        if let TickOutcome::TrackEnded { index } = outcome {
            debug!(index, "Advancing after finished preview");
            self.next()?;
        }
        Ok(outcome)
    }

    pub fn next_poll_deadline(&self) -> Option<Instant> {
        self.session.next_poll_deadline()
    }

    pub fn fire_poll(&mut self, now: Instant) -> Option<Generation> {
        self.session.fire_poll(now)
    }

    // ===== State =====

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Snapshot for rendering
    pub fn view(&self) -> PlayerView {
        let track = self.current_track();
        let elapsed_seconds = self.session.elapsed_seconds();

        PlayerView {
            title: track.map(|t| t.name.clone()).unwrap_or_default(),
            artists: track.map(Track::artists_label).unwrap_or_default(),
            artwork_url: track.and_then(|t| t.album_artwork_url.clone()),
            index: self.cursor.index(),
            total: self.playlist.len(),
            state: self.session.state(),
            is_playing: self.session.is_playing(),
            elapsed_seconds,
            elapsed_label: format_clock(elapsed_seconds),
            length_label: format_clock(self.config.preview_length.as_secs()),
            progress_percent: self.session.progress_percent(),
            effective_volume: self.volume.effective_volume(),
            slider_value: self.volume.slider_value(),
            muted: self.volume.is_muted(),
        }
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.session.drain_events()
    }

    /// Tear down the session. Idempotent.
    pub fn dispose(&mut self) {
        self.session.dispose();
    }

    // ===== Internals =====

    fn load_current(&mut self) -> Result<SessionState> {
        let autoplay = self.is_ready && self.config.autoplay_on_advance;
        self.is_ready = true;

        let index = self.cursor.index();
        let playlist = Arc::clone(&self.playlist);
        let track = playlist
            .get(index)
            .ok_or(PlaybackError::IndexOutOfBounds(index))?;

        let result = self
            .session
            .load_track(index, track, self.volume.effective_volume(), autoplay);
        if let Err(e) = &result {
            warn!(index, error = %e, "Track load failed");
        }
        result
    }

    fn apply_volume(&mut self) {
        self.session.set_volume(self.volume.effective_volume());
        self.session.push_event(SessionEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulated::SimulatedBackend;

    fn playlist(n: usize) -> Vec<Track> {
        (0..n)
            .map(|i| {
                Track::new(format!("Track {i}"), Some(format!("https://cdn.test/{i}.mp3")))
                    .with_artists(["Artist A", "Artist B"])
            })
            .collect()
    }

    fn player(n: usize) -> PreviewPlayer {
        PreviewPlayer::new(
            playlist(n),
            Box::new(SimulatedBackend::new()),
            SessionConfig::default(),
        )
    }

    #[test]
    fn first_load_is_paused_then_next_autoplays() {
        let mut player = player(3);

        assert_eq!(player.load_initial().unwrap(), SessionState::Paused);
        assert!(!player.session().is_playing());

        assert_eq!(player.next().unwrap(), SessionState::Playing);
        assert_eq!(player.current_index(), 1);
    }

    #[test]
    fn autoplay_on_advance_can_be_disabled() {
        let config = SessionConfig {
            autoplay_on_advance: false,
            ..SessionConfig::default()
        };
        let mut player = PreviewPlayer::new(playlist(3), Box::new(SimulatedBackend::new()), config);
        assert!(!player.config().autoplay_on_advance);
        player.load_initial().unwrap();

        assert_eq!(player.next().unwrap(), SessionState::Paused);
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut player = player(3);
        player.load_initial().unwrap();

        player.previous().unwrap();

        assert_eq!(player.current_index(), 2);
        assert_eq!(player.session().loaded_index(), Some(2));
    }

    #[test]
    fn toggle_play_flips_state() {
        let mut player = player(2);
        player.load_initial().unwrap();

        player.toggle_play().unwrap();
        assert!(player.session().is_playing());

        player.toggle_play().unwrap();
        assert!(!player.session().is_playing());
    }

    #[test]
    fn play_before_initial_load_loads_first() {
        let mut player = player(2);
        player.play().unwrap();
        assert_eq!(player.session().state(), SessionState::Playing);
        assert_eq!(player.session().loaded_index(), Some(0));
    }

    #[test]
    fn empty_playlist_operations_fail_cleanly() {
        let mut player = player(0);

        assert_eq!(player.load_initial(), Err(PlaybackError::EmptyPlaylist));
        assert_eq!(player.next(), Err(PlaybackError::EmptyPlaylist));
        assert_eq!(player.previous(), Err(PlaybackError::EmptyPlaylist));
        assert_eq!(player.view().title, "");
        assert_eq!(player.view().state, SessionState::Idle);
    }

    #[test]
    fn volume_changes_update_view_and_emit() {
        let mut player = player(1);
        player.load_initial().unwrap();
        player.drain_events();

        player.set_volume(0.0);
        let view = player.view();
        assert!(view.muted);
        assert_eq!(view.effective_volume, 0.0);

        player.set_volume(0.3);
        player.toggle_mute();
        assert!(player.volume().is_muted());
        assert_eq!(player.volume().level(), 0.3);
        let view = player.view();
        assert!(view.muted);
        assert_eq!(view.slider_value, 0.0);

        let volume_events = player
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::VolumeChanged { .. }))
            .count();
        assert_eq!(volume_events, 3);
    }

    #[test]
    fn view_describes_current_track() {
        let mut tracks = playlist(3);
        tracks[0] = tracks[0].clone().with_artwork("https://img.test/0.jpg");
        let mut player = PreviewPlayer::new(
            tracks,
            Box::new(SimulatedBackend::new()),
            SessionConfig::default(),
        );
        player.load_initial().unwrap();

        let view = player.view();
        assert_eq!(view.title, "Track 0");
        assert_eq!(view.artwork_url.as_deref(), Some("https://img.test/0.jpg"));
        assert_eq!(view.artists, "Artist A | Artist B");
        assert_eq!(view.total, 3);
        assert_eq!(view.elapsed_label, "0:00");
        assert_eq!(view.length_label, "0:30");
        assert_eq!(view.progress_percent, 0.0);
        assert_eq!(view.effective_volume, 0.6);
    }

    #[test]
    fn replace_playlist_resets_cursor() {
        let mut player = player(3);
        player.load_initial().unwrap();
        player.select(2).unwrap();

        player.replace_playlist(playlist(2)).unwrap();
        assert_eq!(player.playlist().len(), 2);
        assert_eq!(player.current_index(), 0);
        assert_eq!(player.session().loaded_index(), Some(0));

        assert_eq!(
            player.replace_playlist(Vec::<Track>::new()).unwrap(),
            SessionState::Idle
        );
    }

    #[tokio::test(start_paused = true)]
    async fn finished_track_advancing_onto_unplayable_track_goes_idle() {
        let mut tracks = playlist(3);
        tracks[1].preview_url = None;
        let mut player = PreviewPlayer::new(
            tracks,
            Box::new(SimulatedBackend::with_length(Duration::from_secs(2))),
            SessionConfig::default(),
        );
        player.load_initial().unwrap();
        player.play().unwrap();
        player.drain_events();

        tokio::time::advance(Duration::from_secs(3)).await;
        let generation = player.fire_poll(Instant::now()).unwrap();

        assert_eq!(
            player.on_poll(generation).unwrap(),
            TickOutcome::TrackEnded { index: 0 }
        );
        assert_eq!(player.current_index(), 1);
        assert_eq!(player.session().state(), SessionState::Idle);
        assert_eq!(player.session().loaded_index(), None);
        assert!(!player.session().is_poll_armed());
        assert!(player.next_poll_deadline().is_none());
        assert!(player.drain_events().contains(&SessionEvent::TrackUnavailable {
            index: 1,
            name: "Track 1".to_string(),
        }));
    }

    #[test]
    fn select_out_of_range() {
        let mut player = player(2);
        assert_eq!(player.select(5), Err(PlaybackError::IndexOutOfBounds(5)));
    }
}
