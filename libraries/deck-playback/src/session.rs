//! Playback session - owns the single media resource
//!
//! The session binds one resource at a time, starts and stops the poll
//! timer alongside playback, and turns timer ticks into progress updates
//! or an end-of-track signal. Stale ticks are rejected by generation.

use crate::{
    error::{PlaybackError, Result},
    events::SessionEvent,
    media::{MediaBackend, MediaResource},
    slot::{Generation, ResourceSlot},
    timer::PollTimer,
    types::{SessionState, Track},
};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of a poll tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Position read into elapsed time
    Progress {
        /// New elapsed time
        elapsed: Duration,
    },

    /// Resource reached end of track; owner should advance the playlist
    TrackEnded {
        /// Playlist index of the finished track
        index: usize,
    },

    /// Tick belonged to a released resource or a stopped timer; ignored
    Stale,
}

/// Owner of one playback resource and its poll timer
///
/// State machine:
/// ```text
/// Idle ──load──▶ Paused ──play──▶ Playing
///   ▲              ▲                 │
///   │              └──pause / end────┘
///   └──── dispose (terminal) / unplayable load
/// ```
pub struct PlaybackSession {
    backend: Box<dyn MediaBackend>,
    slot: ResourceSlot,
    poll: PollTimer,

    loaded_index: Option<usize>,
    is_playing: bool,
    elapsed: Duration,
    disposed: bool,

    // Event queue for UI synchronization
    pending_events: Vec<SessionEvent>,
}

impl PlaybackSession {
    /// Create an idle session polling every `poll_interval`
    pub fn new(backend: Box<dyn MediaBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            slot: ResourceSlot::new(),
            poll: PollTimer::new(poll_interval),
            loaded_index: None,
            is_playing: false,
            elapsed: Duration::ZERO,
            disposed: false,
            pending_events: Vec::new(),
        }
    }

    /// Bind a new resource to `track`
    ///
    /// The previous resource and timer are released first. A track without
    /// a preview URL leaves the session idle and still returns `Ok`. An
    /// autoplay refusal is logged and leaves the session paused.
    pub fn load_track(
        &mut self,
        index: usize,
        track: &Track,
        effective_volume: f32,
        autoplay: bool,
    ) -> Result<SessionState> {
        if self.disposed {
            return Err(PlaybackError::Disposed);
        }

        let before = self.state();
        self.release_current();

        let Some(url) = track.stream_url() else {
            debug!(index, track = %track.name, "Track has no preview URL, staying idle");
            self.pending_events.push(SessionEvent::TrackUnavailable {
                index,
                name: track.name.clone(),
            });
            self.emit_state_change(before);
            return Ok(self.state());
        };

        let mut resource = match self.backend.open(url) {
            Ok(resource) => resource,
            Err(e) => {
                warn!(index, track = %track.name, error = %e, "Failed to open preview stream");
                self.pending_events.push(SessionEvent::Error {
                    message: e.to_string(),
                });
                self.emit_state_change(before);
                return Err(e);
            }
        };

        resource.set_volume(effective_volume);
        let generation = self.slot.install(resource);
        self.loaded_index = Some(index);

        info!(index, track = %track.name, %generation, autoplay, "Loaded preview");
        self.pending_events.push(SessionEvent::TrackLoaded {
            index,
            name: track.name.clone(),
        });

        if autoplay {
            if let Err(e) = self.start_playback() {
                warn!(error = %e, "Autoplay refused, staying paused");
                self.pending_events.push(SessionEvent::Error {
                    message: e.to_string(),
                });
            }
        }

        self.emit_state_change(before);
        Ok(self.state())
    }

    /// Start or resume playback
    ///
    /// A refusal leaves the session paused and is returned so the caller
    /// can surface it; it is never fatal.
    pub fn play(&mut self) -> Result<()> {
        if self.disposed {
            return Err(PlaybackError::Disposed);
        }
        if !self.slot.is_loaded() {
            return Err(PlaybackError::NoTrackLoaded);
        }
        if self.is_playing {
            return Ok(());
        }

        let before = self.state();
        let result = self.start_playback();
        if let Err(e) = &result {
            warn!(error = %e, "Playback start failed");
        }
        self.emit_state_change(before);
        result
    }

    /// Pause playback and stop polling; elapsed time is kept
    pub fn pause(&mut self) {
        let before = self.state();
        if let Some(resource) = self.slot.get_mut() {
            resource.pause();
        }
        self.poll.stop();
        self.is_playing = false;
        self.emit_state_change(before);
    }

    /// Apply output volume to the live resource
    pub fn set_volume(&mut self, effective_volume: f32) {
        if let Some(resource) = self.slot.get_mut() {
            resource.set_volume(effective_volume);
        }
    }

    /// Move the live resource to `position`
    pub fn seek(&mut self, position: Duration) -> Result<()> {
        if self.disposed {
            return Err(PlaybackError::Disposed);
        }
        let resource = self.slot.get_mut().ok_or(PlaybackError::NoTrackLoaded)?;

        if let Some(duration) = resource.duration() {
            if position > duration {
                return Err(PlaybackError::InvalidSeekPosition(position));
            }
        }
        resource.seek(position)?;
        let duration = resource.duration();

        self.elapsed = position;
        self.pending_events.push(SessionEvent::PositionUpdate {
            elapsed_ms: duration_ms(position),
            duration_ms: duration.map(duration_ms),
        });
        Ok(())
    }

    /// Handle one poll of the timer armed for `generation`
    pub fn tick(&mut self, generation: Generation) -> TickOutcome {
        if self.disposed
            || !self.slot.is_current(generation)
            || self.poll.generation() != Some(generation)
        {
            debug!(%generation, "Ignoring stale poll tick");
            return TickOutcome::Stale;
        }
        let (Some(index), Some(resource)) = (self.loaded_index, self.slot.get()) else {
            return TickOutcome::Stale;
        };

        if resource.is_ended() {
            let before = self.state();
            self.poll.stop();
            self.is_playing = false;
            debug!(index, "Preview finished");
            self.pending_events.push(SessionEvent::TrackFinished { index });
            self.emit_state_change(before);
            return TickOutcome::TrackEnded { index };
        }

        self.elapsed = resource.position();
        self.pending_events.push(SessionEvent::PositionUpdate {
            elapsed_ms: duration_ms(self.elapsed),
            duration_ms: resource.duration().map(duration_ms),
        });
        TickOutcome::Progress {
            elapsed: self.elapsed,
        }
    }

    /// Fire the poll timer if it is due at `now`
    ///
    /// Returns the generation to pass to [`tick`](Self::tick).
    pub fn fire_poll(&mut self, now: Instant) -> Option<Generation> {
        if self.disposed {
            return None;
        }
        self.poll.fire(now)
    }

    /// When the poll timer next wants to fire (None = disarmed)
    pub fn next_poll_deadline(&self) -> Option<Instant> {
        if self.disposed {
            return None;
        }
        self.poll.deadline()
    }

    /// Release the resource without disposing the session
    pub fn unload(&mut self) {
        let before = self.state();
        self.release_current();
        self.emit_state_change(before);
    }

    /// Tear down: pause, stop the timer, release the resource
    ///
    /// Idempotent. Every later call is a no-op or returns `Disposed`.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.release_current();
        self.disposed = true;
        debug!("Playback session disposed");
        self.pending_events.push(SessionEvent::Disposed);
    }

    // ===== State =====

    pub fn state(&self) -> SessionState {
        match (self.slot.is_loaded(), self.is_playing) {
            (false, _) => SessionState::Idle,
            (true, false) => SessionState::Paused,
            (true, true) => SessionState::Playing,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Position as of the last poll, seek or load
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time rounded to the nearest whole second
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.as_secs_f64().round() as u64
    }

    /// Stream duration, if the resource has reported one
    pub fn duration(&self) -> Option<Duration> {
        self.slot.get().and_then(|resource| resource.duration())
    }

    /// Elapsed over duration as 0-100 (0 when duration is unknown)
    pub fn progress_percent(&self) -> f64 {
        match self.duration() {
            Some(duration) if !duration.is_zero() => {
                (self.elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0).min(100.0)
            }
            _ => 0.0,
        }
    }

    pub fn loaded_index(&self) -> Option<usize> {
        self.loaded_index
    }

    /// Generation of the live resource
    pub fn generation(&self) -> Generation {
        self.slot.generation()
    }

    pub fn is_poll_armed(&self) -> bool {
        self.poll.is_armed()
    }

    /// Take queued events
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub(crate) fn push_event(&mut self, event: SessionEvent) {
        self.pending_events.push(event);
    }

    // ===== Internals =====

    fn start_playback(&mut self) -> Result<()> {
        let generation = self.slot.generation();
        let resource = self.slot.get_mut().ok_or(PlaybackError::NoTrackLoaded)?;

        match resource.play() {
            Ok(()) => {
                self.is_playing = true;
                self.poll.start(generation);
                Ok(())
            }
            Err(e) => {
                self.is_playing = false;
                self.poll.stop();
                Err(match e {
                    PlaybackError::PlaybackStartFailed(_) => e,
                    other => PlaybackError::PlaybackStartFailed(other.to_string()),
                })
            }
        }
    }

    fn release_current(&mut self) {
        self.poll.stop();
        self.slot.release();
        self.loaded_index = None;
        self.is_playing = false;
        self.elapsed = Duration::ZERO;
    }

    fn emit_state_change(&mut self, before: SessionState) {
        let state = self.state();
        if state != before {
            debug!(?before, ?state, "Session state changed");
            self.pending_events
                .push(SessionEvent::StateChanged { state });
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("slot", &self.slot)
            .field("poll", &self.poll)
            .field("loaded_index", &self.loaded_index)
            .field("is_playing", &self.is_playing)
            .field("elapsed", &self.elapsed)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Probe {
        opened: Vec<String>,
        released: usize,
        volume: f32,
        position: Duration,
        ended: bool,
        refuse_play: bool,
    }

    struct ProbeResource(Arc<Mutex<Probe>>);

    impl MediaResource for ProbeResource {
        fn play(&mut self) -> Result<()> {
            if self.0.lock().unwrap().refuse_play {
                return Err(PlaybackError::PlaybackStartFailed("NotAllowedError".into()));
            }
            Ok(())
        }
        fn pause(&mut self) {}
        fn set_volume(&mut self, volume: f32) {
            self.0.lock().unwrap().volume = volume;
        }
        fn position(&self) -> Duration {
            self.0.lock().unwrap().position
        }
        fn duration(&self) -> Option<Duration> {
            Some(Duration::from_secs(30))
        }
        fn is_ended(&self) -> bool {
            self.0.lock().unwrap().ended
        }
        fn seek(&mut self, position: Duration) -> Result<()> {
            self.0.lock().unwrap().position = position;
            Ok(())
        }
        fn release(&mut self) {
            self.0.lock().unwrap().released += 1;
        }
    }

    struct ProbeBackend(Arc<Mutex<Probe>>);

    impl MediaBackend for ProbeBackend {
        fn open(&mut self, url: &str) -> Result<Box<dyn MediaResource>> {
            self.0.lock().unwrap().opened.push(url.to_string());
            Ok(Box::new(ProbeResource(Arc::clone(&self.0))))
        }
    }

    fn session() -> (PlaybackSession, Arc<Mutex<Probe>>) {
        let probe = Arc::new(Mutex::new(Probe::default()));
        let backend = Box::new(ProbeBackend(Arc::clone(&probe)));
        (
            PlaybackSession::new(backend, Duration::from_secs(1)),
            probe,
        )
    }

    fn track(name: &str) -> Track {
        Track::new(name, Some(format!("https://cdn.test/{name}.mp3")))
    }

    #[test]
    fn load_without_autoplay_stays_paused() {
        let (mut session, probe) = session();

        let state = session.load_track(0, &track("a"), 0.6, false).unwrap();

        assert_eq!(state, SessionState::Paused);
        assert!(!session.is_playing());
        assert!(!session.is_poll_armed());
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(probe.lock().unwrap().volume, 0.6);
    }

    #[test]
    fn load_with_autoplay_arms_timer() {
        let (mut session, _probe) = session();

        let state = session.load_track(0, &track("a"), 0.6, true).unwrap();

        assert_eq!(state, SessionState::Playing);
        assert!(session.is_poll_armed());
    }

    #[test]
    fn reload_releases_previous_resource() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, true).unwrap();
        let first = session.generation();

        session.load_track(1, &track("b"), 0.6, true).unwrap();

        assert_eq!(probe.lock().unwrap().released, 1);
        assert_eq!(session.tick(first), TickOutcome::Stale);
        assert_eq!(session.loaded_index(), Some(1));
    }

    #[test]
    fn missing_url_leaves_session_idle() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, true).unwrap();

        let state = session
            .load_track(1, &Track::new("no preview", None), 0.6, true)
            .unwrap();

        assert_eq!(state, SessionState::Idle);
        assert!(!session.is_playing());
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert_eq!(probe.lock().unwrap().opened.len(), 1);
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::TrackUnavailable { index: 1, .. })));
    }

    #[test]
    fn autoplay_refusal_is_absorbed() {
        let (mut session, probe) = session();
        probe.lock().unwrap().refuse_play = true;

        let state = session.load_track(0, &track("a"), 0.6, true).unwrap();

        assert_eq!(state, SessionState::Paused);
        assert!(!session.is_poll_armed());
        assert!(session
            .drain_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::Error { .. })));
    }

    #[test]
    fn explicit_play_surfaces_refusal() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, false).unwrap();
        probe.lock().unwrap().refuse_play = true;

        let err = session.play().unwrap_err();

        assert!(matches!(err, PlaybackError::PlaybackStartFailed(_)));
        assert!(!session.is_playing());

        probe.lock().unwrap().refuse_play = false;
        session.play().unwrap();
        assert!(session.is_playing());
    }

    #[test]
    fn play_without_resource() {
        let (mut session, _probe) = session();
        assert_eq!(session.play(), Err(PlaybackError::NoTrackLoaded));
    }

    #[test]
    fn tick_reads_position() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, true).unwrap();
        probe.lock().unwrap().position = Duration::from_millis(4_600);

        let outcome = session.tick(session.generation());

        assert_eq!(
            outcome,
            TickOutcome::Progress {
                elapsed: Duration::from_millis(4_600)
            }
        );
        assert_eq!(session.elapsed_seconds(), 5);
        assert!((session.progress_percent() - 15.333).abs() < 0.01);
    }

    #[test]
    fn tick_reports_end_instead_of_position() {
        let (mut session, probe) = session();
        session.load_track(2, &track("c"), 0.6, true).unwrap();
        session.tick(session.generation());
        {
            let mut probe = probe.lock().unwrap();
            probe.position = Duration::from_secs(30);
            probe.ended = true;
        }

        let outcome = session.tick(session.generation());

        assert_eq!(outcome, TickOutcome::TrackEnded { index: 2 });
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(!session.is_playing());
        assert!(!session.is_poll_armed());
    }

    #[test]
    fn paused_session_ignores_ticks() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, true).unwrap();
        probe.lock().unwrap().position = Duration::from_secs(3);
        session.tick(session.generation());

        session.pause();
        probe.lock().unwrap().position = Duration::from_secs(9);

        assert_eq!(session.tick(session.generation()), TickOutcome::Stale);
        assert_eq!(session.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn set_volume_reaches_live_resource() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, true).unwrap();

        session.set_volume(0.0);

        assert_eq!(probe.lock().unwrap().volume, 0.0);
        assert!(session.is_playing());
    }

    #[test]
    fn seek_updates_elapsed() {
        let (mut session, _probe) = session();
        session.load_track(0, &track("a"), 0.6, false).unwrap();

        session.seek(Duration::from_secs(12)).unwrap();
        assert_eq!(session.elapsed_seconds(), 12);

        assert_eq!(
            session.seek(Duration::from_secs(31)),
            Err(PlaybackError::InvalidSeekPosition(Duration::from_secs(31)))
        );
    }

    #[test]
    fn dispose_twice_is_harmless() {
        let (mut session, probe) = session();
        session.load_track(0, &track("a"), 0.6, true).unwrap();
        let generation = session.generation();

        session.dispose();
        session.dispose();

        assert!(session.is_disposed());
        assert!(!session.is_poll_armed());
        assert_eq!(session.next_poll_deadline(), None);
        assert_eq!(session.tick(generation), TickOutcome::Stale);
        assert_eq!(probe.lock().unwrap().released, 1);
        assert_eq!(
            session.load_track(0, &track("a"), 0.6, true),
            Err(PlaybackError::Disposed)
        );

        let disposals = session
            .drain_events()
            .into_iter()
            .filter(|e| *e == SessionEvent::Disposed)
            .count();
        assert_eq!(disposals, 1);
    }
}
