//! Player task
//!
//! Runs one [`PreviewPlayer`] on a tokio task. Commands arrive over an mpsc
//! channel, the poll timer is driven with `sleep_until`, and session events
//! fan out on a broadcast channel. All player mutation happens on this one
//! task, so no locking is needed.

use crate::{
    error::{PlaybackError, Result},
    events::SessionEvent,
    player::{Playlist, PreviewPlayer},
    view::PlayerView,
};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// Command channel depth
const COMMAND_CAPACITY: usize = 32;

/// Event channel depth (slow subscribers see `Lagged`)
const EVENT_CAPACITY: usize = 256;

/// Commands sent to the player task
#[derive(Debug)]
pub enum PlayerCommand {
    /// Start or resume playback
    Play,

    /// Pause playback
    Pause,

    /// Play/pause button
    TogglePlay,

    /// Skip to next track
    Next,

    /// Go to previous track
    Previous,

    /// Jump to playlist index
    Select(usize),

    /// Seek to position
    Seek(Duration),

    /// Set slider level (0.0-1.0)
    SetVolume(f32),

    /// Mute icon clicked
    ToggleMute,

    /// Swap in a new playlist
    ReplacePlaylist(Playlist),

    /// Request a render snapshot
    Snapshot(oneshot::Sender<PlayerView>),
}

/// Handle to a running player task
///
/// Dropping the handle closes the command channel, which disposes the
/// player and ends the task.
#[derive(Debug)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    events: broadcast::Sender<SessionEvent>,
    task: JoinHandle<()>,
}

impl PlayerHandle {
    /// Send a command to the player
    pub async fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::Disposed)
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current render snapshot
    pub async fn view(&self) -> Result<PlayerView> {
        let (tx, rx) = oneshot::channel();
        self.send(PlayerCommand::Snapshot(tx)).await?;
        rx.await.map_err(|_| PlaybackError::Disposed)
    }

    /// Dispose the player and wait for the task to finish
    pub async fn shutdown(self) {
        let PlayerHandle { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            warn!(error = %e, "Player task ended abnormally");
        }
    }
}

/// Spawn `player` onto the current tokio runtime
///
/// The player should already have its initial track loaded (or not, if
/// the caller wants `Play` to load it).
pub fn spawn_player(player: PreviewPlayer) -> PlayerHandle {
    let (commands, command_rx) = mpsc::channel(COMMAND_CAPACITY);
    let (events, _) = broadcast::channel(EVENT_CAPACITY);

    let task = tokio::spawn(run_player(player, command_rx, events.clone()));

    PlayerHandle {
        commands,
        events,
        task,
    }
}

async fn run_player(
    mut player: PreviewPlayer,
    mut commands: mpsc::Receiver<PlayerCommand>,
    events: broadcast::Sender<SessionEvent>,
) {
    debug!("Player task started");
    publish(&mut player, &events);

    loop {
        let deadline = player.next_poll_deadline();

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                if let Err(e) = apply(&mut player, command) {
                    report(&e, "Player command failed", &events);
                }
            }
            () = sleep_until(deadline) => {
                if let Some(generation) = player.fire_poll(Instant::now()) {
                    if let Err(e) = player.on_poll(generation) {
                        report(&e, "Advance after finished preview failed", &events);
                    }
                }
            }
        }

        publish(&mut player, &events);
    }

    player.dispose();
    publish(&mut player, &events);
    debug!("Player task stopped");
}

fn apply(player: &mut PreviewPlayer, command: PlayerCommand) -> Result<()> {
    match command {
        PlayerCommand::Play => player.play(),
        PlayerCommand::Pause => {
            player.pause();
            Ok(())
        }
        PlayerCommand::TogglePlay => player.toggle_play(),
        PlayerCommand::Next => player.next().map(|_| ()),
        PlayerCommand::Previous => player.previous().map(|_| ()),
        PlayerCommand::Select(index) => player.select(index).map(|_| ()),
        PlayerCommand::Seek(position) => player.seek(position),
        PlayerCommand::SetVolume(level) => {
            player.set_volume(level);
            Ok(())
        }
        PlayerCommand::ToggleMute => {
            player.toggle_mute();
            Ok(())
        }
        PlayerCommand::ReplacePlaylist(playlist) => player.replace_playlist(playlist).map(|_| ()),
        PlayerCommand::Snapshot(reply) => {
            // Receiver may have given up waiting
            let _ = reply.send(player.view());
            Ok(())
        }
    }
}

/// Log a failed operation and broadcast it to subscribers
fn report(err: &PlaybackError, context: &str, events: &broadcast::Sender<SessionEvent>) {
    if err.is_recoverable() {
        warn!(error = %err, "{context}");
    } else {
        error!(error = %err, "{context}");
    }
    let _ = events.send(SessionEvent::Error {
        message: err.to_string(),
    });
}

fn publish(player: &mut PreviewPlayer, events: &broadcast::Sender<SessionEvent>) {
    for event in player.drain_events() {
        // No subscribers is fine
        let _ = events.send(event);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
