/// Playlist file loading
use crate::error::{CliError, Result};
use deck_playback::{Playlist, Track};
use std::path::Path;
use tracing::{info, warn};

/// Read a JSON array of tracks
///
/// Tracks without a preview URL are kept (they show up but cannot play).
pub fn load_playlist(path: &Path) -> Result<Playlist> {
    let contents = std::fs::read_to_string(path)?;
    let tracks: Vec<Track> =
        serde_json::from_str(&contents).map_err(|e| CliError::Playlist {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if tracks.is_empty() {
        return Err(CliError::Playlist {
            path: path.to_path_buf(),
            reason: "playlist has no tracks".to_string(),
        });
    }

    let unplayable = tracks.iter().filter(|t| !t.is_playable()).count();
    if unplayable > 0 {
        warn!(unplayable, "Some tracks have no preview URL");
    }
    info!(tracks = tracks.len(), path = %path.display(), "Playlist loaded");

    Ok(tracks.into())
}

/// One line per track: index, name, artists, playability
pub fn describe(playlist: &Playlist) -> Vec<String> {
    playlist
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let marker = if track.is_playable() { ' ' } else { 'x' };
            let artists = track.artists_label();
            if artists.is_empty() {
                format!("{marker} {index:>3}  {}", track.name)
            } else {
                format!("{marker} {index:>3}  {} - {artists}", track.name)
            }
        })
        .collect()
}
