/// Terminal host configuration
use crate::error::{CliError, Result};
use deck_playback::{SessionConfig, SimulatedBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file picked up from the working directory when none is given
const DEFAULT_CONFIG_FILE: &str = "deck.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeckConfig {
    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    #[serde(default = "default_autoplay_on_advance")]
    pub autoplay_on_advance: bool,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_preview_length_secs")]
    pub preview_length_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Play requests refused before the first one succeeds
    #[serde(default)]
    pub block_autoplay_attempts: u32,

    /// Stream URLs that fail to open
    #[serde(default)]
    pub unreachable_urls: Vec<String>,
}

impl DeckConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `deck.toml` is used if present.
    /// Environment variables prefixed with `DECK_` override file values,
    /// with `__` between section and key (`DECK_PLAYER__INITIAL_VOLUME`).
    /// `DECK_SIMULATION__UNREACHABLE_URLS` takes a comma-separated list.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("DECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("simulation.unreachable_urls"),
        );

        let config = settings.build()?;
        config.try_deserialize().map_err(CliError::from)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.player.initial_volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(CliError::Config(format!(
                "player.initial_volume must be within 0.0-1.0, got {volume}"
            )));
        }

        if self.player.poll_interval_ms == 0 {
            return Err(CliError::Config(
                "player.poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.player.preview_length_secs == 0 {
            return Err(CliError::Config(
                "player.preview_length_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Session settings for the player
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(self.player.poll_interval_ms),
            preview_length: self.preview_length(),
            initial_volume: self.player.initial_volume,
            autoplay_on_advance: self.player.autoplay_on_advance,
        }
    }

    /// Simulated media backend matching the `[simulation]` section
    pub fn backend(&self) -> SimulatedBackend {
        self.simulation.unreachable_urls.iter().fold(
            SimulatedBackend::with_length(self.preview_length())
                .block_autoplay(self.simulation.block_autoplay_attempts),
            |backend, url| backend.with_unreachable(url.clone()),
        )
    }

    fn preview_length(&self) -> Duration {
        Duration::from_secs(self.player.preview_length_secs)
    }
}

// Default values
fn default_player() -> PlayerSettings {
    PlayerSettings {
        initial_volume: default_initial_volume(),
        autoplay_on_advance: default_autoplay_on_advance(),
        poll_interval_ms: default_poll_interval_ms(),
        preview_length_secs: default_preview_length_secs(),
    }
}

fn default_initial_volume() -> f32 {
    0.6
}

fn default_autoplay_on_advance() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_preview_length_secs() -> u64 {
    30
}

fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        block_autoplay_attempts: 0,
        unreachable_urls: Vec::new(),
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            simulation: default_simulation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_session_defaults() {
        let config = DeckConfig::default();
        config.validate().unwrap();
        assert_eq!(config.session_config(), SessionConfig::default());
    }

    #[test]
    fn rejects_out_of_range_volume() {
        let mut config = DeckConfig::default();
        config.player.initial_volume = 1.5;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn rejects_zero_poll_interval() {
        let mut config = DeckConfig::default();
        config.player.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_partial_file_with_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[player]\ninitial_volume = 0.25\n\n[simulation]\nblock_autoplay_attempts = 2"
        )
        .unwrap();

        let config = DeckConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.player.initial_volume, 0.25);
        assert!(config.player.autoplay_on_advance);
        assert_eq!(config.player.poll_interval_ms, 1000);
        assert_eq!(config.simulation.block_autoplay_attempts, 2);
    }

    #[test]
    fn environment_overrides_unreachable_urls_list() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        std::env::set_var(
            "DECK_SIMULATION__UNREACHABLE_URLS",
            "https://cdn.test/a.mp3,https://cdn.test/b.mp3",
        );

        let config = DeckConfig::load(Some(file.path()));
        std::env::remove_var("DECK_SIMULATION__UNREACHABLE_URLS");

        assert_eq!(
            config.unwrap().simulation.unreachable_urls,
            vec!["https://cdn.test/a.mp3", "https://cdn.test/b.mp3"]
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = DeckConfig::load(Some(Path::new("/nonexistent/deck.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }
}
