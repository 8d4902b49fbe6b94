/// Preview Deck - terminal preview player
use clap::{Parser, Subcommand};
use deck_cli::{app, playlist, DeckConfig};
use deck_playback::{spawn_player, PreviewPlayer};
use std::path::{Path, PathBuf};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "deck")]
#[command(about = "Preview Deck terminal player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a playlist interactively
    Play {
        /// Playlist JSON file (array of tracks)
        playlist: PathBuf,
        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// List the tracks in a playlist
    List {
        /// Playlist JSON file (array of tracks)
        playlist: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so stdout stays clean for the status line)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deck_cli=info,deck_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { playlist, config } => {
            play(playlist, config).await?;
        }
        Commands::List { playlist } => {
            list(&playlist)?;
        }
    }

    Ok(())
}

async fn play(playlist_path: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration
    let config = DeckConfig::load(config_path.as_deref())?;
    config.validate()?;

    let playlist = playlist::load_playlist(&playlist_path)?;

    tracing::info!("Starting Preview Deck");
    tracing::info!("Volume: {}", config.player.initial_volume);
    tracing::info!("Poll interval: {}ms", config.player.poll_interval_ms);

    let mut player = PreviewPlayer::new(
        playlist,
        Box::new(config.backend()),
        config.session_config(),
    );
    if let Err(e) = player.load_initial() {
        tracing::warn!("First track could not be loaded: {}", e);
    }

    let handle = spawn_player(player);
    let stdin = BufReader::new(tokio::io::stdin());
    app::run(handle, stdin, std::io::stdout()).await?;

    tracing::info!("Preview Deck stopped");
    Ok(())
}

fn list(playlist_path: &Path) -> anyhow::Result<()> {
    let playlist = playlist::load_playlist(playlist_path)?;
    for line in playlist::describe(&playlist) {
        println!("{line}");
    }
    Ok(())
}
