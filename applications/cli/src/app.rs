/// Interactive session loop
///
/// Reads commands line by line, forwards them to the player task and
/// redraws a one-line status whenever the session reports a change.
use crate::commands::{self, Input, HELP};
use crate::error::Result;
use deck_playback::{PlayerHandle, PlayerView, SessionEvent, SessionState};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Width of the progress bar in characters
const BAR_WIDTH: usize = 20;

/// Render a status line for the terminal
pub fn status_line(view: &PlayerView) -> String {
    if view.total == 0 {
        return "(empty playlist)".to_string();
    }

    let icon = match view.state {
        SessionState::Playing => ">",
        SessionState::Paused => "=",
        SessionState::Idle => "x",
    };

    let filled = ((view.progress_percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));

    let volume = if view.muted {
        "muted".to_string()
    } else {
        format!("{:.0}%", view.effective_volume * 100.0)
    };

    let mut line = format!(
        "[{icon}] {} [{bar}] {}  {}/{}  {}",
        view.elapsed_label,
        view.length_label,
        view.index + 1,
        view.total,
        view.title
    );
    if !view.artists.is_empty() {
        line.push_str(" - ");
        line.push_str(&view.artists);
    }
    line.push_str("  vol ");
    line.push_str(&volume);
    line
}

/// Drive `handle` from `input` until quit or end of input
///
/// The player is shut down before returning.
pub async fn run<R, W>(handle: PlayerHandle, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut events = handle.subscribe();
    let mut lines = input.lines();

    writeln!(out, "{}", status_line(&handle.view().await?))?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("Input closed");
                    break;
                };
                match commands::parse(&line) {
                    Ok(Input::Command(command)) => handle.send(command).await?,
                    Ok(Input::Help) => writeln!(out, "{HELP}")?,
                    Ok(Input::Quit) => break,
                    Ok(Input::Empty) => {}
                    Err(message) => writeln!(out, "{message}")?,
                }
            }
            event = events.recv() => match event {
                Ok(SessionEvent::Error { message }) => writeln!(out, "! {message}")?,
                Ok(SessionEvent::Disposed) | Err(RecvError::Closed) => break,
                Ok(_) => writeln!(out, "{}", status_line(&handle.view().await?))?,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Status display fell behind");
                }
            }
        }
        out.flush()?;
    }

    handle.shutdown().await;
    Ok(())
}
