/// Interactive command parsing
use deck_playback::PlayerCommand;
use std::time::Duration;

pub const HELP: &str = "\
commands:
  p, play          start playback
  pause            pause playback
  t, toggle        play/pause
  n, next          next track
  b, prev          previous track
  g <index>        jump to track
  s <seconds>      seek
  v <0.0-1.0>      set volume
  m, mute          toggle mute
  h, help          show this help
  q, quit          exit";

/// A parsed line of user input
#[derive(Debug)]
pub enum Input {
    Command(PlayerCommand),
    Help,
    Quit,
    Empty,
}

/// Parse one line of input
pub fn parse(line: &str) -> Result<Input, String> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(Input::Empty);
    };
    let argument = parts.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "p" | "play" => PlayerCommand::Play,
        "pause" => PlayerCommand::Pause,
        "t" | "toggle" => PlayerCommand::TogglePlay,
        "n" | "next" => PlayerCommand::Next,
        "b" | "prev" | "previous" => PlayerCommand::Previous,
        "m" | "mute" => PlayerCommand::ToggleMute,
        "g" | "goto" => PlayerCommand::Select(required(argument, verb)?),
        "v" | "volume" => {
            let level: f32 = required(argument, verb)?;
            if !(0.0..=1.0).contains(&level) {
                return Err(format!("volume must be within 0.0-1.0, got {level}"));
            }
            PlayerCommand::SetVolume(level)
        }
        "s" | "seek" => {
            let seconds: f64 = required(argument, verb)?;
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(format!("cannot seek to {seconds}"));
            }
            let position = Duration::try_from_secs_f64(seconds)
                .map_err(|_| format!("cannot seek to {seconds}"))?;
            PlayerCommand::Seek(position)
        }
        "h" | "help" | "?" => return Ok(Input::Help),
        "q" | "quit" | "exit" => return Ok(Input::Quit),
        other => return Err(format!("unknown command: {other} (try 'help')")),
    };

    Ok(Input::Command(command))
}

fn required<T: std::str::FromStr>(argument: Option<&str>, verb: &str) -> Result<T, String> {
    let argument = argument.ok_or_else(|| format!("{verb} needs an argument"))?;
    argument
        .parse()
        .map_err(|_| format!("invalid argument for {verb}: {argument}"))
}
