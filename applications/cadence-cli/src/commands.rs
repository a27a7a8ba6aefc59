//! REPL command parsing

use cadence_core::TrackId;
use cadence_playback::{Intent, RepeatMode};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

/// One parsed line of input
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Intent(Intent),
    /// Append a catalog track to the queue (needs a lookup first)
    Enqueue(TrackId),
    Queue,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  track <id>          play a single track
  album <id>          play an album
  artist <id>         play an artist's top tracks
  playlist <id>       play a playlist
  pause | resume      pause or resume playback
  next | prev         skip forward or back
  seek <seconds>      jump within the current track
  volume <0-100>      set the volume
  mute                toggle mute
  shuffle             toggle shuffle
  repeat [off|all|one]  set repeat mode (cycles without an argument)
  add <track id>      append a track to the queue
  remove <track id>   remove a track from the queue
  skip <n>            jump to queue position n (1-based)
  clear               drop everything but the current track
  retry               retry the last failed request
  queue               show the queue
  status              show the session state
  quit                stop playback and exit";

/// Parse a REPL line; blank lines yield `None`
pub fn parse(line: &str) -> Option<Result<ReplCommand, CommandError>> {
    let mut words = line.split_whitespace();
    let command = words.next()?.to_ascii_lowercase();
    let arg = words.next();

    Some(parse_command(&command, arg))
}

fn parse_command(command: &str, arg: Option<&str>) -> Result<ReplCommand, CommandError> {
    let intent = match command {
        "track" | "play" => Intent::PlayTrack(required(arg, "track <id>")?.into()),
        "album" => Intent::PlayAlbum(required(arg, "album <id>")?.into()),
        "artist" => Intent::PlayArtistTopTracks(required(arg, "artist <id>")?.into()),
        "playlist" => Intent::PlayPlaylist(required(arg, "playlist <id>")?.into()),
        "pause" => Intent::Pause,
        "resume" => Intent::Resume,
        "next" | "n" => Intent::Next,
        "prev" | "previous" | "p" => Intent::Previous,
        "seek" => Intent::Seek(number(required(arg, "seek <seconds>")?)?),
        "volume" | "vol" => {
            let percent: f32 = number(required(arg, "volume <0-100>")?)?;
            Intent::SetVolume(percent / 100.0)
        }
        "mute" => Intent::ToggleMute,
        "shuffle" => Intent::ToggleShuffle,
        "repeat" => match arg {
            Some(mode) => Intent::SetRepeatMode(
                mode.parse::<RepeatMode>()
                    .map_err(|_| CommandError::Usage("repeat [off|all|one]"))?,
            ),
            None => Intent::CycleRepeatMode,
        },
        "add" => return Ok(ReplCommand::Enqueue(required(arg, "add <track id>")?.into())),
        "remove" | "rm" => Intent::RemoveFromQueue(required(arg, "remove <track id>")?.into()),
        "skip" => {
            let position: usize = number(required(arg, "skip <n>")?)?;
            if position == 0 {
                return Err(CommandError::Usage("skip <n> (positions start at 1)"));
            }
            Intent::SkipTo(position - 1)
        }
        "clear" => Intent::ClearQueue,
        "retry" => Intent::Retry,
        "queue" | "q" => return Ok(ReplCommand::Queue),
        "status" | "s" => return Ok(ReplCommand::Status),
        "help" | "?" => return Ok(ReplCommand::Help),
        "quit" | "exit" => return Ok(ReplCommand::Quit),
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(ReplCommand::Intent(intent))
}

fn required<'a>(arg: Option<&'a str>, usage: &'static str) -> Result<&'a str, CommandError> {
    arg.ok_or(CommandError::Usage(usage))
}

fn number<T: std::str::FromStr>(arg: &str) -> Result<T, CommandError> {
    arg.parse()
        .map_err(|_| CommandError::InvalidNumber(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(line: &str) -> Intent {
        match parse(line) {
            Some(Ok(ReplCommand::Intent(intent))) => intent,
            other => panic!("Expected intent for {line:?}, got: {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert!(parse("").is_none());
        assert!(parse("   ").is_none());
    }

    #[test]
    fn play_commands() {
        assert_eq!(intent("track 42"), Intent::PlayTrack("42".into()));
        assert_eq!(intent("ALBUM kind-of-blue"), Intent::PlayAlbum("kind-of-blue".into()));
        assert_eq!(intent("artist 7"), Intent::PlayArtistTopTracks("7".into()));
        assert_eq!(intent("playlist mix"), Intent::PlayPlaylist("mix".into()));
    }

    #[test]
    fn volume_is_a_percentage() {
        assert_eq!(intent("volume 50"), Intent::SetVolume(0.5));
    }

    #[test]
    fn repeat_with_and_without_mode() {
        assert_eq!(intent("repeat"), Intent::CycleRepeatMode);
        assert_eq!(intent("repeat one"), Intent::SetRepeatMode(RepeatMode::One));
        assert_eq!(
            parse("repeat sometimes"),
            Some(Err(CommandError::Usage("repeat [off|all|one]")))
        );
    }

    #[test]
    fn skip_is_one_based() {
        assert_eq!(intent("skip 3"), Intent::SkipTo(2));
        assert!(matches!(parse("skip 0"), Some(Err(CommandError::Usage(_)))));
    }

    #[test]
    fn argument_errors() {
        assert_eq!(parse("track"), Some(Err(CommandError::Usage("track <id>"))));
        assert_eq!(
            parse("seek soon"),
            Some(Err(CommandError::InvalidNumber("soon".to_string())))
        );
        assert_eq!(
            parse("dance"),
            Some(Err(CommandError::Unknown("dance".to_string())))
        );
    }

    #[test]
    fn non_intent_commands() {
        assert_eq!(parse("queue"), Some(Ok(ReplCommand::Queue)));
        assert_eq!(parse("status"), Some(Ok(ReplCommand::Status)));
        assert_eq!(parse("quit"), Some(Ok(ReplCommand::Quit)));
        assert_eq!(parse("add 9"), Some(Ok(ReplCommand::Enqueue("9".into()))));
    }
}
