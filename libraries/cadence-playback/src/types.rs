//! Core types for the playback session

use cadence_core::{AlbumId, ArtistId, PlaylistId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transport status of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Nothing is playing (empty queue, or the queue ran out)
    #[default]
    Idle,

    /// Waiting for catalog resolution or media load
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// The last request failed; see the snapshot's error field
    Error,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the player-bar cycle: off, all, one, off
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

impl std::str::FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(RepeatMode::Off),
            "all" | "repeat-all" => Ok(RepeatMode::All),
            "one" | "repeat-one" => Ok(RepeatMode::One),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}

/// Context a queue was generated from
///
/// Lets UI surfaces highlight the album or artist card that is currently
/// playing without keeping their own copy of session state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum QueueSource {
    /// A single track was requested
    Single,

    /// Tracks of an album
    Album(AlbumId),

    /// Top tracks of an artist
    Artist(ArtistId),

    /// Tracks of a playlist
    Playlist(PlaylistId),

    /// A caller-supplied list (search results, "play all")
    #[default]
    Custom,
}

/// Identifies one request that changes the current track
///
/// Tokens are allocated from a monotonically increasing counter. Results of
/// asynchronous work carry the token they were issued under and are dropped
/// once a newer token exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Token following this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Configuration for the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Initial volume (0.0-1.0, default: 0.7)
    pub volume: f32,

    /// Initial repeat mode (default: Off)
    pub repeat: RepeatMode,

    /// Start with shuffle enabled (default: false)
    pub shuffle: bool,

    /// `previous` restarts the current track instead of moving back once
    /// playback is past this many seconds (default: 3.0, 0 disables)
    pub restart_threshold_seconds: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            repeat: RepeatMode::Off,
            shuffle: false,
            restart_threshold_seconds: 3.0,
        }
    }
}
