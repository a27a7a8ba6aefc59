//! Published session state

use crate::error::PlaybackErrorKind;
use crate::types::{PlaybackStatus, QueueSource, RepeatMode, RequestToken};
use cadence_core::Track;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Immutable copy of the session handed to subscribers
///
/// `current_track` is always `queue[cursor]` when `cursor` is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: PlaybackStatus,
    pub current_track: Option<Track>,

    /// Tracks in requested order (shared with the store until it edits the queue)
    pub queue: Arc<Vec<Track>>,
    pub cursor: Option<usize>,

    /// Traversal order while shuffle is on
    pub shuffle_order: Option<Vec<usize>>,

    /// Context that produced the queue
    pub source: QueueSource,

    pub position_seconds: f64,
    pub duration_seconds: f64,

    /// Stored level (0.0-1.0), kept while muted
    pub volume: f32,
    pub muted: bool,
    pub is_shuffled: bool,
    pub repeat_mode: RepeatMode,

    /// Kind of the last failure
    pub error: Option<PlaybackErrorKind>,

    /// Token of the latest request that changed the current track
    pub request_token: RequestToken,
}

impl SessionSnapshot {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Whether `track` is what the session is on, for "now playing" badges
    pub fn is_current(&self, track: &Track) -> bool {
        self.current_track
            .as_ref()
            .is_some_and(|current| current.id == track.id)
    }
}
