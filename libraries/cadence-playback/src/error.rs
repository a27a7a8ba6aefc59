//! Error types for playback management

use cadence_core::CatalogError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
///
/// Intents never fail; these cover the few operations around the session
/// lifecycle that can.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The session task is gone (shut down or panicked)
    #[error("Playback session is not running")]
    SessionClosed,

    /// A process-wide session was already installed
    #[error("Playback session already initialized")]
    AlreadyInitialized,

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Failure kinds published in a session snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackErrorKind {
    /// The requested track, album, artist, or playlist does not exist
    CatalogNotFound,

    /// The catalog could not be reached; retrying may succeed
    CatalogNetworkError,

    /// The media resource failed before the track was loaded
    MediaLoadError,

    /// The media resource failed mid-stream
    MediaPlaybackError,
}

impl PlaybackErrorKind {
    /// Whether the failure happened while resolving metadata
    pub fn is_catalog(self) -> bool {
        matches!(self, Self::CatalogNotFound | Self::CatalogNetworkError)
    }
}

impl From<&CatalogError> for PlaybackErrorKind {
    fn from(err: &CatalogError) -> Self {
        if err.is_not_found() {
            PlaybackErrorKind::CatalogNotFound
        } else {
            PlaybackErrorKind::CatalogNetworkError
        }
    }
}
