/// Track domain type
use crate::types::{AlbumId, ArtistId, TrackId};
use serde::{Deserialize, Serialize};

/// Streamable track
///
/// Immutable value resolved from a catalog. The playback session copies it
/// into its queue and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist identifier (absent for user uploads without an artist page)
    #[serde(default)]
    pub artist_id: Option<ArtistId>,

    /// Artist display name
    pub artist_name: String,

    /// Album identifier (absent for singles)
    #[serde(default)]
    pub album_id: Option<AlbumId>,

    /// Track duration in seconds as reported by the catalog (0 when unknown)
    #[serde(default)]
    pub duration_seconds: f64,

    /// URL the media engine loads
    pub stream_url: String,

    /// Cover artwork URL
    #[serde(default)]
    pub cover_url: Option<String>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(
        id: impl Into<TrackId>,
        title: impl Into<String>,
        artist_name: impl Into<String>,
        stream_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist_id: None,
            artist_name: artist_name.into(),
            album_id: None,
            duration_seconds: 0.0,
            stream_url: stream_url.into(),
            cover_url: None,
        }
    }

    /// Set the artist identifier
    pub fn with_artist(mut self, artist_id: ArtistId) -> Self {
        self.artist_id = Some(artist_id);
        self
    }

    /// Set the album identifier
    pub fn with_album(mut self, album_id: AlbumId) -> Self {
        self.album_id = Some(album_id);
        self
    }

    /// Set the duration in seconds
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = seconds.max(0.0);
        self
    }

    /// Set the cover artwork URL
    pub fn with_cover(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let track = Track::new("t1", "Intro", "The xx", "https://cdn/t1.mp3")
            .with_artist(ArtistId::new("xx"))
            .with_album(AlbumId::new("xx-1"))
            .with_duration(127.5)
            .with_cover("https://cdn/xx-1.jpg");

        assert_eq!(track.artist_id, Some(ArtistId::new("xx")));
        assert_eq!(track.album_id, Some(AlbumId::new("xx-1")));
        assert_eq!(track.duration_seconds, 127.5);
        assert_eq!(track.cover_url.as_deref(), Some("https://cdn/xx-1.jpg"));
    }

    #[test]
    fn negative_duration_is_clamped() {
        let track = Track::new("t1", "Intro", "The xx", "u").with_duration(-3.0);
        assert_eq!(track.duration_seconds, 0.0);
    }

    #[test]
    fn deserializes_with_missing_optionals() {
        let json = r#"{"id":"t9","title":"Song","artistName":"Someone","streamUrl":"https://cdn/t9.mp3"}"#;
        let track: Track = serde_json::from_str(json).unwrap();

        assert_eq!(track.id.as_str(), "t9");
        assert!(track.album_id.is_none());
        assert_eq!(track.duration_seconds, 0.0);
    }
}
