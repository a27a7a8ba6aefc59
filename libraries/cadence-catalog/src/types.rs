//! Wire and configuration types for the catalog clients.

use cadence_core::{AlbumId, ArtistId, PlaylistId, Track, TrackId};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for [`HttpCatalog`](crate::HttpCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the API (e.g., "https://music.example.com")
    pub url: String,
    /// Bearer token sent with every request
    #[serde(default)]
    pub access_token: Option<String>,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl CatalogConfig {
    /// Create a config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }

    /// Create a config with an access token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::new(url)
        }
    }
}

// =============================================================================
// Track DTO
// =============================================================================

/// Track object as returned by the REST API.
///
/// Ids may arrive as numbers or strings depending on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default, alias = "artistName")]
    pub artist: String,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub artist_id: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub album_id: Option<String>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(alias = "streamUrl")]
    pub audio_url: String,
    #[serde(default, alias = "coverUrl", alias = "imageUrl")]
    pub cover_image_url: Option<String>,
}

impl TrackDto {
    /// Convert into the domain track.
    pub fn into_track(self) -> Track {
        let mut track = Track::new(self.id, self.title, self.artist, self.audio_url)
            .with_duration(self.duration.unwrap_or(0.0));

        if let Some(artist_id) = self.artist_id {
            track = track.with_artist(ArtistId::new(artist_id));
        }
        if let Some(album_id) = self.album_id {
            track = track.with_album(AlbumId::new(album_id));
        }
        if let Some(cover) = self.cover_image_url {
            track = track.with_cover(cover);
        }
        track
    }
}

impl From<&Track> for TrackDto {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.to_string(),
            title: track.title.clone(),
            artist: track.artist_name.clone(),
            artist_id: track.artist_id.as_ref().map(ToString::to_string),
            album: None,
            album_id: track.album_id.as_ref().map(ToString::to_string),
            duration: Some(track.duration_seconds),
            audio_url: track.stream_url.clone(),
            cover_image_url: track.cover_url.clone(),
        }
    }
}

/// Playlist object as returned by `GET /api/playlists/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDto {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<TrackDto>,
}

/// A resolved playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub tracks: Vec<Track>,
}

impl From<PlaylistDto> for Playlist {
    fn from(dto: PlaylistDto) -> Self {
        Self {
            id: PlaylistId::new(dto.id),
            name: dto.name,
            tracks: dto.tracks.into_iter().map(TrackDto::into_track).collect(),
        }
    }
}

// =============================================================================
// Fixture document
// =============================================================================

/// On-disk layout of a [`StaticCatalog`](crate::StaticCatalog) fixture.
///
/// Collections reference tracks by id so each track is written once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FixtureDocument {
    pub tracks: Vec<TrackDto>,
    pub albums: Vec<FixtureCollection>,
    pub artists: Vec<FixtureCollection>,
    pub playlists: Vec<FixtureCollection>,
}

/// Album, artist top-track list, or playlist in a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureCollection {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "topTrackIds")]
    pub track_ids: Vec<TrackId>,
}

// =============================================================================
// Id helpers
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn optional_id_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
