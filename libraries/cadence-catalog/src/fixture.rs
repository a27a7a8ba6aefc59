//! In-memory catalog.
//!
//! Serves tracks from maps filled in code or loaded from a JSON fixture.
//! Used by the demo binary when no server is configured, and by tests.

use crate::error::{ClientError, Result};
use crate::types::{FixtureCollection, FixtureDocument, TrackDto};
use async_trait::async_trait;
use cadence_core::{AlbumId, ArtistId, CatalogError, PlaylistId, Track, TrackCatalog, TrackId};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Catalog that answers from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    tracks: HashMap<TrackId, Track>,
    albums: HashMap<AlbumId, Vec<Track>>,
    artists: HashMap<ArtistId, Vec<Track>>,
    playlists: HashMap<PlaylistId, (String, Vec<Track>)>,
    /// Artificial delay before every answer
    latency: Option<Duration>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single track.
    #[must_use]
    pub fn with_track(mut self, track: Track) -> Self {
        self.tracks.insert(track.id.clone(), track);
        self
    }

    /// Register an album; its tracks become individually resolvable too.
    #[must_use]
    pub fn with_album(mut self, id: AlbumId, tracks: Vec<Track>) -> Self {
        self.register(&tracks);
        self.albums.insert(id, tracks);
        self
    }

    /// Register an artist's top tracks.
    #[must_use]
    pub fn with_artist_top_tracks(mut self, id: ArtistId, tracks: Vec<Track>) -> Self {
        self.register(&tracks);
        self.artists.insert(id, tracks);
        self
    }

    /// Register a playlist.
    #[must_use]
    pub fn with_playlist(
        mut self,
        id: PlaylistId,
        name: impl Into<String>,
        tracks: Vec<Track>,
    ) -> Self {
        self.register(&tracks);
        self.playlists.insert(id, (name.into(), tracks));
        self
    }

    /// Delay every answer, to make loading states visible.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency).filter(|d| !d.is_zero());
        self
    }

    /// Load a catalog from a JSON fixture file.
    ///
    /// See [`FixtureDocument`] for the layout.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            tracks = catalog.tracks.len(),
            albums = catalog.albums.len(),
            artists = catalog.artists.len(),
            playlists = catalog.playlists.len(),
            "Loaded catalog fixture"
        );
        Ok(catalog)
    }

    /// Parse a catalog from a JSON fixture document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: FixtureDocument = serde_json::from_str(json)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse fixture: {}", e)))?;
        Self::from_document(document)
    }

    fn from_document(document: FixtureDocument) -> Result<Self> {
        let mut catalog = Self::new();
        for dto in document.tracks {
            catalog = catalog.with_track(dto.into_track());
        }

        for album in document.albums {
            let tracks = catalog.collect(&album, "album")?;
            catalog.albums.insert(AlbumId::new(album.id), tracks);
        }
        for artist in document.artists {
            let tracks = catalog.collect(&artist, "artist")?;
            catalog.artists.insert(ArtistId::new(artist.id), tracks);
        }
        for playlist in document.playlists {
            let tracks = catalog.collect(&playlist, "playlist")?;
            catalog
                .playlists
                .insert(PlaylistId::new(playlist.id), (playlist.name, tracks));
        }

        Ok(catalog)
    }

    /// Export as a fixture document (collections inline their track ids).
    pub fn to_document(&self) -> FixtureDocument {
        let mut tracks: Vec<TrackDto> = self.tracks.values().map(TrackDto::from).collect();
        tracks.sort_by(|a, b| a.id.cmp(&b.id));

        let collection = |id: String, name: String, tracks: &[Track]| FixtureCollection {
            id,
            name,
            track_ids: tracks.iter().map(|t| t.id.clone()).collect(),
        };

        FixtureDocument {
            tracks,
            albums: self
                .albums
                .iter()
                .map(|(id, tracks)| collection(id.to_string(), String::new(), tracks))
                .collect(),
            artists: self
                .artists
                .iter()
                .map(|(id, tracks)| collection(id.to_string(), String::new(), tracks))
                .collect(),
            playlists: self
                .playlists
                .iter()
                .map(|(id, (name, tracks))| collection(id.to_string(), name.clone(), tracks))
                .collect(),
        }
    }

    /// Name of a registered playlist.
    pub fn playlist_name(&self, id: &PlaylistId) -> Option<&str> {
        self.playlists.get(id).map(|(name, _)| name.as_str())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn register(&mut self, tracks: &[Track]) {
        for track in tracks {
            self.tracks.insert(track.id.clone(), track.clone());
        }
    }

    fn collect(&self, collection: &FixtureCollection, kind: &str) -> Result<Vec<Track>> {
        collection
            .track_ids
            .iter()
            .map(|id| {
                self.tracks.get(id).cloned().ok_or_else(|| {
                    ClientError::InvalidFixture(format!(
                        "{} {} references unknown track {}",
                        kind, collection.id, id
                    ))
                })
            })
            .collect()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl TrackCatalog for StaticCatalog {
    async fn get_track(&self, id: &TrackId) -> cadence_core::Result<Track> {
        self.delay().await;
        debug!(track_id = %id, "Fixture lookup");
        self.tracks
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Track", id.as_str()))
    }

    async fn get_album_tracks(&self, id: &AlbumId) -> cadence_core::Result<Vec<Track>> {
        self.delay().await;
        self.albums
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Album", id.as_str()))
    }

    async fn get_artist_top_tracks(&self, id: &ArtistId) -> cadence_core::Result<Vec<Track>> {
        self.delay().await;
        self.artists
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::not_found("Artist", id.as_str()))
    }

    async fn get_playlist_tracks(&self, id: &PlaylistId) -> cadence_core::Result<Vec<Track>> {
        self.delay().await;
        self.playlists
            .get(id)
            .map(|(_, tracks)| tracks.clone())
            .ok_or_else(|| CatalogError::not_found("Playlist", id.as_str()))
    }
}
