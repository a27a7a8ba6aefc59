//! REST catalog client.

use crate::error::{ClientError, Result};
use crate::types::{CatalogConfig, Playlist, PlaylistDto, TrackDto};
use async_trait::async_trait;
use cadence_core::{AlbumId, ArtistId, CatalogError, PlaylistId, Track, TrackCatalog, TrackId};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Track catalog backed by the social-music REST API.
///
/// # Example
///
/// ```no_run
/// use cadence_catalog::{CatalogConfig, HttpCatalog};
/// use cadence_core::{TrackCatalog, TrackId};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let catalog = HttpCatalog::new(CatalogConfig::new("https://music.example.com"))?;
/// let track = catalog.get_track(&TrackId::new("42")).await?;
/// println!("{} by {}", track.title, track.artist_name);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: Client,
    base: Url,
    access_token: Option<String>,
}

impl HttpCatalog {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let base = Url::parse(config.url.trim_end_matches('/'))
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                config.url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(format!("Cadence/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(url = %base, authenticated = config.access_token.is_some(), "Catalog client ready");

        Ok(Self {
            http,
            base,
            access_token: config.access_token,
        })
    }

    /// Base URL of the API, without trailing slash.
    pub fn url(&self) -> &str {
        self.base.as_str().trim_end_matches('/')
    }

    /// Fetch a single track.
    pub async fn fetch_track(&self, id: &TrackId) -> Result<Track> {
        let url = self.endpoint(&["api", "tracks", id.as_str()]);
        let dto: TrackDto = self.get_json(url, "Track", id.as_str()).await?;
        Ok(dto.into_track())
    }

    /// Fetch all tracks of an album, in album order.
    pub async fn fetch_album_tracks(&self, id: &AlbumId) -> Result<Vec<Track>> {
        let url = self.endpoint(&["api", "albums", id.as_str(), "tracks"]);
        let dtos: Vec<TrackDto> = self.get_json(url, "Album", id.as_str()).await?;
        debug!(album_id = %id, tracks = dtos.len(), "Fetched album tracks");
        Ok(dtos.into_iter().map(TrackDto::into_track).collect())
    }

    /// Fetch an artist's top tracks.
    pub async fn fetch_artist_top_tracks(&self, id: &ArtistId) -> Result<Vec<Track>> {
        let url = self.endpoint(&["api", "artists", id.as_str(), "top-tracks"]);
        let dtos: Vec<TrackDto> = self.get_json(url, "Artist", id.as_str()).await?;
        debug!(artist_id = %id, tracks = dtos.len(), "Fetched artist top tracks");
        Ok(dtos.into_iter().map(TrackDto::into_track).collect())
    }

    /// Fetch a playlist with its tracks.
    pub async fn fetch_playlist(&self, id: &PlaylistId) -> Result<Playlist> {
        let url = self.endpoint(&["api", "playlists", id.as_str()]);
        let dto: PlaylistDto = self.get_json(url, "Playlist", id.as_str()).await?;
        let playlist = Playlist::from(dto);
        debug!(playlist_id = %id, name = %playlist.name, tracks = playlist.tracks.len(), "Fetched playlist");
        Ok(playlist)
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // Base was checked in `new`, so it always has path segments
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        entity: &'static str,
        id: &str,
    ) -> Result<T> {
        debug!(url = %url, entity, id, "Catalog request");

        let mut request = self.http.get(url.clone());
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                ClientError::ServerUnreachable(e.to_string())
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                ClientError::ParseError(format!("Failed to parse {} response: {}", entity, e))
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(ClientError::NotFound {
                entity,
                id: id.to_string(),
            })
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(url = %url, status = status.as_u16(), "Catalog rejected credentials");
            Err(ClientError::AuthRequired)
        } else {
            let message = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Catalog request failed");
            Err(ClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl TrackCatalog for HttpCatalog {
    async fn get_track(&self, id: &TrackId) -> cadence_core::Result<Track> {
        self.fetch_track(id).await.map_err(CatalogError::from)
    }

    async fn get_album_tracks(&self, id: &AlbumId) -> cadence_core::Result<Vec<Track>> {
        self.fetch_album_tracks(id).await.map_err(CatalogError::from)
    }

    async fn get_artist_top_tracks(&self, id: &ArtistId) -> cadence_core::Result<Vec<Track>> {
        self.fetch_artist_top_tracks(id)
            .await
            .map_err(CatalogError::from)
    }

    async fn get_playlist_tracks(&self, id: &PlaylistId) -> cadence_core::Result<Vec<Track>> {
        self.fetch_playlist(id)
            .await
            .map(|playlist| playlist.tracks)
            .map_err(CatalogError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_and_encodes_segments() {
        let catalog = HttpCatalog::new(CatalogConfig::new("https://example.com/v2/")).unwrap();

        let url = catalog.endpoint(&["api", "tracks", "a b/c"]);
        assert_eq!(url.as_str(), "https://example.com/v2/api/tracks/a%20b%2Fc");
        assert_eq!(catalog.url(), "https://example.com/v2");
    }

    #[test]
    fn endpoint_on_bare_host() {
        let catalog = HttpCatalog::new(CatalogConfig::new("http://localhost:8080")).unwrap();
        let url = catalog.endpoint(&["api", "albums", "1", "tracks"]);
        assert_eq!(url.as_str(), "http://localhost:8080/api/albums/1/tracks");
    }
}
