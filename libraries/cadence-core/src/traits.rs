/// Core traits for Cadence
use crate::error::Result;
use crate::types::{AlbumId, ArtistId, PlaylistId, Track, TrackId};
use async_trait::async_trait;

/// Track catalog
///
/// Resolves ids to ordered track metadata. Implementations own lookup and
/// caching policy; the playback session only awaits the result.
///
/// Every method fails with [`CatalogError::NotFound`](crate::CatalogError::NotFound)
/// when the id does not resolve, or with a network-class error otherwise.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Get a single track
    async fn get_track(&self, id: &TrackId) -> Result<Track>;

    /// Get all tracks of an album, in album order
    async fn get_album_tracks(&self, id: &AlbumId) -> Result<Vec<Track>>;

    /// Get an artist's top tracks, most popular first
    async fn get_artist_top_tracks(&self, id: &ArtistId) -> Result<Vec<Track>>;

    /// Get all tracks of a playlist, in playlist order
    async fn get_playlist_tracks(&self, id: &PlaylistId) -> Result<Vec<Track>>;
}
