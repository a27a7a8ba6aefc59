//! Requests accepted by the session

use crate::types::{QueueSource, RepeatMode, RequestToken};
use cadence_core::{AlbumId, ArtistId, PlaylistId, Track, TrackCatalog, TrackId};

/// A named request to change playback state
///
/// Intents are always accepted; their effect is observed through published
/// snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Resolve and play a single track
    PlayTrack(TrackId),

    /// Resolve and play an album from its first track
    PlayAlbum(AlbumId),

    /// Resolve and play an artist's top tracks
    PlayArtistTopTracks(ArtistId),

    /// Resolve and play a playlist
    PlayPlaylist(PlaylistId),

    /// Play an already-resolved list
    PlayTracks {
        tracks: Vec<Track>,
        source: QueueSource,
    },

    Pause,
    Resume,
    Next,
    Previous,

    /// Jump to a position in seconds
    Seek(f64),

    /// Set volume (0.0-1.0)
    SetVolume(f32),
    ToggleMute,
    ToggleShuffle,
    SetRepeatMode(RepeatMode),

    /// off, all, one, off
    CycleRepeatMode,

    /// Append a track; starts playback on an empty queue
    AddToQueue(Track),

    /// Remove a track that is not the current one
    RemoveFromQueue(TrackId),

    /// Drop everything except the current track
    ClearQueue,

    /// Jump to a queue index (requested order)
    SkipTo(usize),

    /// Reissue whatever failed last
    Retry,
}

/// Catalog query behind a play intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Track(TrackId),
    Album(AlbumId),
    Artist(ArtistId),
    Playlist(PlaylistId),
}

impl Lookup {
    /// Queue source recorded once the lookup resolves
    pub fn source(&self) -> QueueSource {
        match self {
            Lookup::Track(_) => QueueSource::Single,
            Lookup::Album(id) => QueueSource::Album(id.clone()),
            Lookup::Artist(id) => QueueSource::Artist(id.clone()),
            Lookup::Playlist(id) => QueueSource::Playlist(id.clone()),
        }
    }

    /// Run the query against `catalog`
    pub async fn resolve(&self, catalog: &dyn TrackCatalog) -> cadence_core::Result<Vec<Track>> {
        match self {
            Lookup::Track(id) => catalog.get_track(id).await.map(|track| vec![track]),
            Lookup::Album(id) => catalog.get_album_tracks(id).await,
            Lookup::Artist(id) => catalog.get_artist_top_tracks(id).await,
            Lookup::Playlist(id) => catalog.get_playlist_tracks(id).await,
        }
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::Track(id) => write!(f, "track {id}"),
            Lookup::Album(id) => write!(f, "album {id}"),
            Lookup::Artist(id) => write!(f, "artist {id}"),
            Lookup::Playlist(id) => write!(f, "playlist {id}"),
        }
    }
}

/// A lookup issued under a request token
///
/// The store queues these; the runtime resolves them and hands the result
/// back together with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub token: RequestToken,
    pub lookup: Lookup,
}
