mod ids;
mod track;

pub use ids::{AlbumId, ArtistId, PlaylistId, TrackId};
pub use track::Track;
