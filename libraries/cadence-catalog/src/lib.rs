//! Cadence Catalog
//!
//! [`TrackCatalog`](cadence_core::TrackCatalog) implementations.
//!
//! - [`HttpCatalog`]: the social-music REST API (`/api/tracks/{id}`,
//!   `/api/albums/{id}/tracks`, `/api/artists/{id}/top-tracks`,
//!   `/api/playlists/{id}`), with optional bearer authentication
//! - [`StaticCatalog`]: in-memory maps, optionally loaded from a JSON fixture
//!
//! # Example
//!
//! ```
//! use cadence_catalog::StaticCatalog;
//! use cadence_core::{AlbumId, Track};
//!
//! let catalog = StaticCatalog::new().with_album(
//!     AlbumId::new("kob"),
//!     vec![Track::new("1", "So What", "Miles Davis", "https://cdn.example/1.mp3")],
//! );
//! assert_eq!(catalog.track_count(), 1);
//! ```

mod client;
mod error;
mod fixture;
mod types;

pub use client::HttpCatalog;
pub use error::{ClientError, Result};
pub use fixture::StaticCatalog;
pub use types::{CatalogConfig, FixtureCollection, FixtureDocument, Playlist, PlaylistDto, TrackDto};
