//! Cadence Core
//!
//! Domain types, catalog traits, and error handling shared by every Cadence crate.
//!
//! The playback session never talks to a REST API or a database directly. It
//! resolves tracks through the [`TrackCatalog`] trait defined here, which the
//! `cadence-catalog` crate implements over HTTP and as an in-memory fixture.
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Track, TrackId, AlbumId};
//!
//! let track = Track::new("42", "Blue in Green", "Miles Davis", "https://cdn.example.com/42.mp3")
//!     .with_album(AlbumId::new("kind-of-blue"))
//!     .with_duration(337.0);
//!
//! assert_eq!(track.id, TrackId::new("42"));
//! assert_eq!(track.album_id.as_ref().map(AlbumId::as_str), Some("kind-of-blue"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CatalogError, Result};
pub use traits::TrackCatalog;
pub use types::{AlbumId, ArtistId, PlaylistId, Track, TrackId};
