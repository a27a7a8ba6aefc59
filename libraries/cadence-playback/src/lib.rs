//! Cadence - Playback Session
//!
//! The single "now playing" state of the client, shared by every UI surface.
//!
//! This crate provides:
//! - A play queue with shuffle (Fisher-Yates) and repeat (Off, All, One)
//! - A synchronous session store that arbitrates concurrent play requests
//!   with request tokens
//! - An adapter owning the one media resource that renders audio
//! - A subscriber bus for observers (callbacks plus a `watch` channel)
//! - A tokio runtime that drives the store from a single task
//!
//! # Architecture
//!
//! `cadence-playback` never fetches metadata or decodes audio itself:
//! - Track metadata comes from a [`TrackCatalog`](cadence_core::TrackCatalog)
//! - Audio is rendered by a [`MediaResource`] supplied by the platform
//!
//! Whatever order catalog responses and media events arrive in, only the
//! latest request is applied.
//!
//! # Example: Driving the store directly
//!
//! ```rust
//! use cadence_core::Track;
//! use cadence_playback::{
//!     Intent, MediaEvents, MediaResource, PlaybackStatus, QueueSource, SessionConfig,
//!     SessionStore,
//! };
//!
//! struct Silent;
//!
//! impl MediaResource for Silent {
//!     fn load(&mut self, _url: &str, events: MediaEvents) {
//!         events.loaded(200.0);
//!     }
//!     fn play(&mut self) {}
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position_seconds: f64) {}
//!     fn set_volume(&mut self, _level: f32) {}
//!     fn stop(&mut self) {}
//! }
//!
//! let (mut store, mut media_events) = SessionStore::new(SessionConfig::default(), Box::new(Silent));
//!
//! store.apply(Intent::PlayTracks {
//!     tracks: vec![Track::new("1", "Intro", "Band", "https://cdn.example/1.mp3")],
//!     source: QueueSource::Custom,
//! });
//! assert_eq!(store.status(), PlaybackStatus::Loading);
//!
//! while let Ok(notice) = media_events.try_recv() {
//!     store.on_media_event(notice);
//! }
//! assert_eq!(store.status(), PlaybackStatus::Playing);
//! ```
//!
//! # Example: Running a session
//!
//! ```rust,no_run
//! use cadence_core::TrackCatalog;
//! use cadence_playback::{MediaResource, PlaybackSession, SessionConfig};
//! use std::sync::Arc;
//!
//! # async fn run(catalog: Arc<dyn TrackCatalog>, resource: Box<dyn MediaResource>) {
//! let session = PlaybackSession::start(SessionConfig::default(), catalog, resource);
//!
//! let _subscription = session.subscribe(|snapshot| {
//!     println!("{:?} {:?}", snapshot.status, snapshot.current_track);
//! });
//!
//! session.play_album("kind-of-blue");
//! session.next();
//! session.shutdown().await.ok();
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod bus;
pub mod engine;
pub mod error;
pub mod intent;
pub mod queue;
pub mod session;
pub mod shuffle;
pub mod snapshot;
pub mod store;
pub mod types;
pub mod volume;

pub use bus::{SubscriberBus, Subscription};
pub use engine::{MediaEngineAdapter, MediaEvent, MediaEvents, MediaNotice, MediaResource};
pub use error::{PlaybackError, PlaybackErrorKind, Result};
pub use intent::{CatalogRequest, Intent, Lookup};
pub use queue::Queue;
pub use session::{global, init_global, PlaybackSession};
pub use snapshot::SessionSnapshot;
pub use store::SessionStore;
pub use types::{PlaybackStatus, QueueSource, RepeatMode, RequestToken, SessionConfig};
pub use volume::Volume;
