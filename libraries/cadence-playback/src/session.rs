//! Session runtime
//!
//! Runs a [`SessionStore`] on its own tokio task. Intents, catalog results
//! and media events all arrive as messages and are applied one at a time,
//! so every transition (publishing included) completes before the next one
//! starts.

use crate::bus::{SubscriberBus, Subscription};
use crate::engine::{MediaNotice, MediaResource};
use crate::error::{PlaybackError, Result};
use crate::intent::{CatalogRequest, Intent};
use crate::snapshot::SessionSnapshot;
use crate::store::SessionStore;
use crate::types::{QueueSource, RepeatMode, SessionConfig};
use cadence_core::{AlbumId, ArtistId, PlaylistId, Track, TrackCatalog, TrackId};
use std::sync::{Arc, OnceLock};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

enum Command {
    Intent(Intent),
    Resolved {
        request: CatalogRequest,
        result: cadence_core::Result<Vec<Track>>,
    },
    Sync(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running playback session
///
/// Cheap to clone; every clone talks to the same session. Intent methods
/// return immediately and never fail. If the session has shut down they
/// are dropped with a warning.
#[derive(Clone)]
pub struct PlaybackSession {
    tx: mpsc::UnboundedSender<Command>,
    bus: Arc<SubscriberBus>,
}

impl PlaybackSession {
    /// Spawn a session on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(
        config: SessionConfig,
        catalog: Arc<dyn TrackCatalog>,
        resource: Box<dyn MediaResource>,
    ) -> Self {
        let (store, media_rx) = SessionStore::new(config, resource);
        let bus = store.bus().clone();
        let (tx, rx) = mpsc::unbounded_channel();

        info!("Starting playback session");
        tokio::spawn(run(store, rx, media_rx, catalog, tx.downgrade()));

        Self { tx, bus }
    }

    /// Send an intent
    pub fn dispatch(&self, intent: Intent) {
        if self.tx.send(Command::Intent(intent)).is_err() {
            warn!("Playback session is not running, intent dropped");
        }
    }

    pub fn play_track(&self, id: impl Into<TrackId>) {
        self.dispatch(Intent::PlayTrack(id.into()));
    }

    pub fn play_album(&self, id: impl Into<AlbumId>) {
        self.dispatch(Intent::PlayAlbum(id.into()));
    }

    pub fn play_artist_top_tracks(&self, id: impl Into<ArtistId>) {
        self.dispatch(Intent::PlayArtistTopTracks(id.into()));
    }

    pub fn play_playlist(&self, id: impl Into<PlaylistId>) {
        self.dispatch(Intent::PlayPlaylist(id.into()));
    }

    /// Play an already-resolved list from its first track
    pub fn play_tracks(&self, tracks: Vec<Track>, source: QueueSource) {
        self.dispatch(Intent::PlayTracks { tracks, source });
    }

    pub fn pause(&self) {
        self.dispatch(Intent::Pause);
    }

    pub fn resume(&self) {
        self.dispatch(Intent::Resume);
    }

    pub fn next(&self) {
        self.dispatch(Intent::Next);
    }

    pub fn previous(&self) {
        self.dispatch(Intent::Previous);
    }

    pub fn seek(&self, position_seconds: f64) {
        self.dispatch(Intent::Seek(position_seconds));
    }

    pub fn set_volume(&self, level: f32) {
        self.dispatch(Intent::SetVolume(level));
    }

    pub fn toggle_mute(&self) {
        self.dispatch(Intent::ToggleMute);
    }

    pub fn toggle_shuffle(&self) {
        self.dispatch(Intent::ToggleShuffle);
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.dispatch(Intent::SetRepeatMode(mode));
    }

    pub fn cycle_repeat_mode(&self) {
        self.dispatch(Intent::CycleRepeatMode);
    }

    pub fn add_to_queue(&self, track: Track) {
        self.dispatch(Intent::AddToQueue(track));
    }

    pub fn remove_from_queue(&self, id: impl Into<TrackId>) {
        self.dispatch(Intent::RemoveFromQueue(id.into()));
    }

    pub fn clear_queue(&self) {
        self.dispatch(Intent::ClearQueue);
    }

    pub fn skip_to(&self, index: usize) {
        self.dispatch(Intent::SkipTo(index));
    }

    pub fn retry(&self) {
        self.dispatch(Intent::Retry);
    }

    /// Register a listener called with every published snapshot
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.bus.snapshot()
    }

    /// Receiver that always holds the latest snapshot
    pub fn watch(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.bus.watch()
    }

    /// Wait until everything sent before this call has been applied
    ///
    /// Catalog lookups still in flight are not waited for.
    pub async fn sync(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Sync(ack))
            .map_err(|_| PlaybackError::SessionClosed)?;
        done.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Stop playback and end the session task
    pub async fn shutdown(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(Command::Shutdown(ack))
            .map_err(|_| PlaybackError::SessionClosed)?;
        done.await.map_err(|_| PlaybackError::SessionClosed)
    }

    /// Whether the session task is still accepting intents
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }
}

impl std::fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

static GLOBAL: OnceLock<PlaybackSession> = OnceLock::new();

/// Install `session` as the process-wide session
pub fn init_global(session: PlaybackSession) -> Result<&'static PlaybackSession> {
    GLOBAL
        .set(session)
        .map_err(|_| PlaybackError::AlreadyInitialized)?;
    GLOBAL.get().ok_or(PlaybackError::SessionClosed)
}

/// The process-wide session, if one was installed
pub fn global() -> Option<&'static PlaybackSession> {
    GLOBAL.get()
}

async fn run(
    mut store: SessionStore,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut media: mpsc::UnboundedReceiver<MediaNotice>,
    catalog: Arc<dyn TrackCatalog>,
    results: mpsc::WeakUnboundedSender<Command>,
) {
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Intent(intent)) => store.apply(intent),
                Some(Command::Resolved { request, result }) => store.on_resolved(request, result),
                Some(Command::Sync(ack)) => {
                    while let Ok(notice) = media.try_recv() {
                        store.on_media_event(notice);
                    }
                    let _ = ack.send(());
                }
                Some(Command::Shutdown(ack)) => {
                    commands.close();
                    store.shutdown();
                    let _ = ack.send(());
                    break;
                }
                None => {
                    store.shutdown();
                    break;
                }
            },
            Some(notice) = media.recv() => store.on_media_event(notice),
        }

        for request in store.take_requests() {
            spawn_lookup(request, catalog.clone(), results.clone());
        }
    }

    info!("Playback session stopped");
}

fn spawn_lookup(
    request: CatalogRequest,
    catalog: Arc<dyn TrackCatalog>,
    results: mpsc::WeakUnboundedSender<Command>,
) {
    tokio::spawn(async move {
        let result = request.lookup.resolve(catalog.as_ref()).await;

        let Some(tx) = results.upgrade() else {
            debug!(lookup = %request.lookup, "Session gone before lookup finished");
            return;
        };
        // Receiver gone means the session is shutting down
        let _ = tx.send(Command::Resolved { request, result });
    });
}
