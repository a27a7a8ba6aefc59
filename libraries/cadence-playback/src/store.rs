//! Playback session store
//!
//! The single writer of session state. The store is a synchronous state
//! machine: it takes intents, catalog results and media events, updates
//! state, drives the media engine, and publishes a snapshot after every
//! transition. Catalog lookups are not run here; they are queued as
//! [`CatalogRequest`]s for the runtime to resolve (see
//! [`PlaybackSession`](crate::PlaybackSession)).
//!
//! Every transition that changes the current track allocates a new
//! [`RequestToken`]. Catalog results and media events are applied only
//! while their token is still the active one, so the last request always
//! wins no matter in which order responses arrive.

use crate::bus::SubscriberBus;
use crate::engine::{MediaEngineAdapter, MediaEvent, MediaNotice, MediaResource};
use crate::error::PlaybackErrorKind;
use crate::intent::{CatalogRequest, Intent, Lookup};
use crate::queue::Queue;
use crate::snapshot::SessionSnapshot;
use crate::types::{PlaybackStatus, QueueSource, RepeatMode, RequestToken, SessionConfig};
use crate::volume::Volume;
use cadence_core::{Track, TrackId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Central playback state machine
pub struct SessionStore {
    status: PlaybackStatus,
    queue: Queue,
    position: f64,
    duration: f64,
    volume: Volume,
    error: Option<PlaybackErrorKind>,

    /// Token of the latest request that changed the current track
    token: RequestToken,

    /// Lookup behind the current queue, for retry
    last_lookup: Option<Lookup>,

    /// Token of the lookup still waiting for the catalog
    awaiting: Option<RequestToken>,

    engine: MediaEngineAdapter,
    bus: Arc<SubscriberBus>,

    /// Lookups waiting to be resolved by the runtime
    pending: Vec<CatalogRequest>,

    restart_threshold: f64,
}

impl SessionStore {
    /// Create a store around `resource`
    ///
    /// Returns the receiving end of the media event channel; feed what
    /// arrives there into [`on_media_event`](Self::on_media_event).
    pub fn new(
        config: SessionConfig,
        resource: Box<dyn MediaResource>,
    ) -> (Self, mpsc::UnboundedReceiver<MediaNotice>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut queue = Queue::new();
        queue.set_repeat(config.repeat);
        queue.set_shuffle(config.shuffle);

        let volume = Volume::new(config.volume);
        let initial = SessionSnapshot {
            queue: queue.shared_tracks(),
            shuffle_order: queue.shuffle_order().map(<[usize]>::to_vec),
            source: queue.source().clone(),
            volume: volume.level(),
            muted: volume.is_muted(),
            is_shuffled: queue.is_shuffled(),
            repeat_mode: queue.repeat(),
            ..SessionSnapshot::default()
        };

        let store = Self {
            status: PlaybackStatus::Idle,
            queue,
            position: 0.0,
            duration: 0.0,
            volume,
            error: None,
            token: RequestToken::default(),
            last_lookup: None,
            awaiting: None,
            engine: MediaEngineAdapter::new(resource, events_tx),
            bus: Arc::new(SubscriberBus::new(initial)),
            pending: Vec::new(),
            restart_threshold: config.restart_threshold_seconds.max(0.0),
        };

        (store, events_rx)
    }

    /// Apply one intent
    pub fn apply(&mut self, intent: Intent) {
        debug!(?intent, "Applying intent");

        match intent {
            Intent::PlayTrack(id) => self.begin_lookup(Lookup::Track(id)),
            Intent::PlayAlbum(id) => self.begin_lookup(Lookup::Album(id)),
            Intent::PlayArtistTopTracks(id) => self.begin_lookup(Lookup::Artist(id)),
            Intent::PlayPlaylist(id) => self.begin_lookup(Lookup::Playlist(id)),
            Intent::PlayTracks { tracks, source } => self.play_tracks(tracks, source),
            Intent::Pause => self.pause(),
            Intent::Resume => self.resume(),
            Intent::Next => self.next(),
            Intent::Previous => self.previous(),
            Intent::Seek(position) => self.seek(position),
            Intent::SetVolume(level) => self.set_volume(level),
            Intent::ToggleMute => self.toggle_mute(),
            Intent::ToggleShuffle => self.toggle_shuffle(),
            Intent::SetRepeatMode(mode) => self.set_repeat_mode(mode),
            Intent::CycleRepeatMode => self.set_repeat_mode(self.queue.repeat().cycle()),
            Intent::AddToQueue(track) => self.add_to_queue(track),
            Intent::RemoveFromQueue(id) => self.remove_from_queue(&id),
            Intent::ClearQueue => self.clear_queue(),
            Intent::SkipTo(index) => self.skip_to(index),
            Intent::Retry => self.retry(),
        }
    }

    /// Drain lookups issued since the last call
    pub fn take_requests(&mut self) -> Vec<CatalogRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Apply the outcome of a catalog lookup
    ///
    /// Results for anything but the active token are discarded.
    pub fn on_resolved(
        &mut self,
        request: CatalogRequest,
        result: cadence_core::Result<Vec<Track>>,
    ) {
        if request.token != self.token {
            debug!(
                token = %request.token,
                active = %self.token,
                lookup = %request.lookup,
                "Discarding stale catalog result"
            );
            return;
        }
        self.awaiting = None;

        match result {
            Ok(tracks) => {
                debug!(lookup = %request.lookup, count = tracks.len(), "Catalog lookup resolved");
                self.replace_queue(tracks, request.lookup.source());
            }
            Err(err) => {
                warn!(lookup = %request.lookup, error = %err, "Catalog lookup failed");
                self.error = Some(PlaybackErrorKind::from(&err));
                self.status = PlaybackStatus::Error;
                self.publish();
            }
        }
    }

    /// Apply an event reported by the media resource
    ///
    /// Events from loads other than the live one are discarded.
    pub fn on_media_event(&mut self, notice: MediaNotice) {
        if notice.token != self.token || !self.engine.accepts(notice.token) {
            debug!(
                token = %notice.token,
                active = %self.token,
                event = ?notice.event,
                "Discarding stale media event"
            );
            return;
        }

        match notice.event {
            MediaEvent::Loaded { duration_seconds } => {
                if self.status != PlaybackStatus::Loading {
                    return;
                }
                if duration_seconds.is_finite() && duration_seconds > 0.0 {
                    self.duration = duration_seconds;
                }
                self.error = None;
                self.engine.play();
                self.status = PlaybackStatus::Playing;
                debug!(token = %self.token, duration = self.duration, "Track loaded");
                self.publish();
            }
            MediaEvent::Progress { position_seconds } => {
                if matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused)
                    && position_seconds.is_finite()
                {
                    self.position = position_seconds.max(0.0);
                    self.publish();
                }
            }
            MediaEvent::Ended => {
                if self.status == PlaybackStatus::Loading {
                    return;
                }
                debug!(token = %self.token, "Track ended");
                self.next();
            }
            MediaEvent::Error { message } => {
                if self.status == PlaybackStatus::Loading {
                    warn!(token = %self.token, %message, "Media failed to load");
                    self.error = Some(PlaybackErrorKind::MediaLoadError);
                    self.engine.stop();
                    self.status = PlaybackStatus::Error;
                    self.publish();
                } else {
                    warn!(token = %self.token, %message, "Media failed during playback");
                    self.error = Some(PlaybackErrorKind::MediaPlaybackError);
                    self.next();
                }
            }
        }
    }

    /// Release the media resource
    pub fn shutdown(&mut self) {
        info!("Shutting down playback session");
        self.engine.stop();
    }

    fn begin_lookup(&mut self, lookup: Lookup) {
        self.token = self.token.next();
        self.error = None;
        self.engine.pause();
        self.status = PlaybackStatus::Loading;

        debug!(token = %self.token, %lookup, "Requesting catalog lookup");
        self.pending.push(CatalogRequest {
            token: self.token,
            lookup: lookup.clone(),
        });
        self.last_lookup = Some(lookup);
        self.awaiting = Some(self.token);
        self.publish();
    }

    fn play_tracks(&mut self, tracks: Vec<Track>, source: QueueSource) {
        self.token = self.token.next();
        self.last_lookup = None;
        self.replace_queue(tracks, source);
    }

    /// Install a new queue under the active token
    fn replace_queue(&mut self, tracks: Vec<Track>, source: QueueSource) {
        self.queue.replace(tracks, source);
        self.error = None;

        if self.queue.is_empty() {
            self.engine.stop();
            self.status = PlaybackStatus::Idle;
            self.position = 0.0;
            self.duration = 0.0;
            self.publish();
            return;
        }

        self.load_current();
    }

    /// New token, then load the current track
    fn start_track(&mut self) {
        self.token = self.token.next();
        self.load_current();
    }

    /// Load the current track under the active token
    fn load_current(&mut self) {
        let Some(track) = self.queue.current() else {
            return;
        };

        let url = track.stream_url.clone();
        self.duration = track.duration_seconds;
        self.position = 0.0;
        self.status = PlaybackStatus::Loading;

        info!(
            token = %self.token,
            track = %track.id,
            title = %track.title,
            "Loading track"
        );
        self.engine.load(&url, self.token);
        self.engine.set_volume(self.volume.effective());
        self.publish();
    }

    /// Queue ran out: stop, keep the cursor where it is
    fn finish(&mut self) {
        if self.status == PlaybackStatus::Idle && !self.engine.is_loaded() {
            return;
        }

        debug!("Queue exhausted");
        self.engine.stop();
        self.status = PlaybackStatus::Idle;
        self.position = 0.0;
        self.publish();
    }

    fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            return;
        }
        self.engine.pause();
        self.status = PlaybackStatus::Paused;
        self.publish();
    }

    fn resume(&mut self) {
        match self.status {
            PlaybackStatus::Paused => {
                self.engine.play();
                self.status = PlaybackStatus::Playing;
                self.publish();
            }
            PlaybackStatus::Idle | PlaybackStatus::Error if self.queue.current().is_some() => {
                self.start_track();
            }
            _ => {}
        }
    }

    /// A lookup under the active token is still out; the queue is about to
    /// be replaced
    fn lookup_pending(&self) -> bool {
        self.awaiting == Some(self.token)
    }

    fn next(&mut self) {
        if self.lookup_pending() {
            debug!(token = %self.token, "Ignoring next while lookup is pending");
            return;
        }
        match self.queue.advance() {
            Some(_) => self.start_track(),
            None => self.finish(),
        }
    }

    fn previous(&mut self) {
        if self.lookup_pending() {
            debug!(token = %self.token, "Ignoring previous while lookup is pending");
            return;
        }

        let restart = self.restart_threshold > 0.0
            && self.position > self.restart_threshold
            && matches!(self.status, PlaybackStatus::Playing | PlaybackStatus::Paused);

        if restart {
            debug!(position = self.position, "Restarting current track");
            self.engine.seek(0.0);
            self.position = 0.0;
            self.publish();
            return;
        }

        match self.queue.retreat() {
            Some(_) => self.start_track(),
            None => self.finish(),
        }
    }

    fn seek(&mut self, position: f64) {
        if self.queue.current().is_none() || position.is_nan() {
            return;
        }

        // Unknown duration (0) leaves the upper bound open
        let upper = if self.duration > 0.0 {
            self.duration
        } else {
            f64::INFINITY
        };
        let position = position.clamp(0.0, upper);

        self.engine.seek(position);
        self.position = position;
        self.publish();
    }

    fn set_volume(&mut self, level: f32) {
        let before = self.volume;
        self.volume.set_level(level);
        self.engine.set_volume(self.volume.effective());

        if self.volume != before {
            self.publish();
        }
    }

    fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.engine.set_volume(self.volume.effective());
        self.publish();
    }

    fn toggle_shuffle(&mut self) {
        let enabled = self.queue.toggle_shuffle();
        debug!(enabled, "Shuffle toggled");
        self.publish();
    }

    fn set_repeat_mode(&mut self, mode: RepeatMode) {
        if self.queue.repeat() == mode {
            return;
        }
        self.queue.set_repeat(mode);
        self.publish();
    }

    fn add_to_queue(&mut self, track: Track) {
        let was_empty = self.queue.is_empty();
        self.queue.append(track);

        if was_empty {
            self.last_lookup = None;
            self.error = None;
            self.start_track();
        } else {
            self.publish();
        }
    }

    fn remove_from_queue(&mut self, id: &TrackId) {
        match self.queue.remove(id) {
            Some(track) => {
                debug!(track = %track.id, "Removed from queue");
                self.publish();
            }
            None => debug!(track = %id, "Nothing to remove"),
        }
    }

    fn clear_queue(&mut self) {
        if self.queue.len() <= 1 {
            return;
        }
        self.queue.retain_current();
        self.publish();
    }

    fn skip_to(&mut self, index: usize) {
        if self.queue.jump_to(index) {
            self.start_track();
        } else {
            debug!(index, len = self.queue.len(), "Skip target out of range");
        }
    }

    fn retry(&mut self) {
        if self.status != PlaybackStatus::Error {
            return;
        }

        match self.error {
            Some(kind) if kind.is_catalog() => {
                if let Some(lookup) = self.last_lookup.clone() {
                    info!(%lookup, "Retrying catalog lookup");
                    self.begin_lookup(lookup);
                }
            }
            Some(_) if self.queue.current().is_some() => {
                info!("Retrying media load");
                self.start_track();
            }
            _ => {}
        }
    }

    fn publish(&self) {
        self.bus.publish(self.snapshot());
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            current_track: self.queue.current().cloned(),
            queue: self.queue.shared_tracks(),
            cursor: self.queue.cursor(),
            shuffle_order: self.queue.shuffle_order().map(<[usize]>::to_vec),
            source: self.queue.source().clone(),
            position_seconds: self.position,
            duration_seconds: self.duration,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            is_shuffled: self.queue.is_shuffled(),
            repeat_mode: self.queue.repeat(),
            error: self.error,
            request_token: self.token,
        }
    }

    pub fn bus(&self) -> &Arc<SubscriberBus> {
        &self.bus
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("status", &self.status)
            .field("token", &self.token)
            .field("cursor", &self.queue.cursor())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MediaEvents;
    use cadence_core::CatalogError;

    #[derive(Default)]
    struct Silent;

    impl MediaResource for Silent {
        fn load(&mut self, _url: &str, _events: MediaEvents) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn seek(&mut self, _position_seconds: f64) {}
        fn set_volume(&mut self, _level: f32) {}
        fn stop(&mut self) {}
    }

    fn store() -> (SessionStore, mpsc::UnboundedReceiver<MediaNotice>) {
        SessionStore::new(SessionConfig::default(), Box::new(Silent))
    }

    fn track(id: &str) -> Track {
        Track::new(id, format!("Track {id}"), "Artist", format!("https://cdn.example/{id}.mp3"))
            .with_duration(180.0)
    }

    #[test]
    fn starts_idle_with_config() {
        let config = SessionConfig {
            volume: 0.3,
            repeat: RepeatMode::All,
            shuffle: true,
            ..SessionConfig::default()
        };
        let (store, _rx) = SessionStore::new(config, Box::new(Silent));
        let snapshot = store.bus().snapshot();

        assert_eq!(snapshot.status, PlaybackStatus::Idle);
        assert_eq!(snapshot.volume, 0.3);
        assert_eq!(snapshot.repeat_mode, RepeatMode::All);
        assert!(snapshot.is_shuffled);
        assert!(snapshot.current_track.is_none());
    }

    #[test]
    fn initial_snapshot_is_published_state() {
        let config = SessionConfig {
            shuffle: true,
            ..SessionConfig::default()
        };
        let (store, _rx) = SessionStore::new(config, Box::new(Silent));
        assert_eq!(*store.bus().snapshot(), store.snapshot());
    }

    #[test]
    fn progress_snapshots_share_the_queue() {
        let (mut store, _rx) = store();
        store.apply(Intent::PlayTracks {
            tracks: vec![track("1"), track("2")],
            source: QueueSource::Custom,
        });
        store.on_media_event(MediaNotice {
            token: store.token(),
            event: MediaEvent::Loaded {
                duration_seconds: 180.0,
            },
        });

        let before = store.bus().snapshot();
        store.on_media_event(MediaNotice {
            token: store.token(),
            event: MediaEvent::Progress {
                position_seconds: 12.0,
            },
        });
        let after = store.bus().snapshot();
        assert_eq!(after.position_seconds, 12.0);
        assert!(Arc::ptr_eq(&before.queue, &after.queue));

        // Editing the queue leaves published snapshots untouched
        store.apply(Intent::AddToQueue(track("3")));
        assert_eq!(after.queue.len(), 2);
        assert_eq!(store.bus().snapshot().queue.len(), 3);
    }

    #[test]
    fn next_waits_for_pending_lookup() {
        let (mut store, _rx) = store();
        store.apply(Intent::PlayTracks {
            tracks: vec![track("1")],
            source: QueueSource::Custom,
        });
        store.apply(Intent::PlayAlbum("a".into()));
        let token = store.token();

        store.apply(Intent::Next);
        store.apply(Intent::Previous);

        assert_eq!(store.status(), PlaybackStatus::Loading);
        assert_eq!(store.token(), token);
    }

    #[test]
    fn play_track_queues_lookup() {
        let (mut store, _rx) = store();
        store.apply(Intent::PlayTrack(TrackId::new("7")));

        assert_eq!(store.status(), PlaybackStatus::Loading);
        let requests = store.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].token, store.token());
        assert_eq!(requests[0].lookup, Lookup::Track(TrackId::new("7")));
        assert!(store.take_requests().is_empty());
    }

    #[test]
    fn resolved_lookup_loads_first_track() {
        let (mut store, mut rx) = store();
        store.apply(Intent::PlayTrack(TrackId::new("7")));
        let request = store.take_requests().remove(0);

        store.on_resolved(request, Ok(vec![track("7")]));
        assert_eq!(store.status(), PlaybackStatus::Loading);
        assert_eq!(store.queue().source(), &QueueSource::Single);

        // Silent never reports; feed a loaded event by hand
        store.on_media_event(MediaNotice {
            token: store.token(),
            event: MediaEvent::Loaded {
                duration_seconds: 0.0,
            },
        });
        assert!(rx.try_recv().is_err());

        let snapshot = store.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Playing);
        // Falls back to catalog duration when the resource reports none
        assert_eq!(snapshot.duration_seconds, 180.0);
    }

    #[test]
    fn catalog_failure_keeps_queue() {
        let (mut store, _rx) = store();
        store.apply(Intent::PlayTracks {
            tracks: vec![track("1"), track("2")],
            source: QueueSource::Custom,
        });

        store.apply(Intent::PlayAlbum("missing".into()));
        let request = store.take_requests().remove(0);
        store.on_resolved(request, Err(CatalogError::not_found("Album", "missing")));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Error);
        assert_eq!(snapshot.error, Some(PlaybackErrorKind::CatalogNotFound));
        assert_eq!(snapshot.queue.len(), 2);
        assert_eq!(snapshot.current_track.map(|t| t.id), Some(TrackId::new("1")));
    }

    #[test]
    fn retry_reissues_failed_lookup() {
        let (mut store, _rx) = store();
        store.apply(Intent::PlayArtistTopTracks("a1".into()));
        let request = store.take_requests().remove(0);
        store.on_resolved(request.clone(), Err(CatalogError::network("timeout")));
        assert_eq!(store.snapshot().error, Some(PlaybackErrorKind::CatalogNetworkError));

        store.apply(Intent::Retry);
        let retried = store.take_requests();
        assert_eq!(retried.len(), 1);
        assert_eq!(retried[0].lookup, request.lookup);
        assert!(retried[0].token > request.token);
        assert_eq!(store.status(), PlaybackStatus::Loading);
        assert_eq!(store.snapshot().error, None);
    }

    #[test]
    fn retry_outside_error_is_noop() {
        let (mut store, _rx) = store();
        let before = store.token();
        store.apply(Intent::Retry);
        assert_eq!(store.token(), before);
        assert!(store.take_requests().is_empty());
    }

    #[test]
    fn cycle_repeat_mode() {
        let (mut store, _rx) = store();
        store.apply(Intent::CycleRepeatMode);
        assert_eq!(store.snapshot().repeat_mode, RepeatMode::All);
        store.apply(Intent::CycleRepeatMode);
        assert_eq!(store.snapshot().repeat_mode, RepeatMode::One);
        store.apply(Intent::CycleRepeatMode);
        assert_eq!(store.snapshot().repeat_mode, RepeatMode::Off);
    }

    #[test]
    fn seek_without_track_is_ignored() {
        let (mut store, _rx) = store();
        store.apply(Intent::Seek(30.0));
        assert_eq!(store.snapshot().position_seconds, 0.0);
    }

    #[test]
    fn no_op_intents_do_not_publish() {
        let (mut store, _rx) = store();
        let published = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = published.clone();
        let _sub = store.bus().subscribe(move |_| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        store.apply(Intent::Pause);
        store.apply(Intent::Resume);
        store.apply(Intent::Next);
        store.apply(Intent::Previous);
        store.apply(Intent::ClearQueue);
        store.apply(Intent::SetRepeatMode(RepeatMode::Off));
        store.apply(Intent::SetVolume(0.7));

        assert_eq!(published.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
