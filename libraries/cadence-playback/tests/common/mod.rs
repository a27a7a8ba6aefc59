//! Shared helpers for playback integration tests

use cadence_core::Track;
use cadence_playback::{
    Intent, MediaEvents, MediaNotice, MediaResource, QueueSource, SessionConfig, SessionSnapshot,
    SessionStore,
};
use std::sync::{Arc, Mutex, Once};
use tokio::sync::mpsc;

static INIT: Once = Once::new();

/// Route store logs (stale discards included) to the test output
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ===== Tracks =====

pub fn track(id: &str) -> Track {
    Track::new(
        id,
        format!("Track {id}"),
        "Test Artist",
        format!("https://cdn.test/{id}.mp3"),
    )
    .with_duration(200.0)
}

pub fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

pub fn url(id: &str) -> String {
    format!("https://cdn.test/{id}.mp3")
}

// ===== Recording media resource =====

/// Call received by [`RecordingResource`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    Volume(f32),
    Stop,
}

#[derive(Default)]
struct LogInner {
    calls: Vec<Call>,
    events: Vec<MediaEvents>,
    live: usize,
    max_live: usize,
}

/// Shared view of everything a [`RecordingResource`] was asked to do
#[derive(Clone, Default)]
pub struct MediaLog(Arc<Mutex<LogInner>>);

impl MediaLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().calls.clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().calls.clear();
    }

    /// URLs passed to `load`, in order
    pub fn loads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls().iter().filter(|call| *call == wanted).count()
    }

    /// Event handle of the most recent load
    pub fn events(&self) -> MediaEvents {
        self.0
            .lock()
            .unwrap()
            .events
            .last()
            .cloned()
            .expect("nothing was loaded")
    }

    /// Highest number of streams that were live at once
    pub fn max_live(&self) -> usize {
        self.0.lock().unwrap().max_live
    }
}

/// Media resource that records calls and never reports on its own
pub struct RecordingResource {
    log: MediaLog,
}

impl RecordingResource {
    pub fn new() -> (Self, MediaLog) {
        let log = MediaLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl MediaResource for RecordingResource {
    fn load(&mut self, url: &str, events: MediaEvents) {
        let mut inner = self.log.0.lock().unwrap();
        inner.calls.push(Call::Load(url.to_string()));
        inner.events.push(events);
        inner.live += 1;
        inner.max_live = inner.max_live.max(inner.live);
    }

    fn play(&mut self) {
        self.log.0.lock().unwrap().calls.push(Call::Play);
    }

    fn pause(&mut self) {
        self.log.0.lock().unwrap().calls.push(Call::Pause);
    }

    fn seek(&mut self, position_seconds: f64) {
        self.log
            .0
            .lock()
            .unwrap()
            .calls
            .push(Call::Seek(position_seconds));
    }

    fn set_volume(&mut self, level: f32) {
        self.log.0.lock().unwrap().calls.push(Call::Volume(level));
    }

    fn stop(&mut self) {
        let mut inner = self.log.0.lock().unwrap();
        inner.calls.push(Call::Stop);
        inner.live = inner.live.saturating_sub(1);
    }
}

// ===== Store harness =====

/// A store wired to a [`RecordingResource`], driven by hand
pub struct Harness {
    pub store: SessionStore,
    pub media: mpsc::UnboundedReceiver<MediaNotice>,
    pub log: MediaLog,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        init_tracing();
        let (resource, log) = RecordingResource::new();
        let (store, media) = SessionStore::new(config, Box::new(resource));
        Self { store, media, log }
    }

    pub fn apply(&mut self, intent: Intent) {
        self.store.apply(intent);
    }

    /// Feed every pending media event into the store
    pub fn pump(&mut self) {
        while let Ok(notice) = self.media.try_recv() {
            self.store.on_media_event(notice);
        }
    }

    /// Report the latest load as ready
    pub fn finish_loading(&mut self) {
        self.log.events().loaded(200.0);
        self.pump();
    }

    /// Replace the queue and get the first track playing
    pub fn play(&mut self, ids: &[&str]) {
        self.apply(Intent::PlayTracks {
            tracks: tracks(ids),
            source: QueueSource::Custom,
        });
        self.finish_loading();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    pub fn current_id(&self) -> Option<String> {
        self.snapshot()
            .current_track
            .map(|t| t.id.as_str().to_string())
    }

    /// Check `current_track == queue[cursor]`
    pub fn assert_consistent(&self) {
        let snapshot = self.snapshot();
        match snapshot.cursor {
            Some(cursor) => {
                assert!(cursor < snapshot.queue.len(), "cursor out of range");
                assert_eq!(snapshot.current_track.as_ref(), Some(&snapshot.queue[cursor]));
            }
            None => {
                assert!(snapshot.current_track.is_none());
                assert!(snapshot.queue.is_empty());
            }
        }
    }
}
