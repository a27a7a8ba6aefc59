//! Media engine boundary
//!
//! The session owns exactly one [`MediaResource`] (an HTML audio element, a
//! cpal stream, a simulated timer...) through [`MediaEngineAdapter`]. Every
//! load is tagged with the [`RequestToken`] that caused it, and every event
//! the resource reports goes back to the session carrying that token.

use crate::types::RequestToken;
use tokio::sync::mpsc;
use tracing::debug;

/// Something that can render one audio stream at a time
///
/// Calls never fail directly; load and playback failures are reported
/// through the [`MediaEvents`] handle passed to [`load`](Self::load).
pub trait MediaResource: Send {
    /// Start fetching `url`, reporting progress through `events`
    ///
    /// The adapter calls [`stop`](Self::stop) before every load.
    fn load(&mut self, url: &str, events: MediaEvents);

    /// Start or continue rendering the loaded stream
    fn play(&mut self);

    /// Pause rendering, keeping the position
    fn pause(&mut self);

    /// Jump to `position_seconds`
    fn seek(&mut self, position_seconds: f64);

    /// Set output level (0.0-1.0)
    fn set_volume(&mut self, level: f32);

    /// Release the current stream; later events from it are ignored
    fn stop(&mut self);
}

/// Event reported by a media resource
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Stream is ready; duration as reported by the resource
    Loaded { duration_seconds: f64 },

    /// Playback position update
    Progress { position_seconds: f64 },

    /// Reached the end of the stream
    Ended,

    /// Load or playback failed
    Error { message: String },
}

/// A [`MediaEvent`] tagged with the load it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct MediaNotice {
    pub token: RequestToken,
    pub event: MediaEvent,
}

/// Reporting handle given to a resource on every load
///
/// Cheap to clone; resources typically move a clone into whatever task
/// drives the stream. Sends after the session is gone are dropped.
#[derive(Debug, Clone)]
pub struct MediaEvents {
    token: RequestToken,
    tx: mpsc::UnboundedSender<MediaNotice>,
}

impl MediaEvents {
    pub(crate) fn new(token: RequestToken, tx: mpsc::UnboundedSender<MediaNotice>) -> Self {
        Self { token, tx }
    }

    /// Token of the load this handle reports for
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn loaded(&self, duration_seconds: f64) {
        self.send(MediaEvent::Loaded { duration_seconds });
    }

    pub fn progress(&self, position_seconds: f64) {
        self.send(MediaEvent::Progress { position_seconds });
    }

    pub fn ended(&self) {
        self.send(MediaEvent::Ended);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(MediaEvent::Error {
            message: message.into(),
        });
    }

    fn send(&self, event: MediaEvent) {
        let notice = MediaNotice {
            token: self.token,
            event,
        };
        if self.tx.send(notice).is_err() {
            debug!(token = %self.token, "Media event after session shutdown");
        }
    }
}

/// Wraps the session's single media resource
///
/// Tracks which load is live so that at most one stream exists at a time
/// and events from replaced loads can be recognised.
pub struct MediaEngineAdapter {
    resource: Box<dyn MediaResource>,
    events_tx: mpsc::UnboundedSender<MediaNotice>,

    /// Token of the live load, if any
    active: Option<RequestToken>,

    /// Whether the resource was last told to play
    playing: bool,
}

impl MediaEngineAdapter {
    pub fn new(
        resource: Box<dyn MediaResource>,
        events_tx: mpsc::UnboundedSender<MediaNotice>,
    ) -> Self {
        Self {
            resource,
            events_tx,
            active: None,
            playing: false,
        }
    }

    /// Load `url` under `token`, stopping any previous stream first
    pub fn load(&mut self, url: &str, token: RequestToken) {
        if let Some(previous) = self.active.take() {
            debug!(previous = %previous, "Stopping stream before new load");
            self.resource.stop();
        }

        debug!(token = %token, url, "Loading stream");
        self.active = Some(token);
        self.playing = false;
        self.resource
            .load(url, MediaEvents::new(token, self.events_tx.clone()));
    }

    /// Start rendering; ignored without a live stream
    pub fn play(&mut self) {
        if self.active.is_some() && !self.playing {
            self.resource.play();
            self.playing = true;
        }
    }

    /// Pause rendering; ignored unless playing
    pub fn pause(&mut self) {
        if self.playing {
            self.resource.pause();
            self.playing = false;
        }
    }

    pub fn seek(&mut self, position_seconds: f64) {
        if self.active.is_some() {
            self.resource.seek(position_seconds);
        }
    }

    pub fn set_volume(&mut self, level: f32) {
        self.resource.set_volume(level);
    }

    /// Release the live stream, if any
    pub fn stop(&mut self) {
        if let Some(token) = self.active.take() {
            debug!(token = %token, "Stopping stream");
            self.resource.stop();
        }
        self.playing = false;
    }

    /// Whether `token` belongs to the live load
    pub fn accepts(&self, token: RequestToken) -> bool {
        self.active == Some(token)
    }

    /// Whether a stream is live
    pub fn is_loaded(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl std::fmt::Debug for MediaEngineAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaEngineAdapter")
            .field("active", &self.active)
            .field("playing", &self.playing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Calls(Arc<Mutex<Vec<String>>>);

    impl Calls {
        fn push(&self, call: impl Into<String>) {
            self.0.lock().unwrap().push(call.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    struct Recording(Calls);

    impl MediaResource for Recording {
        fn load(&mut self, url: &str, events: MediaEvents) {
            self.0.push(format!("load {url} {}", events.token()));
        }
        fn play(&mut self) {
            self.0.push("play");
        }
        fn pause(&mut self) {
            self.0.push("pause");
        }
        fn seek(&mut self, position_seconds: f64) {
            self.0.push(format!("seek {position_seconds}"));
        }
        fn set_volume(&mut self, level: f32) {
            self.0.push(format!("volume {level}"));
        }
        fn stop(&mut self) {
            self.0.push("stop");
        }
    }

    fn adapter() -> (MediaEngineAdapter, Calls, mpsc::UnboundedReceiver<MediaNotice>) {
        let calls = Calls::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let adapter = MediaEngineAdapter::new(Box::new(Recording(calls.clone())), tx);
        (adapter, calls, rx)
    }

    #[test]
    fn load_stops_previous_stream() {
        let (mut adapter, calls, _rx) = adapter();
        let first = RequestToken::default().next();
        let second = first.next();

        adapter.load("a.mp3", first);
        adapter.load("b.mp3", second);

        assert_eq!(calls.take(), ["load a.mp3 #1", "stop", "load b.mp3 #2"]);
        assert!(adapter.accepts(second));
        assert!(!adapter.accepts(first));
    }

    #[test]
    fn play_and_pause_need_a_stream() {
        let (mut adapter, calls, _rx) = adapter();

        adapter.play();
        adapter.pause();
        adapter.seek(10.0);
        assert!(calls.take().is_empty());

        adapter.load("a.mp3", RequestToken::default().next());
        adapter.play();
        adapter.play();
        adapter.pause();
        adapter.pause();
        assert_eq!(calls.take(), ["load a.mp3 #1", "play", "pause"]);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut adapter, calls, _rx) = adapter();
        adapter.load("a.mp3", RequestToken::default().next());
        adapter.stop();
        adapter.stop();

        assert_eq!(calls.take(), ["load a.mp3 #1", "stop"]);
        assert!(!adapter.is_loaded());
    }

    #[test]
    fn events_carry_load_token() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = RequestToken::default().next().next();
        let events = MediaEvents::new(token, tx);

        events.loaded(120.0);
        events.error("decode failed");

        assert_eq!(
            rx.try_recv().unwrap(),
            MediaNotice {
                token,
                event: MediaEvent::Loaded {
                    duration_seconds: 120.0
                }
            }
        );
        assert_eq!(
            rx.try_recv().unwrap().event,
            MediaEvent::Error {
                message: "decode failed".into()
            }
        );
    }
}
