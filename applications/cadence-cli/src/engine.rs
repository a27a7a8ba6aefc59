//! Simulated media resource
//!
//! Stands in for a real audio output: "loads" a stream after a delay, then
//! advances a playhead on a tokio interval and reports progress and end of
//! stream. URLs containing `fail` report a load error once the load delay
//! has passed, which is handy for exercising the error paths from the prompt.

use crate::config::MediaSettings;
use cadence_playback::{MediaEvents, MediaResource};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug, Default)]
struct Playhead {
    loaded: bool,
    playing: bool,
    position: f64,
}

struct Stream {
    playhead: Arc<Mutex<Playhead>>,
    task: JoinHandle<()>,
}

/// Timer-driven stand-in for an audio element
pub struct SimulatedResource {
    settings: MediaSettings,
    stream: Option<Stream>,
    volume: f32,
}

impl SimulatedResource {
    pub fn new(settings: MediaSettings) -> Self {
        Self {
            settings,
            stream: None,
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    fn with_playhead(&self, f: impl FnOnce(&mut Playhead)) {
        if let Some(stream) = &self.stream {
            let mut playhead = stream
                .playhead
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut playhead);
        }
    }
}

impl MediaResource for SimulatedResource {
    fn load(&mut self, url: &str, events: MediaEvents) {
        self.stop();

        let playhead = Arc::new(Mutex::new(Playhead::default()));
        let task = tokio::spawn(drive(
            url.to_string(),
            self.settings.clone(),
            playhead.clone(),
            events,
        ));
        self.stream = Some(Stream { playhead, task });
    }

    fn play(&mut self) {
        self.with_playhead(|p| p.playing = p.loaded);
    }

    fn pause(&mut self) {
        self.with_playhead(|p| p.playing = false);
    }

    fn seek(&mut self, position_seconds: f64) {
        self.with_playhead(|p| p.position = position_seconds.max(0.0));
    }

    fn set_volume(&mut self, level: f32) {
        debug!(level, "Simulated volume");
        self.volume = level;
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.task.abort();
        }
    }
}

impl Drop for SimulatedResource {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn drive(
    url: String,
    settings: MediaSettings,
    playhead: Arc<Mutex<Playhead>>,
    events: MediaEvents,
) {
    tokio::time::sleep(Duration::from_millis(settings.load_delay_ms)).await;

    if url.contains("fail") {
        events.error(format!("could not fetch {url}"));
        return;
    }

    playhead
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .loaded = true;
    events.loaded(settings.track_seconds);

    let tick = Duration::from_millis(settings.tick_ms);
    let step = tick.as_secs_f64() * settings.speed;
    let mut interval = tokio::time::interval(tick);
    interval.tick().await;

    loop {
        interval.tick().await;

        let position = {
            let mut playhead = playhead.lock().unwrap_or_else(PoisonError::into_inner);
            if !playhead.playing {
                continue;
            }
            playhead.position = (playhead.position + step).min(settings.track_seconds);
            playhead.position
        };

        trace!(token = %events.token(), position, "Simulated progress");
        if position >= settings.track_seconds {
            events.ended();
            return;
        }
        events.progress(position);
    }
}
