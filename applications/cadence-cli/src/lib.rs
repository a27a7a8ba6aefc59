//! Cadence CLI
//!
//! Drives a playback session from a terminal. Tracks are resolved from a
//! REST catalog, a JSON fixture, or the built-in demo catalog, and "played"
//! through a timer-driven [`SimulatedResource`].

pub mod commands;
pub mod config;
pub mod engine;

pub use commands::{parse, CommandError, ReplCommand, HELP};
pub use config::{CatalogSource, CliConfig, ConfigError};
pub use engine::SimulatedResource;

use cadence_catalog::StaticCatalog;
use cadence_playback::{PlaybackStatus, SessionSnapshot};
use std::fmt::Write;

const DEMO_FIXTURE: &str = include_str!("../fixtures/demo.json");

/// Catalog bundled with the binary
///
/// Track `8` points at a stream the simulated resource refuses to load.
pub fn demo_catalog() -> cadence_catalog::Result<StaticCatalog> {
    StaticCatalog::from_json_str(DEMO_FIXTURE)
}

/// One-line summary of the session
pub fn describe(snapshot: &SessionSnapshot) -> String {
    let mut line = match (&snapshot.status, &snapshot.current_track) {
        (PlaybackStatus::Idle, None) => "idle".to_string(),
        (status, Some(track)) => format!(
            "{} {} - {} [{}/{}]",
            status_label(*status),
            track.artist_name,
            track.title,
            clock(snapshot.position_seconds),
            clock(snapshot.duration_seconds),
        ),
        (status, None) => status_label(*status).to_string(),
    };

    if let Some(error) = snapshot.error {
        let _ = write!(line, " error={error:?}");
    }
    let volume = (snapshot.volume * 100.0).round();
    let _ = write!(
        line,
        " vol={volume}%{} repeat={:?}{}",
        if snapshot.muted { " (muted)" } else { "" },
        snapshot.repeat_mode,
        if snapshot.is_shuffled { " shuffle" } else { "" },
    );
    line
}

/// Queue listing in play order, current track marked
pub fn render_queue(snapshot: &SessionSnapshot) -> String {
    if snapshot.queue.is_empty() {
        return "queue is empty".to_string();
    }

    let order: Vec<usize> = match &snapshot.shuffle_order {
        Some(order) => order.clone(),
        None => (0..snapshot.queue.len()).collect(),
    };

    let mut out = format!("queue ({:?}):", snapshot.source);
    for (position, &index) in order.iter().enumerate() {
        let track = &snapshot.queue[index];
        let marker = if snapshot.cursor == Some(index) { ">" } else { " " };
        let _ = write!(
            out,
            "\n{marker} {:>2}. {} - {} ({})",
            position + 1,
            track.artist_name,
            track.title,
            track.id
        );
    }
    out
}

fn status_label(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Idle => "stopped",
        PlaybackStatus::Loading => "loading",
        PlaybackStatus::Playing => "playing",
        PlaybackStatus::Paused => "paused",
        PlaybackStatus::Error => "error",
    }
}

fn clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{PlaylistId, TrackCatalog, TrackId};

    #[tokio::test]
    async fn demo_catalog_parses() {
        let catalog = demo_catalog().unwrap();
        assert_eq!(catalog.track_count(), 8);
        assert_eq!(
            catalog.playlist_name(&PlaylistId::new("late-night")),
            Some("Late Night")
        );

        let track = catalog.get_track(&TrackId::new("8")).await.unwrap();
        assert!(track.stream_url.contains("fail"));
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(clock(0.0), "0:00");
        assert_eq!(clock(337.4), "5:37");
        assert_eq!(clock(-3.0), "0:00");
    }

    #[test]
    fn describe_idle_session() {
        let snapshot = SessionSnapshot {
            volume: 0.7,
            ..SessionSnapshot::default()
        };
        assert_eq!(describe(&snapshot), "idle vol=70% repeat=Off");
        assert_eq!(render_queue(&snapshot), "queue is empty");
    }
}
