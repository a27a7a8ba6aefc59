//! Play queue
//!
//! Keeps tracks in the order they were requested and walks them either
//! linearly or through a shuffle order. The original order is never touched,
//! so turning shuffle off always lands back on the requested sequence.
//!
//! ```text
//! tracks:        [A, B, C, D, E]      (requested order)
//! cursor:         2                   (C is current)
//! shuffle order: [2, 4, 0, 3, 1]      (C, E, A, D, B)
//!                  ^ position 0
//! ```

use crate::shuffle::{insertion_slot, shuffled_order};
use crate::types::{QueueSource, RepeatMode};
use cadence_core::{Track, TrackId};
use std::sync::Arc;

/// Traversal order while shuffle is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
struct ShuffleOrder {
    /// Permutation of queue indices
    order: Vec<usize>,

    /// Position of the cursor within `order`
    position: usize,
}

impl ShuffleOrder {
    fn starting_at(current: Option<usize>, len: usize) -> Self {
        Self {
            order: shuffled_order(current, len),
            position: 0,
        }
    }
}

/// Ordered tracks plus play cursor and shuffle/repeat policy
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Tracks in requested order, shared with published snapshots
    tracks: Arc<Vec<Track>>,

    /// Index of the active track in `tracks`
    cursor: Option<usize>,

    /// Present while shuffle is enabled (even on an empty queue)
    shuffle: Option<ShuffleOrder>,

    repeat: RepeatMode,

    /// Context the tracks came from
    source: QueueSource,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all tracks, putting the cursor on the first one
    ///
    /// Shuffle and repeat settings carry over; a fresh shuffle order is drawn
    /// for the new tracks.
    pub fn replace(&mut self, tracks: Vec<Track>, source: QueueSource) {
        self.cursor = if tracks.is_empty() { None } else { Some(0) };
        self.tracks = Arc::new(tracks);
        self.source = source;

        if self.shuffle.is_some() {
            self.shuffle = Some(ShuffleOrder::starting_at(self.cursor, self.tracks.len()));
        }
    }

    /// Currently active track
    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|index| self.tracks.get(index))
    }

    /// Move to the next track, returning its index
    ///
    /// `None` means the queue is exhausted (or empty); the cursor stays on
    /// the last valid position in that case.
    pub fn advance(&mut self) -> Option<usize> {
        let cursor = self.cursor?;

        if self.repeat == RepeatMode::One {
            return Some(cursor);
        }

        let len = self.tracks.len();
        let repeat_all = self.repeat == RepeatMode::All;

        let next = match self.shuffle.as_mut() {
            Some(shuffle) => {
                if shuffle.position + 1 < shuffle.order.len() {
                    shuffle.position += 1;
                    Some(shuffle.order[shuffle.position])
                } else if repeat_all {
                    // New lap: fresh order, then step past the current track
                    *shuffle = ShuffleOrder::starting_at(Some(cursor), len);
                    if shuffle.order.len() > 1 {
                        shuffle.position = 1;
                    }
                    Some(shuffle.order[shuffle.position])
                } else {
                    None
                }
            }
            None => {
                if cursor + 1 < len {
                    Some(cursor + 1)
                } else if repeat_all {
                    Some(0)
                } else {
                    None
                }
            }
        };

        if next.is_some() {
            self.cursor = next;
        }
        next
    }

    /// Move to the previous track, returning its index
    ///
    /// Wraps to the end only under repeat-all.
    pub fn retreat(&mut self) -> Option<usize> {
        let cursor = self.cursor?;

        if self.repeat == RepeatMode::One {
            return Some(cursor);
        }

        let len = self.tracks.len();
        let repeat_all = self.repeat == RepeatMode::All;

        let previous = match self.shuffle.as_mut() {
            Some(shuffle) => {
                if shuffle.position > 0 {
                    shuffle.position -= 1;
                    Some(shuffle.order[shuffle.position])
                } else if repeat_all && !shuffle.order.is_empty() {
                    shuffle.position = shuffle.order.len() - 1;
                    Some(shuffle.order[shuffle.position])
                } else {
                    None
                }
            }
            None => {
                if cursor > 0 {
                    Some(cursor - 1)
                } else if repeat_all {
                    Some(len - 1)
                } else {
                    None
                }
            }
        };

        if previous.is_some() {
            self.cursor = previous;
        }
        previous
    }

    /// Enable or disable shuffle
    ///
    /// The current track never changes.
    pub fn set_shuffle(&mut self, enabled: bool) {
        match (enabled, self.shuffle.is_some()) {
            (true, false) => {
                self.shuffle = Some(ShuffleOrder::starting_at(self.cursor, self.tracks.len()));
            }
            (false, true) => self.shuffle = None,
            _ => {}
        }
    }

    /// Flip shuffle, returning the new state
    pub fn toggle_shuffle(&mut self) -> bool {
        let enabled = !self.is_shuffled();
        self.set_shuffle(enabled);
        enabled
    }

    /// Move the cursor to `index`
    ///
    /// Under shuffle the order restarts from the new track. Returns `false`
    /// when `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }

        self.cursor = Some(index);
        if self.shuffle.is_some() {
            self.shuffle = Some(ShuffleOrder::starting_at(self.cursor, self.tracks.len()));
        }
        true
    }

    /// Append a track
    ///
    /// On an empty queue the track becomes current. Under shuffle it is
    /// placed at a random point of the part not yet played.
    pub fn append(&mut self, track: Track) {
        let index = self.tracks.len();
        Arc::make_mut(&mut self.tracks).push(track);

        if self.cursor.is_none() {
            self.cursor = Some(index);
            self.source = QueueSource::Custom;
        }

        if let Some(shuffle) = self.shuffle.as_mut() {
            if shuffle.order.is_empty() {
                shuffle.order.push(index);
                shuffle.position = 0;
            } else {
                let slot = insertion_slot(shuffle.position, shuffle.order.len());
                shuffle.order.insert(slot, index);
            }
        }
    }

    /// Remove the first non-current track with `id`
    ///
    /// The current track cannot be removed; returns `None` if nothing
    /// matched.
    pub fn remove(&mut self, id: &TrackId) -> Option<Track> {
        let index = self
            .tracks
            .iter()
            .enumerate()
            .position(|(i, track)| &track.id == id && Some(i) != self.cursor)?;

        let removed = Arc::make_mut(&mut self.tracks).remove(index);

        if let Some(cursor) = self.cursor.as_mut() {
            if *cursor > index {
                *cursor -= 1;
            }
        }

        if let Some(shuffle) = self.shuffle.as_mut() {
            if let Some(slot) = shuffle.order.iter().position(|&i| i == index) {
                shuffle.order.remove(slot);
                if slot < shuffle.position {
                    shuffle.position -= 1;
                }
            }
            for entry in &mut shuffle.order {
                if *entry > index {
                    *entry -= 1;
                }
            }
        }

        Some(removed)
    }

    /// Drop everything except the current track
    pub fn retain_current(&mut self) {
        let Some(cursor) = self.cursor else {
            return;
        };

        let current = self.tracks[cursor].clone();
        self.tracks = Arc::new(vec![current]);
        self.cursor = Some(0);

        if let Some(shuffle) = self.shuffle.as_mut() {
            shuffle.order = vec![0];
            shuffle.position = 0;
        }
    }

    /// Tracks that follow the cursor in traversal order
    ///
    /// Does not include wrap-around under repeat-all.
    pub fn upcoming(&self) -> Vec<&Track> {
        let Some(cursor) = self.cursor else {
            return Vec::new();
        };

        match &self.shuffle {
            Some(shuffle) => shuffle.order[shuffle.position + 1..]
                .iter()
                .filter_map(|&i| self.tracks.get(i))
                .collect(),
            None => self.tracks[cursor + 1..].iter().collect(),
        }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in requested order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Track list without copying; copied on the next edit if still shared
    pub fn shared_tracks(&self) -> Arc<Vec<Track>> {
        Arc::clone(&self.tracks)
    }

    /// Index of the current track
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle.is_some()
    }

    /// Shuffle traversal order, if shuffle is enabled
    pub fn shuffle_order(&self) -> Option<&[usize]> {
        self.shuffle.as_ref().map(|shuffle| shuffle.order.as_slice())
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    pub fn source(&self) -> &QueueSource {
        &self.source
    }
}
