//! Scripted playback for offline renders.
//!
//! A timeline is a JSON array of snapshots, each stamped with the render
//! time at which it is delivered:
//!
//! ```json
//! [
//!   { "at_ms": 0,    "position_ms": 42000, "is_playing": true,  "track_id": "intro" },
//!   { "at_ms": 8000, "position_ms": 50000, "is_playing": false, "track_id": "intro" }
//! ]
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::playback::PlaybackSnapshot;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TimelineEvent {
    /// Render time (ms from the first frame) at which the snapshot arrives
    pub at_ms: f64,
    #[serde(flatten)]
    pub snapshot: PlaybackSnapshot,
}

/// Events in delivery order plus a cursor over the ones already delivered.
#[derive(Clone, Debug)]
pub struct Timeline {
    events: Vec<TimelineEvent>,
    cursor: usize,
}

impl Timeline {
    pub fn new(mut events: Vec<TimelineEvent>) -> Self {
        events.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Self { events, cursor: 0 }
    }

    /// A single playing snapshot delivered on the first frame.
    pub fn playing_from(position_ms: f64, track_id: Option<String>) -> Self {
        Self::new(vec![TimelineEvent {
            at_ms: 0.0,
            snapshot: PlaybackSnapshot {
                position_ms,
                is_playing: true,
                track_id,
            },
        }])
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let events: Vec<TimelineEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read timeline: {}", path.display()))?;
        let timeline = Self::from_json(&json)
            .with_context(|| format!("Invalid timeline JSON: {}", path.display()))?;
        log::info!("Loaded timeline with {} snapshots", timeline.len());
        Ok(timeline)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Track of the first snapshot that names one.
    pub fn first_track(&self) -> Option<&str> {
        self.events.iter().find_map(|e| e.snapshot.track_id.as_deref())
    }

    /// Snapshots due at or before `now_ms` that have not been delivered yet.
    pub fn due(&mut self, now_ms: f64) -> Vec<PlaybackSnapshot> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].at_ms <= now_ms {
            self.cursor += 1;
        }
        self.events[start..self.cursor]
            .iter()
            .map(|e| e.snapshot.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_each_snapshot_once_in_order() {
        let mut timeline = Timeline::from_json(
            r#"[
                { "at_ms": 500, "position_ms": 9000, "is_playing": false, "track_id": "a" },
                { "at_ms": 0, "position_ms": 1000, "is_playing": true, "track_id": "a" },
                { "at_ms": 500, "position_ms": 0, "is_playing": true, "track_id": "b" }
            ]"#,
        )
        .unwrap();
        assert_eq!(timeline.len(), 3);

        let first = timeline.due(0.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].position_ms, 1000.0);
        assert!(timeline.due(499.0).is_empty());

        let later = timeline.due(1_000.0);
        assert_eq!(later.len(), 2);
        assert_eq!(later[0].track_id.as_deref(), Some("a"));
        assert_eq!(later[1].track_id.as_deref(), Some("b"));
        assert!(timeline.due(10_000.0).is_empty());
    }

    #[test]
    fn default_timeline_plays_from_start_position() {
        let mut timeline = Timeline::playing_from(30_000.0, None);
        assert_eq!(timeline.first_track(), None);
        let due = timeline.due(0.0);
        assert_eq!(
            due,
            vec![PlaybackSnapshot {
                position_ms: 30_000.0,
                is_playing: true,
                track_id: None,
            }]
        );
    }

    #[test]
    fn rejects_events_without_timestamps() {
        assert!(Timeline::from_json(r#"[{ "position_ms": 0, "is_playing": true }]"#).is_err());
    }
}
