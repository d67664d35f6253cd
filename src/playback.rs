use serde::Deserialize;

/// Playback state pushed irregularly by the playback collaborator.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PlaybackSnapshot {
    pub position_ms: f64,
    pub is_playing: bool,
    #[serde(default)]
    pub track_id: Option<String>,
}

/// Estimated position at `now_ms` for a snapshot received at
/// `received_at_ms`. Playing snapshots advance with wall-clock time, paused
/// ones hold. A clock that runs backwards never rewinds past the snapshot.
pub fn estimate_position(snapshot: &PlaybackSnapshot, received_at_ms: f64, now_ms: f64) -> f64 {
    if snapshot.is_playing {
        snapshot.position_ms + (now_ms - received_at_ms).max(0.0)
    } else {
        snapshot.position_ms
    }
}

/// Latest snapshot plus the instant it arrived.
#[derive(Clone, Debug, Default)]
pub struct PositionEstimator {
    latest: Option<(PlaybackSnapshot, f64)>,
}

impl PositionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the reference point. Returns true when the track changed.
    pub fn update(&mut self, snapshot: PlaybackSnapshot, now_ms: f64) -> bool {
        let changed = match self.latest {
            Some((ref prev, _)) => prev.track_id != snapshot.track_id,
            None => snapshot.track_id.is_some(),
        };
        self.latest = Some((snapshot, now_ms));
        changed
    }

    pub fn position_ms(&self, now_ms: f64) -> f64 {
        self.latest
            .as_ref()
            .map_or(0.0, |(snapshot, at)| estimate_position(snapshot, *at, now_ms))
    }

    pub fn is_playing(&self) -> bool {
        self.latest.as_ref().is_some_and(|(s, _)| s.is_playing)
    }

    pub fn track_id(&self) -> Option<&str> {
        self.latest.as_ref().and_then(|(s, _)| s.track_id.as_deref())
    }
}
