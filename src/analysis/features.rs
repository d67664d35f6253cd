use serde::{Deserialize, Deserializer};

/// Number of chroma-like bands carried by segments and synthetic signals.
pub const PITCH_BANDS: usize = 12;

/// A time-stamped span of analysis data. Sequences are sorted by `start`
/// and non-overlapping.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Interval<T> {
    /// Seconds from track start
    pub start: f64,
    /// Seconds
    pub duration: f64,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Interval<T> {
    pub fn new(start: f64, duration: f64, payload: T) -> Self {
        Self { start, duration, payload }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Half-open containment: `start` is inside, `end` is not.
    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end()
    }
}

/// Fine-grained timbral segment.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Segment {
    /// Peak loudness within the segment (dB)
    #[serde(default = "silent_db")]
    pub loudness_max: f32,
    #[serde(default, deserialize_with = "band_array")]
    pub pitches: [f32; PITCH_BANDS],
    #[serde(default, deserialize_with = "band_array")]
    pub timbre: [f32; PITCH_BANDS],
}

/// Beat marker. Usually short, sometimes zero-length.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Beat {
    #[serde(default)]
    pub confidence: f32,
}

/// Per-track interval analysis as published by the catalog.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TrackAnalysis {
    #[serde(default)]
    pub segments: Vec<Interval<Segment>>,
    #[serde(default)]
    pub beats: Vec<Interval<Beat>>,
}

impl TrackAnalysis {
    /// Parse catalog JSON and restore ascending `start` order.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let mut analysis: TrackAnalysis = serde_json::from_str(json)?;
        analysis.sort();
        Ok(analysis)
    }

    pub fn sort(&mut self) {
        self.segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.beats.sort_by(|a, b| a.start.total_cmp(&b.start));
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.beats.is_empty()
    }
}

/// Coarse single-value descriptors of a track.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct TrackFeatures {
    /// Beats per minute, 0.0 when unknown
    #[serde(default)]
    pub tempo: f32,
    /// 0.0-1.0
    #[serde(default = "default_energy")]
    pub energy: f32,
}

impl Default for TrackFeatures {
    fn default() -> Self {
        Self {
            tempo: 0.0,
            energy: default_energy(),
        }
    }
}

/// Per-frame signal before normalization, either resolved from analysis or
/// synthesized.
#[derive(Clone, Debug, PartialEq)]
pub struct RawSignal {
    pub is_beat: bool,
    /// 1.0 at a beat onset, fading to 0.0
    pub beat_intensity: f32,
    /// dB, roughly -60..0
    pub loudness: f32,
    pub pitches: [f32; PITCH_BANDS],
    pub timbre: [f32; PITCH_BANDS],
    pub is_simulated: bool,
    pub tempo: f32,
}

/// Bounded, sensitivity-scaled bands shared by every strategy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedSignal {
    /// Overall level, 0.0-1.2
    pub level: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    /// 0.0-1.0
    pub beat_pulse: f32,
    pub pitches: [f32; PITCH_BANDS],
}

impl NormalizedSignal {
    /// All-zero state used while paused or before data arrives.
    pub fn rest() -> Self {
        Self::default()
    }

    pub fn is_rest(&self) -> bool {
        *self == Self::rest()
    }
}

fn silent_db() -> f32 {
    -60.0
}

fn default_energy() -> f32 {
    0.5
}

fn band_array<'de, D>(deserializer: D) -> Result<[f32; PITCH_BANDS], D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<f32> = Vec::deserialize(deserializer)?;
    let mut bands = [0.0f32; PITCH_BANDS];
    for (slot, value) in bands.iter_mut().zip(values) {
        *slot = value;
    }
    Ok(bands)
}
