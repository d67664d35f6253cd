use super::features::{NormalizedSignal, RawSignal};

/// dB floor mapped to level 0.0.
const LOUDNESS_FLOOR_DB: f32 = -60.0;
/// Damps user sensitivity so high settings do not run away.
const SENSITIVITY_DAMPING: f32 = 0.8;
/// Bands may overshoot 1.0 slightly for punchier visuals.
const BAND_CEILING: f32 = 1.2;

pub const MIN_SENSITIVITY: f32 = 0.1;
pub const MAX_SENSITIVITY: f32 = 5.0;

/// Map a raw signal onto bounded bands. Loudness acts as a shared envelope
/// for the bass/mid/high bands.
pub fn normalize(raw: Option<&RawSignal>, is_playing: bool, sensitivity: f32) -> NormalizedSignal {
    let raw = match raw {
        Some(raw) if is_playing => raw,
        _ => return NormalizedSignal::rest(),
    };

    let gain = sensitivity * SENSITIVITY_DAMPING;

    let raw_level = ((raw.loudness - LOUDNESS_FLOOR_DB) / -LOUDNESS_FLOOR_DB).max(0.0);
    let level = bounded(raw_level * gain, BAND_CEILING);
    let beat_pulse = bounded(raw.beat_intensity * gain, 1.0);

    let band = |range: std::ops::Range<usize>| -> f32 {
        let len = range.len() as f32;
        let mean = raw.pitches[range].iter().sum::<f32>() / len;
        bounded(mean * level, BAND_CEILING)
    };

    NormalizedSignal {
        level,
        bass: band(0..4),
        mid: band(4..8),
        high: band(8..12),
        beat_pulse,
        pitches: raw.pitches,
    }
}

/// Clamp into `[0, ceiling]`, treating NaN as silence.
fn bounded(value: f32, ceiling: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, ceiling)
    }
}
