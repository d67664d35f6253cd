//! Synthetic signal used when a track has no fine-grained analysis.
//!
//! Everything here is a closed-form function of elapsed time and the coarse
//! track features, so the same instant always produces the same signal.

use super::features::{RawSignal, TrackFeatures, PITCH_BANDS};

/// Fraction of a beat period during which a synthetic beat is active.
const BEAT_WINDOW: f64 = 0.1;
const DEFAULT_ENERGY: f32 = 0.5;
/// Loudness anchor of the rolling wave (dB).
const BASE_LOUDNESS_DB: f32 = -20.0;

pub fn synthesize_ambient(elapsed_ms: f64, features: Option<&TrackFeatures>) -> RawSignal {
    let t = elapsed_ms / 1000.0;
    let tempo = features.map_or(0.0, |f| f.tempo);

    let (is_beat, beat_intensity) = if tempo > 0.0 {
        let spb = 60.0 / tempo as f64;
        let phase = t.rem_euclid(spb) / spb;
        if phase < BEAT_WINDOW {
            (true, (1.0 - phase / BEAT_WINDOW) as f32)
        } else {
            (false, 0.0)
        }
    } else {
        // no tempo: slow breathing instead of discrete beats
        (false, ((t.sin() + 1.0) * 0.2) as f32)
    };

    let energy = features.map_or(DEFAULT_ENERGY, |f| f.energy);

    let wave = ((t * 0.5).sin() * 0.3 + (t * 0.2).sin() * 0.2) as f32;
    let loudness = BASE_LOUDNESS_DB + wave * 20.0 + beat_intensity * 10.0 * energy;

    let mut pitches = [0.0f32; PITCH_BANDS];
    for (i, band) in pitches.iter_mut().enumerate() {
        let value = ((t * 0.5 + i as f64 * 0.5).sin() + 1.0) / 2.0;
        *band = value as f32 * energy;
    }

    RawSignal {
        is_beat,
        beat_intensity,
        loudness,
        pitches,
        timbre: pitches,
        is_simulated: true,
        tempo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tempo(bpm: f32) -> TrackFeatures {
        TrackFeatures { tempo: bpm, energy: 0.5 }
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let features = tempo(97.0);
        for ms in [0.0, 16.6, 1_000.0, 123_456.7] {
            assert_eq!(synthesize_ambient(ms, Some(&features)), synthesize_ambient(ms, Some(&features)));
            assert_eq!(synthesize_ambient(ms, None), synthesize_ambient(ms, None));
        }
    }

    #[test]
    fn beat_decays_linearly_inside_window() {
        let features = tempo(120.0);
        // spb = 0.5s; 25ms is phase 0.05
        let early = synthesize_ambient(25.0, Some(&features));
        assert!(early.is_beat);
        assert_abs_diff_eq!(early.beat_intensity, 0.5, epsilon = 1e-4);

        let onset = synthesize_ambient(0.0, Some(&features));
        assert_abs_diff_eq!(onset.beat_intensity, 1.0, epsilon = 1e-6);

        // 50ms is phase 0.1, the window edge itself
        let edge = synthesize_ambient(50.0, Some(&features));
        assert!(!edge.is_beat);
        assert_eq!(edge.beat_intensity, 0.0);

        // phase 0.6
        let late = synthesize_ambient(300.0, Some(&features));
        assert!(!late.is_beat);
        assert_eq!(late.beat_intensity, 0.0);

        // next beat starts again
        let next = synthesize_ambient(510.0, Some(&features));
        assert!(next.is_beat);
        assert_abs_diff_eq!(next.beat_intensity, 0.8, epsilon = 1e-4);
    }

    #[test]
    fn unknown_tempo_breathes_without_beats() {
        for ms in (0..20_000).step_by(250) {
            let signal = synthesize_ambient(ms as f64, None);
            assert!(!signal.is_beat);
            assert!((0.0..=0.4).contains(&signal.beat_intensity));
        }
        let zero = synthesize_ambient(0.0, Some(&tempo(0.0)));
        assert_abs_diff_eq!(zero.beat_intensity, 0.2, epsilon = 1e-6);
    }

    #[test]
    fn loudness_stays_near_anchor() {
        for ms in (0..60_000).step_by(100) {
            let signal = synthesize_ambient(ms as f64, Some(&TrackFeatures { tempo: 140.0, energy: 1.0 }));
            assert!(signal.loudness >= -30.0 && signal.loudness <= 0.0, "{}", signal.loudness);
        }
    }

    #[test]
    fn adjacent_pitch_bands_are_correlated() {
        let signal = synthesize_ambient(4_321.0, None);
        for pair in signal.pitches.windows(2) {
            // half-radian phase step bounds the neighbour difference
            assert!((pair[0] - pair[1]).abs() <= 0.5 * 0.5 + 1e-6);
        }
        assert!(signal.pitches.iter().all(|&p| (0.0..=0.5).contains(&p)));
        assert_eq!(signal.pitches, signal.timbre);
        assert!(signal.is_simulated);
    }
}
