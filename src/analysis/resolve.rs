use super::ambient::synthesize_ambient;
use super::features::{Interval, RawSignal, TrackAnalysis, TrackFeatures, PITCH_BANDS};

/// Loudness reported when the position falls between or outside segments.
const SILENCE_DB: f32 = -60.0;

/// Find the interval whose `[start, start + duration)` range contains
/// `position` (seconds). `intervals` must be sorted by `start` and
/// non-overlapping.
pub fn find_interval<T>(intervals: &[Interval<T>], position: f64) -> Option<&Interval<T>> {
    let first = intervals.first()?;
    let last = intervals.last()?;
    if position < first.start || position > last.end() {
        return None;
    }

    let mut low = 0usize;
    let mut high = intervals.len();
    while low < high {
        let mid = low + (high - low) / 2;
        let interval = &intervals[mid];
        if interval.contains(position) {
            return Some(interval);
        }
        if position < interval.start {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    None
}

/// Produce this frame's raw signal from analysis data, or from the ambient
/// model when no analysis is loaded.
pub fn resolve_signal(
    analysis: Option<&TrackAnalysis>,
    features: Option<&TrackFeatures>,
    position_ms: f64,
) -> RawSignal {
    let Some(analysis) = analysis else {
        return synthesize_ambient(position_ms, features);
    };

    let position = position_ms / 1000.0;
    let segment = find_interval(&analysis.segments, position);
    let beat = find_interval(&analysis.beats, position);

    let (loudness, pitches, timbre) = match segment {
        Some(seg) => (seg.payload.loudness_max, seg.payload.pitches, seg.payload.timbre),
        None => (SILENCE_DB, [0.0; PITCH_BANDS], [0.0; PITCH_BANDS]),
    };

    RawSignal {
        is_beat: beat.is_some(),
        beat_intensity: if beat.is_some() { 1.0 } else { 0.0 },
        loudness,
        pitches,
        timbre,
        is_simulated: false,
        tempo: features.map_or(0.0, |f| f.tempo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{Beat, Segment};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn linear_scan<T>(intervals: &[Interval<T>], position: f64) -> Option<&Interval<T>> {
        intervals.iter().find(|iv| iv.contains(position))
    }

    fn contiguous(durations: &[f64]) -> Vec<Interval<usize>> {
        let mut start = 0.0;
        durations
            .iter()
            .enumerate()
            .map(|(i, &d)| {
                let iv = Interval::new(start, d, i);
                start += d;
                iv
            })
            .collect()
    }

    #[test]
    fn empty_sequence_resolves_to_none() {
        let empty: Vec<Interval<()>> = Vec::new();
        assert!(find_interval(&empty, 0.0).is_none());
    }

    #[test]
    fn boundaries_belong_to_the_later_interval() {
        let ivs = contiguous(&[1.0, 0.5, 2.0]);
        assert_eq!(find_interval(&ivs, 0.0).map(|i| i.payload), Some(0));
        assert_eq!(find_interval(&ivs, 1.0).map(|i| i.payload), Some(1));
        assert_eq!(find_interval(&ivs, 1.5).map(|i| i.payload), Some(2));
        // end of the last interval is outside every range
        assert!(find_interval(&ivs, 3.5).is_none());
        assert!(find_interval(&ivs, -0.001).is_none());
        assert!(find_interval(&ivs, 3.6).is_none());
    }

    #[test]
    fn gaps_resolve_to_none() {
        let ivs = vec![
            Interval::new(0.0, 1.0, 0),
            Interval::new(2.0, 1.0, 1),
            Interval::new(5.0, 0.25, 2),
        ];
        assert!(find_interval(&ivs, 1.5).is_none());
        assert!(find_interval(&ivs, 4.99).is_none());
        assert_eq!(find_interval(&ivs, 5.1).map(|i| i.payload), Some(2));
    }

    #[test]
    fn zero_length_markers_never_contain_anything() {
        let ivs = vec![Interval::new(1.0, 0.0, 0), Interval::new(2.0, 0.5, 1)];
        assert!(find_interval(&ivs, 1.0).is_none());
        assert_eq!(find_interval(&ivs, 2.0).map(|i| i.payload), Some(1));
    }

    #[test]
    fn matches_linear_scan_on_generated_sets() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(0..40);
            let mut start = rng.gen_range(0.0..2.0);
            let mut ivs = Vec::with_capacity(n);
            for i in 0..n {
                let duration = if rng.gen_bool(0.1) { 0.0 } else { rng.gen_range(0.01..1.5) };
                ivs.push(Interval::new(start, duration, i));
                let gap = if rng.gen_bool(0.3) { rng.gen_range(0.0..0.5) } else { 0.0 };
                start += duration + gap;
            }
            let mut probes: Vec<f64> = (0..100).map(|_| rng.gen_range(-1.0..start + 1.0)).collect();
            probes.extend(ivs.iter().flat_map(|iv| [iv.start, iv.end()]));
            for p in probes {
                assert_eq!(
                    find_interval(&ivs, p).map(|i| i.payload),
                    linear_scan(&ivs, p).map(|i| i.payload),
                    "position {}",
                    p
                );
            }
        }
    }

    #[test]
    fn resolves_segment_and_beat_together() {
        let mut pitches = [0.0; PITCH_BANDS];
        pitches[3] = 0.8;
        let analysis = TrackAnalysis {
            segments: vec![Interval::new(
                0.0,
                2.0,
                Segment {
                    loudness_max: -6.0,
                    pitches,
                    timbre: [0.0; PITCH_BANDS],
                },
            )],
            beats: vec![Interval::new(0.5, 0.4, Beat { confidence: 0.8 })],
        };
        let features = TrackFeatures { tempo: 100.0, energy: 0.7 };

        let on_beat = resolve_signal(Some(&analysis), Some(&features), 600.0);
        assert!(on_beat.is_beat);
        assert_eq!(on_beat.beat_intensity, 1.0);
        assert_eq!(on_beat.loudness, -6.0);
        assert_eq!(on_beat.pitches[3], 0.8);
        assert_eq!(on_beat.tempo, 100.0);
        assert!(!on_beat.is_simulated);

        let off_beat = resolve_signal(Some(&analysis), None, 1_500.0);
        assert!(!off_beat.is_beat);
        assert_eq!(off_beat.beat_intensity, 0.0);
        assert_eq!(off_beat.tempo, 0.0);

        let past_end = resolve_signal(Some(&analysis), None, 5_000.0);
        assert_eq!(past_end.loudness, SILENCE_DB);
        assert_eq!(past_end.pitches, [0.0; PITCH_BANDS]);
    }

    #[test]
    fn missing_analysis_routes_to_ambient() {
        let signal = resolve_signal(None, None, 1_234.0);
        assert!(signal.is_simulated);
        assert_eq!(signal, synthesize_ambient(1_234.0, None));
    }
}
