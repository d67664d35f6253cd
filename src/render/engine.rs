//! Frame scheduler tying playback, analysis and strategies together.
//!
//! The host paces the loop by calling [`RenderLoop::tick`]; each call reads
//! the clock once, estimates the playback position, resolves a raw signal
//! (real analysis or the ambient model), normalizes it and hands the frame to
//! the selected strategy. Nothing here sleeps or spawns.

use std::rc::Rc;

use fontdue::Font;

use super::canvas::Canvas;
use crate::analysis::normalize::{MAX_SENSITIVITY, MIN_SENSITIVITY};
use crate::analysis::{normalize, resolve_signal, TrackAnalysis, TrackFeatures};
use crate::clock::Clock;
use crate::playback::{PlaybackSnapshot, PositionEstimator};
use crate::theme::ThemeId;
use crate::visualizers::{FrameInput, VisualizerKind, VisualizerRegistry};

/// User-adjustable knobs, read at the start of every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings {
    sensitivity: f32,
    theme: ThemeId,
    visualizer: VisualizerKind,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            theme: ThemeId::default(),
            visualizer: VisualizerKind::default(),
        }
    }
}

impl EngineSettings {
    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    pub fn visualizer(&self) -> VisualizerKind {
        self.visualizer
    }

    /// Clamped to the supported range; NaN keeps the current value.
    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        if sensitivity.is_nan() {
            log::warn!("Ignoring NaN sensitivity");
            return;
        }
        self.sensitivity = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    }

    pub fn set_theme(&mut self, name: &str) {
        self.theme = ThemeId::resolve(name);
    }

    pub fn set_visualizer(&mut self, name: &str) {
        self.visualizer = VisualizerKind::resolve(name);
    }

    pub fn set_visualizer_kind(&mut self, kind: VisualizerKind) {
        self.visualizer = kind;
    }
}

/// Result of one [`RenderLoop::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    Drawn {
        visualizer: VisualizerKind,
        position_ms: f64,
        simulated: bool,
    },
    /// Loop stopped or no canvas mounted; nothing was read or drawn.
    Stopped,
}

pub struct RenderLoop<C: Canvas> {
    canvas: Option<C>,
    clock: Box<dyn Clock>,
    running: bool,
    started_at_ms: f64,
    settings: EngineSettings,
    playback: PositionEstimator,
    analysis: Option<TrackAnalysis>,
    features: Option<TrackFeatures>,
    registry: VisualizerRegistry,
}

impl<C: Canvas> RenderLoop<C> {
    pub fn new(clock: Box<dyn Clock>, seed: u64, font: Option<Rc<Font>>) -> Self {
        Self {
            canvas: None,
            clock,
            running: false,
            started_at_ms: 0.0,
            settings: EngineSettings::default(),
            playback: PositionEstimator::new(),
            analysis: None,
            features: None,
            registry: VisualizerRegistry::new(seed, font),
        }
    }

    pub fn mount(&mut self, canvas: C) {
        log::debug!("Mounted {}x{} canvas", canvas.width(), canvas.height());
        self.canvas = Some(canvas);
    }

    /// Stop the loop and hand the canvas back.
    pub fn unmount(&mut self) -> Option<C> {
        self.stop();
        self.canvas.take()
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    /// For hosts compositing on top of the last frame (overlays).
    pub fn canvas_mut(&mut self) -> Option<&mut C> {
        self.canvas.as_mut()
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.started_at_ms = self.clock.now_ms();
            log::debug!("Render loop started");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::debug!("Render loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EngineSettings {
        &mut self.settings
    }

    /// Record a playback snapshot. A new track drops its predecessor's
    /// analysis, so frames run ambient until fresh data arrives.
    pub fn push_snapshot(&mut self, snapshot: PlaybackSnapshot) {
        let now = self.clock.now_ms();
        if self.playback.update(snapshot, now) {
            log::info!("Track changed to {}", self.playback.track_id().unwrap_or("<none>"));
            self.analysis = None;
            self.features = None;
        }
    }

    /// Install analysis for `track_id`. Data for any other track is stale
    /// and dropped. An analysis without segments counts as missing.
    pub fn load_analysis(
        &mut self,
        track_id: Option<&str>,
        analysis: Option<TrackAnalysis>,
        features: Option<TrackFeatures>,
    ) -> bool {
        if track_id != self.playback.track_id() {
            log::warn!(
                "Dropping analysis for stale track {}",
                track_id.unwrap_or("<none>")
            );
            return false;
        }
        self.analysis = analysis.filter(|a| !a.segments.is_empty());
        self.features = features;
        log::info!(
            "Loaded {} (features: {})",
            if self.analysis.is_some() { "track analysis" } else { "no analysis, ambient mode" },
            self.features.is_some()
        );
        true
    }

    pub fn track_id(&self) -> Option<&str> {
        self.playback.track_id()
    }

    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }

    pub fn position_ms(&self) -> f64 {
        self.playback.position_ms(self.clock.now_ms())
    }

    /// Draw one frame if running and mounted.
    pub fn tick(&mut self) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return FrameOutcome::Stopped;
        };

        let settings = self.settings;
        let now = self.clock.now_ms();
        let position_ms = self.playback.position_ms(now);
        let is_playing = self.playback.is_playing();

        let raw = resolve_signal(self.analysis.as_ref(), self.features.as_ref(), position_ms);
        let norm = normalize(Some(&raw), is_playing, settings.sensitivity);
        let frame = FrameInput {
            raw: Some(&raw),
            norm: &norm,
            is_playing,
            time_s: (now - self.started_at_ms) / 1000.0,
        };

        self.registry
            .get_or_create(settings.visualizer)
            .render(canvas, &frame, settings.theme.theme());

        FrameOutcome::Drawn {
            visualizer: settings.visualizer,
            position_ms,
            simulated: raw.is_simulated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::features::{Interval, Segment};
    use crate::clock::ManualClock;
    use crate::render::canvas::PixelCanvas;
    use crate::render::recording::RecordingCanvas;
    use approx::assert_relative_eq;

    fn snapshot(position_ms: f64, is_playing: bool, track: &str) -> PlaybackSnapshot {
        PlaybackSnapshot {
            position_ms,
            is_playing,
            track_id: Some(track.to_string()),
        }
    }

    fn analysis() -> TrackAnalysis {
        let segment = Segment {
            loudness_max: -10.0,
            pitches: [0.8; 12],
            timbre: [0.0; 12],
        };
        TrackAnalysis {
            segments: vec![Interval::new(0.0, 600.0, segment)],
            beats: Vec::new(),
        }
    }

    #[test]
    fn extrapolates_position_between_snapshots() {
        let clock = ManualClock::new(5_000.0);
        let mut engine: RenderLoop<PixelCanvas> = RenderLoop::new(Box::new(clock.clone()), 0, None);
        engine.mount(PixelCanvas::new(32, 32));
        engine.start();
        engine.push_snapshot(snapshot(10_000.0, true, "a"));
        clock.advance(2_000.0);
        match engine.tick() {
            FrameOutcome::Drawn { position_ms, simulated, .. } => {
                assert_relative_eq!(position_ms, 12_000.0);
                assert!(simulated);
            }
            FrameOutcome::Stopped => panic!("loop should be drawing"),
        }

        engine.push_snapshot(snapshot(10_000.0, false, "a"));
        clock.advance(5_000.0);
        assert_relative_eq!(engine.position_ms(), 10_000.0);
    }

    #[test]
    fn no_draws_after_stop_or_unmount() {
        let clock = ManualClock::new(0.0);
        let (canvas, log) = RecordingCanvas::new(64, 48, clock.clone());
        let mut engine = RenderLoop::new(Box::new(clock.clone()), 0, None);
        engine.mount(canvas);
        assert_eq!(engine.tick(), FrameOutcome::Stopped);
        assert!(log.borrow().is_empty());

        engine.start();
        engine.push_snapshot(snapshot(0.0, true, "a"));
        for _ in 0..3 {
            clock.advance(16.0);
            assert!(matches!(engine.tick(), FrameOutcome::Drawn { .. }));
        }
        engine.stop();
        let stopped_at = clock.now_ms();
        for _ in 0..3 {
            clock.advance(16.0);
            assert_eq!(engine.tick(), FrameOutcome::Stopped);
        }
        assert!(log.borrow().iter().all(|call| call.at_ms <= stopped_at));

        engine.start();
        clock.advance(16.0);
        assert!(matches!(engine.tick(), FrameOutcome::Drawn { .. }));
        let returned = engine.unmount();
        assert!(returned.is_some());
        assert!(!engine.is_running());
        let unmounted_at = clock.now_ms();
        clock.advance(16.0);
        engine.start();
        assert_eq!(engine.tick(), FrameOutcome::Stopped);
        assert!(log.borrow().iter().all(|call| call.at_ms <= unmounted_at));
    }

    /// Wide enough that every spectrum bar has real width.
    fn playing_engine(seed: u64) -> (RenderLoop<PixelCanvas>, ManualClock) {
        let clock = ManualClock::new(0.0);
        let mut engine = RenderLoop::new(Box::new(clock.clone()), seed, None);
        engine.mount(PixelCanvas::new(160, 48));
        engine.start();
        engine.push_snapshot(snapshot(0.0, true, "a"));
        assert!(engine.load_analysis(Some("a"), Some(analysis()), None));
        (engine, clock)
    }

    fn run_frames(engine: &mut RenderLoop<PixelCanvas>, clock: &ManualClock, frames: usize) {
        for _ in 0..frames {
            clock.advance(16.0);
            assert!(matches!(engine.tick(), FrameOutcome::Drawn { .. }));
        }
    }

    fn frame_pixels(engine: &RenderLoop<PixelCanvas>) -> Option<Vec<u8>> {
        engine.canvas().map(|c| c.pixels().to_vec())
    }

    #[test]
    fn strategies_resume_their_own_state_after_switching() {
        let (mut engine, clock) = playing_engine(7);
        run_frames(&mut engine, &clock, 20);
        engine.settings_mut().set_visualizer("tunnel");
        run_frames(&mut engine, &clock, 5);
        engine.settings_mut().set_visualizer("spectrum_pro");
        clock.advance(16.0);
        assert!(matches!(
            engine.tick(),
            FrameOutcome::Drawn { visualizer: VisualizerKind::SpectrumPro, .. }
        ));
        let switched = frame_pixels(&engine);

        // Same spectrum history, never interrupted; the clock still moves on.
        let (mut uninterrupted, solo_clock) = playing_engine(7);
        run_frames(&mut uninterrupted, &solo_clock, 20);
        solo_clock.advance(5.0 * 16.0);
        run_frames(&mut uninterrupted, &solo_clock, 1);
        assert_eq!(switched, frame_pixels(&uninterrupted));

        // A spectrum with no history starts its bars at the floor.
        let (mut fresh, fresh_clock) = playing_engine(7);
        fresh_clock.advance(26.0 * 16.0);
        fresh.tick();
        assert_ne!(switched, frame_pixels(&fresh));
    }

    #[test]
    fn first_frame_after_switching_matches_a_fresh_strategy() {
        let (mut engine, clock) = playing_engine(7);
        run_frames(&mut engine, &clock, 20);
        engine.settings_mut().set_visualizer("tunnel");
        run_frames(&mut engine, &clock, 1);
        let switched = frame_pixels(&engine);

        let (mut fresh, fresh_clock) = playing_engine(7);
        fresh.settings_mut().set_visualizer("tunnel");
        fresh_clock.advance(21.0 * 16.0);
        assert!(matches!(
            fresh.tick(),
            FrameOutcome::Drawn { visualizer: VisualizerKind::Tunnel, .. }
        ));
        assert_eq!(switched, frame_pixels(&fresh));

        // the tunnel actually drew streaks over the background
        let background = ThemeId::default().theme().background;
        let lit = switched
            .unwrap_or_default()
            .chunks_exact(4)
            .any(|px| px[..3] != [background.r, background.g, background.b]);
        assert!(lit);
    }

    #[test]
    fn track_change_drops_analysis_and_stale_data_is_ignored() {
        let clock = ManualClock::new(0.0);
        let mut engine: RenderLoop<PixelCanvas> = RenderLoop::new(Box::new(clock.clone()), 0, None);
        engine.mount(PixelCanvas::new(16, 16));
        engine.start();
        engine.push_snapshot(snapshot(1_000.0, true, "a"));
        assert!(engine.load_analysis(Some("a"), Some(analysis()), None));
        assert!(matches!(engine.tick(), FrameOutcome::Drawn { simulated: false, .. }));

        engine.push_snapshot(snapshot(0.0, true, "b"));
        assert!(!engine.has_analysis());
        assert!(matches!(engine.tick(), FrameOutcome::Drawn { simulated: true, .. }));

        assert!(!engine.load_analysis(Some("a"), Some(analysis()), None));
        assert!(!engine.has_analysis());

        assert!(engine.load_analysis(Some("b"), Some(TrackAnalysis::default()), None));
        assert!(!engine.has_analysis());
    }

    #[test]
    fn settings_are_clamped_and_resolved() {
        let mut settings = EngineSettings::default();
        settings.set_sensitivity(9.0);
        assert_eq!(settings.sensitivity(), MAX_SENSITIVITY);
        settings.set_sensitivity(0.0);
        assert_eq!(settings.sensitivity(), MIN_SENSITIVITY);
        settings.set_sensitivity(f32::NAN);
        assert_eq!(settings.sensitivity(), MIN_SENSITIVITY);

        settings.set_theme("matrix");
        assert_eq!(settings.theme(), ThemeId::Matrix);
        settings.set_theme("no-such-theme");
        assert_eq!(settings.theme(), ThemeId::RetroWave);
        settings.set_visualizer("fireworks");
        assert_eq!(settings.visualizer(), VisualizerKind::Fireworks);
        settings.set_visualizer("");
        assert_eq!(settings.visualizer(), VisualizerKind::SpectrumPro);
    }

    #[test]
    fn theme_change_applies_on_next_tick() {
        let clock = ManualClock::new(0.0);
        let mut engine: RenderLoop<PixelCanvas> = RenderLoop::new(Box::new(clock), 0, None);
        engine.mount(PixelCanvas::new(64, 64));
        engine.start();
        engine.tick();
        let before = engine.canvas().and_then(|c| c.pixel(0, 0));
        engine.settings_mut().set_theme("ice_cave");
        engine.tick();
        let after = engine.canvas().and_then(|c| c.pixel(0, 0));
        assert_ne!(before, after);
        assert_eq!(after, Some([0xe0, 0xf7, 0xfa, 255]));
    }
}
