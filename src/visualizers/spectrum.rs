use super::{lerp, FrameInput, Visualizer};
use crate::analysis::PITCH_BANDS;
use crate::render::canvas::{Canvas, Rect};
use crate::theme::Theme;

const BARS: usize = 32;
const BAR_MARGIN: f32 = 4.0;
/// Per-frame approach rate of bar heights towards their targets.
const BAR_SMOOTHING: f32 = 0.15;

/// Bar graph over the 12 pitch bands, smoothed so bars glide instead of
/// jumping when segments change.
pub struct SpectrumPro {
    smoothed: [f32; BARS],
}

impl SpectrumPro {
    pub fn new() -> Self {
        Self { smoothed: [0.0; BARS] }
    }

    fn step(&mut self, frame: &FrameInput) {
        for (i, bar) in self.smoothed.iter_mut().enumerate() {
            let band = i * PITCH_BANDS / BARS;
            let target = frame.pitch(band) * frame.norm.level;
            *bar = lerp(*bar, target, BAR_SMOOTHING);
        }
    }
}

impl Visualizer for SpectrumPro {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        canvas.clear(theme.background);
        self.step(frame);

        // narrow canvases shrink the gap so bars keep most of their slot
        let margin = BAR_MARGIN.min(w / BARS as f32 * 0.25);
        let bar_width = (w - BARS as f32 * margin) / BARS as f32;
        for (i, &value) in self.smoothed.iter().enumerate() {
            let x = i as f32 * (bar_width + margin) + margin / 2.0;
            let bar_height = (value * h * 0.7).max(4.0);
            let top = h - bar_height;
            canvas.fill_vertical_gradient(
                Rect::new(x, top, bar_width, bar_height),
                &[(0.0, theme.primary), (1.0, theme.secondary)],
            );
            canvas.fill_rect(Rect::new(x, top - 4.0, bar_width, 2.0), theme.accent);
        }
    }
}

/// Sweeping block with a strip of pitch bars underneath.
pub struct Scanner {
    t: f32,
}

impl Scanner {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for Scanner {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.fill_rect(Rect::new(0.0, 0.0, w, h), theme.background.with_alpha(0.25));

        self.t += 0.03 + norm.level * 0.05;
        let pos = (self.t.sin() + 1.0) / 2.0;
        let x = w * 0.1 + pos * (w * 0.8);
        let y = h / 2.0;
        let size = 20.0 + norm.level * 40.0;

        canvas.fill_radial_gradient((x, y), size, theme.primary.with_alpha(0.4), theme.primary.with_alpha(0.0));
        canvas.fill_rect(Rect::new(x - size / 2.0, y - 10.0, size, 20.0), theme.primary);

        let bars = 20;
        let bar_w = w / bars as f32;
        for i in 0..bars {
            let value = frame.pitch(i % PITCH_BANDS) * 40.0 * norm.level;
            canvas.fill_rect(
                Rect::new(i as f32 * bar_w, h - value - 5.0, bar_w - 2.0, value),
                theme.accent,
            );
        }
    }
}
