use std::f32::consts::TAU;
use std::rc::Rc;

use fontdue::Font;

use super::{FrameInput, Visualizer};
use crate::render::canvas::{BlendMode, Canvas, Point};
use crate::render::text::GlyphAtlas;
use crate::theme::{Color, Theme};

/// Samples `f` across the canvas width every `step` pixels, last column included.
fn sample_row(w: f32, step: f32, mut f: impl FnMut(f32) -> f32) -> Vec<Point> {
    let count = (w / step).floor() as usize + 1;
    (0..count)
        .map(|i| {
            let x = i as f32 * step;
            (x, f(x))
        })
        .collect()
}

/// Stacked translucent fluid layers.
pub struct Liquid {
    t: f32,
}

impl Liquid {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for Liquid {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.01 + norm.level * 0.02;

        let layers = 5;
        for i in 0..layers {
            let color = if i % 2 == 0 {
                theme.primary.with_alpha(0.5)
            } else {
                theme.secondary.with_alpha((0.2 + i as f32 * 0.1) * 0.5)
            };
            let base = h / 2.0 + (i as f32 - layers as f32 / 2.0) * 40.0;
            let t = self.t;
            let mut outline = vec![(0.0, h)];
            outline.extend(sample_row(w, 10.0, |x| {
                base + (x * 0.01 + t + i as f32).sin() * 40.0 + (x * 0.03 - t * 1.5).sin() * 15.0 * norm.mid
            }));
            outline.push((w, h));
            canvas.fill_polygon(&outline, color);
        }
    }
}

/// Lissajous figure whose ratios follow bass and mids.
pub struct Oscilloscope {
    t: f32,
}

impl Oscilloscope {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for Oscilloscope {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.02 + norm.level * 0.05;

        let a = 3.0 + norm.bass;
        let b = 2.0 + norm.mid;
        let scale = w.min(h) * 0.35;
        let steps = (TAU / 0.01) as usize;
        let figure: Vec<Point> = (0..=steps)
            .map(|i| {
                let i = i as f32 * 0.01;
                (w / 2.0 + scale * (a * i + self.t).sin(), h / 2.0 + scale * (b * i).sin())
            })
            .collect();
        canvas.polyline(&figure, 9.0, theme.primary.with_alpha(0.15));
        canvas.polyline(&figure, 3.0, theme.primary);
    }
}

/// Scope trace over a graticule, driven by engine time.
pub struct OscilloscopePro;

impl Visualizer for OscilloscopePro {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);

        let grid = Color::WHITE.with_alpha(0.1);
        let mut x = 0.0;
        while x < w {
            canvas.line((x, 0.0), (x, h), 1.0, grid);
            x += 50.0;
        }
        let mut y = 0.0;
        while y < h {
            canvas.line((0.0, y), (w, y), 1.0, grid);
            y += 50.0;
        }

        let t = (frame.time_s * 2.0) as f32;
        let amplitude = h / 3.0 * norm.level;
        let freq = 0.05 + norm.bass * 0.05;
        let mut trace = Vec::with_capacity((w / 2.0) as usize + 1);
        let mut x = 0.0;
        while x < w {
            let y = h / 2.0
                + (x * freq + t * 5.0).sin() * amplitude
                + (x * 0.2 - t * 10.0).sin() * (amplitude * 0.3 * norm.high);
            trace.push((x, y));
            x += 2.0;
        }
        canvas.polyline(&trace, 9.0, theme.primary.with_alpha(0.15));
        canvas.polyline(&trace, 3.0, theme.primary);
    }
}

/// Drifting soft blobs composited with a screen blend.
pub struct NebulaCloud {
    t: f32,
}

impl NebulaCloud {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for NebulaCloud {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.001 + norm.level * 0.002;

        canvas.set_blend_mode(BlendMode::Screen);
        for i in 0..15 {
            let fi = i as f32;
            let x = w / 2.0 + (self.t * 0.2 + fi).cos() * (w * 0.35);
            let y = h / 2.0 + (self.t * 0.3 + fi * 1.5).sin() * (h * 0.3);
            let r = 30.0 + norm.mid * 80.0 + fi.sin().abs() * 40.0;
            let color = if i % 2 == 0 { theme.primary } else { theme.secondary };
            canvas.fill_radial_gradient((x, y), r, color, color.with_alpha(0.0));
        }
        canvas.set_blend_mode(BlendMode::Normal);
    }
}

/// Bundle of interleaved sine ribbons.
pub struct SilkRibbon {
    t: f32,
}

impl SilkRibbon {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for SilkRibbon {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.005 + norm.level * 0.01;

        let t = self.t;
        for i in 0..15 {
            let color = if i % 2 == 0 { theme.primary } else { theme.secondary };
            let ribbon = sample_row(w, 15.0, |x| {
                h / 2.0
                    + (x * 0.01 + t + i as f32 * 0.3).sin() * 80.0
                    + (x * 0.02 - t * 1.2).sin() * (30.0 + norm.bass * 80.0)
            });
            canvas.polyline(&ribbon, 1.0, color.with_alpha(0.4));
        }
    }
}

/// Ridge lines bulging in the middle, each occluding the ones behind.
pub struct SimpleWave {
    t: f32,
}

impl SimpleWave {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for SimpleWave {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.015 + norm.level * 0.025;

        let lines = 35;
        let spacing = h / (lines + 8) as f32;
        let amplitude = 40.0 * norm.level;
        let t = self.t;
        for i in 0..lines {
            let base = h * 0.15 + i as f32 * spacing;
            let ridge = sample_row(w, 10.0, |x| {
                let bell = (-((x - w / 2.0).abs() / (w * 0.22)).powi(2)).exp();
                let offset = bell
                    * ((x * 0.05 + t + i as f32 * 0.2).sin() * 20.0 + amplitude * (x * 0.08 - t).sin());
                base - offset.abs()
            });
            canvas.fill_polygon(&ridge, theme.background);
            canvas.polyline(&ridge, 2.0, theme.primary);
        }
    }
}

const ASCII_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const ASCII_COLS: usize = 50;
const ASCII_ROWS: usize = 28;

/// Interference pattern rendered as a character grid.
pub struct Ascii {
    atlas: GlyphAtlas,
}

impl Ascii {
    pub fn new(font: Option<Rc<Font>>) -> Self {
        Self {
            atlas: GlyphAtlas::new(font),
        }
    }
}

/// Ramp value at a normalized cell position, 0.0-1.0.
fn ascii_field(nx: f32, ny: f32, t: f32, bass: f32) -> f32 {
    let swell = (nx * 3.0 + ny * 3.0 + t).sin();
    let ripple = (nx * 7.0 - ny * 7.0 + t * 1.5).cos();
    let amp = 0.5 + bass * 0.6;
    let value = ((swell + ripple) * 0.5 * amp + 1.0) / 2.0;
    value.max(0.0).powf(1.2)
}

impl Visualizer for Ascii {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        canvas.clear(theme.background);

        let cell_w = w / ASCII_COLS as f32;
        let cell_h = h / ASCII_ROWS as f32;
        let size = (cell_h * 1.15).floor().max(1.0);
        let t = (frame.time_s * 0.5) as f32;

        for y in 0..ASCII_ROWS {
            let ny = y as f32 / ASCII_ROWS as f32;
            for x in 0..ASCII_COLS {
                let nx = x as f32 / ASCII_COLS as f32;
                let value = ascii_field(nx, ny, t, frame.norm.bass);
                let idx = (value.clamp(0.0, 1.0) * (ASCII_RAMP.len() - 1) as f32).floor() as usize;
                let color = if value > 0.8 {
                    theme.accent
                } else if value > 0.5 {
                    theme.primary.with_alpha(0.8)
                } else {
                    theme.secondary.with_alpha(0.4)
                };
                let center = (x as f32 * cell_w + cell_w / 2.0, y as f32 * cell_h + cell_h / 2.0);
                self.atlas
                    .draw_char_centered(canvas, ASCII_RAMP[idx], center, size, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::NormalizedSignal;
    use crate::render::canvas::PixelCanvas;
    use crate::theme::ThemeId;

    #[test]
    fn sample_row_includes_both_edges() {
        let row = sample_row(100.0, 10.0, |x| x * 2.0);
        assert_eq!(row.len(), 11);
        assert_eq!(row[0], (0.0, 0.0));
        assert_eq!(row[10], (100.0, 200.0));
    }

    #[test]
    fn ascii_field_stays_in_ramp_range() {
        for bass in [0.0, 0.6, 1.2] {
            for i in 0..50 {
                let v = ascii_field(i as f32 / 50.0, 1.0 - i as f32 / 50.0, i as f32 * 0.3, bass);
                assert!((0.0..=1.6).contains(&v), "{}", v);
            }
        }
    }

    #[test]
    fn oscilloscope_pro_is_flat_at_rest() {
        let theme = ThemeId::Cyberpunk.theme();
        let norm = NormalizedSignal::rest();
        let frame = FrameInput {
            raw: None,
            norm: &norm,
            is_playing: false,
            time_s: 3.0,
        };
        let mut canvas = PixelCanvas::new(120, 80);
        OscilloscopePro.render(&mut canvas, &frame, theme);
        // zero amplitude puts the trace on the center row
        let center = canvas.pixel(60, 40).unwrap_or_default();
        let top = canvas.pixel(60, 10).unwrap_or_default();
        assert!(center[..3] != [0, 0, 0]);
        assert_eq!(top[..3], [0, 0, 0]);
    }

    #[test]
    fn nebula_restores_normal_blend() {
        use crate::clock::ManualClock;
        use crate::render::recording::RecordingCanvas;

        let (mut canvas, log) = RecordingCanvas::new(64, 64, ManualClock::default());
        let norm = NormalizedSignal::rest();
        let frame = FrameInput {
            raw: None,
            norm: &norm,
            is_playing: false,
            time_s: 0.0,
        };
        NebulaCloud::new().render(&mut canvas, &frame, ThemeId::Cyberpunk.theme());
        let ops: Vec<_> = log.borrow().iter().map(|c| c.op).collect();
        assert_eq!(ops.iter().filter(|&&op| op == "set_blend_mode").count(), 2);
        assert_eq!(ops.last(), Some(&"set_blend_mode"));
    }
}
