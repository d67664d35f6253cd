use std::f32::consts::{PI, TAU};

use super::{FrameInput, Visualizer};
use crate::render::canvas::{Canvas, Point, Rect};
use crate::theme::{Color, Theme};

/// Disc shaded from `top` to `bottom`, drawn as horizontal chords.
fn gradient_disc(canvas: &mut dyn Canvas, center: Point, radius: f32, top: Color, bottom: Color) {
    let rows = (radius * 2.0).ceil() as i32;
    for row in 0..rows {
        let y = center.1 - radius + row as f32;
        let dy = y + 0.5 - center.1;
        let half = (radius * radius - dy * dy).max(0.0).sqrt();
        if half <= 0.0 {
            continue;
        }
        let color = top.mix(bottom, row as f32 / rows as f32);
        canvas.fill_rect(Rect::new(center.0 - half, y, half * 2.0, 1.0), color);
    }
}

/// Soft halo standing in for a canvas shadow blur.
fn glow(canvas: &mut dyn Canvas, center: Point, radius: f32, color: Color, strength: f32) {
    canvas.fill_radial_gradient(center, radius, color.with_alpha(strength), color.with_alpha(0.0));
}

/// Synthwave sun over a scrolling perspective grid.
pub struct NeonCity {
    offset: f32,
}

impl NeonCity {
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }
}

impl Visualizer for NeonCity {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.fill_vertical_gradient(
            Rect::new(0.0, 0.0, w, h),
            &[(0.0, theme.background), (0.5, theme.secondary), (1.0, theme.background)],
        );

        let sun_y = h * 0.3;
        let sun_r = h * 0.2 + norm.bass * 30.0;
        glow(canvas, (w / 2.0, sun_y), sun_r + 30.0, theme.primary, 0.5);
        gradient_disc(canvas, (w / 2.0, sun_y), sun_r, theme.accent, theme.primary);

        let horizon = h * 0.5;
        canvas.set_clip(Some(Rect::new(0.0, horizon, w, h - horizon)));
        canvas.fill_rect(Rect::new(0.0, horizon, w, h - horizon), theme.background);

        let drive = if frame.is_playing { 1.5 } else { 0.0 };
        self.offset = (self.offset + drive + norm.level * 1.5) % 100.0;
        for i in -15..=15 {
            let x = w / 2.0 + i as f32 * 80.0 * (1.0 + norm.high * 0.5);
            canvas.line((w / 2.0 + i as f32 * 10.0, horizon), (x, h), 1.0, theme.secondary);
        }
        for i in 0..20 {
            let progress = (i as f32 * 5.0 + self.offset) % 100.0 / 100.0;
            let y = horizon + (h - horizon) * progress * progress;
            canvas.line((0.0, y), (w, y), 1.0, theme.secondary);
        }
        canvas.set_clip(None);
    }
}

/// Striped sun and a cubic-depth floor grid.
pub struct RetroGrid {
    offset: f32,
}

impl RetroGrid {
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }
}

impl Visualizer for RetroGrid {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.fill_vertical_gradient(
            Rect::new(0.0, 0.0, w, h),
            &[
                (0.0, Color::hex(0x020010)),
                (0.4, theme.background),
                (0.5, Color::hex(0x400040)),
                (1.0, Color::BLACK),
            ],
        );

        let horizon = h * 0.55;
        let sun_y = horizon * 0.7;
        let sun_r = h * 0.22;
        glow(canvas, (w / 2.0, sun_y), sun_r + 40.0 + norm.bass * 30.0, theme.primary, 0.6);
        gradient_disc(canvas, (w / 2.0, sun_y), sun_r, theme.accent, theme.primary);
        for i in 0..8 {
            let y = sun_y + (i as f32 / 8.0) * sun_r;
            canvas.fill_rect(
                Rect::new(w / 2.0 - sun_r, y, sun_r * 2.0, 3.0 + i as f32 * 2.0),
                Color::BLACK.with_alpha(0.4),
            );
        }

        canvas.set_clip(Some(Rect::new(0.0, horizon, w, h - horizon)));
        let drive = if frame.is_playing { 2.0 } else { 0.0 };
        self.offset = (self.offset + drive + norm.level * 3.0) % 200.0;
        for i in -20..=20 {
            let i = i as f32;
            canvas.line((w / 2.0 + i * 20.0, horizon), (w / 2.0 + i * 150.0, h * 2.0), 2.0, theme.secondary);
        }
        for i in 0..30 {
            let depth = ((i as f32 * 10.0 + self.offset) % 300.0) / 300.0;
            if depth < 0.05 {
                continue;
            }
            let y = horizon + (h - horizon) * depth.powi(3);
            canvas.line((0.0, y), (w, y), 1.0 + depth * 2.0, theme.secondary.with_alpha(depth));
        }
        canvas.set_clip(None);
    }
}

/// Honeycomb lit by a ripple expanding from the center.
pub struct HexGrid {
    t: f32,
}

impl HexGrid {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for HexGrid {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);

        let size = 30.0;
        let dx = size * 1.5;
        let dy = size * 3f32.sqrt();
        let cols = (w / dx).ceil() as i32 + 1;
        let rows = (h / dy).ceil() as i32 + 1;
        self.t += 0.01 + norm.level * 0.02;

        let mut hex = [(0.0f32, 0.0f32); 7];
        for r in 0..rows {
            for c in 0..cols {
                let x = c as f32 * dx;
                let y = r as f32 * dy + (c % 2) as f32 * (dy / 2.0);
                let dist = ((x - w / 2.0).powi(2) + (y - h / 2.0).powi(2)).sqrt();
                let wave = (dist * 0.01 - self.t * 2.0 + norm.beat_pulse * 1.5).sin();
                let active = wave > 0.6;
                let scale = if active { 0.85 } else { 0.45 };
                for (k, corner) in hex.iter_mut().enumerate() {
                    let angle = PI / 3.0 * k as f32;
                    *corner = (x + angle.cos() * size * scale, y + angle.sin() * size * scale);
                }
                if active {
                    canvas.fill_polygon(&hex[..6], theme.primary);
                } else {
                    canvas.polyline(&hex, 1.0, theme.secondary);
                }
            }
        }
    }
}

/// Concentric squares rushing towards the viewer.
pub struct CyberRun {
    z: f32,
}

impl CyberRun {
    pub fn new() -> Self {
        Self { z: 0.0 }
    }
}

impl Visualizer for CyberRun {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        let (cx, cy) = (w / 2.0, h / 2.0);
        canvas.clear(theme.background);

        for i in 0..16 {
            let angle = i as f32 / 16.0 * TAU;
            canvas.line((cx, cy), (cx + angle.cos() * w, cy + angle.sin() * w), 1.0, theme.secondary);
        }

        let drive = if frame.is_playing { 5.0 } else { 0.0 };
        self.z = (self.z + drive + norm.level * 15.0) % 200.0;
        for i in 0..10 {
            let z = 200.0 - ((self.z + i as f32 * 20.0) % 200.0);
            let size = (200.0 / z) * 20.0;
            if size > w {
                continue;
            }
            let square = Rect::new(cx - size, cy - size, size * 2.0, size * 2.0);
            canvas.stroke_rect(square, 2.0, theme.primary);
            if norm.beat_pulse > 0.7 && i % 2 == 0 {
                canvas.fill_rect(square, theme.accent.with_alpha(0.15));
            }
        }
    }
}

/// Rotating dot sphere, front hemisphere only.
pub struct WireframeSphere {
    t: f32,
}

impl WireframeSphere {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for WireframeSphere {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.01 + norm.level * 0.02;

        let (cx, cy) = (w / 2.0, h / 2.0);
        let r = 120.0 + norm.bass * 40.0;
        let mut lat = -PI / 2.0;
        while lat <= PI / 2.0 {
            let mut lon = 0.0f32;
            while lon <= TAU {
                let x3 = r * lat.cos() * (lon + self.t).cos();
                let y3 = r * lat.sin();
                let z3 = r * lat.cos() * (lon + self.t).sin();
                if z3 > 0.0 {
                    let scale = 300.0 / (300.0 + z3);
                    canvas.fill_rect(Rect::new(cx + x3 * scale, cy + y3 * scale, 2.0, 2.0), theme.accent);
                }
                lon += 0.3;
            }
            lat += 0.3;
        }
    }
}

/// Checkerboard of squares pulsing outward from the center.
pub struct CubeField {
    t: f32,
}

impl CubeField {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for CubeField {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.01 + norm.level * 0.02;

        let size = 40.0;
        let cols = (w / size).ceil() as i32;
        let rows = (h / size).ceil() as i32;
        for y in 0..rows {
            for x in 0..cols {
                let cx = x as f32 * size + size / 2.0;
                let cy = y as f32 * size + size / 2.0;
                let dist = ((cx - w / 2.0).powi(2) + (cy - h / 2.0).powi(2)).sqrt();
                let offset = (dist * 0.01 - self.t * 3.0 + norm.bass).sin();
                let scale = 0.15 + (offset + 1.0) / 2.0 * 0.7 * (0.6 + norm.level * 0.4);
                let color = if (x + y) % 2 == 0 { theme.primary } else { theme.secondary };
                let side = size * scale;
                canvas.fill_rect(
                    Rect::new(cx - side / 2.0, cy - side / 2.0, side, side),
                    color.with_alpha(scale),
                );
            }
        }
    }
}

/// Latitude rings of a tumbling globe.
pub struct GlobeWireframe {
    t: f32,
}

impl GlobeWireframe {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Visualizer for GlobeWireframe {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);
        self.t += 0.01 + norm.level * 0.02;

        let (cx, cy) = (w / 2.0, h / 2.0);
        let r = 100.0 + norm.bass * 25.0;
        let (rot_x, rot_y) = (self.t * 0.5, self.t * 0.8);
        let mut ring = Vec::with_capacity(32);
        for i in 0..=8 {
            let lat = (i as f32 / 8.0) * PI - PI / 2.0;
            let ring_r = lat.cos() * r;
            let ring_y = lat.sin() * r;
            ring.clear();
            let mut a = 0.0f32;
            while a <= TAU {
                let (x, z) = (a.cos() * ring_r, a.sin() * ring_r);
                let x2 = x * rot_y.cos() - z * rot_y.sin();
                let z2 = x * rot_y.sin() + z * rot_y.cos();
                let y3 = ring_y * rot_x.cos() - z2 * rot_x.sin();
                ring.push((cx + x2, cy + y3));
                a += 0.2;
            }
            canvas.polyline(&ring, 1.5, theme.primary);
        }

        if norm.beat_pulse > 0.6 {
            canvas.fill_circle((cx, cy), r * 0.8, theme.accent.with_alpha(0.15));
        }
    }
}
