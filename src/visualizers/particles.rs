use std::f32::consts::TAU;
use std::rc::Rc;

use fontdue::Font;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{FrameInput, Visualizer};
use crate::render::canvas::{BlendMode, Canvas, Rect};
use crate::render::text::GlyphAtlas;
use crate::theme::Theme;

const MATRIX_COLUMN_WIDTH: f32 = 20.0;
const MATRIX_FONT_SIZE: f32 = 16.0;
const STAR_COUNT: usize = 200;
const TUNNEL_COUNT: usize = 300;
const ORB_COUNT: usize = 400;
const CIRCUIT_MIN_TRACES: usize = 40;
const FIREWORK_SPARKS: usize = 30;
const FIREWORK_MAX_SPARKS: usize = 3000;

/// Falling katakana columns.
pub struct MatrixRain {
    rng: StdRng,
    atlas: GlyphAtlas,
    drops: Vec<f32>,
}

impl MatrixRain {
    pub fn new(seed: u64, font: Option<Rc<Font>>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            atlas: GlyphAtlas::new(font),
            drops: Vec::new(),
        }
    }
}

impl Visualizer for MatrixRain {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);

        let cols = (w / MATRIX_COLUMN_WIDTH).floor() as usize;
        if self.drops.len() != cols {
            self.drops = vec![0.0; cols];
        }

        for i in 0..cols {
            let drop = &mut self.drops[i];
            *drop += 1.5 + self.rng.gen::<f32>() * 3.0 + norm.high * 6.0;
            if *drop > h {
                *drop = self.rng.gen::<f32>() * -100.0;
            }
            let y = *drop;
            let ch = char::from_u32(0x30A0 + self.rng.gen_range(0..96)).unwrap_or('#');

            let color = if norm.beat_pulse > 0.8 {
                theme.accent
            } else {
                let depth = (i as f64 * 0.2 + frame.time_s).sin() as f32;
                theme.primary.with_alpha(0.3 + (depth + 1.0) / 2.0 * 0.6)
            };
            let x = i as f32 * MATRIX_COLUMN_WIDTH + MATRIX_COLUMN_WIDTH / 2.0;
            self.atlas.draw_char_centered(canvas, ch, (x, y), MATRIX_FONT_SIZE, color);
        }
    }
}

struct Star {
    x: f32,
    y: f32,
    z: f32,
}

/// Starfield flying towards the viewer; streaks appear at high speed.
pub struct StarWarp {
    rng: StdRng,
    stars: Vec<Star>,
}

impl StarWarp {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            stars: Vec::new(),
        }
    }

    fn spawn(rng: &mut StdRng, w: f32, h: f32) -> Star {
        Star {
            x: (rng.gen::<f32>() - 0.5) * w * 2.0,
            y: (rng.gen::<f32>() - 0.5) * h * 2.0,
            z: rng.gen_range(1.0..1000.0),
        }
    }
}

impl Visualizer for StarWarp {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);

        let (cx, cy) = (w / 2.0, h / 2.0);
        let speed = if frame.is_playing { 2.0 } else { 0.0 } + norm.level * 30.0;
        while self.stars.len() < STAR_COUNT {
            self.stars.push(Self::spawn(&mut self.rng, w, h));
        }

        for star in &mut self.stars {
            star.z -= speed;
            if star.z <= 1.0 {
                *star = Self::spawn(&mut self.rng, w, h);
                star.z = 1000.0;
            }
            let k = 128.0 / star.z;
            let (px, py) = (cx + star.x * k, cy + star.y * k);
            if px < 0.0 || px > w || py < 0.0 || py > h {
                continue;
            }
            let near = 1.0 - star.z / 1000.0;
            canvas.fill_rect(Rect::new(px, py, near * 4.0, near * 4.0), theme.accent.with_alpha(near));
            if speed > 10.0 {
                let tail = (cx + (px - cx) * 0.9, cy + (py - cy) * 0.9);
                canvas.line((px, py), tail, 1.0, theme.primary.with_alpha(near));
            }
        }
    }
}

struct Streak {
    x: f32,
    y: f32,
    z: f32,
    pz: f32,
}

/// Hyperspace streaks drawn from each particle's previous depth to its current one.
pub struct Tunnel {
    rng: StdRng,
    streaks: Vec<Streak>,
}

impl Tunnel {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            streaks: Vec::new(),
        }
    }

    fn spawn(rng: &mut StdRng, w: f32, h: f32, z: f32) -> Streak {
        Streak {
            x: (rng.gen::<f32>() - 0.5) * w * 3.0,
            y: (rng.gen::<f32>() - 0.5) * h * 3.0,
            z,
            pz: z,
        }
    }
}

impl Visualizer for Tunnel {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);

        let (cx, cy) = (w / 2.0, h / 2.0);
        while self.streaks.len() < TUNNEL_COUNT {
            let z = self.rng.gen_range(1.0..2000.0);
            self.streaks.push(Self::spawn(&mut self.rng, w, h, z));
        }

        let speed = if frame.is_playing { 15.0 } else { 0.0 } + norm.level * 120.0;
        let color = if norm.beat_pulse > 0.6 { theme.accent } else { theme.primary };
        for streak in &mut self.streaks {
            streak.pz = streak.z;
            streak.z -= speed;
            if streak.z <= 1.0 {
                *streak = Self::spawn(&mut self.rng, w, h, 2000.0);
            }
            let head = (cx + streak.x / streak.z * 400.0, cy + streak.y / streak.z * 400.0);
            let tail = (cx + streak.x / streak.pz * 400.0, cy + streak.y / streak.pz * 400.0);
            if head.0 < 0.0 || head.0 > w || head.1 < 0.0 || head.1 > h {
                continue;
            }
            let dist = ((head.0 - cx).powi(2) + (head.1 - cy).powi(2)).sqrt();
            canvas.line(tail, head, 2.0, color.with_alpha((dist / 150.0).min(1.0)));
        }
    }
}

struct Trace {
    x: f32,
    y: f32,
    /// 0 up, 1 right, 2 down, 3 left
    dir: u8,
    life: u32,
    /// Accent instead of primary; resolved against the theme at draw time
    accent: bool,
}

/// Wandering right-angle traces over a fading board.
pub struct Circuitry {
    rng: StdRng,
    traces: Vec<Trace>,
}

impl Circuitry {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            traces: Vec::new(),
        }
    }
}

impl Visualizer for Circuitry {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.fill_rect(Rect::new(0.0, 0.0, w, h), theme.background.with_alpha(0.15));

        if self.traces.len() < CIRCUIT_MIN_TRACES || (frame.is_playing && self.rng.gen_bool(0.05)) {
            self.traces.push(Trace {
                x: self.rng.gen::<f32>() * w,
                y: self.rng.gen::<f32>() * h,
                dir: self.rng.gen_range(0..4),
                life: 100,
                accent: self.rng.gen_bool(0.5),
            });
        }

        let speed = 3.0 + norm.high * 8.0;
        let rng = &mut self.rng;
        self.traces.retain_mut(|trace| {
            let from = (trace.x, trace.y);
            match trace.dir {
                0 => trace.y -= speed,
                1 => trace.x += speed,
                2 => trace.y += speed,
                _ => trace.x -= speed,
            }
            let color = if trace.accent { theme.accent } else { theme.primary };
            canvas.line(from, (trace.x, trace.y), 2.0, color);

            if rng.gen_bool(0.1) {
                trace.dir = (trace.dir + if rng.gen_bool(0.5) { 1 } else { 3 }) % 4;
            }
            trace.life -= 1;
            trace.life > 0 && (0.0..=w).contains(&trace.x) && (0.0..=h).contains(&trace.y)
        });
    }
}

struct Spark {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    life: f32,
    decay: f32,
    accent: bool,
}

/// Bursts launched on beats, falling under gravity with drag.
pub struct Fireworks {
    rng: StdRng,
    sparks: Vec<Spark>,
}

impl Fireworks {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            sparks: Vec::new(),
        }
    }

    fn launch(&mut self, w: f32, h: f32, level: f32) {
        let cx = self.rng.gen::<f32>() * w;
        let cy = self.rng.gen::<f32>() * h * 0.5;
        let accent = self.rng.gen_bool(0.5);
        for _ in 0..FIREWORK_SPARKS {
            let angle = self.rng.gen::<f32>() * TAU;
            let vel = 1.0 + self.rng.gen::<f32>() * 5.0 * level;
            self.sparks.push(Spark {
                x: cx,
                y: cy,
                vx: angle.cos() * vel,
                vy: angle.sin() * vel,
                life: 1.0,
                decay: 0.01 + self.rng.gen::<f32>() * 0.02,
                accent,
            });
        }
    }
}

impl Visualizer for Fireworks {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.fill_rect(Rect::new(0.0, 0.0, w, h), theme.background.with_alpha(0.2));

        let peak = norm.level > 0.8 && self.rng.gen_bool(0.1);
        if frame.is_playing && (norm.beat_pulse > 0.5 || peak) && self.sparks.len() < FIREWORK_MAX_SPARKS {
            self.launch(w, h, norm.level);
        }

        self.sparks.retain_mut(|spark| {
            spark.x += spark.vx;
            spark.y += spark.vy;
            spark.vy += 0.05;
            spark.vx *= 0.97;
            spark.vy *= 0.97;
            spark.life -= spark.decay;
            if spark.life <= 0.0 {
                return false;
            }
            let color = if spark.accent { theme.accent } else { theme.primary };
            canvas.fill_rect(Rect::new(spark.x, spark.y, 2.0, 2.0), color.with_alpha(spark.life));
            true
        });
    }
}

struct Orbiter {
    theta: f32,
    phi: f32,
    secondary: bool,
}

/// Particle shell orbiting a glowing core.
pub struct BlackHole {
    rng: StdRng,
    orbiters: Vec<Orbiter>,
}

impl BlackHole {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            orbiters: Vec::new(),
        }
    }
}

impl Visualizer for BlackHole {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let norm = frame.norm;
        canvas.clear(theme.background);

        let (cx, cy) = (w / 2.0, h / 2.0);
        if self.orbiters.is_empty() {
            for _ in 0..ORB_COUNT {
                self.orbiters.push(Orbiter {
                    theta: self.rng.gen::<f32>() * TAU,
                    phi: self.rng.gen_range(-1.0f32..1.0).acos(),
                    secondary: self.rng.gen_bool(0.5),
                });
            }
        }

        canvas.set_blend_mode(BlendMode::Screen);
        let base_radius = 100.0 + norm.bass * 35.0;
        for orb in &mut self.orbiters {
            orb.theta += 0.005 + norm.level * 0.01;
            orb.phi += 0.003;
            let r = base_radius + (orb.theta * 4.0).sin() * (norm.mid * 40.0) + norm.beat_pulse * 15.0;
            let x3 = r * orb.phi.sin() * orb.theta.cos();
            let y3 = r * orb.phi.sin() * orb.theta.sin();
            let z3 = r * orb.phi.cos();
            let scale = 250.0 / (250.0 + z3);
            let color = if orb.secondary { theme.secondary } else { theme.primary };
            canvas.fill_circle(
                (cx + x3 * scale, cy + y3 * scale),
                (2.0 + norm.high * 4.0) * scale,
                color.with_alpha((scale - 0.4).max(0.1)),
            );
        }
        canvas.set_blend_mode(BlendMode::Normal);

        canvas.fill_radial_gradient((cx, cy), base_radius * 0.6, theme.accent, theme.accent.with_alpha(0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::NormalizedSignal;
    use crate::render::canvas::PixelCanvas;
    use crate::theme::ThemeId;

    fn frame(norm: &NormalizedSignal, is_playing: bool) -> FrameInput<'_> {
        FrameInput {
            raw: None,
            norm,
            is_playing,
            time_s: 0.0,
        }
    }

    #[test]
    fn fireworks_launch_only_while_playing() {
        let theme = ThemeId::RetroWave.theme();
        let beat = NormalizedSignal {
            level: 0.5,
            beat_pulse: 1.0,
            ..NormalizedSignal::default()
        };
        let mut canvas = PixelCanvas::new(64, 64);

        let mut paused = Fireworks::new(3);
        paused.render(&mut canvas, &frame(&beat, false), theme);
        assert!(paused.sparks.is_empty());

        let mut playing = Fireworks::new(3);
        playing.render(&mut canvas, &frame(&beat, true), theme);
        assert_eq!(playing.sparks.len(), FIREWORK_SPARKS);
    }

    #[test]
    fn fireworks_spark_count_is_capped() {
        let theme = ThemeId::RetroWave.theme();
        let beat = NormalizedSignal {
            level: 0.0,
            beat_pulse: 1.0,
            ..NormalizedSignal::default()
        };
        let mut canvas = PixelCanvas::new(32, 32);
        let mut fireworks = Fireworks::new(5);
        for _ in 0..400 {
            fireworks.render(&mut canvas, &frame(&beat, true), theme);
        }
        assert!(fireworks.sparks.len() < FIREWORK_MAX_SPARKS + FIREWORK_SPARKS);
    }

    #[test]
    fn tunnel_holds_still_when_paused_and_silent() {
        let theme = ThemeId::RetroWave.theme();
        let rest = NormalizedSignal::rest();
        let mut canvas = PixelCanvas::new(64, 64);
        let mut tunnel = Tunnel::new(11);
        tunnel.render(&mut canvas, &frame(&rest, false), theme);
        let depths: Vec<f32> = tunnel.streaks.iter().map(|s| s.z).collect();
        tunnel.render(&mut canvas, &frame(&rest, false), theme);
        assert_eq!(tunnel.streaks.len(), TUNNEL_COUNT);
        assert!(tunnel.streaks.iter().zip(&depths).all(|(s, &z)| s.z == z && s.pz == z));
    }

    #[test]
    fn star_warp_recycles_passed_stars() {
        let theme = ThemeId::RetroWave.theme();
        let loud = NormalizedSignal {
            level: 1.2,
            ..NormalizedSignal::default()
        };
        let mut canvas = PixelCanvas::new(64, 64);
        let mut warp = StarWarp::new(2);
        for _ in 0..100 {
            warp.render(&mut canvas, &frame(&loud, true), theme);
        }
        assert_eq!(warp.stars.len(), STAR_COUNT);
        assert!(warp.stars.iter().all(|s| s.z > 1.0 && s.z <= 1000.0));
    }

    #[test]
    fn circuitry_keeps_a_minimum_of_traces_alive() {
        let theme = ThemeId::RetroWave.theme();
        let rest = NormalizedSignal::rest();
        let mut canvas = PixelCanvas::new(200, 200);
        let mut circuitry = Circuitry::new(4);
        for _ in 0..300 {
            circuitry.render(&mut canvas, &frame(&rest, false), theme);
        }
        assert!(!circuitry.traces.is_empty());
        assert!(circuitry.traces.len() <= CIRCUIT_MIN_TRACES);
        assert!(circuitry.traces.iter().all(|t| t.life > 0));
    }
}
