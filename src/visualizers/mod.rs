//! Closed catalog of rendering strategies.
//!
//! Each strategy is a struct owning its private state (particles, phase
//! accumulators, smoothing buffers). The registry builds an instance the
//! first time its kind is selected and keeps it until the registry is
//! dropped, so switching away and back resumes where it left off.

mod geometry;
mod particles;
mod spectrum;
mod waves;

use std::collections::HashMap;
use std::rc::Rc;

use fontdue::Font;

use crate::analysis::{NormalizedSignal, RawSignal};
use crate::render::canvas::Canvas;
use crate::theme::Theme;

/// Everything a strategy may read for one frame.
pub struct FrameInput<'a> {
    /// Resolved or synthetic signal, for strategies that want the 12 bands
    pub raw: Option<&'a RawSignal>,
    pub norm: &'a NormalizedSignal,
    pub is_playing: bool,
    /// Engine clock in seconds, for strategies animated by wall time
    pub time_s: f64,
}

impl FrameInput<'_> {
    /// Pitch band `i` of the raw signal, 0.0 when there is none.
    pub fn pitch(&self, i: usize) -> f32 {
        self.raw.map_or(0.0, |raw| raw.pitches[i % raw.pitches.len()])
    }
}

pub trait Visualizer {
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInput, theme: &Theme);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VisualizerKind {
    #[default]
    SpectrumPro,
    NeonCity,
    Liquid,
    HexGrid,
    MatrixRain,
    Oscilloscope,
    StarWarp,
    CyberRun,
    NebulaCloud,
    Circuitry,
    SilkRibbon,
    Scanner,
    WireframeSphere,
    CubeField,
    GlobeWireframe,
    RetroGrid,
    BlackHole,
    Fireworks,
    Ascii,
    SimpleWave,
    Tunnel,
    OscilloscopePro,
}

impl VisualizerKind {
    pub const ALL: [VisualizerKind; 22] = [
        VisualizerKind::SpectrumPro,
        VisualizerKind::NeonCity,
        VisualizerKind::Liquid,
        VisualizerKind::HexGrid,
        VisualizerKind::MatrixRain,
        VisualizerKind::Oscilloscope,
        VisualizerKind::StarWarp,
        VisualizerKind::CyberRun,
        VisualizerKind::NebulaCloud,
        VisualizerKind::Circuitry,
        VisualizerKind::SilkRibbon,
        VisualizerKind::Scanner,
        VisualizerKind::WireframeSphere,
        VisualizerKind::CubeField,
        VisualizerKind::GlobeWireframe,
        VisualizerKind::RetroGrid,
        VisualizerKind::BlackHole,
        VisualizerKind::Fireworks,
        VisualizerKind::Ascii,
        VisualizerKind::SimpleWave,
        VisualizerKind::Tunnel,
        VisualizerKind::OscilloscopePro,
    ];

    pub fn name(self) -> &'static str {
        match self {
            VisualizerKind::SpectrumPro => "spectrum_pro",
            VisualizerKind::NeonCity => "neon_city",
            VisualizerKind::Liquid => "liquid",
            VisualizerKind::HexGrid => "hex_grid",
            VisualizerKind::MatrixRain => "matrix_rain",
            VisualizerKind::Oscilloscope => "oscilloscope",
            VisualizerKind::StarWarp => "star_warp",
            VisualizerKind::CyberRun => "cyber_run",
            VisualizerKind::NebulaCloud => "nebula_cloud",
            VisualizerKind::Circuitry => "circuitry",
            VisualizerKind::SilkRibbon => "silk_ribbon",
            VisualizerKind::Scanner => "scanner",
            VisualizerKind::WireframeSphere => "wireframe_sphere",
            VisualizerKind::CubeField => "cube_field",
            VisualizerKind::GlobeWireframe => "globe_wireframe",
            VisualizerKind::RetroGrid => "retro_grid",
            VisualizerKind::BlackHole => "black_hole",
            VisualizerKind::Fireworks => "fireworks",
            VisualizerKind::Ascii => "ascii",
            VisualizerKind::SimpleWave => "simple_wave",
            VisualizerKind::Tunnel => "tunnel",
            VisualizerKind::OscilloscopePro => "oscilloscope_pro",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Look up a strategy by name, falling back to the default one.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown visualizer '{}', using {}", name, Self::default().name());
            Self::default()
        })
    }

    /// Next entry of the catalog, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn create(self, seed: u64, font: Option<Rc<Font>>) -> Box<dyn Visualizer> {
        match self {
            VisualizerKind::SpectrumPro => Box::new(spectrum::SpectrumPro::new()),
            VisualizerKind::Scanner => Box::new(spectrum::Scanner::new()),
            VisualizerKind::NeonCity => Box::new(geometry::NeonCity::new()),
            VisualizerKind::RetroGrid => Box::new(geometry::RetroGrid::new()),
            VisualizerKind::HexGrid => Box::new(geometry::HexGrid::new()),
            VisualizerKind::CyberRun => Box::new(geometry::CyberRun::new()),
            VisualizerKind::WireframeSphere => Box::new(geometry::WireframeSphere::new()),
            VisualizerKind::CubeField => Box::new(geometry::CubeField::new()),
            VisualizerKind::GlobeWireframe => Box::new(geometry::GlobeWireframe::new()),
            VisualizerKind::Liquid => Box::new(waves::Liquid::new()),
            VisualizerKind::Oscilloscope => Box::new(waves::Oscilloscope::new()),
            VisualizerKind::OscilloscopePro => Box::new(waves::OscilloscopePro),
            VisualizerKind::NebulaCloud => Box::new(waves::NebulaCloud::new()),
            VisualizerKind::SilkRibbon => Box::new(waves::SilkRibbon::new()),
            VisualizerKind::SimpleWave => Box::new(waves::SimpleWave::new()),
            VisualizerKind::Ascii => Box::new(waves::Ascii::new(font)),
            VisualizerKind::MatrixRain => Box::new(particles::MatrixRain::new(seed, font)),
            VisualizerKind::StarWarp => Box::new(particles::StarWarp::new(seed)),
            VisualizerKind::Tunnel => Box::new(particles::Tunnel::new(seed)),
            VisualizerKind::Circuitry => Box::new(particles::Circuitry::new(seed)),
            VisualizerKind::Fireworks => Box::new(particles::Fireworks::new(seed)),
            VisualizerKind::BlackHole => Box::new(particles::BlackHole::new(seed)),
        }
    }
}

/// Lazily built strategy instances, one per kind.
pub struct VisualizerRegistry {
    instances: HashMap<VisualizerKind, Box<dyn Visualizer>>,
    font: Option<Rc<Font>>,
    seed: u64,
}

impl VisualizerRegistry {
    /// `seed` makes randomized strategies reproducible; each kind derives
    /// its own stream from it.
    pub fn new(seed: u64, font: Option<Rc<Font>>) -> Self {
        Self {
            instances: HashMap::new(),
            font,
            seed,
        }
    }

    pub fn get_or_create(&mut self, kind: VisualizerKind) -> &mut dyn Visualizer {
        let seed = self.seed ^ ((kind as u64 + 1) << 32);
        let font = self.font.clone();
        self.instances
            .entry(kind)
            .or_insert_with(|| {
                log::debug!("Initializing visualizer {}", kind.name());
                kind.create(seed, font)
            })
            .as_mut()
    }

    pub fn is_initialized(&self, kind: VisualizerKind) -> bool {
        self.instances.contains_key(&kind)
    }

    /// Drop a strategy's state; the next selection starts fresh.
    pub fn reset(&mut self, kind: VisualizerKind) {
        self.instances.remove(&kind);
    }
}

pub(crate) fn lerp(start: f32, end: f32, amount: f32) -> f32 {
    (1.0 - amount) * start + amount * end
}
