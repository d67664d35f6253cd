//! Closed catalog of visualizer color palettes.
//!
//! Themes are pure data. Every strategy reads the active theme each frame, so
//! swapping palettes takes effect on the next tick without touching strategy
//! state.

use std::fmt;

/// RGBA color, 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::hex(0x000000);
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    /// Opaque color from a packed `0xRRGGBB` value.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with its alpha multiplied by `alpha` (0.0-1.0).
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (self.a as f32 * alpha.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Linear blend towards `other` by `t` (0.0 = self, 1.0 = other).
    pub fn mix(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let ch = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: ch(self.r, other.r),
            g: ch(self.g, other.g),
            b: ch(self.b, other.b),
            a: ch(self.a, other.a),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A named palette. Immutable once defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub label: &'static str,
    pub background: Color,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub text: Color,
}

const fn theme(label: &'static str, bg: u32, primary: u32, secondary: u32, accent: u32, text: u32) -> Theme {
    Theme {
        label,
        background: Color::hex(bg),
        primary: Color::hex(primary),
        secondary: Color::hex(secondary),
        accent: Color::hex(accent),
        text: Color::hex(text),
    }
}

const RETRO_WAVE: Theme = theme("Retro Wave", 0x0d0221, 0xff0055, 0x00ffff, 0xffcc00, 0xffffff);
const MATRIX: Theme = theme("The Matrix", 0x000000, 0x00ff00, 0x003300, 0xccffcc, 0x00ff00);
const HOT_FIRE: Theme = theme("Hot Fire", 0x1a0000, 0xff4500, 0xffcc00, 0xffff00, 0xffcc00);
const OCEAN_BREEZE: Theme = theme("Ocean Breeze", 0x001133, 0x00ffff, 0x0077be, 0xffffff, 0xafeeee);
const MIDNIGHT_CITY: Theme = theme("Midnight City", 0x050510, 0xffffff, 0x4444dd, 0x8888ff, 0xffffff);
const COTTON_CANDY: Theme = theme("Cotton Candy", 0x200510, 0xff69b4, 0x87ceeb, 0xffffff, 0xffb6c1);
const TOXIC: Theme = theme("Toxic Waste", 0x100020, 0x39ff14, 0x800080, 0xccff00, 0x39ff14);
const GRAYSCALE: Theme = theme("Noir", 0x000000, 0xffffff, 0x444444, 0x888888, 0xffffff);
const GOLDEN_HOUR: Theme = theme("Golden Hour", 0x221100, 0xffd700, 0xff8c00, 0xffec8b, 0xffd700);
const LASER_TECH: Theme = theme("Laser Tech", 0x000000, 0xff0000, 0x0000ff, 0xffffff, 0xff00ff);
const CYBERPUNK: Theme = theme("Cyberpunk 2077", 0x000000, 0xfcee0a, 0x00f0ff, 0xff003c, 0xfcee0a);
const SOLARIZED: Theme = theme("Solarized", 0x002b36, 0x268bd2, 0x2aa198, 0x859900, 0x93a1a1);
const ICE_CAVE: Theme = theme("Ice Cave", 0xe0f7fa, 0x00bcd4, 0xb2ebf2, 0xffffff, 0x006064);
const LAVA_LAMP: Theme = theme("Lava Lamp", 0x2b0000, 0xff4e00, 0x8b0000, 0xffee00, 0xff4e00);
const EMERALD_FOREST: Theme = theme("Emerald Forest", 0x002000, 0x50c878, 0x013220, 0x98fb98, 0x50c878);
const DEEP_SEA: Theme = theme("Deep Sea", 0x000033, 0x0077be, 0x000080, 0x00ffff, 0xffffff);
const PUMPKIN_SPICE: Theme = theme("Pumpkin Spice", 0x2b1000, 0xd35400, 0x8e44ad, 0xf39c12, 0xf39c12);
const NEON_GENESIS: Theme = theme("Neon Genesis", 0x000000, 0xa020f0, 0x39ff14, 0xffffff, 0x39ff14);
const CLOUD_NINE: Theme = theme("Cloud Nine", 0xf0f8ff, 0x87ceeb, 0xffffff, 0x000080, 0x000080);
const RETRO_FUTURE: Theme = theme("Retro Future", 0x1a1a2e, 0xe94560, 0x0f3460, 0x16213e, 0xe94560);

/// Identifier of a catalog palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ThemeId {
    #[default]
    RetroWave,
    Matrix,
    HotFire,
    OceanBreeze,
    MidnightCity,
    CottonCandy,
    Toxic,
    Grayscale,
    GoldenHour,
    LaserTech,
    Cyberpunk,
    Solarized,
    IceCave,
    LavaLamp,
    EmeraldForest,
    DeepSea,
    PumpkinSpice,
    NeonGenesis,
    CloudNine,
    RetroFuture,
}

impl ThemeId {
    pub const ALL: [ThemeId; 20] = [
        ThemeId::RetroWave,
        ThemeId::Matrix,
        ThemeId::HotFire,
        ThemeId::OceanBreeze,
        ThemeId::MidnightCity,
        ThemeId::CottonCandy,
        ThemeId::Toxic,
        ThemeId::Grayscale,
        ThemeId::GoldenHour,
        ThemeId::LaserTech,
        ThemeId::Cyberpunk,
        ThemeId::Solarized,
        ThemeId::IceCave,
        ThemeId::LavaLamp,
        ThemeId::EmeraldForest,
        ThemeId::DeepSea,
        ThemeId::PumpkinSpice,
        ThemeId::NeonGenesis,
        ThemeId::CloudNine,
        ThemeId::RetroFuture,
    ];

    /// Catalog key, e.g. `"retro_wave"`.
    pub fn name(self) -> &'static str {
        match self {
            ThemeId::RetroWave => "retro_wave",
            ThemeId::Matrix => "matrix",
            ThemeId::HotFire => "hot_fire",
            ThemeId::OceanBreeze => "ocean_breeze",
            ThemeId::MidnightCity => "midnight_city",
            ThemeId::CottonCandy => "cotton_candy",
            ThemeId::Toxic => "toxic",
            ThemeId::Grayscale => "grayscale",
            ThemeId::GoldenHour => "golden_hour",
            ThemeId::LaserTech => "laser_tech",
            ThemeId::Cyberpunk => "cyberpunk",
            ThemeId::Solarized => "solarized",
            ThemeId::IceCave => "ice_cave",
            ThemeId::LavaLamp => "lava_lamp",
            ThemeId::EmeraldForest => "emerald_forest",
            ThemeId::DeepSea => "deep_sea",
            ThemeId::PumpkinSpice => "pumpkin_spice",
            ThemeId::NeonGenesis => "neon_genesis",
            ThemeId::CloudNine => "cloud_nine",
            ThemeId::RetroFuture => "retro_future",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.name() == name)
    }

    /// Look up a theme by name, falling back to the default palette.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            log::warn!("Unknown theme '{}', using {}", name, Self::default().name());
            Self::default()
        })
    }

    pub fn theme(self) -> &'static Theme {
        match self {
            ThemeId::RetroWave => &RETRO_WAVE,
            ThemeId::Matrix => &MATRIX,
            ThemeId::HotFire => &HOT_FIRE,
            ThemeId::OceanBreeze => &OCEAN_BREEZE,
            ThemeId::MidnightCity => &MIDNIGHT_CITY,
            ThemeId::CottonCandy => &COTTON_CANDY,
            ThemeId::Toxic => &TOXIC,
            ThemeId::Grayscale => &GRAYSCALE,
            ThemeId::GoldenHour => &GOLDEN_HOUR,
            ThemeId::LaserTech => &LASER_TECH,
            ThemeId::Cyberpunk => &CYBERPUNK,
            ThemeId::Solarized => &SOLARIZED,
            ThemeId::IceCave => &ICE_CAVE,
            ThemeId::LavaLamp => &LAVA_LAMP,
            ThemeId::EmeraldForest => &EMERALD_FOREST,
            ThemeId::DeepSea => &DEEP_SEA,
            ThemeId::PumpkinSpice => &PUMPKIN_SPICE,
            ThemeId::NeonGenesis => &NEON_GENESIS,
            ThemeId::CloudNine => &CLOUD_NINE,
            ThemeId::RetroFuture => &RETRO_FUTURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_catalog() {
        for id in ThemeId::ALL {
            assert_eq!(ThemeId::from_name(id.name()), Some(id));
        }
    }

    #[test]
    fn unknown_name_falls_back_to_retro_wave() {
        assert_eq!(ThemeId::resolve("no_such_theme"), ThemeId::RetroWave);
        assert_eq!(ThemeId::resolve("toxic"), ThemeId::Toxic);
    }

    #[test]
    fn hex_unpacks_channels() {
        let c = Color::hex(0xff0055);
        assert_eq!((c.r, c.g, c.b, c.a), (0xff, 0x00, 0x55, 255));
        assert_eq!(c.to_string(), "#ff0055");
    }

    #[test]
    fn with_alpha_scales_existing_alpha() {
        let c = Color::rgba(10, 20, 30, 200).with_alpha(0.5);
        assert_eq!(c.a, 100);
        assert_eq!(Color::WHITE.with_alpha(2.0).a, 255);
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = ThemeId::ALL.iter().map(|id| id.theme().label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), ThemeId::ALL.len());
    }
}
