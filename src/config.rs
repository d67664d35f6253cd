use serde::Deserialize;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "chromaviz.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub font: FontConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

#[derive(Debug, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_visualizer")]
    pub visualizer: String,
}

/// Credentials for HTTP analysis sources.
#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FontConfig {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            theme: default_theme(),
            visualizer: default_visualizer(),
        }
    }
}

pub fn default_width() -> u32 { 1920 }
pub fn default_height() -> u32 { 1080 }
pub fn default_fps() -> u32 { 30 }
pub fn default_crf() -> u32 { 18 }
pub fn default_codec() -> String { "libx264".into() }
pub fn default_sensitivity() -> f32 { 1.0 }
pub fn default_theme() -> String { "retro_wave".into() }
pub fn default_visualizer() -> String { "spectrum_pro".into() }

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match parse_config(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// `chromaviz.toml` in the working directory, then
/// `~/.config/chromaviz/config.toml`, then the platform config directory.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("chromaviz").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("chromaviz").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
