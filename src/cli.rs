use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "chromaviz", about = "Audio-synchronized procedural visualizer video renderer")]
pub struct Cli {
    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Visualizer strategy (see --list-visualizers)
    #[arg(short, long, default_value = "spectrum_pro")]
    pub visualizer: String,

    /// Color theme (see --list-themes)
    #[arg(short, long, default_value = "retro_wave")]
    pub theme: String,

    /// Reaction strength, 0.1-5.0
    #[arg(short, long, default_value_t = 1.0)]
    pub sensitivity: f32,

    /// Track analysis JSON (segments and beats), file path or http(s) URL
    #[arg(short, long)]
    pub analysis: Option<String>,

    /// Track features JSON (tempo, energy), file path or http(s) URL
    #[arg(long)]
    pub features: Option<String>,

    /// Bearer token for http(s) analysis sources
    #[arg(long)]
    pub token: Option<String>,

    /// Track the analysis belongs to. Defaults to the timeline's first track.
    #[arg(long)]
    pub track_id: Option<String>,

    /// Playback timeline JSON. Without it playback starts at --start-ms and keeps playing.
    #[arg(long)]
    pub timeline: Option<PathBuf>,

    /// Initial playback position in milliseconds
    #[arg(long, default_value_t = 0.0)]
    pub start_ms: f64,

    /// Seconds of video to render
    #[arg(short, long, default_value_t = 30.0)]
    pub duration: f64,

    /// Audio file muxed under the video, seeked to --start-ms
    #[arg(long)]
    pub audio: Option<PathBuf>,

    /// Cycle to the next visualizer every N seconds
    #[arg(long)]
    pub switch_every: Option<f64>,

    /// Seed for randomized visualizers
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Video width in pixels
    #[arg(long, default_value_t = 1920)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 1080)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Title text overlay
    #[arg(long)]
    pub title: Option<String>,

    /// Show playback position overlay
    #[arg(long)]
    pub show_time: bool,

    /// TTF/OTF font for text and glyph visualizers
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Download the font from this URL instead
    #[arg(long)]
    pub font_url: Option<String>,

    /// Config file (default: chromaviz.toml, then the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List available visualizers and exit
    #[arg(long)]
    pub list_visualizers: bool,

    /// List available themes and exit
    #[arg(long)]
    pub list_themes: bool,
}
