mod cli;
mod config;
mod encode;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::rc::Rc;

use chromaviz::analysis::provider::{load_or_ambient, AnalysisProvider, AnalysisSource};
use chromaviz::analysis::{TrackAnalysis, TrackFeatures};
use chromaviz::clock::{Clock, ManualClock};
use chromaviz::render::overlay::TextOverlay;
use chromaviz::render::text::{load_font_file, load_font_from_url, parse_font};
use chromaviz::render::{FrameOutcome, PixelCanvas, RenderLoop};
use chromaviz::theme::ThemeId;
use chromaviz::timeline::Timeline;
use chromaviz::visualizers::VisualizerKind;
use cli::Cli;
use encode::ffmpeg::{AudioInput, FfmpegEncoder, VideoSettings};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    let config_path = cli.config.clone().or_else(config::find_config);
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            merge_config(&mut cli, cfg);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    if cli.list_visualizers {
        println!("Available visualizers:");
        for kind in VisualizerKind::ALL {
            let marker = if kind == VisualizerKind::default() { " (default)" } else { "" };
            println!("  {}{}", kind.name(), marker);
        }
        return Ok(());
    }

    if cli.list_themes {
        println!("Available themes:");
        for id in ThemeId::ALL {
            println!("  {:<20} {}", id.name(), id.theme().label);
        }
        return Ok(());
    }

    if cli.duration.is_nan() || cli.duration <= 0.0 {
        anyhow::bail!("--duration must be positive");
    }
    if cli.fps == 0 || cli.width == 0 || cli.height == 0 {
        anyhow::bail!("--fps, --width and --height must be non-zero");
    }
    if let Some(ref audio) = cli.audio {
        if !audio.exists() {
            anyhow::bail!("Audio file not found: {}", audio.display());
        }
    }

    log::info!("chromaviz - procedural music visualizer");
    log::info!("Output: {}", cli.output.display());
    log::info!("Visualizer: {} / theme: {}", cli.visualizer, cli.theme);
    log::info!("Resolution: {}x{} @ {}fps, {:.1}s", cli.width, cli.height, cli.fps, cli.duration);

    // 1. Playback timeline
    let mut timeline = match cli.timeline {
        Some(ref path) => Timeline::load(path)?,
        None => Timeline::playing_from(cli.start_ms, cli.track_id.clone()),
    };
    let analysis_track = cli
        .track_id
        .clone()
        .or_else(|| timeline.first_track().map(str::to_string));

    // 2. Analysis; any failure means ambient mode
    let provider = AnalysisProvider::new(cli.token.clone()).context("Failed to build HTTP client")?;
    let analysis: Option<TrackAnalysis> = cli.analysis.as_deref().and_then(|location| {
        let source = AnalysisSource::parse(location);
        log::info!("Loading analysis from {}", source);
        load_or_ambient("Track analysis", provider.fetch_analysis(&source))
    });
    let features: Option<TrackFeatures> = cli.features.as_deref().and_then(|location| {
        let source = AnalysisSource::parse(location);
        log::info!("Loading features from {}", source);
        load_or_ambient("Track features", provider.fetch_features(&source))
    });
    if let Some(ref a) = analysis {
        log::info!("Analysis: {} segments, {} beats", a.segments.len(), a.beats.len());
    }

    // 3. Font
    let font = load_font(cli.font.as_deref(), cli.font_url.as_deref()).map(Rc::new);

    // 4. Engine
    let clock = ManualClock::new(0.0);
    let mut engine = RenderLoop::new(Box::new(clock.clone()), cli.seed, font.clone());
    engine.settings_mut().set_sensitivity(cli.sensitivity);
    engine.settings_mut().set_theme(&cli.theme);
    engine.settings_mut().set_visualizer(&cli.visualizer);
    engine.mount(PixelCanvas::new(cli.width, cli.height));
    engine.start();

    let mut overlay = (cli.title.is_some() || cli.show_time)
        .then(|| TextOverlay::new(font.clone(), cli.width, cli.height));

    // 5. Encoder
    log::info!("Starting FFmpeg encoder...");
    let audio = cli.audio.as_deref().map(|path| AudioInput {
        path,
        offset_secs: cli.start_ms.max(0.0) / 1000.0,
    });
    let mut encoder = FfmpegEncoder::new(
        &cli.output,
        audio,
        &VideoSettings {
            width: cli.width,
            height: cli.height,
            fps: cli.fps,
            codec: &cli.codec,
            pix_fmt: &cli.pix_fmt,
            crf: cli.crf,
            bitrate: cli.bitrate.as_deref(),
        },
    )?;

    // 6. Render loop
    let total_frames = (cli.duration * cli.fps as f64).ceil() as u64;
    let frame_ms = 1000.0 / cli.fps as f64;
    let switch_frames = cli
        .switch_every
        .filter(|secs| *secs > 0.0)
        .map(|secs| ((secs * cli.fps as f64).round() as u64).max(1));

    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    // None until the first frame, so an untracked timeline still gets its analysis
    let mut last_track: Option<Option<String>> = None;
    for frame_idx in 0..total_frames {
        clock.set(frame_idx as f64 * frame_ms);

        for snapshot in timeline.due(clock.now_ms()) {
            engine.push_snapshot(snapshot);
        }
        let current = engine.track_id().map(str::to_string);
        if last_track.as_ref() != Some(&current) {
            if current == analysis_track {
                engine.load_analysis(current.as_deref(), analysis.clone(), features);
            }
            last_track = Some(current);
        }

        if let Some(every) = switch_frames {
            if frame_idx > 0 && frame_idx % every == 0 {
                let next = engine.settings().visualizer().next();
                log::info!("Switching to visualizer: {}", next.name());
                engine.settings_mut().set_visualizer_kind(next);
            }
        }

        if let FrameOutcome::Stopped = engine.tick() {
            anyhow::bail!("Render loop stopped unexpectedly at frame {}", frame_idx);
        }

        let position = engine.position_ms();
        let text_color = engine.settings().theme().theme().text;
        let canvas = engine.canvas_mut().context("Canvas unmounted during render")?;
        if let Some(ref mut overlay) = overlay {
            let time = cli.show_time.then_some(position);
            overlay.draw(canvas, cli.title.as_deref(), time, text_color);
        }

        encoder.write_frame(canvas.pixels())?;
        pb.set_position(frame_idx + 1);
    }

    pb.finish_with_message("Rendering complete");
    engine.unmount();

    // 7. Finish encoding
    log::info!("Finishing encoding...");
    encoder.finish()?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

/// Config values apply only where the CLI is still at its default.
fn merge_config(cli: &mut Cli, cfg: config::Config) {
    if cli.width == config::default_width() { cli.width = cfg.output.width; }
    if cli.height == config::default_height() { cli.height = cfg.output.height; }
    if cli.fps == config::default_fps() { cli.fps = cfg.output.fps; }
    if cli.crf == config::default_crf() { cli.crf = cfg.output.crf; }
    if cli.codec == config::default_codec() { cli.codec = cfg.output.codec; }
    if cli.sensitivity == config::default_sensitivity() { cli.sensitivity = cfg.engine.sensitivity; }
    if cli.theme == config::default_theme() { cli.theme = cfg.engine.theme; }
    if cli.visualizer == config::default_visualizer() { cli.visualizer = cfg.engine.visualizer; }
    if cli.token.is_none() {
        cli.token = cfg.analysis.token;
    }
    if cli.font.is_none() {
        cli.font = cfg.font.path;
    }
    if cli.font_url.is_none() {
        cli.font_url = cfg.font.url;
    }
}

/// Font from a local file, else from a URL. Failures fall back to block glyphs.
fn load_font(path: Option<&std::path::Path>, url: Option<&str>) -> Option<fontdue::Font> {
    let bytes = if let Some(path) = path {
        load_font_file(path)
    } else if let Some(url) = url {
        load_font_from_url(url)
    } else {
        return None;
    };
    match bytes.and_then(|b| parse_font(&b)) {
        Ok(font) => Some(font),
        Err(err) => {
            log::warn!("Failed to load font, using block glyphs: {:#}", err);
            None
        }
    }
}
