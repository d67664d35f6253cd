use anyhow::{Context, Result};
use std::ffi::OsString;
use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Soundtrack muxed under the rendered frames.
pub struct AudioInput<'a> {
    pub path: &'a Path,
    /// Seek into the audio before muxing, so it lines up with the rendered position
    pub offset_secs: f64,
}

pub struct VideoSettings<'a> {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub codec: &'a str,
    pub pix_fmt: &'a str,
    pub crf: u32,
    pub bitrate: Option<&'a str>,
}

pub struct FfmpegEncoder {
    child: Child,
}

impl FfmpegEncoder {
    pub fn new(output_path: &Path, audio: Option<AudioInput>, video: &VideoSettings) -> Result<Self> {
        let args = build_args(output_path, audio.as_ref(), video);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn ffmpeg. Is ffmpeg installed?")?;

        log::info!(
            "FFmpeg encoder started: {}x{} @ {}fps, codec={}",
            video.width,
            video.height,
            video.fps,
            video.codec
        );

        Ok(Self { child })
    }

    pub fn write_frame(&mut self, rgba_pixels: &[u8]) -> Result<()> {
        let stdin = self.child.stdin.as_mut().context("FFmpeg stdin not available")?;
        stdin.write_all(rgba_pixels).context("Failed to write frame to ffmpeg")?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        // EOF on stdin ends the stream
        drop(self.child.stdin.take());

        let output = self.child.wait_with_output().context("Failed to wait for ffmpeg")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("FFmpeg exited with error:\n{}", stderr);
        }

        log::info!("FFmpeg encoding complete");
        Ok(())
    }
}

fn build_args(output_path: &Path, audio: Option<&AudioInput>, video: &VideoSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-loglevel".into(), "error".into(),
        "-f".into(), "rawvideo".into(),
        "-pixel_format".into(), "rgba".into(),
        "-video_size".into(), format!("{}x{}", video.width, video.height).into(),
        "-framerate".into(), video.fps.to_string().into(),
        "-i".into(), "pipe:0".into(),
    ];

    if let Some(audio) = audio {
        if audio.offset_secs > 0.0 {
            args.push("-ss".into());
            args.push(format!("{:.3}", audio.offset_secs).into());
        }
        args.push("-i".into());
        args.push(audio.path.into());
    }

    args.extend(["-c:v", video.codec, "-pix_fmt", video.pix_fmt].map(OsString::from));

    if let Some(br) = video.bitrate {
        args.extend(["-b:v", br].map(OsString::from));
    } else {
        let crf = video.crf.to_string();
        args.extend(["-crf", crf.as_str(), "-preset", "medium"].map(OsString::from));
    }

    if audio.is_some() {
        args.extend(["-c:a", "aac", "-b:a", "192k", "-shortest"].map(OsString::from));
    }

    args.push(output_path.into());
    args
}
