pub mod canvas;
pub mod engine;
pub mod overlay;
pub mod text;

#[cfg(test)]
pub mod recording;

pub use canvas::{Canvas, PixelCanvas};
pub use engine::{EngineSettings, FrameOutcome, RenderLoop};
