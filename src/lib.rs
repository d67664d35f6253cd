//! Audio-synchronized procedural visualization engine.
//!
//! Playback snapshots and optional per-track analysis go in; frames painted
//! by one of the catalog strategies come out on a mounted [`render::Canvas`].

pub mod analysis;
pub mod clock;
pub mod playback;
pub mod render;
pub mod theme;
pub mod timeline;
pub mod visualizers;
