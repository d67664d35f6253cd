use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use fontdue::{Font, FontSettings, Metrics};

use super::canvas::{Canvas, Rect};
use crate::theme::Color;

/// Advance of a fallback block glyph, relative to the font size.
const BLOCK_ADVANCE: f32 = 0.6;

pub fn parse_font(bytes: &[u8]) -> Result<Font> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|e| anyhow::anyhow!("Failed to parse font: {}", e))
}

pub fn load_font_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read font: {}", path.display()))
}

pub fn load_font_from_url(url: &str) -> Result<Vec<u8>> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Failed to download font: {}", url))?
        .error_for_status()
        .with_context(|| format!("Font download failed: {}", url))?;
    let bytes = response.bytes().context("Failed to read font body")?;
    log::info!("Downloaded font from {} ({} bytes)", url, bytes.len());
    Ok(bytes.to_vec())
}

/// Rasterizes and caches glyphs for one strategy. Without a font, characters
/// are drawn as blocks whose size follows their visual density.
pub struct GlyphAtlas {
    font: Option<Rc<Font>>,
    cache: HashMap<(char, u32), (Metrics, Vec<u8>)>,
}

impl GlyphAtlas {
    pub fn new(font: Option<Rc<Font>>) -> Self {
        Self {
            font,
            cache: HashMap::new(),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn glyph(&mut self, ch: char, size: f32) -> Option<&(Metrics, Vec<u8>)> {
        let font = self.font.as_ref()?;
        if font.lookup_glyph_index(ch) == 0 {
            return None;
        }
        let key = (ch, size.round().max(1.0) as u32);
        Some(
            self.cache
                .entry(key)
                .or_insert_with(|| font.rasterize(ch, key.1 as f32)),
        )
    }

    /// Draw `ch` centered on `center`.
    pub fn draw_char_centered(
        &mut self,
        canvas: &mut dyn Canvas,
        ch: char,
        center: (f32, f32),
        size: f32,
        color: Color,
    ) {
        match self.glyph(ch, size) {
            Some((metrics, bitmap)) => {
                let x = center.0 - metrics.width as f32 / 2.0;
                let y = center.1 - metrics.height as f32 / 2.0;
                canvas.blit_mask(x.round() as i32, y.round() as i32, metrics.width, bitmap, color);
            }
            None => draw_block(canvas, ch, center, size, color),
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw_text(&mut self, canvas: &mut dyn Canvas, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let mut cursor_x = x;
        for ch in text.chars() {
            match self.glyph(ch, size) {
                Some((metrics, bitmap)) => {
                    let glyph_y = y + size - metrics.height as f32 - metrics.ymin as f32;
                    canvas.blit_mask(
                        (cursor_x + metrics.xmin as f32).round() as i32,
                        glyph_y.round() as i32,
                        metrics.width,
                        bitmap,
                        color,
                    );
                    cursor_x += metrics.advance_width;
                }
                None => {
                    let advance = size * BLOCK_ADVANCE;
                    draw_block(canvas, ch, (cursor_x + advance / 2.0, y + size / 2.0), size, color);
                    cursor_x += advance;
                }
            }
        }
    }

    /// Width of rendered text in pixels.
    pub fn measure_width(&mut self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|ch| match self.glyph(ch, size) {
                Some((metrics, _)) => metrics.advance_width,
                None => size * BLOCK_ADVANCE,
            })
            .sum()
    }
}

fn draw_block(canvas: &mut dyn Canvas, ch: char, center: (f32, f32), size: f32, color: Color) {
    let density = block_density(ch);
    if density <= 0.0 {
        return;
    }
    let side = size * BLOCK_ADVANCE * density.sqrt();
    canvas.fill_rect(
        Rect::new(center.0 - side / 2.0, center.1 - side / 2.0, side, side),
        color,
    );
}

/// Rough ink coverage of a character, 0.0-1.0.
fn block_density(ch: char) -> f32 {
    match ch {
        ' ' => 0.0,
        '.' => 0.1,
        ':' => 0.2,
        '-' => 0.25,
        '=' => 0.4,
        '+' => 0.45,
        '*' => 0.55,
        '#' => 0.75,
        '%' => 0.85,
        '@' => 1.0,
        _ => 0.6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::PixelCanvas;

    #[test]
    fn fallback_measures_by_block_advance() {
        let mut atlas = GlyphAtlas::new(None);
        assert!(!atlas.has_font());
        assert_eq!(atlas.measure_width("abcd", 10.0), 24.0);
    }

    #[test]
    fn fallback_blocks_follow_density() {
        assert_eq!(block_density(' '), 0.0);
        assert!(block_density('.') < block_density('#'));
        assert_eq!(block_density('@'), 1.0);

        let mut canvas = PixelCanvas::new(20, 20);
        let mut atlas = GlyphAtlas::new(None);
        atlas.draw_char_centered(&mut canvas, ' ', (10.0, 10.0), 16.0, Color::WHITE);
        assert_eq!(canvas.pixel(10, 10), Some([0, 0, 0, 255]));
        atlas.draw_char_centered(&mut canvas, '@', (10.0, 10.0), 16.0, Color::WHITE);
        assert_eq!(canvas.pixel(10, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn rejects_invalid_font_bytes() {
        assert!(parse_font(b"not a font").is_err());
    }
}
