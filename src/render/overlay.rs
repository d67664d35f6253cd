use std::rc::Rc;

use fontdue::Font;

use super::canvas::Canvas;
use super::text::GlyphAtlas;
use crate::theme::Color;

/// Title (top right) and playback clock (bottom right) drawn over frames.
pub struct TextOverlay {
    atlas: GlyphAtlas,
    font_size: f32,
    margin: f32,
}

impl TextOverlay {
    /// Font size and margin scale with the shorter canvas side.
    pub fn new(font: Option<Rc<Font>>, width: u32, height: u32) -> Self {
        let shorter = width.min(height) as f32;
        Self {
            atlas: GlyphAtlas::new(font),
            font_size: (shorter * 0.046).max(24.0),
            margin: (shorter * 0.07).floor(),
        }
    }

    pub fn draw(&mut self, canvas: &mut dyn Canvas, title: Option<&str>, position_ms: Option<f64>, color: Color) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        if let Some(title) = title {
            let tw = self.atlas.measure_width(title, self.font_size);
            self.atlas
                .draw_text(canvas, title, w - self.margin - tw, self.margin, self.font_size, color);
        }
        if let Some(ms) = position_ms {
            let clock = format_clock(ms / 1000.0);
            let tw = self.atlas.measure_width(&clock, self.font_size);
            let y = h - self.margin - self.font_size;
            self.atlas
                .draw_text(canvas, &clock, w - self.margin - tw, y, self.font_size, color);
        }
    }
}

/// `mm:ss.cc`, or `hh:mm:ss.cc` past the hour.
pub fn format_clock(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let total = seconds as u64;
    let centis = ((seconds - total as f64) * 100.0) as u64;
    if total >= 3600 {
        format!("{:02}:{:02}:{:02}.{:02}", total / 3600, (total % 3600) / 60, total % 60, centis)
    } else {
        format!("{:02}:{:02}.{:02}", total / 60, total % 60, centis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::canvas::PixelCanvas;

    #[test]
    fn formats_clock() {
        assert_eq!(format_clock(0.0), "00:00.00");
        assert_eq!(format_clock(75.5), "01:15.50");
        assert_eq!(format_clock(3725.25), "01:02:05.25");
        assert_eq!(format_clock(-3.0), "00:00.00");
    }

    #[test]
    fn draws_in_the_right_hand_corners() {
        let mut canvas = PixelCanvas::new(400, 300);
        let mut overlay = TextOverlay::new(None, 400, 300);
        overlay.draw(&mut canvas, Some("@@@"), Some(61_000.0), Color::WHITE);

        let lit = |x0: u32, x1: u32, y0: u32, y1: u32| {
            (y0..y1).any(|y| (x0..x1).any(|x| canvas.pixel(x, y).is_some_and(|p| p[..3] != [0, 0, 0])))
        };
        // margin 21, size 24
        assert!(lit(200, 400, 0, 60));
        assert!(lit(200, 400, 240, 300));
        assert!(!lit(0, 150, 0, 300));
    }
}
