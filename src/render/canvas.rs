use crate::theme::Color;

pub type Point = (f32, f32);

/// How new paint combines with what is already on the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over alpha compositing
    #[default]
    Normal,
    /// `1 - (1 - src) * (1 - dst)`, brightens overlapping paint
    Screen,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

/// 2D drawing surface the visualizers paint on. Coordinates are in pixels
/// with the origin at the top-left corner.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn set_blend_mode(&mut self, mode: BlendMode);
    /// Restrict painting to `clip`, or lift the restriction with `None`.
    fn set_clip(&mut self, clip: Option<Rect>);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn line(&mut self, from: Point, to: Point, width: f32, color: Color);
    fn fill_polygon(&mut self, points: &[Point], color: Color);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Color);
    /// Disc fading from `inner` at the center to `outer` at `radius`.
    fn fill_radial_gradient(&mut self, center: Point, radius: f32, inner: Color, outer: Color);
    /// Rectangle shaded top to bottom through `stops` (offset 0.0-1.0, color).
    fn fill_vertical_gradient(&mut self, rect: Rect, stops: &[(f32, Color)]);
    /// Paint an 8-bit coverage mask with its top-left corner at `(x, y)`.
    fn blit_mask(&mut self, x: i32, y: i32, mask_width: usize, mask: &[u8], color: Color);

    fn clear(&mut self, color: Color) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        self.fill_rect(Rect::new(0.0, 0.0, w, h), color);
    }

    fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color) {
        let Rect { x, y, w, h } = rect;
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)];
        self.polyline(&corners, width, color);
    }

    fn polyline(&mut self, points: &[Point], width: f32, color: Color) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }
}

/// Byte length of an RGBA8 buffer, computed wide so large frames cannot wrap.
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

/// Software RGBA8 surface.
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    blend: BlendMode,
    clip: Option<(i32, i32, i32, i32)>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; buffer_len(width, height)];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
            blend: BlendMode::Normal,
            clip: None,
        }
    }

    /// Row-major RGBA bytes, ready for the encoder.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    /// Inclusive-exclusive pixel bounds after applying the clip rectangle.
    fn bounds(&self) -> (i32, i32, i32, i32) {
        let (w, h) = (self.width as i32, self.height as i32);
        match self.clip {
            Some((x0, y0, x1, y1)) => (x0.max(0), y0.max(0), x1.min(w), y1.min(h)),
            None => (0, 0, w, h),
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: f32) {
        let (bx0, by0, bx1, by1) = self.bounds();
        if x < bx0 || y < by0 || x >= bx1 || y >= by1 {
            return;
        }
        let a = color.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if a <= 0.0 {
            return;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let src = [color.r, color.g, color.b];
        for c in 0..3 {
            let d = self.pixels[i + c] as f32 / 255.0;
            let s = src[c] as f32 / 255.0;
            let target = match self.blend {
                BlendMode::Normal => s,
                BlendMode::Screen => 1.0 - (1.0 - s) * (1.0 - d),
            };
            self.pixels[i + c] = ((d + (target - d) * a) * 255.0).round() as u8;
        }
        self.pixels[i + 3] = 255;
    }

    fn span(&self, lo: f32, hi: f32, axis_max: i32, axis_min: i32) -> (i32, i32) {
        let a = (lo.floor() as i32).max(axis_min);
        let b = (hi.ceil() as i32).min(axis_max);
        (a, b)
    }
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip.map(|r| {
            (
                r.x.floor() as i32,
                r.y.floor() as i32,
                (r.x + r.w).ceil() as i32,
                (r.y + r.h).ceil() as i32,
            )
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let (bx0, by0, bx1, by1) = self.bounds();
        let (x0, x1) = self.span(rect.x, rect.x + rect.w, bx1, bx0);
        let (y0, y1) = self.span(rect.y, rect.y + rect.h, by1, by0);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color, 1.0);
            }
        }
    }

    fn line(&mut self, from: Point, to: Point, width: f32, color: Color) {
        let half = width.max(1.0) / 2.0;
        let pad = half + 1.0;
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let len2 = dx * dx + dy * dy;
        let len = len2.sqrt();

        let (bx0, by0, bx1, by1) = self.bounds();
        let (y0, y1) = self.span(from.1.min(to.1) - pad, from.1.max(to.1) + pad, by1, by0);
        let (min_x, max_x) = (from.0.min(to.0) - pad, from.0.max(to.0) + pad);

        for py in y0..y1 {
            let cy = py as f32 + 0.5;
            // only visit pixels near the segment on this row
            let (lo, hi) = if dy.abs() < 1e-3 {
                (min_x, max_x)
            } else {
                let t = ((cy - from.1) / dy).clamp(0.0, 1.0);
                let xc = from.0 + t * dx;
                let reach = pad * len / dy.abs() + pad;
                ((xc - reach).max(min_x), (xc + reach).min(max_x))
            };
            let (x0, x1) = self.span(lo, hi, bx1, bx0);
            for px in x0..x1 {
                let cx = px as f32 + 0.5;
                let t = if len2 > 0.0 {
                    (((cx - from.0) * dx + (cy - from.1) * dy) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let (qx, qy) = (from.0 + t * dx - cx, from.1 + t * dy - cy);
                let dist = (qx * qx + qy * qy).sqrt();
                let coverage = half + 0.5 - dist;
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, coverage);
                }
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        if points.len() < 3 {
            return;
        }
        let (bx0, by0, bx1, by1) = self.bounds();
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let (y0, y1) = self.span(min_y, max_y, by1, by0);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for py in y0..y1 {
            let cy = py as f32 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                if (a.1 <= cy && b.1 > cy) || (b.1 <= cy && a.1 > cy) {
                    crossings.push(a.0 + (cy - a.1) / (b.1 - a.1) * (b.0 - a.0));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                let x0 = ((pair[0] - 0.5).ceil() as i32).max(bx0);
                let x1 = ((pair[1] - 0.5).ceil() as i32).min(bx1);
                for px in x0..x1 {
                    self.blend_pixel(px, py, color, 1.0);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Color) {
        if radius <= 0.0 {
            return;
        }
        let (bx0, by0, bx1, by1) = self.bounds();
        let (x0, x1) = self.span(center.0 - radius - 1.0, center.0 + radius + 1.0, bx1, bx0);
        let (y0, y1) = self.span(center.1 - radius - 1.0, center.1 + radius + 1.0, by1, by0);
        for py in y0..y1 {
            for px in x0..x1 {
                let (dx, dy) = (px as f32 + 0.5 - center.0, py as f32 + 0.5 - center.1);
                let coverage = radius + 0.5 - (dx * dx + dy * dy).sqrt();
                if coverage > 0.0 {
                    self.blend_pixel(px, py, color, coverage);
                }
            }
        }
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f32, inner: Color, outer: Color) {
        if radius <= 0.0 {
            return;
        }
        let (bx0, by0, bx1, by1) = self.bounds();
        let (x0, x1) = self.span(center.0 - radius, center.0 + radius, bx1, bx0);
        let (y0, y1) = self.span(center.1 - radius, center.1 + radius, by1, by0);
        for py in y0..y1 {
            for px in x0..x1 {
                let (dx, dy) = (px as f32 + 0.5 - center.0, py as f32 + 0.5 - center.1);
                let t = (dx * dx + dy * dy).sqrt() / radius;
                if t <= 1.0 {
                    self.blend_pixel(px, py, inner.mix(outer, t), 1.0);
                }
            }
        }
    }

    fn fill_vertical_gradient(&mut self, rect: Rect, stops: &[(f32, Color)]) {
        let Some(&(_, first)) = stops.first() else {
            return;
        };
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let (bx0, by0, bx1, by1) = self.bounds();
        let (x0, x1) = self.span(rect.x, rect.x + rect.w, bx1, bx0);
        let (y0, y1) = self.span(rect.y, rect.y + rect.h, by1, by0);
        for py in y0..y1 {
            let t = (py as f32 + 0.5 - rect.y) / rect.h;
            let mut color = first;
            for pair in stops.windows(2) {
                let ((t0, c0), (t1, c1)) = (pair[0], pair[1]);
                if t >= t0 && t <= t1 {
                    let span = (t1 - t0).max(f32::EPSILON);
                    color = c0.mix(c1, (t - t0) / span);
                    break;
                }
                if t > t1 {
                    color = c1;
                }
            }
            for px in x0..x1 {
                self.blend_pixel(px, py, color, 1.0);
            }
        }
    }

    fn blit_mask(&mut self, x: i32, y: i32, mask_width: usize, mask: &[u8], color: Color) {
        if mask_width == 0 {
            return;
        }
        for (row, line) in mask.chunks(mask_width).enumerate() {
            for (col, &coverage) in line.iter().enumerate() {
                if coverage > 0 {
                    self.blend_pixel(x + col as i32, y + row as i32, color, coverage as f32 / 255.0);
                }
            }
        }
    }
}
