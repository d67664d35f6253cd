//! Canvas that records draw calls instead of rasterizing them.

use std::cell::RefCell;
use std::rc::Rc;

use super::canvas::{BlendMode, Canvas, Point, Rect};
use crate::clock::{Clock, ManualClock};
use crate::theme::Color;

#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub op: &'static str,
    pub at_ms: f64,
}

/// Shared view of everything a [`RecordingCanvas`] was asked to draw.
pub type DrawLog = Rc<RefCell<Vec<DrawCall>>>;

pub struct RecordingCanvas {
    width: u32,
    height: u32,
    clock: ManualClock,
    log: DrawLog,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32, clock: ManualClock) -> (Self, DrawLog) {
        let log = DrawLog::default();
        let canvas = Self {
            width,
            height,
            clock,
            log: Rc::clone(&log),
        };
        (canvas, log)
    }

    fn record(&mut self, op: &'static str) {
        self.log.borrow_mut().push(DrawCall {
            op,
            at_ms: self.clock.now_ms(),
        });
    }
}

impl Canvas for RecordingCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_blend_mode(&mut self, _mode: BlendMode) {
        self.record("set_blend_mode");
    }

    fn set_clip(&mut self, _clip: Option<Rect>) {
        self.record("set_clip");
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {
        self.record("fill_rect");
    }

    fn line(&mut self, _from: Point, _to: Point, _width: f32, _color: Color) {
        self.record("line");
    }

    fn fill_polygon(&mut self, _points: &[Point], _color: Color) {
        self.record("fill_polygon");
    }

    fn fill_circle(&mut self, _center: Point, _radius: f32, _color: Color) {
        self.record("fill_circle");
    }

    fn fill_radial_gradient(&mut self, _center: Point, _radius: f32, _inner: Color, _outer: Color) {
        self.record("fill_radial_gradient");
    }

    fn fill_vertical_gradient(&mut self, _rect: Rect, _stops: &[(f32, Color)]) {
        self.record("fill_vertical_gradient");
    }

    fn blit_mask(&mut self, _x: i32, _y: i32, _mask_width: usize, _mask: &[u8], _color: Color) {
        self.record("blit_mask");
    }
}
