use crate::types::{Point, ScaleRect, Transform};

/// Per-path emission state: the composed transform, the optional nine-slice
/// remap, and the running pen position.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub matrix: Transform,
    pub scale: Option<ScaleRect>,
    // Sink-space start of the current subpath.
    pub first: Point,
    // Sink-space pen position.
    pub last: Point,
    // Pen position before transformation.
    pub local: Point,
}

impl RenderContext {
    pub fn new(matrix: Transform, scale: Option<ScaleRect>) -> Self {
        Self {
            matrix,
            scale,
            first: Point::ORIGIN,
            last: Point::ORIGIN,
            local: Point::ORIGIN,
        }
    }

    fn remap(&self, x: f64, y: f64) -> (f64, f64) {
        match &self.scale {
            Some(scale) => scale.remap(x, y),
            None => (x, y),
        }
    }

    pub fn trans_x(&self, x: f64, y: f64) -> f64 {
        self.trans(x, y).x
    }

    pub fn trans_y(&self, x: f64, y: f64) -> f64 {
        self.trans(x, y).y
    }

    pub fn trans(&self, x: f64, y: f64) -> Point {
        let (x, y) = self.remap(x, y);
        let (x, y) = self.matrix.apply(x, y);
        Point { x, y }
    }

    pub fn set_last(&mut self, x: f64, y: f64) {
        self.local = Point { x, y };
        self.last = self.trans(x, y);
    }

    pub fn start_subpath(&mut self, x: f64, y: f64) {
        self.set_last(x, y);
        self.first = self.last;
    }

    // The rect primitive can only be forwarded when no remap is active and the
    // matrix keeps rectangles upright.
    pub(crate) fn keeps_rects(&self) -> bool {
        self.scale.is_none() && self.matrix.is_axis_aligned() && self.matrix.a > 0.0 && self.matrix.d > 0.0
    }
}
