use crate::gfx::Gfx;
use crate::types::Rect;

/// Bounding box of everything drawn. Curves contribute their control points,
/// so the result may be larger than the tight bound.
#[derive(Debug, Clone, Default)]
pub struct ExtentAccumulator {
    extent: Option<Rect>,
}

impl ExtentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extent(&self) -> Option<Rect> {
        self.extent
    }

    pub fn into_extent(self) -> Option<Rect> {
        self.extent
    }

    fn add(&mut self, x: f64, y: f64) {
        Rect::include_point(&mut self.extent, x, y);
    }
}

impl Gfx for ExtentAccumulator {
    fn geometry_only(&self) -> bool {
        true
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.add(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.add(x, y);
    }

    fn curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.add(cx, cy);
        self.add(x, y);
    }

    fn cubic_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.add(c1x, c1y);
        self.add(c2x, c2y);
        self.add(x, y);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, _radius: f64) {
        self.add(x, y);
        self.add(x + width, y + height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_walk_has_no_extent() {
        assert_eq!(ExtentAccumulator::new().extent(), None);
    }

    #[test]
    fn cubic_is_bounded_by_its_control_points() {
        let mut acc = ExtentAccumulator::new();
        acc.move_to(0.0, 0.0);
        acc.cubic_curve_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0);
        assert_eq!(acc.extent(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn rect_and_negative_points_grow_the_box() {
        let mut acc = ExtentAccumulator::new();
        acc.rect(5.0, 5.0, 10.0, 20.0, 2.0);
        acc.line_to(-5.0, 0.0);
        assert_eq!(acc.into_extent(), Some(Rect::new(-5.0, 0.0, 20.0, 25.0)));
    }
}
