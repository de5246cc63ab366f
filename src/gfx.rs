use crate::scene::{CapsStyle, GradientFill, JointStyle, Text};
use crate::types::{Color, Transform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub thickness: f64,
    pub color: Color,
    pub alpha: f64,
    pub caps: CapsStyle,
    pub joint: JointStyle,
    pub miter_limit: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            color: Color::BLACK,
            alpha: 1.0,
            caps: CapsStyle::None,
            joint: JointStyle::Miter,
            miter_limit: 3.0,
        }
    }
}

/// Drawing sink driven by a scene walk. Every call has a no-op default, so
/// an implementation only overrides what it consumes. Coordinates are in
/// sink space (already transformed).
pub trait Gfx {
    /// Skip fill and stroke state entirely; only geometry calls arrive.
    fn geometry_only(&self) -> bool {
        false
    }

    /// When false, cubic segments are flattened to quadratics before emission.
    fn supports_cubics(&self) -> bool {
        true
    }

    fn size(&mut self, _width: f64, _height: f64) {}

    fn begin_gradient_fill(&mut self, _fill: &GradientFill) {}

    fn begin_fill(&mut self, _color: Color, _alpha: f64) {}

    fn end_fill(&mut self) {}

    fn line_style(&mut self, _style: &LineStyle) {}

    fn end_line_style(&mut self) {}

    fn move_to(&mut self, _x: f64, _y: f64) {}

    fn line_to(&mut self, _x: f64, _y: f64) {}

    fn curve_to(&mut self, _cx: f64, _cy: f64, _x: f64, _y: f64) {}

    fn cubic_curve_to(&mut self, _c1x: f64, _c1y: f64, _c2x: f64, _c2y: f64, _x: f64, _y: f64) {}

    fn rect(&mut self, _x: f64, _y: f64, _width: f64, _height: f64, _radius: f64) {}

    fn render_text(&mut self, _text: &Text, _matrix: &Transform) {}

    fn eof(&mut self) {}
}
