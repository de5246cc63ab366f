use std::collections::HashMap;

use crate::segment::PathSegment;
use crate::types::{Color, Rect, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapsStyle {
    #[default]
    None,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JointStyle {
    #[default]
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMethod {
    #[default]
    Pad,
    Reflect,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Rgb,
    LinearRgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub color: Color,
    pub alpha: f64,
    // offset * 255, in document order.
    pub ratio: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    pub matrix: Transform,
    pub spread: SpreadMethod,
    pub interp: Interpolation,
    pub radius: f64,
    // Linear: start and end of the gradient vector.
    // Radial: center and focal point.
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// A gradient placed in sink space, ready to hand to a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientFill {
    pub kind: GradientKind,
    pub colors: Vec<Color>,
    pub alphas: Vec<f64>,
    pub ratios: Vec<u8>,
    // Maps the unit gradient box (unit vector for linear, unit circle for
    // radial) into sink space.
    pub matrix: Transform,
    pub spread: SpreadMethod,
    pub interp: Interpolation,
    pub focus: f64,
}

impl Gradient {
    pub fn new(kind: GradientKind) -> Self {
        Self {
            kind,
            stops: Vec::new(),
            matrix: Transform::identity(),
            spread: SpreadMethod::Pad,
            interp: Interpolation::Rgb,
            radius: 0.0,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
        }
    }

    pub fn colors(&self) -> Vec<Color> {
        self.stops.iter().map(|stop| stop.color).collect()
    }

    pub fn alphas(&self) -> Vec<f64> {
        self.stops.iter().map(|stop| stop.alpha).collect()
    }

    pub fn ratios(&self) -> Vec<u8> {
        self.stops.iter().map(|stop| stop.ratio).collect()
    }

    pub fn resolve(&self, ctm: &Transform) -> GradientFill {
        let dx = self.x2 - self.x1;
        let dy = self.y2 - self.y1;
        let theta = libm::atan2(dy, dx);
        let len = libm::sqrt(dx * dx + dy * dy);
        let (size, focus) = match self.kind {
            GradientKind::Linear => (len, 0.0),
            GradientKind::Radial => {
                let focus = if self.radius != 0.0 { len / self.radius } else { 0.0 };
                (self.radius, focus)
            }
        };
        let local = Transform::translate(self.x1, self.y1)
            .append(Transform::rotate(theta))
            .append(Transform::scale(size, size));
        GradientFill {
            kind: self.kind,
            colors: self.colors(),
            alphas: self.alphas(),
            ratios: self.ratios(),
            matrix: ctm.append(self.matrix).append(local),
            spread: self.spread,
            interp: self.interp,
            focus,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FillSpec {
    None,
    Solid(Color),
    Gradient(String),
}

impl FillSpec {
    pub fn black() -> Self {
        FillSpec::Solid(Color::BLACK)
    }
}

impl Default for FillSpec {
    fn default() -> Self {
        Self::black()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub matrix: Transform,
    pub name: String,
    pub segments: Vec<PathSegment>,
    pub fill: FillSpec,
    pub alpha: f64,
    pub fill_alpha: f64,
    pub stroke_alpha: f64,
    pub stroke_color: Option<Color>,
    pub stroke_width: f64,
    pub stroke_caps: CapsStyle,
    pub joint_style: JointStyle,
    pub miter_limit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub matrix: Transform,
    pub text: String,
    pub fill: FillSpec,
    // Cascaded `opacity`; multiplies `fill_alpha` at render time.
    pub alpha: f64,
    pub fill_alpha: f64,
    pub stroke_alpha: f64,
    pub stroke_color: Option<Color>,
    pub stroke_width: f64,
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub kerning: f64,
    pub text_align: TextAlign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Path(Path),
    Group(Group),
    Text(Text),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub name: String,
    pub children: Vec<Element>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    // Hidden groups carry a leading dot and are skipped by unfiltered walks.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Depth-first search for a descendant group, excluding `self`.
    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.children.iter().find_map(|child| match child {
            Element::Group(group) if group.name == name => Some(group),
            Element::Group(group) => group.find_group(name),
            _ => None,
        })
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.find_group(name).is_some()
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.children.iter().filter_map(|child| match child {
            Element::Group(group) => Some(group),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    UnknownPathCommand,
    UnexpectedPathByte,
    TruncatedPathArguments,
    UnknownTransform,
    GradientStroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub detail: String,
}

/// Parsed document: the root group plus its size and gradient table.
/// Paths refer to gradients by id.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgData {
    pub width: f64,
    pub height: f64,
    pub view_box: Rect,
    pub root: Group,
    pub gradients: HashMap<String, Gradient>,
    pub warnings: Vec<ParseWarning>,
}

impl SvgData {
    pub fn gradient(&self, id: &str) -> Option<&Gradient> {
        self.gradients.get(id)
    }

    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.root.find_group(name)
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.root.has_group(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(x1: f64, y1: f64, x2: f64, y2: f64) -> Gradient {
        let mut g = Gradient::new(GradientKind::Linear);
        g.x1 = x1;
        g.y1 = y1;
        g.x2 = x2;
        g.y2 = y2;
        g
    }

    #[test]
    fn linear_fill_maps_unit_vector_onto_gradient_vector() {
        let fill = linear(10.0, 10.0, 10.0, 30.0).resolve(&Transform::scale(2.0, 2.0));
        let (x0, y0) = fill.matrix.apply(0.0, 0.0);
        let (x1, y1) = fill.matrix.apply(1.0, 0.0);
        assert!((x0 - 20.0).abs() < 1e-9 && (y0 - 20.0).abs() < 1e-9);
        assert!((x1 - 20.0).abs() < 1e-9 && (y1 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn radial_fill_reports_focus_ratio() {
        let mut g = Gradient::new(GradientKind::Radial);
        g.x1 = 0.0;
        g.y1 = 0.0;
        g.x2 = 5.0;
        g.y2 = 0.0;
        g.radius = 10.0;
        let fill = g.resolve(&Transform::identity());
        assert_eq!(fill.focus, 0.5);
        assert_eq!(fill.matrix.apply(1.0, 0.0), (10.0, 0.0));
    }

    #[test]
    fn find_group_searches_depth_first() {
        let mut inner = Group::new("inner");
        inner.children.push(Element::Group(Group::new(".hidden")));
        let mut root = Group::new("root");
        root.children.push(Element::Group(Group::new("a")));
        root.children.push(Element::Group(inner));
        assert!(root.has_group(".hidden"));
        assert!(root.find_group(".hidden").is_some_and(Group::is_hidden));
        assert!(!root.has_group("root"));
    }

    #[test]
    fn default_fill_is_solid_black() {
        assert_eq!(FillSpec::default(), FillSpec::Solid(Color::BLACK));
    }
}
