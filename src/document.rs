use std::collections::HashMap;

use crate::debug::{DebugLogger, json_escape};
use crate::error::SvgError;
use crate::path_data::{ParsedPath, PathParser};
use crate::scene::{
    Element, Gradient, GradientKind, GradientStop, Group, Interpolation, ParseWarning, Path,
    SpreadMethod, SvgData, Text,
};
use crate::segment::PathSegment;
use crate::style::{
    ResolvedStyle, is_display_none, parse_color, parse_number, parse_number_list,
    parse_style_declarations, parse_transform,
};
use crate::types::{Color, Rect, Transform};

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

const DEFAULT_SIZE: f64 = 400.0;

const SIN45: f64 = std::f64::consts::FRAC_1_SQRT_2;
const TAN22: f64 = 0.414_213_562_373_095_05;

/// Parse SVG text into a scene. Malformed colors and gradient references
/// abort the parse; unknown path commands and transforms are recorded as
/// warnings on the result.
pub fn load_document(
    text: &str,
    parser: PathParser,
    debug: Option<&DebugLogger>,
) -> Result<SvgData, SvgError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)?;
    let svg = doc.root_element();
    if svg.tag_name().name() != "svg" {
        return Err(SvgError::NotSvg(svg.tag_name().name().to_string()));
    }

    let mut width = svg.attribute("width").and_then(parse_number).unwrap_or(0.0);
    let mut height = svg.attribute("height").and_then(parse_number).unwrap_or(0.0);
    if width == 0.0 {
        width = height;
    } else if height == 0.0 {
        height = width;
    }
    let view_box = match svg.attribute("viewBox").and_then(parse_view_box) {
        Some(vb) => {
            if width == 0.0 && height == 0.0 {
                width = vb.width;
                height = vb.height;
            }
            vb
        }
        None => {
            if width == 0.0 && height == 0.0 {
                width = DEFAULT_SIZE;
                height = DEFAULT_SIZE;
            }
            Rect::new(0.0, 0.0, width, height)
        }
    };

    let mut loader = DocumentLoader {
        parser,
        debug,
        gradients: HashMap::new(),
        warnings: Vec::new(),
    };
    loader.load_gradients(svg)?;

    let root_matrix = Transform::translate(-view_box.x, -view_box.y);
    let root = loader.load_group(svg, root_matrix, &ResolvedStyle::default())?;

    if let Some(logger) = debug {
        let json = format!(
            "{{\"type\":\"svg.document\",\"width\":{},\"height\":{},\"gradients\":{},\"warnings\":{}}}",
            width,
            height,
            loader.gradients.len(),
            loader.warnings.len()
        );
        logger.log_json(&json);
        logger.emit_summary("svg.load");
    }

    Ok(SvgData {
        width,
        height,
        view_box,
        root,
        gradients: loader.gradients,
        warnings: loader.warnings,
    })
}

fn parse_view_box(raw: &str) -> Option<Rect> {
    match parse_number_list(raw).as_slice() {
        [x, y, w, h, ..] => Some(Rect::new(*x, *y, *w, *h)),
        _ => None,
    }
}

fn element_name(node: roxmltree::Node<'_, '_>) -> String {
    node.attribute((INKSCAPE_NS, "label"))
        .or_else(|| node.attribute("id"))
        .unwrap_or("")
        .to_string()
}

fn href_id<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute((XLINK_NS, "href"))
        .or_else(|| node.attribute("href"))
        .map(str::trim)
}

fn attr_f64(node: roxmltree::Node<'_, '_>, name: &str) -> Option<f64> {
    node.attribute(name).and_then(parse_number)
}

fn gradient_kind(node: roxmltree::Node<'_, '_>) -> Option<GradientKind> {
    match node.tag_name().name() {
        "linearGradient" => Some(GradientKind::Linear),
        "radialGradient" => Some(GradientKind::Radial),
        _ => None,
    }
}

struct DocumentLoader<'a> {
    parser: PathParser,
    debug: Option<&'a DebugLogger>,
    gradients: HashMap<String, Gradient>,
    warnings: Vec<ParseWarning>,
}

impl DocumentLoader<'_> {
    fn count(&self, key: &str) {
        if let Some(logger) = self.debug {
            logger.increment(key, 1);
        }
    }

    // Gradients are registered before the tree walk so fills and xlinks may
    // refer forward. Linked gradients resolve once their base exists.
    fn load_gradients(&mut self, svg: roxmltree::Node<'_, '_>) -> Result<(), SvgError> {
        let mut pending = Vec::new();
        for node in svg.descendants().filter(|n| n.is_element()) {
            let Some(kind) = gradient_kind(node) else {
                continue;
            };
            let Some(id) = node.attribute("id") else {
                log::debug!("skipping gradient without id");
                continue;
            };
            match href_id(node) {
                Some(link) => pending.push((id, kind, node, link)),
                None => {
                    let grad = self.build_gradient(node, kind, None)?;
                    self.register_gradient(id, grad);
                }
            }
        }

        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::new();
            for (id, kind, node, link) in pending {
                let Some(base_id) = link.strip_prefix('#') else {
                    return Err(SvgError::UnknownXlink(link.to_string()));
                };
                match self.gradients.get(base_id).cloned() {
                    Some(base) => {
                        let grad = self.build_gradient(node, kind, Some(base))?;
                        self.register_gradient(id, grad);
                    }
                    None => waiting.push((id, kind, node, link)),
                }
            }
            if waiting.len() == before {
                let (_, _, _, link) = waiting[0];
                return Err(SvgError::UnknownXlink(link.to_string()));
            }
            pending = waiting;
        }
        Ok(())
    }

    fn register_gradient(&mut self, id: &str, grad: Gradient) {
        if let Some(logger) = self.debug {
            let json = format!(
                "{{\"type\":\"svg.gradient\",\"id\":\"{}\",\"kind\":\"{:?}\",\"stops\":{}}}",
                json_escape(id),
                grad.kind,
                grad.stops.len()
            );
            logger.log_json(&json);
            logger.increment("svg.gradients", 1);
        }
        self.gradients.insert(id.to_string(), grad);
    }

    fn build_gradient(
        &mut self,
        node: roxmltree::Node<'_, '_>,
        kind: GradientKind,
        base: Option<Gradient>,
    ) -> Result<Gradient, SvgError> {
        let mut grad = match base {
            Some(base) => Gradient { kind, ..base },
            None => Gradient::new(kind),
        };

        match kind {
            GradientKind::Linear => {
                for (name, slot) in [
                    ("x1", &mut grad.x1),
                    ("y1", &mut grad.y1),
                    ("x2", &mut grad.x2),
                    ("y2", &mut grad.y2),
                ] {
                    if let Some(v) = attr_f64(node, name) {
                        *slot = v;
                    }
                }
            }
            GradientKind::Radial => {
                if let Some(cx) = attr_f64(node, "cx") {
                    grad.x1 = cx;
                }
                if let Some(cy) = attr_f64(node, "cy") {
                    grad.y1 = cy;
                }
                grad.x2 = attr_f64(node, "fx").unwrap_or(grad.x1);
                grad.y2 = attr_f64(node, "fy").unwrap_or(grad.y1);
                if let Some(r) = attr_f64(node, "r") {
                    grad.radius = r;
                }
            }
        }

        if let Some(raw) = node.attribute("gradientTransform") {
            let parsed = parse_transform(raw, &mut self.warnings);
            grad.matrix = grad.matrix.append(parsed.matrix);
        }
        match node.attribute("spreadMethod").map(str::trim) {
            Some("reflect") => grad.spread = SpreadMethod::Reflect,
            Some("repeat") => grad.spread = SpreadMethod::Repeat,
            Some("pad") => grad.spread = SpreadMethod::Pad,
            _ => {}
        }
        match node.attribute("color-interpolation").map(str::trim) {
            Some("linearRGB") => grad.interp = Interpolation::LinearRgb,
            Some("sRGB") => grad.interp = Interpolation::Rgb,
            _ => {}
        }

        let stops = node
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "stop")
            .map(parse_stop)
            .collect::<Result<Vec<_>, _>>()?;
        if !stops.is_empty() {
            grad.stops = stops;
        }
        Ok(grad)
    }

    fn load_group(
        &mut self,
        node: roxmltree::Node<'_, '_>,
        parent_matrix: Transform,
        parent_style: &ResolvedStyle,
    ) -> Result<Group, SvgError> {
        let matrix = self.element_matrix(node, parent_matrix);
        let style = parent_style.child(node, &self.gradients, &mut self.warnings)?;
        let mut group = Group::new(element_name(node));
        self.count("svg.element.g");

        for child in node.children().filter(|n| n.is_element()) {
            if is_display_none(child) {
                self.count("svg.pruned");
                continue;
            }
            let tag = child.tag_name().name();
            match tag {
                "defs" | "linearGradient" | "radialGradient" => {}
                "g" => {
                    let sub = self.load_group(child, matrix, &style)?;
                    group.children.push(Element::Group(sub));
                }
                "path" | "line" | "polyline" | "polygon" | "rect" | "ellipse" | "circle" => {
                    let path = self.load_path(child, tag, matrix, &style)?;
                    group.children.push(Element::Path(path));
                }
                "text" => {
                    let text = self.load_text(child, matrix, &style)?;
                    group.children.push(Element::Text(text));
                }
                other => {
                    log::debug!("ignoring svg element <{}>", other);
                    self.count("svg.ignored");
                }
            }
        }
        Ok(group)
    }

    fn element_matrix(&mut self, node: roxmltree::Node<'_, '_>, parent: Transform) -> Transform {
        match node.attribute("transform") {
            Some(raw) => parent.append(parse_transform(raw, &mut self.warnings).matrix),
            None => parent,
        }
    }

    fn load_path(
        &mut self,
        node: roxmltree::Node<'_, '_>,
        tag: &str,
        parent_matrix: Transform,
        parent_style: &ResolvedStyle,
    ) -> Result<Path, SvgError> {
        let rotated = node
            .attribute("transform")
            .is_some_and(|raw| parse_transform(raw, &mut Vec::new()).rotated);
        let matrix = self.element_matrix(node, parent_matrix);
        let style = parent_style.child(node, &self.gradients, &mut self.warnings)?;
        self.count(&format!("svg.element.{}", tag));

        let segments = match tag {
            "rect" => rect_segments(node, rotated),
            "ellipse" => {
                let rx = attr_f64(node, "rx").unwrap_or(0.0);
                let ry = attr_f64(node, "ry").unwrap_or(0.0);
                ellipse_segments(node, rx, ry)
            }
            "circle" => {
                let r = attr_f64(node, "r").unwrap_or(0.0);
                ellipse_segments(node, r, r)
            }
            "path" => {
                let d = node.attribute("d").unwrap_or("");
                self.take_segments(self.parser.parse(d))
            }
            "line" => {
                let coord = |name: &str| attr_f64(node, name).unwrap_or(0.0);
                let d = format!(
                    "M{},{} {},{}",
                    coord("x1"),
                    coord("y1"),
                    coord("x2"),
                    coord("y2")
                );
                self.take_segments(self.parser.parse_synthesized(&d))
            }
            _ => match node.attribute("points") {
                Some(points) => {
                    let close = if tag == "polygon" { "z" } else { "" };
                    let d = format!("M{}{}", points, close);
                    self.take_segments(self.parser.parse_synthesized(&d))
                }
                None => Vec::new(),
            },
        };
        self.count("svg.paths");

        Ok(Path {
            matrix,
            name: element_name(node),
            segments,
            fill: style.fill,
            alpha: style.opacity,
            fill_alpha: style.fill_opacity,
            stroke_alpha: style.stroke_opacity,
            stroke_color: style.stroke,
            stroke_width: style.stroke_width,
            stroke_caps: style.stroke_caps,
            joint_style: style.joint_style,
            miter_limit: style.miter_limit,
        })
    }

    fn take_segments(&mut self, parsed: ParsedPath) -> Vec<PathSegment> {
        if !parsed.warnings.is_empty() {
            if let Some(logger) = self.debug {
                logger.increment("svg.warnings", parsed.warnings.len() as u64);
            }
        }
        self.warnings.extend(parsed.warnings);
        parsed.segments
    }

    fn load_text(
        &mut self,
        node: roxmltree::Node<'_, '_>,
        parent_matrix: Transform,
        parent_style: &ResolvedStyle,
    ) -> Result<Text, SvgError> {
        let matrix = self.element_matrix(node, parent_matrix);
        let style = parent_style.child(node, &self.gradients, &mut self.warnings)?;
        self.count("svg.element.text");
        let text: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        Ok(Text {
            name: element_name(node),
            x: attr_f64(node, "x").unwrap_or(0.0),
            y: attr_f64(node, "y").unwrap_or(0.0),
            matrix,
            text,
            fill: style.fill,
            alpha: style.opacity,
            fill_alpha: style.fill_opacity,
            stroke_alpha: style.stroke_opacity,
            stroke_color: style.stroke,
            stroke_width: style.stroke_width,
            font_family: style.font_family,
            font_size: style.font_size,
            letter_spacing: style.letter_spacing,
            kerning: style.kerning,
            text_align: style.text_align,
        })
    }
}

fn parse_stop(node: roxmltree::Node<'_, '_>) -> Result<GradientStop, SvgError> {
    let mut color_raw = node.attribute("stop-color");
    let mut opacity_raw = node.attribute("stop-opacity");
    if let Some(style) = node.attribute("style") {
        for (key, value) in parse_style_declarations(style) {
            match key {
                "stop-color" => color_raw = Some(value),
                "stop-opacity" => opacity_raw = Some(value),
                _ => {}
            }
        }
    }

    let color = match color_raw.map(str::trim) {
        None | Some("") => Color::BLACK,
        Some(raw) => parse_color(raw).ok_or_else(|| SvgError::UnknownColor(raw.to_string()))?,
    };
    let alpha = opacity_raw.and_then(parse_number).unwrap_or(1.0);
    let offset = node.attribute("offset").map(str::trim).and_then(|raw| {
        match raw.strip_suffix('%') {
            Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
            None => raw.parse::<f64>().ok(),
        }
    });
    let ratio = libm::floor(offset.unwrap_or(0.0) * 255.0).clamp(0.0, 255.0) as u8;

    Ok(GradientStop {
        color,
        alpha,
        ratio,
    })
}

fn rect_segments(node: roxmltree::Node<'_, '_>, rotated: bool) -> Vec<PathSegment> {
    let x = attr_f64(node, "x").unwrap_or(0.0);
    let y = attr_f64(node, "y").unwrap_or(0.0);
    let width = attr_f64(node, "width").unwrap_or(0.0);
    let height = attr_f64(node, "height").unwrap_or(0.0);
    if width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }
    let rx = attr_f64(node, "rx");
    let ry = attr_f64(node, "ry");
    let radius = rx.or(ry).unwrap_or(0.0);

    // Rotated square corners are spelled out so the rotation lands on the
    // corners instead of on a rect primitive.
    if rotated && radius <= 0.0 {
        return vec![
            PathSegment::Move { x, y },
            PathSegment::Line { x: x + width, y },
            PathSegment::Line {
                x: x + width,
                y: y + height,
            },
            PathSegment::Line { x, y: y + height },
            PathSegment::Line { x, y },
        ];
    }
    vec![PathSegment::RoundRect {
        x,
        y,
        width,
        height,
        rx,
        ry,
    }]
}

// Eight quadratics, one per 45 degree octant, starting at the +x extreme.
fn ellipse_segments(node: roxmltree::Node<'_, '_>, w: f64, h: f64) -> Vec<PathSegment> {
    if w <= 0.0 || h <= 0.0 {
        return Vec::new();
    }
    let x = attr_f64(node, "cx").unwrap_or(0.0);
    let y = attr_f64(node, "cy").unwrap_or(0.0);
    let (w_, cw) = (w * SIN45, w * TAN22);
    let (h_, ch) = (h * SIN45, h * TAN22);
    let quad = |cx, cy, x, y| PathSegment::Quadratic { cx, cy, x, y };
    vec![
        PathSegment::Move { x: x + w, y },
        quad(x + w, y + ch, x + w_, y + h_),
        quad(x + cw, y + h, x, y + h),
        quad(x - cw, y + h, x - w_, y + h_),
        quad(x - w, y + ch, x - w, y),
        quad(x - w, y - ch, x - w_, y - h_),
        quad(x - cw, y - h, x, y - h),
        quad(x + cw, y - h, x + w_, y - h_),
        quad(x + w, y - ch, x + w, y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{FillSpec, WarningKind};

    fn load(text: &str) -> Result<SvgData, SvgError> {
        load_document(text, PathParser::default(), None)
    }

    fn first_path(group: &Group) -> &Path {
        group
            .children
            .iter()
            .find_map(|child| match child {
                Element::Path(path) => Some(path),
                _ => None,
            })
            .expect("group has a path")
    }

    #[test]
    fn size_falls_back_to_view_box_then_default() {
        let data = load(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="10 20 30 40"/>"#)
            .expect("parse");
        assert_eq!((data.width, data.height), (30.0, 40.0));
        assert_eq!(data.view_box, Rect::new(10.0, 20.0, 30.0, 40.0));

        let data = load(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).expect("parse");
        assert_eq!((data.width, data.height), (400.0, 400.0));

        let data = load(r#"<svg xmlns="http://www.w3.org/2000/svg" width="50px"/>"#).expect("parse");
        assert_eq!((data.width, data.height), (50.0, 50.0));
    }

    #[test]
    fn view_box_origin_shifts_root_matrix() {
        let data = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="10 20 30 40"><path d="M0 0"/></svg>"#,
        )
        .expect("parse");
        assert_eq!(first_path(&data.root).matrix, Transform::translate(-10.0, -20.0));
    }

    #[test]
    fn non_svg_root_is_rejected() {
        let err = load("<html/>").expect_err("html root");
        assert!(matches!(err, SvgError::NotSvg(ref tag) if tag == "html"));
        assert!(matches!(load("<svg"), Err(SvgError::Xml(_))));
    }

    #[test]
    fn fill_may_reference_a_gradient_defined_later() {
        let data = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
                <rect width="10" height="10" fill="url(#late)"/>
                <defs>
                  <linearGradient id="late" xlink:href="#base" x2="10"/>
                  <linearGradient id="base" x1="1" spreadMethod="reflect">
                    <stop offset="0" stop-color="#ff0000"/>
                    <stop offset="50%" style="stop-color:#0000ff;stop-opacity:0.5"/>
                  </linearGradient>
                </defs>
            </svg>"##,
        )
        .expect("parse");
        assert_eq!(first_path(&data.root).fill, FillSpec::Gradient("late".to_string()));
        let late = data.gradient("late").expect("late gradient");
        assert_eq!(late.x1, 1.0, "inherits x1 from its base");
        assert_eq!(late.x2, 10.0);
        assert_eq!(late.spread, SpreadMethod::Reflect);
        assert_eq!(late.ratios(), vec![0, 127]);
        assert_eq!(late.alphas(), vec![1.0, 0.5]);
        assert_eq!(late.colors()[1], Color::rgb(0, 0, 255));
    }

    #[test]
    fn broken_references_fail_the_whole_parse() {
        let missing_gradient = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0" fill="url(#nope)"/></svg>"#,
        );
        assert!(matches!(missing_gradient, Err(SvgError::UnknownGradient(id)) if id == "nope"));

        let missing_link = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
                <linearGradient id="a" xlink:href="#ghost"/></svg>"##,
        );
        assert!(matches!(missing_link, Err(SvgError::UnknownXlink(link)) if link == "#ghost"));

        let bad_fill = load(r#"<svg xmlns="http://www.w3.org/2000/svg"><path fill="teal"/></svg>"#);
        assert!(matches!(bad_fill, Err(SvgError::UnknownFill(_))));
    }

    #[test]
    fn gradient_stroke_uses_first_stop_color() {
        let data = load(
            r##"<svg xmlns="http://www.w3.org/2000/svg">
                <linearGradient id="g">
                    <stop offset="0" stop-color="#00ff00"/>
                    <stop offset="1" stop-color="#0000ff"/>
                </linearGradient>
                <linearGradient id="empty"/>
                <path d="M0 0 L10 10" fill="none" stroke="url(#g)"/>
                <path d="M0 0 L10 10" fill="none" style="stroke:url(#empty)"/>
            </svg>"##,
        )
        .expect("parse");
        let paths: Vec<&Path> = data
            .root
            .children
            .iter()
            .filter_map(|child| match child {
                Element::Path(path) => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(paths[0].stroke_color, Some(Color::rgb(0, 255, 0)));
        assert_eq!(paths[1].stroke_color, None);
        let strokes: Vec<&str> = data
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::GradientStroke)
            .map(|w| w.detail.as_str())
            .collect();
        assert_eq!(strokes, ["g", "empty"]);

        let missing = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0" stroke="url(#nope)"/></svg>"#,
        );
        assert!(matches!(missing, Err(SvgError::UnknownGradient(id)) if id == "nope"));
    }

    #[test]
    fn display_none_prunes_the_subtree() {
        let data = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <g id="gone" display="none"><path d="M0 0 L1 1"/></g>
                <g id="kept"><path d="M0 0 L1 1" style="display:none"/></g>
            </svg>"#,
        )
        .expect("parse");
        assert!(!data.has_group("gone"));
        let kept = data.find_group("kept").expect("kept");
        assert!(kept.children.is_empty());
    }

    #[test]
    fn shapes_become_segments() {
        let data = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
                <circle cx="5" cy="5" r="5"/>
                <polyline points="0,0 10,0 10,10"/>
                <polygon points="0,0 10,0 10,10"/>
                <line x1="1" y1="2" x2="3" y2="4"/>
                <rect x="1" y="1" width="4" height="2" rx="1"/>
                <rect width="4" height="2" transform="rotate(30)"/>
                <circle r="0"/>
            </svg>"#,
        )
        .expect("parse");
        let paths: Vec<&Path> = data
            .root
            .children
            .iter()
            .filter_map(|child| match child {
                Element::Path(path) => Some(path),
                _ => None,
            })
            .collect();
        assert_eq!(paths[0].segments.len(), 9);
        assert_eq!(paths[0].segments[0], PathSegment::Move { x: 10.0, y: 5.0 });
        assert_eq!(paths[0].segments[8].end(), paths[0].segments[0].end());
        assert_eq!(paths[1].segments.len(), 3, "polyline stays open");
        assert_eq!(paths[2].segments.len(), 4, "polygon closes");
        assert_eq!(paths[3].segments[1], PathSegment::Line { x: 3.0, y: 4.0 });
        assert!(matches!(
            paths[4].segments[0],
            PathSegment::RoundRect { rx: Some(1.0), ry: None, .. }
        ));
        assert_eq!(paths[5].segments.len(), 5);
        assert!(paths[6].segments.is_empty());
    }

    #[test]
    fn names_prefer_inkscape_label_and_text_is_concatenated() {
        let data = load(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
                <g id="layer1" inkscape:label="Background" opacity="0.5">
                  <text id="t" x="3" y="4" style="font-size:20px;text-anchor:middle">Hello <tspan>world</tspan></text>
                  <path id="p" opacity="0.5" d="M0 0"/>
                </g>
            </svg>"#,
        )
        .expect("parse");
        let layer = data.find_group("Background").expect("labelled layer");
        let Element::Text(text) = &layer.children[0] else {
            panic!("expected text");
        };
        assert_eq!(text.text, "Hello world");
        assert_eq!(text.font_size, 20.0);
        assert_eq!(text.text_align, crate::scene::TextAlign::Center);
        assert_eq!((text.x, text.y), (3.0, 4.0));
        assert_eq!(first_path(layer).alpha, 0.25);
        assert_eq!(first_path(layer).name, "p");
    }

    #[test]
    fn debug_logger_counts_elements() {
        let logger = DebugLogger::in_memory();
        let data = load_document(
            r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0 X 1"/><unknown/></svg>"#,
            PathParser::default(),
            Some(&logger),
        )
        .expect("parse");
        assert_eq!(data.warnings.len(), 1);
        let lines = logger.lines();
        let summary = lines.last().expect("summary line");
        assert!(summary.contains("\"svg.paths\":1"), "{summary}");
        assert!(summary.contains("\"svg.ignored\":1"), "{summary}");
        assert!(summary.contains("\"svg.warnings\":1"), "{summary}");
    }
}
