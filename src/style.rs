use std::collections::HashMap;

use crate::error::SvgError;
use crate::scene::{
    CapsStyle, FillSpec, Gradient, JointStyle, ParseWarning, TextAlign, WarningKind,
};
use crate::types::{Color, Transform};

// Properties read from presentation attributes, in the order they are applied.
const PRESENTATION_PROPERTIES: &[&str] = &[
    "fill",
    "fill-opacity",
    "stroke",
    "stroke-opacity",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "opacity",
    "font-family",
    "font-size",
    "letter-spacing",
    "kerning",
    "text-anchor",
    "text-align",
];

/// Style in effect for one element after cascading from its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub fill: FillSpec,
    // Product of every ancestor's opacity and the element's own.
    pub opacity: f64,
    pub fill_opacity: f64,
    pub stroke: Option<Color>,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    pub stroke_caps: CapsStyle,
    pub joint_style: JointStyle,
    pub miter_limit: f64,
    pub font_family: String,
    pub font_size: f64,
    pub letter_spacing: f64,
    pub kerning: f64,
    pub text_align: TextAlign,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            fill: FillSpec::black(),
            opacity: 1.0,
            fill_opacity: 1.0,
            stroke: None,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            stroke_caps: CapsStyle::None,
            joint_style: JointStyle::Miter,
            miter_limit: 3.0,
            font_family: String::new(),
            font_size: 12.0,
            letter_spacing: 0.0,
            kerning: 0.0,
            text_align: TextAlign::Left,
        }
    }
}

impl ResolvedStyle {
    /// Cascade `node`'s presentation attributes, then its `style` declarations,
    /// over `self`. Later declarations win; `inherit` keeps the parent value.
    pub fn child(
        &self,
        node: roxmltree::Node<'_, '_>,
        gradients: &HashMap<String, Gradient>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<ResolvedStyle, SvgError> {
        let mut out = self.clone();
        let mut own_opacity = None;
        for (key, value) in declarations(node) {
            if value == "inherit" {
                continue;
            }
            if key == "opacity" {
                if let Some(v) = parse_number(value) {
                    own_opacity = Some(v.clamp(0.0, 1.0));
                }
                continue;
            }
            out.apply(key, value, gradients, warnings)?;
        }
        if let Some(opacity) = own_opacity {
            out.opacity = self.opacity * opacity;
        }
        Ok(out)
    }

    fn apply(
        &mut self,
        key: &str,
        value: &str,
        gradients: &HashMap<String, Gradient>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), SvgError> {
        match key {
            "fill" => self.fill = parse_fill(value, gradients)?,
            "stroke" => self.stroke = parse_stroke(value, gradients, warnings)?,
            "fill-opacity" => set_number(&mut self.fill_opacity, value),
            "stroke-opacity" => set_number(&mut self.stroke_opacity, value),
            "stroke-width" => set_number(&mut self.stroke_width, value),
            "stroke-miterlimit" => set_number(&mut self.miter_limit, value),
            "stroke-linecap" => {
                self.stroke_caps = match value {
                    "round" => CapsStyle::Round,
                    "square" => CapsStyle::Square,
                    "butt" => CapsStyle::None,
                    _ => self.stroke_caps,
                }
            }
            "stroke-linejoin" => {
                self.joint_style = match value {
                    "round" => JointStyle::Round,
                    "bevel" => JointStyle::Bevel,
                    "miter" => JointStyle::Miter,
                    _ => self.joint_style,
                }
            }
            "font-family" => self.font_family = value.to_string(),
            "font-size" => set_number(&mut self.font_size, value),
            "letter-spacing" => set_number(&mut self.letter_spacing, value),
            "kerning" => set_number(&mut self.kerning, value),
            "text-anchor" | "text-align" => {
                self.text_align = match value {
                    "middle" | "center" => TextAlign::Center,
                    "end" | "right" => TextAlign::Right,
                    "start" | "left" => TextAlign::Left,
                    _ => self.text_align,
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// Percent and unparsable values count as unset.
fn set_number(slot: &mut f64, value: &str) {
    if let Some(v) = parse_number(value) {
        *slot = v;
    }
}

/// Presentation attributes followed by inline `style` declarations, trimmed.
pub(crate) fn declarations<'a>(node: roxmltree::Node<'a, '_>) -> Vec<(&'a str, &'a str)> {
    let mut out = Vec::new();
    for key in PRESENTATION_PROPERTIES {
        if let Some(value) = node.attribute(*key) {
            out.push((*key, value.trim()));
        }
    }
    if let Some(style) = node.attribute("style") {
        out.extend(parse_style_declarations(style));
    }
    out
}

pub(crate) fn parse_style_declarations(input: &str) -> impl Iterator<Item = (&str, &str)> {
    input.split(';').filter_map(|decl| {
        let (k, v) = decl.split_once(':')?;
        let key = k.trim();
        if key.is_empty() {
            return None;
        }
        Some((key, v.trim()))
    })
}

pub(crate) fn is_display_none(node: roxmltree::Node<'_, '_>) -> bool {
    if node.attribute("display").map(str::trim) == Some("none") {
        return true;
    }
    node.attribute("style")
        .is_some_and(|style| parse_style_declarations(style).any(|(k, v)| k == "display" && v == "none"))
}

pub fn parse_fill(
    value: &str,
    gradients: &HashMap<String, Gradient>,
) -> Result<FillSpec, SvgError> {
    let v = value.trim();
    if v == "none" {
        return Ok(FillSpec::None);
    }
    if let Some(id) = parse_url_ref(v) {
        if gradients.contains_key(&id) {
            return Ok(FillSpec::Gradient(id));
        }
        return Err(SvgError::UnknownGradient(id));
    }
    match parse_color(v) {
        Some(color) => Ok(FillSpec::Solid(color)),
        None => Err(SvgError::UnknownFill(v.to_string())),
    }
}

/// Strokes are solid only. A gradient reference strokes with the gradient's
/// first stop color, or not at all when it has no stops.
pub fn parse_stroke(
    value: &str,
    gradients: &HashMap<String, Gradient>,
    warnings: &mut Vec<ParseWarning>,
) -> Result<Option<Color>, SvgError> {
    let v = value.trim();
    if v == "none" {
        return Ok(None);
    }
    if let Some(id) = parse_url_ref(v) {
        let gradient = gradients
            .get(&id)
            .ok_or_else(|| SvgError::UnknownGradient(id.clone()))?;
        log::warn!("gradient stroke {v} drawn with its first stop color");
        warnings.push(ParseWarning {
            kind: WarningKind::GradientStroke,
            detail: id,
        });
        return Ok(gradient.stops.first().map(|stop| stop.color));
    }
    parse_color(v)
        .map(Some)
        .ok_or_else(|| SvgError::UnknownColor(v.to_string()))
}

/// `#rgb`, `#rrggbb`, `rgb(r, g, b)` with integer or percent channels, or a
/// bare integer (decimal or `0x` hex).
pub fn parse_color(input: &str) -> Option<Color> {
    let v = input.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(rest) = v.strip_prefix("rgb") {
        return parse_rgb_function(rest);
    }
    if let Some(hex) = v.strip_prefix("0x").or_else(|| v.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok().map(Color::from_rgb24);
    }
    v.parse::<u32>().ok().map(Color::from_rgb24)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = match hex.len() {
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok()?
        }
        6 => u32::from_str_radix(hex, 16).ok()?,
        _ => return None,
    };
    Some(Color::from_rgb24(value))
}

fn parse_rgb_function(rest: &str) -> Option<Color> {
    let inner = rest.trim_start().strip_prefix('(')?.trim_end().strip_suffix(')')?;
    let channels: Vec<u8> = inner
        .split(',')
        .map(parse_channel)
        .collect::<Option<Vec<u8>>>()?;
    match channels.as_slice() {
        [r, g, b] => Some(Color::rgb(*r, *g, *b)),
        _ => None,
    }
}

// Percent channels scale to 0..255 and round half up; all channels clamp.
fn parse_channel(raw: &str) -> Option<u8> {
    let s = raw.trim();
    let value = match s.strip_suffix('%') {
        Some(pct) => {
            let p = pct.trim().parse::<f64>().ok()?;
            libm::floor(p * 255.0 / 100.0 + 0.5)
        }
        None => libm::floor(s.parse::<f64>().ok()?),
    };
    Some(value.clamp(0.0, 255.0) as u8)
}

pub fn parse_url_ref(input: &str) -> Option<String> {
    let s = input.trim();
    if !s.to_ascii_lowercase().starts_with("url(") {
        return None;
    }
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close <= open + 1 {
        return None;
    }
    let inner = s[open + 1..close]
        .trim()
        .trim_matches('"')
        .trim_matches('\'');
    let id = inner.strip_prefix('#')?;
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

pub fn parse_number(input: &str) -> Option<f64> {
    let s = input.trim();
    if s.ends_with('%') {
        return None;
    }
    // Units are treated as user units.
    let s = s
        .trim_end_matches("px")
        .trim_end_matches("pt")
        .trim_end_matches("mm")
        .trim_end_matches("cm")
        .trim_end_matches("in")
        .trim();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_number_list(input: &str) -> Vec<f64> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<f64>().ok())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedTransform {
    pub matrix: Transform,
    // Whether a rotate() step appeared.
    pub rotated: bool,
}

/// Compose a `transform` attribute left to right. Unknown functions are
/// reported and skipped.
pub fn parse_transform(input: &str, warnings: &mut Vec<ParseWarning>) -> ParsedTransform {
    let mut out = ParsedTransform {
        matrix: Transform::identity(),
        rotated: false,
    };
    let mut s = input.trim();

    while !s.is_empty() {
        let Some(open) = s.find('(') else { break };
        let name = s[..open].trim().trim_start_matches(',').trim();
        let Some(close) = s[open + 1..].find(')') else {
            break;
        };
        let args = parse_number_list(&s[open + 1..open + 1 + close]);

        let m = match name {
            "translate" => {
                let tx = args.first().copied().unwrap_or(0.0);
                let ty = args.get(1).copied().unwrap_or(0.0);
                Some(Transform::translate(tx, ty))
            }
            "scale" => {
                let sx = args.first().copied().unwrap_or(1.0);
                let sy = args.get(1).copied().unwrap_or(sx);
                Some(Transform::scale(sx, sy))
            }
            "rotate" => {
                out.rotated = true;
                let a = args.first().copied().unwrap_or(0.0);
                if args.len() >= 3 {
                    let (cx, cy) = (args[1], args[2]);
                    Some(
                        Transform::translate(cx, cy)
                            .append(Transform::rotate_degrees(a))
                            .append(Transform::translate(-cx, -cy)),
                    )
                } else {
                    Some(Transform::rotate_degrees(a))
                }
            }
            "matrix" if args.len() >= 6 => Some(Transform::new(
                args[0], args[1], args[2], args[3], args[4], args[5],
            )),
            _ => None,
        };

        match m {
            Some(m) => out.matrix = out.matrix.append(m),
            None => {
                let detail = s[..open + 1 + close + 1].to_string();
                log::warn!("unknown transform: {}", detail);
                warnings.push(ParseWarning {
                    kind: WarningKind::UnknownTransform,
                    detail,
                });
            }
        }
        s = s[open + 1 + close + 1..].trim_start();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_node<'a>(doc: &'a roxmltree::Document<'a>, id: &str) -> roxmltree::Node<'a, 'a> {
        doc.descendants()
            .find(|n| n.attribute("id") == Some(id))
            .expect("node present")
    }

    #[test]
    fn hex_shorthand_expands() {
        assert_eq!(parse_color("#abc"), Some(Color::from_rgb24(0xaabbcc)));
        assert_eq!(parse_color("#AABBCC"), Some(Color::from_rgb24(0xaabbcc)));
        assert_eq!(parse_color("#abcd"), None);
    }

    #[test]
    fn rgb_percent_channels_clamp_and_round() {
        assert_eq!(parse_color("rgb(50%,0,255)"), Some(Color::rgb(128, 0, 255)));
        assert_eq!(parse_color("rgb( 300 , -4, 100% )"), Some(Color::rgb(255, 0, 255)));
        assert_eq!(parse_color("rgb(1,2)"), None);
    }

    #[test]
    fn bare_integers_are_packed_rgb() {
        assert_eq!(parse_color("255"), Some(Color::rgb(0, 0, 255)));
        assert_eq!(parse_color("0xff0000"), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn unknown_fill_and_gradient_fail_fast() {
        let gradients = HashMap::new();
        assert!(matches!(
            parse_fill("url(#missing)", &gradients),
            Err(SvgError::UnknownGradient(id)) if id == "missing"
        ));
        assert!(matches!(
            parse_fill("chartreuse", &gradients),
            Err(SvgError::UnknownFill(s)) if s == "chartreuse"
        ));
        let mut warnings = Vec::new();
        assert!(matches!(
            parse_stroke("bogus", &gradients, &mut warnings),
            Err(SvgError::UnknownColor(_))
        ));
        assert!(matches!(
            parse_stroke("url(#missing)", &gradients, &mut warnings),
            Err(SvgError::UnknownGradient(id)) if id == "missing"
        ));
        assert!(warnings.is_empty());
        assert_eq!(parse_fill("none", &gradients).ok(), Some(FillSpec::None));
    }

    #[test]
    fn style_attribute_beats_presentation_attribute() {
        let xml = r##"<g id="p" fill="#ff0000" stroke-width="4" style="fill:#00ff00; opacity: 0.5"/>"##;
        let doc = roxmltree::Document::parse(xml).expect("xml");
        let parent = ResolvedStyle {
            opacity: 0.5,
            ..ResolvedStyle::default()
        };
        let style = parent
            .child(doc_node(&doc, "p"), &HashMap::new(), &mut Vec::new())
            .expect("style");
        assert_eq!(style.fill, FillSpec::Solid(Color::rgb(0, 255, 0)));
        assert_eq!(style.stroke_width, 4.0);
        assert_eq!(style.opacity, 0.25);
    }

    #[test]
    fn inherit_and_percent_keep_parent_values() {
        let xml = r##"<g id="p" stroke-width="50%" style="fill:inherit"/>"##;
        let doc = roxmltree::Document::parse(xml).expect("xml");
        let parent = ResolvedStyle {
            fill: FillSpec::Solid(Color::rgb(1, 2, 3)),
            stroke_width: 2.0,
            ..ResolvedStyle::default()
        };
        let style = parent
            .child(doc_node(&doc, "p"), &HashMap::new(), &mut Vec::new())
            .expect("style");
        assert_eq!(style.fill, parent.fill);
        assert_eq!(style.stroke_width, 2.0);
    }

    #[test]
    fn display_none_via_attribute_or_style() {
        let xml = r#"<g><a id="a" display="none"/><b id="b" style="display: none"/><c id="c"/></g>"#;
        let doc = roxmltree::Document::parse(xml).expect("xml");
        assert!(is_display_none(doc_node(&doc, "a")));
        assert!(is_display_none(doc_node(&doc, "b")));
        assert!(!is_display_none(doc_node(&doc, "c")));
    }

    #[test]
    fn transform_list_composes_left_to_right() {
        let mut warnings = Vec::new();
        let t = parse_transform("translate(10,20) scale(2)", &mut warnings);
        assert_eq!(t.matrix.apply(1.0, 1.0), (12.0, 22.0));
        assert!(!t.rotated);
        assert!(warnings.is_empty());

        let r = parse_transform("rotate(90 10 10)", &mut warnings);
        let (x, y) = r.matrix.apply(20.0, 10.0);
        assert!((x - 10.0).abs() < 1e-9 && (y - 20.0).abs() < 1e-9);
        assert!(r.rotated);
    }

    #[test]
    fn unknown_transform_warns_and_is_ignored() {
        let mut warnings = Vec::new();
        let t = parse_transform("skewX(30) translate(5)", &mut warnings);
        assert_eq!(t.matrix, Transform::translate(5.0, 0.0));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnknownTransform);
        assert_eq!(warnings[0].detail, "skewX(30)");
    }

    #[test]
    fn numbers_drop_units_and_reject_percent() {
        assert_eq!(parse_number("12px"), Some(12.0));
        assert_eq!(parse_number(" 3.5 "), Some(3.5));
        assert_eq!(parse_number("40%"), None);
        assert_eq!(parse_url_ref("url('#g1')"), Some("g1".to_string()));
    }
}
