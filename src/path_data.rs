use crate::scene::{ParseWarning, WarningKind};
use crate::segment::PathSegment;
use crate::types::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCommand {
    Move,
    Line,
    Horizontal,
    Vertical,
    Cubic,
    SmoothCubic,
    Quadratic,
    SmoothQuadratic,
    Arc,
    Close,
}

impl PathCommand {
    /// Command for a path-data letter, plus whether it is the relative form.
    pub fn from_letter(letter: char) -> Option<(PathCommand, bool)> {
        let cmd = match letter.to_ascii_uppercase() {
            'M' => PathCommand::Move,
            'L' => PathCommand::Line,
            'H' => PathCommand::Horizontal,
            'V' => PathCommand::Vertical,
            'C' => PathCommand::Cubic,
            'S' => PathCommand::SmoothCubic,
            'Q' => PathCommand::Quadratic,
            'T' => PathCommand::SmoothQuadratic,
            'A' => PathCommand::Arc,
            'Z' => PathCommand::Close,
            _ => return None,
        };
        Some((cmd, letter.is_ascii_lowercase()))
    }

    pub fn arity(self) -> usize {
        match self {
            PathCommand::Close => 0,
            PathCommand::Horizontal | PathCommand::Vertical => 1,
            PathCommand::Move | PathCommand::Line | PathCommand::SmoothQuadratic => 2,
            PathCommand::SmoothCubic | PathCommand::Quadratic => 4,
            PathCommand::Cubic => 6,
            PathCommand::Arc => 7,
        }
    }
}

/// Pen state threaded through each command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParserState {
    pub current: Point,
    pub subpath_start: Point,
    // Second control point of the previous segment, when it was a cubic.
    pub last_cubic_ctrl: Option<Point>,
    // Control point of the previous segment, when it was a quadratic.
    pub last_quad_ctrl: Option<Point>,
}

impl ParserState {
    /// Apply one command. Returns `None` when `args` holds fewer than
    /// `cmd.arity()` numbers; extra numbers are ignored.
    pub fn step(
        &self,
        cmd: PathCommand,
        relative: bool,
        args: &[f64],
    ) -> Option<(ParserState, PathSegment)> {
        if args.len() < cmd.arity() {
            return None;
        }
        let cur = self.current;
        let at = |i: usize| -> Point {
            let p = Point::new(args[i], args[i + 1]);
            if relative {
                Point::new(cur.x + p.x, cur.y + p.y)
            } else {
                p
            }
        };
        let mut next = ParserState {
            current: cur,
            subpath_start: self.subpath_start,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        };
        let seg = match cmd {
            PathCommand::Move => {
                let p = at(0);
                next.subpath_start = p;
                PathSegment::Move { x: p.x, y: p.y }
            }
            PathCommand::Line => {
                let p = at(0);
                PathSegment::Line { x: p.x, y: p.y }
            }
            PathCommand::Horizontal => {
                let x = if relative { cur.x + args[0] } else { args[0] };
                PathSegment::Line { x, y: cur.y }
            }
            PathCommand::Vertical => {
                let y = if relative { cur.y + args[0] } else { args[0] };
                PathSegment::Line { x: cur.x, y }
            }
            PathCommand::Cubic | PathCommand::SmoothCubic => {
                let (c1, c2, p) = if cmd == PathCommand::Cubic {
                    (at(0), at(2), at(4))
                } else {
                    let c1 = self.last_cubic_ctrl.map_or(cur, |c| cur.reflect(c));
                    (c1, at(0), at(2))
                };
                next.last_cubic_ctrl = Some(c2);
                PathSegment::Cubic {
                    c1x: c1.x,
                    c1y: c1.y,
                    c2x: c2.x,
                    c2y: c2.y,
                    x: p.x,
                    y: p.y,
                }
            }
            PathCommand::Quadratic | PathCommand::SmoothQuadratic => {
                let (c, p) = if cmd == PathCommand::Quadratic {
                    (at(0), at(2))
                } else {
                    let c = self.last_quad_ctrl.map_or(cur, |c| cur.reflect(c));
                    (c, at(0))
                };
                next.last_quad_ctrl = Some(c);
                PathSegment::Quadratic {
                    cx: c.x,
                    cy: c.y,
                    x: p.x,
                    y: p.y,
                }
            }
            PathCommand::Arc => {
                let p = at(5);
                PathSegment::Arc {
                    x1: cur.x,
                    y1: cur.y,
                    rx: args[0],
                    ry: args[1],
                    rotation: args[2],
                    large_arc: args[3] != 0.0,
                    sweep: args[4] != 0.0,
                    x: p.x,
                    y: p.y,
                }
            }
            PathCommand::Close => PathSegment::Line {
                x: self.subpath_start.x,
                y: self.subpath_start.y,
            },
        };
        next.current = seg.end();
        Some((next, seg))
    }
}

struct Tokenizer<'a> {
    bytes: &'a [u8],
    i: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            i: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.i < self.bytes.len() {
            let b = self.bytes[self.i];
            if b == b' ' || b == b'\n' || b == b'\r' || b == b'\t' || b == b',' {
                self.i += 1;
            } else {
                break;
            }
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.bytes.get(self.i).copied()
    }

    fn next_number(&mut self) -> Option<f64> {
        self.skip_ws();
        if self.i >= self.bytes.len() {
            return None;
        }
        let start = self.i;
        let mut has = false;

        if matches!(self.bytes[self.i], b'+' | b'-') {
            self.i += 1;
        }
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
            self.i += 1;
            has = true;
        }
        if self.i < self.bytes.len() && self.bytes[self.i] == b'.' {
            self.i += 1;
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
                has = true;
            }
        }
        if has && self.i < self.bytes.len() && matches!(self.bytes[self.i], b'e' | b'E') {
            let mark = self.i;
            self.i += 1;
            if self.i < self.bytes.len() && matches!(self.bytes[self.i], b'+' | b'-') {
                self.i += 1;
            }
            let digits = self.i;
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
            }
            if self.i == digits {
                self.i = mark;
            }
        }

        if !has {
            self.i = start;
            return None;
        }

        let s = std::str::from_utf8(&self.bytes[start..self.i]).ok()?;
        s.parse::<f64>().ok()
    }

    // Arc flags may be packed without separators ("01").
    fn next_arc_flag(&mut self) -> Option<f64> {
        match self.peek()? {
            b'0' => {
                self.i += 1;
                Some(0.0)
            }
            b'1' => {
                self.i += 1;
                Some(1.0)
            }
            _ => self.next_number().map(|v| if v != 0.0 { 1.0 } else { 0.0 }),
        }
    }

    fn next_args(&mut self, cmd: PathCommand, out: &mut Vec<f64>) -> bool {
        out.clear();
        for idx in 0..cmd.arity() {
            let value = if cmd == PathCommand::Arc && (idx == 3 || idx == 4) {
                self.next_arc_flag()
            } else {
                self.next_number()
            };
            match value {
                Some(v) => out.push(v),
                None => return false,
            }
        }
        true
    }

    fn skip_byte(&mut self) -> Option<char> {
        let rest = std::str::from_utf8(&self.bytes[self.i..]).ok();
        let ch = rest.and_then(|s| s.chars().next());
        self.i += ch.map_or(1, char::len_utf8);
        ch
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPath {
    pub segments: Vec<PathSegment>,
    pub warnings: Vec<ParseWarning>,
}

/// Path-data parser. `convert_cubics` flattens every cubic into four
/// quadratics; `reverse_clockwise` reverses outlines whose subpaths all wind
/// clockwise (y-down).
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParser {
    pub convert_cubics: bool,
    pub reverse_clockwise: bool,
}

impl PathParser {
    pub fn new(convert_cubics: bool, reverse_clockwise: bool) -> Self {
        Self {
            convert_cubics,
            reverse_clockwise,
        }
    }

    /// Parse a `d` attribute.
    pub fn parse(&self, d: &str) -> ParsedPath {
        self.parse_impl(d, self.reverse_clockwise)
    }

    /// Parse path data synthesized from `points` or line endpoints; these are
    /// never reversed.
    pub fn parse_synthesized(&self, d: &str) -> ParsedPath {
        self.parse_impl(d, false)
    }

    fn parse_impl(&self, d: &str, reversible: bool) -> ParsedPath {
        let mut parsed = tokenize(d);
        if reversible && should_reverse(&parsed.segments) {
            parsed.segments = reverse_subpaths(&parsed.segments);
        }
        if self.convert_cubics {
            parsed.segments = flatten_cubics(&parsed.segments);
        }
        parsed
    }
}

fn warn(warnings: &mut Vec<ParseWarning>, kind: WarningKind, detail: String) {
    log::warn!("path data: {:?} {}", kind, detail);
    warnings.push(ParseWarning { kind, detail });
}

fn tokenize(d: &str) -> ParsedPath {
    let mut tok = Tokenizer::new(d);
    let mut state = ParserState::default();
    let mut out = ParsedPath::default();
    let mut active: Option<(PathCommand, bool)> = None;
    let mut args = Vec::with_capacity(7);

    while let Some(b) = tok.peek() {
        let mut explicit = false;
        if b.is_ascii_alphabetic() {
            tok.i += 1;
            match PathCommand::from_letter(b as char) {
                Some(found) => {
                    active = Some(found);
                    explicit = true;
                }
                None => {
                    warn(
                        &mut out.warnings,
                        WarningKind::UnknownPathCommand,
                        format!("'{}' at byte {}", b as char, tok.i - 1),
                    );
                    active = None;
                    while tok.next_number().is_some() {}
                    continue;
                }
            }
        }
        let Some((cmd, relative)) = active else {
            let at = tok.i;
            let detail = match tok.next_number() {
                Some(v) => format!("stray number {} at byte {}", v, at),
                None => format!("{:?} at byte {}", tok.skip_byte(), at),
            };
            warn(&mut out.warnings, WarningKind::UnexpectedPathByte, detail);
            continue;
        };
        if cmd == PathCommand::Close {
            if out.segments.is_empty() {
                out.segments.push(PathSegment::Move { x: 0.0, y: 0.0 });
            }
            if let Some((next, seg)) = state.step(cmd, relative, &[]) {
                state = next;
                out.segments.push(seg);
            }
            active = None;
            continue;
        }
        let at = tok.i;
        if !tok.next_args(cmd, &mut args) {
            // Drop the command and resync. A bare repeat that simply ran out
            // of numbers is not an error.
            if explicit || !args.is_empty() {
                warn(
                    &mut out.warnings,
                    WarningKind::TruncatedPathArguments,
                    format!(
                        "{:?} has {} of {} numbers at byte {}",
                        cmd,
                        args.len(),
                        cmd.arity(),
                        at
                    ),
                );
            }
            active = None;
            continue;
        }
        if out.segments.is_empty() && cmd != PathCommand::Move {
            out.segments.push(PathSegment::Move { x: 0.0, y: 0.0 });
        }
        let Some((next, seg)) = state.step(cmd, relative, &args) else {
            active = None;
            continue;
        };
        state = next;
        out.segments.push(seg);
        if cmd == PathCommand::Move {
            active = Some((PathCommand::Line, relative));
        }
    }
    out
}

fn subpaths(segments: &[PathSegment]) -> Vec<&[PathSegment]> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, seg) in segments.iter().enumerate() {
        if seg.is_move() && idx > start {
            out.push(&segments[start..idx]);
            start = idx;
        }
    }
    if start < segments.len() {
        out.push(&segments[start..]);
    }
    out
}

// Signed shoelace area over anchors and control points; positive winds
// clockwise in y-down coordinates.
fn signed_area(subpath: &[PathSegment]) -> f64 {
    let mut pts = Vec::with_capacity(subpath.len() * 3);
    for seg in subpath {
        match *seg {
            PathSegment::Quadratic { cx, cy, .. } => pts.push(Point::new(cx, cy)),
            PathSegment::Cubic {
                c1x, c1y, c2x, c2y, ..
            } => {
                pts.push(Point::new(c1x, c1y));
                pts.push(Point::new(c2x, c2y));
            }
            _ => {}
        }
        pts.push(seg.end());
    }
    if pts.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for (i, p) in pts.iter().enumerate() {
        let q = pts[(i + 1) % pts.len()];
        area += p.x * q.y - q.x * p.y;
    }
    area / 2.0
}

fn should_reverse(segments: &[PathSegment]) -> bool {
    let parts = subpaths(segments);
    !parts.is_empty() && parts.iter().all(|part| signed_area(part) >= 0.0)
}

fn reverse_subpaths(segments: &[PathSegment]) -> Vec<PathSegment> {
    let mut out = Vec::with_capacity(segments.len());
    for part in subpaths(segments) {
        let Some(last) = part.last() else { continue };
        let tail = last.end();
        out.push(PathSegment::Move {
            x: tail.x,
            y: tail.y,
        });
        for i in (1..part.len()).rev() {
            let from = part[i].end();
            let to = part[i - 1].end();
            let seg = match part[i] {
                PathSegment::Quadratic { cx, cy, .. } => PathSegment::Quadratic {
                    cx,
                    cy,
                    x: to.x,
                    y: to.y,
                },
                PathSegment::Cubic {
                    c1x, c1y, c2x, c2y, ..
                } => PathSegment::Cubic {
                    c1x: c2x,
                    c1y: c2y,
                    c2x: c1x,
                    c2y: c1y,
                    x: to.x,
                    y: to.y,
                },
                PathSegment::Arc {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    ..
                } => PathSegment::Arc {
                    x1: from.x,
                    y1: from.y,
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep: !sweep,
                    x: to.x,
                    y: to.y,
                },
                _ => PathSegment::Line { x: to.x, y: to.y },
            };
            out.push(seg);
        }
    }
    out
}

fn flatten_cubics(segments: &[PathSegment]) -> Vec<PathSegment> {
    let mut out = Vec::with_capacity(segments.len());
    let mut prev = Point::ORIGIN;
    for seg in segments {
        if matches!(seg, PathSegment::Cubic { .. }) {
            out.extend(seg.to_quadratics(prev));
        } else {
            out.push(*seg);
        }
        prev = seg.end();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(d: &str) -> Vec<PathSegment> {
        PathParser::default().parse(d).segments
    }

    fn line(x: f64, y: f64) -> PathSegment {
        PathSegment::Line { x, y }
    }

    #[test]
    fn relative_and_absolute_forms_agree() {
        let rel = parse("m10 10 l10 0 0 10 h-10 v-10 c0 5 5 5 5 0 s5 -5 5 0 q5 5 10 0 t10 0 a5 5 0 0 1 10 0 z");
        let abs = parse(
            "M10 10 L20 10 20 20 H10 V10 C10 15 15 15 15 10 S20 5 20 10 Q25 15 30 10 T40 10 A5 5 0 0 1 50 10 Z",
        );
        assert_eq!(rel, abs);
        assert_eq!(
            abs[6],
            PathSegment::Cubic {
                c1x: 15.0,
                c1y: 5.0,
                c2x: 20.0,
                c2y: 5.0,
                x: 20.0,
                y: 10.0,
            }
        );
        assert_eq!(
            abs[8],
            PathSegment::Quadratic {
                cx: 35.0,
                cy: 5.0,
                x: 40.0,
                y: 10.0,
            }
        );
    }

    #[test]
    fn square_yields_four_segments_plus_close_line() {
        let open = parse("M0,0 L10,0 L10,10 L0,10");
        assert_eq!(
            open,
            vec![
                PathSegment::Move { x: 0.0, y: 0.0 },
                line(10.0, 0.0),
                line(10.0, 10.0),
                line(0.0, 10.0),
            ]
        );
        let closed = parse("M0,0 L10,0 L10,10 L0,10 Z");
        assert_eq!(closed.len(), 5);
        assert_eq!(closed[4], line(0.0, 0.0));
    }

    #[test]
    fn close_returns_to_latest_move() {
        let segs = parse("M5,5 L10,5 L10,10 Z M20,20 l5,0 l0,5 l-5,0 z l1,1");
        assert_eq!(segs[3], line(5.0, 5.0));
        assert_eq!(segs[8], line(20.0, 20.0));
        assert_eq!(segs[9], line(21.0, 21.0));
    }

    #[test]
    fn shorthand_without_matching_predecessor_uses_anchor() {
        let segs = parse("M0,0 L5,5 S10,10 15,5");
        assert_eq!(
            segs[2],
            PathSegment::Cubic {
                c1x: 5.0,
                c1y: 5.0,
                c2x: 10.0,
                c2y: 10.0,
                x: 15.0,
                y: 5.0,
            }
        );
        let segs = parse("M0,0 C0,5 5,5 5,0 T10,0");
        assert_eq!(segs[2].control(), Point::new(5.0, 0.0));
    }

    #[test]
    fn unknown_command_is_skipped_with_warning() {
        let parsed = PathParser::default().parse("M0,0 X 5 5 L10,0");
        assert_eq!(parsed.segments, vec![PathSegment::Move { x: 0.0, y: 0.0 }, line(10.0, 0.0)]);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, WarningKind::UnknownPathCommand);
    }

    #[test]
    fn garbage_bytes_do_not_stall() {
        let parsed = PathParser::default().parse("M0,0 L10,0 # L5,5");
        assert_eq!(parsed.segments.last(), Some(&line(5.0, 5.0)));
        assert!(
            parsed
                .warnings
                .iter()
                .any(|w| w.kind == WarningKind::UnexpectedPathByte)
        );
    }

    #[test]
    fn leading_draw_command_gets_implicit_move() {
        assert_eq!(
            parse("L10,10"),
            vec![PathSegment::Move { x: 0.0, y: 0.0 }, line(10.0, 10.0)]
        );
    }

    #[test]
    fn packed_numbers_and_arc_flags() {
        let segs = parse("M10-5.5.5.5 A5 5 0 01 20 20 L1e1,2E-1");
        assert_eq!(segs[0], PathSegment::Move { x: 10.0, y: -5.5 });
        assert_eq!(segs[1], line(0.5, 0.5));
        let PathSegment::Arc {
            large_arc, sweep, x, y, ..
        } = segs[2]
        else {
            panic!("expected arc, got {:?}", segs[2]);
        };
        assert!(!large_arc && sweep);
        assert_eq!((x, y), (20.0, 20.0));
        assert_eq!(segs[3], line(10.0, 0.2));
    }

    #[test]
    fn clockwise_outline_is_reversed_on_request() {
        let parser = PathParser::new(false, true);
        let segs = parser.parse("M0,0 L10,0 L10,10 Z").segments;
        assert_eq!(
            segs,
            vec![
                PathSegment::Move { x: 0.0, y: 0.0 },
                line(10.0, 10.0),
                line(10.0, 0.0),
                line(0.0, 0.0),
            ]
        );
        let ccw = parser.parse("M0,0 L0,10 L10,10 Z").segments;
        assert_eq!(ccw[1], line(0.0, 10.0));
        let synthesized = parser.parse_synthesized("M0,0 L10,0 L10,10 Z").segments;
        assert_eq!(synthesized[1], line(10.0, 0.0));
    }

    #[test]
    fn reversal_swaps_cubic_controls_and_arc_sweep() {
        let parser = PathParser::new(false, true);
        let segs = parser
            .parse("M0,0 C5,0 10,5 10,10 A5 5 0 0 1 0,10 Z")
            .segments;
        assert_eq!(segs[0], PathSegment::Move { x: 0.0, y: 0.0 });
        assert_eq!(segs[1], line(0.0, 10.0));
        let PathSegment::Arc { x1, y1, sweep, x, y, .. } = segs[2] else {
            panic!("expected arc, got {:?}", segs[2]);
        };
        assert_eq!((x1, y1, x, y, sweep), (0.0, 10.0, 10.0, 10.0, false));
        assert_eq!(
            segs[3],
            PathSegment::Cubic {
                c1x: 10.0,
                c1y: 5.0,
                c2x: 5.0,
                c2y: 0.0,
                x: 0.0,
                y: 0.0,
            }
        );
    }

    #[test]
    fn cubic_conversion_replaces_cubics() {
        let parser = PathParser::new(true, false);
        let segs = parser.parse("M0,0 C0,10 10,10 10,0").segments;
        assert_eq!(segs.len(), 5);
        assert!(
            segs[1..]
                .iter()
                .all(|s| matches!(s, PathSegment::Quadratic { .. }))
        );
        assert_eq!(segs[4].end(), Point::new(10.0, 0.0));
    }

    #[test]
    fn step_is_pure_per_command() {
        let state = ParserState::default();
        let (state, _) = state.step(PathCommand::Move, false, &[1.0, 1.0]).expect("move");
        let (after, seg) = state
            .step(PathCommand::Quadratic, true, &[1.0, 1.0, 2.0, 0.0])
            .expect("quadratic");
        assert_eq!(seg.end(), Point::new(3.0, 1.0));
        assert_eq!(after.last_quad_ctrl, Some(Point::new(2.0, 2.0)));
        assert_eq!(state.current, Point::new(1.0, 1.0));
        assert_eq!(PathCommand::from_letter('a'), Some((PathCommand::Arc, true)));
        assert_eq!(PathCommand::Arc.arity(), 7);
        assert!(state.step(PathCommand::Cubic, false, &[1.0, 2.0]).is_none());
        assert!(state.step(PathCommand::Line, false, &[]).is_none());
    }

    #[test]
    fn truncated_arguments_are_dropped_with_warning() {
        let parsed = PathParser::default().parse("M0 0 L10");
        assert_eq!(parsed.segments, vec![PathSegment::Move { x: 0.0, y: 0.0 }]);
        assert_eq!(parsed.warnings.len(), 1);
        assert_eq!(parsed.warnings[0].kind, WarningKind::TruncatedPathArguments);
        assert!(parsed.warnings[0].detail.contains("1 of 2"), "{}", parsed.warnings[0].detail);

        let parsed = PathParser::default().parse("M0 0 C1 1 2 2 L5 5");
        assert_eq!(parsed.segments.last(), Some(&line(5.0, 5.0)));
        assert_eq!(parsed.warnings.len(), 1);

        let parsed = PathParser::default().parse("M0 0 L10 10 20 20  ");
        assert!(parsed.warnings.is_empty());
    }
}
