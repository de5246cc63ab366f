use crate::context::RenderContext;
use crate::gfx::Gfx;
use crate::types::Point;

// Upper bound on line steps for a single arc, whatever the zoom.
const MAX_ARC_STEPS: usize = 4096;
// Line steps per transformed unit of arc length.
const ARC_STEP_DENSITY: f64 = 5.0;

/// One path instruction in untransformed document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Move {
        x: f64,
        y: f64,
    },
    Line {
        x: f64,
        y: f64,
    },
    Quadratic {
        cx: f64,
        cy: f64,
        x: f64,
        y: f64,
    },
    Cubic {
        c1x: f64,
        c1y: f64,
        c2x: f64,
        c2y: f64,
        x: f64,
        y: f64,
    },
    // (x1, y1) is the arc's start point.
    Arc {
        x1: f64,
        y1: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    },
    RoundRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: Option<f64>,
        ry: Option<f64>,
    },
}

impl PathSegment {
    /// Terminal point; the anchor the next relative command builds on.
    pub fn end(&self) -> Point {
        match *self {
            PathSegment::Move { x, y }
            | PathSegment::Line { x, y }
            | PathSegment::Quadratic { x, y, .. }
            | PathSegment::Cubic { x, y, .. }
            | PathSegment::Arc { x, y, .. }
            | PathSegment::RoundRect { x, y, .. } => Point { x, y },
        }
    }

    /// Last control point, or the anchor for segments without one.
    pub fn control(&self) -> Point {
        match *self {
            PathSegment::Quadratic { cx, cy, .. } => Point { x: cx, y: cy },
            PathSegment::Cubic { c2x, c2y, .. } => Point { x: c2x, y: c2y },
            _ => self.end(),
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, PathSegment::Move { .. })
    }

    /// Establish the pen at this segment's anchor without drawing.
    pub fn seed(&self, gfx: &mut dyn Gfx, ctx: &mut RenderContext) {
        let p = self.end();
        ctx.start_subpath(p.x, p.y);
        gfx.move_to(ctx.last.x, ctx.last.y);
    }

    pub fn emit(&self, gfx: &mut dyn Gfx, ctx: &mut RenderContext) {
        match *self {
            PathSegment::Move { .. } => self.seed(gfx, ctx),
            PathSegment::Line { x, y } => {
                ctx.set_last(x, y);
                gfx.line_to(ctx.last.x, ctx.last.y);
            }
            PathSegment::Quadratic { cx, cy, x, y } => {
                let c = ctx.trans(cx, cy);
                ctx.set_last(x, y);
                gfx.curve_to(c.x, c.y, ctx.last.x, ctx.last.y);
            }
            PathSegment::Cubic {
                c1x,
                c1y,
                c2x,
                c2y,
                x,
                y,
            } => {
                if !gfx.supports_cubics() {
                    for quad in self.to_quadratics(ctx.local) {
                        quad.emit(gfx, ctx);
                    }
                    return;
                }
                let c1 = ctx.trans(c1x, c1y);
                let c2 = ctx.trans(c2x, c2y);
                ctx.set_last(x, y);
                gfx.cubic_curve_to(c1.x, c1.y, c2.x, c2.y, ctx.last.x, ctx.last.y);
            }
            PathSegment::Arc {
                x1,
                y1,
                rx,
                ry,
                rotation,
                large_arc,
                sweep,
                x,
                y,
            } => {
                let arc = ArcParams {
                    start: Point { x: x1, y: y1 },
                    end: Point { x, y },
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                };
                arc.emit(gfx, ctx);
            }
            PathSegment::RoundRect {
                x,
                y,
                width,
                height,
                rx,
                ry,
            } => emit_round_rect(gfx, ctx, x, y, width, height, rx, ry),
        }
    }

    /// Approximate a cubic starting at `start` with four quadratics using
    /// fixed 3/8 and 3/4 interpolation. Non-cubic segments come back as-is.
    pub fn to_quadratics(&self, start: Point) -> Vec<PathSegment> {
        let PathSegment::Cubic {
            c1x,
            c1y,
            c2x,
            c2y,
            x,
            y,
        } = *self
        else {
            return vec![*self];
        };
        let p0 = start;
        let c1 = Point { x: c1x, y: c1y };
        let c2 = Point { x: c2x, y: c2y };
        let p3 = Point { x, y };

        let pa = p0.lerp(c1, 0.75);
        let pb = p3.lerp(c2, 0.75);
        // 1/16 of the chord.
        let dx = (p3.x - p0.x) / 16.0;
        let dy = (p3.y - p0.y) / 16.0;

        let q1 = p0.lerp(c1, 3.0 / 8.0);
        let mut q2 = pa.lerp(pb, 3.0 / 8.0);
        q2.x -= dx;
        q2.y -= dy;
        let mut q3 = pb.lerp(pa, 3.0 / 8.0);
        q3.x += dx;
        q3.y += dy;
        let q4 = p3.lerp(c2, 3.0 / 8.0);

        let a1 = q1.midpoint(q2);
        let a2 = pa.midpoint(pb);
        let a3 = q3.midpoint(q4);

        vec![
            quad(q1, a1),
            quad(q2, a2),
            quad(q3, a3),
            quad(q4, p3),
        ]
    }
}

fn quad(c: Point, p: Point) -> PathSegment {
    PathSegment::Quadratic {
        cx: c.x,
        cy: c.y,
        x: p.x,
        y: p.y,
    }
}

/// Elliptical arc in endpoint form.
#[derive(Debug, Clone, Copy)]
struct ArcParams {
    start: Point,
    end: Point,
    rx: f64,
    ry: f64,
    // Degrees.
    rotation: f64,
    large_arc: bool,
    sweep: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcCenter {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
    cos_phi: f64,
    sin_phi: f64,
    theta: f64,
    dtheta: f64,
}

impl ArcCenter {
    fn point_at(&self, t: f64) -> Point {
        let (s, c) = (libm::sin(t), libm::cos(t));
        Point {
            x: self.cx + self.rx * c * self.cos_phi - self.ry * s * self.sin_phi,
            y: self.cy + self.rx * c * self.sin_phi + self.ry * s * self.cos_phi,
        }
    }
}

impl ArcParams {
    // Endpoint to center conversion, SVG implementation notes F.6.5/F.6.6.
    // None when the arc degenerates to a straight line.
    fn center(&self) -> Option<ArcCenter> {
        let mut rx = self.rx.abs();
        let mut ry = self.ry.abs();
        if rx == 0.0 || ry == 0.0 || self.start == self.end {
            return None;
        }
        let phi = self.rotation.to_radians();
        let cos_phi = libm::cos(phi);
        let sin_phi = libm::sin(phi);

        let dx = (self.start.x - self.end.x) * 0.5;
        let dy = (self.start.y - self.end.y) * 0.5;
        let x1p = cos_phi * dx + sin_phi * dy;
        let y1p = -sin_phi * dx + cos_phi * dy;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = libm::sqrt(lambda);
            rx *= s;
            ry *= s;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        if den == 0.0 {
            return None;
        }
        let mut coef = libm::sqrt((num / den).max(0.0));
        if self.large_arc == self.sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;

        let cx = cos_phi * cxp - sin_phi * cyp + (self.start.x + self.end.x) * 0.5;
        let cy = sin_phi * cxp + cos_phi * cyp + (self.start.y + self.end.y) * 0.5;

        let theta = libm::atan2((y1p - cyp) / ry, (x1p - cxp) / rx);
        let mut dtheta = libm::atan2((-y1p - cyp) / ry, (-x1p - cxp) / rx) - theta;
        if self.sweep && dtheta < 0.0 {
            dtheta += std::f64::consts::TAU;
        } else if !self.sweep && dtheta > 0.0 {
            dtheta -= std::f64::consts::TAU;
        }

        let center = ArcCenter {
            cx,
            cy,
            rx,
            ry,
            cos_phi,
            sin_phi,
            theta,
            dtheta,
        };
        let finite = [cx, cy, theta, dtheta].iter().all(|v| v.is_finite());
        finite.then_some(center)
    }

    fn emit(&self, gfx: &mut dyn Gfx, ctx: &mut RenderContext) {
        ctx.set_last(self.end.x, self.end.y);
        let Some(arc) = self.center() else {
            gfx.line_to(ctx.last.x, ctx.last.y);
            return;
        };
        let steps = arc_steps(&arc, ctx);
        for i in 1..steps {
            let t = arc.theta + arc.dtheta * (i as f64) / (steps as f64);
            let p = arc.point_at(t);
            let p = ctx.trans(p.x, p.y);
            gfx.line_to(p.x, p.y);
        }
        gfx.line_to(ctx.last.x, ctx.last.y);
    }
}

// Step count follows the transformed radius so density tracks zoom.
fn arc_steps(arc: &ArcCenter, ctx: &RenderContext) -> usize {
    let m = &ctx.matrix;
    let (ux, uy) = (arc.rx * arc.cos_phi, arc.rx * arc.sin_phi);
    let (vx, vy) = (-arc.ry * arc.sin_phi, arc.ry * arc.cos_phi);
    let txc = m.a * ux + m.c * uy;
    let tyc = m.b * ux + m.d * uy;
    let txs = m.a * vx + m.c * vy;
    let tys = m.b * vx + m.d * vy;
    let radius = libm::sqrt(txc * txc + txs * txs + tyc * tyc + tys * tys);
    let len = arc.dtheta.abs() * radius * ARC_STEP_DENSITY;
    if !len.is_finite() {
        return 1;
    }
    (libm::round(len) as usize).clamp(1, MAX_ARC_STEPS)
}

#[allow(clippy::too_many_arguments)]
fn emit_round_rect(
    gfx: &mut dyn Gfx,
    ctx: &mut RenderContext,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    rx: Option<f64>,
    ry: Option<f64>,
) {
    let rx = rx.or(ry).unwrap_or(0.0).clamp(0.0, (w / 2.0).max(0.0));
    let ry = ry.or(Some(rx)).unwrap_or(0.0).clamp(0.0, (h / 2.0).max(0.0));
    ctx.set_last(x, y);

    let uniform = rx == ry && (rx == 0.0 || ctx.matrix.a == ctx.matrix.d);
    if uniform && ctx.keeps_rects() {
        let m = ctx.matrix;
        gfx.rect(ctx.last.x, ctx.last.y, w * m.a, h * m.d, rx * m.a);
        return;
    }

    if rx == 0.0 && ry == 0.0 {
        let p = ctx.trans(x, y);
        gfx.move_to(p.x, p.y);
        for (px, py) in [(x + w, y), (x + w, y + h), (x, y + h), (x, y)] {
            let p = ctx.trans(px, py);
            gfx.line_to(p.x, p.y);
        }
        return;
    }
    let p = ctx.trans(x, y + ry);
    gfx.move_to(p.x, p.y);
    let corners = [
        ((x, y), (x + rx, y), (x + w - rx, y)),
        ((x + w, y), (x + w, y + ry), (x + w, y + h - ry)),
        ((x + w, y + h), (x + w - rx, y + h), (x + rx, y + h)),
        ((x, y + h), (x, y + h - ry), (x, y + ry)),
    ];
    for (corner, arc_end, edge_end) in corners {
        let c = ctx.trans(corner.0, corner.1);
        let p = ctx.trans(arc_end.0, arc_end.1);
        gfx.curve_to(c.x, c.y, p.x, p.y);
        let e = ctx.trans(edge_end.0, edge_end.1);
        gfx.line_to(e.x, e.y);
    }
}
