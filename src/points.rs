use crate::canvas::CanvasRenderer;
use crate::gfx::Gfx;
use crate::types::{Color, Point};

const SAMPLE_GAP: f64 = 10.0;
const DOT_RADIUS: f64 = SAMPLE_GAP / 2.0;
// Parameter spans below this are not split further.
const MIN_SPAN: f64 = 1.0 / 65536.0;

/// Debug sink that drops a dot at sampled curve positions so curve density
/// can be inspected. Curves are split until neighbouring samples are closer
/// than the gap.
#[derive(Debug, Clone)]
pub struct PointSampler {
    canvas: CanvasRenderer,
    prev: Point,
    points: Vec<Point>,
}

impl Default for PointSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSampler {
    pub fn new() -> Self {
        let mut canvas = CanvasRenderer::new();
        canvas.begin_fill(Color::BLACK, 1.0);
        Self {
            canvas,
            prev: Point::ORIGIN,
            points: Vec::new(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn canvas(&self) -> &CanvasRenderer {
        &self.canvas
    }

    pub fn into_canvas(self) -> CanvasRenderer {
        self.canvas
    }

    fn draw_point(&mut self, p: Point) {
        if self.points.last() == Some(&p) {
            return;
        }
        self.points.push(p);
        self.canvas.circle(p.x, p.y, DOT_RADIUS);
        self.canvas.move_to(p.x, p.y);
    }

    fn sample(&mut self, eval: impl Fn(f64) -> Point) {
        let mut spans = vec![(0.0, 1.0)];
        while let Some((from, to)) = spans.pop() {
            let t = from + (to - from) / 2.0;
            let first = eval(from);
            let second = eval(to);
            let mid = eval(t);
            self.draw_point(mid);
            if to - from <= MIN_SPAN {
                continue;
            }
            if first.distance(mid) >= SAMPLE_GAP {
                spans.push((from, t));
            }
            if mid.distance(second) >= SAMPLE_GAP {
                spans.push((t, to));
            }
        }
    }
}

fn quadratic(t: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    let u = 1.0 - t;
    u * u * p1 + 2.0 * u * t * p2 + t * t * p3
}

fn cubic(t: f64, p1: f64, p2: f64, p3: f64, p4: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p1 + 3.0 * u * u * t * p2 + 3.0 * u * t * t * p3 + t * t * t * p4
}

impl Gfx for PointSampler {
    fn size(&mut self, width: f64, height: f64) {
        self.canvas.size(width, height);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.prev = Point::new(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.draw_point(self.prev);
        let end = Point::new(x, y);
        self.draw_point(end);
        self.prev = end;
    }

    fn curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        let p0 = self.prev;
        self.draw_point(p0);
        self.sample(|t| Point::new(quadratic(t, p0.x, cx, x), quadratic(t, p0.y, cy, y)));
        let end = Point::new(x, y);
        self.draw_point(end);
        self.prev = end;
    }

    fn cubic_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        let p0 = self.prev;
        self.draw_point(p0);
        self.sample(|t| {
            Point::new(
                cubic(t, p0.x, c1x, c2x, x),
                cubic(t, p0.y, c1y, c2y, y),
            )
        });
        let end = Point::new(x, y);
        self.draw_point(end);
        self.prev = end;
    }

    fn rect(&mut self, x: f64, y: f64, _width: f64, _height: f64, _radius: f64) {
        self.move_to(x, y);
    }

    fn eof(&mut self) {
        self.canvas.end_fill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;

    #[test]
    fn lines_are_sampled_at_their_endpoints() {
        let mut sampler = PointSampler::new();
        sampler.move_to(0.0, 0.0);
        sampler.line_to(100.0, 0.0);
        sampler.line_to(100.0, 50.0);
        assert_eq!(
            sampler.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 50.0)
            ]
        );
    }

    #[test]
    fn cubic_samples_close_the_gap() {
        let mut sampler = PointSampler::new();
        sampler.move_to(0.0, 0.0);
        sampler.cubic_curve_to(0.0, 100.0, 100.0, 100.0, 100.0, 0.0);

        let mut xs: Vec<Point> = sampler.points().to_vec();
        xs.sort_by(|a, b| a.x.total_cmp(&b.x));
        assert!(xs.len() > 10, "expected dense sampling, got {}", xs.len());
        for pair in xs.windows(2) {
            assert!(
                pair[0].distance(pair[1]) < SAMPLE_GAP * 2.0,
                "gap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }

        let circles = sampler
            .canvas()
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Circle { .. }))
            .count();
        assert_eq!(circles, sampler.points().len());
        assert!(matches!(sampler.canvas().commands()[0], Command::BeginFill(_)));
    }
}
