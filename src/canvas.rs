use crate::gfx::{Gfx, LineStyle};
use crate::scene::{
    CapsStyle, FillSpec, GradientFill, GradientKind, Interpolation, JointStyle, SpreadMethod, Text,
    TextAlign,
};
use crate::types::{Color, Pt, Rgba, Transform};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginFill(Rgba),
    BeginGradient {
        kind: GradientKind,
        // (color, ratio) pairs in stop order.
        stops: Vec<(Rgba, u8)>,
        matrix: Transform,
        spread: SpreadMethod,
        interp: Interpolation,
        focus: f64,
    },
    LineStyle {
        thickness: Pt,
        color: Rgba,
        caps: CapsStyle,
        joint: JointStyle,
        miter_limit: Pt,
    },
    MoveTo {
        x: Pt,
        y: Pt,
    },
    LineTo {
        x: Pt,
        y: Pt,
    },
    QuadTo {
        cx: Pt,
        cy: Pt,
        x: Pt,
        y: Pt,
    },
    CubicTo {
        c1x: Pt,
        c1y: Pt,
        c2x: Pt,
        c2y: Pt,
        x: Pt,
        y: Pt,
    },
    RoundRect {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        radius: Pt,
    },
    EndFill,
    EndLine,
    Text {
        x: Pt,
        y: Pt,
        text: String,
        font_family: String,
        font_size: Pt,
        align: TextAlign,
        color: Rgba,
    },
    Circle {
        x: Pt,
        y: Pt,
        radius: Pt,
    },
}

/// Records drawing calls as backend commands. Every solid fill and stroke
/// remembers the color it was parsed with, so a palette entry can be
/// swapped after rendering.
#[derive(Debug, Clone, Default)]
pub struct CanvasRenderer {
    commands: Vec<Command>,
    // (parsed color, index into `commands`)
    colors: Vec<(Color, usize)>,
    size: Option<(f64, f64)>,
}

fn pt(v: f64) -> Pt {
    Pt::from_f64(v)
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }

    /// Document size reported by the last walk.
    pub fn document_size(&self) -> Option<(f64, f64)> {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn circle(&mut self, x: f64, y: f64, radius: f64) {
        self.commands.push(Command::Circle {
            x: pt(x),
            y: pt(y),
            radius: pt(radius),
        });
    }

    /// Rewrite every fill, stroke and text color parsed as `from` to `to`,
    /// keeping alpha.
    /// Returns the number of commands changed.
    pub fn replace_color(&mut self, from: Color, to: Color) -> usize {
        let mut changed = 0;
        for (color, idx) in &self.colors {
            if *color != from {
                continue;
            }
            match self.commands.get_mut(*idx) {
                Some(Command::BeginFill(rgba))
                | Some(Command::LineStyle { color: rgba, .. })
                | Some(Command::Text { color: rgba, .. }) => {
                    rgba.color = to;
                    changed += 1;
                }
                _ => {}
            }
        }
        changed
    }

    fn push_tracked(&mut self, color: Color, command: Command) {
        self.colors.push((color, self.commands.len()));
        self.commands.push(command);
    }
}

impl Gfx for CanvasRenderer {
    fn size(&mut self, width: f64, height: f64) {
        self.size = Some((width, height));
    }

    fn begin_gradient_fill(&mut self, fill: &GradientFill) {
        let stops = fill
            .colors
            .iter()
            .zip(&fill.alphas)
            .zip(&fill.ratios)
            .map(|((color, alpha), ratio)| (Rgba::new(*color, *alpha), *ratio))
            .collect();
        self.commands.push(Command::BeginGradient {
            kind: fill.kind,
            stops,
            matrix: fill.matrix,
            spread: fill.spread,
            interp: fill.interp,
            focus: fill.focus,
        });
    }

    fn begin_fill(&mut self, color: Color, alpha: f64) {
        self.push_tracked(color, Command::BeginFill(Rgba::new(color, alpha)));
    }

    fn end_fill(&mut self) {
        self.commands.push(Command::EndFill);
    }

    fn line_style(&mut self, style: &LineStyle) {
        self.push_tracked(
            style.color,
            Command::LineStyle {
                thickness: pt(style.thickness),
                color: Rgba::new(style.color, style.alpha),
                caps: style.caps,
                joint: style.joint,
                miter_limit: pt(style.miter_limit),
            },
        );
    }

    fn end_line_style(&mut self) {
        self.commands.push(Command::EndLine);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(Command::MoveTo { x: pt(x), y: pt(y) });
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(Command::LineTo { x: pt(x), y: pt(y) });
    }

    fn curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.commands.push(Command::QuadTo {
            cx: pt(cx),
            cy: pt(cy),
            x: pt(x),
            y: pt(y),
        });
    }

    fn cubic_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.commands.push(Command::CubicTo {
            c1x: pt(c1x),
            c1y: pt(c1y),
            c2x: pt(c2x),
            c2y: pt(c2y),
            x: pt(x),
            y: pt(y),
        });
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, radius: f64) {
        self.commands.push(Command::RoundRect {
            x: pt(x),
            y: pt(y),
            width: pt(width),
            height: pt(height),
            radius: pt(radius),
        });
    }

    fn render_text(&mut self, text: &Text, matrix: &Transform) {
        let (x, y) = matrix.apply(text.x, text.y);
        let color = match &text.fill {
            FillSpec::Solid(color) => *color,
            _ => Color::BLACK,
        };
        let command = Command::Text {
            x: pt(x),
            y: pt(y),
            text: text.text.clone(),
            font_family: text.font_family.clone(),
            font_size: pt(text.font_size * matrix.scale_factor()),
            align: text.text_align,
            color: Rgba::new(color, text.fill_alpha * text.alpha),
        };
        self.push_tracked(color, command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_rounds_up_to_the_next_byte() {
        let mut canvas = CanvasRenderer::new();
        canvas.begin_fill(Color::rgb(1, 2, 3), 0.5);
        assert_eq!(
            canvas.commands()[0],
            Command::BeginFill(Rgba {
                color: Color::rgb(1, 2, 3),
                alpha: 128
            })
        );
    }

    #[test]
    fn replace_color_swaps_fills_and_strokes_but_keeps_alpha() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let mut canvas = CanvasRenderer::new();
        canvas.begin_fill(red, 0.5);
        canvas.move_to(0.0, 0.0);
        canvas.end_fill();
        canvas.line_style(&LineStyle {
            color: red,
            ..LineStyle::default()
        });
        canvas.begin_fill(Color::BLACK, 1.0);

        assert_eq!(canvas.replace_color(red, blue), 2);
        assert_eq!(
            canvas.commands()[0],
            Command::BeginFill(Rgba {
                color: blue,
                alpha: 128
            })
        );
        assert!(matches!(
            canvas.commands()[3],
            Command::LineStyle { color: Rgba { color, alpha: 255 }, .. } if color == blue
        ));
        // Matching is against the parsed color, so a second swap still applies.
        assert_eq!(canvas.replace_color(red, Color::BLACK), 2);
        assert_eq!(canvas.replace_color(blue, red), 0);
    }

    #[test]
    fn coordinates_are_quantized() {
        let mut canvas = CanvasRenderer::new();
        canvas.line_to(1.00049, 2.0);
        let Command::LineTo { x, y } = canvas.commands()[0] else {
            panic!("expected line");
        };
        assert_eq!(x.to_milli_i64(), 1000);
        assert_eq!(y.to_milli_i64(), 2000);
    }
}
