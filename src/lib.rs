mod canvas;
mod context;
mod debug;
mod document;
mod error;
mod extent;
mod gfx;
mod path_data;
mod points;
mod render;
mod scene;
mod segment;
mod style;
mod text_finder;
mod types;

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

pub use canvas::{CanvasRenderer, Command};
pub use context::RenderContext;
pub use debug::DebugLogger;
pub use error::SvgError;
pub use extent::ExtentAccumulator;
pub use gfx::{Gfx, LineStyle};
pub use path_data::{ParsedPath, ParserState, PathCommand, PathParser};
pub use points::PointSampler;
pub use render::{ElementFilter, SvgRenderer, WalkOptions};
pub use scene::{
    CapsStyle, Element, FillSpec, Gradient, GradientFill, GradientKind, GradientStop, Group,
    Interpolation, JointStyle, ParseWarning, Path, SpreadMethod, SvgData, Text, TextAlign,
    WarningKind,
};
pub use segment::PathSegment;
pub use style::{ParsedTransform, parse_color, parse_transform};
pub use text_finder::TextFinder;
pub use types::{Color, Point, Pt, Rect, Rgba, ScaleRect, Transform};

/// Configured SVG parser.
#[derive(Debug, Clone, Default)]
pub struct SvgLoader {
    parser: PathParser,
    debug: Option<Arc<DebugLogger>>,
}

impl SvgLoader {
    pub fn builder() -> SvgLoaderBuilder {
        SvgLoaderBuilder::new()
    }

    pub fn parse(&self, text: &str) -> Result<SvgData, SvgError> {
        let result = document::load_document(text, self.parser, self.debug.as_deref());
        if let Some(logger) = self.debug.as_deref() {
            if let Err(err) = &result {
                let json = format!(
                    "{{\"type\":\"svg.error\",\"message\":\"{}\"}}",
                    debug::json_escape(&err.to_string())
                );
                logger.log_json(&json);
            }
            logger.flush();
        }
        result
    }

    pub fn parse_file(&self, path: impl AsRef<FsPath>) -> Result<SvgData, SvgError> {
        let text = std::fs::read_to_string(path)?;
        self.parse(&text)
    }

    pub fn debug_logger(&self) -> Option<&DebugLogger> {
        self.debug.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SvgLoaderBuilder {
    convert_cubics: bool,
    reverse_clockwise: bool,
    debug_path: Option<PathBuf>,
    debug_memory: bool,
}

impl SvgLoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten cubic curves into quadratics while parsing.
    pub fn convert_cubics(mut self, enabled: bool) -> Self {
        self.convert_cubics = enabled;
        self
    }

    /// Reverse `d` outlines whose subpaths all wind clockwise.
    pub fn reverse_clockwise(mut self, enabled: bool) -> Self {
        self.reverse_clockwise = enabled;
        self
    }

    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn debug_memory(mut self) -> Self {
        self.debug_memory = true;
        self
    }

    pub fn build(self) -> Result<SvgLoader, SvgError> {
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else if self.debug_memory {
            Some(Arc::new(DebugLogger::in_memory()))
        } else {
            None
        };
        Ok(SvgLoader {
            parser: PathParser::new(self.convert_cubics, self.reverse_clockwise),
            debug,
        })
    }
}

/// A parsed document with default loader settings.
#[derive(Debug, Clone)]
pub struct Svg {
    data: SvgData,
}

impl Svg {
    pub fn parse(text: &str) -> Result<Self, SvgError> {
        let data = SvgLoader::default().parse(text)?;
        Ok(Self { data })
    }

    pub fn data(&self) -> &SvgData {
        &self.data
    }

    pub fn renderer(&self) -> SvgRenderer<'_> {
        SvgRenderer::new(&self.data)
    }

    /// Render at `(x, y)`, optionally stretched to `size`, optionally
    /// restricted to one layer.
    pub fn render(
        &self,
        x: f64,
        y: f64,
        size: Option<(f64, f64)>,
        layer: Option<&str>,
    ) -> Result<CanvasRenderer, SvgError> {
        let mut matrix = Transform::translate(x, y);
        if let Some((width, height)) = size {
            if self.data.width > 0.0 && self.data.height > 0.0 {
                matrix = matrix.append(Transform::scale(
                    width / self.data.width,
                    height / self.data.height,
                ));
            }
        }
        let renderer = match layer {
            Some(name) => SvgRenderer::with_layer(&self.data, name)?,
            None => SvgRenderer::new(&self.data),
        };
        Ok(renderer.render_to_canvas(matrix))
    }
}
