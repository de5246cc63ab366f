use rayon::prelude::*;

use crate::canvas::CanvasRenderer;
use crate::context::RenderContext;
use crate::error::SvgError;
use crate::extent::ExtentAccumulator;
use crate::gfx::{Gfx, LineStyle};
use crate::points::PointSampler;
use crate::scene::{Element, FillSpec, Group, Path, SvgData, Text};
use crate::text_finder::TextFinder;
use crate::types::{Rect, ScaleRect, Transform};

/// Element filter: receives the element name and the names of the groups
/// enclosing it, outermost first.
pub type ElementFilter<'f> = Box<dyn Fn(&str, &[&str]) -> bool + Send + Sync + 'f>;

/// Settings for one walk over the scene.
pub struct WalkOptions<'f> {
    pub matrix: Transform,
    pub filter: Option<ElementFilter<'f>>,
    pub scale: Option<ScaleRect>,
    // None walks hidden groups exactly when a filter is set.
    pub include_hidden: Option<bool>,
}

impl Default for WalkOptions<'_> {
    fn default() -> Self {
        Self {
            matrix: Transform::identity(),
            filter: None,
            scale: None,
            include_hidden: None,
        }
    }
}

impl<'f> WalkOptions<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn matrix(mut self, matrix: Transform) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&str, &[&str]) -> bool + Send + Sync + 'f,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn scale(mut self, scale: ScaleRect) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = Some(include);
        self
    }

    fn skips_hidden(&self) -> bool {
        !self.include_hidden.unwrap_or(self.filter.is_some())
    }

    fn accepts(&self, name: &str, groups: &[&str]) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(name, groups))
    }
}

/// Walks a parsed document, or one named group of it, into a drawing sink.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer<'a> {
    data: &'a SvgData,
    root: &'a Group,
}

impl<'a> SvgRenderer<'a> {
    pub fn new(data: &'a SvgData) -> Self {
        Self {
            data,
            root: &data.root,
        }
    }

    /// Bind to the group named `layer` anywhere below the document root.
    pub fn with_layer(data: &'a SvgData, layer: &str) -> Result<Self, SvgError> {
        let root = data
            .find_group(layer)
            .ok_or_else(|| SvgError::UnknownLayer(layer.to_string()))?;
        Ok(Self { data, root })
    }

    pub fn width(&self) -> f64 {
        self.data.width
    }

    pub fn height(&self) -> f64 {
        self.data.height
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.root.has_group(name)
    }

    /// Drive `gfx` through the scene: `size` first, then every visible
    /// element in document order, then `eof`.
    pub fn render(&self, gfx: &mut dyn Gfx, options: &WalkOptions<'_>) {
        let mut walk = Walk {
            data: self.data,
            options,
            skip_hidden: options.skips_hidden(),
            groups: Vec::new(),
        };
        gfx.size(self.data.width, self.data.height);
        walk.group(gfx, self.root);
        gfx.eof();
    }

    pub fn render_to_canvas(&self, matrix: Transform) -> CanvasRenderer {
        self.render_with(&WalkOptions::new().matrix(matrix))
    }

    pub fn render_with(&self, options: &WalkOptions<'_>) -> CanvasRenderer {
        let mut canvas = CanvasRenderer::new();
        self.render(&mut canvas, options);
        canvas
    }

    /// Render so that the origin of `bounds` lands on the origin of `target`.
    /// With a nine-slice guide the guide region stretches so the output
    /// fills `target`.
    pub fn render_rect(&self, bounds: Rect, target: Rect, scale9: Option<Rect>) -> CanvasRenderer {
        let matrix = Transform::translate(target.x - bounds.x, target.y - bounds.y);
        self.render_with(&rect_options(matrix, bounds, target, scale9))
    }

    /// Like [`render_rect`](Self::render_rect) but the output starts at the
    /// sink origin, ignoring the target position.
    pub fn render_rect_at_origin(
        &self,
        bounds: Rect,
        target: Rect,
        scale9: Option<Rect>,
    ) -> CanvasRenderer {
        let matrix = Transform::translate(-bounds.x, -bounds.y);
        self.render_with(&rect_options(matrix, bounds, target, scale9))
    }

    pub fn extent(&self, options: &WalkOptions<'_>) -> Option<Rect> {
        let mut acc = ExtentAccumulator::new();
        self.render(&mut acc, options);
        acc.into_extent()
    }

    /// First text leaf in document order; hidden groups are searched.
    pub fn find_text(&self) -> Option<Text> {
        self.first_text(&WalkOptions::new().include_hidden(true))
    }

    /// First text leaf accepted by `filter`; hidden groups are searched.
    pub fn find_text_with<F>(&self, filter: F) -> Option<Text>
    where
        F: Fn(&str, &[&str]) -> bool + Send + Sync,
    {
        self.first_text(&WalkOptions::new().include_hidden(true).filter(filter))
    }

    fn first_text(&self, options: &WalkOptions<'_>) -> Option<Text> {
        let mut finder = TextFinder::new();
        self.render(&mut finder, options);
        finder.into_text()
    }

    pub fn render_points(&self, options: &WalkOptions<'_>) -> PointSampler {
        let mut sampler = PointSampler::new();
        self.render(&mut sampler, options);
        sampler
    }

    /// Extent of every element whose second-level group name satisfies
    /// `matches`.
    pub fn matching_rect<F>(&self, matches: F) -> Option<Rect>
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let options = WalkOptions::new()
            .include_hidden(true)
            .filter(move |_, groups: &[&str]| groups.get(1).is_some_and(|name| matches(*name)));
        self.extent(&options)
    }

    /// Extent of the nine-slice guide group `guide`.
    pub fn scale9_rect(&self, guide: &str) -> Option<Rect> {
        self.matching_rect(|name| name == guide)
    }

    /// Render everything except the guide, stretched to `width` x `height`
    /// around the region the guide marks.
    pub fn render_scale9(
        &self,
        guide: &str,
        width: f64,
        height: f64,
    ) -> Result<CanvasRenderer, SvgError> {
        let scale9 = self
            .scale9_rect(guide)
            .ok_or_else(|| SvgError::UnknownLayer(guide.to_string()))?;
        let not_guide = |_: &str, groups: &[&str]| groups.get(1).is_none_or(|name| *name != guide);
        let bounds = self
            .extent(&WalkOptions::new().include_hidden(false).filter(not_guide))
            .unwrap_or(scale9);
        let target = Rect::new(0.0, 0.0, width, height);
        let options = rect_options(
            Transform::translate(-bounds.x, -bounds.y),
            bounds,
            target,
            Some(scale9),
        )
        .include_hidden(false)
        .filter(not_guide);
        Ok(self.render_with(&options))
    }

    /// Render only the elements named `name`.
    pub fn named_shape(&self, name: &str) -> CanvasRenderer {
        self.render_with(&WalkOptions::new().filter(move |n, _| n == name))
    }

    pub fn named_extent(&self, name: &str) -> Option<Rect> {
        self.extent(&WalkOptions::new().filter(move |n, _| n == name))
    }

    /// Extent of each direct child group, computed in parallel.
    pub fn layer_extents(&self) -> Vec<(String, Option<Rect>)> {
        let layers: Vec<&Group> = self.root.groups().collect();
        layers
            .par_iter()
            .map(|layer| {
                let renderer = SvgRenderer {
                    data: self.data,
                    root: layer,
                };
                let extent = renderer.extent(&WalkOptions::new().include_hidden(true));
                (layer.name.clone(), extent)
            })
            .collect()
    }
}

fn rect_options<'f>(
    matrix: Transform,
    bounds: Rect,
    target: Rect,
    scale9: Option<Rect>,
) -> WalkOptions<'f> {
    let options = WalkOptions::new().matrix(matrix);
    match scale9 {
        Some(guide) => options.scale(ScaleRect::new(
            guide,
            target.width - (bounds.width - guide.width),
            target.height - (bounds.height - guide.height),
        )),
        None => options,
    }
}

struct Walk<'w, 'o> {
    data: &'w SvgData,
    options: &'w WalkOptions<'o>,
    skip_hidden: bool,
    groups: Vec<&'w str>,
}

impl<'w> Walk<'w, '_> {
    fn group(&mut self, gfx: &mut dyn Gfx, group: &'w Group) {
        if self.skip_hidden && group.is_hidden() {
            return;
        }
        self.groups.push(&group.name);
        for child in &group.children {
            match child {
                Element::Group(sub) => self.group(gfx, sub),
                Element::Path(path) => self.path(gfx, path),
                Element::Text(text) => self.text(gfx, text),
            }
        }
        self.groups.pop();
    }

    fn text(&self, gfx: &mut dyn Gfx, text: &Text) {
        if !self.options.accepts(&text.name, &self.groups) {
            return;
        }
        gfx.render_text(text, &self.options.matrix.append(text.matrix));
    }

    fn path(&self, gfx: &mut dyn Gfx, path: &Path) {
        if !self.options.accepts(&path.name, &self.groups) {
            return;
        }
        let Some(first) = path.segments.first() else {
            return;
        };
        let matrix = self.options.matrix.append(path.matrix);
        let mut ctx = RenderContext::new(matrix, self.options.scale);

        if !gfx.geometry_only() {
            // Position the pen before any fill starts so the fill does not
            // pick up a segment from wherever the previous path ended.
            first.seed(gfx, &mut ctx);
            match &path.fill {
                FillSpec::Gradient(id) => match self.data.gradient(id) {
                    Some(gradient) => {
                        let mut fill = gradient.resolve(&matrix);
                        let alpha = path.fill_alpha * path.alpha;
                        fill.alphas.iter_mut().for_each(|a| *a *= alpha);
                        gfx.begin_gradient_fill(&fill);
                    }
                    None => log::warn!("unknown gradient at render time: {}", id),
                },
                FillSpec::Solid(color) => gfx.begin_fill(*color, path.fill_alpha * path.alpha),
                FillSpec::None => {}
            }
            if let Some(color) = path.stroke_color {
                gfx.line_style(&LineStyle {
                    thickness: path.stroke_width * matrix.stroke_scale(),
                    color,
                    alpha: path.stroke_alpha * path.alpha,
                    caps: path.stroke_caps,
                    joint: path.joint_style,
                    miter_limit: path.miter_limit,
                });
            }
        }

        for segment in &path.segments {
            segment.emit(gfx, &mut ctx);
        }
        // Stroke ends first so a fill's implicit close is never stroked.
        gfx.end_line_style();
        gfx.end_fill();
    }
}
