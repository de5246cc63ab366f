use crate::gfx::Gfx;
use crate::scene::Text;
use crate::types::Transform;

/// Keeps the first text leaf the walk reaches; path geometry is ignored.
#[derive(Debug, Clone, Default)]
pub struct TextFinder {
    found: Option<Text>,
}

impl TextFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<&Text> {
        self.found.as_ref()
    }

    pub fn into_text(self) -> Option<Text> {
        self.found
    }
}

impl Gfx for TextFinder {
    fn geometry_only(&self) -> bool {
        true
    }

    fn render_text(&mut self, text: &Text, _matrix: &Transform) {
        if self.found.is_none() {
            self.found = Some(text.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::load_document;
    use crate::path_data::PathParser;
    use crate::render::{SvgRenderer, WalkOptions};

    #[test]
    fn first_text_wins_and_paths_are_ignored() {
        let data = load_document(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
                <path d="M0 0 L5 5"/>
                <text id="a" x="1" y="2">first</text>
                <text id="b">second</text>
            </svg>"##,
            PathParser::default(),
            None,
        )
        .expect("parse");
        let mut finder = TextFinder::new();
        SvgRenderer::new(&data).render(&mut finder, &WalkOptions::new());
        let text = finder.into_text().expect("text");
        assert_eq!(text.text, "first");
        assert_eq!((text.x, text.y), (1.0, 2.0));
    }
}
