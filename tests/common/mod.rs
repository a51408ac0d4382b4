//! Shared helpers for the integration tests
//!
//! Layout needs fonts; the tests use a deterministic monospaced fake face
//! so no font binaries are required: every codepoint becomes one glyph
//! whose id is the codepoint value, advancing 10 px (640 units), with a
//! 10 px ascender and 4 px descender. Right-to-left requests reverse the
//! glyph order, exactly like a real shaper.

// each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::sync::Arc;

use paraflow::{
    AttributeIndex, CodepointAttributes, DrawCommand, FontFace, FontSet, InlineObject, Result,
    Shape, ShapeRequest, ShapedGlyph, TextLayout,
};

pub const ADVANCE: i32 = 640;
pub const ASCENDER: i32 = 640;
pub const DESCENDER: i32 = -256;
pub const LINE_HEIGHT: i32 = ASCENDER - DESCENDER;

pub struct FakeFont {
    missing: Vec<char>,
    y_advance: i32,
    no_glyphs: bool,
}

impl FakeFont {
    pub fn new() -> Self {
        Self {
            missing: Vec::new(),
            y_advance: 0,
            no_glyphs: false,
        }
    }

    #[allow(dead_code)]
    pub fn without_glyph(mut self, codepoint: char) -> Self {
        self.missing.push(codepoint);
        self
    }

    #[allow(dead_code)]
    pub fn with_y_advance(mut self, y_advance: i32) -> Self {
        self.y_advance = y_advance;
        self
    }

    #[allow(dead_code)]
    pub fn returning_no_glyphs(mut self) -> Self {
        self.no_glyphs = true;
        self
    }
}

impl FontFace for FakeFont {
    fn ascender(&self) -> i32 {
        ASCENDER
    }

    fn descender(&self) -> i32 {
        DESCENDER
    }

    fn underline_position(&self) -> i32 {
        -128
    }

    fn underline_thickness(&self) -> i32 {
        64
    }

    fn contains_glyph(&self, codepoint: char) -> bool {
        !self.missing.contains(&codepoint)
    }

    fn shape(&self, request: &ShapeRequest<'_>) -> Result<Vec<ShapedGlyph>> {
        if self.no_glyphs {
            return Ok(Vec::new());
        }
        let mut glyphs: Vec<ShapedGlyph> = request
            .text
            .iter()
            .enumerate()
            .map(|(i, &c)| ShapedGlyph {
                glyph_id: u32::from(c),
                cluster: request.cluster_offset + i,
                x_offset: 0,
                y_offset: 0,
                x_advance: ADVANCE,
                y_advance: self.y_advance,
            })
            .collect();
        if request.direction.is_rtl() {
            glyphs.reverse();
        }
        Ok(glyphs)
    }
}

/// A stub inline object: one filled rectangle of the given extent.
pub struct FakeObject {
    pub height: i32,
    pub width: i32,
}

impl InlineObject for FakeObject {
    fn height(&self) -> i32 {
        self.height
    }

    fn right(&self) -> i32 {
        self.width
    }

    fn draw_commands(&self) -> Vec<DrawCommand> {
        vec![DrawCommand::Rect {
            x: 0,
            y: 0,
            w: self.width,
            h: self.height,
            color: paraflow::Color::WHITE,
            blur: 0,
        }]
    }
}

/// A column whose left edge slants to the right as the text descends.
pub struct SlantShape {
    pub width: i32,
}

impl Shape for SlantShape {
    fn left(&self, top: i32, _bottom: i32) -> i32 {
        10 * 64 + top / 10
    }

    fn right(&self, _top: i32, _bottom: i32) -> i32 {
        self.width
    }
}

pub fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

pub fn fake_face() -> Arc<dyn FontFace> {
    Arc::new(FakeFont::new())
}

/// One shared attribute covering `len` codepoints.
pub fn uniform_attrs(len: usize, face: &Arc<dyn FontFace>) -> AttributeIndex {
    attrs_with(len, face, |_| {})
}

/// One shared attribute covering `len` codepoints, adjusted by `configure`.
pub fn attrs_with(
    len: usize,
    face: &Arc<dyn FontFace>,
    configure: impl FnOnce(&mut CodepointAttributes),
) -> AttributeIndex {
    let mut attr = CodepointAttributes {
        font: FontSet::from_face(Arc::clone(face)),
        lang: "en".to_string(),
        ..Default::default()
    };
    configure(&mut attr);
    let mut index = AttributeIndex::new();
    index.set_range(0..len, Arc::new(attr));
    index
}

/// All glyph commands as `(glyph_id, x, y)` in emission order.
pub fn glyphs_of(layout: &TextLayout) -> Vec<(u32, i32, i32)> {
    layout
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Glyph { glyph, x, y, .. } => Some((*glyph, *x, *y)),
            _ => None,
        })
        .collect()
}

/// All rectangle commands as `(x, y, w, h)` in emission order.
#[allow(dead_code)]
pub fn rects_of(layout: &TextLayout) -> Vec<(i32, i32, i32, i32)> {
    layout
        .commands()
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Rect { x, y, w, h, .. } => Some((*x, *y, *w, *h)),
            _ => None,
        })
        .collect()
}
