//! Deterministic fake collaborators for unit tests
//!
//! Real shaping needs font binaries; the unit tests exercise the layout
//! pipeline with a monospaced fake face instead: every codepoint maps to
//! a glyph with the codepoint's value as id and a fixed advance, and
//! right-to-left requests reverse the glyph order exactly like a real
//! shaper would.

use std::sync::Arc;

use crate::attr::{AttributeIndex, CodepointAttributes};
use crate::error::Result;
use crate::font::{FontFace, FontSet, ShapeRequest, ShapedGlyph};

/// Monospaced fake font: 10 px advance, 10 px ascender, 4 px descender.
pub(crate) struct FakeFont {
    advance: i32,
    ascender: i32,
    descender: i32,
    underline_position: i32,
    underline_thickness: i32,
    missing: Vec<char>,
    y_advance: i32,
    no_glyphs: bool,
}

impl FakeFont {
    pub fn new() -> Self {
        Self {
            advance: 640,
            ascender: 640,
            descender: -256,
            underline_position: -128,
            underline_thickness: 64,
            missing: Vec::new(),
            y_advance: 0,
            no_glyphs: false,
        }
    }

    /// Pretends the font has no glyph for `codepoint`.
    pub fn without_glyph(mut self, codepoint: char) -> Self {
        self.missing.push(codepoint);
        self
    }

    /// Reports every glyph with a vertical advance, like a vertical
    /// script would.
    pub fn with_y_advance(mut self, y_advance: i32) -> Self {
        self.y_advance = y_advance;
        self
    }

    /// Returns no glyphs at all, like a broken shaper.
    pub fn returning_no_glyphs(mut self) -> Self {
        self.no_glyphs = true;
        self
    }
}

impl FontFace for FakeFont {
    fn ascender(&self) -> i32 {
        self.ascender
    }

    fn descender(&self) -> i32 {
        self.descender
    }

    fn underline_position(&self) -> i32 {
        self.underline_position
    }

    fn underline_thickness(&self) -> i32 {
        self.underline_thickness
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
                x_advance: self.advance,
                y_advance: self.y_advance,
            })
            .collect();
        if request.direction.is_rtl() {
            glyphs.reverse();
        }
        Ok(glyphs)
    }
}

/// Wraps a fake font into the trait object the attributes expect.
pub(crate) fn fake_face(font: FakeFont) -> Arc<dyn FontFace> {
    Arc::new(font)
}

/// One shared attribute for `len` codepoints with the given face and
/// language.
pub(crate) fn uniform_attrs(len: usize, face: &Arc<dyn FontFace>, lang: &str) -> AttributeIndex {
    attrs_with(len, face, lang, |_| {})
}

/// Like [`uniform_attrs`], with a hook to adjust the attribute.
pub(crate) fn attrs_with(
    len: usize,
    face: &Arc<dyn FontFace>,
    lang: &str,
    configure: impl FnOnce(&mut CodepointAttributes),
) -> AttributeIndex {
    let mut attr = CodepointAttributes {
        font: FontSet::from_face(Arc::clone(face)),
        lang: lang.to_string(),
        ..Default::default()
    };
    configure(&mut attr);
    let mut index = AttributeIndex::new();
    index.set_range(0..len, Arc::new(attr));
    index
}
