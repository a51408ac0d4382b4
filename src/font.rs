//! Font interfaces and the rustybuzz-backed production font
//!
//! The layout engine never touches font files itself. It talks to fonts
//! through the [`FontFace`] trait, which bundles the vertical metrics the
//! line breakers need with the shaping operation the run builder needs.
//! A face knows how to shape its own text, so there is no separate shaper
//! handle to manage.
//!
//! [`OutlineFont`] is the production implementation over raw TrueType or
//! OpenType data, shaping with rustybuzz and scaling everything to 26.6
//! fixed-point at the configured pixel size. Tests substitute their own
//! deterministic faces.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paraflow::{FontSet, OutlineFont};
//!
//! let data = Arc::new(std::fs::read("DejaVuSans.ttf")?);
//! let face = Arc::new(OutlineFont::from_data(data, 0, 16.0)?);
//! let fonts = FontSet::from_face(face);
//! ```

use std::fmt;
use std::sync::Arc;

use rustybuzz::ttf_parser::Tag;
use rustybuzz::UnicodeBuffer;

use crate::bidi::Direction;
use crate::error::{LayoutError, Result};

/// One request to shape a run of codepoints.
///
/// The codepoints are a contiguous slice of the paragraph; `cluster_offset`
/// is the paragraph position of the first of them, so the cluster values
/// reported back index straight into the paragraph.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRequest<'a> {
    /// The codepoints to shape.
    pub text: &'a [char],

    /// Paragraph position of `text[0]`; cluster values are absolute.
    pub cluster_offset: usize,

    /// Direction the run is rendered in.
    pub direction: Direction,

    /// ISO 15924 script tag in title case (e.g. `*b"Arab"`), when known.
    pub script: Option<[u8; 4]>,

    /// BCP-47 language tag without the script subtag, when known.
    pub language: Option<&'a str>,
}

/// A positioned glyph produced by shaping.
///
/// Offsets and advances are 26.6 fixed-point. For right-to-left runs the
/// shaper returns glyphs in visual order, exactly like HarfBuzz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    /// Glyph index within the face.
    pub glyph_id: u32,

    /// Paragraph position of the codepoint cluster this glyph renders.
    pub cluster: usize,

    /// Horizontal offset from the pen position.
    pub x_offset: i32,

    /// Vertical offset from the baseline, positive up.
    pub y_offset: i32,

    /// Horizontal pen advance.
    pub x_advance: i32,

    /// Vertical pen advance; non-zero values are rejected by the engine.
    pub y_advance: i32,
}

/// A sized font face: vertical metrics plus shaping.
///
/// All metrics are 26.6 fixed-point at the face's configured size.
/// `descender` is negative below the baseline, matching font conventions;
/// `underline_position` likewise.
pub trait FontFace: Send + Sync {
    /// Ascender above the baseline, positive up.
    fn ascender(&self) -> i32;

    /// Descender below the baseline, typically negative.
    fn descender(&self) -> i32;

    /// Vertical position of the underline relative to the baseline.
    fn underline_position(&self) -> i32;

    /// Thickness of the underline stroke.
    fn underline_thickness(&self) -> i32;

    /// Reports whether the face has a glyph for the codepoint.
    fn contains_glyph(&self, codepoint: char) -> bool;

    /// Shapes a run of codepoints into positioned glyphs.
    fn shape(&self, request: &ShapeRequest<'_>) -> Result<Vec<ShapedGlyph>>;
}

/// An ordered list of faces with per-codepoint fallback.
///
/// Attribute values hold a `FontSet` rather than a single face so that a
/// codepoint the primary face cannot draw falls back to the next face that
/// can. Two codepoints belong to the same run only when the set resolves
/// them to the same face.
#[derive(Clone, Default)]
pub struct FontSet {
    faces: Vec<Arc<dyn FontFace>>,
}

impl FontSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set holding a single face.
    pub fn from_face(face: Arc<dyn FontFace>) -> Self {
        Self { faces: vec![face] }
    }

    /// Appends a fallback face.
    pub fn push(&mut self, face: Arc<dyn FontFace>) {
        self.faces.push(face);
    }

    /// Resolves the face used to draw a codepoint: the first face of the
    /// set containing a glyph for it, or the first face of the set when
    /// none does. Returns `None` only for an empty set.
    pub fn get(&self, codepoint: char) -> Option<Arc<dyn FontFace>> {
        self.faces
            .iter()
            .find(|face| face.contains_glyph(codepoint))
            .or_else(|| self.faces.first())
            .cloned()
    }

    /// Number of faces in the set.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns true for a set with no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl fmt::Debug for FontSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontSet").field("faces", &self.faces.len()).finish()
    }
}

/// Production [`FontFace`] over raw font data, shaped with rustybuzz.
///
/// The face is parsed once at construction to capture metrics; shaping
/// re-parses on demand, which only reads the table directory and is cheap
/// compared to the shaping itself.
pub struct OutlineFont {
    data: Arc<Vec<u8>>,
    index: u32,
    scale: f32,
    ascender: i32,
    descender: i32,
    underline_position: i32,
    underline_thickness: i32,
}

impl OutlineFont {
    /// Creates a face from font data at the given pixel size.
    ///
    /// `index` selects the face within a font collection; use 0 for plain
    /// font files.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidFont`] when the data cannot be parsed.
    pub fn from_data(data: Arc<Vec<u8>>, index: u32, pixel_size: f32) -> Result<Self> {
        let face = rustybuzz::Face::from_slice(&data, index).ok_or(LayoutError::InvalidFont)?;

        let units_per_em = face.units_per_em() as f32;
        let scale = pixel_size * 64.0 / units_per_em;
        let to_fixed = |v: i32| (v as f32 * scale).round() as i32;

        let ascender = to_fixed(i32::from(face.ascender()));
        let descender = to_fixed(i32::from(face.descender()));
        let (underline_position, underline_thickness) = match face.underline_metrics() {
            Some(metrics) => (
                to_fixed(i32::from(metrics.position)),
                to_fixed(i32::from(metrics.thickness)).max(1),
            ),
            // fonts without a post table still get a usable underline
            None => (to_fixed(-(units_per_em as i32) / 10), 64),
        };

        drop(face);
        Ok(Self {
            data,
            index,
            scale,
            ascender,
            descender,
            underline_position,
            underline_thickness,
        })
    }
}

impl FontFace for OutlineFont {
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
        rustybuzz::Face::from_slice(&self.data, self.index)
            .and_then(|face| face.glyph_index(codepoint))
            .is_some()
    }

    fn shape(&self, request: &ShapeRequest<'_>) -> Result<Vec<ShapedGlyph>> {
        let face = rustybuzz::Face::from_slice(&self.data, self.index)
            .ok_or(LayoutError::InvalidFont)?;

        let mut buffer = UnicodeBuffer::new();
        for (i, &codepoint) in request.text.iter().enumerate() {
            buffer.add(codepoint, (request.cluster_offset + i) as u32);
        }
        buffer.set_direction(match request.direction {
            Direction::Ltr => rustybuzz::Direction::LeftToRight,
            Direction::Rtl => rustybuzz::Direction::RightToLeft,
        });
        if let Some(tag) = request.script {
            if let Some(script) = rustybuzz::Script::from_iso15924_tag(Tag::from_bytes(&tag)) {
                buffer.set_script(script);
            }
        }
        if let Some(language) = request.language {
            if let Ok(language) = language.parse::<rustybuzz::Language>() {
                buffer.set_language(language);
            }
        }

        let output = rustybuzz::shape(&face, &[], buffer);
        let to_fixed = |v: i32| (v as f32 * self.scale).round() as i32;

        let glyphs = output
            .glyph_infos()
            .iter()
            .zip(output.glyph_positions())
            .map(|(info, pos)| ShapedGlyph {
                glyph_id: info.glyph_id,
                cluster: info.cluster as usize,
                x_offset: to_fixed(pos.x_offset),
                y_offset: to_fixed(pos.y_offset),
                x_advance: to_fixed(pos.x_advance),
                y_advance: to_fixed(pos.y_advance),
            })
            .collect();
        Ok(glyphs)
    }
}

impl fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFont")
            .field("index", &self.index)
            .field("scale", &self.scale)
            .field("ascender", &self.ascender)
            .field("descender", &self.descender)
            .finish_non_exhaustive()
    }
}
