//! Per-codepoint attributes
//!
//! Every codepoint of a paragraph carries an attribute describing how it
//! is drawn: the fonts to try, the foreground color, the language it is
//! written in, decorations, shadows, an optional inline object replacing
//! the glyph and an optional hyperlink id. Attributes are supplied by the
//! caller through an [`AttributeIndex`], which may be sparse; the layout
//! pipeline requires an attribute for every codepoint it shapes.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::font::FontSet;
use crate::layout::InlineObject;

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black, the default foreground.
    pub const BLACK: Color = Color::new(0, 0, 0, 255);

    /// Opaque white.
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
}

/// A drop shadow behind a glyph or underline.
///
/// Shadows are drawn behind the base glyph in the order given: the first
/// shadow of the list ends up furthest back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadow {
    /// Horizontal offset in 26.6 units.
    pub dx: i32,
    /// Vertical offset in 26.6 units.
    pub dy: i32,
    /// Shadow color.
    pub color: Color,
    /// Blur radius in 26.6 units, 0 for a hard shadow.
    pub blur: i32,
}

/// Attributes of a single codepoint.
#[derive(Clone, Default)]
pub struct CodepointAttributes {
    /// Fonts to draw this codepoint with, tried in order.
    pub font: FontSet,

    /// Foreground color of the glyph and its underline.
    pub color: Color,

    /// BCP-47 language tag, lowercase, with an optional ISO 15924 script
    /// subtag as the second segment (e.g. `"en"`, `"ar-arab"`). May be
    /// empty when the language is unknown.
    pub lang: String,

    /// Draw an underline below this codepoint.
    pub underline: bool,

    /// Shift of the glyph relative to the baseline in 26.6 units,
    /// positive up.
    pub baseline_shift: i32,

    /// Shadows drawn behind the glyph, outermost first.
    pub shadows: Vec<Shadow>,

    /// Inline object drawn instead of a glyph for this codepoint.
    pub inlay: Option<Arc<dyn InlineObject>>,

    /// Hyperlink id: 0 for no link, otherwise a 1-based index into the
    /// link table of the layout properties.
    pub link: usize,
}

impl fmt::Debug for CodepointAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodepointAttributes")
            .field("font", &self.font)
            .field("color", &self.color)
            .field("lang", &self.lang)
            .field("underline", &self.underline)
            .field("baseline_shift", &self.baseline_shift)
            .field("shadows", &self.shadows)
            .field("inlay", &self.inlay.as_ref().map(|_| ".."))
            .field("link", &self.link)
            .finish()
    }
}

/// Maps codepoint indices to their attributes.
///
/// The index may be sparse; [`AttributeIndex::has_attribute`] reports
/// whether a position carries an attribute. Attribute values are shared:
/// assigning one `Arc` to a range keeps a single allocation no matter how
/// long the range is.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use paraflow::{AttributeIndex, CodepointAttributes};
///
/// let attr = Arc::new(CodepointAttributes::default());
/// let mut index = AttributeIndex::new();
/// index.set_range(0..11, attr);
/// assert!(index.has_attribute(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AttributeIndex {
    entries: Vec<Option<Arc<CodepointAttributes>>>,
}

impl AttributeIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns an attribute to a single position, growing the index as
    /// needed.
    pub fn set(&mut self, index: usize, attr: Arc<CodepointAttributes>) {
        if index >= self.entries.len() {
            self.entries.resize(index + 1, None);
        }
        self.entries[index] = Some(attr);
    }

    /// Assigns one shared attribute to every position of a range.
    pub fn set_range(&mut self, range: Range<usize>, attr: Arc<CodepointAttributes>) {
        if range.end > self.entries.len() {
            self.entries.resize(range.end, None);
        }
        for entry in &mut self.entries[range] {
            *entry = Some(Arc::clone(&attr));
        }
    }

    /// Returns the attribute at a position, if one was assigned.
    pub fn get(&self, index: usize) -> Option<&CodepointAttributes> {
        self.entries.get(index).and_then(|e| e.as_deref())
    }

    /// Reports whether a position carries an attribute.
    pub fn has_attribute(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Number of positions the index covers, including unassigned ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no position was ever assigned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
