//! Paragraph-level text layout
//!
//! This crate lays out one paragraph of attributed text into a flat list
//! of positioned drawing commands plus hyperlink hit regions. It is the
//! middle of a text stack: a front-end builds the codepoint string and
//! per-codepoint attributes, this crate arranges everything, and a blitter
//! walks the resulting command list. All coordinates are 26.6 fixed-point
//! (1/64 pixel).
//!
//! # Pipeline
//!
//! 1. **Bidi analysis** resolves an embedding level per codepoint
//!    (Unicode Bidirectional Algorithm via `unicode-bidi`).
//! 2. **View construction** strips the directional formatting characters
//!    and keeps an index back into the original attributes.
//! 3. **Break analysis** fills per-position line-break classes (UAX #14
//!    via `unicode-linebreak`) and, when enabled, dictionary hyphenation
//!    points (TeX patterns via `hyphenation`).
//! 4. **Run building** cuts the text into uniformly-shaped spans, shapes
//!    each through its font (rustybuzz for real fonts) and emits per-run
//!    drawing commands: shadows, glyphs, underlines, inline objects and
//!    link rectangles.
//! 5. **Line breaking** arranges runs into lines, either greedily or with
//!    a total-demerits optimizer in the spirit of the TeX paragraph
//!    algorithm, honoring an arbitrary column [`Shape`].
//! 6. **Line assembly** reorders each line visually (BiDi rule L2),
//!    applies alignment and justification and merges everything into the
//!    [`TextLayout`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paraflow::{
//!     layout_paragraph, AttributeIndex, CodepointAttributes, FontSet,
//!     LayoutProperties, OutlineFont, RectangleShape,
//! };
//!
//! let data = Arc::new(std::fs::read("DejaVuSans.ttf")?);
//! let face = Arc::new(OutlineFont::from_data(data, 0, 16.0)?);
//!
//! let text: Vec<char> = "Hello world".chars().collect();
//! let mut attrs = AttributeIndex::new();
//! attrs.set_range(
//!     0..text.len(),
//!     Arc::new(CodepointAttributes {
//!         font: FontSet::from_face(face),
//!         lang: "en".to_string(),
//!         ..Default::default()
//!     }),
//! );
//!
//! let shape = RectangleShape::new(200 * 64);
//! let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0)?;
//! for command in layout.commands() {
//!     // hand to the rasterizer
//! }
//! ```
//!
//! # Threading
//!
//! A layout call is a pure function of its inputs and the collaborating
//! font objects; the crate itself holds no shared mutable state and takes
//! no locks beyond a process-wide hyphenation dictionary cache.
//! Independent paragraphs may be laid out from parallel threads as long
//! as the fonts passed in are reentrant.

use std::fmt;
use std::sync::Arc;

pub mod attr;
pub mod bidi;
mod breaks;
pub mod error;
pub mod fixed;
pub mod font;
pub mod layout;
mod line_breaker;
mod runs;
pub mod shape;
#[cfg(test)]
pub(crate) mod testutil;
mod view;

pub use attr::{AttributeIndex, CodepointAttributes, Color, Shadow};
pub use bidi::Direction;
pub use error::{LayoutError, Result};
pub use font::{FontFace, FontSet, OutlineFont, ShapeRequest, ShapedGlyph};
pub use layout::{DrawCommand, InlineObject, LinkInformation, Rectangle, TextLayout};
pub use shape::{IndentShape, RectangleShape, Shape, ShiftShape};

/// Horizontal alignment of the lines within the column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Flush left, ragged right.
    #[default]
    Left,

    /// Flush right, ragged left.
    Right,

    /// Centered.
    Center,

    /// Justified; the last line of a paragraph is flush left.
    JustifyLeft,

    /// Justified; the last line of a paragraph is flush right.
    JustifyRight,
}

/// Paragraph-level layout options.
#[derive(Clone)]
pub struct LayoutProperties {
    /// Base paragraph direction: `true` for left-to-right.
    pub ltr: bool,

    /// Line alignment within the column.
    pub align: Alignment,

    /// Indent of the first line in 26.6 units.
    pub indent: i32,

    /// Insert dictionary hyphenation points.
    pub hyphenate: bool,

    /// Use the optimizing line breaker instead of the greedy one.
    pub optimize_linebreaks: bool,

    /// Font whose metrics drive every underline, so mixed-font text gets
    /// one uniform line. Without it each run underlines with its own font.
    pub underline_font: Option<Arc<dyn FontFace>>,

    /// Hyperlink targets; attribute link ids are 1-based indices into
    /// this table.
    pub links: Vec<String>,
}

impl Default for LayoutProperties {
    fn default() -> Self {
        Self {
            ltr: true,
            align: Alignment::Left,
            indent: 0,
            hyphenate: false,
            optimize_linebreaks: false,
            underline_font: None,
            links: Vec::new(),
        }
    }
}

impl fmt::Debug for LayoutProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutProperties")
            .field("ltr", &self.ltr)
            .field("align", &self.align)
            .field("indent", &self.indent)
            .field("hyphenate", &self.hyphenate)
            .field("optimize_linebreaks", &self.optimize_linebreaks)
            .field("underline_font", &self.underline_font.as_ref().map(|_| ".."))
            .field("links", &self.links)
            .finish()
    }
}

/// Lays out one paragraph.
///
/// `text` is the full paragraph including any directional formatting
/// characters; `attributes` must cover every codepoint of it. `shape`
/// provides the column edges, `y_start` the vertical position the
/// paragraph begins at.
///
/// The returned layout owns its drawing commands and link regions; all
/// intermediate state lives only for the duration of the call.
///
/// # Errors
///
/// See [`LayoutError`] — all errors abandon the call, nothing partial is
/// returned.
pub fn layout_paragraph(
    text: &[char],
    attributes: &AttributeIndex,
    shape: &dyn Shape,
    properties: &LayoutProperties,
    y_start: i32,
) -> Result<TextLayout> {
    let base = if properties.ltr {
        Direction::Ltr
    } else {
        Direction::Rtl
    };

    // levels are resolved on the original text, then projected through
    // the view's index map, so stripped formatting characters keep their
    // effect
    let levels = bidi::embedding_levels(text, base)?;
    let mut view = view::LayoutView::new(text, attributes, &levels);

    breaks::compute_linebreaks(&mut view);
    if properties.hyphenate {
        breaks::compute_hyphens(&mut view);
    }

    let mut runs = runs::build_runs(&view, properties)?;

    let layout = if properties.optimize_linebreaks {
        line_breaker::break_lines_optimize(&mut runs, shape, properties, y_start)
    } else {
        line_breaker::break_lines(&mut runs, shape, properties, y_start)
    };
    Ok(layout)
}
