//! Layout output: draw commands, hyperlink regions and the finished layout
//!
//! A finished paragraph is a flat, append-only list of drawing commands in
//! visual order, already layered (shadows first, base glyphs last), plus
//! the hit regions of every hyperlink in the text. All coordinates are
//! 26.6 fixed-point and absolute within the layout; a consumer translates
//! them by its own origin and rounds with [`crate::fixed::round_to_pixels`].

use std::fmt;
use std::sync::Arc;

use crate::attr::Color;
use crate::font::FontFace;

/// An externally rendered object placed in the text like a single glyph.
///
/// Inline objects are opaque to the layout engine: it only needs their
/// extent to reserve room on the line, and their prerendered drawing
/// commands to splice into the output.
pub trait InlineObject: Send + Sync {
    /// Height of the object in 26.6 units.
    fn height(&self) -> i32;

    /// Horizontal advance of the object in 26.6 units.
    fn right(&self) -> i32;

    /// The drawing commands that render the object, positioned relative
    /// to its own top-left corner.
    fn draw_commands(&self) -> Vec<DrawCommand>;
}

/// One drawing command of a finished layout.
#[derive(Clone)]
pub enum DrawCommand {
    /// Draw a single glyph.
    Glyph {
        /// Font to take the glyph from.
        font: Arc<dyn FontFace>,
        /// Glyph index within the font.
        glyph: u32,
        /// Horizontal position, 26.6.
        x: i32,
        /// Vertical position of the baseline, 26.6.
        y: i32,
        /// Fill color.
        color: Color,
        /// Blur radius for shadow glyphs, 0 for crisp output.
        blur: i32,
    },

    /// Fill an axis-aligned rectangle (underlines and their shadows).
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
        /// Blur radius for shadow rectangles, 0 for crisp output.
        blur: i32,
    },

    /// Hand off to an inline object's own renderer.
    Object {
        object: Arc<dyn InlineObject>,
        x: i32,
        y: i32,
    },
}

impl DrawCommand {
    /// Shifts the command by the given offsets.
    pub fn translate(&mut self, dx: i32, dy: i32) {
        match self {
            DrawCommand::Glyph { x, y, .. }
            | DrawCommand::Rect { x, y, .. }
            | DrawCommand::Object { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
        }
    }

    /// The position of the command.
    pub fn position(&self) -> (i32, i32) {
        match self {
            DrawCommand::Glyph { x, y, .. }
            | DrawCommand::Rect { x, y, .. }
            | DrawCommand::Object { x, y, .. } => (*x, *y),
        }
    }
}

impl fmt::Debug for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCommand::Glyph {
                glyph, x, y, color, blur, ..
            } => f
                .debug_struct("Glyph")
                .field("glyph", glyph)
                .field("x", x)
                .field("y", y)
                .field("color", color)
                .field("blur", blur)
                .finish(),
            DrawCommand::Rect { x, y, w, h, color, blur } => f
                .debug_struct("Rect")
                .field("x", x)
                .field("y", y)
                .field("w", w)
                .field("h", h)
                .field("color", color)
                .field("blur", blur)
                .finish(),
            DrawCommand::Object { x, y, .. } => {
                f.debug_struct("Object").field("x", x).field("y", y).finish()
            }
        }
    }
}

/// An axis-aligned rectangle in 26.6 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// The hit regions of one hyperlink.
///
/// A link wrapping over several lines has one rectangle per line; all of
/// them share the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInformation {
    /// Target of the link.
    pub url: String,
    /// Clickable regions, one or more.
    pub areas: Vec<Rectangle>,
}

/// A finished paragraph layout.
///
/// Commands are stored in paint order: iterating front to back and drawing
/// each command paints shadows below their glyphs and glyphs below nothing.
#[derive(Debug, Default)]
pub struct TextLayout {
    commands: Vec<DrawCommand>,
    links: Vec<LinkInformation>,
    first_baseline: Option<i32>,
    height: i32,
    left: i32,
    right: i32,
}

impl TextLayout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// The drawing commands in paint order.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// The hyperlinks of the paragraph with their hit regions.
    pub fn links(&self) -> &[LinkInformation] {
        &self.links
    }

    /// Baseline of the first line, 26.6. Zero for an empty layout.
    pub fn first_baseline(&self) -> i32 {
        self.first_baseline.unwrap_or(0)
    }

    /// Total height of the laid out text, 26.6.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Leftmost column edge over the vertical extent, 26.6.
    pub fn left(&self) -> i32 {
        self.left
    }

    /// Rightmost column edge over the vertical extent, 26.6.
    pub fn right(&self) -> i32 {
        self.right
    }

    pub(crate) fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub(crate) fn set_first_baseline(&mut self, y: i32) {
        self.first_baseline = Some(y);
    }

    pub(crate) fn has_first_baseline(&self) -> bool {
        self.first_baseline.is_some()
    }

    pub(crate) fn set_height(&mut self, height: i32) {
        self.height = height;
    }

    pub(crate) fn set_left(&mut self, left: i32) {
        self.left = left;
    }

    pub(crate) fn set_right(&mut self, right: i32) {
        self.right = right;
    }

    /// Merges link hit regions into the layout, shifting each rectangle by
    /// the given offsets. Regions of a URL that is already present are
    /// appended to its entry instead of creating a duplicate.
    pub(crate) fn merge_links(&mut self, links: &[LinkInformation], dx: i32, dy: i32) {
        for link in links {
            let entry = match self.links.iter_mut().find(|l| l.url == link.url) {
                Some(entry) => entry,
                None => {
                    self.links.push(LinkInformation {
                        url: link.url.clone(),
                        areas: Vec::new(),
                    });
                    self.links.last_mut().unwrap()
                }
            };
            for area in &link.areas {
                entry.areas.push(Rectangle {
                    x: area.x + dx,
                    y: area.y + dy,
                    ..*area
                });
            }
        }
    }

    /// Appends another layout below this one.
    ///
    /// The other layout must have been produced with a `y_start` at or
    /// below this layout's height; commands are already absolute, so they
    /// are taken over as they are. Links with a URL present in both
    /// layouts are coalesced.
    pub fn append(&mut self, other: TextLayout) {
        let was_empty = self.commands.is_empty();
        if self.first_baseline.is_none() {
            self.first_baseline = other.first_baseline;
        }
        self.commands.extend(other.commands);
        self.merge_links(&other.links, 0, 0);
        self.height = self.height.max(other.height);
        if was_empty {
            self.left = other.left;
            self.right = other.right;
        } else {
            self.left = self.left.min(other.left);
            self.right = self.right.max(other.right);
        }
    }
}
