//! Bidirectional text analysis
//!
//! Resolves one embedding level per codepoint of the original paragraph
//! with the Unicode Bidirectional Algorithm. Even levels are left-to-right,
//! odd levels right-to-left. Levels are resolved on the *original* text,
//! before the directional formatting characters are stripped from the
//! visible stream, so their effect survives the stripping.

use unicode_bidi::{BidiInfo, Level};

use crate::error::{LayoutError, Result};

/// Horizontal text direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Left-to-right, the direction of Latin, Cyrillic or Greek text.
    #[default]
    Ltr,

    /// Right-to-left, the direction of Arabic or Hebrew text.
    Rtl,
}

impl Direction {
    /// Returns true for left-to-right.
    pub fn is_ltr(self) -> bool {
        self == Direction::Ltr
    }

    /// Returns true for right-to-left.
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }

    fn to_level(self) -> Level {
        match self {
            Direction::Ltr => Level::ltr(),
            Direction::Rtl => Level::rtl(),
        }
    }
}

/// Resolves the embedding level of every codepoint.
///
/// `base` is the paragraph direction from the layout properties; it decides
/// the level of neutral codepoints and the paragraph's overall flow.
///
/// # Errors
///
/// [`LayoutError::BidiFailure`] when the resolver does not produce a level
/// for every codepoint.
pub(crate) fn embedding_levels(text: &[char], base: Direction) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let utf8: String = text.iter().collect();
    let info = BidiInfo::new(&utf8, Some(base.to_level()));

    // unicode-bidi reports one level per byte; project to codepoints
    let mut levels = Vec::with_capacity(text.len());
    for (start, _) in utf8.char_indices() {
        let level = info.levels.get(start).ok_or(LayoutError::BidiFailure)?;
        levels.push(level.number());
    }

    if levels.len() != text.len() {
        return Err(LayoutError::BidiFailure);
    }
    Ok(levels)
}
