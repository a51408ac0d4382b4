//! Error types for paragraph layout
//!
//! All failures of the layout pipeline are fatal to the call that produced
//! them: the partially built layout is discarded and the error is returned
//! to the caller. Nothing is retried internally.
//!
//! Recoverable conditions are deliberately *not* errors: a missing
//! hyphenation dictionary skips hyphenation for the affected text, and a
//! font without a proper hyphen glyph (U+2010) falls back to hyphen-minus.

use thiserror::Error;

/// Result type alias for layout operations
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors raised by the paragraph layout pipeline
///
/// # Example
///
/// ```rust,ignore
/// use paraflow::{layout_paragraph, LayoutError};
///
/// match layout_paragraph(&text, &attrs, &shape, &props, 0) {
///     Ok(layout) => draw(layout),
///     Err(LayoutError::NonLinearScript) => eprintln!("vertical scripts are not supported"),
///     Err(e) => eprintln!("layout failed: {e}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The embedding-level computation did not complete.
    #[error("unable to resolve bidi embedding levels")]
    BidiFailure,

    /// The shaper reported a non-zero vertical advance.
    ///
    /// Only line-based scripts are supported; text that shapes with
    /// vertical advances cannot be laid out.
    #[error("text shaped with vertical advances, only line based scripts are supported")]
    NonLinearScript,

    /// The shaper returned no glyphs for non-empty input.
    #[error("shaping failed: {reason}")]
    ShaperFailure {
        /// What the shaper was asked to do when it came back empty.
        reason: String,
    },

    /// A hyphenation point requires inserting replacement text.
    ///
    /// Reserved: positions with replacement text are currently ignored
    /// during hyphenation analysis, so this is never returned.
    #[error("hyphenation with replacement text is not supported")]
    UnsupportedHyphenation,

    /// Font data could not be parsed into a usable face.
    #[error("font data could not be parsed")]
    InvalidFont,
}
