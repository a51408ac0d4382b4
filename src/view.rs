//! Normalized view of the paragraph under layout
//!
//! The view is the working copy of the text: the directional formatting
//! characters (LRE, RLE, PDF) are stripped from the visible stream, and an
//! index array maps every retained position back to its original position
//! so attributes and embedding levels, which refer to the original string,
//! stay addressable. The view also accumulates the per-position line-break
//! classes and the optional hyphenation mask as the analysis stages run.

use crate::attr::{AttributeIndex, CodepointAttributes};
use crate::breaks::BreakClass;

fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{202A}' | '\u{202B}' | '\u{202C}')
}

pub(crate) struct LayoutView<'a> {
    text: Vec<char>,
    idx: Vec<usize>,
    attrs: &'a AttributeIndex,
    levels: &'a [u8],
    linebreaks: Vec<BreakClass>,
    hyphens: Vec<bool>,
}

impl<'a> LayoutView<'a> {
    /// Builds the view: copies the text without directional formatting
    /// characters and records the original index of every kept codepoint.
    pub fn new(original: &[char], attrs: &'a AttributeIndex, levels: &'a [u8]) -> Self {
        let mut text = Vec::with_capacity(original.len());
        let mut idx = Vec::with_capacity(original.len());
        for (i, &c) in original.iter().enumerate() {
            if !is_bidi_control(c) {
                text.push(c);
                idx.push(i);
            }
        }
        let linebreaks = vec![BreakClass::default(); text.len()];
        Self {
            text,
            idx,
            attrs,
            levels,
            linebreaks,
            hyphens: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn ch(&self, i: usize) -> char {
        self.text[i]
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    /// Attribute of view position `i`.
    ///
    /// # Panics
    ///
    /// Every codepoint handed to the layout pipeline must carry an
    /// attribute; this panics when the caller broke that contract.
    pub fn attr(&self, i: usize) -> &CodepointAttributes {
        self.attrs
            .get(self.idx[i])
            .expect("codepoint without attribute")
    }

    pub fn has_attr(&self, i: usize) -> bool {
        self.attrs.has_attribute(self.idx[i])
    }

    /// Embedding level of view position `i`.
    pub fn level(&self, i: usize) -> u8 {
        self.levels[self.idx[i]]
    }

    pub fn linebreak(&self, i: usize) -> BreakClass {
        self.linebreaks[i]
    }

    pub fn linebreaks_mut(&mut self) -> &mut [BreakClass] {
        &mut self.linebreaks
    }

    /// Marks a hyphenation opportunity before view position `i`.
    /// The mask is allocated on first use.
    pub fn set_hyphen(&mut self, i: usize) {
        if self.hyphens.is_empty() {
            self.hyphens = vec![false; self.text.len()];
        }
        self.hyphens[i] = true;
    }

    pub fn hyphen(&self, i: usize) -> bool {
        i < self.hyphens.len() && self.hyphens[i]
    }
}
