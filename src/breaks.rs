//! Line-break and hyphenation analysis
//!
//! Fills the per-position break classes of a [`LayoutView`] and, when
//! hyphenation is enabled, its hyphenation mask.
//!
//! Break opportunities come from the Unicode Line Breaking Algorithm
//! (UAX #14) via the `unicode-linebreak` crate. The text is analyzed in
//! maximal same-language windows: the default rules are language
//! independent, but the windowed walk keeps the call sites ready for a
//! language-aware analyzer and, more importantly, controls the forced
//! break the algorithm reports at the end of its input. Each window
//! includes one codepoint of look-ahead past the segment end; the spurious
//! mandatory break lands on that extra codepoint and is overwritten when
//! the next window starts there. Only the true end of the paragraph keeps
//! its mandatory break.
//!
//! Hyphenation points come from embedded TeX patterns (the `hyphenation`
//! crate), looked up by the primary subtag of each segment's language.
//! Words are found with `unicode-segmentation`; a word the author already
//! soft-hyphenated is left alone.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use hyphenation::{Hyphenator, Language, Load, Standard};
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

use crate::view::LayoutView;

/// Line-break class of the position *after* a codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum BreakClass {
    /// Breaking after this codepoint is prohibited.
    #[default]
    NoBreak,

    /// The line may break after this codepoint.
    AllowBreak,

    /// The line must break after this codepoint.
    MustBreak,

    /// The position is inside a multi-unit character; breaking would
    /// split it.
    InsideChar,
}

impl BreakClass {
    /// True for the classes a line may end at.
    pub fn is_break(self) -> bool {
        matches!(self, BreakClass::AllowBreak | BreakClass::MustBreak)
    }
}

/// Runs the line-break analyzer over one window of codepoints, writing a
/// class for every position. The language is accepted for interface parity
/// with the hyphenation walk; the UAX #14 default rules do not use it.
fn analyze_window(window: &[char], _lang: &str, out: &mut [BreakClass]) {
    debug_assert_eq!(window.len(), out.len());
    for class in out.iter_mut() {
        *class = BreakClass::NoBreak;
    }
    if window.is_empty() {
        return;
    }

    let text: String = window.iter().collect();
    let mut starts = Vec::with_capacity(window.len());
    for (byte, _) in text.char_indices() {
        starts.push(byte);
    }

    for (offset, opportunity) in linebreaks(&text) {
        // the break is before the codepoint starting at `offset`, which
        // classifies the position after the one preceding it
        let pos = starts.partition_point(|&b| b < offset);
        if pos == 0 {
            continue;
        }
        out[pos - 1] = match opportunity {
            BreakOpportunity::Mandatory => BreakClass::MustBreak,
            BreakOpportunity::Allowed => BreakClass::AllowBreak,
        };
    }
}

/// Fills the view's line-break classes, walking maximal same-language
/// segments with one codepoint of look-ahead each.
pub(crate) fn compute_linebreaks(view: &mut LayoutView) {
    let length = view.len();
    let mut runstart = 0;

    while runstart < length {
        let mut runpos = runstart + 1;
        while runpos < length && view.attr(runstart).lang == view.attr(runpos).lang {
            runpos += 1;
        }

        // include the next codepoint so the analyzer's forced end-of-input
        // break falls outside the segment; the next window overwrites it
        let window_end = if runpos < length { runpos + 1 } else { runpos };
        let lang = view.attr(runstart).lang.clone();
        let window: Vec<char> = view.chars()[runstart..window_end].to_vec();
        let mut classes = vec![BreakClass::NoBreak; window.len()];
        analyze_window(&window, &lang, &mut classes);
        view.linebreaks_mut()[runstart..window_end].copy_from_slice(&classes);

        runstart = runpos;
    }
}

static DICTIONARY_CACHE: OnceLock<Mutex<HashMap<String, Option<Arc<Standard>>>>> = OnceLock::new();

/// Maps the primary subtag of a BCP-47 tag to an embedded dictionary
/// language.
fn dictionary_language(primary: &str) -> Option<Language> {
    match primary {
        "en" => Some(Language::EnglishUS),
        "de" => Some(Language::German1996),
        "fr" => Some(Language::French),
        "es" => Some(Language::Spanish),
        "it" => Some(Language::Italian),
        "pt" => Some(Language::Portuguese),
        "nl" => Some(Language::Dutch),
        "pl" => Some(Language::Polish),
        "ru" => Some(Language::Russian),
        "sv" => Some(Language::Swedish),
        "nb" | "no" => Some(Language::NorwegianBokmal),
        "da" => Some(Language::Danish),
        "fi" => Some(Language::Finnish),
        "hu" => Some(Language::Hungarian),
        "cs" => Some(Language::Czech),
        "sk" => Some(Language::Slovak),
        "hr" => Some(Language::Croatian),
        "ca" => Some(Language::Catalan),
        "tr" => Some(Language::Turkish),
        "el" => Some(Language::GreekMono),
        "uk" => Some(Language::Ukrainian),
        "la" => Some(Language::Latin),
        _ => None,
    }
}

/// Looks up the hyphenation dictionary for a language tag.
///
/// Dictionaries are loaded once per process and shared. A language without
/// patterns simply gets no hyphenation; that is a warning condition, not
/// an error.
pub(crate) fn dictionary_for(lang: &str) -> Option<Arc<Standard>> {
    let primary = lang.split('-').next().unwrap_or(lang);
    let cache = DICTIONARY_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().expect("dictionary cache poisoned");
    guard
        .entry(primary.to_string())
        .or_insert_with(|| {
            dictionary_language(primary)
                .and_then(|language| Standard::from_embedded(language).ok())
                .map(Arc::new)
        })
        .clone()
}

/// Fills the view's hyphenation mask.
///
/// Walks maximal same-language sections, splits each into words, and asks
/// the section's dictionary for break positions inside every word. Only
/// plain insertions are taken: a point that would need replacement text is
/// ignored, and a word that already contains a soft hyphen keeps only the
/// author's choice.
pub(crate) fn compute_hyphens(view: &mut LayoutView) {
    let mut sectionstart = 0;

    while sectionstart < view.len() {
        if !view.has_attr(sectionstart) || view.attr(sectionstart).lang.is_empty() {
            sectionstart += 1;
            continue;
        }

        let lang = view.attr(sectionstart).lang.clone();
        let mut end = sectionstart + 1;
        while end < view.len() && view.has_attr(end) && view.attr(end).lang == lang {
            end += 1;
        }

        if let Some(dictionary) = dictionary_for(&lang) {
            let section: String = view.chars()[sectionstart..end].iter().collect();
            let mut word_position = 0;

            for (_, word) in section.split_word_bound_indices() {
                let starts_word = word.chars().next().is_some_and(|c| c.is_alphabetic());
                if starts_word && !word.contains('\u{00AD}') {
                    let breaks: Vec<usize> = dictionary.hyphenate(word).breaks.to_vec();
                    for break_offset in breaks {
                        let cp = word[..break_offset].chars().count();
                        view.set_hyphen(sectionstart + word_position + cp);
                    }
                }
                word_position += word.chars().count();
            }
        }

        sectionstart = end;
    }
}
