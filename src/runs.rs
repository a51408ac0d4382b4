//! Run segmentation and shaping
//!
//! A run is a maximal span of the view that can be shaped in one piece:
//! same direction, same language, same resolved font, same baseline shift,
//! no break opportunity inside, no space and no soft hyphen inside, and at
//! most one inline object (which always forms a run of its own).
//!
//! Each run is shaped and immediately turned into drawing commands with
//! absolute positions *within the run*: shadows behind their glyph on
//! higher layers, the glyph itself on layer 0, underline rectangles, and
//! spliced-in inline object commands. Hyperlink hit rectangles are tracked
//! while walking the clusters. Commands are appended in logical order even
//! for right-to-left runs — positions are computed from the visual
//! iteration, but the append order stays logical so layering and link
//! tracking remain stable.

use std::sync::Arc;

use crate::attr::CodepointAttributes;
use crate::bidi::Direction;
use crate::breaks::BreakClass;
use crate::error::{LayoutError, Result};
use crate::font::{FontFace, ShapeRequest};
use crate::layout::{DrawCommand, LinkInformation, Rectangle};
use crate::view::LayoutView;
use crate::LayoutProperties;

/// A shaped run ready for line assembly.
pub(crate) struct RunInfo {
    /// Drawing commands with their layer; higher layers paint first.
    pub commands: Vec<(usize, DrawCommand)>,

    /// Total horizontal advance of the run.
    pub dx: i32,

    /// Total vertical advance; always zero, only line-based scripts are
    /// supported.
    pub dy: i32,

    /// Embedding level of the run.
    pub level: u8,

    /// Break class after the last codepoint of the run.
    pub linebreak: BreakClass,

    /// Resolved font of the run; absent for inline-object runs.
    pub font: Option<Arc<dyn FontFace>>,

    /// Whitespace run; removable at line edges.
    pub space: bool,

    /// Soft-hyphen run; rendered only when it ends a line.
    pub shy: bool,

    /// Ascender above the baseline, positive up.
    pub ascender: i32,

    /// Descender below the baseline, negative down.
    pub descender: i32,

    /// Hyperlink hit regions local to this run.
    pub links: Vec<LinkInformation>,
}

impl std::fmt::Debug for RunInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunInfo")
            .field("commands", &self.commands)
            .field("dx", &self.dx)
            .field("dy", &self.dy)
            .field("level", &self.level)
            .field("linebreak", &self.linebreak)
            .field("space", &self.space)
            .field("shy", &self.shy)
            .field("ascender", &self.ascender)
            .field("descender", &self.descender)
            .field("links", &self.links)
            .finish()
    }
}

fn same_font(a: &Option<Arc<dyn FontFace>>, b: &Option<Arc<dyn FontFace>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// Splits the language tag into the script tag for the shaper and the
/// language without its script subtag.
///
/// The second segment of the tag, when present, is treated as an ISO 15924
/// script code and canonicalized to title case (`"latn"` → `Latn`).
fn script_and_language(lang: &str) -> (Option<[u8; 4]>, Option<&str>) {
    if lang.is_empty() {
        return (None, None);
    }
    match lang.split_once('-') {
        None => (None, Some(lang)),
        Some((primary, rest)) => {
            let script_part = rest.split('-').next().unwrap_or(rest);
            let bytes = script_part.as_bytes();
            if bytes.len() == 4 && bytes.iter().all(u8::is_ascii_alphabetic) {
                let script = [
                    bytes[0].to_ascii_uppercase(),
                    bytes[1].to_ascii_lowercase(),
                    bytes[2].to_ascii_lowercase(),
                    bytes[3].to_ascii_lowercase(),
                ];
                (Some(script), Some(primary))
            } else {
                // not a script subtag; keep the tag whole for the shaper
                (None, Some(lang))
            }
        }
    }
}

/// Appends underline commands below an advance of width `gw` starting at
/// `gx`, shadows included, when the attribute asks for an underline.
///
/// Underline metrics come from the underline override font when the
/// properties carry one, so mixed-font text gets one uniform line;
/// otherwise from the run's own font.
fn add_underline(
    run: &mut RunInfo,
    gx: i32,
    gw: i32,
    props: &LayoutProperties,
    attr: &CodepointAttributes,
) {
    if !attr.underline {
        return;
    }
    let face = match props.underline_font.as_ref().or(run.font.as_ref()) {
        Some(face) => face,
        None => return,
    };

    let gy = -(face.underline_position() + face.underline_thickness() / 2);
    let gh = face.underline_thickness().max(64);

    for (j, shadow) in attr.shadows.iter().enumerate() {
        run.commands.push((
            attr.shadows.len() - j,
            DrawCommand::Rect {
                x: gx + shadow.dx,
                y: gy + shadow.dy,
                w: gw,
                h: gh,
                color: shadow.color,
                blur: shadow.blur,
            },
        ));
    }
    run.commands.push((
        0,
        DrawCommand::Rect {
            x: gx,
            y: gy,
            w: gw,
            h: gh,
            color: attr.color,
            blur: 0,
        },
    ));
}

/// Builds one run for the view positions `[runstart, spos)`.
///
/// With `synthetic_hyphen` set the view text is ignored and a lone soft
/// hyphen with the attributes and level of `runstart` is produced instead;
/// this materializes the hyphenation points found by the dictionary, which
/// have no codepoint of their own in the text.
fn create_run(
    view: &LayoutView,
    runstart: usize,
    spos: usize,
    props: &LayoutProperties,
    font: Option<Arc<dyn FontFace>>,
    synthetic_hyphen: bool,
) -> Result<RunInfo> {
    let attr = view.attr(runstart);

    let mut run = RunInfo {
        commands: Vec::new(),
        dx: 0,
        dy: 0,
        level: view.level(runstart),
        linebreak: if synthetic_hyphen {
            BreakClass::AllowBreak
        } else {
            view.linebreak(spos - 1)
        },
        font: font.clone(),
        space: !synthetic_hyphen && matches!(view.ch(spos - 1), ' ' | '\n'),
        shy: synthetic_hyphen || view.ch(runstart) == '\u{00AD}',
        ascender: 0,
        descender: 0,
        links: Vec::new(),
    };

    // an inline object replaces the glyph entirely: no shaping, the
    // object's own commands are spliced in at the pen position
    if let Some(object) = attr.inlay.as_ref() {
        run.ascender = object.height() + attr.baseline_shift;
        run.descender = object.height() - run.ascender;

        for mut command in object.draw_commands() {
            // an object sitting on the baseline must end one unit above
            // it, not start there
            command.translate(run.dx, -(run.ascender - 1));
            run.commands.push((0, command));
        }
        let dx = run.dx;
        add_underline(&mut run, dx, object.right(), props, attr);
        run.dx += object.right();
        return Ok(run);
    }

    let face = font.ok_or_else(|| LayoutError::ShaperFailure {
        reason: "no font available for text run".to_string(),
    })?;

    run.ascender = face.ascender() + attr.baseline_shift;
    run.descender = face.descender() + attr.baseline_shift;

    // soft hyphen runs shape a real hyphen; not every font carries U+2010,
    // hyphen-minus is the universal fallback
    let text: Vec<char> = if run.shy {
        let hyphen = if face.contains_glyph('\u{2010}') {
            '\u{2010}'
        } else {
            '\u{002D}'
        };
        vec![hyphen]
    } else {
        view.chars()[runstart..spos].to_vec()
    };

    let direction = if run.level % 2 == 0 {
        Direction::Ltr
    } else {
        Direction::Rtl
    };
    let (script, language) = script_and_language(&attr.lang);

    let mut glyphs = face.shape(&ShapeRequest {
        text: &text,
        cluster_offset: runstart,
        direction,
        script,
        language,
    })?;

    if glyphs.is_empty() {
        return Err(LayoutError::ShaperFailure {
            reason: format!("no glyphs for {} codepoints", text.len()),
        });
    }

    // first pass, logical order: make the shaper's pen-relative offsets
    // absolute within the run and track hyperlink rectangles
    let mut current_link = 0usize;
    let mut link_rect = Rectangle::default();
    let mut link_start = 0i32;

    for glyph in glyphs.iter_mut() {
        let a = view.attr(glyph.cluster);

        if (current_link == 0 && a.link != 0) || current_link != a.link {
            link_start = run.dx;
        }

        glyph.x_offset += run.dx;
        run.dx += glyph.x_advance;

        if a.link != 0 {
            if current_link != 0 && current_link != a.link {
                run.links.push(LinkInformation {
                    url: props.links[current_link - 1].clone(),
                    areas: vec![link_rect],
                });
                current_link = 0;
            }
            if current_link == 0 {
                link_rect = Rectangle {
                    x: link_start,
                    y: -run.ascender,
                    w: run.dx - link_start,
                    h: run.ascender - run.descender,
                };
                current_link = a.link;
            } else {
                link_rect.w = run.dx - link_start;
            }
        }
    }

    // second pass: emit commands. The append order is logical so layering
    // and links stay stable, but for odd levels the glyph array is visual
    // (the shaper reversed it), so it is walked back to front.
    let count = glyphs.len();
    for visual in 0..count {
        let j = if run.level % 2 != 0 {
            count - 1 - visual
        } else {
            visual
        };
        let glyph = &glyphs[j];
        let a = view.attr(glyph.cluster);

        if glyph.y_advance != 0 {
            return Err(LayoutError::NonLinearScript);
        }

        let gx = glyph.x_offset;
        let gy = run.dy - glyph.y_offset - attr.baseline_shift;

        for (k, shadow) in a.shadows.iter().enumerate() {
            run.commands.push((
                a.shadows.len() - k,
                DrawCommand::Glyph {
                    font: Arc::clone(&face),
                    glyph: glyph.glyph_id,
                    x: gx + shadow.dx,
                    y: gy + shadow.dy,
                    color: shadow.color,
                    blur: shadow.blur,
                },
            ));
        }
        run.commands.push((
            0,
            DrawCommand::Glyph {
                font: Arc::clone(&face),
                glyph: glyph.glyph_id,
                x: gx,
                y: gy,
                color: a.color,
                blur: 0,
            },
        ));

        // one unit of padding joins the underlines of adjacent glyphs
        add_underline(&mut run, gx, glyph.x_advance + 64, props, a);
    }

    if current_link != 0 {
        run.links.push(LinkInformation {
            url: props.links[current_link - 1].clone(),
            areas: vec![link_rect],
        });
    }

    Ok(run)
}

/// Segments the whole view into runs and shapes each of them.
pub(crate) fn build_runs(view: &LayoutView, props: &LayoutProperties) -> Result<Vec<RunInfo>> {
    let mut runs = Vec::new();
    let mut runstart = 0;

    while runstart < view.len() {
        let font = view.attr(runstart).font.get(view.ch(runstart));

        // the run keeps growing while every property that influences
        // shaping or breaking stays the same
        let mut spos = runstart + 1;
        while spos < view.len()
            && view.level(runstart) == view.level(spos)
            && view.attr(runstart).lang == view.attr(spos).lang
            && same_font(&font, &view.attr(spos).font.get(view.ch(spos)))
            && view.attr(runstart).baseline_shift == view.attr(spos).baseline_shift
            && view.attr(spos).inlay.is_none()
            && view.attr(spos - 1).inlay.is_none()
            && matches!(
                view.linebreak(spos - 1),
                BreakClass::NoBreak | BreakClass::InsideChar
            )
            && view.ch(spos) != ' '
            && view.ch(spos - 1) != ' '
            && view.ch(spos) != '\n'
            && view.ch(spos - 1) != '\n'
            && view.ch(spos) != '\u{00AD}'
            && !view.hyphen(spos)
        {
            spos += 1;
        }

        runs.push(create_run(view, runstart, spos, props, font.clone(), false)?);

        // author soft hyphens are codepoints and became runs above; the
        // dictionary's hyphenation points only exist in the mask and need
        // a synthesized soft-hyphen run
        if view.hyphen(spos) {
            runs.push(create_run(view, runstart, spos, props, font, true)?);
        }

        runstart = spos;
    }

    Ok(runs)
}
