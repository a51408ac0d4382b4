//! Line breaking and line assembly
//!
//! Two breakers turn the shaped runs of a paragraph into lines:
//!
//! - [`break_lines`] fills lines first-fit: accumulate break groups until
//!   the column overflows, commit, continue. Cheap and predictable.
//! - [`break_lines_optimize`] minimizes total demerits over all break
//!   positions of the paragraph, in the spirit of the TeX paragraph
//!   algorithm: spaces are shrinkable to 90% of their width, each
//!   candidate line gets a badness from how far its stretch is from
//!   optimal, and abrupt changes of line tightness or consecutive
//!   hyphenated endings are penalized. At every forced break the best
//!   path is committed and the run list truncated, which bounds the
//!   dynamic program to one forced-break section at a time.
//!
//! Both feed [`add_line`], which reorders the runs of a line into visual
//! order (Unicode BiDi rule L2 applied to the run sequence), positions
//! them according to alignment and justification, widens space-run
//! underlines and link regions when justification stretches spaces, and
//! finally copies the commands into the layout in descending layer order
//! so shadows paint before their glyphs.

use crate::breaks::BreakClass;
use crate::layout::{DrawCommand, TextLayout};
use crate::runs::RunInfo;
use crate::shape::Shape;
use crate::{Alignment, LayoutProperties};

#[derive(Debug, Clone, Copy, Default)]
struct LineFlags {
    /// First line of its paragraph section; receives the indent.
    first: bool,
    /// Last line before a forced break; justification leaves it ragged.
    last: bool,
    /// Spaces advance at 90% of their width, matching the optimizer's
    /// shrinkable-space width model.
    small_space: bool,
}

/// Orders the runs of a line visually: logical order, then for every
/// level threshold from the maximum down, each maximal span of runs above
/// the threshold is reversed (BiDi rule L2 restricted to the line).
fn visual_run_order(runs: &[RunInfo], runstart: usize, spos: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (runstart..spos).collect();
    let max_level = order.iter().map(|&ri| runs[ri].level).max().unwrap_or(0);

    for threshold in (0..max_level).rev() {
        let mut j = 0;
        while j < order.len() {
            if runs[order[j]].level > threshold {
                let mut k = j + 1;
                while k < order.len() && runs[order[k]].level > threshold {
                    k += 1;
                }
                order[j..k].reverse();
                j = k;
            } else {
                j += 1;
            }
        }
    }
    order
}

/// Assembles one line into the layout.
///
/// `runs[runstart..spos]` form the line; `ypos` is its baseline.
/// `cur_width` is the width the breaker accumulated for the line, indent
/// included, and `num_space` the number of space runs in it — both feed
/// the justification arithmetic. `left` and `right` are the column edges
/// at the line's vertical extent.
#[allow(clippy::too_many_arguments)]
fn add_line(
    runstart: usize,
    spos: usize,
    runs: &mut [RunInfo],
    layout: &mut TextLayout,
    ypos: i32,
    cur_width: i32,
    left: i32,
    right: i32,
    flags: LineFlags,
    num_space: usize,
    props: &LayoutProperties,
) {
    let order = visual_run_order(runs, runstart, spos);

    let space_left = right - left - cur_width;

    // where the line starts and how much every space grows
    let mut xpos;
    let mut spaceadder = 0.0f64;
    match props.align {
        Alignment::Left => {
            xpos = left;
            if flags.first {
                xpos += props.indent;
            }
        }
        Alignment::Right => {
            xpos = left + space_left;
        }
        Alignment::Center => {
            xpos = left + space_left / 2;
        }
        Alignment::JustifyLeft => {
            xpos = left;
            // the last line of a paragraph stays ragged
            if num_space > 0 && !flags.last {
                spaceadder = f64::from(space_left) / num_space as f64;
            }
            if flags.first {
                xpos += props.indent;
            }
        }
        Alignment::JustifyRight => {
            if num_space > 0 && !flags.last {
                xpos = left;
                spaceadder = f64::from(space_left) / num_space as f64;
            } else {
                xpos = left + space_left;
            }
        }
    }

    let mut xpos2 = xpos;
    let mut spaces = 0usize;

    for &ri in &order {
        // a soft hyphen is only real at the end of its line
        if runs[ri].shy && ri != spos - 1 {
            continue;
        }

        let shift_x = xpos2 + (spaceadder * spaces as f64) as i32;

        if !runs[ri].space {
            for (_, command) in runs[ri].commands.iter_mut() {
                command.translate(shift_x, ypos);
            }
        } else {
            // space runs draw nothing except underline continuations;
            // those stretch along with the space
            for (_, command) in runs[ri].commands.iter_mut() {
                if let DrawCommand::Rect { x, y, w, .. } = command {
                    *w += spaceadder as i32;
                    *x += shift_x;
                    *y += ypos;
                }
            }
            if let Some(link) = runs[ri].links.first_mut() {
                if let Some(area) = link.areas.first_mut() {
                    area.w += spaceadder as i32;
                }
            }
        }

        layout.merge_links(&runs[ri].links, shift_x, ypos);

        if runs[ri].space {
            spaces += 1;
            xpos2 += if flags.small_space {
                9 * runs[ri].dx / 10
            } else {
                runs[ri].dx
            };
        } else {
            xpos2 += runs[ri].dx;
        }
    }

    // copy commands out, highest layer first, so shadows lie behind glyphs
    let mut max_layer = 0usize;
    for &ri in &order {
        for (layer, _) in &runs[ri].commands {
            max_layer = max_layer.max(layer + 1);
        }
    }
    for layer in 0..max_layer {
        let target = max_layer - layer - 1;
        for i in runstart..spos {
            if runs[i].shy && i != spos - 1 {
                continue;
            }
            for (l, command) in &runs[i].commands {
                if *l != target {
                    continue;
                }
                if runs[i].space && !matches!(command, DrawCommand::Rect { .. }) {
                    continue;
                }
                layout.add_command(command.clone());
            }
        }
    }
}

/// Greedy first-fit line breaking.
///
/// Runs are gathered into break groups (everything up to the next position
/// a line may end at, trailing spaces included) and groups are added while
/// the column can hold them. A group that overflows an *empty* line is
/// committed anyway: a single word wider than the column must still make
/// progress.
pub(crate) fn break_lines(
    runs: &mut Vec<RunInfo>,
    shape: &dyn Shape,
    props: &LayoutProperties,
    ystart: i32,
) -> TextLayout {
    let mut layout = TextLayout::new();
    let mut runstart = 0usize;
    let mut ypos = ystart;
    let mut firstline = true;

    while runstart < runs.len() {
        // spaces never start a line
        while runstart < runs.len() && runs[runstart].space {
            runstart += 1;
        }

        let mut cur_ascend = 0i32;
        let mut cur_descend = 0i32;
        let mut cur_width = 0i32;
        let mut spos = runstart;
        let mut num_space = 0usize;
        let mut forcebreak = false;

        if firstline && props.align != Alignment::Center {
            cur_width = props.indent;
        }

        while spos < runs.len() {
            let mut new_ascend = cur_ascend;
            let mut new_descend = cur_descend;
            let mut new_width = cur_width;
            let mut newspos = spos;
            let mut new_space = num_space;

            // gather one break group: stop at a run a line may end at, or
            // just before a breaking space so the space stays on this line
            while newspos < runs.len() {
                new_ascend = new_ascend.max(runs[newspos].ascender);
                new_descend = new_descend.min(runs[newspos].descender);
                new_width += runs[newspos].dx;
                if runs[newspos].space {
                    new_space += 1;
                }

                let next_is_breaking_space = newspos + 1 < runs.len()
                    && runs[newspos + 1].space
                    && runs[newspos + 1].linebreak.is_break();
                let breaks_here = !runs[newspos].space && runs[newspos].linebreak.is_break();
                if next_is_breaking_space || breaks_here {
                    break;
                }
                newspos += 1;
            }
            let newspos = (newspos + 1).min(runs.len());

            // overflow ends the line, except a line with nothing on it yet
            // takes the group regardless
            if spos > runstart
                && shape.left(ypos, ypos + new_ascend - new_descend) + new_width
                    > shape.right(ypos, ypos + new_ascend - new_descend)
            {
                break;
            }

            // a soft hyphen that is no longer line-final stops counting
            if spos > runstart && runs[spos - 1].shy {
                new_width -= runs[spos - 1].dx;
            }

            cur_ascend = new_ascend;
            cur_descend = new_descend;
            cur_width = new_width;
            spos = newspos;
            num_space = new_space;

            if runs[spos - 1].linebreak == BreakClass::MustBreak
                || (spos < runs.len()
                    && runs[spos].space
                    && runs[spos].linebreak == BreakClass::MustBreak)
            {
                forcebreak = true;
                break;
            }
        }

        forcebreak |= spos == runs.len();

        let line_top = ypos;
        let line_bottom = ypos + cur_ascend - cur_descend;
        add_line(
            runstart,
            spos,
            runs,
            &mut layout,
            ypos + cur_ascend,
            cur_width,
            shape.left(line_top, line_bottom),
            shape.right(line_top, line_bottom),
            LineFlags {
                first: firstline,
                last: forcebreak,
                small_space: false,
            },
            num_space,
            props,
        );
        if firstline {
            layout.set_first_baseline(ypos + cur_ascend);
        }
        ypos += cur_ascend - cur_descend;
        runstart = spos;
        firstline = false;
    }

    layout.set_height(ypos);
    layout.set_left(shape.left2(ystart, ypos));
    layout.set_right(shape.right2(ystart, ypos));
    layout
}

/// Dynamic-program node: the best way to end a line at one break position.
#[derive(Debug, Clone, Copy)]
struct LineCandidate {
    /// Break position the line starts after.
    from: usize,
    /// Cumulative demerits of the best path ending here.
    demerits: f32,
    ascend: i32,
    descend: i32,
    width: i32,
    spaces: usize,
    /// Top of the next line when this path is taken.
    ypos: i32,
    /// 0 tight, 1 decent, 2 loose, 3 very loose.
    linetype: i32,
    /// The line ends in a soft hyphen.
    hyphen: bool,
    /// Start node of the dynamic program.
    start: bool,
}

impl Default for LineCandidate {
    fn default() -> Self {
        Self {
            from: 0,
            demerits: f32::INFINITY,
            ascend: 0,
            descend: 0,
            width: 0,
            spaces: 0,
            ypos: 0,
            linetype: 0,
            hyphen: false,
            start: false,
        }
    }
}

/// Optimizing line breaking.
///
/// Finds the break sequence with the lowest total demerits for every
/// forced-break section of the paragraph, then emits its lines. After a
/// section is emitted the consumed runs are dropped and the program
/// restarts, so memory stays bounded by one section and breaks are never
/// optimized across a forced break (there is nothing to win there).
pub(crate) fn break_lines_optimize(
    runs: &mut Vec<RunInfo>,
    shape: &dyn Shape,
    props: &LayoutProperties,
    ystart: i32,
) -> TextLayout {
    let mut layout = TextLayout::new();
    let paragraph_top = ystart;
    let mut ypos = ystart;

    while !runs.is_empty() {
        let n = runs.len();
        let mut li = vec![LineCandidate::default(); n + 1];
        li[0] = LineCandidate {
            demerits: 0.0,
            ypos,
            start: true,
            ..LineCandidate::default()
        };

        let mut committed = n;
        for i in 1..=n {
            if runs[i - 1].linebreak.is_break() {
                // try every start position, shortest line first
                for start in (1..=i).rev() {
                    if li[start - 1].demerits.is_infinite() {
                        continue;
                    }

                    let mut ascend = 0i32;
                    let mut descend = 0i32;
                    let mut width = 0i32;
                    let mut spaces = 0usize;
                    let mut space_width = 0i32;

                    if start == 1 && props.align != Alignment::Center {
                        width = props.indent;
                    }

                    // spaces at the line edges vanish
                    let mut s1 = start - 1;
                    let mut s2 = i;
                    while s1 < s2 && runs[s1].space {
                        s1 += 1;
                    }
                    while s2 > s1 && runs[s2 - 1].space {
                        s2 -= 1;
                    }

                    for j in s1..s2 {
                        if runs[j].shy && j != s2 - 1 {
                            continue;
                        }
                        ascend = ascend.max(runs[j].ascender);
                        descend = descend.min(runs[j].descender);
                        if runs[j].space {
                            spaces += 1;
                            width += runs[j].dx * 9 / 10;
                            space_width += runs[j].dx;
                        } else {
                            width += runs[j].dx;
                        }
                    }

                    let top = li[start - 1].ypos;
                    let column_left = shape.left(top, top + ascend - descend);
                    let column_right = shape.right(top, top + ascend - descend);
                    let hyphen_end = s2 > s1 && runs[s2 - 1].shy;

                    // longer starts only grow the line; stop here. A break
                    // group wider than the column still has to become a
                    // line once, or layout could not progress.
                    if column_left + width > column_right {
                        if li[i].demerits.is_infinite() {
                            li[i] = LineCandidate {
                                from: start - 1,
                                demerits: li[start - 1].demerits + 100_000.0,
                                ascend,
                                descend,
                                width,
                                spaces,
                                ypos: top + ascend - descend,
                                linetype: 0,
                                hyphen: hyphen_end,
                                start: false,
                            };
                        }
                        break;
                    }

                    let fillin = f64::from(column_right - column_left - width);
                    let optimal_fillin = f64::from(space_width - width);
                    let fillin_difference = (fillin - optimal_fillin).abs();
                    let badness = (100.0 * (fillin_difference / optimal_fillin).powi(3)) as f32;

                    let linetype = if badness >= 100.0 {
                        3
                    } else if badness >= 13.0 {
                        if fillin > optimal_fillin {
                            2
                        } else {
                            0
                        }
                    } else {
                        1
                    };

                    let mut demerits = (10.0 + badness) * (10.0 + badness);
                    if hyphen_end && li[start - 1].hyphen {
                        demerits += 10_000.0;
                    }
                    if (linetype - li[start - 1].linetype).abs() > 1 {
                        demerits += 10_000.0;
                    }
                    if linetype != li[start - 1].linetype {
                        demerits += 5_000.0;
                    }

                    if runs[i - 1].linebreak == BreakClass::MustBreak || i == n {
                        // a forced break overrides the cost: free unless
                        // the line stays under a third of the column
                        demerits = if width > (column_right - column_left) / 3 {
                            0.0
                        } else {
                            100_000.0
                        };
                    }

                    demerits += li[start - 1].demerits;

                    if demerits < li[i].demerits {
                        li[i] = LineCandidate {
                            from: start - 1,
                            demerits,
                            ascend,
                            descend,
                            width,
                            spaces,
                            ypos: top + ascend - descend,
                            linetype,
                            hyphen: hyphen_end,
                            start: false,
                        };
                    }
                }
            }

            if runs[i - 1].linebreak == BreakClass::MustBreak || i == n {
                committed = i;
                break;
            }
        }

        if li[committed].demerits.is_infinite() {
            // unreachable with the overfull fallback above; keep the
            // vertical position sane regardless
            li[committed].ypos = li[0].ypos;
        }

        // walk the best path backwards to find the break positions
        let mut breaks = Vec::new();
        let mut ii = committed;
        while !li[ii].start {
            breaks.push(ii);
            ii = li[ii].from;
        }
        breaks.push(ii);

        // emit top-down
        for w in (1..breaks.len()).rev() {
            let bb = li[breaks[w - 1]];
            let cc = li[breaks[w]];

            let mut s1 = breaks[w];
            let mut s2 = breaks[w - 1];
            while s1 < s2 && runs[s1].space {
                s1 += 1;
            }
            while s2 > s1 && runs[s2 - 1].space {
                s2 -= 1;
            }

            let top = cc.ypos;
            let bottom = top + bb.ascend - bb.descend;
            let flags = LineFlags {
                first: w == breaks.len() - 1,
                last: w == 1,
                small_space: true,
            };
            add_line(
                s1,
                s2,
                runs,
                &mut layout,
                top + bb.ascend,
                bb.width,
                shape.left(top, bottom),
                shape.right(top, bottom),
                flags,
                bb.spaces,
                props,
            );
            if flags.first && !layout.has_first_baseline() {
                layout.set_first_baseline(top + bb.ascend);
            }
        }

        ypos = li[committed].ypos;
        runs.drain(..committed);
    }

    layout.set_height(ypos);
    layout.set_left(shape.left2(paragraph_top, ypos));
    layout.set_right(shape.right2(paragraph_top, ypos));
    layout
}
