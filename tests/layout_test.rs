//! Integration tests for the paragraph layout pipeline
//!
//! Everything runs against the deterministic fake font from `common`, so
//! positions are exact multiples of the 640-unit advance.

mod common;

use std::sync::Arc;

use common::*;
use paraflow::{
    layout_paragraph, Alignment, AttributeIndex, CodepointAttributes, FontSet, LayoutError,
    LayoutProperties, RectangleShape, Shadow,
};

// ============================================================================
// Plain layout
// ============================================================================

#[test]
fn test_single_line_hello_world() {
    let face = fake_face();
    let text = chars("Hello world");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();

    assert_eq!(layout.first_baseline(), ASCENDER);
    assert_eq!(layout.height(), LINE_HEIGHT);
    assert_eq!(layout.right(), 200 * 64);
    assert_eq!(layout.left(), 0);

    let glyphs = glyphs_of(&layout);
    // the space run is not drawn
    assert_eq!(glyphs.len(), 10);
    assert!(glyphs.iter().all(|&(_, _, y)| y == ASCENDER));
    // "world" starts one space after "Hello"
    assert_eq!(glyphs[5], (u32::from('w'), 6 * ADVANCE, ASCENDER));
}

#[test]
fn test_empty_paragraph() {
    let attrs = AttributeIndex::new();
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&[], &attrs, &shape, &LayoutProperties::default(), 500).unwrap();

    assert!(layout.commands().is_empty());
    assert_eq!(layout.height(), 500);
    assert_eq!(layout.first_baseline(), 0);
}

#[test]
fn test_y_start_offsets_everything() {
    let face = fake_face();
    let text = chars("ab");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);

    let layout =
        layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 1000).unwrap();

    assert_eq!(layout.first_baseline(), 1000 + ASCENDER);
    assert_eq!(layout.height(), 1000 + LINE_HEIGHT);
    assert!(glyphs_of(&layout).iter().all(|&(_, _, y)| y == 1000 + ASCENDER));
}

#[test]
fn test_layout_is_deterministic() {
    let face = fake_face();
    let text = chars("Some plain text to lay out twice");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(12 * ADVANCE);
    let props = LayoutProperties::default();

    let first = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();
    let second = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();

    assert_eq!(
        format!("{:?}", first.commands()),
        format!("{:?}", second.commands())
    );
    assert_eq!(first.links(), second.links());
    assert_eq!(first.height(), second.height());
}

// ============================================================================
// Wrapping and alignment
// ============================================================================

#[test]
fn test_justify_left_wraps_and_leaves_last_line_ragged() {
    let face = fake_face();
    let text = chars("Hello world");
    let attrs = uniform_attrs(text.len(), &face);
    // "Hello" fits alone, "Hello world" does not
    let shape = RectangleShape::new(6 * ADVANCE);
    let props = LayoutProperties {
        align: Alignment::JustifyLeft,
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();
    let glyphs = glyphs_of(&layout);

    assert_eq!(layout.height(), 2 * LINE_HEIGHT);
    // line 1 has no spaces to expand, line 2 is last: both flush left
    assert_eq!(glyphs[0], (u32::from('H'), 0, ASCENDER));
    assert_eq!(glyphs[5], (u32::from('w'), 0, LINE_HEIGHT + ASCENDER));
}

#[test]
fn test_justified_line_reaches_right_edge() {
    let face = fake_face();
    let text = chars("aa bb cc");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(7 * ADVANCE);
    let props = LayoutProperties {
        align: Alignment::JustifyLeft,
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();
    let glyphs = glyphs_of(&layout);

    let line1_end = glyphs
        .iter()
        .filter(|&&(_, _, y)| y == ASCENDER)
        .map(|&(_, x, _)| x + ADVANCE)
        .max()
        .unwrap();
    assert!(
        (line1_end - 7 * ADVANCE).abs() <= 1,
        "justified line ends at {line1_end}, column is {}",
        7 * ADVANCE
    );
}

#[test]
fn test_right_and_center_alignment() {
    let face = fake_face();
    let text = chars("abcd");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(10 * ADVANCE);

    let right = layout_paragraph(
        &text,
        &attrs,
        &shape,
        &LayoutProperties {
            align: Alignment::Right,
            ..Default::default()
        },
        0,
    )
    .unwrap();
    assert_eq!(glyphs_of(&right)[0].1, 6 * ADVANCE);

    let center = layout_paragraph(
        &text,
        &attrs,
        &shape,
        &LayoutProperties {
            align: Alignment::Center,
            ..Default::default()
        },
        0,
    )
    .unwrap();
    assert_eq!(glyphs_of(&center)[0].1, 3 * ADVANCE);
}

#[test]
fn test_indent_applies_to_first_line_only() {
    let face = fake_face();
    let text = chars("aa bb");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(3 * ADVANCE);
    let props = LayoutProperties {
        indent: 2 * ADVANCE,
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();
    let glyphs = glyphs_of(&layout);

    assert_eq!(glyphs[0].1, 2 * ADVANCE);
    assert_eq!(glyphs[2].1, 0);
}

// ============================================================================
// Bidirectional text
// ============================================================================

#[test]
fn test_mixed_direction_visual_order() {
    let face = fake_face();
    let text = chars("abc\u{05D0}\u{05D1}\u{05D2}def");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();
    let mut glyphs = glyphs_of(&layout);
    glyphs.sort_by_key(|&(_, x, _)| x);

    // left to right on screen: a b c ג ב א d e f
    let visual: Vec<u32> = glyphs.iter().map(|&(g, _, _)| g).collect();
    let expected: Vec<u32> = "abc\u{05D2}\u{05D1}\u{05D0}def"
        .chars()
        .map(u32::from)
        .collect();
    assert_eq!(visual, expected);
}

#[test]
fn test_rtl_paragraph_logical_append_visual_positions() {
    let face = fake_face();
    let text = chars("\u{05D0}\u{05D1}\u{05D2}");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);
    let props = LayoutProperties {
        ltr: false,
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();
    let glyphs = glyphs_of(&layout);

    // appended in logical order, positioned right to left
    assert_eq!(glyphs[0], (0x05D0, 2 * ADVANCE, ASCENDER));
    assert_eq!(glyphs[1], (0x05D1, ADVANCE, ASCENDER));
    assert_eq!(glyphs[2], (0x05D2, 0, ASCENDER));
}

#[test]
fn test_directional_formatting_characters_invisible() {
    let face = fake_face();
    let text = chars("a\u{202A}b\u{202C}c");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();
    let glyphs = glyphs_of(&layout);

    assert_eq!(glyphs.len(), 3);
    let ids: Vec<u32> = glyphs.iter().map(|&(g, _, _)| g).collect();
    assert_eq!(ids, vec![u32::from('a'), u32::from('b'), u32::from('c')]);
}

// ============================================================================
// Non-rectangular shapes
// ============================================================================

#[test]
fn test_slanted_shape_moves_line_starts() {
    let face = fake_face();
    let text = chars("aa bb cc dd ee ff");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = SlantShape { width: 8 * ADVANCE };

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();
    let glyphs = glyphs_of(&layout);

    let mut baselines: Vec<i32> = glyphs.iter().map(|&(_, _, y)| y).collect();
    baselines.sort_unstable();
    baselines.dedup();
    assert!(baselines.len() > 1, "expected the paragraph to wrap");

    use paraflow::Shape;
    for &baseline in &baselines {
        let top = baseline - ASCENDER;
        let expected_left = shape.left(top, top + LINE_HEIGHT);
        let line_start = glyphs
            .iter()
            .filter(|&&(_, _, y)| y == baseline)
            .map(|&(_, x, _)| x)
            .min()
            .unwrap();
        assert_eq!(line_start, expected_left, "line at baseline {baseline}");
    }
}

// ============================================================================
// Decorations and shadows
// ============================================================================

#[test]
fn test_shadows_paint_before_their_glyphs() {
    let face = fake_face();
    let text = chars("ab");
    let attrs = attrs_with(text.len(), &face, |a| {
        a.shadows = vec![Shadow {
            dx: 32,
            dy: 32,
            color: paraflow::Color::new(0, 0, 0, 128),
            blur: 64,
        }];
    });
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();
    let glyphs = glyphs_of(&layout);

    // one shadow and one base glyph per codepoint; all shadows first
    assert_eq!(glyphs.len(), 4);
    assert_eq!(glyphs[0], (u32::from('a'), 32, ASCENDER + 32));
    assert_eq!(glyphs[1], (u32::from('b'), ADVANCE + 32, ASCENDER + 32));
    assert_eq!(glyphs[2], (u32::from('a'), 0, ASCENDER));
    assert_eq!(glyphs[3], (u32::from('b'), ADVANCE, ASCENDER));
}

#[test]
fn test_underline_runs_below_the_text() {
    let face = fake_face();
    let text = chars("ab");
    let attrs = attrs_with(text.len(), &face, |a| a.underline = true);
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();
    let rects = rects_of(&layout);

    // one underline rectangle per glyph, one pixel of joining padding
    assert_eq!(rects.len(), 2);
    // underline position -128, thickness 64: 96 below the baseline
    assert_eq!(rects[0], (0, ASCENDER + 96, ADVANCE + 64, 64));
    assert_eq!(rects[1], (ADVANCE, ASCENDER + 96, ADVANCE + 64, 64));
}

#[test]
fn test_justification_stretches_space_underline() {
    let face = fake_face();
    let text = chars("aa bb cc");
    let attrs = attrs_with(text.len(), &face, |a| a.underline = true);
    let shape = RectangleShape::new(7 * ADVANCE);
    let props = LayoutProperties {
        align: Alignment::JustifyLeft,
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();
    let rects = rects_of(&layout);

    // line 1 is "aa bb" with 2*ADVANCE of slack on its single space;
    // the space's underline continuation grows by exactly that much
    let line1_y = ASCENDER + 96;
    let space_rect = rects
        .iter()
        .find(|&&(x, y, _, _)| y == line1_y && x == 2 * ADVANCE)
        .expect("space underline present");
    assert_eq!(space_rect.2, ADVANCE + 64 + 2 * ADVANCE);
}

// ============================================================================
// Hyperlinks
// ============================================================================

#[test]
fn test_link_spanning_two_lines_aggregates() {
    let face = fake_face();
    let text = chars("aa bb");
    let attrs = attrs_with(text.len(), &face, |a| a.link = 1);
    let shape = RectangleShape::new(2 * ADVANCE);
    let props = LayoutProperties {
        links: vec!["http://example.com/x".to_string()],
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();

    assert_eq!(layout.links().len(), 1);
    let link = &layout.links()[0];
    assert_eq!(link.url, "http://example.com/x");
    assert_eq!(link.areas.len(), 2);

    // the rectangles cover both lines from top to bottom
    assert_eq!(link.areas[0].y, 0);
    assert_eq!(link.areas[0].h, LINE_HEIGHT);
    assert_eq!(link.areas[1].y, LINE_HEIGHT);
    assert_eq!(link.areas[1].h, LINE_HEIGHT);
}

#[test]
fn test_two_links_stay_separate() {
    let face = fake_face();
    let text = chars("ab");
    let mut attrs = AttributeIndex::new();
    for (i, url_id) in [1usize, 2].iter().enumerate() {
        attrs.set(
            i,
            Arc::new(CodepointAttributes {
                font: FontSet::from_face(Arc::clone(&face)),
                lang: "en".to_string(),
                link: *url_id,
                ..Default::default()
            }),
        );
    }
    let shape = RectangleShape::new(200 * 64);
    let props = LayoutProperties {
        links: vec!["http://a".to_string(), "http://b".to_string()],
        ..Default::default()
    };

    let layout = layout_paragraph(&text, &attrs, &shape, &props, 0).unwrap();

    assert_eq!(layout.links().len(), 2);
    assert_eq!(layout.links()[0].url, "http://a");
    assert_eq!(layout.links()[1].url, "http://b");
    // the second link starts where the first ends
    assert_eq!(layout.links()[0].areas[0].w, ADVANCE);
    assert_eq!(layout.links()[1].areas[0].x, ADVANCE);
}

// ============================================================================
// Inline objects
// ============================================================================

#[test]
fn test_inline_object_reserves_room_and_renders() {
    let face = fake_face();
    let object = Arc::new(FakeObject {
        height: 2 * ASCENDER,
        width: 960,
    });
    let text = chars("a\u{FFFC}b");
    let mut attrs = AttributeIndex::new();
    let plain = Arc::new(CodepointAttributes {
        font: FontSet::from_face(Arc::clone(&face)),
        lang: "en".to_string(),
        ..Default::default()
    });
    attrs.set(0, Arc::clone(&plain));
    attrs.set(
        1,
        Arc::new(CodepointAttributes {
            font: FontSet::from_face(Arc::clone(&face)),
            lang: "en".to_string(),
            inlay: Some(object),
            ..Default::default()
        }),
    );
    attrs.set(2, plain);
    let shape = RectangleShape::new(200 * 64);

    let layout = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0).unwrap();

    // the object doubles the line's ascender
    assert_eq!(layout.first_baseline(), 2 * ASCENDER);
    assert_eq!(layout.height(), 2 * ASCENDER + -DESCENDER);

    let glyphs = glyphs_of(&layout);
    assert_eq!(glyphs[0], (u32::from('a'), 0, 2 * ASCENDER));
    // text continues after the object's advance
    assert_eq!(glyphs[1], (u32::from('b'), ADVANCE + 960, 2 * ASCENDER));

    // the object's rectangle sits just below the line top
    let rects = rects_of(&layout);
    assert_eq!(rects.len(), 1);
    assert_eq!(rects[0], (ADVANCE, 1, 960, 2 * ASCENDER));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_vertical_script_rejected() {
    let face: Arc<dyn paraflow::FontFace> = Arc::new(FakeFont::new().with_y_advance(64));
    let text = chars("ab");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);

    let err = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0)
        .unwrap_err();
    assert_eq!(err, LayoutError::NonLinearScript);
}

#[test]
fn test_empty_shaper_output_rejected() {
    let face: Arc<dyn paraflow::FontFace> = Arc::new(FakeFont::new().returning_no_glyphs());
    let text = chars("ab");
    let attrs = uniform_attrs(text.len(), &face);
    let shape = RectangleShape::new(200 * 64);

    let err = layout_paragraph(&text, &attrs, &shape, &LayoutProperties::default(), 0)
        .unwrap_err();
    assert!(matches!(err, LayoutError::ShaperFailure { .. }));
}

// ============================================================================
// Stacking paragraphs
// ============================================================================

#[test]
fn test_append_stacks_paragraphs() {
    let face = fake_face();
    let shape = RectangleShape::new(200 * 64);
    let props = LayoutProperties::default();

    let first_text = chars("one");
    let first_attrs = uniform_attrs(first_text.len(), &face);
    let mut page = layout_paragraph(&first_text, &first_attrs, &shape, &props, 0).unwrap();

    let second_text = chars("two");
    let second_attrs = uniform_attrs(second_text.len(), &face);
    let second =
        layout_paragraph(&second_text, &second_attrs, &shape, &props, page.height()).unwrap();

    page.append(second);

    assert_eq!(page.height(), 2 * LINE_HEIGHT);
    assert_eq!(page.first_baseline(), ASCENDER);
    let glyphs = glyphs_of(&page);
    assert_eq!(glyphs.len(), 6);
    assert_eq!(glyphs[3].2, LINE_HEIGHT + ASCENDER);
}
