#![forbid(unsafe_code)]

//! Grapheme Cost Corpus Tests
//!
//! Checks that truncation cost, slicing and inline layout agree on what a
//! "character" is across scripts:
//! - Basic ASCII
//! - CJK ideographs and fullwidth forms (two cells, one unit)
//! - Halfwidth Katakana
//! - Combining marks
//! - Emoji modifier, flag and ZWJ sequences
//! - CRLF, the one ASCII pair forming a single cluster

use elide_text::{
    Element, InlineItem, Node, WidthCache, WrapOptions, grapheme_count, grapheme_prefix,
    line_count, pieces_plain_text, tokenize, wrap_inline,
};
use unicode_width::UnicodeWidthStr;

// =============================================================================
// Corpus
// =============================================================================

#[derive(Debug, Clone)]
struct CostCase {
    input: &'static str,
    description: &'static str,
    graphemes: usize,
    /// Cell width, when unicode-width is unambiguous about it.
    cells: Option<usize>,
}

impl CostCase {
    const fn new(input: &'static str, description: &'static str, graphemes: usize, cells: usize) -> Self {
        Self {
            input,
            description,
            graphemes,
            cells: Some(cells),
        }
    }

    const fn graphemes_only(input: &'static str, description: &'static str, graphemes: usize) -> Self {
        Self {
            input,
            description,
            graphemes,
            cells: None,
        }
    }
}

const CORPUS: &[CostCase] = &[
    CostCase::new("hello", "ascii word", 5, 5),
    CostCase::new("a b", "ascii with space", 3, 3),
    CostCase::new("你好", "cjk ideographs", 2, 4),
    CostCase::new("日本語テキスト", "japanese mixed", 7, 14),
    CostCase::new("ｈｅｌｌｏ", "fullwidth latin", 5, 10),
    CostCase::new("ｱｲｳ", "halfwidth katakana", 3, 3),
    CostCase::new("e\u{0301}", "e + combining acute", 1, 1),
    CostCase::new("n\u{0303}o", "n + combining tilde, o", 2, 2),
    CostCase::graphemes_only("👍🏽", "emoji with skin tone", 1),
    CostCase::graphemes_only("🇺🇸", "regional indicator flag", 1),
    CostCase::graphemes_only("👨‍👩‍👧", "zwj family", 1),
    CostCase::graphemes_only("a👨‍👩‍👧b", "zwj between ascii", 3),
    CostCase::graphemes_only("a\r\nb", "crlf in ascii", 3),
    CostCase::graphemes_only("é\r\nb", "crlf after accented letter", 3),
    CostCase::graphemes_only("\r\r\n", "lone cr then crlf", 2),
];

// =============================================================================
// Cost
// =============================================================================

#[test]
fn corpus_grapheme_counts() {
    for case in CORPUS {
        assert_eq!(
            grapheme_count(case.input),
            case.graphemes,
            "{}: {:?}",
            case.description,
            case.input
        );
    }
}

#[test]
fn corpus_cell_widths() {
    for case in CORPUS {
        if let Some(cells) = case.cells {
            assert_eq!(case.input.width(), cells, "{}", case.description);
        }
    }
}

#[test]
fn corpus_unit_cost_matches_grapheme_count() {
    for case in CORPUS {
        let seq = tokenize(&[Node::from(case.input)]);
        assert_eq!(seq.total_cost(), case.graphemes, "{}", case.description);
    }
}

#[test]
fn width_cache_agrees_with_unicode_width() {
    let mut cache = WidthCache::new(64);
    for case in CORPUS {
        assert_eq!(cache.get_or_compute(case.input), case.input.width(), "{}", case.description);
    }
    // Second pass is served entirely from the cache.
    let misses = cache.stats().misses;
    for case in CORPUS {
        let _ = cache.get_or_compute(case.input);
    }
    assert_eq!(cache.stats().misses, misses);
}

// =============================================================================
// Slicing
// =============================================================================

#[test]
fn corpus_prefixes_never_split_clusters() {
    for case in CORPUS {
        for k in 0..=case.graphemes {
            let prefix = grapheme_prefix(case.input, k);
            assert_eq!(grapheme_count(prefix), k, "{} k={k}", case.description);
            assert!(case.input.starts_with(prefix));
        }
    }
}

#[test]
fn crlf_costs_the_same_in_any_script() {
    let ascii = tokenize(&[Node::from("a\r\nb")]);
    let accented = tokenize(&[Node::from("é\r\nb")]);
    assert_eq!(ascii.total_cost(), accented.total_cost());
}

#[test]
fn slicing_keeps_crlf_whole() {
    let seq = tokenize(&[Node::from("a\r\nb")]);
    assert_eq!(pieces_plain_text(&seq.slice(1)), "a");
    assert_eq!(pieces_plain_text(&seq.slice(2)), "a\r\n");
    assert_eq!(grapheme_prefix("a\r\nb", 2), "a\r\n");
}

#[test]
fn slicing_mixed_script_content() {
    let content = vec![
        Node::from("你好 "),
        Node::from(Element::new("badge").child("NEW")),
        Node::from(" e\u{0301}t\u{0301}e\u{0301}"),
    ];
    let seq = tokenize(&content);
    assert_eq!(seq.total_cost(), 3 + 1 + 4);

    assert_eq!(pieces_plain_text(&seq.slice(2)), "你好");
    assert_eq!(pieces_plain_text(&seq.slice(4)), "你好 NEW");
    assert_eq!(pieces_plain_text(&seq.slice(6)), "你好 NEW e\u{0301}");
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn cjk_wraps_by_cell_width() {
    let lines = wrap_inline(&[InlineItem::Text("日本語テキスト")], &WrapOptions::new(6));
    assert_eq!(lines, vec!["日本語", "テキス", "ト"]);
}

#[test]
fn combining_marks_take_no_extra_cells() {
    let mut cache = WidthCache::new(16);
    let text = "e\u{0301}e\u{0301}e\u{0301}";
    assert_eq!(line_count(&[InlineItem::Text(text)], &WrapOptions::new(3), &mut cache), 1);
}

#[test]
fn element_label_is_an_unbreakable_box() {
    let lines = wrap_inline(
        &[InlineItem::Text("ok "), InlineItem::Atomic("ｈｅｌｌｏ")],
        &WrapOptions::new(10),
    );
    assert_eq!(lines, vec!["ok", "ｈｅｌｌｏ"]);
}
