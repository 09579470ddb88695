#![forbid(unsafe_code)]

//! End-to-end properties of the ellipsis engine.
//!
//! A fake probe lays text out on a fixed grid: every `per_line` characters
//! take one line of `line` units. Heights are monotone in the prefix length,
//! so the search result can be checked against the exact boundary.

use std::sync::{Arc, Mutex};

use elide_text::{Element, Node};
use elide_widgets::{
    Affordances, CellProbe, EllipsisConfig, EllipsisEngine, EllipsisHooks, EllipsisOptions,
    LayoutReport, MeasurementPhase, MeasurementProbe, Presentation, Probe, ProbePlan, Render, Rows,
    ShowFullText, ToggleSource,
};
use proptest::prelude::*;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct GridProbe {
    line: u32,
    per_line: usize,
    /// Count the marker and controls, or the body only.
    count_decorations: bool,
    calls: usize,
}

impl GridProbe {
    fn new(line: u32, per_line: usize) -> Self {
        Self {
            line,
            per_line,
            count_decorations: true,
            calls: 0,
        }
    }

    fn body_only(mut self) -> Self {
        self.count_decorations = false;
        self
    }

    fn chars(&self, presentation: &Presentation<'_>) -> usize {
        if self.count_decorations {
            presentation.plain_text().chars().count()
        } else {
            elide_text::pieces_plain_text(&presentation.body).chars().count()
        }
    }

    fn height_of(&self, chars: usize) -> u32 {
        self.line * (chars.div_ceil(self.per_line).max(1) as u32)
    }
}

impl MeasurementProbe for GridProbe {
    fn render(&mut self, probe: &Probe<'_>) -> Option<u32> {
        self.calls += 1;
        match probe {
            Probe::Baseline { .. } => Some(self.line),
            Probe::Mirror { presentation, .. } => Some(self.height_of(self.chars(presentation))),
        }
    }
}

fn rows(n: u32) -> Rows {
    Rows::new(n).unwrap()
}

fn text(s: &str) -> Vec<Node> {
    vec![Node::from(s)]
}

fn letters(n: usize) -> String {
    (0..n).map(|i| char::from(b'a' + (i % 26) as u8)).collect()
}

fn engine(options: EllipsisOptions, content: Vec<Node>, width: u32) -> EllipsisEngine {
    let mut engine = EllipsisEngine::new(EllipsisConfig::new(options)).with_content(content);
    engine.set_width(width);
    engine
}

// ============================================================================
// Disabled and fast paths
// ============================================================================

#[test]
fn disabled_passes_content_through() {
    let content = vec![
        Node::from("keep "),
        Node::from(Element::new("em").child("all")),
        Node::from(" of it"),
    ];
    let mut engine = engine(EllipsisOptions::disabled(), content, 3);
    let mut probe = GridProbe::new(10, 1);
    let resolution = engine.resolve_with(&mut probe).unwrap();

    assert_eq!(probe.calls, 0);
    assert_eq!(resolution.phase, MeasurementPhase::Disabled);
    assert!(!resolution.is_truncated);
    let Render::Display(p) = engine.render() else {
        panic!("disabled engine must display");
    };
    assert_eq!(p.plain_text(), "keep all of it");
    assert_eq!(p.marker, None);
    assert_eq!(p.title, None);
}

#[test]
fn fitting_content_resolves_after_baseline() {
    let mut engine = engine(EllipsisOptions::default().css_only(false), text("short"), 80);
    let mut probe = GridProbe::new(18, 80);
    let resolution = engine.resolve_with(&mut probe).unwrap();

    assert_eq!(probe.calls, 2, "one baseline sample plus one mirror");
    assert_eq!(resolution.prefix_len, 5);
    assert!(!resolution.is_truncated);
    assert_eq!(engine.window().low, 0);
    assert_eq!(engine.window().high, 5);
}

#[test]
fn css_only_clips_natively() {
    // One row, default marker, nothing else: the host clips.
    let mut engine = engine(EllipsisOptions::default(), text(&letters(50)), 100);
    assert!(engine.css_clip());
    let mut probe = GridProbe::new(20, 10);
    let resolution = engine.resolve_with(&mut probe).unwrap();

    assert_eq!(probe.calls, 2, "no search passes");
    assert!(resolution.is_truncated);
    assert_eq!(resolution.prefix_len, 50);
    let p = engine.presentation();
    assert!(p.css_clip);
    assert_eq!(p.marker, None);
    assert_eq!(p.title, Some(engine.full_text()));
}

#[test]
fn css_only_falls_back_with_custom_marker() {
    let options = EllipsisOptions::default().marker("...");
    let mut engine = engine(options, text(&letters(50)), 100);
    assert!(!engine.css_clip());
    engine.resolve_with(&mut GridProbe::new(20, 10)).unwrap();
    let p = engine.presentation();
    assert!(!p.css_clip);
    assert_eq!(p.marker, Some("..."));
}

// ============================================================================
// Search
// ============================================================================

#[test]
fn forty_units_two_rows() {
    let options = EllipsisOptions::default().rows(rows(2)).css_only(false);
    let mut engine = engine(options, text(&letters(40)), 160);
    let mut probe = GridProbe::new(20, 16).body_only();
    let resolution = engine.resolve_with(&mut probe).unwrap();

    assert_eq!(resolution.prefix_len, 32);
    assert!(resolution.is_truncated);
    assert_eq!(engine.presentation().plain_text(), format!("{}…", letters(32)));
}

#[test]
fn elements_are_never_split() {
    let content = vec![Node::from("abc "), Node::from(Element::new("img").child("wide"))];
    let options = EllipsisOptions::default().css_only(false);
    let mut engine = engine(options, content, 4);
    let resolution = engine.resolve_with(&mut CellProbe::new()).unwrap();

    assert_eq!(resolution.total_cost, 5);
    assert_eq!(resolution.prefix_len, 3);
    let p = engine.presentation();
    assert_eq!(p.plain_text(), "abc…");
    assert!(p.body.iter().all(|piece| matches!(piece, elide_text::Piece::Text(_))));
}

#[test]
fn width_change_starts_new_cycle() {
    let options = EllipsisOptions::default().css_only(false);
    let mut engine = engine(options, text(&letters(200)), 300);
    engine.resolve_with(&mut GridProbe::new(10, 30)).unwrap();
    assert_eq!(engine.phase(), MeasurementPhase::Resolved);
    let generation = engine.generation();

    engine.set_width(150);
    assert_eq!(engine.phase(), MeasurementPhase::ProbingBaseline);
    assert_eq!(engine.generation(), generation + 1);
    assert_eq!(engine.line_height(), None, "line height is re-probed");
    assert_eq!(engine.state().probe_plan(), ProbePlan::Baseline { needs_line_height: true });
    assert!(engine.is_truncated(), "verdict carries until decided");
}

#[test]
fn reports_from_before_a_reset_are_dropped() {
    let options = EllipsisOptions::default().rows(rows(2)).css_only(false);
    let mut engine = engine(options, text(&letters(100)), 50);
    let stamp = engine.generation();
    assert!(engine.on_layout(LayoutReport::baseline(10, 30).for_generation(stamp)));
    assert_eq!(engine.phase(), MeasurementPhase::Searching);

    engine.set_content(text("tiny"));
    // Heights measured for the old content arrive after the reset.
    assert!(!engine.on_layout(LayoutReport::baseline(10, 10).for_generation(stamp)));
    assert_eq!(engine.phase(), MeasurementPhase::ProbingBaseline);
    assert_eq!(engine.line_height(), None);

    let current = engine.generation();
    assert!(engine.on_layout(LayoutReport::baseline(10, 10).for_generation(current)));
    assert_eq!(engine.phase(), MeasurementPhase::Resolved);
    assert!(!engine.is_truncated());
}

#[test]
fn width_change_mid_cycle_is_measured_again() {
    let options = EllipsisOptions::default().css_only(false);
    let mut engine = engine(options, text(&letters(200)), 300);
    let Render::Measure { generation, .. } = engine.render() else {
        panic!("expected probes");
    };

    engine.set_width(150);
    // The wider layout fit on one line, which says nothing about 150.
    assert!(!engine.on_layout(LayoutReport::baseline(10, 10).for_generation(generation)));
    assert_eq!(engine.phase(), MeasurementPhase::ProbingBaseline);

    engine.resolve_with(&mut CellProbe::new()).unwrap();
    assert_eq!(engine.phase(), MeasurementPhase::Resolved);
    assert!(engine.is_truncated());
}

#[test]
fn unstamped_reports_are_ignored_once_a_cycle_started() {
    let options = EllipsisOptions::default().css_only(false);
    let mut engine = engine(options, text(&letters(40)), 10);
    assert!(engine.generation() > 0);
    assert!(!engine.on_layout(LayoutReport::baseline(10, 10)));
    assert_eq!(engine.phase(), MeasurementPhase::ProbingBaseline);
}

// ============================================================================
// Expansion and callbacks
// ============================================================================

#[test]
fn expanding_preserves_truncation() {
    let options = EllipsisOptions::default().css_only(false).expandable(true);
    let mut engine = engine(options, text(&letters(60)), 20);
    engine.resolve_with(&mut GridProbe::new(10, 20)).unwrap();
    assert!(engine.is_truncated());

    engine.toggle_expanded(ToggleSource::Pointer);
    engine.resolve_with(&mut GridProbe::new(10, 20)).unwrap();
    assert!(engine.is_expanded());
    assert!(engine.is_truncated());
    let p = engine.presentation();
    assert_eq!(p.marker, None);
    assert_eq!(p.plain_text(), format!("{}Collapse", letters(60)));

    engine.toggle_expanded(ToggleSource::Keyboard);
    engine.resolve_with(&mut GridProbe::new(10, 20)).unwrap();
    assert!(!engine.is_expanded());
    assert!(engine.presentation().plain_text().ends_with("…Expand"));
}

#[test]
fn callback_reports_only_changes() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let hooks = EllipsisHooks::new().on_truncation_change(move |t| sink.lock().unwrap().push(t));
    let options = EllipsisOptions::default();
    let mut engine =
        EllipsisEngine::new(EllipsisConfig::new(options).with_hooks(hooks)).with_content(text(&letters(30)));
    assert!(!engine.css_clip(), "a truncation callback disables native clipping");

    for width in [100, 10, 12, 100, 100, 5] {
        engine.set_width(width);
        let per_line = width as usize;
        engine.resolve_with(&mut GridProbe::new(10, per_line)).unwrap();
    }
    assert_eq!(*log.lock().unwrap(), vec![true, false, true]);
}

#[test]
fn disclosure_carries_original_text() {
    let options = EllipsisOptions::default()
        .css_only(false)
        .show_full_text(ShowFullText::Popover);
    let content = vec![Node::from("first "), Node::from(Element::new("b").child("bold")), Node::from(" last")];
    let mut engine = engine(options, content, 6);
    engine.resolve_with(&mut CellProbe::new()).unwrap();
    let p = engine.presentation();
    let disclosure = p.disclosure.expect("truncated content discloses");
    assert_eq!(disclosure.kind, ShowFullText::Popover);
    assert_eq!(disclosure.text, "first bold last");
    assert_eq!(p.title, None);
}

#[test]
fn controls_are_measured() {
    let content = text("alpha beta gamma delta epsilon");
    let plain = {
        let mut e = engine(EllipsisOptions::default().css_only(false), content.clone(), 20);
        e.resolve_with(&mut CellProbe::new()).unwrap();
        e.resolution().prefix_len
    };
    let with_copy = {
        let mut e = engine(EllipsisOptions::default(), content, 20)
            .with_affordances(Affordances::NONE.copyable(true));
        e.resolve_with(&mut CellProbe::new()).unwrap();
        e.resolution().prefix_len
    };
    assert!(with_copy < plain);
}

#[test]
fn cjk_content_in_cells() {
    let options = EllipsisOptions::default().rows(rows(2)).css_only(false);
    let mut engine = engine(options, text("日本語のテキストはとても長いです"), 10);
    engine.resolve_with(&mut CellProbe::new()).unwrap();
    assert!(engine.is_truncated());
    let shown = engine.presentation();
    assert!(CellProbe::new().lines(&shown, 10) <= 2);
    assert!(shown.plain_text().ends_with('…'));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Under monotone heights the displayed prefix is the longest one that fits.
    #[test]
    fn prefix_is_maximal(total in 1usize..300, per_line in 1usize..40, n in 1u32..4) {
        let options = EllipsisOptions::default().rows(rows(n)).css_only(false);
        let mut engine = engine(options, text(&letters(total)), 100);
        let mut probe = GridProbe::new(12, per_line);
        let resolution = engine.resolve_with(&mut probe).unwrap();

        let max = 12 * n;
        let k = resolution.prefix_len;
        if probe.height_of(total) <= max {
            prop_assert!(!resolution.is_truncated);
            prop_assert_eq!(k, total);
        } else {
            prop_assert!(resolution.is_truncated);
            // Truncated probes carry the one-character marker.
            prop_assert!(k == 0 || probe.height_of(k + 1) <= max);
            prop_assert!(probe.height_of(k + 2) > max);
        }
    }

    /// Identical inputs resolve to identical output.
    #[test]
    fn resolution_is_idempotent(total in 1usize..200, per_line in 1usize..30) {
        let run = || {
            let options = EllipsisOptions::default().rows(rows(2)).css_only(false);
            let mut engine = engine(options, text(&letters(total)), 100);
            engine.resolve_with(&mut GridProbe::new(16, per_line)).unwrap()
        };
        prop_assert_eq!(run(), run());
    }

    /// Search takes logarithmically many passes.
    #[test]
    fn passes_are_logarithmic(total in 2usize..2000, per_line in 1usize..50) {
        let options = EllipsisOptions::default().css_only(false);
        let mut engine = engine(options, text(&letters(total)), 100);
        let mut probe = GridProbe::new(10, per_line);
        engine.resolve_with(&mut probe).unwrap();
        // Two probes for the baseline pass, one per search pass.
        let bound = 2 + (usize::BITS - total.leading_zeros()) as usize;
        prop_assert!(probe.calls <= bound);
    }
}
