#![forbid(unsafe_code)]

//! Measurement state machine.
//!
//! Finds the longest content prefix whose rendering fits in a row budget,
//! using nothing but measured heights of probe renders. The machine is a
//! plain value: [`MeasureState::reset`] starts a cycle and
//! [`MeasureState::observe`] consumes one [`LayoutReport`] and returns the
//! next state. No rendering happens here; the engine decides what to probe
//! from [`MeasureState::probe_plan`].
//!
//! # Phases
//!
//! ```text
//! Idle ──reset──▶ ProbingBaseline ──fits / skip──▶ Resolved (0, T, T)
//!                       │
//!                       └──overflows──▶ Searching ──converged──▶ Resolved (k, k, k)
//!
//! no row limit ─────────────────────────────────────────▶ Disabled
//! ```
//!
//! # Invariants
//!
//! - `low ≤ mid ≤ high ≤ T` at all times.
//! - While searching, `low` fits (or is 0) and `high` overflows.
//! - A zero or missing height never advances the machine.
//! - The line height is taken from the first valid baseline reading of a
//!   cycle and kept until the next reset.
//! - A prefix of length 0 is never probed.
//!
//! # Example
//!
//! ```
//! use elide_widgets::config::Rows;
//! use elide_widgets::measure::{LayoutReport, MeasureState, MeasurementPhase};
//!
//! // 40 units, two rows, 20px lines, natural height 60px.
//! let state = MeasureState::reset(40, Some(Rows::new(2).unwrap()), false, false);
//! let state = state.observe(LayoutReport::baseline(20, 60));
//! assert_eq!(state.phase(), MeasurementPhase::Searching);
//! assert_eq!(state.max_height(), Some(40));
//! assert!(state.is_truncated());
//! ```

use crate::config::Rows;

/// Active phase of a measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeasurementPhase {
    /// Nothing measured yet (no container width known).
    #[default]
    Idle,
    /// Waiting for the single-line baseline and the natural height.
    ProbingBaseline,
    /// Binary search over prefix lengths.
    Searching,
    /// Final prefix length known.
    Resolved,
    /// No row limit; content renders at natural size.
    Disabled,
}

impl MeasurementPhase {
    /// Whether the phase still needs probe renders.
    #[inline]
    #[must_use]
    pub fn is_measuring(self) -> bool {
        matches!(self, Self::ProbingBaseline | Self::Searching)
    }

    /// Stable lowercase name for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ProbingBaseline => "probing_baseline",
            Self::Searching => "searching",
            Self::Resolved => "resolved",
            Self::Disabled => "disabled",
        }
    }
}

/// Binary-search bounds over prefix lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeasurementWindow {
    /// Longest prefix known to fit.
    pub low: usize,
    /// Candidate being probed (or the final length once resolved).
    pub mid: usize,
    /// Shortest prefix known to overflow.
    pub high: usize,
}

impl MeasurementWindow {
    /// Starting window `(0, T/2, T)`.
    #[must_use]
    pub fn initial(total: usize) -> Self {
        Self {
            low: 0,
            mid: total / 2,
            high: total,
        }
    }

    /// Full-content window `(0, T, T)`.
    #[must_use]
    pub fn full(total: usize) -> Self {
        Self {
            low: 0,
            mid: total,
            high: total,
        }
    }

    /// Single-candidate window `(k, k, k)`.
    #[must_use]
    pub fn collapsed(k: usize) -> Self {
        Self {
            low: k,
            mid: k,
            high: k,
        }
    }

    /// Whether no untested candidate remains.
    #[inline]
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.high - self.low <= 1
    }

    /// Narrow after probing `mid`.
    #[must_use]
    pub fn narrow(self, fits: bool) -> Self {
        let (low, high) = if fits {
            (self.mid, self.high)
        } else {
            (self.low, self.mid)
        };
        Self {
            low,
            mid: low + (high - low) / 2,
            high,
        }
    }
}

/// Heights measured by the host for one render pass.
///
/// `None` or `Some(0)` mean the probe was not laid out yet. `generation`
/// names the measurement cycle the probes were rendered for; the engine
/// drops reports from any other cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutReport {
    /// Height of the single-line baseline probe.
    pub baseline: Option<u32>,
    /// Height of the content probe (full content or the candidate prefix).
    pub mirror: Option<u32>,
    /// Cycle stamp copied from [`Render::Measure`](crate::engine::Render::Measure).
    pub generation: u64,
}

impl LayoutReport {
    /// Report for the baseline pass.
    #[must_use]
    pub fn baseline(line_height: u32, natural_height: u32) -> Self {
        Self {
            baseline: Some(line_height),
            mirror: Some(natural_height),
            generation: 0,
        }
    }

    /// Report for a search pass.
    #[must_use]
    pub fn mirror(height: u32) -> Self {
        Self {
            baseline: None,
            mirror: Some(height),
            generation: 0,
        }
    }

    /// Report with nothing laid out.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Stamp the report with the cycle its probes were rendered for.
    #[must_use]
    pub fn for_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

#[inline]
fn usable(height: Option<u32>) -> Option<u32> {
    height.filter(|&h| h > 0)
}

/// What the next render pass must contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbePlan {
    /// Nothing to measure.
    None,
    /// Full content, plus the baseline sample if the line height is unknown.
    Baseline {
        /// Whether the baseline sample must be rendered.
        needs_line_height: bool,
    },
    /// The first `len` units with truncation decorations.
    Prefix {
        /// Candidate prefix length.
        len: usize,
    },
}

/// One measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeasureState {
    phase: MeasurementPhase,
    window: MeasurementWindow,
    total_cost: usize,
    rows: Option<Rows>,
    line_height: Option<u32>,
    skip_search: bool,
    is_truncated: bool,
}

impl MeasureState {
    /// Start a cycle.
    ///
    /// `skip_search` is set when native clipping or expansion means the full
    /// content is shown whatever it measures. `was_truncated` carries the
    /// previous verdict so it only changes once the new cycle decides.
    #[must_use]
    pub fn reset(total_cost: usize, rows: Option<Rows>, skip_search: bool, was_truncated: bool) -> Self {
        let base = Self {
            total_cost,
            rows,
            skip_search,
            ..Self::default()
        };
        if rows.is_none() {
            return Self {
                phase: MeasurementPhase::Disabled,
                window: MeasurementWindow::full(total_cost),
                ..base
            };
        }
        if total_cost == 0 {
            return Self {
                phase: MeasurementPhase::Resolved,
                ..base
            };
        }
        Self {
            phase: MeasurementPhase::ProbingBaseline,
            window: MeasurementWindow::initial(total_cost),
            is_truncated: was_truncated,
            ..base
        }
    }

    /// Idle state showing full content, keeping a previous verdict.
    #[must_use]
    pub fn idle(total_cost: usize, was_truncated: bool) -> Self {
        Self {
            window: MeasurementWindow::full(total_cost),
            total_cost,
            is_truncated: was_truncated,
            ..Self::default()
        }
    }

    /// Consume one layout report.
    #[must_use]
    pub fn observe(self, report: LayoutReport) -> Self {
        match self.phase {
            MeasurementPhase::ProbingBaseline => self.observe_baseline(report),
            MeasurementPhase::Searching => self.observe_search(report),
            MeasurementPhase::Idle | MeasurementPhase::Resolved | MeasurementPhase::Disabled => self,
        }
    }

    fn observe_baseline(mut self, report: LayoutReport) -> Self {
        if self.line_height.is_none() {
            self.line_height = usable(report.baseline);
        }
        let (Some(max_height), Some(natural)) = (self.max_height(), usable(report.mirror)) else {
            return self;
        };

        let overflows = natural > max_height;
        if !overflows || self.skip_search {
            self.phase = MeasurementPhase::Resolved;
            self.window = MeasurementWindow::full(self.total_cost);
            self.is_truncated = overflows;
            return self;
        }

        self.is_truncated = true;
        self.phase = MeasurementPhase::Searching;
        self.settle()
    }

    fn observe_search(mut self, report: LayoutReport) -> Self {
        let (Some(max_height), Some(height)) = (self.max_height(), usable(report.mirror)) else {
            return self;
        };
        self.window = self.window.narrow(height <= max_height);
        self.settle()
    }

    /// Resolve once no candidate is left to probe.
    fn settle(mut self) -> Self {
        if self.window.is_converged() {
            self.phase = MeasurementPhase::Resolved;
            self.window = MeasurementWindow::collapsed(self.window.low);
        }
        self
    }

    /// What the next pass must render.
    #[must_use]
    pub fn probe_plan(&self) -> ProbePlan {
        match self.phase {
            MeasurementPhase::ProbingBaseline => ProbePlan::Baseline {
                needs_line_height: self.line_height.is_none(),
            },
            MeasurementPhase::Searching => ProbePlan::Prefix { len: self.window.mid },
            _ => ProbePlan::None,
        }
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub fn phase(&self) -> MeasurementPhase {
        self.phase
    }

    /// Current search window.
    #[inline]
    #[must_use]
    pub fn window(&self) -> MeasurementWindow {
        self.window
    }

    /// Total content cost this cycle was started for.
    #[must_use]
    pub fn total_cost(&self) -> usize {
        self.total_cost
    }

    /// Cached line height, once the baseline has reported.
    #[must_use]
    pub fn line_height(&self) -> Option<u32> {
        self.line_height
    }

    /// `rows * line_height`, once the line height is known.
    #[must_use]
    pub fn max_height(&self) -> Option<u32> {
        let rows = self.rows?;
        Some(rows.get().saturating_mul(self.line_height?))
    }

    /// Whether content is (or would be, when shown in full) cut.
    #[inline]
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.is_truncated
    }

    /// Prefix length to display, once resolved or disabled.
    #[must_use]
    pub fn resolved_len(&self) -> Option<usize> {
        match self.phase {
            MeasurementPhase::Resolved | MeasurementPhase::Disabled | MeasurementPhase::Idle => {
                Some(self.window.mid)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: u32) -> Option<Rows> {
        Rows::new(n).ok()
    }

    /// Drive a full search against `height(k)`, returning the final state.
    fn drive(total: usize, rows_n: u32, line: u32, height: impl Fn(usize) -> u32) -> MeasureState {
        let mut state = MeasureState::reset(total, rows(rows_n), false, false);
        let mut guard = 0;
        while state.phase().is_measuring() {
            let report = match state.probe_plan() {
                ProbePlan::Baseline { .. } => LayoutReport::baseline(line, height(total)),
                ProbePlan::Prefix { len } => {
                    assert!(len > 0, "prefix 0 must never be probed");
                    LayoutReport::mirror(height(len))
                }
                ProbePlan::None => unreachable!(),
            };
            state = state.observe(report);
            guard += 1;
            assert!(guard < 64, "search did not terminate");
        }
        state
    }

    // ==========================================================================
    // Reset
    // ==========================================================================

    #[test]
    fn reset_without_rows_is_disabled() {
        let state = MeasureState::reset(10, None, false, true);
        assert_eq!(state.phase(), MeasurementPhase::Disabled);
        assert!(!state.is_truncated());
        assert_eq!(state.resolved_len(), Some(10));
    }

    #[test]
    fn reset_with_empty_content_resolves() {
        let state = MeasureState::reset(0, rows(2), false, true);
        assert_eq!(state.phase(), MeasurementPhase::Resolved);
        assert!(!state.is_truncated());
        assert_eq!(state.window(), MeasurementWindow::collapsed(0));
    }

    #[test]
    fn reset_opens_initial_window() {
        let state = MeasureState::reset(41, rows(1), false, false);
        assert_eq!(state.phase(), MeasurementPhase::ProbingBaseline);
        assert_eq!(state.window(), MeasurementWindow { low: 0, mid: 20, high: 41 });
        assert_eq!(state.probe_plan(), ProbePlan::Baseline { needs_line_height: true });
    }

    #[test]
    fn reset_keeps_previous_verdict_until_decided() {
        let state = MeasureState::reset(10, rows(1), false, true);
        assert!(state.is_truncated());
    }

    // ==========================================================================
    // Baseline
    // ==========================================================================

    #[test]
    fn fits_resolves_with_full_window() {
        let state = MeasureState::reset(30, rows(2), false, false).observe(LayoutReport::baseline(20, 40));
        assert_eq!(state.phase(), MeasurementPhase::Resolved);
        assert_eq!(state.window(), MeasurementWindow::full(30));
        assert!(!state.is_truncated());
    }

    #[test]
    fn skip_search_resolves_full_but_reports_overflow() {
        let state = MeasureState::reset(30, rows(1), true, false).observe(LayoutReport::baseline(20, 60));
        assert_eq!(state.phase(), MeasurementPhase::Resolved);
        assert_eq!(state.window(), MeasurementWindow::full(30));
        assert!(state.is_truncated());
    }

    #[test]
    fn overflow_starts_search() {
        let state = MeasureState::reset(40, rows(2), false, false).observe(LayoutReport::baseline(20, 60));
        assert_eq!(state.phase(), MeasurementPhase::Searching);
        assert_eq!(state.probe_plan(), ProbePlan::Prefix { len: 20 });
        assert_eq!(state.max_height(), Some(40));
    }

    #[test]
    fn missing_baseline_does_not_advance() {
        let start = MeasureState::reset(10, rows(1), false, false);
        assert_eq!(start.observe(LayoutReport::empty()), start);
        let zero = LayoutReport {
            baseline: Some(0),
            mirror: Some(50),
            generation: 0,
        };
        assert_eq!(start.observe(zero), start);
    }

    #[test]
    fn line_height_cached_before_mirror_is_ready() {
        let start = MeasureState::reset(10, rows(1), false, false);
        let partial = start.observe(LayoutReport {
            baseline: Some(18),
            mirror: None,
            generation: 0,
        });
        assert_eq!(partial.phase(), MeasurementPhase::ProbingBaseline);
        assert_eq!(partial.line_height(), Some(18));
        assert_eq!(partial.probe_plan(), ProbePlan::Baseline { needs_line_height: false });

        // A later, different baseline reading is ignored.
        let done = partial.observe(LayoutReport::baseline(99, 18));
        assert_eq!(done.line_height(), Some(18));
        assert_eq!(done.phase(), MeasurementPhase::Resolved);
    }

    // ==========================================================================
    // Search
    // ==========================================================================

    #[test]
    fn zero_height_during_search_is_ignored() {
        let searching = MeasureState::reset(40, rows(2), false, false).observe(LayoutReport::baseline(20, 60));
        assert_eq!(searching.observe(LayoutReport::mirror(0)), searching);
    }

    #[test]
    fn single_unit_overflow_resolves_to_zero_without_probing() {
        let state = MeasureState::reset(1, rows(1), false, false).observe(LayoutReport::baseline(20, 40));
        assert_eq!(state.phase(), MeasurementPhase::Resolved);
        assert_eq!(state.window(), MeasurementWindow::collapsed(0));
        assert!(state.is_truncated());
    }

    #[test]
    fn forty_unit_example_converges_to_boundary() {
        // One line per 16 units.
        let height = |k: usize| 20 * (k.div_ceil(16).max(1) as u32);
        let state = drive(40, 2, 20, height);
        assert_eq!(state.phase(), MeasurementPhase::Resolved);
        let k = state.window().mid;
        assert_eq!(k, 32);
        assert!(height(k) <= 40);
        assert!(height(k + 1) > 40);
        assert!(state.is_truncated());
    }

    #[test]
    fn search_observations_ignore_resolved() {
        let state = drive(40, 2, 20, |k| if k > 10 { 60 } else { 20 });
        assert_eq!(state.observe(LayoutReport::mirror(1)), state);
    }

    #[test]
    fn window_narrowing() {
        let w = MeasurementWindow::initial(10);
        assert_eq!(w.narrow(true), MeasurementWindow { low: 5, mid: 7, high: 10 });
        assert_eq!(w.narrow(false), MeasurementWindow { low: 0, mid: 2, high: 5 });
        assert!(MeasurementWindow { low: 4, mid: 4, high: 5 }.is_converged());
    }

    #[test]
    fn phase_names() {
        assert_eq!(MeasurementPhase::ProbingBaseline.as_str(), "probing_baseline");
        assert!(MeasurementPhase::Searching.is_measuring());
        assert!(!MeasurementPhase::Resolved.is_measuring());
    }
}
