#![forbid(unsafe_code)]

//! The ellipsis engine.
//!
//! [`EllipsisEngine`] owns content, configuration and a [`MeasureState`], and
//! turns them into render output. Measurement is a render/measure loop:
//!
//! 1. [`EllipsisEngine::render`] returns [`Render::Measure`] with the probes
//!    the current phase needs, stamped with the current generation.
//! 2. The host lays them out invisibly and reports heights through
//!    [`EllipsisEngine::on_layout`], carrying the same stamp.
//! 3. Once resolved, `render` returns [`Render::Display`] with the final
//!    presentation.
//!
//! Any change to content, width or ellipsis-affecting options restarts the
//! cycle and bumps the generation; reports stamped for an earlier cycle are
//! dropped.
//!
//! # Example
//!
//! ```
//! use elide_text::Node;
//! use elide_widgets::config::{EllipsisConfig, EllipsisOptions, Rows};
//! use elide_widgets::engine::EllipsisEngine;
//! use elide_widgets::probe::CellProbe;
//!
//! let options = EllipsisOptions::default().rows(Rows::new(2).unwrap()).css_only(false);
//! let mut engine = EllipsisEngine::new(EllipsisConfig::new(options))
//!     .with_content(vec![Node::from("The quick brown fox jumps over the lazy dog")]);
//! engine.set_width(16);
//!
//! let resolution = engine.resolve_with(&mut CellProbe::new()).unwrap();
//! assert!(resolution.is_truncated);
//! assert!(resolution.prefix_len < resolution.total_cost);
//! assert!(engine.presentation().plain_text().ends_with('…'));
//! ```

use elide_text::{ContentSequence, Node, plain_text, tokenize};

use crate::actions::{Affordances, ExpandState, ToggleSource};
use crate::assemble::{AssembleInput, Presentation, assemble};
use crate::config::{EllipsisConfig, ExpandLabels, Rows};
use crate::error::EngineError;
use crate::measure::{LayoutReport, MeasureState, MeasurementPhase, MeasurementWindow, ProbePlan};
use crate::probe::{MeasurementProbe, Probe};

/// Consecutive passes without a usable height before the driver gives up.
pub const DEFAULT_MAX_STALLED: usize = 3;

/// What the host should render now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Render<'a> {
    /// Invisible probes to lay out and measure.
    Measure {
        /// Cycle the probes belong to; copy it into the [`LayoutReport`].
        generation: u64,
        /// Probes to lay out.
        probes: Vec<Probe<'a>>,
    },
    /// Visible output.
    Display(Presentation<'a>),
}

/// Outcome of a completed measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Phase the engine settled in.
    pub phase: MeasurementPhase,
    /// Number of cost units displayed.
    pub prefix_len: usize,
    /// Total cost of the content.
    pub total_cost: usize,
    /// Whether content is cut (or would be, when expanded or clipped natively).
    pub is_truncated: bool,
}

/// Limits for [`EllipsisEngine::resolve_with_limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverLimits {
    /// Maximum passes that change state. `None` derives it from the content
    /// size: the baseline pass plus one pass per halving.
    pub max_passes: Option<usize>,
    /// Consecutive passes without progress before failing.
    pub max_stalled: usize,
}

impl Default for DriverLimits {
    fn default() -> Self {
        Self {
            max_passes: None,
            max_stalled: DEFAULT_MAX_STALLED,
        }
    }
}

impl DriverLimits {
    /// Set an explicit pass budget.
    #[must_use]
    pub fn max_passes(mut self, passes: usize) -> Self {
        self.max_passes = Some(passes);
        self
    }

    /// Set the stall tolerance (at least one).
    #[must_use]
    pub fn max_stalled(mut self, attempts: usize) -> Self {
        self.max_stalled = attempts.max(1);
        self
    }
}

/// Passes a correct search can take over `total` units.
fn pass_budget(total: usize) -> usize {
    (usize::BITS - total.leading_zeros()) as usize + 2
}

/// Everything whose change invalidates a measurement.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResetKey {
    rows: Option<Rows>,
    marker: String,
    suffix: ContentSequence,
    css_clip: bool,
    expanded: bool,
    expandable: bool,
    expand_labels: ExpandLabels,
    affordances: Affordances,
    watches_truncation: bool,
}

/// Layout-feedback ellipsis engine.
#[derive(Debug)]
pub struct EllipsisEngine {
    content: Vec<Node>,
    sequence: ContentSequence,
    full_text: String,
    suffix: ContentSequence,
    config: EllipsisConfig,
    affordances: Affordances,
    expand: ExpandState,
    width: Option<u32>,
    state: MeasureState,
    reported_truncated: bool,
    generation: u64,
    last_reset: &'static str,
}

impl EllipsisEngine {
    /// Engine with no content and no known width.
    #[must_use]
    pub fn new(config: EllipsisConfig) -> Self {
        let expand = ExpandState::new(config.options.expanded, config.options.default_expanded);
        let suffix = tokenize(config.options.suffix.as_deref().unwrap_or_default());
        let mut engine = Self {
            content: Vec::new(),
            sequence: ContentSequence::default(),
            full_text: String::new(),
            suffix,
            config,
            affordances: Affordances::NONE,
            expand,
            width: None,
            state: MeasureState::default(),
            reported_truncated: false,
            generation: 0,
            last_reset: "init",
        };
        engine.reset("init");
        engine
    }

    /// Set content (builder form).
    #[must_use]
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.set_content(content);
        self
    }

    /// Set edit/copy affordances (builder form).
    #[must_use]
    pub fn with_affordances(mut self, affordances: Affordances) -> Self {
        self.set_affordances(affordances);
        self
    }

    // ── Inputs ──────────────────────────────────────────────────────────

    /// Replace the content. Restarts measurement if it differs structurally.
    pub fn set_content(&mut self, content: Vec<Node>) {
        let sequence = tokenize(&content);
        self.full_text = plain_text(&content);
        self.content = content;
        if sequence != self.sequence {
            self.sequence = sequence;
            self.reset("content");
        }
    }

    /// Set the container width. Restarts measurement if it changed.
    pub fn set_width(&mut self, width: u32) {
        if self.width != Some(width) {
            self.width = Some(width);
            self.reset("width");
        }
    }

    /// Replace the configuration.
    ///
    /// Restarts measurement when anything affecting layout changed: row
    /// limit, marker, suffix, effective native clipping, expansion, toggle
    /// presence or labels, or whether a truncation callback is registered.
    pub fn set_config(&mut self, config: EllipsisConfig) {
        let before = self.reset_key();
        self.suffix = tokenize(config.options.suffix.as_deref().unwrap_or_default());
        self.expand.set_controlled(config.options.expanded);
        self.config = config;
        if self.reset_key() != before {
            self.reset("config");
        }
    }

    /// Set edit/copy affordances.
    pub fn set_affordances(&mut self, affordances: Affordances) {
        if self.affordances != affordances {
            self.affordances = affordances;
            self.reset("affordances");
        }
    }

    /// Set or release the controlled expansion state.
    pub fn set_expanded(&mut self, expanded: Option<bool>) {
        let before = self.expand.get();
        self.expand.set_controlled(expanded);
        if self.expand.get() != before {
            self.reset("expanded");
        }
    }

    /// Activate the expand toggle.
    ///
    /// Reports the requested state to `on_expand`. When expansion is not
    /// controlled the engine also applies it. Returns the requested state.
    pub fn toggle_expanded(&mut self, source: ToggleSource) -> bool {
        let before = self.expand.get();
        let requested = self.expand.toggle();
        self.config.hooks.expand_requested(requested, source);
        if self.expand.get() != before {
            self.reset("expanded");
        }
        requested
    }

    // ── Measurement loop ────────────────────────────────────────────────

    /// Probes to measure, or the final presentation.
    #[must_use]
    pub fn render(&self) -> Render<'_> {
        match self.state.probe_plan() {
            ProbePlan::Baseline { needs_line_height } => {
                let mut probes = Vec::with_capacity(2);
                if needs_line_height {
                    probes.push(Probe::baseline());
                }
                probes.push(self.mirror(self.sequence.total_cost(), false));
                Render::Measure {
                    generation: self.generation,
                    probes,
                }
            }
            ProbePlan::Prefix { len } => Render::Measure {
                generation: self.generation,
                probes: vec![self.mirror(len, true)],
            },
            ProbePlan::None => Render::Display(self.presentation()),
        }
    }

    /// Feed back the heights measured for the probes of the last [`render`](Self::render).
    ///
    /// Returns whether the measurement advanced. Missing or zero heights
    /// leave it where it was, and so does a report whose generation is not
    /// the current one.
    pub fn on_layout(&mut self, report: LayoutReport) -> bool {
        if report.generation != self.generation {
            elide_core::debug!(
                target: "elide.measure",
                reported = report.generation,
                current = self.generation,
                "stale layout report dropped"
            );
            return false;
        }
        let before = self.state;
        self.state = before.observe(report);
        let advanced = self.state != before;

        if self.state.phase() != before.phase() {
            elide_core::debug!(
                target: "elide.measure",
                from = before.phase().as_str(),
                to = self.state.phase().as_str(),
                low = self.state.window().low,
                mid = self.state.window().mid,
                high = self.state.window().high,
                line_height = self.state.line_height(),
                truncated = self.state.is_truncated(),
                "phase transition"
            );
        } else if advanced {
            elide_core::trace!(
                target: "elide.measure",
                low = self.state.window().low,
                mid = self.state.window().mid,
                high = self.state.window().high,
                height = report.mirror,
                "window narrowed"
            );
        } else {
            elide_core::trace!(
                target: "elide.measure",
                phase = self.state.phase().as_str(),
                "layout not ready"
            );
        }

        self.sync_truncation();
        advanced
    }

    /// Run the whole measurement against a synchronous probe.
    pub fn resolve_with<P>(&mut self, probe: &mut P) -> Result<Resolution, EngineError>
    where
        P: MeasurementProbe + ?Sized,
    {
        self.resolve_with_limits(probe, DriverLimits::default())
    }

    /// [`resolve_with`](Self::resolve_with) with explicit limits.
    pub fn resolve_with_limits<P>(
        &mut self,
        probe: &mut P,
        limits: DriverLimits,
    ) -> Result<Resolution, EngineError>
    where
        P: MeasurementProbe + ?Sized,
    {
        let budget = limits
            .max_passes
            .unwrap_or_else(|| pass_budget(self.sequence.total_cost()));
        let _span = elide_core::debug_span!(
            target: "elide.measure",
            "resolve",
            total_cost = self.sequence.total_cost(),
            width = self.width
        )
        .entered();

        let mut passes = 0usize;
        let mut progressed = 0usize;
        let mut stalled = 0usize;

        while self.state.phase().is_measuring() {
            let report = match self.render() {
                Render::Measure { generation, probes } => measure_all(generation, &probes, probe),
                Render::Display(_) => break,
            };
            passes += 1;

            if self.on_layout(report) {
                progressed += 1;
                stalled = 0;
                if progressed > budget && self.state.phase().is_measuring() {
                    elide_core::warn!(target: "elide.measure", passes, "pass budget exhausted");
                    return Err(EngineError::PassLimitExceeded {
                        passes,
                        phase: self.state.phase(),
                    });
                }
            } else {
                stalled += 1;
                if stalled >= limits.max_stalled {
                    elide_core::warn!(target: "elide.measure", attempts = stalled, "probe stalled");
                    return Err(EngineError::ProbeStalled {
                        attempts: stalled,
                        phase: self.state.phase(),
                    });
                }
            }
        }

        Ok(self.resolution())
    }

    // ── Outputs ─────────────────────────────────────────────────────────

    /// Final presentation for the current state.
    ///
    /// Before a cycle resolves this is the full, undecorated content.
    #[must_use]
    pub fn presentation(&self) -> Presentation<'_> {
        let resolved = self.state.phase() == MeasurementPhase::Resolved;
        let len = self
            .state
            .resolved_len()
            .unwrap_or(self.sequence.total_cost());
        self.assemble(len, resolved && self.state.is_truncated(), resolved && self.css_clip())
    }

    /// Summary of the current measurement.
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution {
            phase: self.state.phase(),
            prefix_len: self
                .state
                .resolved_len()
                .unwrap_or(self.sequence.total_cost()),
            total_cost: self.sequence.total_cost(),
            is_truncated: self.state.is_truncated(),
        }
    }

    /// Whether content is cut, or would be when shown in full.
    #[inline]
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.state.is_truncated()
    }

    /// Whether content is expanded.
    #[inline]
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expand.get()
    }

    /// Whether native single-line clipping replaces the search.
    #[must_use]
    pub fn css_clip(&self) -> bool {
        self.config.css_clip_eligible(self.affordances)
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MeasurementPhase {
        self.state.phase()
    }

    /// Current search window.
    #[must_use]
    pub fn window(&self) -> MeasurementWindow {
        self.state.window()
    }

    /// The measurement state.
    #[must_use]
    pub fn state(&self) -> &MeasureState {
        &self.state
    }

    /// Total cost of the content.
    #[must_use]
    pub fn total_cost(&self) -> usize {
        self.sequence.total_cost()
    }

    /// Cached line height of the current cycle.
    #[must_use]
    pub fn line_height(&self) -> Option<u32> {
        self.state.line_height()
    }

    /// Container width, once known.
    #[must_use]
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Source content.
    #[must_use]
    pub fn content(&self) -> &[Node] {
        &self.content
    }

    /// Tokenized content.
    #[must_use]
    pub fn sequence(&self) -> &ContentSequence {
        &self.sequence
    }

    /// Untruncated plain text, as disclosed in tooltips and titles.
    #[must_use]
    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EllipsisConfig {
        &self.config
    }

    /// Active affordances.
    #[must_use]
    pub fn affordances(&self) -> Affordances {
        self.affordances
    }

    /// Number of measurement cycles started so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// What started the current cycle: `"init"`, `"content"`, `"width"`,
    /// `"config"`, `"affordances"` or `"expanded"`.
    #[must_use]
    pub fn last_reset(&self) -> &'static str {
        self.last_reset
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn skip_search(&self) -> bool {
        self.css_clip() || self.expand.get()
    }

    fn reset_key(&self) -> ResetKey {
        let options = &self.config.options;
        ResetKey {
            rows: options.rows,
            marker: options.marker.clone(),
            suffix: self.suffix.clone(),
            css_clip: self.css_clip(),
            expanded: self.expand.get(),
            expandable: options.expandable,
            expand_labels: options.expand_labels.clone(),
            affordances: self.affordances,
            watches_truncation: self.config.hooks.has_truncation_change(),
        }
    }

    fn reset(&mut self, reason: &'static str) {
        let total = self.sequence.total_cost();
        let was_truncated = self.state.is_truncated();
        let rows = self.config.options.rows;
        self.state = match (rows, self.width) {
            (Some(_), None) => MeasureState::idle(total, was_truncated),
            _ => MeasureState::reset(total, rows, self.skip_search(), was_truncated),
        };
        self.generation += 1;
        self.last_reset = reason;
        elide_core::debug!(
            target: "elide.measure",
            reason = self.last_reset,
            generation = self.generation,
            phase = self.state.phase().as_str(),
            total_cost = total,
            width = self.width,
            "measurement reset"
        );
        self.sync_truncation();
    }

    fn sync_truncation(&mut self) {
        let truncated = self.state.is_truncated();
        if truncated != self.reported_truncated {
            self.reported_truncated = truncated;
            elide_core::info!(target: "elide.measure", truncated, "truncation changed");
            self.config.hooks.truncation_changed(truncated);
        }
    }

    fn mirror(&self, len: usize, truncated: bool) -> Probe<'_> {
        Probe::Mirror {
            width: self.width.unwrap_or(0),
            presentation: self.assemble(len, truncated, false),
        }
    }

    fn assemble(&self, len: usize, is_truncated: bool, css_clip: bool) -> Presentation<'_> {
        assemble(
            self.sequence.slice(len),
            AssembleInput {
                options: &self.config.options,
                suffix: &self.suffix,
                full_text: &self.full_text,
                affordances: self.affordances,
                is_truncated,
                expanded: self.expand.get(),
                css_clip,
            },
        )
    }
}

fn measure_all<P>(generation: u64, probes: &[Probe<'_>], probe: &mut P) -> LayoutReport
where
    P: MeasurementProbe + ?Sized,
{
    let mut report = LayoutReport::empty().for_generation(generation);
    for p in probes {
        let height = probe.render(p);
        elide_core::trace!(target: "elide.measure", probe = p.kind(), height, "probe measured");
        match p {
            Probe::Baseline { .. } => report.baseline = height,
            Probe::Mirror { .. } => report.mirror = height,
        }
    }
    report
}
