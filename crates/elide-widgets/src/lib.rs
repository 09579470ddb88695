#![forbid(unsafe_code)]

//! Layout-feedback ellipsis engine and typography composition.
//!
//! The engine finds the longest prefix of rich content that fits in a row
//! budget without knowing any glyph metrics. It asks the host to lay out
//! invisible probes, reads back their heights, and binary-searches the prefix
//! length over content cost units (graphemes for text, one per element).
//!
//! # Modules
//!
//! - [`config`]: options, row limits and callbacks
//! - [`measure`]: the measurement state machine
//! - [`assemble`]: presentation around a sliced body
//! - [`probe`]: probe renders, [`MeasurementProbe`] and the terminal [`CellProbe`]
//! - [`engine`]: [`EllipsisEngine`], the render/measure loop
//! - [`typography`]: resize throttling, editing, copying and visual props
//!
//! # Example
//!
//! ```
//! use elide_text::{Element, Node};
//! use elide_widgets::{
//!     CellProbe, EllipsisConfig, EllipsisEngine, EllipsisOptions, LayoutReport, MeasurementProbe,
//!     Probe, Render,
//! };
//!
//! let content = vec![
//!     Node::from("Read the "),
//!     Node::from(Element::new("a").child("release notes")),
//!     Node::from(" before upgrading any production cluster."),
//! ];
//! let options = EllipsisOptions::default().css_only(false).expandable(true);
//! let mut engine = EllipsisEngine::new(EllipsisConfig::new(options)).with_content(content);
//! engine.set_width(30);
//!
//! // One host render pass per iteration.
//! let mut probe = CellProbe::new();
//! loop {
//!     let report = match engine.render() {
//!         Render::Measure { generation, probes } => {
//!             let mut report = LayoutReport::empty().for_generation(generation);
//!             for p in &probes {
//!                 match p {
//!                     Probe::Baseline { .. } => report.baseline = probe.render(p),
//!                     Probe::Mirror { .. } => report.mirror = probe.render(p),
//!                 }
//!             }
//!             report
//!         }
//!         Render::Display(_) => break,
//!     };
//!     engine.on_layout(report);
//! }
//!
//! assert!(engine.is_truncated());
//! assert!(engine.presentation().plain_text().ends_with("…Expand"));
//! ```

pub mod actions;
pub mod assemble;
pub mod config;
pub mod engine;
pub mod error;
pub mod measure;
pub mod probe;
pub mod typography;

pub use actions::{Action, ActionKind, Affordances, ExpandState, ToggleSource, action_row};
pub use assemble::{AssembleInput, Decorations, Disclosure, Presentation, assemble};
pub use config::{
    DEFAULT_MARKER, EllipsisConfig, EllipsisHooks, EllipsisOptions, ExpandLabels, Rows,
    ShowFullText,
};
pub use engine::{DriverLimits, EllipsisEngine, Render, Resolution};
pub use error::{ConfigError, EngineError};
pub use measure::{LayoutReport, MeasureState, MeasurementPhase, MeasurementWindow, ProbePlan};
pub use probe::{CellProbe, MeasurementProbe, Probe};
pub use typography::{
    Activation, HeadingLevel, TextType, Typography, TypographyHooks, TypographyKind,
    TypographyProps, TypographyView,
};
