#![forbid(unsafe_code)]

//! Ellipsis configuration.
//!
//! Configuration is split into plain data ([`EllipsisOptions`], serializable
//! with the `serde` feature) and callbacks ([`EllipsisHooks`]). Both are
//! bundled in [`EllipsisConfig`], which is what the engine consumes.
//!
//! # Example
//!
//! ```
//! use elide_widgets::config::{EllipsisConfig, EllipsisHooks, EllipsisOptions, Rows, ShowFullText};
//!
//! let options = EllipsisOptions::default()
//!     .rows(Rows::new(2).unwrap())
//!     .show_full_text(ShowFullText::Tooltip)
//!     .expandable(true);
//!
//! let config = EllipsisConfig::new(options)
//!     .with_hooks(EllipsisHooks::new().on_truncation_change(|t| println!("truncated: {t}")));
//! assert_eq!(config.options.rows.map(Rows::get), Some(2));
//! ```

use std::num::NonZeroU32;

use elide_text::Node;

use crate::actions::{Affordances, ToggleSource};
use crate::error::ConfigError;

/// Default truncation marker.
pub const DEFAULT_MARKER: &str = "…";

/// Default expand toggle label.
pub const DEFAULT_EXPAND_LABEL: &str = "Expand";
/// Default collapse toggle label.
pub const DEFAULT_COLLAPSE_LABEL: &str = "Collapse";

/// A positive row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u32", into = "u32")
)]
pub struct Rows(NonZeroU32);

impl Rows {
    /// A single line.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Row limit of `rows` lines.
    pub fn new(rows: u32) -> Result<Self, ConfigError> {
        NonZeroU32::new(rows).map(Self).ok_or(ConfigError::ZeroRows)
    }

    /// The limit as a plain integer.
    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<u32> for Rows {
    type Error = ConfigError;

    fn try_from(rows: u32) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

impl From<Rows> for u32 {
    fn from(rows: Rows) -> Self {
        rows.get()
    }
}

/// Where the untruncated text is disclosed when content is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ShowFullText {
    /// No disclosure widget; a native title carries the full text instead.
    #[default]
    None,
    /// Hover tooltip.
    Tooltip,
    /// Click popover.
    Popover,
}

/// Labels of the expand toggle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpandLabels {
    /// Shown while collapsed.
    pub collapsed: String,
    /// Shown while expanded.
    pub expanded: String,
}

impl Default for ExpandLabels {
    fn default() -> Self {
        Self {
            collapsed: DEFAULT_EXPAND_LABEL.to_owned(),
            expanded: DEFAULT_COLLAPSE_LABEL.to_owned(),
        }
    }
}

impl ExpandLabels {
    /// Label for the given expansion state.
    #[must_use]
    pub fn for_state(&self, expanded: bool) -> &str {
        if expanded { &self.expanded } else { &self.collapsed }
    }
}

/// Plain-data ellipsis options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EllipsisOptions {
    /// Lines allowed before truncating. `None` disables truncation.
    pub rows: Option<Rows>,
    /// Marker appended to cut content.
    pub marker: String,
    /// Trailing content always shown after the (possibly cut) body.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub suffix: Option<Vec<Node>>,
    /// Prefer native single-line clipping when nothing else needs measuring.
    pub css_only: bool,
    /// Disclosure of the full text when truncated.
    pub show_full_text: ShowFullText,
    /// Show an expand/collapse toggle.
    pub expandable: bool,
    /// Toggle labels.
    pub expand_labels: ExpandLabels,
    /// Controlled expansion state. `None` leaves expansion to the engine.
    pub expanded: Option<bool>,
    /// Initial uncontrolled expansion state.
    pub default_expanded: bool,
}

impl Default for EllipsisOptions {
    fn default() -> Self {
        Self {
            rows: Some(Rows::ONE),
            marker: DEFAULT_MARKER.to_owned(),
            suffix: None,
            css_only: true,
            show_full_text: ShowFullText::None,
            expandable: false,
            expand_labels: ExpandLabels::default(),
            expanded: None,
            default_expanded: false,
        }
    }
}

impl EllipsisOptions {
    /// Options with truncation turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            rows: None,
            ..Self::default()
        }
    }

    /// Set the row limit.
    #[must_use]
    pub fn rows(mut self, rows: Rows) -> Self {
        self.rows = Some(rows);
        self
    }

    /// Remove the row limit.
    #[must_use]
    pub fn unlimited(mut self) -> Self {
        self.rows = None;
        self
    }

    /// Set the truncation marker.
    #[must_use]
    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set trailing content. An empty list clears it.
    #[must_use]
    pub fn suffix<I, N>(mut self, suffix: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        let nodes: Vec<Node> = suffix.into_iter().map(Into::into).collect();
        self.suffix = if nodes.is_empty() { None } else { Some(nodes) };
        self
    }

    /// Request native single-line clipping.
    #[must_use]
    pub fn css_only(mut self, css_only: bool) -> Self {
        self.css_only = css_only;
        self
    }

    /// Set the full-text disclosure.
    #[must_use]
    pub fn show_full_text(mut self, show: ShowFullText) -> Self {
        self.show_full_text = show;
        self
    }

    /// Show an expand/collapse toggle.
    #[must_use]
    pub fn expandable(mut self, expandable: bool) -> Self {
        self.expandable = expandable;
        self
    }

    /// Set toggle labels.
    #[must_use]
    pub fn expand_labels(mut self, collapsed: impl Into<String>, expanded: impl Into<String>) -> Self {
        self.expand_labels = ExpandLabels {
            collapsed: collapsed.into(),
            expanded: expanded.into(),
        };
        self
    }

    /// Control expansion from outside.
    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Initial expansion when uncontrolled.
    #[must_use]
    pub fn default_expanded(mut self, expanded: bool) -> Self {
        self.default_expanded = expanded;
        self
    }

    /// Whether a non-empty suffix is configured.
    #[inline]
    #[must_use]
    pub fn has_suffix(&self) -> bool {
        self.suffix.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Callback for truncation state changes.
pub type OnTruncationChange = Box<dyn Fn(bool) + Send + Sync>;
/// Callback for expand toggles: requested state and what triggered it.
pub type OnExpand = Box<dyn Fn(bool, ToggleSource) + Send + Sync>;

/// Ellipsis callbacks.
#[derive(Default)]
pub struct EllipsisHooks {
    on_truncation_change: Option<OnTruncationChange>,
    on_expand: Option<OnExpand>,
}

impl std::fmt::Debug for EllipsisHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EllipsisHooks")
            .field("on_truncation_change", &self.on_truncation_change.is_some())
            .field("on_expand", &self.on_expand.is_some())
            .finish()
    }
}

impl EllipsisHooks {
    /// Create an empty hooks instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when content becomes truncated or stops being truncated.
    ///
    /// Never called for the initial untruncated state.
    #[must_use]
    pub fn on_truncation_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_truncation_change = Some(Box::new(callback));
        self
    }

    /// Called when the expand toggle is activated.
    #[must_use]
    pub fn on_expand<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool, ToggleSource) + Send + Sync + 'static,
    {
        self.on_expand = Some(Box::new(callback));
        self
    }

    /// Check if a truncation-change hook is registered.
    pub fn has_truncation_change(&self) -> bool {
        self.on_truncation_change.is_some()
    }

    pub(crate) fn truncation_changed(&self, truncated: bool) {
        if let Some(ref cb) = self.on_truncation_change {
            cb(truncated);
        }
    }

    pub(crate) fn expand_requested(&self, expanded: bool, source: ToggleSource) {
        if let Some(ref cb) = self.on_expand {
            cb(expanded, source);
        }
    }
}

/// Options plus callbacks.
#[derive(Debug, Default)]
pub struct EllipsisConfig {
    /// Plain-data options.
    pub options: EllipsisOptions,
    /// Callbacks.
    pub hooks: EllipsisHooks,
}

impl EllipsisConfig {
    /// Config with no hooks.
    #[must_use]
    pub fn new(options: EllipsisOptions) -> Self {
        Self {
            options,
            hooks: EllipsisHooks::new(),
        }
    }

    /// Config with truncation turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(EllipsisOptions::disabled())
    }

    /// Attach hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: EllipsisHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Whether native single-line clipping can replace the measured search.
    ///
    /// Requires one row, the default marker, no suffix, no truncation
    /// callback, no expand toggle and no edit/copy affordances. Anything else
    /// falls back to the general search.
    #[must_use]
    pub fn css_clip_eligible(&self, affordances: Affordances) -> bool {
        let o = &self.options;
        o.css_only
            && o.rows == Some(Rows::ONE)
            && o.marker == DEFAULT_MARKER
            && !o.has_suffix()
            && !self.hooks.has_truncation_change()
            && !o.expandable
            && !affordances.editable
            && !affordances.copyable
    }
}
