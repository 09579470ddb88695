#![forbid(unsafe_code)]

//! Typography controller.
//!
//! [`Typography`] is the host-facing composition around an
//! [`EllipsisEngine`]: it throttles container resizes, owns the expand and
//! edit state, handles the action row (expand, edit, copy) and carries the
//! visual props a host needs to render the block (element tag, class names,
//! decorations).
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use elide_text::Node;
//! use elide_widgets::config::{EllipsisConfig, EllipsisOptions};
//! use elide_widgets::probe::CellProbe;
//! use elide_widgets::typography::{Typography, TypographyProps, TypographyView};
//!
//! let config = EllipsisConfig::new(EllipsisOptions::default().css_only(false));
//! let mut text = Typography::new(TypographyProps::default(), config)
//!     .with_content(vec![Node::from("a sentence that will not fit")]);
//!
//! let t0 = Instant::now();
//! assert!(text.on_resize_at(12, t0));
//! text.resolve_with(&mut CellProbe::new()).unwrap();
//! assert!(text.is_truncated());
//!
//! // Resizes inside the window are held until it closes.
//! assert!(!text.on_resize_at(40, t0 + Duration::from_millis(50)));
//! assert!(text.tick_at(t0 + Duration::from_millis(200)));
//! text.resolve_with(&mut CellProbe::new()).unwrap();
//! assert!(!text.is_truncated());
//!
//! let TypographyView::Content { tag, .. } = text.view() else { unreachable!() };
//! assert_eq!(tag, "div");
//! ```

use std::time::Instant;

use elide_core::throttle::{Throttle, ThrottleConfig};
use elide_text::Node;

use crate::actions::{ActionKind, Affordances, ExpandState, ToggleSource};
use crate::assemble::Decorations;
use crate::config::EllipsisConfig;
use crate::engine::{EllipsisEngine, Render, Resolution};
use crate::error::EngineError;
use crate::measure::LayoutReport;
use crate::probe::MeasurementProbe;

/// Class name prefix for typography blocks.
pub const CLASS_PREFIX: &str = "elide-typography";

/// Heading level of a title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HeadingLevel {
    /// Level 1.
    #[default]
    H1,
    /// Level 2.
    H2,
    /// Level 3.
    H3,
    /// Level 4.
    H4,
    /// Level 5.
    H5,
}

impl HeadingLevel {
    /// Heading element tag.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::H1 => "h1",
            Self::H2 => "h2",
            Self::H3 => "h3",
            Self::H4 => "h4",
            Self::H5 => "h5",
        }
    }
}

/// What kind of block the typography renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypographyKind {
    /// Inline text.
    #[default]
    Text,
    /// Paragraph, optionally as a block quote.
    Paragraph {
        /// Render as a quotation.
        blockquote: bool,
    },
    /// Heading.
    Title(HeadingLevel),
}

impl TypographyKind {
    /// Element tag for the block.
    ///
    /// Inline text becomes a block element when it has a row limit, since a
    /// row limit only applies to block layout.
    #[must_use]
    pub fn element_tag(self, limited: bool) -> &'static str {
        match self {
            Self::Text if limited => "div",
            Self::Text => "span",
            Self::Paragraph { blockquote: true } => "blockquote",
            Self::Paragraph { blockquote: false } => "div",
            Self::Title(level) => level.tag(),
        }
    }
}

/// Semantic color of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextType {
    /// Primary accent.
    Primary,
    /// De-emphasized.
    Secondary,
    /// Success.
    Success,
    /// Warning.
    Warning,
    /// Error.
    Error,
}

impl TextType {
    /// Stable lowercase name used in class names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Visual and interaction props.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypographyProps {
    /// Block kind.
    pub kind: TypographyKind,
    /// Semantic color.
    pub text_type: Option<TextType>,
    /// Rendered as disabled.
    pub disabled: bool,
    /// Inline decorations.
    pub decorations: Decorations,
    /// Background color for [`Decorations::MARK`].
    pub mark_color: Option<String>,
    /// Edit and copy controls.
    pub affordances: Affordances,
    /// Controlled editing state. `None` lets the controller own it.
    pub editing: Option<bool>,
    /// Resize coalescing.
    pub resize: ThrottleConfig,
}

impl TypographyProps {
    /// Set the block kind.
    #[must_use]
    pub fn kind(mut self, kind: TypographyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the semantic color.
    #[must_use]
    pub fn text_type(mut self, text_type: TextType) -> Self {
        self.text_type = Some(text_type);
        self
    }

    /// Render as disabled.
    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Set inline decorations.
    #[must_use]
    pub fn decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self
    }

    /// Highlight with a custom color. Implies [`Decorations::MARK`].
    #[must_use]
    pub fn mark_color(mut self, color: impl Into<String>) -> Self {
        self.decorations |= Decorations::MARK;
        self.mark_color = Some(color.into());
        self
    }

    /// Show the edit control.
    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.affordances = self.affordances.editable(editable);
        self
    }

    /// Show the copy control.
    #[must_use]
    pub fn copyable(mut self, copyable: bool) -> Self {
        self.affordances = self.affordances.copyable(copyable);
        self
    }

    /// Control the editing state.
    #[must_use]
    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = Some(editing);
        self
    }

    /// Set resize coalescing.
    #[must_use]
    pub fn resize(mut self, resize: ThrottleConfig) -> Self {
        self.resize = resize;
        self
    }
}

/// Callback receiving text.
pub type OnText = Box<dyn Fn(&str) + Send + Sync>;
/// Callback for editing state requests.
pub type OnEditing = Box<dyn Fn(bool) + Send + Sync>;

/// Typography callbacks.
#[derive(Default)]
pub struct TypographyHooks {
    on_editing_change: Option<OnEditing>,
    on_edit_change: Option<OnText>,
    on_edit_end: Option<OnText>,
    on_copy: Option<OnText>,
}

impl std::fmt::Debug for TypographyHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypographyHooks")
            .field("on_editing_change", &self.on_editing_change.is_some())
            .field("on_edit_change", &self.on_edit_change.is_some())
            .field("on_edit_end", &self.on_edit_end.is_some())
            .field("on_copy", &self.on_copy.is_some())
            .finish()
    }
}

impl TypographyHooks {
    /// Create an empty hooks instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with the requested editing state when editing starts or ends.
    #[must_use]
    pub fn on_editing_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_editing_change = Some(Box::new(callback));
        self
    }

    /// Called with the draft whenever it changes.
    #[must_use]
    pub fn on_edit_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_edit_change = Some(Box::new(callback));
        self
    }

    /// Called with the final draft when editing is committed.
    #[must_use]
    pub fn on_edit_end<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_edit_end = Some(Box::new(callback));
        self
    }

    /// Called with the copied text.
    #[must_use]
    pub fn on_copy<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_copy = Some(Box::new(callback));
        self
    }
}

fn call(hook: Option<&OnText>, text: &str) {
    if let Some(cb) = hook {
        cb(text);
    }
}

/// What the host should render.
#[derive(Debug)]
pub enum TypographyView<'a> {
    /// Inline editor with the current draft.
    Editing {
        /// Draft text.
        draft: &'a str,
    },
    /// Content block.
    Content {
        /// Element tag.
        tag: &'static str,
        /// Class names, most general first.
        classes: Vec<String>,
        /// Background color for marked text.
        mark_color: Option<&'a str>,
        /// Probes or final presentation, decorations applied.
        render: Render<'a>,
    },
}

/// Result of activating an action control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Expand toggle: the requested state.
    Expanded(bool),
    /// Editing requested.
    Editing(bool),
    /// Copy: the copied text.
    Copied(String),
}

/// Typography block with ellipsis, resize throttling, editing and copying.
#[derive(Debug)]
pub struct Typography {
    engine: EllipsisEngine,
    props: TypographyProps,
    hooks: TypographyHooks,
    widths: Throttle<u32>,
    editing: ExpandState,
    draft: String,
}

impl Typography {
    /// Controller with no content and no known width.
    #[must_use]
    pub fn new(props: TypographyProps, config: EllipsisConfig) -> Self {
        let engine = EllipsisEngine::new(config).with_affordances(props.affordances);
        Self {
            engine,
            widths: Throttle::new(props.resize),
            editing: ExpandState::new(props.editing, false),
            props,
            hooks: TypographyHooks::default(),
            draft: String::new(),
        }
    }

    /// Attach hooks.
    #[must_use]
    pub fn with_hooks(mut self, hooks: TypographyHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set content (builder form).
    #[must_use]
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.set_content(content);
        self
    }

    /// Replace the content.
    pub fn set_content(&mut self, content: Vec<Node>) {
        self.engine.set_content(content);
    }

    /// Replace the ellipsis configuration.
    pub fn set_config(&mut self, config: EllipsisConfig) {
        self.engine.set_config(config);
    }

    /// Replace the props.
    ///
    /// A changed resize configuration starts a fresh throttle seeded with the
    /// width already applied.
    pub fn set_props(&mut self, props: TypographyProps) {
        if props.resize != self.props.resize {
            self.widths = match self.engine.width() {
                Some(width) => Throttle::with_initial(props.resize, width),
                None => Throttle::new(props.resize),
            };
        }
        self.engine.set_affordances(props.affordances);
        self.editing.set_controlled(props.editing);
        self.props = props;
    }

    // ── Resize ──────────────────────────────────────────────────────────

    /// Container resized now. Returns whether the width was applied.
    pub fn on_resize(&mut self, width: u32) -> bool {
        self.on_resize_at(width, Instant::now())
    }

    /// Container resized at `now`. Returns whether the width was applied.
    pub fn on_resize_at(&mut self, width: u32, now: Instant) -> bool {
        let applied = self.widths.push_at(width, now);
        self.apply_width(applied)
    }

    /// Release a held width if its window has closed now.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Release a held width if its window has closed at `now`.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let applied = self.widths.tick_at(now);
        self.apply_width(applied)
    }

    /// Time until a held width is released, if one is held.
    #[must_use]
    pub fn time_until_resize(&self, now: Instant) -> Option<std::time::Duration> {
        self.widths.time_until_release(now)
    }

    fn apply_width(&mut self, width: Option<u32>) -> bool {
        let Some(width) = width else {
            return false;
        };
        self.engine.set_width(width);
        true
    }

    // ── Measurement ─────────────────────────────────────────────────────

    /// See [`EllipsisEngine::on_layout`].
    pub fn on_layout(&mut self, report: LayoutReport) -> bool {
        self.engine.on_layout(report)
    }

    /// See [`EllipsisEngine::resolve_with`].
    pub fn resolve_with<P>(&mut self, probe: &mut P) -> Result<Resolution, EngineError>
    where
        P: MeasurementProbe + ?Sized,
    {
        self.engine.resolve_with(probe)
    }

    // ── Actions ─────────────────────────────────────────────────────────

    /// Activate a control from the action row.
    pub fn activate(&mut self, action: ActionKind, source: ToggleSource) -> Activation {
        match action {
            ActionKind::Expand => Activation::Expanded(self.engine.toggle_expanded(source)),
            ActionKind::Edit => Activation::Editing(self.start_editing()),
            ActionKind::Copy => Activation::Copied(self.copy()),
        }
    }

    /// Full text, reported to `on_copy`. The host puts it on the clipboard.
    pub fn copy(&self) -> String {
        let text = self.engine.full_text().to_owned();
        elide_core::debug!(target: "elide.typography", len = text.len(), "copy");
        call(self.hooks.on_copy.as_ref(), &text);
        text
    }

    /// Request editing. The draft starts from the full text.
    ///
    /// Returns whether the controller is now editing; under a controlled
    /// editing state that only changes when the host flips it.
    pub fn start_editing(&mut self) -> bool {
        if !self.editing.get() {
            self.draft = self.engine.full_text().to_owned();
            self.request_editing(true);
        }
        self.editing.get()
    }

    /// Replace the draft.
    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
        call(self.hooks.on_edit_change.as_ref(), &self.draft);
    }

    /// Commit the draft: reports it to `on_edit_end` and leaves editing.
    ///
    /// Returns the draft. Content is left unchanged; the host decides whether
    /// to feed the draft back in through [`set_content`](Self::set_content).
    pub fn finish_editing(&mut self) -> Option<String> {
        if !self.editing.get() {
            return None;
        }
        let draft = std::mem::take(&mut self.draft);
        call(self.hooks.on_edit_end.as_ref(), &draft);
        self.request_editing(false);
        Some(draft)
    }

    /// Leave editing and drop the draft without reporting it.
    pub fn cancel_editing(&mut self) {
        if self.editing.get() {
            self.draft.clear();
            self.request_editing(false);
        }
    }

    fn request_editing(&mut self, editing: bool) {
        if self.editing.get() != editing {
            let requested = self.editing.toggle();
            if let Some(cb) = &self.hooks.on_editing_change {
                cb(requested);
            }
        }
    }

    // ── Output ──────────────────────────────────────────────────────────

    /// What to render now.
    #[must_use]
    pub fn view(&self) -> TypographyView<'_> {
        if self.editing.get() {
            return TypographyView::Editing { draft: &self.draft };
        }
        let render = match self.engine.render() {
            Render::Display(presentation) => {
                Render::Display(presentation.with_decorations(self.props.decorations))
            }
            measure => measure,
        };
        TypographyView::Content {
            tag: self.element_tag(),
            classes: self.class_names(),
            mark_color: self.props.mark_color.as_deref(),
            render,
        }
    }

    /// Element tag for the content block.
    #[must_use]
    pub fn element_tag(&self) -> &'static str {
        self.props
            .kind
            .element_tag(self.engine.config().options.rows.is_some())
    }

    /// Class names for the content block.
    #[must_use]
    pub fn class_names(&self) -> Vec<String> {
        let mut classes = vec![CLASS_PREFIX.to_owned()];
        if self.engine.css_clip() && !self.engine.is_expanded() {
            classes.push(format!("{CLASS_PREFIX}-simple-ellipsis"));
        }
        if let Some(text_type) = self.props.text_type {
            classes.push(format!("{CLASS_PREFIX}-{}", text_type.as_str()));
        }
        if self.props.disabled {
            classes.push(format!("{CLASS_PREFIX}-disabled"));
        }
        classes
    }

    /// Element tags wrapping the content, outermost last.
    #[must_use]
    pub fn decoration_tags(&self) -> Vec<&'static str> {
        const TAGS: [(Decorations, &str); 5] = [
            (Decorations::BOLD, "b"),
            (Decorations::UNDERLINE, "u"),
            (Decorations::STRIKE, "del"),
            (Decorations::CODE, "code"),
            (Decorations::MARK, "mark"),
        ];
        TAGS.iter()
            .filter(|(flag, _)| self.props.decorations.contains(*flag))
            .map(|(_, tag)| *tag)
            .collect()
    }

    /// Whether content is cut.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.engine.is_truncated()
    }

    /// Whether content is expanded.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.engine.is_expanded()
    }

    /// Whether the inline editor is shown.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing.get()
    }

    /// Current draft.
    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Active props.
    #[must_use]
    pub fn props(&self) -> &TypographyProps {
        &self.props
    }

    /// The underlying engine.
    #[must_use]
    pub fn engine(&self) -> &EllipsisEngine {
        &self.engine
    }

    /// The underlying engine, mutably.
    pub fn engine_mut(&mut self) -> &mut EllipsisEngine {
        &mut self.engine
    }
}
