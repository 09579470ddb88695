#![forbid(unsafe_code)]

//! Presentation assembly.
//!
//! Turns a sliced body plus the truncation verdict into what a host renders:
//!
//! ```text
//! [body pieces] [marker?] [suffix pieces] [actions]
//! ```
//!
//! wrapped, when truncated and collapsed, in a disclosure (tooltip/popover)
//! or a native title carrying the original full text. The same assembly is
//! used for probe renders, so anything that takes space during display also
//! takes space while measuring.

use bitflags::bitflags;
use elide_text::{ContentSequence, Piece};

use crate::actions::{Action, Affordances, action_row};
use crate::config::{EllipsisOptions, ShowFullText};

bitflags! {
    /// Inline decorations the host wraps content with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Decorations: u8 {
        const BOLD      = 0b0000_0001;
        const UNDERLINE = 0b0000_0010;
        const STRIKE    = 0b0000_0100;
        const CODE      = 0b0000_1000;
        const MARK      = 0b0001_0000;
    }
}

/// Full-text disclosure attached to truncated content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disclosure<'a> {
    /// Tooltip or popover.
    pub kind: ShowFullText,
    /// The original, untruncated text.
    pub text: &'a str,
}

/// What to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation<'a> {
    /// Content prefix.
    pub body: Vec<Piece<'a>>,
    /// Truncation marker, when shown.
    pub marker: Option<&'a str>,
    /// Trailing content.
    pub suffix: Vec<Piece<'a>>,
    /// Action controls in display order.
    pub actions: Vec<Action<'a>>,
    /// Tooltip/popover with the full text.
    pub disclosure: Option<Disclosure<'a>>,
    /// Native title with the full text when no disclosure is configured.
    pub title: Option<&'a str>,
    /// Host should clip natively to one line.
    pub css_clip: bool,
    /// Inline decorations.
    pub decorations: Decorations,
}

impl<'a> Presentation<'a> {
    /// Plain text of everything that takes space, actions included.
    ///
    /// Elements contribute their text content; actions their label.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = elide_text::pieces_plain_text(&self.body);
        if let Some(marker) = self.marker {
            out.push_str(marker);
        }
        out.push_str(&elide_text::pieces_plain_text(&self.suffix));
        for action in &self.actions {
            out.push_str(action.label());
        }
        out
    }

    /// Apply decorations.
    #[must_use]
    pub fn with_decorations(mut self, decorations: Decorations) -> Self {
        self.decorations = decorations;
        self
    }
}

/// Inputs of [`assemble`].
#[derive(Debug, Clone, Copy)]
pub struct AssembleInput<'a> {
    /// Options supplying marker, labels and disclosure mode.
    pub options: &'a EllipsisOptions,
    /// Tokenized suffix.
    pub suffix: &'a ContentSequence,
    /// Original full text for disclosure.
    pub full_text: &'a str,
    /// Edit/copy controls.
    pub affordances: Affordances,
    /// Whether content is cut (or would be, when expanded).
    pub is_truncated: bool,
    /// Whether content is expanded.
    pub expanded: bool,
    /// Whether native single-line clipping is in effect.
    pub css_clip: bool,
}

/// Assemble a presentation around `body`.
#[must_use]
pub fn assemble<'a>(body: Vec<Piece<'a>>, input: AssembleInput<'a>) -> Presentation<'a> {
    let AssembleInput {
        options,
        suffix,
        full_text,
        affordances,
        is_truncated,
        expanded,
        css_clip,
    } = input;

    let marker = (is_truncated && !expanded && !css_clip).then_some(options.marker.as_str());
    let collapsed_cut = is_truncated && !expanded;
    let disclosure = match options.show_full_text {
        ShowFullText::None => None,
        kind if collapsed_cut => Some(Disclosure { kind, text: full_text }),
        _ => None,
    };
    let title = (collapsed_cut && options.show_full_text == ShowFullText::None).then_some(full_text);

    Presentation {
        body,
        marker,
        suffix: suffix.slice(suffix.total_cost()),
        actions: action_row(options, affordances, is_truncated, expanded),
        disclosure,
        title,
        css_clip: css_clip && !expanded,
        decorations: Decorations::empty(),
    }
}
