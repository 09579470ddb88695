#![forbid(unsafe_code)]

//! Action row and expansion state.
//!
//! The action row trails every presentation: an expand/collapse toggle when
//! content is (or was) cut, then edit and copy controls when those
//! affordances are on. Controls take space, so probes include them too.

use crate::config::EllipsisOptions;

/// What triggered an expand toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleSource {
    /// Mouse or touch activation.
    Pointer,
    /// Keyboard activation.
    Keyboard,
    /// Host code toggled it.
    Programmatic,
}

/// Interactive affordances besides expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Affordances {
    /// An edit control is shown.
    pub editable: bool,
    /// A copy control is shown.
    pub copyable: bool,
}

impl Affordances {
    /// No edit or copy controls.
    pub const NONE: Self = Self {
        editable: false,
        copyable: false,
    };

    /// Toggle the edit control.
    #[must_use]
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Toggle the copy control.
    #[must_use]
    pub fn copyable(mut self, copyable: bool) -> Self {
        self.copyable = copyable;
        self
    }
}

/// Label of the edit control.
pub const EDIT_LABEL: &str = "[edit]";
/// Label of the copy control.
pub const COPY_LABEL: &str = "[copy]";

/// One control in the action row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Expand/collapse toggle showing the label for the current state.
    Expand {
        /// Whether content is currently expanded.
        expanded: bool,
        /// Toggle label.
        label: &'a str,
    },
    /// Start inline editing.
    Edit,
    /// Copy the full text.
    Copy,
}

/// Which control an [`Action`] is, without its borrowed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Expand/collapse toggle.
    Expand,
    /// Edit control.
    Edit,
    /// Copy control.
    Copy,
}

impl Action<'_> {
    /// The control's kind.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Expand { .. } => ActionKind::Expand,
            Self::Edit => ActionKind::Edit,
            Self::Copy => ActionKind::Copy,
        }
    }

    /// Text the control renders as.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Expand { label, .. } => *label,
            Self::Edit => EDIT_LABEL,
            Self::Copy => COPY_LABEL,
        }
    }
}

/// Controls to show after the content, in display order.
///
/// The toggle appears when expandable and either truncated (to expand) or
/// already expanded (to collapse).
#[must_use]
pub fn action_row(
    options: &EllipsisOptions,
    affordances: Affordances,
    is_truncated: bool,
    expanded: bool,
) -> Vec<Action<'_>> {
    let mut actions = Vec::with_capacity(3);
    if options.expandable && (is_truncated || expanded) {
        actions.push(Action::Expand {
            expanded,
            label: options.expand_labels.for_state(expanded),
        });
    }
    if affordances.editable {
        actions.push(Action::Edit);
    }
    if affordances.copyable {
        actions.push(Action::Copy);
    }
    actions
}

/// Expansion state merging a controlled value with an internal fallback.
///
/// While a controlled value is set it always wins; toggling only reports the
/// request. Without one, toggling flips the internal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExpandState {
    controlled: Option<bool>,
    internal: bool,
}

impl ExpandState {
    /// State from a controlled value and an initial internal value.
    #[must_use]
    pub fn new(controlled: Option<bool>, default_expanded: bool) -> Self {
        Self {
            controlled,
            internal: default_expanded,
        }
    }

    /// Effective expansion.
    #[inline]
    #[must_use]
    pub fn get(&self) -> bool {
        self.controlled.unwrap_or(self.internal)
    }

    /// Whether a controlled value is in effect.
    #[must_use]
    pub fn is_controlled(&self) -> bool {
        self.controlled.is_some()
    }

    /// Replace the controlled value. Releasing control keeps the internal value.
    pub fn set_controlled(&mut self, controlled: Option<bool>) {
        self.controlled = controlled;
    }

    /// Request the opposite of the effective state and return the request.
    pub fn toggle(&mut self) -> bool {
        let requested = !self.get();
        if self.controlled.is_none() {
            self.internal = requested;
        }
        requested
    }
}
