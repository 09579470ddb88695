#![forbid(unsafe_code)]

//! Probe renders and the measurement capability.
//!
//! The engine never sees glyph metrics. During measurement it asks the host
//! to lay out invisible [`Probe`]s and report their heights. Hosts with a
//! render/commit cycle feed heights back through
//! [`EllipsisEngine::on_layout`](crate::engine::EllipsisEngine::on_layout);
//! hosts that can measure synchronously implement [`MeasurementProbe`] and let
//! [`EllipsisEngine::resolve_with`](crate::engine::EllipsisEngine::resolve_with)
//! run the whole search.
//!
//! [`CellProbe`] is a ready-made probe for terminal-cell layout.
//!
//! # Example
//!
//! ```
//! use elide_widgets::probe::{MeasurementProbe, Probe};
//!
//! // A fake probe: every line is 10 units tall, 20 characters per line.
//! let mut fake = |probe: &Probe<'_>| match probe {
//!     Probe::Baseline { .. } => Some(10),
//!     Probe::Mirror { presentation, .. } => {
//!         let chars = presentation.plain_text().chars().count() as u32;
//!         Some(10 * chars.div_ceil(20).max(1))
//!     }
//! };
//! assert_eq!(fake.render(&Probe::baseline()), Some(10));
//! ```

use std::borrow::Cow;

use elide_text::{InlineItem, Piece, WidthCache, WrapMode, WrapOptions, line_count};

use crate::assemble::Presentation;

/// Sample rendered to learn the height of one line.
///
/// Covers an ascender and two descenders.
pub const BASELINE_SAMPLE: &str = "hxj";

/// An invisible render whose height the host measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<'a> {
    /// Single unwrapped line of [`BASELINE_SAMPLE`].
    Baseline {
        /// Text to render.
        sample: &'static str,
    },
    /// Content laid out at the container width.
    Mirror {
        /// Container width in host units.
        width: u32,
        /// What to lay out.
        presentation: Presentation<'a>,
    },
}

impl Probe<'_> {
    /// The baseline probe.
    #[must_use]
    pub fn baseline() -> Self {
        Self::Baseline {
            sample: BASELINE_SAMPLE,
        }
    }

    /// Stable lowercase name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Baseline { .. } => "baseline",
            Self::Mirror { .. } => "mirror",
        }
    }
}

/// Something that can lay out a probe and report its height.
///
/// Returning `None` or `Some(0)` means the probe could not be laid out yet;
/// the engine stays put and asks again.
pub trait MeasurementProbe {
    /// Lay out `probe` and return its height in host units.
    fn render(&mut self, probe: &Probe<'_>) -> Option<u32>;
}

impl<F> MeasurementProbe for F
where
    F: FnMut(&Probe<'_>) -> Option<u32>,
{
    fn render(&mut self, probe: &Probe<'_>) -> Option<u32> {
        self(probe)
    }
}

/// Rendering used for element content in cell layout.
///
/// Elements with no text still occupy a cell.
const EMPTY_ELEMENT: &str = "\u{FFFC}";

enum Part<'a> {
    Text(&'a str),
    Atomic(Cow<'a, str>),
}

fn push_pieces<'a>(parts: &mut Vec<Part<'a>>, pieces: &[Piece<'a>]) {
    for piece in pieces {
        match piece {
            Piece::Text(text) => parts.push(Part::Text(*text)),
            Piece::Element(el) => {
                let text = el.text_content();
                parts.push(Part::Atomic(if text.is_empty() {
                    Cow::Borrowed(EMPTY_ELEMENT)
                } else {
                    Cow::Owned(text)
                }));
            }
        }
    }
}

/// Flatten a presentation into layout parts in display order.
fn layout_parts<'a>(presentation: &'a Presentation<'a>) -> Vec<Part<'a>> {
    let mut parts = Vec::new();
    push_pieces(&mut parts, &presentation.body);
    if let Some(marker) = presentation.marker {
        parts.push(Part::Text(marker));
    }
    push_pieces(&mut parts, &presentation.suffix);
    for action in &presentation.actions {
        // Controls sit apart from the text they follow.
        parts.push(Part::Text(" "));
        parts.push(Part::Atomic(Cow::Borrowed(action.label())));
    }
    parts
}

/// Probe laying content out on a terminal-cell grid.
///
/// Width is in cells and every line is `line_height` units tall (1 for a
/// plain terminal). Text wraps at word boundaries with grapheme fallback;
/// elements and controls never break.
#[derive(Debug)]
pub struct CellProbe {
    line_height: u32,
    mode: WrapMode,
    cache: WidthCache,
}

impl Default for CellProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl CellProbe {
    /// Probe with one unit per line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_height: 1,
            mode: WrapMode::WordChar,
            cache: WidthCache::default(),
        }
    }

    /// Set the height of one line. Zero is treated as one.
    #[must_use]
    pub fn line_height(mut self, line_height: u32) -> Self {
        self.line_height = line_height.max(1);
        self
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn wrap_mode(mut self, mode: WrapMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of lines `presentation` takes at `width` cells.
    #[must_use]
    pub fn lines(&mut self, presentation: &Presentation<'_>, width: u32) -> usize {
        let parts = layout_parts(presentation);
        let items: Vec<InlineItem<'_>> = parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => InlineItem::Text(text),
                Part::Atomic(label) => InlineItem::Atomic(label),
            })
            .collect();
        let options = WrapOptions::new(width as usize).mode(self.mode);
        line_count(&items, &options, &mut self.cache)
    }

    /// Width cache statistics.
    #[must_use]
    pub fn cache_stats(&self) -> elide_text::CacheStats {
        self.cache.stats()
    }
}

impl MeasurementProbe for CellProbe {
    fn render(&mut self, probe: &Probe<'_>) -> Option<u32> {
        match probe {
            Probe::Baseline { .. } => Some(self.line_height),
            Probe::Mirror { width: 0, .. } => None,
            Probe::Mirror { width, presentation } => {
                let lines = u32::try_from(self.lines(presentation, *width)).unwrap_or(u32::MAX);
                Some(lines.saturating_mul(self.line_height))
            }
        }
    }
}
