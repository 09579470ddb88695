#![forbid(unsafe_code)]

//! Prefix slicing of tokenized content.
//!
//! [`slice`] rebuilds the first `k` cost units of a [`ContentSequence`] as a
//! list of renderable [`Piece`]s. Text units are cut on grapheme boundaries
//! when the budget runs out inside them; elements are included whole or not
//! at all. Pieces borrow from the sequence, so slicing never copies text.
//!
//! # Example
//! ```
//! use elide_text::content::{Element, Node, tokenize};
//! use elide_text::slice::{Piece, slice};
//!
//! let seq = tokenize(&[
//!     Node::from("hello "),
//!     Node::from(Element::new("icon")),
//!     Node::from(" world"),
//! ]);
//! assert_eq!(slice(&seq, 3), vec![Piece::Text("hel")]);
//! assert_eq!(slice(&seq, 7).len(), 2);
//! assert_eq!(slice(&seq, 9).last(), Some(&Piece::Text(" w")));
//! ```

use unicode_segmentation::UnicodeSegmentation;

use crate::content::{ContentSequence, ContentUnit, Element};

/// A renderable piece of sliced content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Text (a whole unit or a grapheme-aligned prefix of one).
    Text(&'a str),
    /// A whole element.
    Element(&'a Element),
}

impl<'a> Piece<'a> {
    /// The piece's text; elements contribute their text content.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(s) => (*s).to_owned(),
            Self::Element(el) => el.text_content(),
        }
    }

    fn from_unit(unit: &'a ContentUnit) -> Self {
        match unit {
            ContentUnit::Text { text, .. } => Self::Text(text),
            ContentUnit::Opaque(el) => Self::Element(el),
        }
    }
}

/// First `graphemes` extended grapheme clusters of `text`.
#[must_use]
pub fn grapheme_prefix(text: &str, graphemes: usize) -> &str {
    if crate::content::is_single_byte_clusters(text) {
        return &text[..graphemes.min(text.len())];
    }
    match text.grapheme_indices(true).nth(graphemes) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Pieces making up the first `target` cost units of `seq`.
///
/// `target >= seq.total_cost()` yields every unit unchanged; `target == 0`
/// yields nothing.
#[must_use]
pub fn slice(seq: &ContentSequence, target: usize) -> Vec<Piece<'_>> {
    if target >= seq.total_cost() {
        return seq.iter().map(Piece::from_unit).collect();
    }

    let mut pieces = Vec::new();
    let mut used = 0usize;
    for unit in seq.iter() {
        if used >= target {
            break;
        }
        let remaining = target - used;
        let cost = unit.cost();
        if cost > remaining {
            // Only text can be cut; an element costs 1 and always fits here.
            if let ContentUnit::Text { text, .. } = unit {
                pieces.push(Piece::Text(grapheme_prefix(text, remaining)));
            }
            break;
        }
        pieces.push(Piece::from_unit(unit));
        used += cost;
    }
    pieces
}

/// Concatenated text of a piece list.
#[must_use]
pub fn pieces_plain_text(pieces: &[Piece<'_>]) -> String {
    pieces.iter().map(Piece::plain_text).collect()
}

impl ContentSequence {
    /// Slice this sequence; see [`slice`].
    #[must_use]
    pub fn slice(&self, target: usize) -> Vec<Piece<'_>> {
        slice(self, target)
    }
}
