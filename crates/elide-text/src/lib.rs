#![forbid(unsafe_code)]

//! Text handling for elide.
//!
//! This crate provides the content primitives the ellipsis engine works on:
//! - [`Node`] / [`Element`] - rich content trees of text and opaque elements
//! - [`ContentSequence`] - flat, costed view of a content tree
//! - [`Piece`] - a renderable piece of a sliced prefix
//! - [`wrap_inline`] - grapheme-aware inline flow on a cell grid
//! - [`WidthCache`] - LRU cache for word width measurements
//!
//! # Example
//! ```
//! use elide_text::{Element, Node, WrapOptions, InlineItem, tokenize, wrap_inline};
//!
//! let content = vec![
//!     Node::from("See the "),
//!     Node::from(Element::new("a").child("guide")),
//!     Node::from(" for more."),
//! ];
//!
//! // Flatten into cost units
//! let seq = tokenize(&content);
//! assert_eq!(seq.total_cost(), 8 + 1 + 10);
//!
//! // Take the first 10 units
//! let pieces = seq.slice(10);
//! assert_eq!(elide_text::pieces_plain_text(&pieces), "See the guide ");
//!
//! // Lay text out at 12 cells
//! let lines = wrap_inline(&[InlineItem::Text("See the guide for more.")], &WrapOptions::new(12));
//! assert_eq!(lines, vec!["See the", "guide for", "more."]);
//! ```

pub mod content;
pub mod slice;
pub mod width_cache;
pub mod wrap;

pub use content::{
    ContentSequence, ContentUnit, Element, Node, UnitKind, grapheme_count, plain_text, tokenize,
};
pub use slice::{Piece, grapheme_prefix, pieces_plain_text, slice};
pub use width_cache::{CacheStats, DEFAULT_CACHE_CAPACITY, WidthCache};
pub use wrap::{
    InlineItem, WrapMode, WrapOptions, display_width, line_count, wrap_inline, wrap_inline_cached,
};
