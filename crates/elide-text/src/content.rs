#![forbid(unsafe_code)]

//! Rich content trees and their flattening into cost units.
//!
//! Content handed to the ellipsis engine is an arbitrary tree of text runs,
//! opaque elements (links, icons, badges, anything the engine must not look
//! inside) and fragments that only group children. Truncation works on a
//! flat, ordered view of that tree:
//!
//! - every contiguous text run becomes one [`ContentUnit::Text`] costing its
//!   grapheme count,
//! - every element becomes one [`ContentUnit::Opaque`] costing exactly 1,
//! - fragments disappear.
//!
//! # Example
//! ```
//! use elide_text::content::{Element, Node, tokenize};
//!
//! let content = vec![
//!     Node::from("Read the "),
//!     Node::from(Element::new("a").child("docs")),
//!     Node::fragment(["", " for ", "details."]),
//! ];
//! let seq = tokenize(&content);
//! assert_eq!(seq.len(), 3);
//! // 9 graphemes + 1 element + 13 graphemes
//! assert_eq!(seq.total_cost(), 23);
//! ```

use smallvec::SmallVec;
use unicode_segmentation::UnicodeSegmentation;

/// A node of rich content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A run of plain text.
    Text(String),
    /// An element the engine treats as a single indivisible unit.
    Element(Element),
    /// A transparent group of children.
    Fragment(Vec<Node>),
}

impl Node {
    /// Text node.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Fragment of anything convertible into nodes.
    #[must_use]
    pub fn fragment<I, N>(children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        Self::Fragment(children.into_iter().map(Into::into).collect())
    }

    /// Concatenated text of this node and everything below it.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::Text(s) => out.push_str(s),
            Self::Element(el) => {
                for child in &el.children {
                    child.push_text(out);
                }
            }
            Self::Fragment(children) => {
                for child in children {
                    child.push_text(out);
                }
            }
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

impl From<Vec<Node>> for Node {
    fn from(children: Vec<Node>) -> Self {
        Self::Fragment(children)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(n: $ty) -> Self {
                    Self::Text(n.to_string())
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u32, u64, usize, f64);

/// An opaque element: a tag plus children the engine never splits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Host-defined tag (for example `"a"`, `"icon"`, `"badge"`).
    pub tag: String,
    /// Children, used for the element's text content.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            children: Vec::new(),
        }
    }

    /// Append a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Concatenated text of all children.
    #[must_use]
    pub fn text_content(&self) -> String {
        plain_text(&self.children)
    }
}

/// Which kind of unit a [`ContentUnit`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Divisible text run.
    Text,
    /// Indivisible element.
    Opaque,
}

/// One atomic piece of tokenized content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentUnit {
    /// A contiguous text run with its grapheme count.
    Text {
        /// The run's text.
        text: String,
        /// Number of extended grapheme clusters in `text`.
        cost: usize,
    },
    /// An element costing one unit.
    Opaque(Element),
}

impl ContentUnit {
    /// Text unit with its cost computed from `text`.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cost = grapheme_count(&text);
        Self::Text { text, cost }
    }

    /// The unit's kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Text { .. } => UnitKind::Text,
            Self::Opaque(_) => UnitKind::Opaque,
        }
    }

    /// Truncation cost: graphemes for text, 1 for an element.
    #[inline]
    #[must_use]
    pub fn cost(&self) -> usize {
        match self {
            Self::Text { cost, .. } => *cost,
            Self::Opaque(_) => 1,
        }
    }
}

/// Ordered units plus their summed cost.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentSequence {
    units: Vec<ContentUnit>,
    total_cost: usize,
}

impl ContentSequence {
    /// Build a sequence from already-flat units.
    ///
    /// Adjacent text units are merged and empty text units dropped, so the
    /// result is the same as tokenizing the equivalent tree.
    #[must_use]
    pub fn from_units(units: impl IntoIterator<Item = ContentUnit>) -> Self {
        let mut builder = SequenceBuilder::default();
        for unit in units {
            match unit {
                ContentUnit::Text { text, .. } => builder.push_text(&text),
                ContentUnit::Opaque(el) => builder.push_opaque(el),
            }
        }
        builder.finish()
    }

    /// The units in reading order.
    #[inline]
    #[must_use]
    pub fn units(&self) -> &[ContentUnit] {
        &self.units
    }

    /// Sum of all unit costs.
    #[inline]
    #[must_use]
    pub fn total_cost(&self) -> usize {
        self.total_cost
    }

    /// Number of units.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether there are no units.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate units.
    pub fn iter(&self) -> impl Iterator<Item = &ContentUnit> {
        self.units.iter()
    }
}

#[derive(Default)]
struct SequenceBuilder {
    units: Vec<ContentUnit>,
    run: String,
}

impl SequenceBuilder {
    fn push_text(&mut self, text: &str) {
        self.run.push_str(text);
    }

    fn push_opaque(&mut self, el: Element) {
        self.flush_run();
        self.units.push(ContentUnit::Opaque(el));
    }

    fn flush_run(&mut self) {
        if !self.run.is_empty() {
            self.units.push(ContentUnit::text(std::mem::take(&mut self.run)));
        }
    }

    fn finish(mut self) -> ContentSequence {
        self.flush_run();
        let total_cost = self.units.iter().map(ContentUnit::cost).sum();
        ContentSequence {
            units: self.units,
            total_cost,
        }
    }
}

/// Flatten content into an ordered unit sequence.
#[must_use]
pub fn tokenize(content: &[Node]) -> ContentSequence {
    let mut builder = SequenceBuilder::default();
    // Explicit stack instead of recursion; fragments nest shallowly in practice.
    let mut stack: SmallVec<[std::slice::Iter<'_, Node>; 8]> = SmallVec::new();
    stack.push(content.iter());

    while let Some(top) = stack.last_mut() {
        let Some(node) = top.next() else {
            stack.pop();
            continue;
        };
        match node {
            Node::Text(s) => builder.push_text(s),
            Node::Element(el) => builder.push_opaque(el.clone()),
            Node::Fragment(children) => stack.push(children.iter()),
        }
    }

    let seq = builder.finish();
    tracing::trace!(
        units = seq.len(),
        total_cost = seq.total_cost(),
        "tokenized content"
    );
    seq
}

/// Concatenated text of a node list, elements included.
///
/// This is the text disclosed in tooltips and titles when content is
/// truncated.
#[must_use]
pub fn plain_text(content: &[Node]) -> String {
    let mut out = String::new();
    for node in content {
        node.push_text(&mut out);
    }
    out
}

/// ASCII without `\r`: every byte is its own cluster. `"\r\n"` is the one
/// ASCII pair that joins into a single cluster.
#[inline]
pub(crate) fn is_single_byte_clusters(text: &str) -> bool {
    text.is_ascii() && !text.as_bytes().contains(&b'\r')
}

/// Number of extended grapheme clusters in `text`.
#[inline]
#[must_use]
pub fn grapheme_count(text: &str) -> usize {
    if is_single_byte_clusters(text) {
        return text.len();
    }
    text.graphemes(true).count()
}
