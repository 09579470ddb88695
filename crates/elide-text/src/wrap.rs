#![forbid(unsafe_code)]

//! Inline flow wrapping with Unicode correctness.
//!
//! Lays a sequence of inline items out into lines of at most `width` cells,
//! the way a block container flows inline content:
//!
//! - Text flows across item boundaries: `"hel"` followed by `"lo"` is one word.
//! - Atomic items (elements, action controls) are unbreakable boxes that
//!   always start a new word.
//! - Grapheme clusters are never split and wide (CJK) characters count as two
//!   cells.
//! - `\n` forces a line break.
//!
//! # Example
//! ```
//! use elide_text::wrap::{InlineItem, WrapMode, WrapOptions, wrap_inline};
//!
//! let items = [InlineItem::Text("Hello world foo"), InlineItem::Atomic("[x]")];
//! let lines = wrap_inline(&items, &WrapOptions::new(10).mode(WrapMode::Word));
//! assert_eq!(lines, vec!["Hello", "world", "foo[x]"]);
//! ```

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::width_cache::WidthCache;

/// Text wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// No wrapping: everything except hard breaks stays on one line.
    None,
    /// Wrap at word boundaries; over-long words overflow on their own line.
    Word,
    /// Wrap at grapheme boundaries.
    Char,
    /// Word wrap with grapheme fallback for over-long words.
    #[default]
    WordChar,
}

/// Options for inline wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapOptions {
    /// Maximum line width in cells.
    pub width: usize,
    /// Wrapping mode.
    pub mode: WrapMode,
}

impl WrapOptions {
    /// Word wrap with character fallback at `width` cells.
    #[must_use]
    pub fn new(width: usize) -> Self {
        Self {
            width,
            mode: WrapMode::WordChar,
        }
    }

    /// Set the wrap mode.
    #[must_use]
    pub fn mode(mut self, mode: WrapMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One inline item to flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineItem<'a> {
    /// Breakable text.
    Text(&'a str),
    /// Unbreakable box rendered as the given label.
    Atomic(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Space(String),
    Atomic(String),
    Break,
}

/// Split items into words, whitespace runs, atomic boxes and hard breaks.
fn tokenize_items(items: &[InlineItem<'_>]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_space = false;

    fn flush(tokens: &mut Vec<Token>, current: &mut String, in_space: bool) {
        if current.is_empty() {
            return;
        }
        let text = std::mem::take(current);
        tokens.push(if in_space {
            Token::Space(text)
        } else {
            Token::Word(text)
        });
    }

    for item in items {
        match *item {
            InlineItem::Atomic(label) => {
                flush(&mut tokens, &mut current, in_space);
                tokens.push(Token::Atomic(label.to_owned()));
            }
            InlineItem::Text(text) => {
                for grapheme in text.graphemes(true) {
                    if grapheme == "\n" || grapheme == "\r\n" {
                        flush(&mut tokens, &mut current, in_space);
                        tokens.push(Token::Break);
                        continue;
                    }
                    let is_space = grapheme.chars().all(char::is_whitespace);
                    if is_space != in_space {
                        flush(&mut tokens, &mut current, in_space);
                        in_space = is_space;
                    }
                    current.push_str(grapheme);
                }
            }
        }
    }
    flush(&mut tokens, &mut current, in_space);
    tokens
}

struct LineBuilder<'c> {
    options: WrapOptions,
    cache: &'c mut WidthCache,
    lines: Vec<String>,
    current: String,
    current_width: usize,
}

impl<'c> LineBuilder<'c> {
    fn new(options: WrapOptions, cache: &'c mut WidthCache) -> Self {
        Self {
            options,
            cache,
            lines: Vec::new(),
            current: String::new(),
            current_width: 0,
        }
    }

    fn break_line(&mut self) {
        self.lines.push(self.current.trim_end().to_owned());
        self.current.clear();
        self.current_width = 0;
    }

    fn push(&mut self, text: &str, width: usize) {
        self.current.push_str(text);
        self.current_width += width;
    }

    fn place(&mut self, token: &Token) {
        let (text, breakable) = match token {
            Token::Break => {
                self.break_line();
                return;
            }
            Token::Space(s) => {
                // Whitespace never starts a wrapped line.
                let width = self.cache.get_or_compute(s);
                if self.current_width + width <= self.options.width {
                    self.push(s, width);
                } else if !self.current.is_empty() {
                    self.break_line();
                }
                return;
            }
            Token::Word(s) => (s.as_str(), self.options.mode == WrapMode::WordChar),
            Token::Atomic(s) => (s.as_str(), false),
        };

        let width = self.cache.get_or_compute(text);
        if self.current_width + width <= self.options.width {
            self.push(text, width);
            return;
        }
        if !self.current.is_empty() {
            self.break_line();
        }
        if width > self.options.width && breakable {
            self.place_graphemes(text);
        } else {
            self.push(text, width);
        }
    }

    fn place_graphemes(&mut self, text: &str) {
        for grapheme in text.graphemes(true) {
            let width = grapheme.width();
            if self.current_width + width > self.options.width && !self.current.is_empty() {
                self.break_line();
            }
            self.push(grapheme, width);
        }
    }

    fn finish(mut self) -> Vec<String> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        self.lines
    }
}

/// Lay out inline items into lines using a caller-owned width cache.
#[must_use]
pub fn wrap_inline_cached(
    items: &[InlineItem<'_>],
    options: &WrapOptions,
    cache: &mut WidthCache,
) -> Vec<String> {
    let tokens = tokenize_items(items);

    if options.width == 0 || options.mode == WrapMode::None {
        let mut lines = vec![String::new()];
        for token in &tokens {
            match token {
                Token::Break => lines.push(String::new()),
                Token::Word(s) | Token::Space(s) | Token::Atomic(s) => {
                    if let Some(last) = lines.last_mut() {
                        last.push_str(s);
                    }
                }
            }
        }
        return lines;
    }

    let mut builder = LineBuilder::new(*options, cache);
    if options.mode == WrapMode::Char {
        for token in &tokens {
            match token {
                Token::Word(s) | Token::Space(s) => builder.place_graphemes(s),
                other => builder.place(other),
            }
        }
    } else {
        for token in &tokens {
            builder.place(token);
        }
    }
    builder.finish()
}

/// Lay out inline items into lines.
#[must_use]
pub fn wrap_inline(items: &[InlineItem<'_>], options: &WrapOptions) -> Vec<String> {
    wrap_inline_cached(items, options, &mut WidthCache::new(64))
}

/// Number of lines the items occupy; zero when there are no items.
#[must_use]
pub fn line_count(items: &[InlineItem<'_>], options: &WrapOptions, cache: &mut WidthCache) -> usize {
    if items.is_empty() {
        return 0;
    }
    wrap_inline_cached(items, options, cache).len()
}

/// Display width of text in cells.
#[inline]
#[must_use]
pub fn display_width(text: &str) -> usize {
    text.width()
}
