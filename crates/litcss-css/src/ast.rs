//! The CSS node tree.
//!
//! The tree is lossless: every node keeps its surrounding trivia in
//! [`Raws`], so stringifying an unchanged tree reproduces the parsed text
//! byte for byte. The model follows postcss's statement-level shape: a
//! [`Root`] holds rules, declarations, at-rules and comments; rules and
//! at-rules may nest.
//!
//! The mutable textual fields a consumer is expected to rewrite — a rule's
//! selector, a declaration's value, an at-rule's params — are [`Tracked`]:
//! assignment goes through an explicit `set_*` method that marks the field
//! dirty and refreshes the node's cached line span. Serializers that
//! post-process positions rely on that bookkeeping.

use crate::position::Span;
use memchr::memchr_iter;
use serde::{Deserialize, Serialize};

/// A textual field that records whether it has been reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracked<T> {
    value: T,
    dirty: bool,
}

impl Tracked<String> {
    pub fn new(value: impl Into<String>) -> Self {
        Tracked {
            value: value.into(),
            dirty: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the field has been assigned since parse time.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn assign(&mut self, value: String) {
        self.value = value;
        self.dirty = true;
    }
}

/// Trivia and bookkeeping attached to a node.
///
/// The string fields hold the exact source text around the node's own
/// content; which fields apply depends on the node kind. `lines` is the
/// node's line span in the parsed text, cached by position-rewriting
/// syntaxes before they overwrite `source` with foreign coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raws {
    /// Whitespace (and stray semicolons) before the node
    pub before: String,
    /// Rule: between selector and `{`; declaration: the `:` and its
    /// surrounding whitespace; at-rule: before `{` or `;`
    pub between: String,
    /// Trailing whitespace inside a block, before the closing `}`
    pub after: String,
    /// At-rule: whitespace between the name and the params
    pub after_name: String,
    /// Comment: whitespace after `/*`
    pub left: String,
    /// Comment: whitespace before `*/`
    pub right: String,
    /// Declaration: raw `!important` text, leading whitespace included
    pub important: String,
    /// Declaration: whitespace between the value and the `;`
    pub after_value: String,
    /// Whether the node carries its own trailing `;`
    pub semicolon: bool,
    /// Cached (start, end) line span in the parsed text, 1-based
    pub lines: Option<(usize, usize)>,
}

/// Recompute a cached line span after a tracked field changed.
///
/// The start line is still valid (mutation does not move the node); the
/// end line is re-derived from the new text so later bookkeeping never
/// consults per-line records for lines that no longer exist.
fn refresh_lines(raws: &mut Raws, new_text: &str) {
    if let Some((start, _)) = raws.lines {
        let added = memchr_iter(b'\n', new_text.as_bytes()).count();
        raws.lines = Some((start, start + added));
    }
}

/// The root of a parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    pub nodes: Vec<Node>,
    pub raws: Raws,
    pub source: Option<Span>,
}

/// Any child node of a root, rule or at-rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Rule(Rule),
    Decl(Declaration),
    AtRule(AtRule),
    Comment(Comment),
}

impl Node {
    pub fn source(&self) -> Option<&Span> {
        match self {
            Node::Rule(n) => n.source.as_ref(),
            Node::Decl(n) => n.source.as_ref(),
            Node::AtRule(n) => n.source.as_ref(),
            Node::Comment(n) => n.source.as_ref(),
        }
    }

    pub fn source_mut(&mut self) -> &mut Option<Span> {
        match self {
            Node::Rule(n) => &mut n.source,
            Node::Decl(n) => &mut n.source,
            Node::AtRule(n) => &mut n.source,
            Node::Comment(n) => &mut n.source,
        }
    }

    pub fn raws(&self) -> &Raws {
        match self {
            Node::Rule(n) => &n.raws,
            Node::Decl(n) => &n.raws,
            Node::AtRule(n) => &n.raws,
            Node::Comment(n) => &n.raws,
        }
    }

    pub fn raws_mut(&mut self) -> &mut Raws {
        match self {
            Node::Rule(n) => &mut n.raws,
            Node::Decl(n) => &mut n.raws,
            Node::AtRule(n) => &mut n.raws,
            Node::Comment(n) => &mut n.raws,
        }
    }

    /// Child nodes, for the kinds that have a block.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Rule(n) => Some(&mut n.nodes),
            Node::AtRule(n) => n.nodes.as_mut(),
            _ => None,
        }
    }
}

/// A rule: a selector and a block of child nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    selector: Tracked<String>,
    pub nodes: Vec<Node>,
    pub raws: Raws,
    pub source: Option<Span>,
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Rule {
            selector: Tracked::new(selector),
            nodes: Vec::new(),
            raws: Raws::default(),
            source: None,
        }
    }

    pub fn selector(&self) -> &str {
        self.selector.as_str()
    }

    pub fn selector_dirty(&self) -> bool {
        self.selector.is_dirty()
    }

    pub fn set_selector(&mut self, selector: impl Into<String>) {
        self.selector.assign(selector.into());
        refresh_lines(&mut self.raws, self.selector.as_str());
    }
}

/// A `prop: value` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub prop: String,
    value: Tracked<String>,
    pub important: bool,
    pub raws: Raws,
    pub source: Option<Span>,
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Declaration {
            prop: prop.into(),
            value: Tracked::new(value),
            important: false,
            raws: Raws::default(),
            source: None,
        }
    }

    pub fn value(&self) -> &str {
        self.value.as_str()
    }

    pub fn value_dirty(&self) -> bool {
        self.value.is_dirty()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value.assign(value.into());
        refresh_lines(&mut self.raws, self.value.as_str());
    }
}

/// An at-rule: `@name params`, optionally with a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRule {
    pub name: String,
    params: Tracked<String>,
    /// `Some` when the at-rule has a `{ ... }` block (possibly empty)
    pub nodes: Option<Vec<Node>>,
    pub raws: Raws,
    pub source: Option<Span>,
}

impl AtRule {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        AtRule {
            name: name.into(),
            params: Tracked::new(params),
            nodes: None,
            raws: Raws::default(),
            source: None,
        }
    }

    pub fn params(&self) -> &str {
        self.params.as_str()
    }

    pub fn params_dirty(&self) -> bool {
        self.params.is_dirty()
    }

    pub fn set_params(&mut self, params: impl Into<String>) {
        self.params.assign(params.into());
        refresh_lines(&mut self.raws, self.params.as_str());
    }
}

/// A `/* ... */` comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub raws: Raws,
    pub source: Option<Span>,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Comment {
            text: text.into(),
            raws: Raws::default(),
            source: None,
        }
    }
}
