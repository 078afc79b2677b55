//! Lossless statement-level CSS parsing.
//!
//! This crate parses CSS into a node tree that keeps every byte of the
//! input (trivia included) and serializes back to identical text. Node
//! spans use byte offsets with 1-based lines and columns, and span ends
//! are inclusive of the node's last character.
//!
//! It exists to serve `litcss`, which parses CSS extracted from host
//! documents and rewrites node positions into host coordinates; the
//! tree's [`Raws::lines`](ast::Raws) cache and the [`Tracked`](ast::Tracked)
//! mutation flags are the hooks that rewriting relies on.
//!
//! ```
//! use litcss_css::{parse, stringify, Node};
//!
//! let source = ".button { color: hotpink; }";
//! let root = parse(source)?;
//! let Node::Rule(rule) = &root.nodes[0] else { unreachable!() };
//! assert_eq!(rule.selector(), ".button");
//! assert_eq!(stringify(&root), source);
//! # Ok::<(), litcss_css::ParseError>(())
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod position;
pub mod stringify;

pub use ast::{AtRule, Comment, Declaration, Node, Raws, Root, Rule, Tracked};
pub use error::{ParseError, Result};
pub use parser::parse;
pub use position::{LineIndex, Position, Span};
pub use stringify::stringify;
