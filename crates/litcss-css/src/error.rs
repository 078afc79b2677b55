//! Error types for CSS parsing.

use thiserror::Error;

/// Result type alias for litcss-css operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while parsing CSS text.
///
/// Line and column are 1-based and refer to the text handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unclosed block (opened at {line}:{column})")]
    UnclosedBlock { line: usize, column: usize },

    #[error("unclosed comment (opened at {line}:{column})")]
    UnclosedComment { line: usize, column: usize },

    #[error("unclosed string (opened at {line}:{column})")]
    UnclosedString { line: usize, column: usize },

    #[error("unknown word at {line}:{column}: expected a declaration or a rule")]
    UnknownWord { line: usize, column: usize },

    #[error("unexpected `}}` at {line}:{column}")]
    UnexpectedClose { line: usize, column: usize },
}
