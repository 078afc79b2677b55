//! Error types for the embedding engine.
//!
//! Only host-level scan failures are fatal: a template the engine was
//! asked to extract but cannot delimit leaves no sound way to place the
//! remaining source. Everything else degrades — CSS that fails to parse
//! skips its template, mapping always produces a position, and
//! reconstruction always produces text.

use thiserror::Error;

/// Result type alias for litcss operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`parse`](crate::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("host source scan failed: {0}")]
    Host(#[from] ScanError),
}

/// Errors found while scanning the host document for templates.
///
/// Line and column are 1-based host coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("unterminated template literal (opened at {line}:{column})")]
    UnterminatedTemplate { line: usize, column: usize },

    #[error("unterminated template interpolation (opened at {line}:{column})")]
    UnterminatedInterpolation { line: usize, column: usize },
}
