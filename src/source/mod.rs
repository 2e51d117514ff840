//! Source text handling for originating functions.
//!
//! Function sources are Python. They are parsed with tree-sitter and the
//! concrete syntax tree is flattened into logical lines of tokens:
//!
//! ```text
//! source text → parse::parse → Tree → parse::logical_lines → normalize::render
//! ```
//!
//! Comments are extras in the grammar and never reach the logical lines, so
//! re-rendering drops them by construction. Function docstrings are located
//! structurally in the tree and skipped while flattening.

pub mod normalize;
pub mod parse;

pub use normalize::normalize;
pub use parse::{LogicalLine, Token, TokenKind};

/// Error raised when source text cannot be read as a module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    /// The grammar could not be loaded into the parser.
    #[error("python grammar could not be loaded: {0}")]
    Language(String),
    /// The parser returned without a syntax tree.
    #[error("parser stopped before producing a syntax tree")]
    Aborted,
    /// The text is not valid source.
    ///
    /// Position of the first invalid or missing token, both 1-based.
    #[error("invalid syntax at line {line}, column {column}")]
    Syntax {
        /// Line of the offending token.
        line: usize,
        /// Column (in bytes) of the offending token.
        column: usize,
    },
}
