//! Error types for code construction and decoding.

use thiserror::Error;

/// Errors produced while building, deriving, encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The frequency table cannot produce a tree (empty, negative weight, overflow).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A hand-built tree breaks the node invariants.
    #[error("invalid tree: {0}")]
    InvalidTree(String),

    /// The bitstream ended in the middle of a code.
    #[error("truncated input: stream ended after {consumed} bits with {pending} bits of an unfinished code")]
    TruncatedInput { consumed: usize, pending: usize },

    /// A character that does not select a branch of the tree.
    #[error("invalid bit {bit:?} at position {position}")]
    InvalidBit { bit: char, position: usize },

    /// Encoding hit a symbol that has no code.
    #[error("symbol not present in code table: {0}")]
    UnknownSymbol(String),
}

pub type Result<T> = std::result::Result<T, Error>;
