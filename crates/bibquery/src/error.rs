//! Error types for the query language.
//!
//! None of these reach callers of [`SearchQuery::new`](crate::SearchQuery::new)
//! or [`SearchQuery::is_match`](crate::SearchQuery::is_match): a query that does
//! not parse falls back to a plain term, and a regex that does not compile
//! never matches. They are exposed through [`SearchQuery::check`](crate::SearchQuery::check)
//! and [`parse`](crate::parse) for callers that want to explain a query.

use thiserror::Error;

/// Errors produced while lexing, parsing or compiling a query.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A `"` opened a phrase that never closes.
    #[error("unterminated quoted phrase starting at position {position}")]
    UnterminatedQuote { position: usize },

    /// A token appeared where the grammar does not allow it.
    #[error("unexpected {found} at token {index}")]
    UnexpectedToken { index: usize, found: String },

    /// The query ended while an expression was still open.
    #[error("query ended unexpectedly, expected {expected}")]
    UnexpectedEnd { expected: &'static str },

    /// A comparison operator with nothing after it.
    #[error("field '{field}' has an operator but no value")]
    MissingValue { field: String },

    /// The left side of a comparison is not an identifier.
    #[error("'{name}' is not a valid field name")]
    InvalidFieldName { name: String },

    /// Parentheses or `NOT` nested past the parser's limit.
    #[error("query nests deeper than {limit} levels")]
    TooDeep { limit: usize },

    /// More terms than the parser accepts in one query.
    #[error("query has more than {limit} terms")]
    TooManyTerms { limit: usize },

    /// Invalid regular expression in regex mode.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, SearchError>;
