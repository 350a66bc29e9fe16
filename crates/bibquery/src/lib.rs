//! Bibquery - search queries over bibliographic records.
//!
//! Bibquery turns the text a user types into a search box into a predicate
//! over records, and into regex patterns for highlighting what matched. It
//! supports:
//!
//! - Plain words and quoted phrases searched across every field
//! - Field-qualified terms: `title=rust`, `author==Knuth`, `keywords!=draft`
//! - Pseudo-fields: `anyfield`, `anykeyword`, `entrytype`
//! - Boolean combination: `AND` (or juxtaposition), `OR`, `NOT`, parentheses
//! - Case-sensitive and regular-expression modes
//! - Highlight patterns in two regex dialects
//!
//! # Quick Start
//!
//! ```rust
//! use bibquery::{Entry, SearchFlags, SearchQuery};
//!
//! let papers = vec![
//!     Entry::new("article")
//!         .with_field("title", "Systematic review of fruit")
//!         .with_field("keywords", "banana, pineapple"),
//!     Entry::new("book").with_field("title", "Vegetables"),
//! ];
//!
//! let query = SearchQuery::new("title=review OR anykeyword==kale", SearchFlags::new());
//! let results = query.filter(&papers);
//! assert_eq!(results.len(), 1);
//!
//! let pattern = query.pattern_for_words().unwrap();
//! assert_eq!(pattern.as_str(), r"(\Qtitle=review\E)|(\QOR\E)|(\Qanykeyword==kale\E)");
//! ```
//!
//! # Query Semantics
//!
//! | Syntax | Matches when |
//! |--------|--------------|
//! | `word`, `"a phrase"` | it occurs in the entry type, any field, or any keyword |
//! | `field=value` | `value` occurs in `field` |
//! | `field==value` | `value` is all of `field` |
//! | `field!=value` | `field` is present and does not contain `value` |
//! | `anyfield<op>value` | some field satisfies the comparison |
//! | `anykeyword<op>value` | some keyword, taken whole, satisfies it |
//! | `entrytype<op>value` | the entry type satisfies it |
//!
//! `CONTAINS` and `MATCHES` may be written instead of `=` and `==`.
//! `AND` binds tighter than `OR`; keywords are case-insensitive.
//!
//! # Failure Handling
//!
//! Nothing here returns an error to a search box. Text that does not parse is
//! searched as one term, an invalid regex matches nothing, and a missing field
//! never matches. [`SearchQuery::check`] reports those problems for callers
//! that want to show a hint.

mod ast;
mod error;
mod eval;
mod flags;
mod lexer;
mod matcher;
mod parser;
mod pattern;
mod query;
mod record;

// Re-export public API
pub use ast::{CompareOp, Expr, FieldName};
pub use error::{Result, SearchError};
pub use eval::Predicate;
pub use flags::{SearchFlags, SearchPreferences, DEFAULT_KEYWORD_DELIMITER};
pub use lexer::{tokenize, Token};
pub use matcher::ValueMatcher;
pub use parser::{parse, MAX_DEPTH, MAX_TERMS};
pub use pattern::{search_words, CompiledPattern, Dialect, EscapeTable, SECONDARY_ESCAPES};
pub use query::SearchQuery;
pub use record::{Entry, Record, KEYWORDS_FIELD};
