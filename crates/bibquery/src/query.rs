//! The search query facade.
//!
//! [`SearchQuery`] couples the text a user typed with the [`SearchFlags`] in
//! effect. Everything else is derived lazily and memoized: the parsed
//! expression, the compiled predicate, and the two highlighting patterns.

use std::fmt;

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::ast::Expr;
use crate::error::Result;
use crate::eval::Predicate;
use crate::flags::{SearchFlags, SearchPreferences, DEFAULT_KEYWORD_DELIMITER};
use crate::matcher::ValueMatcher;
use crate::parser::parse;
use crate::pattern::{search_words, CompiledPattern, Dialect};
use crate::record::Record;

/// Parsed and compiled form of the query text.
#[derive(Debug, Clone)]
struct Derived {
    expr: Expr,
    grammar_based: bool,
    predicate: Predicate,
}

/// An immutable search query.
///
/// Construction never fails. Text that does not parse is searched as a single
/// term: the raw text with surrounding whitespace trimmed, so a blank query
/// matches every record. A regular expression that does not compile matches
/// nothing.
///
/// The query is `Send + Sync`; derived state is computed once, on first use,
/// and shared by every caller.
///
/// # Example
///
/// ```
/// use bibquery::{Entry, SearchFlags, SearchQuery};
///
/// let entry = Entry::new("article")
///     .with_field("title", "Fruity features")
///     .with_field("keywords", "banana, pineapple, orange");
///
/// let query = SearchQuery::new("anyfield=fruit and keywords=apple", SearchFlags::new());
/// assert!(query.is_match(&entry));
///
/// let query = SearchQuery::new("anykeyword==apple", SearchFlags::new());
/// assert!(!query.is_match(&entry));
/// ```
#[derive(Debug, Clone)]
pub struct SearchQuery {
    text: String,
    flags: SearchFlags,
    keyword_delimiter: char,
    derived: OnceCell<Derived>,
    host_pattern: OnceCell<Option<CompiledPattern>>,
    secondary_pattern: OnceCell<Option<CompiledPattern>>,
}

impl SearchQuery {
    /// Creates a query. Keywords are split on `,`.
    pub fn new(text: impl Into<String>, flags: SearchFlags) -> Self {
        SearchQuery {
            text: text.into(),
            flags,
            keyword_delimiter: DEFAULT_KEYWORD_DELIMITER,
            derived: OnceCell::new(),
            host_pattern: OnceCell::new(),
            secondary_pattern: OnceCell::new(),
        }
    }

    /// Creates a query from stored preferences.
    pub fn from_preferences(text: impl Into<String>, preferences: &SearchPreferences) -> Self {
        SearchQuery::new(text, preferences.flags).with_keyword_delimiter(preferences.keyword_delimiter)
    }

    /// Sets the delimiter used to split a record's keyword list.
    pub fn with_keyword_delimiter(mut self, delimiter: char) -> Self {
        self.keyword_delimiter = delimiter;
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the raw query text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the flags the query was built with.
    pub fn flags(&self) -> SearchFlags {
        self.flags
    }

    /// Returns the keyword delimiter.
    pub fn keyword_delimiter(&self) -> char {
        self.keyword_delimiter
    }

    /// Always `true`: a query that does not parse or compile degrades to one
    /// that matches less, never to an error. Use [`check`](Self::check) to
    /// find out why a query might not behave as intended.
    pub fn is_valid(&self) -> bool {
        true
    }

    /// Strict diagnostics: reports a parse error, or the first value that is
    /// not a valid regex in regex mode. Matching is unaffected by the result.
    pub fn check(&self) -> Result<()> {
        let expr = parse(&self.text)?;
        if self.flags.is_regular_expression() {
            for value in expr.values() {
                ValueMatcher::try_new(value, self.flags)?;
            }
        }
        Ok(())
    }

    /// Returns `true` if the text parsed with the query grammar, `false` if it
    /// is being searched as a single fallback term.
    pub fn is_grammar_based(&self) -> bool {
        self.derived().grammar_based
    }

    /// Returns the expression being evaluated.
    pub fn expression(&self) -> &Expr {
        &self.derived().expr
    }

    /// Returns the words used for highlighting.
    pub fn search_words(&self) -> Vec<String> {
        search_words(&self.text, self.flags)
    }

    /// Human-readable summary, e.g. `"asdf" (case insensitive, plain text)`.
    pub fn describe(&self) -> String {
        format!(
            "\"{}\" ({}, {})",
            self.text,
            self.flags.case_label(),
            self.flags.mode_label()
        )
    }

    // ========================================================================
    // Highlighting
    // ========================================================================

    /// Highlighting pattern in the host dialect, or `None` for a blank query.
    pub fn pattern_for_words(&self) -> Option<&CompiledPattern> {
        self.host_pattern
            .get_or_init(|| self.compile_pattern(Dialect::Host))
            .as_ref()
    }

    /// Highlighting pattern in the secondary dialect, or `None` for a blank query.
    pub fn secondary_pattern_for_words(&self) -> Option<&CompiledPattern> {
        self.secondary_pattern
            .get_or_init(|| self.compile_pattern(Dialect::Secondary))
            .as_ref()
    }

    fn compile_pattern(&self, dialect: Dialect) -> Option<CompiledPattern> {
        CompiledPattern::compile(&self.search_words(), self.flags, dialect)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Tests if a single record matches this query.
    pub fn is_match<R>(&self, record: &R) -> bool
    where
        R: Record + ?Sized,
    {
        self.derived()
            .predicate
            .evaluate(record, self.keyword_delimiter)
    }

    /// Filters a slice, returning references to matching records in order.
    pub fn filter<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        records.iter().filter(|record| self.is_match(*record)).collect()
    }

    /// Counts the number of matching records.
    pub fn count<R: Record>(&self, records: &[R]) -> usize {
        records.iter().filter(|record| self.is_match(*record)).count()
    }

    /// Returns `true` if any record matches.
    pub fn any<R: Record>(&self, records: &[R]) -> bool {
        records.iter().any(|record| self.is_match(record))
    }

    /// Returns the first matching record.
    pub fn find<'a, R: Record>(&self, records: &'a [R]) -> Option<&'a R> {
        records.iter().find(|record| self.is_match(*record))
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| {
            let (expr, grammar_based) = match parse(&self.text) {
                Ok(expr) => (expr, true),
                Err(err) => {
                    debug!(query = %self.text, error = %err, "query does not parse, searching it as one term");
                    (Expr::term(self.text.trim()), false)
                }
            };
            let predicate = Predicate::compile(&expr, self.flags);
            Derived {
                expr,
                grammar_based,
                predicate,
            }
        })
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CompareOp;
    use crate::error::SearchError;
    use crate::record::Entry;

    #[test]
    fn describe_names_both_modes() {
        assert_eq!(
            SearchQuery::new("asdf", SearchFlags::new()).describe(),
            "\"asdf\" (case insensitive, plain text)"
        );
        assert_eq!(
            SearchQuery::new(
                "asdf",
                SearchFlags::new()
                    .case_sensitive(true)
                    .regular_expression(true)
            )
            .to_string(),
            "\"asdf\" (case sensitive, regular expression)"
        );
    }

    #[test]
    fn grammar_query_is_grammar_based() {
        let query = SearchQuery::new("title=rust", SearchFlags::new());
        assert!(query.is_grammar_based());
        assert_eq!(
            query.expression(),
            &Expr::field("title", CompareOp::Contains, "rust")
        );
    }

    #[test]
    fn unparsable_query_falls_back_to_single_term() {
        let query = SearchQuery::new("(unbalanced", SearchFlags::new());
        assert!(query.is_valid());
        assert!(!query.is_grammar_based());
        assert_eq!(query.expression(), &Expr::term("(unbalanced"));

        let entry = Entry::new("article").with_field("note", "an (unbalanced remark");
        assert!(query.is_match(&entry));
    }

    #[test]
    fn blank_query_matches_everything() {
        let query = SearchQuery::new("   ", SearchFlags::new());
        assert!(!query.is_grammar_based());
        assert!(query.is_match(&Entry::new("article")));
        assert!(query.pattern_for_words().is_none());
        assert!(query.secondary_pattern_for_words().is_none());
    }

    #[test]
    fn check_reports_problems_without_affecting_validity() {
        let flags = SearchFlags::new().regular_expression(true);
        let query = SearchQuery::new("title=asdf[", flags);
        assert!(query.is_valid());
        assert!(matches!(query.check(), Err(SearchError::InvalidRegex(_))));

        let query = SearchQuery::new("title=", SearchFlags::new());
        assert!(matches!(query.check(), Err(SearchError::MissingValue { .. })));

        assert!(SearchQuery::new("title=asdf[", SearchFlags::new())
            .check()
            .is_ok());
    }

    #[test]
    fn keyword_delimiter_is_configurable() {
        let entry = Entry::new("misc").with_field("keywords", "alpha; beta gamma");
        let query = SearchQuery::new(r#"anykeyword=="beta gamma""#, SearchFlags::new());
        assert!(!query.is_match(&entry));
        assert!(query.with_keyword_delimiter(';').is_match(&entry));
    }

    #[test]
    fn from_preferences_applies_everything() {
        let prefs = SearchPreferences {
            flags: SearchFlags::new().case_sensitive(true),
            keyword_delimiter: ';',
        };
        let query = SearchQuery::from_preferences("Beta", &prefs);
        assert!(query.flags().is_case_sensitive());
        assert_eq!(query.keyword_delimiter(), ';');
    }

    #[test]
    fn collection_helpers() {
        let records = vec![
            Entry::new("article").with_field("title", "Rust in practice"),
            Entry::new("book").with_field("title", "Go in practice"),
            Entry::new("article").with_field("title", "Rust for Rustaceans"),
        ];
        let query = SearchQuery::new("title=rust", SearchFlags::new());

        let matched = query.filter(&records);
        assert_eq!(matched.len(), 2);
        assert_eq!(query.count(&records), 2);
        assert!(query.any(&records));
        assert_eq!(
            query.find(&records).and_then(|r| r.field_value("title")),
            Some("Rust in practice")
        );

        let none = SearchQuery::new("title=python", SearchFlags::new());
        assert!(!none.any(&records));
        assert!(none.find(&records).is_none());
    }

    #[test]
    fn query_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchQuery>();
    }
}
