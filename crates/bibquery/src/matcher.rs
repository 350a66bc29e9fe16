//! Value matching for terms and field comparisons.
//!
//! A [`ValueMatcher`] is a query value compiled once for the active
//! [`SearchFlags`]: a case-folded literal in plain-text mode, a pair of regexes
//! in regex mode, or a matcher that never matches when the regex is invalid.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::ast::CompareOp;
use crate::error::Result;
use crate::flags::SearchFlags;

/// A compiled query value.
#[derive(Debug, Clone)]
pub enum ValueMatcher {
    /// Plain text. The needle is already lowercased when case-insensitive.
    Literal { needle: String, case_sensitive: bool },
    /// Regex mode: `search` finds the pattern anywhere, `whole` must span the value.
    Regex { search: Regex, whole: Regex },
    /// A regex that failed to compile.
    Never,
}

impl ValueMatcher {
    /// Compiles a value, degrading an invalid regex to [`ValueMatcher::Never`].
    pub fn new(value: &str, flags: SearchFlags) -> Self {
        match Self::try_new(value, flags) {
            Ok(matcher) => matcher,
            Err(err) => {
                debug!(pattern = value, error = %err, "regex does not compile, treating as no match");
                ValueMatcher::Never
            }
        }
    }

    /// Compiles a value, reporting an invalid regex.
    pub fn try_new(value: &str, flags: SearchFlags) -> Result<Self> {
        let case_sensitive = flags.is_case_sensitive();
        if !flags.is_regular_expression() {
            let needle = if case_sensitive {
                value.to_string()
            } else {
                value.to_lowercase()
            };
            return Ok(ValueMatcher::Literal {
                needle,
                case_sensitive,
            });
        }

        let search = RegexBuilder::new(value)
            .case_insensitive(!case_sensitive)
            .build()?;
        let whole = RegexBuilder::new(&format!(r"\A(?:{value})\z"))
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(ValueMatcher::Regex { search, whole })
    }

    /// Returns `true` if the value occurs in `haystack`.
    pub fn contains(&self, haystack: &str) -> bool {
        match self {
            ValueMatcher::Literal {
                needle,
                case_sensitive: true,
            } => haystack.contains(needle.as_str()),
            ValueMatcher::Literal { needle, .. } => {
                haystack.to_lowercase().contains(needle.as_str())
            }
            ValueMatcher::Regex { search, .. } => search.is_match(haystack),
            ValueMatcher::Never => false,
        }
    }

    /// Returns `true` if the value is all of `haystack`.
    pub fn equals(&self, haystack: &str) -> bool {
        match self {
            ValueMatcher::Literal {
                needle,
                case_sensitive: true,
            } => haystack == needle,
            ValueMatcher::Literal { needle, .. } => haystack.to_lowercase() == *needle,
            ValueMatcher::Regex { whole, .. } => whole.is_match(haystack),
            ValueMatcher::Never => false,
        }
    }

    /// Applies a comparison operator to `haystack`.
    ///
    /// An invalid regex fails every operator, `!=` included.
    pub fn compare(&self, op: CompareOp, haystack: &str) -> bool {
        match (self, op) {
            (ValueMatcher::Never, _) => false,
            (_, CompareOp::Contains) => self.contains(haystack),
            (_, CompareOp::Exact) => self.equals(haystack),
            (_, CompareOp::NotContains) => !self.contains(haystack),
        }
    }
}
