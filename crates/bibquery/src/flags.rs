//! Search flags and preferences.
//!
//! [`SearchFlags`] is the pair of switches a user toggles next to the search
//! box. [`SearchPreferences`] adds the keyword delimiter and can be loaded from
//! any serde format, so applications can keep it in their settings file.

use serde::{Deserialize, Serialize};

/// Delimiter used to split a record's keyword list when none is configured.
pub const DEFAULT_KEYWORD_DELIMITER: char = ',';

/// How query text is interpreted.
///
/// Both switches default to off: case-insensitive, plain-text search.
///
/// # Example
///
/// ```
/// use bibquery::SearchFlags;
///
/// let flags = SearchFlags::new().regular_expression(true);
/// assert!(flags.is_regular_expression());
/// assert!(!flags.is_case_sensitive());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFlags {
    case_sensitive: bool,
    regular_expression: bool,
}

impl SearchFlags {
    /// Case-insensitive plain-text search.
    pub fn new() -> Self {
        SearchFlags::default()
    }

    /// Sets whether letter case must match.
    pub fn case_sensitive(mut self, on: bool) -> Self {
        self.case_sensitive = on;
        self
    }

    /// Sets whether terms are regular expressions.
    pub fn regular_expression(mut self, on: bool) -> Self {
        self.regular_expression = on;
        self
    }

    /// Returns `true` if letter case must match.
    pub fn is_case_sensitive(self) -> bool {
        self.case_sensitive
    }

    /// Returns `true` if terms are regular expressions.
    pub fn is_regular_expression(self) -> bool {
        self.regular_expression
    }

    /// Human-readable case mode, as used by [`SearchQuery::describe`](crate::SearchQuery::describe).
    pub fn case_label(self) -> &'static str {
        if self.case_sensitive {
            "case sensitive"
        } else {
            "case insensitive"
        }
    }

    /// Human-readable text mode, as used by [`SearchQuery::describe`](crate::SearchQuery::describe).
    pub fn mode_label(self) -> &'static str {
        if self.regular_expression {
            "regular expression"
        } else {
            "plain text"
        }
    }
}

/// Persistable search settings.
///
/// Missing keys fall back to their defaults, so an empty document is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchPreferences {
    /// Flag switches.
    #[serde(flatten)]
    pub flags: SearchFlags,
    /// Character separating entries of a record's keyword list.
    pub keyword_delimiter: char,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        SearchPreferences {
            flags: SearchFlags::default(),
            keyword_delimiter: DEFAULT_KEYWORD_DELIMITER,
        }
    }
}
