//! Highlighting patterns built from query text.
//!
//! The pattern compiler works on the raw query text, not on the parsed
//! expression: every word or quoted phrase becomes one parenthesized group of
//! an alternation, `(w1)|(w2)|...`. Two source dialects are produced from the
//! same word list:
//!
//! - [`Dialect::Host`] block-quotes literal words as `\Q...\E`.
//! - [`Dialect::Secondary`] has no block quotes, so literal words escape each
//!   metacharacter through an [`EscapeTable`].
//!
//! In regex mode both dialects insert the query verbatim.
//!
//! Each [`CompiledPattern`] also carries a native [`Regex`] equivalent to its
//! source, so callers can locate highlight ranges without a second engine.

use std::fmt;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::flags::SearchFlags;

/// Per-character escape table for a regex dialect.
#[derive(Debug, Clone, Copy)]
pub struct EscapeTable(&'static [(char, &'static str)]);

impl EscapeTable {
    /// Returns the escaped form of `ch`, if it needs one.
    pub fn lookup(&self, ch: char) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(meta, _)| *meta == ch)
            .map(|(_, escaped)| *escaped)
    }

    /// Escapes every character of `word` that appears in the table.
    pub fn escape(&self, word: &str) -> String {
        let mut out = String::with_capacity(word.len() * 2);
        for ch in word.chars() {
            match self.lookup(ch) {
                Some(escaped) => out.push_str(escaped),
                None => out.push(ch),
            }
        }
        out
    }
}

/// Metacharacters of the secondary (JavaScript-flavoured) dialect.
pub const SECONDARY_ESCAPES: EscapeTable = EscapeTable(&[
    ('.', r"\."),
    ('*', r"\*"),
    ('+', r"\+"),
    ('?', r"\?"),
    ('^', r"\^"),
    ('$', r"\$"),
    ('{', r"\{"),
    ('}', r"\}"),
    ('(', r"\("),
    (')', r"\)"),
    ('|', r"\|"),
    ('[', r"\["),
    (']', r"\]"),
    ('\\', r"\\"),
    ('/', r"\/"),
]);

/// Regex syntax a pattern's source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Syntax with `\Q...\E` block quoting.
    Host,
    /// Syntax without block quoting; literals are escaped per character.
    Secondary,
}

impl Dialect {
    /// Writes one word in this dialect.
    fn render(self, word: &str, regular_expression: bool) -> String {
        if regular_expression {
            return word.to_string();
        }
        match self {
            Dialect::Host => block_quote(word),
            Dialect::Secondary => SECONDARY_ESCAPES.escape(word),
        }
    }
}

/// Quotes `word` as `\Q...\E`, splitting any `\E` it contains.
fn block_quote(word: &str) -> String {
    format!(r"\Q{}\E", word.replace(r"\E", r"\E\\E\Q"))
}

/// Splits query text into highlight words.
///
/// In regex mode the whole text is one word. Otherwise words are separated
/// by whitespace, a double-quoted run is one word without its quotes, and a
/// backslash makes the next character literal.
///
/// # Example
///
/// ```
/// use bibquery::{search_words, SearchFlags};
///
/// let words = search_words(r#"deep "neural nets" 2\"x"#, SearchFlags::new());
/// assert_eq!(words, vec!["deep", "neural nets", "2\"x"]);
/// ```
pub fn search_words(text: &str, flags: SearchFlags) -> Vec<String> {
    if flags.is_regular_expression() {
        if text.trim().is_empty() {
            return Vec::new();
        }
        return vec![text.to_string()];
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    let mut quoted = false;

    for ch in text.chars() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if escaped {
        current.push('\\');
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

/// An alternation pattern for highlighting query words.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    dialect: Dialect,
    source: String,
    case_sensitive: bool,
    native: Option<Regex>,
}

impl CompiledPattern {
    /// Builds the pattern for `words`, or `None` when there are no words.
    pub fn compile(words: &[String], flags: SearchFlags, dialect: Dialect) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        let regular_expression = flags.is_regular_expression();

        let source = join_groups(words.iter().map(|w| dialect.render(w, regular_expression)));
        let native_source = join_groups(words.iter().map(|w| {
            if regular_expression {
                w.clone()
            } else {
                regex::escape(w)
            }
        }));

        let native = match RegexBuilder::new(&native_source)
            .case_insensitive(!flags.is_case_sensitive())
            .build()
        {
            Ok(regex) => Some(regex),
            Err(err) => {
                debug!(pattern = %source, error = %err, "highlight pattern does not compile");
                None
            }
        };

        Some(CompiledPattern {
            dialect,
            source,
            case_sensitive: flags.is_case_sensitive(),
            native,
        })
    }

    /// Returns the pattern source in its dialect.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the dialect of [`as_str`](Self::as_str).
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns `true` if the pattern must be applied case-sensitively.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Returns `false` if the pattern is a regex that does not compile.
    pub fn is_usable(&self) -> bool {
        self.native.is_some()
    }

    /// Returns `true` if any word occurs in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.native.as_ref().is_some_and(|re| re.is_match(text))
    }

    /// Returns the byte ranges of every non-empty occurrence in `text`.
    pub fn find_ranges(&self, text: &str) -> Vec<Range<usize>> {
        match &self.native {
            Some(re) => re
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| m.range())
                .collect(),
            None => Vec::new(),
        }
    }
}

impl fmt::Display for CompiledPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn join_groups(groups: impl Iterator<Item = String>) -> String {
    let groups: Vec<String> = groups.map(|g| format!("({g})")).collect();
    groups.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> SearchFlags {
        SearchFlags::new()
    }

    fn regex() -> SearchFlags {
        SearchFlags::new().regular_expression(true)
    }

    fn words(text: &str) -> Vec<String> {
        search_words(text, plain())
    }

    #[test]
    fn words_split_on_whitespace() {
        assert_eq!(words("  a  b\tc "), vec!["a", "b", "c"]);
    }

    #[test]
    fn quoted_run_is_one_word() {
        assert_eq!(
            words(r#"x "one (two) three" y"#),
            vec!["x", "one (two) three", "y"]
        );
    }

    #[test]
    fn backslash_makes_next_char_literal() {
        assert_eq!(words(r"a\\b"), vec![r"a\b"]);
        assert_eq!(words(r"a\ b"), vec!["a b"]);
        assert_eq!(words(r#"\"a"#), vec![r#""a"#]);
        assert_eq!(words(r"end\"), vec![r"end\"]);
    }

    #[test]
    fn blank_text_has_no_words() {
        assert!(words("").is_empty());
        assert!(words("   ").is_empty());
        assert!(search_words("  ", regex()).is_empty());
    }

    #[test]
    fn regex_mode_keeps_text_whole() {
        assert_eq!(search_words(r"[a-c]\d* \d*", regex()), vec![r"[a-c]\d* \d*"]);
    }

    #[test]
    fn block_quote_splits_end_marker() {
        assert_eq!(block_quote("plain"), r"\Qplain\E");
        assert_eq!(block_quote(r"a\Eb"), r"\Qa\E\\E\Qb\E");
    }

    #[test]
    fn escape_table_lookup() {
        assert_eq!(SECONDARY_ESCAPES.lookup('/'), Some(r"\/"));
        assert_eq!(SECONDARY_ESCAPES.lookup('-'), None);
        assert_eq!(SECONDARY_ESCAPES.escape("a.b-c"), r"a\.b-c");
    }

    #[test]
    fn host_pattern_single_word() {
        let p = CompiledPattern::compile(&words("progress"), plain(), Dialect::Host).unwrap();
        assert_eq!(p.as_str(), r"(\Qprogress\E)");
        assert_eq!(p.dialect(), Dialect::Host);
    }

    #[test]
    fn no_words_no_pattern() {
        assert!(CompiledPattern::compile(&[], plain(), Dialect::Host).is_none());
        assert!(CompiledPattern::compile(&[], regex(), Dialect::Secondary).is_none());
    }

    #[test]
    fn native_matcher_is_literal_in_plain_mode() {
        let p = CompiledPattern::compile(&words("a.c (x)"), plain(), Dialect::Host).unwrap();
        assert!(p.is_match("see (x) here"));
        assert!(!p.is_match("abc"));
        assert_eq!(p.find_ranges("a.c and (x)"), vec![0..3, 8..11]);
    }

    #[test]
    fn native_matcher_follows_case_flag() {
        let words = words("Review");
        let insensitive = CompiledPattern::compile(&words, plain(), Dialect::Host).unwrap();
        assert!(insensitive.is_match("systematic review"));
        assert!(!insensitive.is_case_sensitive());

        let sensitive =
            CompiledPattern::compile(&words, plain().case_sensitive(true), Dialect::Host).unwrap();
        assert!(!sensitive.is_match("systematic review"));
        assert!(sensitive.is_case_sensitive());
    }

    #[test]
    fn invalid_regex_pattern_still_renders() {
        let words = search_words("asdf[", regex());
        let p = CompiledPattern::compile(&words, regex(), Dialect::Host).unwrap();
        assert_eq!(p.to_string(), "(asdf[)");
        assert!(!p.is_usable());
        assert!(!p.is_match("asdf["));
        assert!(p.find_ranges("asdf[").is_empty());
    }

    #[test]
    fn empty_matches_are_not_ranges() {
        let words = search_words(r"\d*", regex());
        let p = CompiledPattern::compile(&words, regex(), Dialect::Host).unwrap();
        assert_eq!(p.find_ranges("ab12c"), vec![2..4]);
    }
}
