//! Query syntax tree.
//!
//! [`Expr`] is what the parser produces: pure syntax, with values kept as the
//! user typed them. Compiling values into matchers happens later, once the
//! search flags are known.

use std::fmt;

/// Comparison operator of a field-qualified term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=` or `CONTAINS`: the value occurs somewhere in the field.
    Contains,
    /// `==` or `MATCHES`: the value is the whole field.
    Exact,
    /// `!=`: the value does not occur in the field.
    NotContains,
}

impl CompareOp {
    /// Parses a symbolic operator.
    pub fn from_symbol(symbol: &str) -> Option<CompareOp> {
        match symbol {
            "=" => Some(CompareOp::Contains),
            "==" => Some(CompareOp::Exact),
            "!=" => Some(CompareOp::NotContains),
            _ => None,
        }
    }

    /// Parses a word operator, ignoring case.
    pub fn from_word(word: &str) -> Option<CompareOp> {
        if word.eq_ignore_ascii_case("contains") {
            Some(CompareOp::Contains)
        } else if word.eq_ignore_ascii_case("matches") {
            Some(CompareOp::Exact)
        } else {
            None
        }
    }

    /// Returns the symbolic form.
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Contains => "=",
            CompareOp::Exact => "==",
            CompareOp::NotContains => "!=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Left side of a field-qualified term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldName {
    /// `anyfield`: every field of the record.
    AnyField,
    /// `anykeyword`: each keyword of the record, one at a time.
    AnyKeyword,
    /// `entrytype`: the record's entry type name.
    EntryType,
    /// A concrete field, lowercased.
    Named(String),
}

impl FieldName {
    /// Resolves a typed field name. Matching is case-insensitive.
    pub fn new(name: &str) -> FieldName {
        let lower = name.to_lowercase();
        match lower.as_str() {
            "anyfield" => FieldName::AnyField,
            "anykeyword" => FieldName::AnyKeyword,
            "entrytype" => FieldName::EntryType,
            _ => FieldName::Named(lower),
        }
    }

    /// Returns the lowercase name.
    pub fn as_str(&self) -> &str {
        match self {
            FieldName::AnyField => "anyfield",
            FieldName::AnyKeyword => "anykeyword",
            FieldName::EntryType => "entrytype",
            FieldName::Named(name) => name,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed query expression.
///
/// `And` binds tighter than `Or`; both are left-associative, so `a b c`
/// parses as `And(And(a, b), c)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Unqualified word or phrase, searched everywhere.
    Term(String),
    /// `field op value`.
    Field {
        field: FieldName,
        op: CompareOp,
        value: String,
    },
    /// `NOT expr`.
    Not(Box<Expr>),
    /// `left AND right`.
    And(Box<Expr>, Box<Expr>),
    /// `left OR right`.
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Creates an unqualified term.
    pub fn term(text: impl Into<String>) -> Expr {
        Expr::Term(text.into())
    }

    /// Creates a field-qualified term.
    pub fn field(name: &str, op: CompareOp, value: impl Into<String>) -> Expr {
        Expr::Field {
            field: FieldName::new(name),
            op,
            value: value.into(),
        }
    }

    /// Conjunction of `self` and `other`.
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// Disjunction of `self` and `other`.
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Negation of `self`.
    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }

    /// Visits every term and field value in source order.
    pub fn values(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_values(&mut out);
        out
    }

    fn collect_values<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Term(text) => out.push(text),
            Expr::Field { value, .. } => out.push(value),
            Expr::Not(inner) => inner.collect_values(out),
            Expr::And(left, right) | Expr::Or(left, right) => {
                left.collect_values(out);
                right.collect_values(out);
            }
        }
    }
}

/// Words the lexer reads as operators when unquoted.
const RESERVED_WORDS: [&str; 3] = ["and", "or", "not"];

/// Writes a value so that it parses back to itself.
fn write_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let bare = !value.is_empty()
        && !RESERVED_WORDS
            .iter()
            .any(|word| value.eq_ignore_ascii_case(word))
        && !value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '=' | '!' | '\\'));
    if bare {
        return f.write_str(value);
    }
    f.write_str("\"")?;
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Term(text) => write_value(f, text),
            Expr::Field { field, op, value } => {
                write!(f, "{field}{op}")?;
                write_value(f, value)
            }
            Expr::Not(inner) => write!(f, "NOT {inner}"),
            Expr::And(left, right) => write!(f, "({left} AND {right})"),
            Expr::Or(left, right) => write!(f, "({left} OR {right})"),
        }
    }
}
