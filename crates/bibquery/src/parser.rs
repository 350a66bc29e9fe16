//! Recursive descent parser for query text.
//!
//! # Grammar
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr (OR and_expr)*
//! and_expr   := unary (AND? unary)*
//! unary      := NOT unary | atom
//! atom       := '(' expr ')' | field_term | term
//! field_term := WORD ('=' | '==' | '!=' | CONTAINS | MATCHES) value
//! value      := WORD | PHRASE
//! term       := WORD | PHRASE
//! ```
//!
//! Adjacent operands combine with an implicit `AND`. Both binary operators
//! are left-associative and `AND` binds tighter than `OR`.
//!
//! Nesting through `(` and `NOT` is capped at [`MAX_DEPTH`] levels and a
//! query holds at most [`MAX_TERMS`] terms, which bounds the height of the
//! resulting tree.

use crate::ast::{CompareOp, Expr};
use crate::error::{Result, SearchError};
use crate::lexer::{tokenize, Token};

/// Deepest nesting of `(` and `NOT` accepted.
pub const MAX_DEPTH: usize = 128;

/// Most terms, plain or field-qualified, accepted in one query.
pub const MAX_TERMS: usize = 1024;

/// Parses query text into an expression.
///
/// Blank input is an error: there is nothing to evaluate.
///
/// # Example
///
/// ```
/// use bibquery::{parse, CompareOp, Expr};
///
/// let expr = parse("title=rust OR author==knuth").unwrap();
/// assert_eq!(
///     expr,
///     Expr::field("title", CompareOp::Contains, "rust")
///         .or(Expr::field("author", CompareOp::Exact, "knuth"))
/// );
/// ```
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        terms: 0,
    };

    let expr = parser.parse_or_expr()?;

    if let Some(token) = parser.peek() {
        return Err(SearchError::UnexpectedToken {
            index: parser.pos,
            found: token.describe(),
        });
    }

    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    terms: usize,
}

impl Parser {
    /// or_expr := and_expr (OR and_expr)*
    fn parse_or_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_and_expr()?;
        while self.eat(&Token::Or) {
            let right = self.parse_and_expr()?;
            left = left.or(right);
        }
        Ok(left)
    }

    /// and_expr := unary (AND? unary)*
    fn parse_and_expr(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let explicit = self.eat(&Token::And);
            if !explicit && !self.peek().is_some_and(Token::starts_operand) {
                break;
            }
            let right = self.parse_unary()?;
            left = left.and(right);
        }
        Ok(left)
    }

    /// unary := NOT unary | atom
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            self.enter()?;
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(inner.negate());
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Expr> {
        let index = self.pos;
        match self.advance() {
            None => Err(SearchError::UnexpectedEnd {
                expected: "a search term",
            }),
            Some(Token::LeftParen) => {
                self.enter()?;
                let inner = self.parse_or_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token::RightParen) => Ok(inner),
                    Some(other) => Err(SearchError::UnexpectedToken {
                        index: self.pos - 1,
                        found: other.describe(),
                    }),
                    None => Err(SearchError::UnexpectedEnd { expected: "')'" }),
                }
            }
            Some(Token::Word(word)) => {
                self.count_term()?;
                match self.comparison_ahead() {
                    Some(op) => self.parse_field_value(&word, op),
                    None => Ok(Expr::Term(word)),
                }
            }
            Some(Token::Phrase(phrase)) => {
                if matches!(self.peek(), Some(Token::Compare(_))) {
                    return Err(SearchError::InvalidFieldName { name: phrase });
                }
                self.count_term()?;
                Ok(Expr::Term(phrase))
            }
            Some(other) => Err(SearchError::UnexpectedToken {
                index,
                found: other.describe(),
            }),
        }
    }

    /// Consumes the operator of a field term if one follows.
    fn comparison_ahead(&mut self) -> Option<CompareOp> {
        match self.peek() {
            Some(Token::Compare(op)) => {
                let op = *op;
                self.pos += 1;
                Some(op)
            }
            // Word operators only count when a value follows, so a lone
            // "contains" stays an ordinary term.
            Some(Token::Word(word)) => {
                let op = CompareOp::from_word(word)?;
                let value_follows = matches!(
                    self.tokens.get(self.pos + 1),
                    Some(Token::Word(_) | Token::Phrase(_))
                );
                if value_follows {
                    self.pos += 1;
                    Some(op)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn parse_field_value(&mut self, name: &str, op: CompareOp) -> Result<Expr> {
        if !is_field_name(name) {
            return Err(SearchError::InvalidFieldName {
                name: name.to_string(),
            });
        }

        let index = self.pos;
        match self.advance() {
            Some(Token::Word(value) | Token::Phrase(value)) => Ok(Expr::field(name, op, value)),
            Some(other) => Err(SearchError::UnexpectedToken {
                index,
                found: other.describe(),
            }),
            None => Err(SearchError::MissingValue {
                field: name.to_string(),
            }),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(SearchError::TooDeep { limit: MAX_DEPTH });
        }
        self.depth += 1;
        Ok(())
    }

    fn count_term(&mut self) -> Result<()> {
        if self.terms >= MAX_TERMS {
            return Err(SearchError::TooManyTerms { limit: MAX_TERMS });
        }
        self.terms += 1;
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        Some(token)
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

/// Identifier rule for field names: `[A-Za-z_][A-Za-z0-9_.-]*`, Unicode letters allowed.
fn is_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(s: &str) -> Expr {
        Expr::term(s)
    }

    #[test]
    fn single_term() {
        assert_eq!(parse("progress").unwrap(), term("progress"));
    }

    #[test]
    fn quoted_phrase_term() {
        assert_eq!(
            parse(r#""systematic review""#).unwrap(),
            term("systematic review")
        );
    }

    #[test]
    fn juxtaposition_is_and() {
        assert_eq!(
            parse("a b c").unwrap(),
            term("a").and(term("b")).and(term("c"))
        );
    }

    #[test]
    fn explicit_and_matches_implicit() {
        assert_eq!(parse("a AND b").unwrap(), parse("a b").unwrap());
        assert_eq!(parse("a and b").unwrap(), parse("a b").unwrap());
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse("a OR b c").unwrap(),
            term("a").or(term("b").and(term("c")))
        );
        assert_eq!(
            parse("a b OR c").unwrap(),
            term("a").and(term("b")).or(term("c"))
        );
    }

    #[test]
    fn or_is_left_associative() {
        assert_eq!(
            parse("a or b or c").unwrap(),
            term("a").or(term("b")).or(term("c"))
        );
    }

    #[test]
    fn parentheses_regroup() {
        assert_eq!(
            parse("(a OR b) c").unwrap(),
            term("a").or(term("b")).and(term("c"))
        );
    }

    #[test]
    fn field_terms() {
        assert_eq!(
            parse("title=rust").unwrap(),
            Expr::field("title", CompareOp::Contains, "rust")
        );
        assert_eq!(
            parse(r#"Title == "Systematic Review""#).unwrap(),
            Expr::field("title", CompareOp::Exact, "Systematic Review")
        );
        assert_eq!(
            parse("keywords!=banana").unwrap(),
            Expr::field("keywords", CompareOp::NotContains, "banana")
        );
    }

    #[test]
    fn word_operators() {
        assert_eq!(
            parse("title contains rust").unwrap(),
            Expr::field("title", CompareOp::Contains, "rust")
        );
        assert_eq!(
            parse(r#"author MATCHES "Knuth""#).unwrap(),
            Expr::field("author", CompareOp::Exact, "Knuth")
        );
    }

    #[test]
    fn trailing_word_operator_is_a_term() {
        assert_eq!(
            parse("title contains").unwrap(),
            term("title").and(term("contains"))
        );
    }

    #[test]
    fn phrase_value_keeps_parenthesis() {
        assert_eq!(
            parse(r#"booktitle="(""#).unwrap(),
            Expr::field("booktitle", CompareOp::Contains, "(")
        );
    }

    #[test]
    fn mixed_field_and_plain_terms() {
        assert_eq!(
            parse("anyfield=fruit and keywords!=banana").unwrap(),
            Expr::field("anyfield", CompareOp::Contains, "fruit").and(Expr::field(
                "keywords",
                CompareOp::NotContains,
                "banana"
            ))
        );
    }

    #[test]
    fn not_prefix() {
        assert_eq!(parse("NOT a").unwrap(), term("a").negate());
        assert_eq!(
            parse("a not b").unwrap(),
            term("a").and(term("b").negate())
        );
        assert_eq!(parse("not not a").unwrap(), term("a").negate().negate());
    }

    #[test]
    fn regex_text_survives_as_word() {
        assert_eq!(
            parse(r"[a-c]\d* \d*").unwrap(),
            term(r"[a-c]\d*").and(term(r"\d*"))
        );
        assert_eq!(parse("asdf[").unwrap(), term("asdf["));
    }

    #[test]
    fn malformed_queries_are_errors() {
        assert!(matches!(
            parse("").unwrap_err(),
            SearchError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            parse("(a").unwrap_err(),
            SearchError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            parse("a)").unwrap_err(),
            SearchError::UnexpectedToken { index: 1, .. }
        ));
        assert!(matches!(
            parse("title=").unwrap_err(),
            SearchError::MissingValue { .. }
        ));
        assert!(matches!(
            parse("=x").unwrap_err(),
            SearchError::UnexpectedToken { index: 0, .. }
        ));
        assert!(matches!(
            parse("a OR").unwrap_err(),
            SearchError::UnexpectedEnd { .. }
        ));
        assert!(matches!(
            parse("()").unwrap_err(),
            SearchError::UnexpectedToken { .. }
        ));
        assert!(matches!(
            parse("a[b=c").unwrap_err(),
            SearchError::InvalidFieldName { .. }
        ));
        assert!(matches!(
            parse(r#""title"=x"#).unwrap_err(),
            SearchError::InvalidFieldName { .. }
        ));
        assert!(matches!(
            parse(r#"title="x"#).unwrap_err(),
            SearchError::UnterminatedQuote { .. }
        ));
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let input = format!("{}a{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&input).unwrap(), term("a"));

        let input = format!("{}a", "NOT ".repeat(MAX_DEPTH));
        assert!(parse(&input).is_ok());
    }

    #[test]
    fn nesting_past_the_limit_is_an_error() {
        let depth = MAX_DEPTH + 1;
        let input = format!("{}a{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(
            parse(&input).unwrap_err(),
            SearchError::TooDeep { limit: MAX_DEPTH }
        ));

        let input = format!("{}a", "NOT ".repeat(5_000));
        assert!(matches!(
            parse(&input).unwrap_err(),
            SearchError::TooDeep { .. }
        ));

        // mixed nesting counts both kinds
        let input = format!("{}a{}", "NOT (".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert!(matches!(
            parse(&input).unwrap_err(),
            SearchError::TooDeep { .. }
        ));
    }

    #[test]
    fn sibling_groups_do_not_accumulate_depth() {
        let input = "(a) ".repeat(MAX_DEPTH * 2);
        assert!(parse(&input).is_ok());
    }

    #[test]
    fn term_count_is_capped() {
        assert!(parse(&"a ".repeat(MAX_TERMS)).is_ok());
        assert!(matches!(
            parse(&"a ".repeat(MAX_TERMS + 1)).unwrap_err(),
            SearchError::TooManyTerms { limit: MAX_TERMS }
        ));
        // a field term counts once
        assert!(parse(&"title=x ".repeat(MAX_TERMS)).is_ok());
    }

    #[test]
    fn field_name_rule() {
        assert!(is_field_name("title"));
        assert!(is_field_name("_private"));
        assert!(is_field_name("journal-title.short"));
        assert!(!is_field_name("1st"));
        assert!(!is_field_name("a[b"));
        assert!(!is_field_name(""));
    }
}
