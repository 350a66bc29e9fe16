//! Lexer for query text.
//!
//! Splits a query into words, quoted phrases, parentheses, comparison
//! operators and the `AND`/`OR`/`NOT` keywords.

use crate::ast::CompareOp;
use crate::error::{Result, SearchError};

/// Token types for query parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `AND`, any case
    And,
    /// `OR`, any case
    Or,
    /// `NOT`, any case
    Not,
    /// `=`, `==` or `!=`
    Compare(CompareOp),
    /// An unquoted run of characters.
    Word(String),
    /// A quoted phrase with the quotes removed.
    Phrase(String),
}

impl Token {
    /// Returns `true` if the token can begin an operand.
    pub fn starts_operand(&self) -> bool {
        matches!(
            self,
            Token::LeftParen | Token::Not | Token::Word(_) | Token::Phrase(_)
        )
    }

    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::And => "AND".to_string(),
            Token::Or => "OR".to_string(),
            Token::Not => "NOT".to_string(),
            Token::Compare(op) => format!("'{op}'"),
            Token::Word(word) => format!("word '{word}'"),
            Token::Phrase(phrase) => format!("phrase \"{phrase}\""),
        }
    }
}

/// Tokenizes the whole input.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        let token = match ch {
            '(' => {
                self.bump();
                Token::LeftParen
            }
            ')' => {
                self.bump();
                Token::RightParen
            }
            '"' => {
                let start = self.pos;
                self.bump();
                self.read_phrase(start)?
            }
            '=' | '!' => match self.read_compare() {
                Some(op) => Token::Compare(op),
                None => self.read_word(),
            },
            _ => self.read_word(),
        };

        Ok(Some(token))
    }

    fn read_compare(&mut self) -> Option<CompareOp> {
        let symbol = ["==", "!=", "="]
            .into_iter()
            .find(|symbol| self.rest().starts_with(*symbol))?;
        let op = CompareOp::from_symbol(symbol)?;
        self.pos += symbol.len();
        Some(op)
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace()
                || matches!(ch, '(' | ')' | '"' | '=')
                || (ch == '!' && self.rest().starts_with("!="))
            {
                break;
            }
            self.bump();
        }

        let word = &self.input[start..self.pos];
        if word.eq_ignore_ascii_case("and") {
            Token::And
        } else if word.eq_ignore_ascii_case("or") {
            Token::Or
        } else if word.eq_ignore_ascii_case("not") {
            Token::Not
        } else {
            Token::Word(word.to_string())
        }
    }

    // `\"` and `\\` unescape; other backslash pairs are kept so regex
    // escapes like `\d` pass through.
    fn read_phrase(&mut self, start: usize) -> Result<Token> {
        let mut phrase = String::new();

        while let Some(ch) = self.bump() {
            match ch {
                '"' => return Ok(Token::Phrase(phrase)),
                '\\' => match self.bump() {
                    Some(escaped @ ('"' | '\\')) => phrase.push(escaped),
                    Some(other) => {
                        phrase.push('\\');
                        phrase.push(other);
                    }
                    None => break,
                },
                _ => phrase.push(ch),
            }
        }

        Err(SearchError::UnterminatedQuote { position: start })
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }
}
