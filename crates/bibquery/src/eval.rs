//! Evaluation of parsed queries against records.
//!
//! [`Predicate`] mirrors [`Expr`] with every value compiled into a
//! [`ValueMatcher`], so regexes are built once per query instead of once per
//! record.

use crate::ast::{CompareOp, Expr, FieldName};
use crate::flags::SearchFlags;
use crate::matcher::ValueMatcher;
use crate::record::Record;

/// A compiled, evaluatable query.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Unqualified term: entry type, any field value or any keyword.
    Anywhere(ValueMatcher),
    /// Field-qualified term.
    Field {
        field: FieldName,
        op: CompareOp,
        matcher: ValueMatcher,
    },
    Not(Box<Predicate>),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    /// Compiles an expression for the given flags.
    pub fn compile(expr: &Expr, flags: SearchFlags) -> Predicate {
        match expr {
            Expr::Term(text) => Predicate::Anywhere(ValueMatcher::new(text, flags)),
            Expr::Field { field, op, value } => Predicate::Field {
                field: field.clone(),
                op: *op,
                matcher: ValueMatcher::new(value, flags),
            },
            Expr::Not(inner) => Predicate::Not(Box::new(Predicate::compile(inner, flags))),
            Expr::And(left, right) => Predicate::And(
                Box::new(Predicate::compile(left, flags)),
                Box::new(Predicate::compile(right, flags)),
            ),
            Expr::Or(left, right) => Predicate::Or(
                Box::new(Predicate::compile(left, flags)),
                Box::new(Predicate::compile(right, flags)),
            ),
        }
    }

    /// Tests a record. `delimiter` splits the record's keyword list.
    pub fn evaluate<R>(&self, record: &R, delimiter: char) -> bool
    where
        R: Record + ?Sized,
    {
        match self {
            Predicate::Anywhere(matcher) => {
                matcher.contains(record.entry_type_name())
                    || record
                        .all_field_values()
                        .values()
                        .any(|value| matcher.contains(value))
                    || record
                        .keyword_list(delimiter)
                        .iter()
                        .any(|keyword| matcher.contains(keyword))
            }
            Predicate::Field { field, op, matcher } => match field {
                FieldName::AnyField => record
                    .all_field_values()
                    .values()
                    .any(|value| matcher.compare(*op, value)),
                FieldName::AnyKeyword => record
                    .keyword_list(delimiter)
                    .iter()
                    .any(|keyword| matcher.compare(*op, keyword)),
                FieldName::EntryType => matcher.compare(*op, record.entry_type_name()),
                FieldName::Named(name) => record
                    .field_value(name)
                    .is_some_and(|value| matcher.compare(*op, value)),
            },
            Predicate::Not(inner) => !inner.evaluate(record, delimiter),
            Predicate::And(left, right) => {
                left.evaluate(record, delimiter) && right.evaluate(record, delimiter)
            }
            Predicate::Or(left, right) => {
                left.evaluate(record, delimiter) || right.evaluate(record, delimiter)
            }
        }
    }
}
