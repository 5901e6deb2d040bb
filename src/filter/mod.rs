//! Filter-expression translator.
//!
//! Turns the user-supplied textual predicate from `GET /results?filter=...`
//! into a typed abstract syntax tree that the storage layer compiles into a
//! parameterized query. Nothing from the raw input ever reaches the storage
//! engine as text: unknown tokens, stray characters, unknown fields or
//! operators and unbalanced parentheses are rejected outright.
//!
//! Grammar (case-insensitive `AND`, everything else lowercase):
//!
//! ```text
//! expr       := term { AND term }
//! term       := '(' expr ')' | comparison
//! comparison := field op value
//! field      := 'date' | 'distance' | 'time'
//! op         := 'eq' | 'ne' | 'gt' | 'lt'
//! value      := '<quoted YYYY-MM-DD>' | integer
//! ```
//!
//! `gt` and `lt` translate to the *inclusive* comparisons `>=` and `<=`; the
//! public API has always behaved that way and callers depend on it.

mod ast;
mod lexer;
mod parser;

pub use ast::{CmpOp, Comparison, FilterExpr};
pub use parser::parse;

use thiserror::Error;

use crate::errors::AppError;

/// Reasons a filter expression is rejected before touching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),

    #[error("unterminated quoted literal")]
    UnterminatedString,

    #[error("numeric literal out of range")]
    InvalidNumber,

    #[error("unknown field {0:?} (expected date, distance or time)")]
    UnknownField(String),

    #[error("unknown operator {0:?} (expected eq, ne, gt or lt)")]
    UnknownOperator(String),

    #[error("invalid date literal {0:?} (should be 'YYYY-MM-DD')")]
    InvalidDate(String),

    #[error("field {0:?} expects a {1} literal")]
    TypeMismatch(&'static str, &'static str),

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),

    #[error("unexpected end of filter")]
    UnexpectedEnd,

    #[error("unexpected trailing input")]
    TrailingInput,
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        AppError::validation(format!("invalid filter: {}", err))
    }
}
