//! Recursive-descent parser for filter expressions.

use chrono::NaiveDate;

use super::ast::{CmpOp, Comparison, FilterExpr};
use super::lexer::{tokenize, Token};
use super::FilterError;

/// Parse a raw filter string into a typed expression tree.
pub fn parse(input: &str) -> Result<FilterExpr, FilterError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    if parser.pos != parser.tokens.len() {
        return Err(FilterError::TrailingInput);
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// `expr := term { AND term }`
    fn expression(&mut self) -> Result<FilterExpr, FilterError> {
        let mut left = self.term()?;
        while let Some(Token::Word(word)) = self.peek() {
            if !word.eq_ignore_ascii_case("and") {
                break;
            }
            self.pos += 1;
            let right = self.term()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// `term := '(' expr ')' | comparison`
    fn term(&mut self) -> Result<FilterExpr, FilterError> {
        match self.next() {
            Some(Token::LParen) => {
                let inner = self.expression()?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(FilterError::UnbalancedParens),
                }
            }
            Some(Token::Word(field)) => self.comparison(&field).map(FilterExpr::Cmp),
            Some(token) => Err(FilterError::UnexpectedToken(describe(&token))),
            None => Err(FilterError::UnexpectedEnd),
        }
    }

    /// `comparison := field op value`, with the operand typed per field.
    fn comparison(&mut self, field: &str) -> Result<Comparison, FilterError> {
        if !matches!(field, "date" | "distance" | "time") {
            return Err(FilterError::UnknownField(field.to_string()));
        }

        let op = match self.next() {
            Some(Token::Word(op_word)) => match op_word.as_str() {
                "eq" => CmpOp::Eq,
                "ne" => CmpOp::Ne,
                // gt/lt are inclusive bounds in this API
                "gt" => CmpOp::Ge,
                "lt" => CmpOp::Le,
                other => return Err(FilterError::UnknownOperator(other.to_string())),
            },
            Some(token) => return Err(FilterError::UnexpectedToken(describe(&token))),
            None => return Err(FilterError::UnexpectedEnd),
        };

        match (field, self.next()) {
            ("date", Some(Token::Quoted(literal))) => {
                let date = NaiveDate::parse_from_str(&literal, "%Y-%m-%d")
                    .map_err(|_| FilterError::InvalidDate(literal))?;
                Ok(Comparison::Date(op, date))
            }
            ("date", Some(_)) => Err(FilterError::TypeMismatch("date", "quoted date")),
            ("distance", Some(Token::Number(value))) => Ok(Comparison::Distance(op, value)),
            ("distance", Some(_)) => Err(FilterError::TypeMismatch("distance", "numeric")),
            ("time", Some(Token::Number(value))) => Ok(Comparison::Time(op, value)),
            ("time", Some(_)) => Err(FilterError::TypeMismatch("time", "numeric")),
            (_, None) => Err(FilterError::UnexpectedEnd),
            // fields were whitelisted above
            (_, Some(_)) => Err(FilterError::UnknownField(field.to_string())),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::LParen => "(".to_string(),
        Token::RParen => ")".to_string(),
        Token::Word(w) => w.clone(),
        Token::Number(n) => n.to_string(),
        Token::Quoted(q) => format!("'{}'", q),
    }
}
