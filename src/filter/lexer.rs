//! Filter tokenizer.
//!
//! Splits the raw filter string into tokens, rejecting every character that
//! is not part of the grammar. There is no fallback or stripping: a stray
//! semicolon or comment marker fails the whole expression.

use super::FilterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    /// Bare word: a field name, an operator or the `AND` connective.
    Word(String),
    /// Bare non-negative integer literal.
    Number(i64),
    /// Single-quoted literal, quotes removed.
    Quoted(String),
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '\'' => {
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => literal.push(ch),
                        None => return Err(FilterError::UnterminatedString),
                    }
                }
                tokens.push(Token::Quoted(literal));
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: i64 = digits.parse().map_err(|_| FilterError::InvalidNumber)?;
                tokens.push(Token::Number(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if w.is_ascii_alphabetic() {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Word(word));
            }
            other => return Err(FilterError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}
