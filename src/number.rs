//! Numeric literal matching inside expression text.
//!
//! A literal is `-? ( digits ('.' digits*)? | '.' digits+ )`. A `-` belongs to
//! the literal only when it cannot be a binary operator: at the very start of
//! the text or right after another operator.

use lazy_static::lazy_static;
use regex::Regex;

use crate::tokenizer::Operation;

lazy_static! {
    /// Unsigned literal ending the text.
    static ref TRAILING: Regex = Regex::new(r"(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").unwrap();

    /// Optionally signed literal starting the text.
    static ref LEADING: Regex = Regex::new(r"^-?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)").unwrap();
}

/// A literal found in a larger expression, with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal<'a> {
    pub start: usize,
    pub text: &'a str,
}

impl<'a> Literal<'a> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn has_point(&self) -> bool {
        self.text.contains('.')
    }

    pub fn is_negative(&self) -> bool {
        self.text.starts_with('-')
    }

    /// Digits and point without the sign.
    pub fn magnitude(&self) -> &'a str {
        self.text.strip_prefix('-').unwrap_or(self.text)
    }

    pub fn value(&self) -> Option<f64> {
        parse(self.text)
    }
}

/// Finds the literal being typed at the end of `text`, if any.
pub fn trailing_literal(text: &str) -> Option<Literal<'_>> {
    let m = TRAILING.find(text)?;
    let mut start = m.start();

    if let Some(before) = text[..start].strip_suffix('-') {
        let sign_is_unary = before
            .chars()
            .next_back()
            .map_or(true, |c| Operation::from_char(c).is_some());
        if sign_is_unary {
            start -= 1;
        }
    }

    Some(Literal {
        start,
        text: &text[start..],
    })
}

/// Matches a literal at the very start of `text`, sign included.
pub fn leading_literal(text: &str) -> Option<&str> {
    LEADING.find(text).map(|m| m.as_str())
}

/// Parses a literal; `"5."` and `".5"` are both accepted.
pub fn parse(literal: &str) -> Option<f64> {
    literal.parse().ok()
}
