//! Two-pass reduction of a linear infix expression.
//!
//! The text is lexed into alternating numbers and operators, then adjacent
//! pairs are collapsed leftmost first: `*` and `/` in the first pass, `+` and
//! `-` in the second. Within a pass equal-precedence operators therefore
//! associate strictly left to right (`6/2*3` is `9`).

use thiserror::Error;
use tracing::{debug, trace};

use crate::number;
use crate::render;
use crate::tokenizer::Operation;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Invalid expression")]
    InvalidExpression,
}

/// `first (op operand)*`, the lexed form of an expression.
#[derive(Debug, PartialEq)]
struct Terms {
    first: f64,
    rest: Vec<(Operation, f64)>,
}

impl Terms {
    fn lex(text: &str) -> Result<Terms, EvalError> {
        let mut rest = Vec::new();
        let (first, mut remaining) = operand(text)?;

        loop {
            remaining = remaining.trim_start();
            let Some(c) = remaining.chars().next() else {
                break;
            };
            let op = Operation::from_char(c).ok_or(EvalError::InvalidExpression)?;
            let (value, after) = operand(&remaining[c.len_utf8()..])?;
            rest.push((op, value));
            remaining = after;
        }

        Ok(Terms { first, rest })
    }

    /// Collapses every pair whose operator satisfies `selected`, leftmost
    /// pair first.
    fn collapse(&mut self, selected: impl Fn(Operation) -> bool) -> Result<(), EvalError> {
        let mut i = 0;
        while i < self.rest.len() {
            let (op, right) = self.rest[i];
            if !selected(op) {
                i += 1;
                continue;
            }

            let left = if i == 0 {
                self.first
            } else {
                self.rest[i - 1].1
            };
            let value = apply(left, op, right)?;
            trace!(left, %op, right, value, "collapse");

            if i == 0 {
                self.first = value;
            } else {
                self.rest[i - 1].1 = value;
            }
            self.rest.remove(i);
        }
        Ok(())
    }
}

/// Reads one optionally signed literal, skipping leading whitespace.
fn operand(text: &str) -> Result<(f64, &str), EvalError> {
    let text = text.trim_start();
    let literal = number::leading_literal(text).ok_or(EvalError::InvalidExpression)?;
    let value = number::parse(literal).ok_or(EvalError::InvalidExpression)?;
    Ok((value, &text[literal.len()..]))
}

fn apply(left: f64, op: Operation, right: f64) -> Result<f64, EvalError> {
    match op {
        Operation::Add => Ok(left + right),
        Operation::Sub => Ok(left - right),
        Operation::Mul => Ok(left * right),
        Operation::Div => {
            if right == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(left / right)
        }
    }
}

/// Evaluates `text` to a finite value rounded to [`render::PRECISION`]
/// decimal places.
///
/// A leading or trailing operator, or anything that is not a literal or an
/// operator, fails with [`EvalError::InvalidExpression`].
pub fn evaluate(text: &str) -> Result<f64, EvalError> {
    // The typographic minus is both the binary operator and the sign
    let mut terms = Terms::lex(&text.replace('−', "-"))?;
    terms.collapse(Operation::is_multiplicative)?;
    terms.collapse(|op| !op.is_multiplicative())?;
    debug_assert!(terms.rest.is_empty());

    let value = render::round(terms.first);
    if !value.is_finite() {
        return Err(EvalError::InvalidExpression);
    }
    debug!(text, value, "evaluated");
    Ok(value)
}
