//! Desk calculator core.
//!
//! A [`Calculator`] holds one editable expression and reacts to key tokens
//! (digits, point, operators, percent, delete, clear, evaluate). Adapters map
//! their input events to the `on_*` entry points, or to [`Token`]s through the
//! [`Tokenizer`], and render [`Calculator::display`] verbatim.

pub mod calculator;
pub mod evaluator;
pub mod number;
pub mod render;
pub mod tokenizer;

pub use calculator::{Calculator, ErrorStyle};
pub use evaluator::{evaluate, EvalError};
pub use tokenizer::{Digit, Operation, Token, TokenizeError, Tokenizer};
