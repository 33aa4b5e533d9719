use compact_str::{format_compact, CompactString, ToCompactString};
use std::ops::Range;
use tracing::debug;

use crate::evaluator::{self, EvalError};
use crate::number;
use crate::render;
use crate::tokenizer::{Digit, Operation, Token};

const RESET_TEXT: &str = "0";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum CalculatorState {
    #[default]
    Normal,
    /// Next digit or point replaces the expression instead of extending it.
    AwaitingFreshInput,
    /// Last evaluation failed. The expression holds the reset text so that an
    /// operator continues from zero.
    Errored(EvalError),
}

/// How a failed evaluation is shown.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ErrorStyle {
    /// Always `Error`.
    Generic,
    /// `Error: Div by 0` or `Error: Invalid Exp`.
    #[default]
    Specific,
}

impl ErrorStyle {
    fn sentinel(self, error: EvalError) -> &'static str {
        match (self, error) {
            (ErrorStyle::Generic, _) => "Error",
            (ErrorStyle::Specific, EvalError::DivisionByZero) => "Error: Div by 0",
            (ErrorStyle::Specific, EvalError::InvalidExpression) => "Error: Invalid Exp",
        }
    }
}

/// The editable expression and the mode deciding how the next key applies.
///
/// Every `on_*` entry point runs to completion and returns the new display
/// text.
#[derive(Debug)]
pub struct Calculator {
    text: CompactString,
    state: CalculatorState,
    error_style: ErrorStyle,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Calculator {
        Calculator::with_error_style(ErrorStyle::default())
    }

    pub fn with_error_style(error_style: ErrorStyle) -> Calculator {
        Calculator {
            text: CompactString::new(RESET_TEXT),
            state: CalculatorState::Normal,
            error_style,
        }
    }

    /// Text to render verbatim.
    pub fn display(&self) -> &str {
        match self.state {
            CalculatorState::Errored(error) => self.error_style.sentinel(error),
            _ => &self.text,
        }
    }

    /// The expression as typed so far, even while an error is displayed.
    pub fn expression(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<EvalError> {
        match self.state {
            CalculatorState::Errored(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_awaiting_fresh_input(&self) -> bool {
        matches!(
            self.state,
            CalculatorState::AwaitingFreshInput | CalculatorState::Errored(_)
        )
    }

    pub fn handle_token(&mut self, token: Token) -> &str {
        match token {
            Token::Digit(digit) => self.on_digit(digit),
            Token::Point => self.on_point(),
            Token::Op(op) => self.on_operator(op),
            Token::Percent => self.on_percent(),
            Token::Negate => self.on_negate(),
            Token::Delete => self.on_delete(),
            Token::Clear => self.on_clear(),
            Token::Evaluate => self.on_evaluate(),
        };
        debug!(?token, text = %self.text, state = ?self.state, "token handled");
        self.display()
    }

    pub fn on_digit(&mut self, digit: Digit) -> &str {
        let c = digit.as_char();
        if self.start_fresh(c) {
            return self.display();
        }

        let replaces_zero = number::trailing_literal(&self.text)
            .is_some_and(|literal| literal.magnitude() == "0");
        if replaces_zero {
            self.text.pop();
        }
        self.text.push(c);
        self.display()
    }

    pub fn on_point(&mut self) -> &str {
        if self.start_fresh('.') {
            return self.display();
        }

        let has_point = self.text.ends_with('.')
            || number::trailing_literal(&self.text).is_some_and(|literal| literal.has_point());
        if has_point {
            debug!(text = %self.text, "second point dropped");
        } else {
            self.text.push('.');
        }
        self.display()
    }

    /// Appends `op`, replacing an operator that ends the expression.
    pub fn on_operator(&mut self, op: Operation) -> &str {
        if let CalculatorState::Errored(_) = self.state {
            self.text = CompactString::new(RESET_TEXT);
        }
        if self.text.ends_with(|c| Operation::from_char(c).is_some()) {
            self.text.pop();
        }
        self.text.push(op.symbol());
        self.state = CalculatorState::Normal;
        self.display()
    }

    /// Divides the trailing literal by 100 in place.
    pub fn on_percent(&mut self) -> &str {
        if let CalculatorState::Errored(_) = self.state {
            return self.on_clear();
        }

        let percentage = number::trailing_literal(&self.text)
            .and_then(|literal| Some((literal.start, literal.value()? / 100.0)));
        if let Some((start, value)) = percentage {
            self.text.truncate(start);
            self.text.push_str(&render::render(value));
        }
        self.state = CalculatorState::Normal;
        self.display()
    }

    /// Flips the sign of the trailing literal.
    ///
    /// A literal following a binary `+` or `-` flips that operator instead, so
    /// the expression never holds two operators in a row. After `*` or `/`
    /// nothing happens.
    pub fn on_negate(&mut self) -> &str {
        if let CalculatorState::Errored(_) = self.state {
            return self.display();
        }
        let Some(literal) = number::trailing_literal(&self.text) else {
            return self.display();
        };
        if literal.value() == Some(0.0) {
            return self.display();
        }

        let (start, negative) = (literal.start, literal.is_negative());
        if negative {
            self.splice(start..start + 1, "");
        } else if start == 0 {
            self.splice(0..0, "-");
        } else {
            let operator = self.text[..start].chars().next_back();
            match operator {
                Some('+') => self.splice(start - 1..start, "-"),
                Some('-') => self.splice(start - 1..start, "+"),
                _ => {}
            }
        }
        self.display()
    }

    pub fn on_delete(&mut self) -> &str {
        if let CalculatorState::Errored(_) = self.state {
            return self.on_clear();
        }

        self.text.pop();
        if self.text.is_empty() || self.text.as_str() == "-" {
            self.text = CompactString::new(RESET_TEXT);
        }
        self.state = CalculatorState::Normal;
        self.display()
    }

    pub fn on_clear(&mut self) -> &str {
        self.text = CompactString::new(RESET_TEXT);
        self.state = CalculatorState::Normal;
        self.display()
    }

    pub fn on_evaluate(&mut self) -> &str {
        match evaluator::evaluate(&self.text) {
            Ok(value) => {
                self.text = render::render(value);
                self.state = CalculatorState::AwaitingFreshInput;
            }
            Err(error) => {
                debug!(%error, text = %self.text, "evaluation failed");
                self.text = CompactString::new(RESET_TEXT);
                self.state = CalculatorState::Errored(error);
            }
        }
        self.display()
    }

    fn splice(&mut self, range: Range<usize>, replacement: &str) {
        self.text = format_compact!(
            "{}{}{}",
            &self.text[..range.start],
            replacement,
            &self.text[range.end..]
        );
    }

    /// Replaces the expression with `c` when the previous result or error
    /// should be discarded. Returns whether it did.
    fn start_fresh(&mut self, c: char) -> bool {
        if !self.is_awaiting_fresh_input() {
            return false;
        }
        self.text = c.to_compact_string();
        self.state = CalculatorState::Normal;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;

    /// Feeds a key sequence and returns the final display.
    fn press(calculator: &mut Calculator, keys: &str) -> String {
        let mut tokenizer = Tokenizer::default();
        for c in keys.chars() {
            if let Some(token) = tokenizer.update(c).unwrap() {
                calculator.handle_token(token);
            }
        }
        if let Some(token) = tokenizer.finalize().unwrap() {
            calculator.handle_token(token);
        }
        calculator.display().to_string()
    }

    fn run(keys: &str) -> String {
        press(&mut Calculator::default(), keys)
    }

    #[test]
    fn test_initial_state() {
        let calculator = Calculator::new();
        assert_eq!(calculator.display(), "0");
        assert_eq!(calculator.error(), None);
        assert!(!calculator.is_awaiting_fresh_input());
    }

    #[test]
    fn test_digits_without_leading_zeros() {
        assert_eq!(run("00"), "0");
        assert_eq!(run("50"), "50");
        assert_eq!(run("1234567890"), "1234567890");
        assert_eq!(run("5+07"), "5+7");
        assert_eq!(run("0.05"), "0.05");
    }

    #[test]
    fn test_point_guard() {
        assert_eq!(run("3.1."), "3.1");
        assert_eq!(run("3.."), "3.");
        assert_eq!(run(".5"), "0.5");
        assert_eq!(run("2=.."), ".");
        assert_eq!(run("1.5+2."), "1.5+2.");
    }

    #[test]
    fn test_operator_replacement() {
        assert_eq!(run("5+-"), "5-");
        assert_eq!(run("5*/+"), "5+");
        assert_eq!(run("-"), "0-");
        assert_eq!(run("-3="), "-3");
    }

    #[test]
    fn test_evaluate_then_digit_starts_fresh() {
        let mut calculator = Calculator::new();
        assert_eq!(press(&mut calculator, "2+3="), "5");
        assert!(calculator.is_awaiting_fresh_input());
        assert_eq!(press(&mut calculator, "4"), "4");
        assert!(!calculator.is_awaiting_fresh_input());
    }

    #[test]
    fn test_evaluate_then_operator_continues() {
        assert_eq!(run("2+3=*2"), "5*2");
        assert_eq!(run("2+3=*2="), "10");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(run("6+2*3="), "12");
        assert_eq!(run("6/2*3="), "9");
        assert_eq!(run("0.1+0.2="), "0.3");
        assert_eq!(run("1÷3="), "0.3333333333");
    }

    #[test]
    fn test_division_by_zero() {
        let mut calculator = Calculator::new();
        assert_eq!(press(&mut calculator, "5/0="), "Error: Div by 0");
        assert_eq!(calculator.error(), Some(EvalError::DivisionByZero));
        assert!(calculator.is_awaiting_fresh_input());
        assert_eq!(press(&mut calculator, "c"), "0");
        assert_eq!(calculator.error(), None);
    }

    #[test]
    fn test_generic_error_style() {
        let mut calculator = Calculator::with_error_style(ErrorStyle::Generic);
        assert_eq!(press(&mut calculator, "5/0="), "Error");
        assert_eq!(press(&mut calculator, "7+="), "Error");
    }

    #[test]
    fn test_invalid_expression() {
        assert_eq!(run("7+="), "Error: Invalid Exp");
        assert_eq!(run("2=.="), "Error: Invalid Exp");
    }

    #[test]
    fn test_recovery_from_error() {
        assert_eq!(run("5/0=8"), "8");
        assert_eq!(run("5/0=+2"), "0+2");
        assert_eq!(run("5/0=d"), "0");
        assert_eq!(run("5/0=%"), "0");
        assert_eq!(run("5/0=="), "0");
        assert_eq!(run("5/0=neg"), "Error: Div by 0");
    }

    #[test]
    fn test_percent() {
        assert_eq!(run("200%"), "2");
        assert_eq!(run("100+50%"), "100+0.5");
        assert_eq!(run("100+50%="), "100.5");
        assert_eq!(run("100-50%"), "100-0.5");
        assert_eq!(run("%"), "0");
        assert_eq!(run("7+%"), "7+");
        assert_eq!(run("5-8=%"), "-0.03");
    }

    #[test]
    fn test_percent_clears_fresh_input() {
        let mut calculator = Calculator::new();
        press(&mut calculator, "50=%");
        assert!(!calculator.is_awaiting_fresh_input());
        assert_eq!(press(&mut calculator, "5"), "0.55");
    }

    #[test]
    fn test_delete() {
        assert_eq!(run("12d"), "1");
        assert_eq!(run("1d"), "0");
        assert_eq!(run("d"), "0");
        assert_eq!(run("12+d"), "12");
        assert_eq!(run("3-8=d"), "0");
        assert_eq!(run("3-18=d"), "-1");
    }

    #[test]
    fn test_delete_after_evaluate_edits_result() {
        let mut calculator = Calculator::new();
        assert_eq!(press(&mut calculator, "12*3=d"), "3");
        assert_eq!(press(&mut calculator, "5"), "35");
    }

    #[test]
    fn test_negate() {
        assert_eq!(run("5n"), "-5");
        assert_eq!(run("5 n n"), "5");
        assert_eq!(run("7+3n"), "7-3");
        assert_eq!(run("7-3n"), "7+3");
        assert_eq!(run("7*3n"), "7*3");
        assert_eq!(run("7+n"), "7+");
        assert_eq!(run("n"), "0");
        assert_eq!(run("2-9=n"), "7");
    }

    #[test]
    fn test_negate_keeps_fresh_input() {
        let mut calculator = Calculator::new();
        assert_eq!(press(&mut calculator, "4=n"), "-4");
        assert!(calculator.is_awaiting_fresh_input());
        assert_eq!(press(&mut calculator, "2"), "2");
    }

    #[test]
    fn test_sign_entry_on_bare_zero() {
        assert_eq!(run("-5="), "-5");
        assert_eq!(run("*5="), "0");
    }

    #[test]
    fn test_clear() {
        let mut calculator = Calculator::new();
        assert_eq!(press(&mut calculator, "12+3 esc"), "0");
        assert_eq!(calculator.expression(), "0");
        assert!(!calculator.is_awaiting_fresh_input());
    }
}
