use compact_str::{CompactString, ToCompactString};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Default)]
enum TokenizerState {
    #[default]
    Clean,
    Pending(Token),
    InWord(CompactString),
}

/// Turns a stream of key characters into calculator tokens.
///
/// Emission lags one character behind input, so callers must call
/// [`Tokenizer::finalize`] once the input is exhausted.
#[derive(Debug, Default)]
pub struct Tokenizer {
    state: TokenizerState,
}

impl Tokenizer {
    pub fn update(&mut self, c: char) -> Result<Option<Token>, TokenizeError> {
        use TokenizerState::*;

        match self.state {
            Clean => {
                if c.is_whitespace() {
                    return Ok(None);
                }
                if c.is_alphabetic() {
                    self.state = InWord(c.to_compact_string());
                    return Ok(None);
                }
                self.state = Pending(Token::from_key(c)?);
                Ok(None)
            }
            Pending(_) => {
                let token = self.finalize()?;
                self.update(c)?;
                Ok(token)
            }
            InWord(ref mut word) => {
                if c.is_alphabetic() {
                    word.push(c);
                    Ok(None)
                } else {
                    let token = self.finalize()?;
                    self.update(c)?;
                    Ok(token)
                }
            }
        }
    }

    /// Drops a partially typed key.
    pub fn reset(&mut self) {
        self.state = TokenizerState::Clean;
    }

    pub fn finalize(&mut self) -> Result<Option<Token>, TokenizeError> {
        use TokenizerState::*;
        let token = match std::mem::take(&mut self.state) {
            Clean => None,
            Pending(token) => Some(token),
            InWord(word) => Some(Token::from_word(word)?),
        };
        Ok(token)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unexpected key '{0}'")]
    UnexpectedKey(char),
    #[error("Unknown key: {0}")]
    UnknownKey(CompactString),
}

/// One discrete user input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Digit(Digit),
    Point,
    Op(Operation),
    Percent,
    Negate,
    Delete,
    Clear,
    Evaluate,
}

impl Token {
    fn from_key(c: char) -> Result<Token, TokenizeError> {
        if let Some(digit) = Digit::new(c) {
            return Ok(Token::Digit(digit));
        }
        if let Some(op) = Operation::from_char(c) {
            return Ok(Token::Op(op));
        }
        match c {
            '.' => Ok(Token::Point),
            '%' => Ok(Token::Percent),
            '=' => Ok(Token::Evaluate),
            _ => Err(TokenizeError::UnexpectedKey(c)),
        }
    }

    fn from_word(word: CompactString) -> Result<Token, TokenizeError> {
        match word.to_lowercase().as_str() {
            "enter" | "eq" => Ok(Token::Evaluate),
            "backspace" | "bs" | "delete" | "del" | "d" => Ok(Token::Delete),
            "escape" | "esc" | "clear" | "c" => Ok(Token::Clear),
            "neg" | "n" => Ok(Token::Negate),
            "x" => Ok(Token::Op(Operation::Mul)),
            _ => Err(TokenizeError::UnknownKey(word)),
        }
    }
}

/// A single decimal digit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digit(u8);

impl Digit {
    pub fn new(c: char) -> Option<Digit> {
        c.to_digit(10).map(|d| Digit(d as u8))
    }

    pub fn as_char(self) -> char {
        (b'0' + self.0) as char
    }
}

impl TryFrom<char> for Digit {
    type Error = TokenizeError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Digit::new(c).ok_or(TokenizeError::UnexpectedKey(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operation {
    /// Accepts both the ASCII keyboard operators and the calculator glyphs.
    pub fn from_char(c: char) -> Option<Operation> {
        match c {
            '+' => Some(Operation::Add),
            '-' | '−' => Some(Operation::Sub),
            '*' | '×' => Some(Operation::Mul),
            '/' | '÷' => Some(Operation::Div),
            _ => None,
        }
    }

    /// Character written into the expression text.
    pub fn symbol(self) -> char {
        match self {
            Operation::Add => '+',
            Operation::Sub => '-',
            Operation::Mul => '*',
            Operation::Div => '/',
        }
    }

    /// Multiplication and division collapse before addition and subtraction.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operation::Mul | Operation::Div)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
