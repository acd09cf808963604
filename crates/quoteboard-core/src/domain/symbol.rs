use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_CHARS: usize = 15;

/// Ticker as typed by the user, trimmed and ASCII-uppercased.
///
/// Only ASCII letters, digits, `.` and `-` survive, so the value is safe to
/// place in an upstream query string or an HTML page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let ticker = input.trim().to_ascii_uppercase();

        let mut count = 0;
        for (index, ch) in ticker.chars().enumerate() {
            if index == 0 && !ch.is_ascii_alphabetic() {
                return Err(ValidationError::SymbolInvalidStart { ch });
            }
            if !is_ticker_char(ch) {
                return Err(ValidationError::SymbolInvalidChar { ch, index });
            }
            count += 1;
        }

        match count {
            0 => Err(ValidationError::EmptySymbol),
            len if len > MAX_TICKER_CHARS => Err(ValidationError::SymbolTooLong {
                len,
                max: MAX_TICKER_CHARS,
            }),
            _ => Ok(Self(ticker)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_ticker_char(ch: char) -> bool {
    matches!(ch, 'A'..='Z' | '0'..='9' | '.' | '-')
}

impl FromStr for Symbol {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
