// crates/geotags-core/src/parser/number.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// How numbers are written in coordinate text.
///
/// Group separators are stripped, the decimal separator is normalized to
/// `.`, and the Unicode minus sign is read as `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub group_separator: Option<char>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            group_separator: Some(','),
        }
    }
}

impl NumberFormat {
    /// Parses a localized number. Returns `None` for anything that is not a
    /// finite number.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut normalized = String::with_capacity(text.len());
        for ch in text.chars() {
            match ch {
                '\u{2212}' => normalized.push('-'),
                c if Some(c) == self.group_separator => {}
                c if c == self.decimal_separator => normalized.push('.'),
                c => normalized.push(c),
            }
        }
        let starts_numeric = normalized
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
        if !starts_numeric {
            return None;
        }
        normalized.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// One positional part of a coordinate: a number, or text that is either a
/// localized number or a directional suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Token {
    Number(f64),
    Text(String),
}

impl Token {
    pub fn number(&self, format: &NumberFormat) -> Option<f64> {
        match self {
            Token::Number(v) if v.is_finite() => Some(*v),
            Token::Number(_) => None,
            Token::Text(s) => format.parse(s),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Token::Text(s) => Some(s.trim()),
            Token::Number(_) => None,
        }
    }
}

impl From<f64> for Token {
    fn from(v: f64) -> Self {
        Token::Number(v)
    }
}

impl From<i32> for Token {
    fn from(v: i32) -> Self {
        Token::Number(f64::from(v))
    }
}

impl From<&str> for Token {
    fn from(v: &str) -> Self {
        Token::Text(v.to_string())
    }
}

impl From<String> for Token {
    fn from(v: String) -> Self {
        Token::Text(v)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(v) => write!(f, "{v}"),
            Token::Text(s) => f.write_str(s),
        }
    }
}

/// Builds a token list from mixed literals: `tokens![10, "N", 20.5, "E"]`.
#[macro_export]
macro_rules! tokens {
    ($($t:expr),* $(,)?) => {
        vec![$($crate::parser::Token::from($t)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_grouped_numbers() {
        let f = NumberFormat::default();
        assert_eq!(f.parse("12.5"), Some(12.5));
        assert_eq!(f.parse(" 1,000.25 "), Some(1000.25));
        assert_eq!(f.parse("\u{2212}3"), Some(-3.0));
        assert_eq!(f.parse("N"), None);
        assert_eq!(f.parse("inf"), None);
        assert_eq!(f.parse("NaN"), None);
        assert_eq!(f.parse(""), None);
    }

    #[test]
    fn parses_comma_decimal_locales() {
        let f = NumberFormat {
            decimal_separator: ',',
            group_separator: Some('.'),
        };
        assert_eq!(f.parse("12,5"), Some(12.5));
        assert_eq!(f.parse("1.000,5"), Some(1000.5));
    }

    #[test]
    fn token_numbers() {
        let f = NumberFormat::default();
        assert_eq!(Token::from(10).number(&f), Some(10.0));
        assert_eq!(Token::from("10.5").number(&f), Some(10.5));
        assert_eq!(Token::from("S").number(&f), None);
        assert_eq!(Token::Number(f64::NAN).number(&f), None);
    }

    #[test]
    fn tokens_macro_mixes_types() {
        let t = crate::tokens![10, "N", 20.5, "E"];
        assert_eq!(t.len(), 4);
        assert_eq!(t[2], Token::Number(20.5));
        assert_eq!(t[3].as_text(), Some("E"));
    }
}
