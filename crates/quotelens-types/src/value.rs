//! A single typed cell of a raw record.
//!
//! CSV cells arrive as text; [`Value::parse_cell`] types each one
//! independently so a single-row upload does not depend on column-wide
//! type inference.

use std::fmt;

/// One cell of tabular input.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The record's null marker (empty cell or a configured null token).
    Null,
    /// Integer-valued cell.
    Int(i64),
    /// Non-integer numeric cell.
    Float(f64),
    /// Anything that is not numeric, kept verbatim.
    Text(String),
}

impl Value {
    /// Type a raw CSV cell.
    ///
    /// Cells matching one of `null_tokens` exactly become [`Value::Null`].
    /// Surrounding whitespace is not trimmed: a lone space is a real
    /// category value in some fields.
    pub fn parse_cell(raw: &str, null_tokens: &[String]) -> Self {
        if null_tokens.iter().any(|t| t == raw) {
            return Self::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>()
            && f.is_finite()
        {
            return Self::Float(f);
        }
        Self::Text(raw.to_string())
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Null | Self::Text(_) => None,
        }
    }

    /// Text view of the cell, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if the cell is numerically equal to `sentinel`.
    pub fn is_sentinel(&self, sentinel: i64) -> bool {
        self.as_f64() == Some(sentinel as f64)
    }

    /// Equality with numeric coercion between `Int` and `Float`.
    ///
    /// Nulls never compare equal, not even to each other.
    pub fn loosely_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, _) | (_, Self::Null) => false,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }

    /// Key used for exact-match lookups in learned tables and encoder
    /// vocabularies.
    ///
    /// Integral floats render as integers so `5.0` and `5` hit the same
    /// entry.
    pub fn lookup_key(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (*f as i64).to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("<null>"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}
