//! Scalar cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single table cell.
///
/// `Number(NaN)` is treated as missing everywhere; the `From<f64>` conversion
/// never produces it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value (serialized as `null`).
    #[default]
    Missing,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    Text(String),
}

impl Value {
    /// Check whether the cell is missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Booleans read as 1/0.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Text view of the cell, only for text cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the cell as a label (column name or factor level).
    ///
    /// Returns `None` for missing cells.
    pub fn label(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(self.to_string())
    }

    /// Hashable identity of the cell, used for grouping.
    pub fn key(&self) -> ValueKey {
        if self.is_missing() {
            return ValueKey::Missing;
        }
        match self {
            Value::Number(n) => {
                // -0.0 and 0.0 group together.
                let n = if *n == 0.0 { 0.0 } else { *n };
                ValueKey::Number(n.to_bits())
            }
            Value::Bool(b) => ValueKey::Bool(*b),
            Value::Text(s) => ValueKey::Text(s.clone()),
            Value::Missing => ValueKey::Missing,
        }
    }

    /// Parse a raw text field as a number, accepting surrounding whitespace.
    pub fn parse_number(raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) if n.is_nan() => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Hashable identity of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Missing,
    Bool(bool),
    Number(u64),
    Text(String),
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        if n.is_nan() {
            Value::Missing
        } else {
            Value::Number(n)
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}
