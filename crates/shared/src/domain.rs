use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub $inner);
    };
}

id_newtype!(ConnectionId, u64);
id_newtype!(SessionId, Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Last-known value of a widget as stored in page state.
///
/// Variant order matters for the untagged decoding: JSON `3` must land in
/// `Integer` before `Float` gets a chance at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidgetValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl WidgetValue {
    /// Textual form used by text-like widgets and by numeric coercion.
    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => format_float(*value),
            Self::Text(value) => value.clone(),
            Self::List(values) => values.join(","),
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Integer(value) => *value != 0,
            Self::Float(value) => *value != 0.0,
            Self::Text(value) => matches!(value.trim(), "true" | "on" | "1"),
            Self::List(values) => !values.is_empty(),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Bool(value) => f64::from(u8::from(*value)),
            Self::Integer(value) => *value as f64,
            Self::Float(value) => *value,
            Self::Text(value) => leading_float(value),
            Self::List(values) => values.first().map(|v| leading_float(v)).unwrap_or(0.0),
        }
    }

    /// Selections arrive either as a JSON array or as a comma-joined string.
    pub fn as_list(&self) -> Vec<String> {
        match self {
            Self::List(values) => values.clone(),
            Self::Text(value) if value.is_empty() => Vec::new(),
            Self::Text(value) => value.split(',').map(str::to_string).collect(),
            other => vec![other.as_text()],
        }
    }
}

impl From<bool> for WidgetValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for WidgetValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for WidgetValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for WidgetValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for WidgetValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for WidgetValue {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// Result of a free-text numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Content-directed coercion: a decimal point makes it a float, anything
    /// else is read as an integer. Only the leading numeric prefix counts and
    /// text without one reads as zero.
    pub fn from_text(text: &str) -> Self {
        if text.contains('.') {
            Self::Float(leading_float(text))
        } else {
            Self::Integer(leading_integer(text))
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(value) => value as f64,
            Self::Float(value) => value,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

impl From<Number> for WidgetValue {
    fn from(value: Number) -> Self {
        match value {
            Number::Integer(value) => Self::Integer(value),
            Number::Float(value) => Self::Float(value),
        }
    }
}

/// Keeps the decimal point on whole floats so `3.0` does not turn back into
/// an integer the next time it is coerced.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn sign_len(bytes: &[u8]) -> usize {
    usize::from(matches!(bytes.first(), Some(b'+' | b'-')))
}

fn digits_from(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count()
}

fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let sign = sign_len(bytes);
    let digits = digits_from(bytes, sign);
    if digits == 0 {
        return 0;
    }
    let prefix = &trimmed[..sign + digits];
    prefix.parse().unwrap_or(if prefix.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = sign_len(bytes);
    let whole = digits_from(bytes, end);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(bytes, end + 1);
        if fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole == 0 && fraction == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exp_sign = sign_len(&bytes[end + 1..]);
        let exp_digits = digits_from(bytes, end + 1 + exp_sign);
        if exp_digits > 0 {
            end += 1 + exp_sign + exp_digits;
        }
    }

    trimmed[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
