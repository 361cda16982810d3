//! Spreadsheet cell values.
//!
//! # Invariants
//! - `Cell::Empty` is the only representation of a missing value; loaders
//!   never produce `Number(NaN)`.
//! - Integral numbers render without a fraction (`5.0` -> `"5"`).

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::fmt::{Display, Formatter};

/// One cell as seen by the parser, independent of the source format.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Builds a cell from a float, mapping non-finite values to `Empty`.
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Empty
        }
    }

    /// Returns whether this cell holds no usable value.
    ///
    /// Text made only of whitespace counts as blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// Returns whether the cell is physically empty (no value at all).
    ///
    /// Unlike [`Cell::is_blank`], an empty string is *not* empty: some
    /// parameters treat an explicit `""` differently from a missing cell.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns the cell rendered as text, or `None` for `Empty`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Empty => None,
            Self::Text(text) => Some(text.clone()),
            Self::Number(value) => Some(format_number(*value)),
            Self::Bool(value) => Some(if *value { "TRUE" } else { "FALSE" }.to_string()),
        }
    }

    /// Returns trimmed text for non-blank cells.
    pub fn as_trimmed_text(&self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        self.as_text().map(|text| text.trim().to_string())
    }

    /// Returns the numeric value of the cell.
    ///
    /// Text is parsed leniently (surrounding whitespace ignored). Returns
    /// `None` for blank cells and for text that is not a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Empty | Self::Bool(_) => None,
        }
    }

    /// Converts the cell to a JSON value with the same rules as `Serialize`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(value) if is_integral(*value) => Value::from(*value as i64),
            Self::Number(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Bool(value) => Value::Bool(*value),
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{text}"),
            None => Ok(()),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_none(),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(value) if is_integral(*value) => serializer.serialize_i64(*value as i64),
            Self::Number(value) => serializer.serialize_f64(*value),
            Self::Bool(value) => serializer.serialize_bool(*value),
        }
    }
}

/// Formats a number the way a spreadsheet user typed it.
pub fn format_number(value: f64) -> String {
    if is_integral(value) {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn is_integral(value: f64) -> bool {
    value.fract() == 0.0 && value.abs() < 1e15
}
