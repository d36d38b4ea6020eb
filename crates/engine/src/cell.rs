use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw scalar stored in a worksheet cell, before any decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub enum RawCell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl RawCell {
    pub fn text(s: impl Into<String>) -> Self {
        RawCell::Text(s.into())
    }

    /// True for `Empty` and for zero-length text.
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The cell as the user would read it in the grid.
    ///
    /// Integral floats print without a fractional part ("10", not "10.0"),
    /// so a number cell and a text cell holding the same digits compare equal here.
    pub fn string_form(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.clone(),
            RawCell::Number(n) => format_number(*n),
            RawCell::Bool(b) => b.to_string(),
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_form())
    }
}

impl From<&str> for RawCell {
    fn from(s: &str) -> Self {
        RawCell::Text(s.to_string())
    }
}

impl From<String> for RawCell {
    fn from(s: String) -> Self {
        RawCell::Text(s)
    }
}

impl From<f64> for RawCell {
    fn from(n: f64) -> Self {
        RawCell::Number(n)
    }
}

impl From<bool> for RawCell {
    fn from(b: bool) -> Self {
        RawCell::Bool(b)
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One cell of a worksheet grid: a value plus the only style we carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cell {
    pub value: RawCell,
    #[serde(default)]
    pub bold: bool,
}

impl Cell {
    pub fn new(value: impl Into<RawCell>) -> Self {
        Self { value: value.into(), bold: false }
    }

    pub fn bold(value: impl Into<RawCell>) -> Self {
        Self { value: value.into(), bold: true }
    }

    pub fn blank() -> Self {
        Self::default()
    }
}
