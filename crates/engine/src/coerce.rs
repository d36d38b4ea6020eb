// Cell value decoding
//
// A cell's text is tried as JSON first, so "10" becomes a number, "[1,2]" a list
// and "{\"a\":1}" a mapping. Anything else stays as the raw scalar.

use serde_json::{Number, Value};

use crate::cell::{Cell, RawCell};

/// Decode one cell into a typed value. Never fails.
pub fn coerce(cell: &RawCell) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(&cell.string_form()) {
        return v;
    }

    match cell {
        RawCell::Empty => Value::Null,
        RawCell::Text(s) if s == "true" => Value::Bool(true),
        RawCell::Text(s) if s == "false" => Value::Bool(false),
        RawCell::Text(s) => Value::String(s.clone()),
        RawCell::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        RawCell::Bool(b) => Value::Bool(*b),
    }
}

/// `coerce` for an optional cell; a missing cell decodes like an empty one.
pub fn coerce_cell(cell: Option<&Cell>) -> Value {
    cell.map(|c| coerce(&c.value)).unwrap_or(Value::Null)
}
