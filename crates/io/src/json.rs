// JSON fragment loading and document dumps

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use stdsheet_engine::document::Document;
use stdsheet_engine::error::{ConvertError, Result};
use stdsheet_engine::merge::shallow_merge;
use stdsheet_engine::sort::sort_keys_recursive;

/// Parse one fragment. A fragment must be a top-level JSON object.
pub fn parse_fragment(source_name: &str, text: &str) -> Result<Document> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConvertError::json(source_name, "top level must be an object")),
        Err(e) => Err(ConvertError::json(source_name, e)),
    }
}

pub fn read_fragment(path: &Path) -> Result<Document> {
    let text = fs::read_to_string(path).map_err(|e| ConvertError::io(path.display().to_string(), e))?;
    parse_fragment(&path.display().to_string(), &text)
}

/// Load fragments left to right into one document.
///
/// Top-level keys are merged shallowly: a later fragment's key replaces an
/// earlier one's wholesale.
pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Document> {
    let mut doc = Map::new();
    for path in paths {
        let path = path.as_ref();
        let fragment = read_fragment(path)?;
        log::debug!("loaded {} ({} keys)", path.display(), fragment.len());
        shallow_merge(&mut doc, fragment);
    }
    Ok(doc)
}

/// Pretty JSON text with a trailing newline, optionally key-sorted at every depth.
pub fn to_pretty_string(value: &Value, sort_keys: bool) -> Result<String> {
    let sorted;
    let value = if sort_keys {
        sorted = sort_keys_recursive(value, true);
        &sorted
    } else {
        value
    };
    let mut text = serde_json::to_string_pretty(value).map_err(|e| ConvertError::json("<output>", e))?;
    text.push('\n');
    Ok(text)
}

pub fn write_json(path: &Path, value: &Value, sort_keys: bool) -> Result<()> {
    let text = to_pretty_string(value, sort_keys)?;
    fs::write(path, text).map_err(|e| ConvertError::io(path.display().to_string(), e))
}
