// Per-sheet extraction snapshots (debugging aid)
//
// Each extracted worksheet is dumped key-sorted to `<dir>/<sheet>.json`
// before it is merged into the run's output document.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use stdsheet_engine::document::Document;
use stdsheet_engine::error::{ConvertError, Result};

use crate::json::write_json;

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File a sheet's snapshot is written to.
    pub fn path_for(&self, sheet_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(sheet_name)))
    }

    pub fn write(&self, sheet_name: &str, single: &Document) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| ConvertError::io(self.dir.display().to_string(), e))?;
        let path = self.path_for(sheet_name);
        write_json(&path, &Value::Object(single.clone()), true)?;
        log::debug!("snapshot written: {}", path.display());
        Ok(())
    }
}

/// Sheet name made safe for use as a file name.
fn file_stem(sheet_name: &str) -> String {
    let stem: String = sheet_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        stem
    }
}
