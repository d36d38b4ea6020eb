// Conversion settings
// Loaded from ~/.config/stdsheet/config.toml, or a file given with --config

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Missing-table policy as written in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTable {
    /// Sheet without a sentinel row becomes a category with an empty table
    #[default]
    Allow,
    /// Sheet without a sentinel row fails the run
    Error,
}

/// How documents are laid out when writing a workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookSettings {
    /// Marker-cell text that opens a table region
    pub sentinel: String,
    pub constants_sheet: String,
    pub formulas_sheet: String,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            sentinel: "Table".to_string(),
            constants_sheet: "values".to_string(),
            formulas_sheet: "formulas".to_string(),
        }
    }
}

/// How workbooks are read back
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadSettings {
    /// Sheets never read back. Unset = the constants and formulas sheets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_sheets: Option<Vec<String>>,
    pub missing_table: MissingTable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_keys: Option<bool>,
    /// Per-sheet snapshot directory (debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workbook: WorkbookSettings,
    pub read: ReadSettings,
}

impl Settings {
    /// Get the default settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stdsheet")
            .join("config.toml")
    }

    pub fn from_toml(contents: &str) -> Result<Self, String> {
        let settings: Settings = toml::from_str(contents).map_err(|e| format!("config parse error: {e}"))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Load an explicitly named config file. Missing or invalid files are errors.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        Self::from_toml(&contents).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Load settings from the default path, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.workbook.sentinel.is_empty() {
            return Err("workbook.sentinel must not be empty".to_string());
        }
        if self.workbook.constants_sheet == self.workbook.formulas_sheet {
            return Err(format!(
                "workbook.constants_sheet and workbook.formulas_sheet are both '{}'",
                self.workbook.constants_sheet
            ));
        }
        Ok(())
    }

    /// Sheets skipped on read: explicit list, else the two flat-list sheets
    pub fn effective_skip_sheets(&self) -> Vec<String> {
        match &self.read.skip_sheets {
            Some(sheets) => sheets.clone(),
            None => vec![self.workbook.constants_sheet.clone(), self.workbook.formulas_sheet.clone()],
        }
    }

    /// Output key-sorting (on unless turned off)
    pub fn effective_sort_keys(&self) -> bool {
        self.read.sort_keys.unwrap_or(true)
    }
}
