// Table extraction: worksheet grid -> table category
//
// Rows are classified top to bottom by their first (marker) cell:
//
//   ScanningPreamble --sentinel row--> AwaitingHeader --any row--> ReadingData
//
// ReadingData is terminal. A worksheet holds at most one table region, so a
// second sentinel row inside the data region is read as an ordinary record.

use serde_json::{Map, Value};

use crate::cell::Cell;
use crate::coerce::coerce_cell;
use crate::document::{Document, Record, TableCategory};
use crate::error::{ConvertError, Result};
use crate::layout::{DEFAULT_CONSTANTS_SHEET, DEFAULT_FORMULAS_SHEET, DEFAULT_SENTINEL};
use crate::merge::shallow_merge;
use crate::sheet::Worksheet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractState {
    ScanningPreamble,
    AwaitingHeader,
    ReadingData,
}

/// What to do with a worksheet whose preamble never reaches the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingTablePolicy {
    /// Keep it as a category with scalar fields and `table: []`.
    #[default]
    Allow,
    /// Fail the whole run with `ConvertError::MissingTable`.
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub sentinel: String,
    /// Worksheets that are write-only outputs and never read back.
    pub skip_sheets: Vec<String>,
    pub missing_table: MissingTablePolicy,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            skip_sheets: vec![DEFAULT_CONSTANTS_SHEET.to_string(), DEFAULT_FORMULAS_SHEET.to_string()],
            missing_table: MissingTablePolicy::Allow,
        }
    }
}

/// Row-at-a-time extractor for one worksheet.
#[derive(Debug)]
pub struct TableExtractor<'a> {
    sentinel: &'a str,
    state: ExtractState,
    fields: Map<String, Value>,
    header: Vec<String>,
    table: Vec<Record>,
}

impl<'a> TableExtractor<'a> {
    pub fn new(sentinel: &'a str) -> Self {
        Self {
            sentinel,
            state: ExtractState::ScanningPreamble,
            fields: Map::new(),
            header: Vec::new(),
            table: Vec::new(),
        }
    }

    pub fn state(&self) -> ExtractState {
        self.state
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn push_row(&mut self, row: &[Cell]) {
        let row = occupied(row);
        match self.state {
            ExtractState::ScanningPreamble => {
                let Some(marker) = row.first().filter(|c| !c.value.is_empty()) else {
                    return;
                };
                let key = marker.value.string_form();
                if key == self.sentinel {
                    self.state = ExtractState::AwaitingHeader;
                } else {
                    self.fields.insert(key, coerce_cell(row.get(1)));
                }
            }
            ExtractState::AwaitingHeader => {
                self.header = row.iter().map(|c| c.value.string_form()).collect();
                self.state = ExtractState::ReadingData;
            }
            ExtractState::ReadingData => {
                // Every header key is present; cells past the header are dropped
                let record: Record = self
                    .header
                    .iter()
                    .enumerate()
                    .map(|(col, key)| (key.clone(), coerce_cell(row.get(col))))
                    .collect();
                self.table.push(record);
            }
        }
    }

    /// The category built so far and the state extraction ended in.
    pub fn finish(self) -> (TableCategory, ExtractState) {
        (TableCategory { fields: self.fields, table: self.table }, self.state)
    }
}

/// Cells up to and including the last non-empty one.
fn occupied(row: &[Cell]) -> &[Cell] {
    let end = row.iter().rposition(|c| !c.value.is_empty()).map_or(0, |i| i + 1);
    &row[..end]
}

/// Extract one worksheet into a table category.
pub fn extract_sheet(sheet: &Worksheet, options: &ExtractOptions) -> Result<TableCategory> {
    let mut extractor = TableExtractor::new(&options.sentinel);
    for row in &sheet.rows {
        extractor.push_row(row);
    }

    let (category, state) = extractor.finish();
    if state == ExtractState::ScanningPreamble {
        match options.missing_table {
            MissingTablePolicy::Allow => {
                log::warn!("sheet '{}': no '{}' row, table is empty", sheet.name, options.sentinel);
            }
            MissingTablePolicy::Error => {
                return Err(ConvertError::MissingTable { sheet: sheet.name.clone() });
            }
        }
    }

    log::debug!(
        "sheet '{}': {} fields, {} table rows",
        sheet.name,
        category.fields.len(),
        category.table.len()
    );
    Ok(category)
}

/// Extract every readable worksheet into a document keyed by worksheet name.
pub fn extract_workbook(sheets: &[Worksheet], options: &ExtractOptions) -> Result<Document> {
    extract_workbook_with(sheets, options, |_, _| Ok(()))
}

/// `extract_workbook`, calling `on_sheet` with each sheet's single-sheet
/// result before it is merged. Sheets sharing a name replace earlier ones.
pub fn extract_workbook_with<F>(
    sheets: &[Worksheet],
    options: &ExtractOptions,
    mut on_sheet: F,
) -> Result<Document>
where
    F: FnMut(&str, &Document) -> Result<()>,
{
    let mut doc = Document::new();
    for sheet in sheets {
        if options.skip_sheets.iter().any(|s| *s == sheet.name) {
            log::debug!("skipping write-only sheet '{}'", sheet.name);
            continue;
        }

        let category = extract_sheet(sheet, options)?;
        let mut single = Document::new();
        single.insert(sheet.name.clone(), category.to_value());
        on_sheet(&sheet.name, &single)?;

        if doc.contains_key(&sheet.name) {
            log::warn!("sheet '{}' appears more than once, keeping the later one", sheet.name);
        }
        shallow_merge(&mut doc, single);
    }
    Ok(doc)
}
