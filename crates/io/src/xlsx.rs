// Excel workbook export (xlsx only) and import (xlsx, xls, xlsb, ods)
//
// Both directions go through the engine's `Worksheet` grid. Export honors the
// bold flag; import reads values only (calamine does not surface fonts).

use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet as XlsxWorksheet};
use stdsheet_engine::cell::{Cell, RawCell};
use stdsheet_engine::error::{ConvertError, Result};
use stdsheet_engine::sheet::Worksheet;

/// Result of an xlsx export
#[derive(Debug, Default)]
pub struct ExportResult {
    pub sheets_exported: usize,
    /// Non-blank cells written
    pub cells_exported: usize,
    pub export_duration_ms: u128,
}

impl ExportResult {
    /// Returns a summary message suitable for display
    pub fn summary(&self) -> String {
        format!(
            "{} sheet{}, {} cells",
            self.sheets_exported,
            if self.sheets_exported == 1 { "" } else { "s" },
            self.cells_exported
        )
    }
}

/// Render worksheets to xlsx bytes, in the given order.
pub fn export(sheets: &[Worksheet]) -> Result<(Vec<u8>, ExportResult)> {
    let start_time = Instant::now();
    let mut result = ExportResult::default();
    let mut xlsx_workbook = XlsxWorkbook::new();
    let bold = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = xlsx_workbook
            .add_worksheet()
            .set_name(&sheet.name)
            .map_err(|e| ConvertError::workbook(format!("invalid sheet name '{}': {}", sheet.name, e)))?;

        result.cells_exported += export_sheet_cells(sheet, worksheet, &bold)?;
        result.sheets_exported += 1;
    }

    let bytes = xlsx_workbook
        .save_to_buffer()
        .map_err(|e| ConvertError::workbook(format!("failed to build XLSX: {}", e)))?;

    result.export_duration_ms = start_time.elapsed().as_millis();
    log::debug!("[XLSX export] {} in {}ms", result.summary(), result.export_duration_ms);
    Ok((bytes, result))
}

/// Render worksheets and write them to `path`.
///
/// The file is only created once the whole workbook has been rendered.
pub fn save(sheets: &[Worksheet], path: &Path) -> Result<ExportResult> {
    let (bytes, result) = export(sheets)?;
    std::fs::write(path, bytes).map_err(|e| ConvertError::io(path.display().to_string(), e))?;
    Ok(result)
}

fn export_sheet_cells(sheet: &Worksheet, worksheet: &mut XlsxWorksheet, bold: &Format) -> Result<usize> {
    let mut cells_exported = 0;

    for (row, cells) in sheet.rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if cell.value.is_empty() {
                continue;
            }
            let row32 = u32::try_from(row)
                .map_err(|_| ConvertError::workbook(format!("sheet '{}': row {} out of range", sheet.name, row)))?;
            let col16 = u16::try_from(col)
                .map_err(|_| ConvertError::workbook(format!("sheet '{}': column {} out of range", sheet.name, col)))?;

            write_cell(worksheet, row32, col16, cell, bold).map_err(|e| {
                ConvertError::workbook(format!(
                    "sheet '{}': failed to write cell ({}, {}): {}",
                    sheet.name, row, col, e
                ))
            })?;
            cells_exported += 1;
        }
    }

    Ok(cells_exported)
}

fn write_cell(
    worksheet: &mut XlsxWorksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    bold: &Format,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    match (&cell.value, cell.bold) {
        (RawCell::Empty, _) => {}
        (RawCell::Text(s), true) => {
            worksheet.write_string_with_format(row, col, s, bold)?;
        }
        (RawCell::Text(s), false) => {
            worksheet.write_string(row, col, s)?;
        }
        (RawCell::Number(n), true) => {
            worksheet.write_number_with_format(row, col, *n, bold)?;
        }
        (RawCell::Number(n), false) => {
            worksheet.write_number(row, col, *n)?;
        }
        (RawCell::Bool(b), true) => {
            worksheet.write_boolean_with_format(row, col, *b, bold)?;
        }
        (RawCell::Bool(b), false) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(())
}

/// Import every worksheet from in-memory workbook bytes.
pub fn import_bytes(bytes: &[u8]) -> Result<Vec<Worksheet>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ConvertError::workbook(format!("failed to open workbook: {}", e)))?;
    import_sheets(&mut workbook)
}

/// Import every worksheet from a workbook file (xlsx, xls, xlsb, ods).
pub fn import(path: &Path) -> Result<Vec<Worksheet>> {
    if !path.exists() {
        return Err(ConvertError::io(path.display().to_string(), "file not found"));
    }
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ConvertError::workbook(format!("failed to open {}: {}", path.display(), e)))?;
    import_sheets(&mut workbook)
}

fn import_sheets<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> Result<Vec<Worksheet>> {
    let start_time = Instant::now();
    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| ConvertError::workbook(format!("failed to read sheet '{}': {}", sheet_name, e)))?;

        let mut sheet = Worksheet::new(sheet_name.clone());

        // Range start offset (data may not begin at A1)
        let (data_start_row, data_start_col) = range.start().unwrap_or((0, 0));

        for (row_idx, row) in range.rows().enumerate() {
            let target_row = data_start_row as usize + row_idx;
            for (col_idx, data) in row.iter().enumerate() {
                let value = data_to_raw(data);
                if value.is_empty() {
                    continue;
                }
                sheet.set(target_row, data_start_col as usize + col_idx, Cell::new(value));
            }
        }
        sheet.trim_trailing_empty();
        sheets.push(sheet);
    }

    log::debug!(
        "[XLSX import] {} sheets in {}ms",
        sheets.len(),
        start_time.elapsed().as_millis()
    );
    Ok(sheets)
}

fn data_to_raw(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Float(n) => RawCell::Number(*n),
        Data::Int(n) => RawCell::Number(*n as f64),
        Data::Bool(b) => RawCell::Bool(*b),
        // Date serials stay numeric; the canonical model has no date type
        Data::DateTime(dt) => RawCell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Error(e) => RawCell::Text(format!("#{:?}", e)),
    }
}
