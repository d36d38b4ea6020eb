// Conversion runs: document <-> workbook bytes, and the file-level drivers
//
// Nothing is written to disk until a conversion has fully succeeded, so a
// schema or decode failure leaves no partial output behind.

use std::path::{Path, PathBuf};

use serde_json::Value;
use stdsheet_engine::document::{CanonicalDocument, Document};
use stdsheet_engine::error::Result;
use stdsheet_engine::extract::{extract_workbook_with, ExtractOptions};
use stdsheet_engine::layout::{layout, LayoutOptions};
use stdsheet_engine::sheet::Worksheet;
use stdsheet_engine::sort::sort_map;

use crate::json;
use crate::snapshot::SnapshotWriter;
use crate::xlsx::{self, ExportResult};

/// Options for the workbook -> document direction.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub extract: ExtractOptions,
    /// Key-sort the output document at every depth.
    pub sort_keys: bool,
    /// Write each extracted sheet to `<dir>/<sheet>.json` before merging.
    pub snapshot_dir: Option<PathBuf>,
}

/// Render a canonical document as xlsx bytes with default layout.
pub fn to_workbook(document: &Value) -> Result<Vec<u8>> {
    to_workbook_with(document, &LayoutOptions::default()).map(|(bytes, _)| bytes)
}

pub fn to_workbook_with(document: &Value, options: &LayoutOptions) -> Result<(Vec<u8>, ExportResult)> {
    let canonical = CanonicalDocument::from_value(document)?;
    let sheets = layout(canonical, options)?;
    xlsx::export(&sheets)
}

/// Parse xlsx bytes back into a document keyed by worksheet name.
pub fn from_workbook(bytes: &[u8]) -> Result<Document> {
    from_workbook_with(bytes, &ReadOptions::default())
}

pub fn from_workbook_with(bytes: &[u8], options: &ReadOptions) -> Result<Document> {
    let sheets = xlsx::import_bytes(bytes)?;
    extract_sheets(&sheets, options)
}

/// Load JSON fragments and write them as one workbook at `output`.
pub fn write_workbook_file<P: AsRef<Path>>(
    fragments: &[P],
    output: &Path,
    options: &LayoutOptions,
) -> Result<ExportResult> {
    let doc = json::load(fragments)?;
    let canonical = CanonicalDocument::from_value(&Value::Object(doc))?;
    let result = xlsx::save(&layout(canonical, options)?, output)?;
    log::info!("wrote {} ({})", output.display(), result.summary());
    Ok(result)
}

/// Read a workbook file (xlsx, xls, xlsb, ods) into a document.
pub fn read_workbook_file(path: &Path, options: &ReadOptions) -> Result<Document> {
    let sheets = xlsx::import(path)?;
    let doc = extract_sheets(&sheets, options)?;
    log::info!("read {} ({} categories)", path.display(), doc.len());
    Ok(doc)
}

fn extract_sheets(sheets: &[Worksheet], options: &ReadOptions) -> Result<Document> {
    let snapshots = options.snapshot_dir.as_ref().map(SnapshotWriter::new);

    let doc = extract_workbook_with(sheets, &options.extract, |name, single| match &snapshots {
        Some(writer) => writer.write(name, single),
        None => Ok(()),
    })?;

    Ok(if options.sort_keys { sort_map(&doc, true) } else { doc })
}
