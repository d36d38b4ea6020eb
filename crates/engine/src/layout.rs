// Workbook layout: canonical document -> worksheet grids
//
// Flat list sheet:            Table sheet:
//   row 0  **k1** **k2** ..     **name**  Office
//   row 1   v     v             **units** W/ft2
//   ..                          (blank)
//                               **Table**
//                               **type**  **area**
//                               A         10
//
// The sentinel row carries the literal sentinel text so the extractor finds
// the table region again on read.

use serde_json::Value;

use crate::cell::{Cell, RawCell};
use crate::document::{CanonicalDocument, Category, Record, TableCategory, CONSTANTS_KEY, TABLES_KEY, TABLE_KEY};
use crate::error::{ConvertError, Result};
use crate::sheet::{Row, Worksheet};

pub const DEFAULT_SENTINEL: &str = "Table";
pub const DEFAULT_CONSTANTS_SHEET: &str = "values";
pub const DEFAULT_FORMULAS_SHEET: &str = "formulas";

/// Integers at or beyond this magnitude lose precision in an Excel number cell.
const EXCEL_SAFE_INTEGER_LIMIT: f64 = 1e15;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Marker-cell text that opens a table region.
    pub sentinel: String,
    pub constants_sheet: String,
    pub formulas_sheet: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            sentinel: DEFAULT_SENTINEL.to_string(),
            constants_sheet: DEFAULT_CONSTANTS_SHEET.to_string(),
            formulas_sheet: DEFAULT_FORMULAS_SHEET.to_string(),
        }
    }
}

/// Union of all record keys in first-seen order, scanning records top to
/// bottom and each record's keys left to right.
pub fn collect_headers<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut headers: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

/// Encode a JSON value as a raw cell.
///
/// Lists and mappings become their compact JSON text, which the coercer
/// parses back into the same structure.
pub fn value_to_cell(value: &Value) -> RawCell {
    match value {
        Value::Null => RawCell::Empty,
        Value::Bool(b) => RawCell::Bool(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.trunc().abs() < EXCEL_SAFE_INTEGER_LIMIT => RawCell::Number(f),
            _ => RawCell::Text(n.to_string()),
        },
        // A blank cell reads back as null; the quoted form reads back as ""
        Value::String(s) if s.is_empty() => RawCell::text("\"\""),
        Value::String(s) => RawCell::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => RawCell::Text(value.to_string()),
    }
}

/// Lay out every worksheet of the document, in workbook order:
/// constants, formulas, then one sheet per table category.
///
/// Fails with a schema error when a table could not be read back as written.
pub fn layout(doc: CanonicalDocument, options: &LayoutOptions) -> Result<Vec<Worksheet>> {
    for (index, table) in doc.tables.iter().enumerate() {
        check_table_keys(table, index, &options.sentinel)?;
    }

    let sheets: Vec<Worksheet> = doc
        .into_categories()
        .into_iter()
        .map(|(key, category)| match category {
            Category::FlatList(records) => {
                let name = if key == CONSTANTS_KEY { &options.constants_sheet } else { &options.formulas_sheet };
                flat_list_sheet(name, &records)
            }
            Category::Table(table) => table_sheet(&table, &options.sentinel),
        })
        .collect();
    log::debug!("laid out {} worksheets", sheets.len());
    Ok(sheets)
}

/// Reject keys the extractor cannot recover.
///
/// A field row's key sits in the marker column, so an empty key is skipped
/// on read and a key equal to the sentinel opens the table region early.
/// An empty column name is trimmed from the end of the header row.
pub fn check_table_keys(table: &TableCategory, index: usize, sentinel: &str) -> Result<()> {
    for key in table.fields.keys() {
        if key.is_empty() {
            return Err(ConvertError::schema(format!("`{TABLES_KEY}[{index}]` has a field with an empty name")));
        }
        if key == sentinel {
            return Err(ConvertError::schema(format!(
                "`{TABLES_KEY}[{index}].{key}` clashes with the table sentinel '{sentinel}'"
            )));
        }
    }

    for (row, record) in table.table.iter().enumerate() {
        if record.keys().any(|k| k.is_empty()) {
            return Err(ConvertError::schema(format!(
                "`{TABLES_KEY}[{index}].{TABLE_KEY}[{row}]` has a column with an empty name"
            )));
        }
    }
    Ok(())
}

/// Header row followed by one aligned row per record.
pub fn flat_list_sheet(name: &str, records: &[Record]) -> Worksheet {
    let mut sheet = Worksheet::new(name);
    let headers = collect_headers(records);
    sheet.push_row(header_row(&headers));
    for record in records {
        sheet.push_row(record_row(&headers, record));
    }
    sheet
}

/// Scalar fields, a blank row, the sentinel row, then the table body.
///
/// Callers guarantee `table.name()` is set (validated by `CanonicalDocument`).
pub fn table_sheet(table: &TableCategory, sentinel: &str) -> Worksheet {
    let mut sheet = Worksheet::new(table.name().unwrap_or_default());

    for (key, value) in &table.fields {
        sheet.push_row(vec![Cell::bold(key.as_str()), Cell::new(value_to_cell(value))]);
    }

    sheet.push_row(Vec::new());
    sheet.push_row(vec![Cell::bold(sentinel)]);

    let headers = collect_headers(&table.table);
    sheet.push_row(header_row(&headers));
    for record in &table.table {
        sheet.push_row(record_row(&headers, record));
    }
    sheet
}

fn header_row(headers: &[String]) -> Row {
    headers.iter().map(|h| Cell::bold(h.as_str())).collect()
}

fn record_row(headers: &[String], record: &Record) -> Row {
    headers
        .iter()
        .map(|h| match record.get(h) {
            Some(v) => Cell::new(value_to_cell(v)),
            None => Cell::blank(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().unwrap().clone()
    }

    fn texts(row: &Row) -> Vec<String> {
        row.iter().map(|c| c.value.string_form()).collect()
    }

    #[test]
    fn test_collect_headers_first_seen_dedup() {
        let records = vec![record(json!({"a": 1, "b": 2})), record(json!({"b": 3, "c": 4}))];
        assert_eq!(collect_headers(&records), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collect_headers_empty() {
        let records: Vec<Record> = Vec::new();
        assert!(collect_headers(&records).is_empty());
    }

    #[test]
    fn test_flat_list_sheet_alignment() {
        let records = vec![
            record(json!({"name": "infil", "value": 0.5})),
            record(json!({"units": "cfm", "name": "oa"})),
        ];
        let sheet = flat_list_sheet("values", &records);
        assert_eq!(sheet.name, "values");
        assert_eq!(texts(&sheet.rows[0]), vec!["name", "value", "units"]);
        assert!(sheet.rows[0].iter().all(|c| c.bold));
        assert_eq!(sheet.rows[1][1].value, RawCell::Number(0.5));
        assert_eq!(sheet.rows[1][2].value, RawCell::Empty);
        assert_eq!(texts(&sheet.rows[2]), vec!["oa", "", "cfm"]);
        assert!(!sheet.rows[2][0].bold);
    }

    #[test]
    fn test_table_sheet_layout() {
        let table = TableCategory::from_value(
            &json!({
                "name": "Office",
                "units": "W/ft2",
                "table": [{"type": "A", "area": 10}, {"type": "B", "area": 20}]
            }),
            0,
        )
        .unwrap();
        let sheet = table_sheet(&table, DEFAULT_SENTINEL);

        assert_eq!(sheet.name, "Office");
        assert_eq!(texts(&sheet.rows[0]), vec!["name", "Office"]);
        assert!(sheet.rows[0][0].bold);
        assert!(!sheet.rows[0][1].bold);
        assert_eq!(texts(&sheet.rows[1]), vec!["units", "W/ft2"]);
        assert!(sheet.rows[2].is_empty());
        assert_eq!(texts(&sheet.rows[3]), vec!["Table"]);
        assert_eq!(texts(&sheet.rows[4]), vec!["type", "area"]);
        assert_eq!(sheet.rows[5][1].value, RawCell::Number(10.0));
        assert_eq!(sheet.row_count(), 7);
    }

    #[test]
    fn test_table_sheet_without_rows_still_has_sentinel() {
        let table = TableCategory::from_value(&json!({"name": "Empty"}), 0).unwrap();
        let sheet = table_sheet(&table, "Table");
        assert_eq!(texts(&sheet.rows[2]), vec!["Table"]);
        assert!(sheet.rows[3].is_empty());
    }

    #[test]
    fn test_layout_order_follows_tables_array() {
        let doc = CanonicalDocument::from_value(&json!({
            "constants": [],
            "formulas": [],
            "tables": [{"name": "Zeta"}, {"name": "Alpha"}]
        }))
        .unwrap();
        let names: Vec<String> = layout(doc, &LayoutOptions::default())
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["values", "formulas", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_value_to_cell() {
        assert_eq!(value_to_cell(&json!(null)), RawCell::Empty);
        assert_eq!(value_to_cell(&json!(true)), RawCell::Bool(true));
        assert_eq!(value_to_cell(&json!(42)), RawCell::Number(42.0));
        assert_eq!(value_to_cell(&json!("x")), RawCell::text("x"));
        assert_eq!(value_to_cell(&json!("")), RawCell::text("\"\""));
        assert_eq!(value_to_cell(&json!([1, 2])), RawCell::text("[1,2]"));
        assert_eq!(value_to_cell(&json!({"a": 1})), RawCell::text("{\"a\":1}"));
        // Beyond Excel's 15 significant digits: keep the exact digits as text
        assert_eq!(value_to_cell(&json!(1234567890123456789u64)), RawCell::text("1234567890123456789"));
    }

    #[test]
    fn test_layout_uses_configured_flat_list_names() {
        let doc = CanonicalDocument::from_value(&json!({
            "constants": [{"name": "c"}],
            "formulas": [],
            "tables": []
        }))
        .unwrap();
        let options = LayoutOptions {
            constants_sheet: "Constants".into(),
            formulas_sheet: "Formulas".into(),
            ..Default::default()
        };
        let sheets = layout(doc, &options).unwrap();
        assert_eq!(sheets[0].name, "Constants");
        assert_eq!(texts(&sheets[0].rows[1]), vec!["c"]);
        assert_eq!(sheets[1].name, "Formulas");
    }

    fn schema_error(doc: Value, sentinel: &str) -> String {
        let doc = CanonicalDocument::from_value(&doc).unwrap();
        let options = LayoutOptions { sentinel: sentinel.into(), ..Default::default() };
        match layout(doc, &options) {
            Err(ConvertError::Schema(msg)) => msg,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_field_named_like_sentinel_is_rejected() {
        let doc = json!({
            "constants": [],
            "formulas": [],
            "tables": [{"name": "T", "Table": "x", "units": "W", "table": [{"a": 1}]}]
        });
        let msg = schema_error(doc.clone(), "Table");
        assert!(msg.contains("`tables[0].Table`"), "{}", msg);
        // Only the configured sentinel matters
        let doc = CanonicalDocument::from_value(&doc).unwrap();
        assert!(layout(doc, &LayoutOptions { sentinel: "TABLE".into(), ..Default::default() }).is_ok());
    }

    #[test]
    fn test_empty_field_name_is_rejected() {
        let doc = json!({"constants": [], "formulas": [], "tables": [{"name": "T", "": 1}]});
        assert!(schema_error(doc, "Table").contains("empty name"));
    }

    #[test]
    fn test_empty_column_name_is_rejected() {
        let doc = json!({
            "constants": [],
            "formulas": [],
            "tables": [{"name": "T", "table": [{"a": 1}, {"a": 2, "": 3}]}]
        });
        assert!(schema_error(doc, "Table").contains("`tables[0].table[1]`"));
    }
}
