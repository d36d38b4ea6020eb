//! `stdsheet-engine`: canonical document model and the spreadsheet mapping.
//!
//! Pure crate: no file I/O. Works on `serde_json` values and in-memory
//! worksheet grids; `stdsheet-io` turns grids into xlsx bytes and back.

pub mod cell;
pub mod coerce;
pub mod document;
pub mod error;
pub mod extract;
pub mod layout;
pub mod merge;
pub mod sheet;
pub mod sort;

pub use cell::{Cell, RawCell};
pub use coerce::coerce;
pub use document::{CanonicalDocument, Category, Document, Record, TableCategory};
pub use error::{ConvertError, Result};
pub use extract::{extract_workbook, ExtractOptions, MissingTablePolicy};
pub use layout::{layout, LayoutOptions};
pub use sheet::Worksheet;
pub use sort::sort_keys_recursive;
