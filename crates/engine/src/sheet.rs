use serde::{Deserialize, Serialize};

use crate::cell::{Cell, RawCell};

pub type Row = Vec<Cell>;

/// A named grid of cells, row-major, addressed by (row, col) from A1 = (0, 0).
///
/// Rows are ragged: a row only extends as far as its last written cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Worksheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), rows: Vec::new() }
    }

    /// Build a sheet from plain rows of raw values (no styling).
    pub fn from_rows<R, C>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<RawCell>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::new).collect())
            .collect();
        Self { name: name.into(), rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let r = &mut self.rows[row];
        if r.len() <= col {
            r.resize_with(col + 1, Cell::blank);
        }
        r[col] = cell;
    }

    /// Append a row after the current last row.
    pub fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Drop trailing empty cells from every row.
    pub fn trim_trailing_empty(&mut self) {
        for row in &mut self.rows {
            while row.last().is_some_and(|c| c.value.is_empty()) {
                row.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_grows_grid() {
        let mut ws = Worksheet::new("s");
        ws.set(2, 3, Cell::new("x"));
        assert_eq!(ws.row_count(), 3);
        assert_eq!(ws.rows[2].len(), 4);
        assert_eq!(ws.cell(2, 3).unwrap().value, RawCell::text("x"));
        assert_eq!(ws.cell(2, 0).unwrap().value, RawCell::Empty);
        assert!(ws.cell(0, 0).is_none());
    }

    #[test]
    fn test_trim_trailing_empty() {
        let mut ws = Worksheet::from_rows(
            "s",
            vec![
                vec![RawCell::text("a"), RawCell::Empty, RawCell::text("")],
                vec![RawCell::Empty, RawCell::text("b")],
                vec![RawCell::Empty],
            ],
        );
        ws.trim_trailing_empty();
        assert_eq!(ws.rows[0].len(), 1);
        assert_eq!(ws.rows[1].len(), 2);
        assert!(ws.rows[2].is_empty());
        // Trimming never drops a row
        assert_eq!(ws.row_count(), 3);
    }
}
