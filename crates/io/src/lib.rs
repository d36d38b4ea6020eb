// File I/O operations

pub mod json;
pub mod pipeline;
pub mod snapshot;
pub mod xlsx;

pub use pipeline::{
    from_workbook, from_workbook_with, read_workbook_file, to_workbook, to_workbook_with,
    write_workbook_file, ReadOptions,
};
