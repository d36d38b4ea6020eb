// Configuration loading

pub mod settings;

pub use settings::{MissingTable, ReadSettings, Settings, WorkbookSettings};
