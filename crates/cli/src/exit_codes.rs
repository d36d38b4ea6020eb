//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | `roundtrip` found differences                    |
//! | 2    | Usage error (bad args, bad config)               |
//! | 3    | I/O error (missing fragment or workbook file)    |
//! | 4    | Parse error (invalid JSON, unreadable workbook)  |
//! | 5    | Schema error (document shape)                    |
//! | 6    | Worksheet without a table region (strict mode)   |

use stdsheet_engine::ConvertError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// `roundtrip` found tables that did not survive write-then-read unchanged.
/// Like `diff(1)`, exit 1 means "documents differ."
pub const EXIT_ROUNDTRIP_DIFFS: u8 = 1;

/// Usage error - bad arguments, invalid config file.
pub const EXIT_USAGE: u8 = 2;

/// Fragment, workbook, or output file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// JSON fragment or workbook bytes could not be decoded.
pub const EXIT_PARSE: u8 = 4;

/// Input document is missing `constants`/`formulas`/`tables` or malformed.
pub const EXIT_SCHEMA: u8 = 5;

/// A worksheet never reached its sentinel row (only with `missing_table = "error"`).
pub const EXIT_MISSING_TABLE: u8 = 6;

pub fn convert_exit_code(err: &ConvertError) -> u8 {
    match err {
        ConvertError::Schema(_) => EXIT_SCHEMA,
        ConvertError::MissingTable { .. } => EXIT_MISSING_TABLE,
        ConvertError::Workbook(_) | ConvertError::Json { .. } => EXIT_PARSE,
        ConvertError::Io { .. } => EXIT_IO,
    }
}
