use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Writer input is missing `constants`/`formulas`/`tables` or has the wrong shape.
    Schema(String),
    /// A worksheet never reached the table sentinel (only under the `error` policy).
    MissingTable { sheet: String },
    /// Workbook encode/decode failure (xlsx writer or reader).
    Workbook(String),
    /// A JSON fragment or document could not be parsed.
    Json { source_name: String, message: String },
    /// File read/write failure.
    Io { path: String, message: String },
}

impl ConvertError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn workbook(msg: impl Into<String>) -> Self {
        Self::Workbook(msg.into())
    }

    pub fn io(path: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Io { path: path.into(), message: err.to_string() }
    }

    pub fn json(source_name: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Json { source_name: source_name.into(), message: err.to_string() }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(msg) => write!(f, "schema error: {msg}"),
            Self::MissingTable { sheet } => {
                write!(f, "sheet '{sheet}': no table region (sentinel row not found)")
            }
            Self::Workbook(msg) => write!(f, "workbook error: {msg}"),
            Self::Json { source_name, message } => write!(f, "{source_name}: invalid JSON: {message}"),
            Self::Io { path, message } => write!(f, "{path}: {message}"),
        }
    }
}

impl std::error::Error for ConvertError {}

pub type Result<T> = std::result::Result<T, ConvertError>;
