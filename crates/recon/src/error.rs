use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (premium out of range, overlapping columns, etc.).
    ConfigValidation(String),
    /// A required sheet is absent from the input.
    MissingSheet { sheet: String },
    /// Sheet has data rows but none wide enough for the configured columns.
    SheetShape { sheet: String, needed: usize, found: usize },
    /// A renderer-required field is absent from a sheet payload.
    MissingField { sheet: String, field: String },
    /// IO error (CSV text, workbook read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingSheet { sheet } => write!(f, "required sheet '{sheet}' not found"),
            Self::SheetShape { sheet, needed, found } => {
                write!(f, "sheet '{sheet}': expected at least {needed} column(s), found {found}")
            }
            Self::MissingField { sheet, field } => {
                write!(f, "Missing required field for {sheet}: {field}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
