use std::fmt;

#[derive(Debug)]
pub enum NormalizeError {
    /// Zero-byte upload.
    EmptyFile,
    /// Upload exceeds the in-memory buffering cap.
    TooLarge { size: usize },
    /// Neither the file signature nor the extension is a known container.
    UnsupportedFormat,
    /// Container-level Excel read failure.
    Workbook(String),
    /// Container-level CSV read failure.
    Csv(String),
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFile => write!(f, "file is empty"),
            Self::TooLarge { size } => {
                write!(f, "file is {size} bytes, over the {} byte limit", crate::MAX_FILE_BYTES)
            }
            Self::UnsupportedFormat => {
                write!(f, "unsupported file format: expected .xlsx, .xls or .csv")
            }
            Self::Workbook(msg) => write!(f, "failed to read workbook: {msg}"),
            Self::Csv(msg) => write!(f, "failed to parse CSV: {msg}"),
        }
    }
}

impl std::error::Error for NormalizeError {}
