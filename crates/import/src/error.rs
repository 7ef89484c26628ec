use std::fmt;

use payline_io::NormalizeError;

#[derive(Debug)]
pub enum ImportError {
    /// The upload could not be decoded into a workbook at all.
    Normalize(NormalizeError),
    /// Required headers are missing or no usable sheet exists. Fatal for
    /// the whole file; nothing is written.
    InvalidFileFormat(String),
    /// The workbook decoded but holds no data rows.
    NoData,
    /// Infrastructure-level database failure. The whole transaction is
    /// rolled back.
    Transaction(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normalize(e) => write!(f, "{e}"),
            Self::InvalidFileFormat(msg) => write!(f, "invalid file format: {msg}"),
            Self::NoData => write!(f, "file contains no data rows"),
            Self::Transaction(msg) => write!(f, "transaction failed: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Normalize(e) => Some(e),
            _ => None,
        }
    }
}

impl From<NormalizeError> for ImportError {
    fn from(e: NormalizeError) -> Self {
        Self::Normalize(e)
    }
}

impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Transaction(e.to_string())
    }
}
