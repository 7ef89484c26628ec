use std::fmt;

#[derive(Debug)]
pub enum ExtractError {
    /// Detector configuration failed to parse as TOML.
    ConfigParse(String),
    /// Detector configuration parsed but holds an unusable value.
    ConfigInvalid(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "failed to parse detector config: {msg}"),
            Self::ConfigInvalid(msg) => write!(f, "invalid detector config: {msg}"),
        }
    }
}

impl std::error::Error for ExtractError {}
