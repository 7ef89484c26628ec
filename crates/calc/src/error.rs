use std::fmt;

#[derive(Debug)]
pub enum CalcError {
    /// Calculation configuration failed to parse as TOML.
    ConfigParse(String),
    /// Configuration parsed but holds an unusable value.
    ConfigInvalid(String),
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "failed to parse calc config: {msg}"),
            Self::ConfigInvalid(msg) => write!(f, "invalid calc config: {msg}"),
        }
    }
}

impl std::error::Error for CalcError {}
