use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {field}: {value} ({reason})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("Empty color")]
    Empty,

    #[error("Unknown color name: {0}")]
    UnknownName(String),

    #[error("Malformed hex color: {0}")]
    BadHex(String),

    #[error("Malformed color function: {0}")]
    BadFunction(String),

    #[error("Unrecognized color: {0}")]
    Unrecognized(String),

    #[error("Color is not displayable: {0}")]
    NotDisplayable(String),
}
