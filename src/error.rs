use thiserror::Error;

/// Error type for the generation and summary core.
///
/// Empty record sets and degenerate statistics are not errors; they surface as
/// empty collections or `NaN` values instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EdaError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EdaError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EdaError::InvalidArgument(msg.into())
    }

    pub fn unknown_field(field: &str) -> Self {
        EdaError::InvalidArgument(format!("unknown field '{field}'"))
    }
}

pub type Result<T> = std::result::Result<T, EdaError>;
