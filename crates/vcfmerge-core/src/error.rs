use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("unknown region code: {0}")]
    UnknownRegion(String),
    #[error("invalid property name: {0}")]
    InvalidPropertyName(String),
}
