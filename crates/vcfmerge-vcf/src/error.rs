use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcfError {
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, VcfError>;
