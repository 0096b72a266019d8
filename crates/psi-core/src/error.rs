//! Ingestion error types

use thiserror::Error;

/// Reasons a digest payload is rejected before it reaches the coordinator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("line {line}: blank line")]
    BlankLine { line: usize },

    #[error("line {line}: expected 64 hex characters, found {found}")]
    InvalidLength { line: usize, found: usize },

    #[error("line {line}: digest must be lowercase hex")]
    InvalidHex { line: usize },

    #[error("line {line}: digests must be in ascending order")]
    OutOfOrder { line: usize },
}

impl Error {
    /// 1-based line number of the offending token, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::NotUtf8 => None,
            Error::BlankLine { line }
            | Error::InvalidLength { line, .. }
            | Error::InvalidHex { line }
            | Error::OutOfOrder { line } => Some(*line),
        }
    }
}
