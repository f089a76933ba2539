//! Metrics source error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Invalid profile identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Remote unreachable, non-success status, or a payload of the wrong kind
    #[error("Metrics source unavailable: {0}")]
    Unavailable(String),

    /// Payload arrived but an expected field is structurally absent
    #[error("Metrics source format changed: {field} {detail}")]
    FormatChanged { field: String, detail: String },
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Unavailable(format!("HTTP error: {}", err))
    }
}
