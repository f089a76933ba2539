//! Object store error types

use thiserror::Error;

/// Errors from object store backends (filesystem/S3/memory)
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Store configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or service failure; surfaced to the caller, never retried
    #[error("Transient store failure: {0}")]
    Transient(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound {
            key: "site/citations.csv".to_string(),
        };
        assert_eq!(err.to_string(), "Object not found: site/citations.csv");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_transient_display() {
        let err = StoreError::Transient("S3 put_object error: timeout".to_string());
        assert_eq!(
            err.to_string(),
            "Transient store failure: S3 put_object error: timeout"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: StoreError = io_err.into();
        assert!(err.to_string().contains("read-only"));
    }
}
