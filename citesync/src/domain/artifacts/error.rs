//! Artifact building error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    /// A scalar metric the artifact needs was not provided by the source
    #[error("Missing metric: {0}")]
    MissingMetric(String),

    #[error("Invalid chart size {width}x{height} (each side must be {min} to {max} pixels)")]
    InvalidChartSize {
        width: u32,
        height: u32,
        min: u32,
        max: u32,
    },

    #[error("Encoding failed: {0}")]
    Encode(String),
}
