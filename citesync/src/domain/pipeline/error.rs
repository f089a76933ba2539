//! Pipeline error types

use thiserror::Error;

use super::state::PipelineState;
use crate::data::StoreError;
use crate::domain::artifacts::ArtifactError;
use crate::domain::metrics::SourceError;

/// Error from the component a stage called
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// A failed run, tagged with the state it failed in
#[derive(Error, Debug)]
#[error("Update failed while {state}: {source}")]
pub struct PipelineError {
    pub state: PipelineState,
    #[source]
    pub source: StageError,
}

impl PipelineError {
    pub fn new(state: PipelineState, source: impl Into<StageError>) -> Self {
        Self {
            state,
            source: source.into(),
        }
    }
}
