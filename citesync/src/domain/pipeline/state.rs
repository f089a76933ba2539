//! Pipeline states

use std::fmt;

/// Where an update run is, or where it ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// Fetching metrics (and the existing history object for appends)
    Fetching,
    /// Building the artifact; for appends, merging the new row
    Merging,
    /// Putting the artifact into the store
    Writing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Fetching => write!(f, "fetching"),
            PipelineState::Merging => write!(f, "merging"),
            PipelineState::Writing => write!(f, "writing"),
            PipelineState::Done => write!(f, "done"),
            PipelineState::Failed => write!(f, "failed"),
        }
    }
}
