//! Update pipeline: fetch, build, merge and write one artifact per run

mod error;
mod job;
mod runner;
mod state;

pub use error::{PipelineError, StageError};
pub use job::UpdateJob;
pub use runner::{RunReport, UpdatePipeline};
pub use state::PipelineState;
