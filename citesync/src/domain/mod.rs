//! Domain logic
//!
//! - `metrics` - metrics snapshot types and sources (profile page, JSON dashboard)
//! - `artifacts` - dated row, chart image, metrics document
//! - `pipeline` - Fetching -> Merging -> Writing update runs

pub mod artifacts;
pub mod metrics;
pub mod pipeline;

pub use pipeline::{PipelineError, PipelineState, RunReport, UpdateJob, UpdatePipeline};
