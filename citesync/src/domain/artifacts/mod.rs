//! Artifacts derived from a `MetricsRecord`
//!
//! All builders are pure: no I/O, no clock reads (the row date is passed in).

mod chart;
mod document;
mod error;
mod row;

pub use chart::{ChartOptions, to_chart_image};
pub use document::to_metrics_document;
pub use error::ArtifactError;
pub use row::{DatedRow, to_dated_row};
