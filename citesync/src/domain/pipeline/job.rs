//! What one invocation updates

use crate::core::cli::Variant;
use crate::core::config::{AppConfig, MetricsFormat};
use crate::domain::artifacts::ChartOptions;

/// One variant's target key and artifact settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateJob {
    /// Append a dated row to the cumulative CSV at `key`
    Append { key: String, columns: Vec<String> },
    /// Overwrite `key` with a freshly rendered chart
    Chart { key: String, options: ChartOptions },
    /// Overwrite `key` with the metrics summary document
    Metrics { key: String, format: MetricsFormat },
}

impl UpdateJob {
    pub fn from_config(config: &AppConfig, variant: Variant) -> Self {
        match variant {
            Variant::Append => UpdateJob::Append {
                key: config.history.key.clone(),
                columns: config.history.columns.clone(),
            },
            Variant::Chart => UpdateJob::Chart {
                key: config.chart.key.clone(),
                options: ChartOptions::new(config.chart.width, config.chart.height),
            },
            Variant::Metrics => UpdateJob::Metrics {
                key: config.metrics.key.clone(),
                format: config.metrics.format,
            },
        }
    }

    pub fn key(&self) -> &str {
        match self {
            UpdateJob::Append { key, .. }
            | UpdateJob::Chart { key, .. }
            | UpdateJob::Metrics { key, .. } => key,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            UpdateJob::Append { .. } => "append",
            UpdateJob::Chart { .. } => "chart",
            UpdateJob::Metrics { .. } => "metrics",
        }
    }

    /// Cumulative jobs merge into the stored object instead of replacing it
    pub fn is_cumulative(&self) -> bool {
        matches!(self, UpdateJob::Append { .. })
    }
}
