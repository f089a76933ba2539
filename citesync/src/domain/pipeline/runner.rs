//! Update pipeline
//!
//! One run moves through Fetching -> Merging -> Writing and ends in Done or
//! Failed. Nothing is retried and nothing is written before the final put,
//! so a failure in any earlier state leaves the store as it was.
//!
//! Appends read the current history object, add exactly one row after the
//! existing bytes and put the result back under the same key. Chart and
//! metrics runs overwrite their key.

use std::sync::Arc;

use chrono::NaiveDate;

use super::error::PipelineError;
use super::job::UpdateJob;
use super::state::PipelineState;
use crate::core::constants::{CONTENT_TYPE_CSV, CONTENT_TYPE_PNG};
use crate::data::{ObjectStore, PutOptions};
use crate::domain::artifacts::{ArtifactError, to_chart_image, to_dated_row, to_metrics_document};
use crate::domain::metrics::{MetricsRecord, MetricsSource};
use crate::utils::csv::{append_row, count_rows};
use crate::utils::time::{format_row_date, format_timestamp, today_utc};

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub job: &'static str,
    pub key: String,
    /// Size of the object that was (or, for dry runs, would have been) written
    pub bytes: usize,
    /// Rows in the history object after the append
    pub rows: Option<usize>,
    pub dry_run: bool,
}

/// Artifact ready to be put
struct Prepared {
    data: Vec<u8>,
    options: PutOptions,
    rows: Option<usize>,
}

pub struct UpdatePipeline {
    source: Box<dyn MetricsSource>,
    store: Arc<dyn ObjectStore>,
    profile: String,
    dry_run: bool,
    today: Option<NaiveDate>,
}

impl UpdatePipeline {
    pub fn new(
        source: Box<dyn MetricsSource>,
        store: Arc<dyn ObjectStore>,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            source,
            store,
            profile: profile.into(),
            dry_run: false,
            today: None,
        }
    }

    /// Fetch and merge, but never put
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Pin the row date instead of using the current UTC date
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Run one update. The error carries the state the run failed in.
    pub async fn run(&self, job: &UpdateJob) -> Result<RunReport, PipelineError> {
        tracing::info!(
            job = job.name(),
            key = job.key(),
            source = self.source.source_name(),
            store = self.store.backend_name(),
            dry_run = self.dry_run,
            "Update started"
        );

        let mut state = PipelineState::Fetching;
        match self.execute(job, &mut state).await {
            Ok(report) => {
                Self::transition(job, state, PipelineState::Done);
                Ok(report)
            }
            Err(e) => {
                Self::transition(job, state, PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        job: &UpdateJob,
        state: &mut PipelineState,
    ) -> Result<RunReport, PipelineError> {
        let (record, existing) = self.fetch(job).await?;

        Self::advance(job, state, PipelineState::Merging);
        let prepared = self
            .prepare(job, &record, existing)
            .map_err(|e| PipelineError::new(*state, e))?;

        Self::advance(job, state, PipelineState::Writing);
        let bytes = prepared.data.len();
        if self.dry_run {
            tracing::info!(
                key = job.key(),
                bytes,
                rows = ?prepared.rows,
                content_type = ?prepared.options.content_type,
                "Dry run, skipping write"
            );
        } else {
            self.store
                .put(job.key(), &prepared.data, &prepared.options)
                .await
                .map_err(|e| PipelineError::new(*state, e))?;
            tracing::info!(key = job.key(), bytes, rows = ?prepared.rows, "Object written");
        }

        Ok(RunReport {
            job: job.name(),
            key: job.key().to_string(),
            bytes,
            rows: prepared.rows,
            dry_run: self.dry_run,
        })
    }

    /// Metrics for the profile, plus the stored history for appends
    async fn fetch(
        &self,
        job: &UpdateJob,
    ) -> Result<(MetricsRecord, Option<Vec<u8>>), PipelineError> {
        let record = self
            .source
            .fetch(&self.profile)
            .await
            .map_err(|e| PipelineError::new(PipelineState::Fetching, e))?;
        record
            .require_scalars()
            .map_err(|e| PipelineError::new(PipelineState::Fetching, e))?;

        tracing::debug!(
            profile = %self.profile,
            name = ?record.name(),
            fetched_at = %format_timestamp(record.fetched_at()),
            metrics = ?record.scalar_metrics(),
            placeholder_series = record.time_series().is_placeholder(),
            "Metrics fetched"
        );

        if !job.is_cumulative() {
            return Ok((record, None));
        }

        let existing = match self.store.get(job.key()).await {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                tracing::info!(key = job.key(), "No existing history object, starting a new one");
                Vec::new()
            }
            Err(e) => return Err(PipelineError::new(PipelineState::Fetching, e)),
        };

        Ok((record, Some(existing)))
    }

    fn prepare(
        &self,
        job: &UpdateJob,
        record: &MetricsRecord,
        existing: Option<Vec<u8>>,
    ) -> Result<Prepared, ArtifactError> {
        match job {
            UpdateJob::Append { columns, .. } => {
                let row = to_dated_row(record, self.today.unwrap_or_else(today_utc), columns)?;
                let existing = existing.unwrap_or_default();
                let merged = append_row(&existing, &row.to_csv_line());
                let rows = count_rows(&merged);

                tracing::debug!(
                    date = %format_row_date(row.date()),
                    values = ?row.values(),
                    previous_bytes = existing.len(),
                    rows,
                    "Row merged"
                );

                Ok(Prepared {
                    data: merged,
                    options: PutOptions::new(CONTENT_TYPE_CSV),
                    rows: Some(rows),
                })
            }
            UpdateJob::Chart { options, .. } => Ok(Prepared {
                data: to_chart_image(record, options)?,
                options: PutOptions::new(CONTENT_TYPE_PNG).public_read(),
                rows: None,
            }),
            UpdateJob::Metrics { format, .. } => Ok(Prepared {
                data: to_metrics_document(record, *format)?,
                options: PutOptions::new(format.content_type()),
                rows: None,
            }),
        }
    }

    fn advance(job: &UpdateJob, state: &mut PipelineState, next: PipelineState) {
        Self::transition(job, *state, next);
        *state = next;
    }

    fn transition(job: &UpdateJob, from: PipelineState, to: PipelineState) {
        if to.is_terminal() {
            tracing::debug!(job = job.name(), from = %from, to = %to, "Pipeline finished");
        } else {
            tracing::trace!(job = job.name(), from = %from, to = %to, "Pipeline state");
        }
    }
}
