//! Metrics source trait and construction

use std::time::Duration;

use async_trait::async_trait;

use super::dashboard::JsonDashboardSource;
use super::error::SourceError;
use super::record::MetricsRecord;
use super::scholar::ScholarProfileSource;
use crate::core::config::{SourceConfig, SourceKind};
use crate::core::constants::{DEFAULT_SCHOLAR_URL, USER_AGENT};

/// Something that can produce a `MetricsRecord` for a profile identifier
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Short source name for logs
    fn source_name(&self) -> &'static str;

    /// Fetch the current metrics for `identifier`
    async fn fetch(&self, identifier: &str) -> Result<MetricsRecord, SourceError>;
}

/// Create the configured metrics source
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn MetricsSource>, SourceError> {
    let client = http_client(config.http_timeout_secs)?;

    let source: Box<dyn MetricsSource> = match config.kind {
        SourceKind::Scholar => Box::new(ScholarProfileSource::new(
            client,
            config.url.as_deref().unwrap_or(DEFAULT_SCHOLAR_URL),
        )),
        SourceKind::Json => Box::new(JsonDashboardSource::new(client, config.url.as_deref())),
    };

    tracing::debug!(
        source = source.source_name(),
        url = ?config.url,
        timeout_secs = config.http_timeout_secs,
        "Metrics source initialized"
    );

    Ok(source)
}

/// HTTP client used by the sources; one per invocation
pub fn http_client(timeout_secs: u64) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(USER_AGENT)
        .build()
        .map_err(SourceError::from)
}

/// Trimmed identifier; empty or whitespace-containing ids are rejected
pub(crate) fn normalize_identifier(identifier: &str) -> Result<&str, SourceError> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(SourceError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(trimmed)
}

/// GET `request` and return the body of a successful response
pub(crate) async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, SourceError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Unavailable(format!(
            "{} returned HTTP {}",
            response.url(),
            status
        )));
    }
    Ok(response.text().await?)
}
