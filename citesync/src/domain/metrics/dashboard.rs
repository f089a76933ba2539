//! JSON dashboard source
//!
//! GETs an author object (`hindex`, `citedby`, `i10index`, `cites_per_year`)
//! from `{base_url}/{id}`, or from the identifier itself when it is a full
//! URL.

use async_trait::async_trait;
use chrono::Utc;

use super::error::SourceError;
use super::record::MetricsRecord;
use super::source::{MetricsSource, fetch_text, normalize_identifier};

pub struct JsonDashboardSource {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl JsonDashboardSource {
    pub fn new(client: reqwest::Client, base_url: Option<&str>) -> Self {
        Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    fn record_url(&self, identifier: &str) -> Result<String, SourceError> {
        if identifier.starts_with("http://") || identifier.starts_with("https://") {
            return Ok(identifier.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!("{}/{}", base, identifier.trim_start_matches('/'))),
            None => Err(SourceError::InvalidIdentifier(format!(
                "{} (no dashboard base URL configured)",
                identifier
            ))),
        }
    }
}

#[async_trait]
impl MetricsSource for JsonDashboardSource {
    fn source_name(&self) -> &'static str {
        "json"
    }

    async fn fetch(&self, identifier: &str) -> Result<MetricsRecord, SourceError> {
        let identifier = normalize_identifier(identifier)?;
        let url = self.record_url(identifier)?;

        tracing::debug!(url = %url, "Fetching dashboard record");
        let body = fetch_text(
            self.client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/json"),
        )
        .await?;

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| SourceError::Unavailable(format!("{} returned invalid JSON: {}", url, e)))?;

        MetricsRecord::from_author_json(&value, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::TimeSeries;
    use httpmock::prelude::*;
    use serde_json::json;

    fn authors_source(server: &MockServer) -> JsonDashboardSource {
        JsonDashboardSource::new(reqwest::Client::new(), Some(server.url("/authors").as_str()))
    }

    #[test]
    fn test_record_url_joins_base() {
        let source = JsonDashboardSource::new(
            reqwest::Client::new(),
            Some("https://dash.example.org/authors/"),
        );
        assert_eq!(
            source.record_url("42.json").unwrap(),
            "https://dash.example.org/authors/42.json"
        );
    }

    #[test]
    fn test_record_url_full_url_identifier() {
        let source = JsonDashboardSource::new(reqwest::Client::new(), None);
        assert_eq!(
            source.record_url("https://cdn.example.org/a.json").unwrap(),
            "https://cdn.example.org/a.json"
        );
        assert!(matches!(
            source.record_url("42"),
            Err(SourceError::InvalidIdentifier(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_author_record() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/authors/42");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "name": "Ada Example",
                        "hindex": 12,
                        "citedby": 340,
                        "i10index": 8,
                        "cites_per_year": {"2019": 40, "2020": 55, "2021": 60}
                    }));
            })
            .await;

        let source = authors_source(&server);
        let record = source.fetch("42").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.name(), Some("Ada Example"));
        assert_eq!(record.scalar("hindex"), Some(12));
        assert_eq!(
            record.time_series().points(),
            vec![(2019, 40), (2020, 55), (2021, 60)]
        );
    }

    #[tokio::test]
    async fn test_fetch_null_series_is_placeholder() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/a.json");
                then.status(200).json_body(json!({
                    "hindex": 1,
                    "citedby": 2,
                    "i10index": 0,
                    "cites_per_year": null
                }));
            })
            .await;

        let source = JsonDashboardSource::new(reqwest::Client::new(), None);
        let record = source.fetch(&server.url("/a.json")).await.unwrap();

        assert_eq!(record.time_series(), &TimeSeries::Placeholder);
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/authors/42");
                then.status(503);
            })
            .await;

        let source = authors_source(&server);
        let err = source.fetch("42").await.unwrap_err();

        assert!(matches!(err, SourceError::Unavailable(msg) if msg.contains("503")));
    }

    #[tokio::test]
    async fn test_fetch_invalid_json_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/authors/42");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let source = authors_source(&server);
        let err = source.fetch("42").await.unwrap_err();

        assert!(matches!(err, SourceError::Unavailable(msg) if msg.contains("invalid JSON")));
    }
}
