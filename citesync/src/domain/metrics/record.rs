//! Metrics snapshot types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::error::SourceError;
use crate::core::constants::{
    METRIC_CITEDBY, METRIC_CITEDBY_5Y, METRIC_HINDEX, METRIC_HINDEX_5Y, METRIC_I10INDEX,
    METRIC_I10INDEX_5Y, PLACEHOLDER_YEAR,
};

/// Scalar keys read from an author object
const SCALAR_KEYS: &[&str] = &[
    METRIC_HINDEX,
    METRIC_CITEDBY,
    METRIC_I10INDEX,
    METRIC_HINDEX_5Y,
    METRIC_CITEDBY_5Y,
    METRIC_I10INDEX_5Y,
];

/// Scalars every run needs; a snapshot without them is unusable
const REQUIRED_SCALARS: &[&str] = &[METRIC_HINDEX, METRIC_CITEDBY, METRIC_I10INDEX];

/// Key of the year -> count mapping in an author object
pub const CITES_PER_YEAR_KEY: &str = "cites_per_year";

/// Citations per year
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSeries {
    Yearly(BTreeMap<i32, u64>),
    /// The source did not provide a usable mapping; renders as one
    /// `PLACEHOLDER_YEAR -> 0` point.
    // TODO: drop once the upstream profile histogram shape has been stable for a while
    Placeholder,
}

impl TimeSeries {
    /// Points sorted by year; never empty
    pub fn points(&self) -> Vec<(i32, u64)> {
        match self {
            TimeSeries::Yearly(map) if !map.is_empty() => {
                map.iter().map(|(year, count)| (*year, *count)).collect()
            }
            _ => vec![(PLACEHOLDER_YEAR, 0)],
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, TimeSeries::Placeholder)
    }
}

/// One fetched snapshot of citation metrics for a profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsRecord {
    name: Option<String>,
    scalar_metrics: BTreeMap<String, u64>,
    time_series: TimeSeries,
    fetched_at: DateTime<Utc>,
}

impl MetricsRecord {
    pub fn new(
        scalar_metrics: BTreeMap<String, u64>,
        time_series: TimeSeries,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: None,
            scalar_metrics,
            time_series,
            fetched_at,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build a record from an author object such as
    /// `{"hindex": 12, "citedby": 340, "i10index": 8, "cites_per_year": {"2019": 40}}`.
    ///
    /// Only a non-object payload is an error. Missing or non-integer scalars
    /// are left out; a `cites_per_year` that is not a mapping becomes
    /// `TimeSeries::Placeholder`. `require_scalars` decides whether the
    /// result is usable.
    pub fn from_author_json(value: &Value, fetched_at: DateTime<Utc>) -> Result<Self, SourceError> {
        let obj = value.as_object().ok_or_else(|| {
            SourceError::Unavailable(format!(
                "expected a JSON object for the author record, got {}",
                json_type_name(value)
            ))
        })?;

        let scalar_metrics = SCALAR_KEYS
            .iter()
            .filter_map(|key| {
                obj.get(*key)
                    .and_then(as_count)
                    .map(|v| (key.to_string(), v))
            })
            .collect();

        let time_series = match obj.get(CITES_PER_YEAR_KEY) {
            Some(Value::Object(map)) => {
                let mut yearly = BTreeMap::new();
                for (year, count) in map {
                    match (year.trim().parse::<i32>(), as_count(count)) {
                        (Ok(year), Some(count)) => {
                            yearly.insert(year, count);
                        }
                        _ => tracing::warn!(
                            year = %year,
                            value = %count,
                            "Skipping malformed cites_per_year entry"
                        ),
                    }
                }
                TimeSeries::Yearly(yearly)
            }
            other => {
                let err = SourceError::FormatChanged {
                    field: CITES_PER_YEAR_KEY.to_string(),
                    detail: format!(
                        "expected a mapping, got {}",
                        other.map(json_type_name).unwrap_or("nothing")
                    ),
                };
                tracing::warn!(error = %err, "Substituting placeholder time series");
                TimeSeries::Placeholder
            }
        };

        let mut record = Self::new(scalar_metrics, time_series, fetched_at);
        if let Some(name) = obj.get("name").and_then(Value::as_str) {
            record = record.with_name(name);
        }
        Ok(record)
    }

    /// Fail with `FormatChanged` when h-index, citations or i10-index is
    /// missing. Unlike the time series these have no placeholder.
    pub fn require_scalars(&self) -> Result<(), SourceError> {
        match REQUIRED_SCALARS
            .iter()
            .find(|key| !self.scalar_metrics.contains_key(**key))
        {
            Some(key) => Err(SourceError::FormatChanged {
                field: key.to_string(),
                detail: "metric missing from the fetched profile".to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Value of a scalar metric, if the source provided it
    pub fn scalar(&self, name: &str) -> Option<u64> {
        self.scalar_metrics.get(name).copied()
    }

    pub fn scalar_metrics(&self) -> &BTreeMap<String, u64> {
        &self.scalar_metrics
    }

    pub fn time_series(&self) -> &TimeSeries {
        &self.time_series
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Non-negative integer, or a string of digits (thousands separators allowed)
fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_from_author_json_full() {
        let value = json!({
            "name": "Ada Example",
            "hindex": 12,
            "citedby": 340,
            "i10index": 8,
            "cites_per_year": {"2019": 40, "2020": 55, "2021": 60}
        });
        let record = MetricsRecord::from_author_json(&value, ts()).unwrap();

        assert_eq!(record.name(), Some("Ada Example"));
        assert_eq!(record.scalar(METRIC_HINDEX), Some(12));
        assert_eq!(record.scalar(METRIC_CITEDBY), Some(340));
        assert_eq!(record.scalar(METRIC_I10INDEX), Some(8));
        assert_eq!(record.scalar(METRIC_HINDEX_5Y), None);
        assert_eq!(
            record.time_series().points(),
            vec![(2019, 40), (2020, 55), (2021, 60)]
        );
        assert_eq!(record.fetched_at(), ts());
    }

    #[test]
    fn test_null_time_series_becomes_placeholder() {
        let value = json!({"hindex": 1, "citedby": 2, "i10index": 0, "cites_per_year": null});
        let record = MetricsRecord::from_author_json(&value, ts()).unwrap();

        assert!(record.time_series().is_placeholder());
        assert_eq!(record.time_series().points(), vec![(PLACEHOLDER_YEAR, 0)]);
    }

    #[test]
    fn test_missing_or_array_time_series_becomes_placeholder() {
        let missing = json!({"hindex": 1});
        let array = json!({"hindex": 1, "cites_per_year": [[2019, 4]]});

        for value in [missing, array] {
            let record = MetricsRecord::from_author_json(&value, ts()).unwrap();
            assert!(record.time_series().is_placeholder());
        }
    }

    #[test]
    fn test_empty_mapping_points_to_placeholder() {
        let value = json!({"cites_per_year": {}});
        let record = MetricsRecord::from_author_json(&value, ts()).unwrap();

        assert!(!record.time_series().is_placeholder());
        assert_eq!(record.time_series().points(), vec![(PLACEHOLDER_YEAR, 0)]);
    }

    #[test]
    fn test_malformed_entries_are_skipped() {
        let value = json!({"cites_per_year": {"2019": 3, "soon": 1, "2020": "x", "2021": "1,204"}});
        let record = MetricsRecord::from_author_json(&value, ts()).unwrap();

        assert_eq!(record.time_series().points(), vec![(2019, 3), (2021, 1204)]);
    }

    #[test]
    fn test_missing_scalar_is_absent_not_zero() {
        let value = json!({"citedby": 340, "hindex": null, "i10index": -1});
        let record = MetricsRecord::from_author_json(&value, ts()).unwrap();

        assert_eq!(record.scalar(METRIC_HINDEX), None);
        assert_eq!(record.scalar(METRIC_I10INDEX), None);
        assert_eq!(record.scalar_metrics().len(), 1);
    }

    #[test]
    fn test_require_scalars() {
        let full = json!({"hindex": 12, "citedby": 340, "i10index": 8});
        let record = MetricsRecord::from_author_json(&full, ts()).unwrap();
        assert!(record.require_scalars().is_ok());

        let no_i10 = json!({"hindex": 12, "citedby": 340, "i10index5y": 3});
        let record = MetricsRecord::from_author_json(&no_i10, ts()).unwrap();
        let err = record.require_scalars().unwrap_err();
        assert!(matches!(err, SourceError::FormatChanged { ref field, .. } if field == METRIC_I10INDEX));

        let empty = MetricsRecord::from_author_json(&json!({}), ts()).unwrap();
        let err = empty.require_scalars().unwrap_err();
        assert!(matches!(err, SourceError::FormatChanged { ref field, .. } if field == METRIC_HINDEX));
    }

    #[test]
    fn test_non_object_payload_is_unavailable() {
        let err = MetricsRecord::from_author_json(&json!([1, 2]), ts()).unwrap_err();
        assert!(matches!(err, SourceError::Unavailable(msg) if msg.contains("an array")));
    }
}
