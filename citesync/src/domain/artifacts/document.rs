//! Flat metrics summary document

use serde::Serialize;

use super::error::ArtifactError;
use crate::core::config::MetricsFormat;
use crate::core::constants::{METRIC_CITEDBY, METRIC_HINDEX, METRIC_I10INDEX};
use crate::domain::metrics::MetricsRecord;
use crate::utils::csv::encode_row;

/// Field order here is the serialized key order
#[derive(Debug, Serialize)]
struct MetricsDocument {
    #[serde(rename = "h-index")]
    h_index: u64,
    citations: u64,
    #[serde(rename = "i10-index")]
    i10_index: u64,
}

const CSV_HEADER: [&str; 3] = ["h-index", "citations", "i10-index"];

fn required(record: &MetricsRecord, metric: &str) -> Result<u64, ArtifactError> {
    record
        .scalar(metric)
        .ok_or_else(|| ArtifactError::MissingMetric(metric.to_string()))
}

/// Encode h-index, citations and i10-index as a JSON object or a two-line CSV
pub fn to_metrics_document(
    record: &MetricsRecord,
    format: MetricsFormat,
) -> Result<Vec<u8>, ArtifactError> {
    let doc = MetricsDocument {
        h_index: required(record, METRIC_HINDEX)?,
        citations: required(record, METRIC_CITEDBY)?,
        i10_index: required(record, METRIC_I10INDEX)?,
    };

    match format {
        MetricsFormat::Json => serde_json::to_vec(&doc)
            .map_err(|e| ArtifactError::Encode(format!("metrics JSON: {}", e))),
        MetricsFormat::Csv => {
            let mut out = encode_row(&CSV_HEADER);
            out.push_str(&encode_row(&[
                doc.h_index.to_string(),
                doc.citations.to_string(),
                doc.i10_index.to_string(),
            ]));
            Ok(out.into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn record(value: serde_json::Value) -> MetricsRecord {
        MetricsRecord::from_author_json(&value, Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap())
            .unwrap()
    }

    fn sample() -> MetricsRecord {
        record(json!({
            "hindex": 12,
            "citedby": 340,
            "i10index": 8,
            "cites_per_year": {"2019": 40, "2020": 55, "2021": 60}
        }))
    }

    #[test]
    fn test_json_document() {
        let bytes = to_metrics_document(&sample(), MetricsFormat::Json).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"h-index":12,"citations":340,"i10-index":8}"#
        );
    }

    #[test]
    fn test_csv_document() {
        let bytes = to_metrics_document(&sample(), MetricsFormat::Csv).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "h-index,citations,i10-index\n12,340,8\n"
        );
    }

    #[test]
    fn test_missing_hindex_fails() {
        let record = record(json!({"citedby": 340, "i10index": 8, "cites_per_year": {}}));

        for format in [MetricsFormat::Json, MetricsFormat::Csv] {
            let err = to_metrics_document(&record, format).unwrap_err();
            assert!(matches!(err, ArtifactError::MissingMetric(ref m) if m == "hindex"));
        }
    }

    #[test]
    fn test_same_record_same_bytes() {
        let a = to_metrics_document(&sample(), MetricsFormat::Json).unwrap();
        let b = to_metrics_document(&sample(), MetricsFormat::Json).unwrap();
        assert_eq!(a, b);
    }
}
