//! Dated history row

use chrono::NaiveDate;

use super::error::ArtifactError;
use crate::domain::metrics::MetricsRecord;
use crate::utils::csv::encode_row;
use crate::utils::time::format_row_date;

/// `[date, v1, ..., vN]` for one day, in column order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedRow {
    date: NaiveDate,
    values: Vec<u64>,
}

impl DatedRow {
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Date followed by the values, as text
    pub fn fields(&self) -> Vec<String> {
        std::iter::once(format_row_date(self.date))
            .chain(self.values.iter().map(u64::to_string))
            .collect()
    }

    /// Newline-terminated CSV line
    pub fn to_csv_line(&self) -> String {
        encode_row(&self.fields())
    }
}

/// Build today's row from `columns` of the record's scalar metrics
pub fn to_dated_row(
    record: &MetricsRecord,
    today: NaiveDate,
    columns: &[String],
) -> Result<DatedRow, ArtifactError> {
    let values = columns
        .iter()
        .map(|column| {
            record
                .scalar(column)
                .ok_or_else(|| ArtifactError::MissingMetric(column.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DatedRow {
        date: today,
        values,
    })
}
