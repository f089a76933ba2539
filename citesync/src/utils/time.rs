//! Date helpers for dated rows

use chrono::{DateTime, NaiveDate, Utc};

/// Date format used in the first column of history rows
pub const ROW_DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date in UTC
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Format a date as it appears in a history row (`YYYY-MM-DD`)
pub fn format_row_date(date: NaiveDate) -> String {
    date.format(ROW_DATE_FORMAT).to_string()
}

/// Format a fetch timestamp for logs and documents (RFC 3339, second precision)
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
