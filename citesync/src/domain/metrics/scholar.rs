//! Public profile page source
//!
//! Scrapes `{base_url}/citations?user={id}&hl=en`:
//! - the statistics table (`#gsc_rsb_st`): one row per metric, the first
//!   value cell is "All", the second "Since <year>"
//! - the citations-per-year histogram: year labels (`.gsc_g_t`) and bars
//!   (`.gsc_g_a`). Years with zero citations have no bar, so each bar's
//!   `z-index` gives its position counted from the right.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::error::SourceError;
use super::record::{MetricsRecord, TimeSeries};
use super::source::{MetricsSource, fetch_text, normalize_identifier};
use crate::core::constants::{
    METRIC_CITEDBY, METRIC_CITEDBY_5Y, METRIC_HINDEX, METRIC_HINDEX_5Y, METRIC_I10INDEX,
    METRIC_I10INDEX_5Y,
};

pub struct ScholarProfileSource {
    client: reqwest::Client,
    base_url: String,
}

impl ScholarProfileSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn profile_url(&self) -> String {
        format!("{}/citations", self.base_url)
    }
}

#[async_trait]
impl MetricsSource for ScholarProfileSource {
    fn source_name(&self) -> &'static str {
        "scholar"
    }

    async fn fetch(&self, identifier: &str) -> Result<MetricsRecord, SourceError> {
        let user = normalize_identifier(identifier)?;
        let request = self
            .client
            .get(self.profile_url())
            .query(&[("user", user), ("hl", "en")]);

        tracing::debug!(user, url = %self.profile_url(), "Fetching profile page");
        let html = fetch_text(request).await?;
        let record = parse_profile_html(&html, Utc::now())?;

        tracing::debug!(
            user,
            metrics = record.scalar_metrics().len(),
            years = record.time_series().points().len(),
            "Parsed profile page"
        );

        Ok(record)
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

fn z_index_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"z-index:\s*(\d+)").expect("Invalid regex"))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn parse_count(text: &str) -> Option<u64> {
    text.trim().replace([',', '\u{a0}', ' '], "").parse().ok()
}

/// Map a statistics-table row label to the (all-time, recent) metric names
fn metric_names(label: &str) -> Option<(&'static str, &'static str)> {
    match label.to_ascii_lowercase().as_str() {
        "citations" => Some((METRIC_CITEDBY, METRIC_CITEDBY_5Y)),
        "h-index" => Some((METRIC_HINDEX, METRIC_HINDEX_5Y)),
        "i10-index" => Some((METRIC_I10INDEX, METRIC_I10INDEX_5Y)),
        _ => None,
    }
}

/// Parse a profile page into a record
pub fn parse_profile_html(html: &str, fetched_at: DateTime<Utc>) -> Result<MetricsRecord, SourceError> {
    let document = Html::parse_document(html);

    let table_sel = selector("#gsc_rsb_st");
    let row_sel = selector("tr");
    let label_sel = selector("td.gsc_rsb_sc1");
    let value_sel = selector("td.gsc_rsb_std");

    let table = document.select(&table_sel).next().ok_or_else(|| {
        SourceError::FormatChanged {
            field: "statistics table".to_string(),
            detail: "(#gsc_rsb_st) not found in profile page".to_string(),
        }
    })?;

    let mut scalars = BTreeMap::new();
    for row in table.select(&row_sel) {
        let Some(label) = row.select(&label_sel).next().map(element_text) else {
            continue;
        };
        let Some((all_time, recent)) = metric_names(&label) else {
            tracing::trace!(label = %label, "Ignoring unknown statistics row");
            continue;
        };
        let mut values = row.select(&value_sel).map(element_text);
        if let Some(v) = values.next().as_deref().and_then(parse_count) {
            scalars.insert(all_time.to_string(), v);
        }
        if let Some(v) = values.next().as_deref().and_then(parse_count) {
            scalars.insert(recent.to_string(), v);
        }
    }

    let mut record = MetricsRecord::new(scalars, parse_histogram(&document), fetched_at);

    let name_sel = selector("#gsc_prf_in");
    if let Some(name) = document.select(&name_sel).next().map(element_text)
        && !name.is_empty()
    {
        record = record.with_name(name);
    }

    Ok(record)
}

/// Citations per year from the histogram; placeholder when it is absent
fn parse_histogram(document: &Html) -> TimeSeries {
    let year_sel = selector(".gsc_g_t");
    let bar_sel = selector("a.gsc_g_a");
    let count_sel = selector(".gsc_g_al");

    let years: Vec<i32> = document
        .select(&year_sel)
        .filter_map(|el| element_text(el).parse().ok())
        .collect();

    if years.is_empty() {
        let err = SourceError::FormatChanged {
            field: "citations histogram".to_string(),
            detail: "has no year labels".to_string(),
        };
        tracing::warn!(error = %err, "Substituting placeholder time series");
        return TimeSeries::Placeholder;
    }

    let bars: Vec<(Option<usize>, Option<u64>)> = document
        .select(&bar_sel)
        .map(|bar| {
            let z = bar
                .value()
                .attr("style")
                .and_then(|style| z_index_regex().captures(style))
                .and_then(|caps| caps[1].parse::<usize>().ok());
            let count = bar
                .select(&count_sel)
                .next()
                .map(element_text)
                .as_deref()
                .and_then(parse_count);
            (z, count)
        })
        .collect();

    let positional = bars.len() == years.len();
    let mut counts = vec![0u64; years.len()];
    for (ordinal, (z, count)) in bars.into_iter().enumerate() {
        let slot = match z {
            Some(z) => years.len().checked_sub(z),
            None if positional => Some(ordinal),
            None => None,
        };
        match (slot, count) {
            (Some(slot), Some(count)) if slot < counts.len() => counts[slot] = count,
            _ => tracing::warn!(ordinal, z_index = ?z, "Skipping unplaceable histogram bar"),
        }
    }

    TimeSeries::Yearly(years.into_iter().zip(counts).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use httpmock::prelude::*;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
    }

    const PROFILE_HTML: &str = r#"
<html><body>
<div id="gsc_prf_in">Ada Example</div>
<table id="gsc_rsb_st">
  <thead><tr><th></th><th class="gsc_rsb_sth">All</th><th class="gsc_rsb_sth">Since 2016</th></tr></thead>
  <tbody>
    <tr><td class="gsc_rsb_sc1"><a class="gsc_rsb_f">Citations</a></td><td class="gsc_rsb_std">340</td><td class="gsc_rsb_std">301</td></tr>
    <tr><td class="gsc_rsb_sc1"><a class="gsc_rsb_f">h-index</a></td><td class="gsc_rsb_std">12</td><td class="gsc_rsb_std">11</td></tr>
    <tr><td class="gsc_rsb_sc1"><a class="gsc_rsb_f">i10-index</a></td><td class="gsc_rsb_std">8</td><td class="gsc_rsb_std">7</td></tr>
  </tbody>
</table>
<div class="gsc_md_hist_b">
  <span class="gsc_g_t" style="right:130px">2019</span>
  <span class="gsc_g_t" style="right:98px">2020</span>
  <span class="gsc_g_t" style="right:66px">2021</span>
  <a href="javascript:void(0)" class="gsc_g_a" style="right:130px;height:20px;z-index:3"><span class="gsc_g_al">40</span></a>
  <a href="javascript:void(0)" class="gsc_g_a" style="right:98px;height:30px;z-index:2"><span class="gsc_g_al">55</span></a>
  <a href="javascript:void(0)" class="gsc_g_a" style="right:66px;height:32px;z-index:1"><span class="gsc_g_al">60</span></a>
</div>
</body></html>
"#;

    #[test]
    fn test_parse_profile_page() {
        let record = parse_profile_html(PROFILE_HTML, ts()).unwrap();

        assert_eq!(record.name(), Some("Ada Example"));
        assert_eq!(record.scalar(METRIC_CITEDBY), Some(340));
        assert_eq!(record.scalar(METRIC_HINDEX), Some(12));
        assert_eq!(record.scalar(METRIC_I10INDEX), Some(8));
        assert_eq!(record.scalar(METRIC_CITEDBY_5Y), Some(301));
        assert_eq!(record.scalar(METRIC_HINDEX_5Y), Some(11));
        assert_eq!(record.scalar(METRIC_I10INDEX_5Y), Some(7));
        assert_eq!(
            record.time_series().points(),
            vec![(2019, 40), (2020, 55), (2021, 60)]
        );
    }

    #[test]
    fn test_year_without_bar_is_zero() {
        let html = r#"
<table id="gsc_rsb_st"><tr><td class="gsc_rsb_sc1">h-index</td><td class="gsc_rsb_std">2</td></tr></table>
<span class="gsc_g_t">2018</span><span class="gsc_g_t">2019</span><span class="gsc_g_t">2020</span>
<a class="gsc_g_a" style="z-index:3"><span class="gsc_g_al">4</span></a>
<a class="gsc_g_a" style="z-index:1"><span class="gsc_g_al">9</span></a>
"#;
        let record = parse_profile_html(html, ts()).unwrap();
        assert_eq!(
            record.time_series().points(),
            vec![(2018, 4), (2019, 0), (2020, 9)]
        );
    }

    #[test]
    fn test_bars_without_z_index_fall_back_to_position() {
        let html = r#"
<table id="gsc_rsb_st"></table>
<span class="gsc_g_t">2020</span><span class="gsc_g_t">2021</span>
<a class="gsc_g_a"><span class="gsc_g_al">1,204</span></a>
<a class="gsc_g_a"><span class="gsc_g_al">7</span></a>
"#;
        let record = parse_profile_html(html, ts()).unwrap();
        assert_eq!(record.time_series().points(), vec![(2020, 1204), (2021, 7)]);
    }

    #[test]
    fn test_missing_histogram_is_placeholder() {
        let html = r#"<table id="gsc_rsb_st"><tr><td class="gsc_rsb_sc1">Citations</td><td class="gsc_rsb_std">5</td></tr></table>"#;
        let record = parse_profile_html(html, ts()).unwrap();

        assert!(record.time_series().is_placeholder());
        assert_eq!(record.scalar(METRIC_CITEDBY), Some(5));
        assert_eq!(record.scalar(METRIC_HINDEX), None);
    }

    #[test]
    fn test_missing_statistics_table_is_format_change() {
        let err = parse_profile_html("<html><body>Please show you're not a robot</body></html>", ts())
            .unwrap_err();
        assert!(matches!(err, SourceError::FormatChanged { field, .. } if field == "statistics table"));
    }

    #[test]
    fn test_profile_url() {
        let source = ScholarProfileSource::new(reqwest::Client::new(), "https://scholar.example.org/");
        assert_eq!(source.profile_url(), "https://scholar.example.org/citations");
    }

    #[tokio::test]
    async fn test_fetch_profile_page() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/citations")
                    .query_param("user", "qc6CJjYAAAAJ")
                    .query_param("hl", "en");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(PROFILE_HTML);
            })
            .await;

        let source = ScholarProfileSource::new(reqwest::Client::new(), &server.base_url());
        let record = source.fetch(" qc6CJjYAAAAJ ").await.unwrap();

        mock.assert_async().await;
        assert_eq!(record.scalar(METRIC_HINDEX), Some(12));
        assert_eq!(record.time_series().points().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_rate_limited_is_unavailable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/citations");
                then.status(429);
            })
            .await;

        let source = ScholarProfileSource::new(reqwest::Client::new(), &server.base_url());
        let err = source.fetch("qc6CJjYAAAAJ").await.unwrap_err();

        assert!(matches!(err, SourceError::Unavailable(_)));
    }
}
