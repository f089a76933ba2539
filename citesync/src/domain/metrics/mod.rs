//! Citation metrics: snapshot types and the sources that produce them
//!
//! - `record` - `MetricsRecord` / `TimeSeries`
//! - `source` - `MetricsSource` trait, HTTP client, source selection
//! - `scholar` - profile page scraper
//! - `dashboard` - JSON author endpoint

mod dashboard;
mod error;
mod record;
mod scholar;
mod source;

pub use dashboard::JsonDashboardSource;
pub use error::SourceError;
pub use record::{CITES_PER_YEAR_KEY, MetricsRecord, TimeSeries};
pub use scholar::{ScholarProfileSource, parse_profile_html};
pub use source::{MetricsSource, build_source, http_client};
