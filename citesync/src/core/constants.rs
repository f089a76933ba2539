// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "citesync";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".citesync";

/// User agent sent with every metrics-source request
pub const USER_AGENT: &str = "citesync/0.3";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "citesync.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CITESYNC_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CITESYNC_LOG";

// =============================================================================
// Environment Variables - Metrics Source
// =============================================================================

/// Profile identifier (Scholar user id, or dashboard id / URL)
pub const ENV_PROFILE: &str = "CITESYNC_PROFILE";

/// Metrics source kind (`scholar` or `json`)
pub const ENV_SOURCE: &str = "CITESYNC_SOURCE";

/// Base URL override for the metrics source
pub const ENV_SOURCE_URL: &str = "CITESYNC_SOURCE_URL";

/// HTTP request timeout for the metrics source, in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "CITESYNC_HTTP_TIMEOUT_SECS";

// =============================================================================
// Environment Variables - Object Store
// =============================================================================

/// Object store backend (`s3` or `filesystem`)
pub const ENV_STORAGE: &str = "CITESYNC_STORAGE";

/// Destination bucket
pub const ENV_BUCKET: &str = "CITESYNC_BUCKET";

/// Key prefix inside the bucket
pub const ENV_PREFIX: &str = "CITESYNC_PREFIX";

/// S3 region
pub const ENV_REGION: &str = "CITESYNC_REGION";

/// S3-compatible endpoint URL (MinIO, R2, ...)
pub const ENV_ENDPOINT: &str = "CITESYNC_ENDPOINT";

/// Base directory for the filesystem backend
pub const ENV_DATA_DIR: &str = "CITESYNC_DATA_DIR";

/// Skip the final write
pub const ENV_DRY_RUN: &str = "CITESYNC_DRY_RUN";

// =============================================================================
// Metrics Source Defaults
// =============================================================================

/// Public Scholar host
pub const DEFAULT_SCHOLAR_URL: &str = "https://scholar.google.com";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Year used for the single-point series substituted when the source's
/// time series is not a mapping
pub const PLACEHOLDER_YEAR: i32 = 2020;

// =============================================================================
// Object Keys & Artifact Defaults
// =============================================================================

/// Default key of the cumulative history object
pub const DEFAULT_HISTORY_KEY: &str = "citations.csv";

/// Default key of the chart image object
pub const DEFAULT_CHART_KEY: &str = "citations.png";

/// Default key of the JSON metrics document
pub const DEFAULT_METRICS_JSON_KEY: &str = "metrics.json";

/// Default key of the CSV metrics document
pub const DEFAULT_METRICS_CSV_KEY: &str = "metrics.csv";

/// Default local directory for the filesystem backend
pub const DEFAULT_DATA_DIR: &str = "~/.citesync/objects";

/// Default chart width in pixels
pub const DEFAULT_CHART_WIDTH: u32 = 640;

/// Default chart height in pixels
pub const DEFAULT_CHART_HEIGHT: u32 = 480;

/// Smallest chart width or height that leaves room for axes and labels
pub const MIN_CHART_SIDE: u32 = 64;

/// Largest chart width or height; bounds the raster allocation
pub const MAX_CHART_SIDE: u32 = 4096;

/// Columns appended after the date in each history row
pub const DEFAULT_HISTORY_COLUMNS: &[&str] = &["hindex", "citedby", "i10index"];

// =============================================================================
// Metric Names
// =============================================================================

pub const METRIC_HINDEX: &str = "hindex";
pub const METRIC_CITEDBY: &str = "citedby";
pub const METRIC_I10INDEX: &str = "i10index";
pub const METRIC_HINDEX_5Y: &str = "hindex5y";
pub const METRIC_CITEDBY_5Y: &str = "citedby5y";
pub const METRIC_I10INDEX_5Y: &str = "i10index5y";

// =============================================================================
// Content Types
// =============================================================================

pub const CONTENT_TYPE_CSV: &str = "text/csv";
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_PNG: &str = "image/png";
