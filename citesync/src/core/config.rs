use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::objects::store::validate_key;
use crate::utils::file::expand_path;

use super::cli::{CliConfig, Variant};
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, CONTENT_TYPE_CSV, CONTENT_TYPE_JSON, DEFAULT_CHART_HEIGHT,
    DEFAULT_CHART_KEY, DEFAULT_CHART_WIDTH, DEFAULT_DATA_DIR, DEFAULT_HISTORY_COLUMNS,
    DEFAULT_HISTORY_KEY, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_METRICS_CSV_KEY,
    DEFAULT_METRICS_JSON_KEY, DEFAULT_SCHOLAR_URL, MAX_CHART_SIDE, MIN_CHART_SIDE,
};

// =============================================================================
// Source Kind Enum
// =============================================================================

/// Where citation metrics are fetched from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Public profile page, scraped
    #[default]
    Scholar,
    /// Dashboard endpoint returning a JSON author object
    Json,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Scholar => write!(f, "scholar"),
            SourceKind::Json => write!(f, "json"),
        }
    }
}

// =============================================================================
// Storage Backend Enum
// =============================================================================

/// Object store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    S3,
    Filesystem,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Filesystem => write!(f, "filesystem"),
        }
    }
}

// =============================================================================
// Metrics Document Format Enum
// =============================================================================

/// Encoding of the metrics summary document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsFormat {
    #[default]
    Json,
    Csv,
}

impl MetricsFormat {
    pub fn default_key(&self) -> &'static str {
        match self {
            MetricsFormat::Json => DEFAULT_METRICS_JSON_KEY,
            MetricsFormat::Csv => DEFAULT_METRICS_CSV_KEY,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MetricsFormat::Json => CONTENT_TYPE_JSON,
            MetricsFormat::Csv => CONTENT_TYPE_CSV,
        }
    }
}

impl fmt::Display for MetricsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsFormat::Json => write!(f, "json"),
            MetricsFormat::Csv => write!(f, "csv"),
        }
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Metrics source section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SourceFileConfig {
    pub kind: Option<SourceKind>,
    pub url: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

/// Object store section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorageFileConfig {
    pub backend: Option<StorageBackend>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub path: Option<String>,
}

/// Cumulative history section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HistoryFileConfig {
    pub key: Option<String>,
    pub columns: Option<Vec<String>>,
}

/// Chart image section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ChartFileConfig {
    pub key: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Metrics document section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MetricsFileConfig {
    pub key: Option<String>,
    pub format: Option<MetricsFormat>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub profile: Option<String>,
    pub source: Option<SourceFileConfig>,
    pub storage: Option<StorageFileConfig>,
    pub history: Option<HistoryFileConfig>,
    pub chart: Option<ChartFileConfig>,
    pub metrics: Option<MetricsFileConfig>,
    pub dry_run: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Overwrite `$dst` with `$src` when the latter is set
macro_rules! merge_field {
    ($dst:expr, $src:expr, $name:literal) => {
        if $src.is_some() {
            tracing::trace!(field = $name, value = ?$src, "Merging config field");
            $dst = $src;
        }
    };
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        merge_field!(self.profile, other.profile, "profile");
        merge_field!(self.dry_run, other.dry_run, "dry_run");

        if let Some(source) = other.source {
            let current = self.source.get_or_insert_with(SourceFileConfig::default);
            merge_field!(current.kind, source.kind, "source.kind");
            merge_field!(current.url, source.url, "source.url");
            merge_field!(
                current.http_timeout_secs,
                source.http_timeout_secs,
                "source.http_timeout_secs"
            );
        }

        if let Some(storage) = other.storage {
            let current = self.storage.get_or_insert_with(StorageFileConfig::default);
            merge_field!(current.backend, storage.backend, "storage.backend");
            merge_field!(current.bucket, storage.bucket, "storage.bucket");
            merge_field!(current.prefix, storage.prefix, "storage.prefix");
            merge_field!(current.region, storage.region, "storage.region");
            merge_field!(current.endpoint, storage.endpoint, "storage.endpoint");
            merge_field!(current.path, storage.path, "storage.path");
        }

        if let Some(history) = other.history {
            let current = self.history.get_or_insert_with(HistoryFileConfig::default);
            merge_field!(current.key, history.key, "history.key");
            merge_field!(current.columns, history.columns, "history.columns");
        }

        if let Some(chart) = other.chart {
            let current = self.chart.get_or_insert_with(ChartFileConfig::default);
            merge_field!(current.key, chart.key, "chart.key");
            merge_field!(current.width, chart.width, "chart.width");
            merge_field!(current.height, chart.height, "chart.height");
        }

        if let Some(metrics) = other.metrics {
            let current = self.metrics.get_or_insert_with(MetricsFileConfig::default);
            merge_field!(current.key, metrics.key, "metrics.key");
            merge_field!(current.format, metrics.format, "metrics.format");
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Metrics source configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// Base URL (Scholar host, or dashboard endpoint prefix)
    pub url: Option<String>,
    pub http_timeout_secs: u64,
}

/// S3 configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub prefix: String,
    pub region: Option<String>,
    pub endpoint: Option<String>,
}

/// Object store configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StorageBackend,
    pub s3: Option<S3Config>,
    /// Bucket name as configured; a subdirectory for the filesystem backend
    pub bucket: String,
    pub filesystem_path: PathBuf,
}

/// Cumulative history configuration
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub key: String,
    pub columns: Vec<String>,
}

/// Chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub key: String,
    pub width: u32,
    pub height: u32,
}

/// Metrics document configuration
#[derive(Debug, Clone)]
pub struct MetricsDocConfig {
    pub key: String,
    pub format: MetricsFormat,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub profile: String,
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub history: HistoryConfig,
    pub chart: ChartConfig,
    pub metrics: MetricsDocConfig,
    pub dry_run: bool,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.citesync/citesync.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig, variant: Variant) -> Result<Self> {
        tracing::debug!(variant = ?variant, "Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::resolve(cli, file_config);
        config.validate(variant)?;

        tracing::debug!(
            profile = %config.profile,
            source = %config.source.kind,
            storage = %config.store.backend,
            dry_run = config.dry_run,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn resolve(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_source = file_config.source.unwrap_or_default();
        let file_storage = file_config.storage.unwrap_or_default();
        let file_history = file_config.history.unwrap_or_default();
        let file_chart = file_config.chart.unwrap_or_default();
        let file_metrics = file_config.metrics.unwrap_or_default();

        let profile = cli
            .profile
            .clone()
            .or(file_config.profile)
            .unwrap_or_default()
            .trim()
            .to_string();

        let kind = cli.source.or(file_source.kind).unwrap_or_default();
        let url = cli.source_url.clone().or(file_source.url).or_else(|| {
            // Only the Scholar source has a well-known host
            (kind == SourceKind::Scholar).then(|| DEFAULT_SCHOLAR_URL.to_string())
        });
        let source = SourceConfig {
            kind,
            url,
            http_timeout_secs: cli
                .http_timeout_secs
                .or(file_source.http_timeout_secs)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let backend = cli.storage.or(file_storage.backend).unwrap_or_default();
        let bucket = cli.bucket.clone().or(file_storage.bucket).unwrap_or_default();
        let s3 = if backend == StorageBackend::S3 {
            Some(S3Config {
                bucket: bucket.clone(),
                prefix: cli
                    .prefix
                    .clone()
                    .or(file_storage.prefix.clone())
                    .unwrap_or_default(),
                region: cli.region.clone().or(file_storage.region),
                endpoint: cli.endpoint.clone().or(file_storage.endpoint),
            })
        } else {
            None
        };
        let filesystem_path = expand_path(
            &cli.data_dir
                .clone()
                .or(file_storage.path)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );
        // For the filesystem backend the bucket becomes a subdirectory
        let filesystem_path = if backend == StorageBackend::Filesystem && !bucket.is_empty() {
            filesystem_path.join(&bucket)
        } else {
            filesystem_path
        };
        let store = StoreConfig {
            backend,
            s3,
            bucket,
            filesystem_path,
        };

        let history = HistoryConfig {
            key: cli
                .history_key
                .clone()
                .or(file_history.key)
                .unwrap_or_else(|| DEFAULT_HISTORY_KEY.to_string()),
            columns: cli
                .history_columns
                .clone()
                .or(file_history.columns)
                .unwrap_or_else(|| {
                    DEFAULT_HISTORY_COLUMNS
                        .iter()
                        .map(|c| c.to_string())
                        .collect()
                }),
        };

        let chart = ChartConfig {
            key: cli
                .chart_key
                .clone()
                .or(file_chart.key)
                .unwrap_or_else(|| DEFAULT_CHART_KEY.to_string()),
            width: cli
                .chart_width
                .or(file_chart.width)
                .unwrap_or(DEFAULT_CHART_WIDTH),
            height: cli
                .chart_height
                .or(file_chart.height)
                .unwrap_or(DEFAULT_CHART_HEIGHT),
        };

        let format = cli
            .metrics_format
            .or(file_metrics.format)
            .unwrap_or_default();
        let metrics = MetricsDocConfig {
            key: cli
                .metrics_key
                .clone()
                .or(file_metrics.key)
                .unwrap_or_else(|| format.default_key().to_string()),
            format,
        };

        Self {
            profile,
            source,
            store,
            history,
            chart,
            metrics,
            dry_run: cli.dry_run || file_config.dry_run.unwrap_or(false),
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self, variant: Variant) -> Result<()> {
        if self.profile.is_empty() {
            anyhow::bail!(
                "Configuration error: profile is required (--profile or CITESYNC_PROFILE)"
            );
        }

        if self.source.kind == SourceKind::Json
            && self.source.url.is_none()
            && !self.profile.starts_with("http")
        {
            anyhow::bail!(
                "Configuration error: source.url is required for the json source unless the profile is a full URL"
            );
        }

        if self.source.http_timeout_secs == 0 {
            anyhow::bail!("Configuration error: source.http_timeout_secs must be greater than 0");
        }

        if self.store.backend == StorageBackend::S3 {
            match &self.store.s3 {
                Some(s3) if !s3.bucket.trim().is_empty() => {}
                _ => anyhow::bail!(
                    "Configuration error: storage.bucket is required when using the s3 backend (--bucket or CITESYNC_BUCKET)"
                ),
            }
        }

        // The bucket is joined onto the data dir and must stay inside it
        if self.store.backend == StorageBackend::Filesystem
            && !self.store.bucket.is_empty()
            && validate_key(&self.store.bucket).is_err()
        {
            anyhow::bail!(
                "Configuration error: storage.bucket '{}' is not a valid directory name for the filesystem backend",
                self.store.bucket
            );
        }

        match variant {
            Variant::Append => {
                if self.history.key.trim().is_empty() {
                    anyhow::bail!("Configuration error: history.key must not be empty");
                }
                if self.history.columns.is_empty() {
                    anyhow::bail!("Configuration error: history.columns must not be empty");
                }
            }
            Variant::Chart => {
                if self.chart.key.trim().is_empty() {
                    anyhow::bail!("Configuration error: chart.key must not be empty");
                }
                let side_ok = |side: u32| (MIN_CHART_SIDE..=MAX_CHART_SIDE).contains(&side);
                if !side_ok(self.chart.width) || !side_ok(self.chart.height) {
                    anyhow::bail!(
                        "Configuration error: chart.width and chart.height must be between {} and {}",
                        MIN_CHART_SIDE,
                        MAX_CHART_SIDE
                    );
                }
            }
            Variant::Metrics => {
                if self.metrics.key.trim().is_empty() {
                    anyhow::bail!("Configuration error: metrics.key must not be empty");
                }
            }
        }

        Ok(())
    }
}

/// Get the profile config path (~/.citesync/citesync.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
