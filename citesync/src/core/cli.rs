use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::{MetricsFormat, SourceKind, StorageBackend};
use super::constants::{
    ENV_BUCKET, ENV_CONFIG, ENV_DATA_DIR, ENV_DRY_RUN, ENV_ENDPOINT, ENV_HTTP_TIMEOUT_SECS,
    ENV_PREFIX, ENV_PROFILE, ENV_REGION, ENV_SOURCE, ENV_SOURCE_URL, ENV_STORAGE,
};

#[derive(Parser)]
#[command(name = "citesync")]
#[command(version, about = "Publish citation metrics to an object store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Profile identifier (Scholar user id, or dashboard id / URL)
    #[arg(long, global = true, env = ENV_PROFILE)]
    pub profile: Option<String>,

    /// Metrics source (scholar or json)
    #[arg(long, global = true, env = ENV_SOURCE, value_parser = parse_source_kind)]
    pub source: Option<SourceKind>,

    /// Base URL of the metrics source
    #[arg(long, global = true, env = ENV_SOURCE_URL)]
    pub source_url: Option<String>,

    /// HTTP timeout for the metrics source, in seconds
    #[arg(long, global = true, env = ENV_HTTP_TIMEOUT_SECS)]
    pub http_timeout_secs: Option<u64>,

    /// Object store backend (s3 or filesystem)
    #[arg(long, global = true, env = ENV_STORAGE, value_parser = parse_storage_backend)]
    pub storage: Option<StorageBackend>,

    /// Destination bucket
    #[arg(long, short = 'b', global = true, env = ENV_BUCKET)]
    pub bucket: Option<String>,

    /// Key prefix inside the bucket
    #[arg(long, global = true, env = ENV_PREFIX)]
    pub prefix: Option<String>,

    /// S3 region
    #[arg(long, global = true, env = ENV_REGION)]
    pub region: Option<String>,

    /// S3-compatible endpoint URL
    #[arg(long, global = true, env = ENV_ENDPOINT)]
    pub endpoint: Option<String>,

    /// Base directory for the filesystem backend
    #[arg(long, global = true, env = ENV_DATA_DIR)]
    pub data_dir: Option<String>,

    /// Fetch and build everything but skip the final write
    #[arg(long, global = true, env = ENV_DRY_RUN)]
    pub dry_run: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

/// Parse source kind from CLI/env string
fn parse_source_kind(s: &str) -> Result<SourceKind, String> {
    match s.to_lowercase().as_str() {
        "scholar" => Ok(SourceKind::Scholar),
        "json" | "dashboard" => Ok(SourceKind::Json),
        _ => Err(format!(
            "Invalid metrics source '{}'. Valid options: scholar, json",
            s
        )),
    }
}

/// Parse storage backend from CLI/env string
fn parse_storage_backend(s: &str) -> Result<StorageBackend, String> {
    match s.to_lowercase().as_str() {
        "filesystem" | "fs" => Ok(StorageBackend::Filesystem),
        "s3" => Ok(StorageBackend::S3),
        _ => Err(format!(
            "Invalid storage backend '{}'. Valid options: filesystem, s3",
            s
        )),
    }
}

/// Parse metrics document format from CLI string
fn parse_metrics_format(s: &str) -> Result<MetricsFormat, String> {
    match s.to_lowercase().as_str() {
        "json" => Ok(MetricsFormat::Json),
        "csv" => Ok(MetricsFormat::Csv),
        _ => Err(format!(
            "Invalid metrics format '{}'. Valid options: json, csv",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Append today's metrics as one row to the cumulative CSV object
    Append {
        /// Object key of the history CSV
        #[arg(long, short = 'k')]
        key: Option<String>,

        /// Metric columns written after the date, comma separated
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,
    },
    /// Render the citations-per-year bar chart and overwrite the image object
    Chart {
        /// Object key of the chart image
        #[arg(long, short = 'k')]
        key: Option<String>,

        /// Image width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Image height in pixels
        #[arg(long)]
        height: Option<u32>,
    },
    /// Write the h-index / citations / i10-index summary document
    Metrics {
        /// Object key of the metrics document
        #[arg(long, short = 'k')]
        key: Option<String>,

        /// Document encoding (json or csv)
        #[arg(long, value_parser = parse_metrics_format)]
        format: Option<MetricsFormat>,
    },
}

/// Which pipeline flavour an invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Append,
    Chart,
    Metrics,
}

impl Commands {
    pub fn variant(&self) -> Variant {
        match self {
            Commands::Append { .. } => Variant::Append,
            Commands::Chart { .. } => Variant::Chart,
            Commands::Metrics { .. } => Variant::Metrics,
        }
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub profile: Option<String>,
    pub source: Option<SourceKind>,
    pub source_url: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub storage: Option<StorageBackend>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub data_dir: Option<String>,
    pub dry_run: bool,
    pub config: Option<PathBuf>,
    pub history_key: Option<String>,
    pub history_columns: Option<Vec<String>>,
    pub chart_key: Option<String>,
    pub chart_width: Option<u32>,
    pub chart_height: Option<u32>,
    pub metrics_key: Option<String>,
    pub metrics_format: Option<MetricsFormat>,
}

/// Parse CLI arguments and return config with the selected variant
pub fn parse() -> (CliConfig, Variant) {
    let cli = Cli::parse();
    let variant = cli.command.variant();

    let mut config = CliConfig {
        profile: cli.profile,
        source: cli.source,
        source_url: cli.source_url,
        http_timeout_secs: cli.http_timeout_secs,
        storage: cli.storage,
        bucket: cli.bucket,
        prefix: cli.prefix,
        region: cli.region,
        endpoint: cli.endpoint,
        data_dir: cli.data_dir,
        dry_run: cli.dry_run,
        config: cli.config,
        ..Default::default()
    };

    match cli.command {
        Commands::Append { key, columns } => {
            config.history_key = key;
            config.history_columns = columns;
        }
        Commands::Chart { key, width, height } => {
            config.chart_key = key;
            config.chart_width = width;
            config.chart_height = height;
        }
        Commands::Metrics { key, format } => {
            config.metrics_key = key;
            config.metrics_format = format;
        }
    }

    (config, variant)
}
