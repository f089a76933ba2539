//! Core application

use anyhow::{Context, Result};

use crate::core::cli::{self, CliConfig, Variant};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::data::open_store;
use crate::domain::metrics::build_source;
use crate::domain::{UpdateJob, UpdatePipeline};

pub struct CoreApp {
    pub config: AppConfig,
    pub job: UpdateJob,
    pub pipeline: UpdatePipeline,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    ///
    /// Only configuration and startup problems are returned as errors. A
    /// failed update is logged and the process still exits successfully.
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, variant) = cli::parse();
        tracing::trace!(variant = ?variant, "Parsed command");

        let app = Self::init(&cli_config, variant).await?;
        app.update().await;

        Ok(())
    }

    pub async fn init(cli: &CliConfig, variant: Variant) -> Result<Self> {
        let config = AppConfig::load(cli, variant)?;
        Self::from_config(config, variant).await
    }

    /// Wire the store and source for an already loaded configuration
    pub async fn from_config(config: AppConfig, variant: Variant) -> Result<Self> {
        let store = open_store(&config.store)
            .await
            .context("Failed to initialize object store")?;
        let source =
            build_source(&config.source).context("Failed to initialize metrics source")?;

        let job = UpdateJob::from_config(&config, variant);
        let pipeline =
            UpdatePipeline::new(source, store, config.profile.clone()).dry_run(config.dry_run);

        Ok(Self {
            config,
            job,
            pipeline,
        })
    }

    /// Run the pipeline once and log the outcome; returns whether it succeeded
    pub async fn update(&self) -> bool {
        match self.pipeline.run(&self.job).await {
            Ok(report) => {
                tracing::info!(
                    profile = %self.config.profile,
                    job = report.job,
                    key = %report.key,
                    bytes = report.bytes,
                    rows = ?report.rows,
                    dry_run = report.dry_run,
                    "Update complete"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    profile = %self.config.profile,
                    job = self.job.name(),
                    key = self.job.key(),
                    state = %e.state,
                    error = %e.source,
                    "Update failed"
                );
                false
            }
        }
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}
