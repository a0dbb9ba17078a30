//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::cli::{self, Commands};
use crate::core::config::{AppConfig, OutputFormat};
use crate::core::constants::{APP_NAME, ENV_LOG};
use crate::core::report;
use crate::data::AnalyticsService;
use crate::data::types::AnalysisReport;
use crate::domain::ingest::parse_input;
use crate::domain::normalize::{StageStep, normalize_traced};
use crate::domain::schema::infer_schema;
use crate::domain::{PipelineError, Session};
use crate::utils::file::read_input;

pub struct CoreApp {
    pub config: AppConfig,
    pub session: Arc<Session>,
}

/// Where an analysis run takes its records from
enum Source {
    Text(String),
    Demo,
}

#[derive(Serialize)]
struct NormalizedRequest<'a> {
    request: &'a str,
    template: &'a str,
    stages: &'a [StageStep],
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        let config = AppConfig::load(&cli_config)?;

        match command {
            Commands::Normalize { requests, trace } => {
                Self::print_normalized(&requests, trace, config.output.format)
            }
            Commands::Schema { file } => {
                let text = read_input(&file)?;
                Self::print_schema(&text, config.output.format)
            }
            Commands::Analyze { file } => {
                let text = read_input(&file)?;
                let app = Self::init(config)?;
                app.analyze(Source::Text(text)).await
            }
            Commands::Demo => {
                let app = Self::init(config)?;
                app.analyze(Source::Demo).await
            }
        }
    }

    fn init(config: AppConfig) -> Result<Self> {
        let engine = AnalyticsService::init(config.analysis.engine)
            .with_context(|| format!("Failed to initialize {} engine", config.analysis.engine))?;
        tracing::debug!(engine = %engine.backend(), "Analytics engine initialized");

        let session = Arc::new(Session::new(engine, config.analysis.options()));
        Ok(Self { config, session })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // stdout carries the report
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Run one session load on the blocking pool, then print the report
    async fn analyze(self, source: Source) -> Result<()> {
        let session = Arc::clone(&self.session);
        let result: Result<Arc<AnalysisReport>, PipelineError> =
            tokio::task::spawn_blocking(move || match source {
                Source::Text(text) => session.load(&text),
                Source::Demo => session.load_demo(),
            })
            .await
            .context("Analysis task panicked")?;

        if let Err(e) = self.session.close() {
            tracing::warn!(error = %e, "Failed to close analytics engine");
        }

        let analysis = result?;
        let output = match self.config.output.format {
            OutputFormat::Json => report::render_json(&*analysis)?,
            OutputFormat::Text => report::render_text(&analysis),
        };
        println!("{}", output);
        Ok(())
    }

    fn print_schema(text: &str, format: OutputFormat) -> Result<()> {
        let objects = parse_input(text)?;
        let schema = infer_schema(&objects);
        tracing::debug!(records = objects.len(), fields = schema.len(), "Schema inferred");

        let output = match format {
            OutputFormat::Json => report::render_json(&schema)?,
            OutputFormat::Text => report::render_schema_text(&schema),
        };
        println!("{}", output);
        Ok(())
    }

    fn print_normalized(requests: &[String], trace: bool, format: OutputFormat) -> Result<()> {
        let traced: Vec<(&str, Vec<StageStep>)> = requests
            .iter()
            .map(|raw| (raw.as_str(), normalize_traced(raw)))
            .collect();

        let output = match format {
            OutputFormat::Json => {
                let rows: Vec<NormalizedRequest<'_>> = traced
                    .iter()
                    .map(|(raw, steps)| NormalizedRequest {
                        request: *raw,
                        template: steps.last().map(|s| s.output.as_str()).unwrap_or(*raw),
                        stages: if trace { steps.as_slice() } else { &[] },
                    })
                    .collect();
                report::render_json(&rows)?
            }
            OutputFormat::Text => traced
                .iter()
                .map(|(raw, steps)| report::render_normalize_text(raw, steps, trace))
                .collect::<Vec<_>>()
                .join("\n"),
        };
        println!("{}", output);
        Ok(())
    }
}
