use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::AnalysisOptions;
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_PERFORMANCE_LIMIT, DEFAULT_STATUS_CHART_LIMIT,
};

// =============================================================================
// Analytics Backend Enum (in-memory or DuckDB)
// =============================================================================

/// Engine that groups records and computes statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsBackend {
    #[default]
    Memory,
    Duckdb,
}

impl fmt::Display for AnalyticsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsBackend::Memory => write!(f, "memory"),
            AnalyticsBackend::Duckdb => write!(f, "duckdb"),
        }
    }
}

// =============================================================================
// Invalid Record Policy Enum
// =============================================================================

/// What a run does with a record missing `request`, `status` or `request_time`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidRecordPolicy {
    /// Fail the run at the first invalid record
    #[default]
    Fail,
    /// Drop the record, count it and keep going
    Skip,
}

impl fmt::Display for InvalidRecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidRecordPolicy::Fail => write!(f, "fail"),
            InvalidRecordPolicy::Skip => write!(f, "skip"),
        }
    }
}

// =============================================================================
// Output Format Enum
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

// =============================================================================
// File Config
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AnalysisFileConfig {
    pub engine: Option<AnalyticsBackend>,
    pub on_invalid_record: Option<InvalidRecordPolicy>,
    pub performance_limit: Option<usize>,
    pub status_chart_limit: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputFileConfig {
    pub format: Option<OutputFormat>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub analysis: Option<AnalysisFileConfig>,
    pub output: Option<OutputFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
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
        if let Some(analysis) = other.analysis {
            let current = self
                .analysis
                .get_or_insert_with(AnalysisFileConfig::default);
            if analysis.engine.is_some() {
                tracing::trace!(engine = ?analysis.engine, "Merging analysis.engine");
                current.engine = analysis.engine;
            }
            if analysis.on_invalid_record.is_some() {
                tracing::trace!(
                    on_invalid_record = ?analysis.on_invalid_record,
                    "Merging analysis.on_invalid_record"
                );
                current.on_invalid_record = analysis.on_invalid_record;
            }
            if analysis.performance_limit.is_some() {
                current.performance_limit = analysis.performance_limit;
            }
            if analysis.status_chart_limit.is_some() {
                current.status_chart_limit = analysis.status_chart_limit;
            }
        }

        if let Some(output) = other.output {
            let current = self.output.get_or_insert_with(OutputFileConfig::default);
            if output.format.is_some() {
                tracing::trace!(format = ?output.format, "Merging output.format");
                current.format = output.format;
            }
        }
    }
}

// =============================================================================
// Resolved Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub engine: AnalyticsBackend,
    pub on_invalid_record: InvalidRecordPolicy,
    pub performance_limit: usize,
    pub status_chart_limit: usize,
}

impl AnalysisConfig {
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            on_invalid_record: self.on_invalid_record,
            performance_limit: self.performance_limit,
            status_chart_limit: self.status_chart_limit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration: profile file → local or `--config` file → CLI/env
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Profile dir (~/.reqlens/reqlens.json), skipped if absent
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. CLI-specified path OR local directory
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

        Self::from_layers(file_config, cli)
    }

    /// Layer configs: defaults → file config → CLI/env overrides
    fn from_layers(file_config: FileConfig, cli: &CliConfig) -> Result<Self> {
        let file_analysis = file_config.analysis.unwrap_or_default();
        let file_output = file_config.output.unwrap_or_default();

        let engine = cli.engine.or(file_analysis.engine).unwrap_or_default();
        let on_invalid_record = cli
            .on_invalid_record
            .or(file_analysis.on_invalid_record)
            .unwrap_or_default();
        let performance_limit = cli
            .performance_limit
            .or(file_analysis.performance_limit)
            .unwrap_or(DEFAULT_PERFORMANCE_LIMIT);
        let status_chart_limit = cli
            .status_chart_limit
            .or(file_analysis.status_chart_limit)
            .unwrap_or(DEFAULT_STATUS_CHART_LIMIT);
        let format = cli.format.or(file_output.format).unwrap_or_default();

        if performance_limit == 0 {
            anyhow::bail!("analysis.performance_limit must be at least 1");
        }
        if status_chart_limit == 0 {
            anyhow::bail!("analysis.status_chart_limit must be at least 1");
        }

        let config = Self {
            analysis: AnalysisConfig {
                engine,
                on_invalid_record,
                performance_limit,
                status_chart_limit,
            },
            output: OutputConfig { format },
        };
        tracing::debug!(
            engine = %config.analysis.engine,
            on_invalid_record = %config.analysis.on_invalid_record,
            performance_limit,
            status_chart_limit,
            format = %config.output.format,
            "Configuration resolved"
        );
        Ok(config)
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}
