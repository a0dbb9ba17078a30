use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::{AnalyticsBackend, InvalidRecordPolicy, OutputFormat};
use super::constants::{
    ENV_CONFIG, ENV_ENGINE, ENV_FORMAT, ENV_ON_INVALID_RECORD, ENV_PERFORMANCE_LIMIT,
    ENV_STATUS_CHART_LIMIT,
};

#[derive(Parser)]
#[command(name = "reqlens")]
#[command(version, about = "Access-log request normalization and latency analysis", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, short = 'f', global = true, env = ENV_FORMAT, value_parser = parse_output_format)]
    pub format: Option<OutputFormat>,

    /// Analytics engine (memory or duckdb)
    #[arg(long, global = true, env = ENV_ENGINE, value_parser = parse_analytics_backend)]
    pub engine: Option<AnalyticsBackend>,

    /// What to do with records missing request, status or request_time (fail or skip)
    #[arg(long, global = true, env = ENV_ON_INVALID_RECORD, value_parser = parse_invalid_record_policy)]
    pub on_invalid_record: Option<InvalidRecordPolicy>,

    /// Maximum rows in the performance table
    #[arg(long, global = true, env = ENV_PERFORMANCE_LIMIT)]
    pub performance_limit: Option<usize>,

    /// Maximum rows in the status chart
    #[arg(long, global = true, env = ENV_STATUS_CHART_LIMIT)]
    pub status_chart_limit: Option<usize>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Analyze an access log file (JSON array, object or NDJSON; `-` reads stdin)
    Analyze {
        /// Input file
        file: PathBuf,
    },
    /// Analyze the bundled demo dataset
    Demo,
    /// Print the inferred schema of an access log file
    Schema {
        /// Input file
        file: PathBuf,
    },
    /// Show the normalized template of one or more requests
    Normalize {
        /// Raw requests, e.g. /api/user/1/profile?token=abcd
        #[arg(required = true)]
        requests: Vec<String>,

        /// Print the output of every normalization stage
        #[arg(long)]
        trace: bool,
    },
}

/// Parse analytics backend from CLI/env string
fn parse_analytics_backend(s: &str) -> Result<AnalyticsBackend, String> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(AnalyticsBackend::Memory),
        "duckdb" => Ok(AnalyticsBackend::Duckdb),
        _ => Err(format!(
            "Invalid analytics engine '{}'. Valid options: memory, duckdb",
            s
        )),
    }
}

/// Parse invalid record policy from CLI/env string
fn parse_invalid_record_policy(s: &str) -> Result<InvalidRecordPolicy, String> {
    match s.to_lowercase().as_str() {
        "fail" => Ok(InvalidRecordPolicy::Fail),
        "skip" => Ok(InvalidRecordPolicy::Skip),
        _ => Err(format!(
            "Invalid record policy '{}'. Valid options: fail, skip",
            s
        )),
    }
}

/// Parse output format from CLI/env string
fn parse_output_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!(
            "Invalid output format '{}'. Valid options: text, json",
            s
        )),
    }
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub engine: Option<AnalyticsBackend>,
    pub on_invalid_record: Option<InvalidRecordPolicy>,
    pub performance_limit: Option<usize>,
    pub status_chart_limit: Option<usize>,
}

fn split(cli: Cli) -> (CliConfig, Commands) {
    let config = CliConfig {
        config: cli.config,
        format: cli.format,
        engine: cli.engine,
        on_invalid_record: cli.on_invalid_record,
        performance_limit: cli.performance_limit,
        status_chart_limit: cli.status_chart_limit,
    };
    (config, cli.command)
}

pub fn parse() -> (CliConfig, Commands) {
    split(Cli::parse())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> (CliConfig, Commands) {
        split(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_parse_analyze_with_flags() {
        let (config, command) = parse_from(&[
            "reqlens",
            "analyze",
            "logs.json",
            "--engine",
            "DuckDB",
            "--format",
            "json",
            "--performance-limit",
            "25",
        ]);
        assert!(
            matches!(command, Commands::Analyze { ref file } if file == &PathBuf::from("logs.json"))
        );
        assert_eq!(config.engine, Some(AnalyticsBackend::Duckdb));
        assert_eq!(config.format, Some(OutputFormat::Json));
        assert_eq!(config.performance_limit, Some(25));
        assert_eq!(config.status_chart_limit, None);
    }

    #[test]
    fn test_parse_global_flag_before_subcommand() {
        let (config, command) = parse_from(&["reqlens", "--on-invalid-record", "skip", "demo"]);
        assert!(matches!(command, Commands::Demo));
        assert_eq!(config.on_invalid_record, Some(InvalidRecordPolicy::Skip));
    }

    #[test]
    fn test_parse_normalize_requires_requests() {
        assert!(Cli::try_parse_from(["reqlens", "normalize"]).is_err());
        let (_, command) = parse_from(&["reqlens", "normalize", "/a/1", "/b/2", "--trace"]);
        match command {
            Commands::Normalize { requests, trace } => {
                assert_eq!(requests, vec!["/a/1", "/b/2"]);
                assert!(trace);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_value_parsers_reject_unknown() {
        assert!(parse_analytics_backend("clickhouse").is_err());
        assert!(parse_invalid_record_policy("ignore").is_err());
        assert!(parse_output_format("yaml").is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
