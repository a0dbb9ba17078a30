// =============================================================================
// Application Identity
// =============================================================================

/// Application name (for display, paths and log targets)
pub const APP_NAME: &str = "reqlens";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".reqlens";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "reqlens.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "REQLENS_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "REQLENS_LOG";

// =============================================================================
// Environment Variables - Analysis
// =============================================================================

/// Environment variable for the analytics engine (memory or duckdb)
pub const ENV_ENGINE: &str = "REQLENS_ENGINE";

/// Environment variable for the invalid record policy (fail or skip)
pub const ENV_ON_INVALID_RECORD: &str = "REQLENS_ON_INVALID_RECORD";

/// Environment variable for the performance table row limit
pub const ENV_PERFORMANCE_LIMIT: &str = "REQLENS_PERFORMANCE_LIMIT";

/// Environment variable for the status chart row limit
pub const ENV_STATUS_CHART_LIMIT: &str = "REQLENS_STATUS_CHART_LIMIT";

/// Environment variable for the output format (json or text)
pub const ENV_FORMAT: &str = "REQLENS_FORMAT";

// =============================================================================
// Analysis Defaults
// =============================================================================

/// Maximum rows in the performance analysis (ranked by total time)
pub const DEFAULT_PERFORMANCE_LIMIT: usize = 100;

/// Maximum rows in the status chart (ranked by request volume)
pub const DEFAULT_STATUS_CHART_LIMIT: usize = 10;

/// Original patterns shown per row in the text report
pub const DEFAULT_PATTERN_PREVIEW: usize = 3;

/// Maximum characters of a request shown in the text report
pub const REQUEST_PREVIEW_MAX_LENGTH: usize = 60;

/// Latency percentiles reported per group
pub const PERCENTILE_P95: f64 = 0.95;
pub const PERCENTILE_P99: f64 = 0.99;

// =============================================================================
// Normalization Placeholders
// =============================================================================

/// Replaces every query-string value
pub const PLACEHOLDER_PARAM: &str = ":param";

/// Replaces UUID path segments
pub const PLACEHOLDER_UUID: &str = ":uuid";

/// Replaces numeric path segments
pub const PLACEHOLDER_ID: &str = ":id";

// =============================================================================
// Demo Dataset
// =============================================================================

/// Bundled demo dataset file (under `analyzer/demo/`)
pub const DEMO_DATASET_FILE: &str = "access_logs.json";

// =============================================================================
// DuckDB
// =============================================================================

/// Table holding the records of the current run
pub const DUCKDB_TABLE_ACCESS_LOGS: &str = "access_logs";
