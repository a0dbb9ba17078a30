//! DuckDB schema definitions
//!
//! One table per run. `seq` preserves input order so first-seen ordering of
//! original patterns survives the set-based aggregation.

/// Table for the records of the current run
pub const SCHEMA: &str = r#"
CREATE TABLE access_logs (
    seq             BIGINT NOT NULL,    -- Input position (0-based)
    request         VARCHAR NOT NULL,   -- Raw request as logged
    template        VARCHAR NOT NULL,   -- Normalized grouping key
    status          BIGINT NOT NULL,    -- HTTP status code
    request_time    DOUBLE NOT NULL     -- Seconds
);
"#;

/// Drops the previous run's table
pub const DROP_SCHEMA: &str = "DROP TABLE IF EXISTS access_logs;";
