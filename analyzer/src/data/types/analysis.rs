//! Analysis result types
//!
//! `GroupSummary` is the contract between an analytics engine and the result
//! assembler: every engine reduces a dataset to one summary per normalized
//! template, and the three output row-sets are projections of those summaries.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Engine output
// ============================================================================

/// Finished statistics for one normalized template
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    /// Normalized template (the grouping key)
    pub request: String,
    pub total_requests: u64,
    pub total_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub avg_time: f64,
    pub p95_time: f64,
    pub p99_time: f64,
    /// Status code -> record count, ascending by code
    pub status_counts: BTreeMap<i64, u64>,
    /// Distinct raw requests that differ from the template, first-seen order
    pub original_patterns: Vec<String>,
}

/// Arithmetic mean kept inside `[min, max]`.
///
/// `sum / count` can land one ulp outside the observed range (three samples
/// of 0.1 average to 0.10000000000000002).
pub fn mean_within(sum: f64, count: u64, min: f64, max: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    (sum / count as f64).clamp(min, max)
}

// ============================================================================
// Output rows
// ============================================================================

/// Per-group latency statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceAnalysis {
    pub request: String,
    pub total_requests: u64,
    pub avg_time: f64,
    pub max_time: f64,
    pub min_time: f64,
    pub p95_time: f64,
    pub p99_time: f64,
    pub total_time: f64,
    pub original_patterns: Vec<String>,
}

/// Record count for one (group, status) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCodeAnalysis {
    pub request: String,
    pub status: i64,
    pub count: u64,
}

/// Status-range breakdown for one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChartData {
    pub request: String,
    pub success: u64,
    pub redirect: u64,
    pub client_error: u64,
    pub server_error: u64,
    pub total: u64,
}

// ============================================================================
// Schema descriptor
// ============================================================================

/// Column type inferred from observed JSON values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InferredType {
    /// Only nulls were observed
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "BOOLEAN")]
    Boolean,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "DOUBLE")]
    Double,
    #[serde(rename = "VARCHAR")]
    Varchar,
    /// Arrays, objects, or incompatible mixes involving them
    #[serde(rename = "JSON")]
    Json,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean => "BOOLEAN",
            Self::BigInt => "BIGINT",
            Self::Double => "DOUBLE",
            Self::Varchar => "VARCHAR",
            Self::Json => "JSON",
        }
    }
}

impl fmt::Display for InferredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    pub inferred_type: InferredType,
    pub nullable: bool,
}

// ============================================================================
// Run output
// ============================================================================

/// Everything one pipeline run publishes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// Analytics engine that produced the groups
    pub engine: String,
    /// Records that reached the accumulator
    pub total_records: u64,
    /// Records dropped by the `skip` invalid-record policy
    pub skipped_records: u64,
    pub group_count: u64,
    pub status_codes: Vec<StatusCodeAnalysis>,
    pub performance: Vec<PerformanceAnalysis>,
    pub status_chart: Vec<StatusChartData>,
    pub schema: Vec<SchemaField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_within_clamps_rounding() {
        let sum = 0.1 + 0.1 + 0.1;
        assert_eq!(mean_within(sum, 3, 0.1, 0.1), 0.1);
    }

    #[test]
    fn test_mean_within_plain_average() {
        assert_eq!(mean_within(6.0, 3, 1.0, 3.0), 2.0);
        assert_eq!(mean_within(0.0, 0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_status_chart_serializes_camel_case() {
        let row = StatusChartData {
            request: "/a".to_string(),
            success: 1,
            redirect: 0,
            client_error: 2,
            server_error: 3,
            total: 6,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["clientError"], 2);
        assert_eq!(json["serverError"], 3);
        assert!(json.get("client_error").is_none());
    }

    #[test]
    fn test_schema_field_serialization() {
        let field = SchemaField {
            name: "request_time".to_string(),
            inferred_type: InferredType::Double,
            nullable: false,
        };
        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(
            json,
            r#"{"name":"request_time","inferredType":"DOUBLE","nullable":false}"#
        );
    }

    #[test]
    fn test_inferred_type_display() {
        assert_eq!(InferredType::BigInt.to_string(), "BIGINT");
        assert_eq!(InferredType::Json.to_string(), "JSON");
    }
}
