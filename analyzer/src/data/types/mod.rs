//! Shared data types for all analytics engines
//!
//! - `records` - typed input records
//! - `analysis` - per-group summaries and the output row-sets

mod analysis;
mod records;

pub use analysis::{
    AnalysisReport, GroupSummary, InferredType, PerformanceAnalysis, SchemaField,
    StatusChartData, StatusCodeAnalysis, mean_within,
};
pub use records::LogRecord;
