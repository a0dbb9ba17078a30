//! Result assembly
//!
//! Projects finished group summaries into the three output row-sets, each
//! with its own ordering and truncation.

use super::buckets;
use crate::core::constants::{DEFAULT_PERFORMANCE_LIMIT, DEFAULT_STATUS_CHART_LIMIT};
use crate::data::types::{
    AnalysisReport, GroupSummary, PerformanceAnalysis, SchemaField, StatusChartData,
    StatusCodeAnalysis,
};

/// Run counters carried into the report
#[derive(Debug, Clone, Default)]
pub struct RunMetadata {
    pub engine: String,
    pub total_records: u64,
    pub skipped_records: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultAssembler {
    pub performance_limit: usize,
    pub status_chart_limit: usize,
}

impl Default for ResultAssembler {
    fn default() -> Self {
        Self {
            performance_limit: DEFAULT_PERFORMANCE_LIMIT,
            status_chart_limit: DEFAULT_STATUS_CHART_LIMIT,
        }
    }
}

impl ResultAssembler {
    pub fn new(performance_limit: usize, status_chart_limit: usize) -> Self {
        Self {
            performance_limit,
            status_chart_limit,
        }
    }

    /// One row per (group, status) with a nonzero count, by template then status
    pub fn status_code_rows(&self, groups: &[GroupSummary]) -> Vec<StatusCodeAnalysis> {
        let mut rows: Vec<StatusCodeAnalysis> = groups
            .iter()
            .flat_map(|g| {
                g.status_counts
                    .iter()
                    .filter(|&(_, &count)| count > 0)
                    .map(|(&status, &count)| StatusCodeAnalysis {
                        request: g.request.clone(),
                        status,
                        count,
                    })
            })
            .collect();
        rows.sort_by(|a, b| a.request.cmp(&b.request).then(a.status.cmp(&b.status)));
        rows
    }

    /// Slowest groups by cumulative time, ties by template
    pub fn performance_rows(&self, groups: &[GroupSummary]) -> Vec<PerformanceAnalysis> {
        let mut ranked: Vec<&GroupSummary> = groups.iter().collect();
        ranked.sort_by(|a, b| {
            b.total_time
                .total_cmp(&a.total_time)
                .then_with(|| a.request.cmp(&b.request))
        });

        ranked
            .into_iter()
            .take(self.performance_limit)
            .map(|g| PerformanceAnalysis {
                request: g.request.clone(),
                total_requests: g.total_requests,
                avg_time: g.avg_time,
                max_time: g.max_time,
                min_time: g.min_time,
                p95_time: g.p95_time,
                p99_time: g.p99_time,
                total_time: g.total_time,
                original_patterns: g.original_patterns.clone(),
            })
            .collect()
    }

    pub fn status_chart_rows(&self, groups: &[GroupSummary]) -> Vec<StatusChartData> {
        buckets::top_by_volume(groups, self.status_chart_limit)
    }

    /// Build the full report for one run
    pub fn assemble(
        &self,
        groups: &[GroupSummary],
        schema: Vec<SchemaField>,
        meta: RunMetadata,
    ) -> AnalysisReport {
        AnalysisReport {
            engine: meta.engine,
            total_records: meta.total_records,
            skipped_records: meta.skipped_records,
            group_count: groups.len() as u64,
            status_codes: self.status_code_rows(groups),
            performance: self.performance_rows(groups),
            status_chart: self.status_chart_rows(groups),
            schema,
        }
    }
}
