//! Per-template running statistics

use std::collections::BTreeMap;

use rustc_hash::{FxHashMap, FxHashSet};

use super::percentile::{percentile, sort_samples};
use crate::core::constants::{PERCENTILE_P95, PERCENTILE_P99};
use crate::data::types::{GroupSummary, LogRecord, mean_within};
use crate::domain::normalize::normalize;

/// Records sharing one normalized template
#[derive(Debug, Default, Clone)]
pub struct NormalizedGroup {
    latencies: Vec<f64>,
    status_counts: BTreeMap<i64, u64>,
    original_patterns: Vec<String>,
    seen_patterns: FxHashSet<String>,
}

impl NormalizedGroup {
    fn add(&mut self, template: &str, record: &LogRecord) {
        self.latencies.push(record.request_time);
        *self.status_counts.entry(record.status).or_insert(0) += 1;

        if record.request != template && !self.seen_patterns.contains(&record.request) {
            self.seen_patterns.insert(record.request.clone());
            self.original_patterns.push(record.request.clone());
        }
    }

    pub fn record_count(&self) -> u64 {
        self.latencies.len() as u64
    }

    pub fn status_counts(&self) -> &BTreeMap<i64, u64> {
        &self.status_counts
    }

    pub fn original_patterns(&self) -> &[String] {
        &self.original_patterns
    }

    /// Reduce the group to its final statistics
    pub fn summarize(&self, template: &str) -> Option<GroupSummary> {
        let mut sorted = self.latencies.clone();
        sort_samples(&mut sorted);

        let min_time = *sorted.first()?;
        let max_time = *sorted.last()?;
        let total_time: f64 = sorted.iter().sum();
        let total_requests = sorted.len() as u64;

        Some(GroupSummary {
            request: template.to_string(),
            total_requests,
            total_time,
            min_time,
            max_time,
            avg_time: mean_within(total_time, total_requests, min_time, max_time),
            p95_time: percentile(&sorted, PERCENTILE_P95)?,
            p99_time: percentile(&sorted, PERCENTILE_P99)?,
            status_counts: self.status_counts.clone(),
            original_patterns: self.original_patterns.clone(),
        })
    }
}

/// Keyed store mapping a normalized template to its group
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    groups: FxHashMap<String, NormalizedGroup>,
    records: u64,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the group of its normalized template.
    ///
    /// Returns the template the record was grouped under.
    pub fn ingest(&mut self, record: &LogRecord) -> String {
        let template = normalize(&record.request);
        self.groups
            .entry(template.clone())
            .or_default()
            .add(&template, record);
        self.records += 1;
        template
    }

    pub fn ingest_all<'a>(&mut self, records: impl IntoIterator<Item = &'a LogRecord>) {
        for record in records {
            self.ingest(record);
        }
    }

    pub fn group(&self, template: &str) -> Option<&NormalizedGroup> {
        self.groups.get(template)
    }

    /// Number of distinct templates
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Records ingested across all groups
    pub fn record_count(&self) -> u64 {
        self.records
    }

    /// Final statistics for every group, ordered by template
    pub fn summarize(&self) -> Vec<GroupSummary> {
        let mut summaries: Vec<GroupSummary> = self
            .groups
            .iter()
            .filter_map(|(template, group)| group.summarize(template))
            .collect();
        summaries.sort_by(|a, b| a.request.cmp(&b.request));
        summaries
    }
}
