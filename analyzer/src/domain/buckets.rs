//! Status-code bucketing and chart ranking

use crate::data::types::{GroupSummary, StatusChartData};

/// Status-code range a response falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Success,
    Redirect,
    ClientError,
    ServerError,
}

impl StatusBucket {
    /// Codes below 200 count as success so every record lands in a bucket
    pub fn of(status: i64) -> Self {
        match status {
            ..300 => Self::Success,
            300..400 => Self::Redirect,
            400..500 => Self::ClientError,
            _ => Self::ServerError,
        }
    }
}

/// Partition a group's status counts into the four chart buckets
pub fn bucket(group: &GroupSummary) -> StatusChartData {
    let mut row = StatusChartData {
        request: group.request.clone(),
        success: 0,
        redirect: 0,
        client_error: 0,
        server_error: 0,
        total: 0,
    };

    for (&status, &count) in &group.status_counts {
        match StatusBucket::of(status) {
            StatusBucket::Success => row.success += count,
            StatusBucket::Redirect => row.redirect += count,
            StatusBucket::ClientError => row.client_error += count,
            StatusBucket::ServerError => row.server_error += count,
        }
    }
    row.total = row.success + row.redirect + row.client_error + row.server_error;
    row
}

/// Bucket every group and keep the `limit` busiest.
///
/// Ordered by `total` descending, ties by template ascending. Groups with no
/// records are dropped.
pub fn top_by_volume(groups: &[GroupSummary], limit: usize) -> Vec<StatusChartData> {
    let mut rows: Vec<StatusChartData> = groups
        .iter()
        .map(bucket)
        .filter(|row| row.total > 0)
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.request.cmp(&b.request)));
    rows.truncate(limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn group(request: &str, statuses: &[(i64, u64)]) -> GroupSummary {
        let status_counts: BTreeMap<i64, u64> = statuses.iter().copied().collect();
        GroupSummary {
            request: request.to_string(),
            total_requests: status_counts.values().sum(),
            total_time: 1.0,
            min_time: 0.1,
            max_time: 0.1,
            avg_time: 0.1,
            p95_time: 0.1,
            p99_time: 0.1,
            status_counts,
            original_patterns: Vec::new(),
        }
    }

    #[test]
    fn test_bucket_ranges() {
        assert_eq!(StatusBucket::of(200), StatusBucket::Success);
        assert_eq!(StatusBucket::of(299), StatusBucket::Success);
        assert_eq!(StatusBucket::of(300), StatusBucket::Redirect);
        assert_eq!(StatusBucket::of(399), StatusBucket::Redirect);
        assert_eq!(StatusBucket::of(400), StatusBucket::ClientError);
        assert_eq!(StatusBucket::of(499), StatusBucket::ClientError);
        assert_eq!(StatusBucket::of(500), StatusBucket::ServerError);
        assert_eq!(StatusBucket::of(999), StatusBucket::ServerError);
    }

    #[test]
    fn test_bucket_below_200_counts_as_success() {
        assert_eq!(StatusBucket::of(101), StatusBucket::Success);
        assert_eq!(StatusBucket::of(0), StatusBucket::Success);
        assert_eq!(StatusBucket::of(-1), StatusBucket::Success);
    }

    #[test]
    fn test_bucket_two_records() {
        let row = bucket(&group("/a", &[(200, 1), (404, 1)]));
        assert_eq!(row.success, 1);
        assert_eq!(row.client_error, 1);
        assert_eq!(row.redirect, 0);
        assert_eq!(row.server_error, 0);
        assert_eq!(row.total, 2);
    }

    #[test]
    fn test_bucket_total_matches_requests() {
        let g = group("/x", &[(100, 2), (204, 3), (302, 1), (418, 4), (503, 5)]);
        let row = bucket(&g);
        assert_eq!(row.total, g.total_requests);
        assert_eq!(row.success, 5);
        assert_eq!(row.server_error, 5);
    }

    #[test]
    fn test_top_by_volume_orders_and_limits() {
        let groups: Vec<GroupSummary> = (0..15)
            .map(|i| group(&format!("/g{:02}", i), &[(200, (i % 5) as u64 + 1)]))
            .collect();
        let rows = top_by_volume(&groups, 10);
        assert_eq!(rows.len(), 10);
        for pair in rows.windows(2) {
            assert!(
                pair[0].total > pair[1].total
                    || (pair[0].total == pair[1].total && pair[0].request < pair[1].request)
            );
        }
        assert_eq!(rows[0].total, 5);
        assert_eq!(rows[0].request, "/g04");
        assert_eq!(rows[1].request, "/g09");
    }

    #[test]
    fn test_top_by_volume_drops_empty_groups() {
        let groups = vec![group("/empty", &[]), group("/full", &[(200, 1)])];
        let rows = top_by_volume(&groups, 10);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].request, "/full");
    }
}
