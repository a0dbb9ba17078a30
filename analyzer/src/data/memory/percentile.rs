//! Exact continuous percentiles
//!
//! Linear interpolation between the two closest ranks, the same definition
//! as SQL `PERCENTILE_CONT` / DuckDB `quantile_cont`.

/// Sort latency samples ascending
pub fn sort_samples(samples: &mut [f64]) {
    samples.sort_unstable_by(f64::total_cmp);
}

/// Continuous percentile of `sorted` (ascending) at `p` in `[0, 1]`.
///
/// `rank = p * (n - 1)`; the result interpolates between `sorted[floor(rank)]`
/// and `sorted[ceil(rank)]`. Returns `None` for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (rank.ceil() as usize).min(n - 1);
    let (low, high) = (sorted[lo], sorted[hi]);

    // Interpolation may round past the upper sample
    Some((low + (rank - lo as f64) * (high - low)).clamp(low, high))
}
