// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cumulative distributions over per-instance scalars.

/// Partition `[range_min, range_max]` into `nbins` equal bins and return
/// `(right_edge, cumulative_fraction)` pairs.
///
/// Bins are right-inclusive, so the pair at edge `e` reports the fraction
/// of samples `<= e`. Non-finite samples (non-converged instances) never
/// satisfy that, but still count in the denominator, which is why a CDF
/// over converge times can top out below 1.
pub fn calculate_cdf(
    data: &[f64],
    range_min: f64,
    range_max: f64,
    nbins: usize,
) -> Vec<(f64, f64)> {
    if data.is_empty() || nbins == 0 {
        return Vec::new();
    }
    let width = (range_max - range_min) / nbins as f64;
    (1..=nbins)
        .map(|i| {
            let edge = range_min + width * i as f64;
            let within = data.iter().filter(|&&x| x <= edge).count();
            (edge, within as f64 / data.len() as f64)
        })
        .collect()
}

#[cfg(test)]
#[path = "cdf_tests.rs"]
mod tests;
