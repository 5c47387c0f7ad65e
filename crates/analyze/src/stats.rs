// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scalar metrics over one instance log.
//!
//! Non-convergence is not an error: `converge_time` reports it as
//! `f64::INFINITY`, which renders as `inf` and falls outside every CDF bin.

use std::collections::BTreeMap;

use desim_core::constants::{CONVERGENCE_TOLERANCE, INTERVAL};
use desim_core::record::{LogKind, LogRecord};

use crate::log::{broadcast_times, AnalyzeError};

/// Minimum number of broadcasts any node managed.
pub fn min_broadcast_count(records: &[LogRecord]) -> Result<u64, AnalyzeError> {
    broadcast_times(records)
        .values()
        .map(|times| times.len() as u64)
        .min()
        .ok_or(AnalyzeError::NoNodes)
}

/// Time at which the instance settled into a steady schedule: the maximum
/// over nodes of the start of each node's final converged streak.
pub fn converge_time(records: &[LogRecord], horizon: u64) -> Result<f64, AnalyzeError> {
    let broadcasts = broadcast_times(records);
    if broadcasts.is_empty() {
        return Err(AnalyzeError::NoNodes);
    }
    Ok(broadcasts
        .values()
        .map(|times| node_converge_time(times, horizon))
        .fold(0.0, f64::max))
}

fn node_converge_time(times: &[u64], horizon: u64) -> f64 {
    let Some(&last) = times.last() else {
        return f64::INFINITY;
    };
    // A node that stopped broadcasting before the final interval never
    // converged, whatever its earlier gaps looked like.
    if last < horizon.saturating_sub(INTERVAL) {
        return f64::INFINITY;
    }
    let errors: Vec<f64> = times
        .windows(2)
        .map(|w| ((w[1] - w[0]) as f64 - INTERVAL as f64).abs() / INTERVAL as f64)
        .collect();
    match errors.iter().rposition(|&e| e > CONVERGENCE_TOLERANCE) {
        // Every gap converged: steady since the first broadcast.
        None => times[0] as f64,
        Some(i) if i + 1 == errors.len() => f64::INFINITY,
        Some(i) => times[i + 1] as f64,
    }
}

/// Maximum over nodes of each node's last logged deficit.
pub fn max_final_deficit(records: &[LogRecord]) -> Result<f64, AnalyzeError> {
    let mut last: BTreeMap<u32, f64> = BTreeMap::new();
    for record in records {
        if record.kind != LogKind::Deficit {
            continue;
        }
        let value = record
            .payload
            .as_deref()
            .and_then(|p| p.parse::<f64>().ok())
            .ok_or(AnalyzeError::BadPayload {
                kind: "deficit",
                time: record.time,
                node: record.node,
            })?;
        last.insert(record.node, value);
    }
    last.values()
        .copied()
        .reduce(f64::max)
        .ok_or(AnalyzeError::NoRecords("deficit"))
}

/// Deficit statistics restricted to the transient phase.
///
/// The intended semantics were never written down; until they are, this
/// stays a stub.
pub fn transient_deficit(_records: &[LogRecord]) -> Result<f64, AnalyzeError> {
    Err(AnalyzeError::Unimplemented("transient deficit"))
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
