// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reading instance logs and batch indexes from disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use desim_core::record::{LogKind, LogRecord, ParseRecordError};

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: {source}")]
    Parse {
        path: String,
        line: usize,
        #[source]
        source: ParseRecordError,
    },
    #[error("log contains no init records")]
    NoNodes,
    #[error("log contains no {0} records")]
    NoRecords(&'static str),
    #[error("unparseable {kind} payload at t={time} node={node}")]
    BadPayload {
        kind: &'static str,
        time: u64,
        node: u32,
    },
    #[error("{0} analysis is not implemented")]
    Unimplemented(&'static str),
}

/// Parse a whole instance log.
pub fn read_records(path: &Path) -> Result<Vec<LogRecord>, AnalyzeError> {
    let text = fs::read_to_string(path).map_err(|source| AnalyzeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut records = Vec::with_capacity(text.lines().count());
    for (index, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let record = line.parse().map_err(|source| AnalyzeError::Parse {
            path: path.display().to_string(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    tracing::debug!(path = %path.display(), records = records.len(), "log parsed");
    Ok(records)
}

/// Broadcast times per node, in log order. Init records create entries, so
/// a node that never broadcast still shows up with an empty list.
pub fn broadcast_times(records: &[LogRecord]) -> BTreeMap<u32, Vec<u64>> {
    let mut times: BTreeMap<u32, Vec<u64>> = BTreeMap::new();
    for record in records {
        match record.kind {
            LogKind::Init => {
                times.entry(record.node).or_default();
            }
            LogKind::Broadcast => times.entry(record.node).or_default().push(record.time),
            _ => {}
        }
    }
    times
}

/// Log files listed in `logdir/index.txt`, in index order.
pub fn read_file_list(logdir: &Path) -> Result<Vec<PathBuf>, AnalyzeError> {
    let index = logdir.join("index.txt");
    let text = fs::read_to_string(&index).map_err(|source| AnalyzeError::Io {
        path: index.display().to_string(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| logdir.join(line))
        .collect())
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
