// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-instance log records.
//!
//! A log is a sequence of `time,node_id,kind,payload` lines, sorted by
//! `(time, node_id, insertion order)`. The payload is the literal `None`
//! when absent; it may itself contain commas, so parsing splits into at
//! most four fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind tag of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Node exists; emitted at time 0 for every node.
    Init,
    /// The node broadcast a beacon.
    Broadcast,
    /// Slot closed; payload is the relative deficit.
    Deficit,
    /// Offset adjustment; payload is algorithm-specific.
    Adjust,
    /// Neighbor phases observed when a deficit was detected.
    Nmap,
    /// How far short of the target share the node fell.
    Short,
    /// SleepWell abandoned its offset for a random one.
    Reset,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Init => "init",
            LogKind::Broadcast => "broadcast",
            LogKind::Deficit => "deficit",
            LogKind::Adjust => "adjust",
            LogKind::Nmap => "nmap",
            LogKind::Short => "short",
            LogKind::Reset => "reset",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogKind {
    type Err = ParseRecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(LogKind::Init),
            "broadcast" => Ok(LogKind::Broadcast),
            "deficit" => Ok(LogKind::Deficit),
            "adjust" => Ok(LogKind::Adjust),
            "nmap" => Ok(LogKind::Nmap),
            "short" => Ok(LogKind::Short),
            "reset" => Ok(LogKind::Reset),
            other => Err(ParseRecordError::UnknownKind(other.to_string())),
        }
    }
}

/// One log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub time: u64,
    pub node: u32,
    pub kind: LogKind,
    pub payload: Option<String>,
}

impl LogRecord {
    pub fn new(time: u64, node: u32, kind: LogKind) -> Self {
        Self { time, node, kind, payload: None }
    }

    pub fn with_payload(time: u64, node: u32, kind: LogKind, payload: impl Into<String>) -> Self {
        Self { time, node, kind, payload: Some(payload.into()) }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.time,
            self.node,
            self.kind,
            self.payload.as_deref().unwrap_or("None")
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseRecordError {
    #[error("malformed log line: {0:?}")]
    Malformed(String),
    #[error("unknown record kind: {0:?}")]
    UnknownKind(String),
    #[error("invalid number {field} in log line: {line:?}")]
    InvalidNumber { field: &'static str, line: String },
}

impl FromStr for LogRecord {
    type Err = ParseRecordError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.splitn(4, ',');
        let (Some(time), Some(node), Some(kind)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(ParseRecordError::Malformed(line.to_string()));
        };
        let time = time.parse().map_err(|_| ParseRecordError::InvalidNumber {
            field: "time",
            line: line.to_string(),
        })?;
        let node = node.parse().map_err(|_| ParseRecordError::InvalidNumber {
            field: "node_id",
            line: line.to_string(),
        })?;
        let kind = kind.parse()?;
        let payload = match fields.next() {
            None | Some("None") => None,
            Some(p) => Some(p.to_string()),
        };
        Ok(Self { time, node, kind, payload })
    }
}

/// Render records as the on-disk log text, one line per record.
pub fn render_lines(records: &[LogRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
