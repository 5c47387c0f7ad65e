// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod analyze;
pub mod graph_info;
pub mod simulate;

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::exit_error::ExitError;

/// Graph stems listed in `graph_dir/index.txt`, one per line.
pub(crate) fn read_stems(graph_dir: &Path) -> Result<Vec<String>> {
    let index = graph_dir.join("index.txt");
    let text = fs::read_to_string(&index)
        .map_err(|e| ExitError::usage(format!("cannot read {}: {e}", index.display())))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
