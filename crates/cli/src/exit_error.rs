// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors that carry a process exit code.
//!
//! Commands return `ExitError` through `anyhow` instead of calling
//! `std::process::exit()` directly; `main()` unwraps it and terminates.
//! Validation failures exit 2. Runtime failures exit 1, and when one comes
//! from a simulation instance it names the `(graph, seed, algo)` job, so a
//! batch failure can be traced to the run that died.

use std::fmt;

use desim_engine::Algorithm;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    /// A CLI validation failure (exit 2).
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: 2,
            message: message.into(),
        }
    }

    /// A failed simulation instance (exit 1), identified by the job that
    /// produced it.
    pub fn instance(graph: &str, seed: u64, algorithm: Algorithm, cause: &anyhow::Error) -> Self {
        Self {
            code: 1,
            message: format!("graph={graph} seed={seed} algo={algorithm}: {cause:#}"),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
