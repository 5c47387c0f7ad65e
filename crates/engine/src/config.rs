// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job simulation configuration.
//!
//! Batch workers may run different algorithms with different alpha values
//! side by side, so nothing here is process-global: every node receives a
//! copy of its job's `SimConfig` at construction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use desim_core::constants::{JITTER, SIMULATION_DURATION};

/// Weight of the corrective pull toward the target share when none is given.
pub const DEFAULT_ALPHA: u32 = 50;

/// The four desynchronization algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    SleepWell,
    Solo,
    Solo2,
    Desync,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::SleepWell => "sleepwell",
            Algorithm::Solo => "solo",
            Algorithm::Solo2 => "solo2",
            Algorithm::Desync => "desync",
        }
    }

    /// SleepWell jumps within the period instead of weighting a pull.
    pub fn uses_alpha(&self) -> bool {
        !matches!(self, Algorithm::SleepWell)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sleepwell" => Ok(Algorithm::SleepWell),
            "solo" => Ok(Algorithm::Solo),
            "solo2" => Ok(Algorithm::Solo2),
            "desync" => Ok(Algorithm::Desync),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown algorithm: {0:?}")]
    UnknownAlgorithm(String),
    #[error("alpha must be in 1..=99, got {0}")]
    AlphaOutOfRange(u32),
    #[error("alpha only applies to solo, solo2, and desync")]
    AlphaUnused,
}

/// Everything a job needs to instantiate its node population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub algorithm: Algorithm,
    /// Corrective weight in percent, 1..=99.
    pub alpha: u32,
    /// Maximum per-re-arm timer perturbation.
    pub jitter: i64,
    /// Simulation horizon.
    pub duration: u64,
}

impl SimConfig {
    pub fn new(algorithm: Algorithm, alpha: Option<u32>) -> Result<Self, ConfigError> {
        if let Some(alpha) = alpha {
            if !algorithm.uses_alpha() {
                return Err(ConfigError::AlphaUnused);
            }
            if !(1..=99).contains(&alpha) {
                return Err(ConfigError::AlphaOutOfRange(alpha));
            }
        }
        Ok(Self {
            algorithm,
            alpha: alpha.unwrap_or(DEFAULT_ALPHA),
            jitter: JITTER,
            duration: SIMULATION_DURATION,
        })
    }

    /// Override the horizon, mainly to keep tests short.
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
