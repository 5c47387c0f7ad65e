// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `desim analyze` - derive scalar metrics from a directory of logs.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, ValueEnum};

use desim_analyze::{
    calculate_cdf, converge_time, max_final_deficit, min_broadcast_count, read_file_list,
    read_records, transient_deficit,
};
use desim_core::constants::SIMULATION_DURATION;

use crate::exit_error::ExitError;

/// Bins for the converge-time distribution.
const CDF_BINS: usize = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
#[command(group = ArgGroup::new("stat")
    .required(true)
    .args(["min_broadcast_count", "converge_time", "deficit"]))]
pub struct AnalyzeArgs {
    /// Directory containing simulation logs and their index.txt
    #[arg(long)]
    pub logdir: PathBuf,

    /// Collect the minimum broadcast count per instance
    #[arg(long)]
    pub min_broadcast_count: bool,

    /// Collect converge times
    #[arg(long)]
    pub converge_time: bool,

    /// Collect deficits
    #[arg(long)]
    pub deficit: bool,

    /// Present the distribution of the stat instead of per-file values
    #[arg(long)]
    pub cdf: bool,

    /// With --deficit: the maximum last-logged deficit
    #[arg(long)]
    pub last: bool,

    /// With --deficit: deficits in the transient phase only
    #[arg(long)]
    pub transient: bool,

    /// Write output here instead of stdout
    #[arg(long)]
    pub outfile: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    validate(&args)?;
    let files = read_file_list(&args.logdir)?;

    let mut values = Vec::with_capacity(files.len());
    for file in &files {
        let records = read_records(file)?;
        let value = if args.min_broadcast_count {
            min_broadcast_count(&records)? as f64
        } else if args.converge_time {
            converge_time(&records, SIMULATION_DURATION)?
        } else if args.transient {
            transient_deficit(&records)?
        } else {
            max_final_deficit(&records)?
        };
        values.push(value);
    }

    let output = if args.cdf {
        let cdf = calculate_cdf(&values, 0.0, SIMULATION_DURATION as f64, CDF_BINS);
        render_cdf(&cdf, args.format)
    } else {
        render_values(&files, &values, args.format)
    };

    match &args.outfile {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{output}"),
    }
    Ok(())
}

fn validate(args: &AnalyzeArgs) -> Result<()> {
    if args.cdf && !args.converge_time {
        return Err(ExitError::usage("--cdf is only used with --converge-time").into());
    }
    if args.deficit && args.last == args.transient {
        return Err(
            ExitError::usage("--deficit requires exactly one of --last or --transient").into(),
        );
    }
    if (args.last || args.transient) && !args.deficit {
        return Err(
            ExitError::usage("--last and --transient only apply to --deficit").into(),
        );
    }
    if !args.logdir.is_dir() {
        return Err(ExitError::usage(format!("{} does not exist", args.logdir.display())).into());
    }
    Ok(())
}

fn render_values(files: &[PathBuf], values: &[f64], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for (file, value) in files.iter().zip(values) {
                out.push_str(&format!("{}\t{}\n", file.display(), value));
            }
            out
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = files
                .iter()
                .zip(values)
                .map(|(file, &value)| {
                    serde_json::json!({
                        "file": file.display().to_string(),
                        "value": json_number(value),
                    })
                })
                .collect();
            pretty(&serde_json::Value::Array(entries))
        }
    }
}

fn render_cdf(cdf: &[(f64, f64)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for &(edge, fraction) in cdf {
                out.push_str(&format!("{edge:.6}\t{fraction:.6}\n"));
            }
            out
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = cdf
                .iter()
                .map(|&(edge, fraction)| {
                    serde_json::json!({ "edge": edge, "fraction": fraction })
                })
                .collect();
            pretty(&serde_json::Value::Array(entries))
        }
    }
}

/// JSON has no infinity; non-converged instances render as a string.
fn json_number(value: f64) -> serde_json::Value {
    if value.is_finite() {
        serde_json::json!(value)
    } else {
        serde_json::json!("inf")
    }
}

fn pretty(value: &serde_json::Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_default();
    out.push('\n');
    out
}

#[cfg(test)]
#[path = "analyze_tests.rs"]
mod tests;
