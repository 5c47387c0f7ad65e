// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `desim graph-info` - degree statistics across a graph directory.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use desim_engine::Graph;

use crate::exit_error::ExitError;

use super::read_stems;

#[derive(Args)]
pub struct GraphInfoArgs {
    /// Directory with index.txt naming one graph stem per line
    #[arg(long)]
    pub graph_dir: PathBuf,

    /// Report the maximum degree of each graph
    #[arg(long)]
    pub max_deg: bool,

    /// Report the minimum degree of each graph
    #[arg(long)]
    pub min_deg: bool,
}

pub fn run(args: GraphInfoArgs) -> Result<()> {
    if !args.max_deg && !args.min_deg {
        return Err(ExitError::usage("require at least one of --max-deg, --min-deg").into());
    }
    if !args.graph_dir.is_dir() {
        return Err(
            ExitError::usage(format!("{} does not exist", args.graph_dir.display())).into(),
        );
    }

    // Echo the generating command line when the directory records one.
    let params = args.graph_dir.join("parameters.txt");
    if let Ok(text) = fs::read_to_string(&params) {
        if let Some(line) = text.lines().next() {
            println!("{line}");
        }
    }

    let mut graphs = Vec::new();
    for stem in read_stems(&args.graph_dir)? {
        graphs.push(Graph::load(&args.graph_dir.join(format!("{stem}.txt")))?);
    }

    if args.max_deg {
        let degrees: Vec<f64> = graphs.iter().map(|g| g.max_degree() as f64).collect();
        print_stats("Maximum Degree", &degrees);
    }
    if args.min_deg {
        let degrees: Vec<f64> = graphs.iter().map(|g| g.min_degree() as f64).collect();
        print_stats("Minimum Degree", &degrees);
    }
    Ok(())
}

fn print_stats(name: &str, data: &[f64]) {
    let (mean, std) = mean_std(data);
    println!("{name}\t(avg/std) : {mean:.3} / {std:.3}");
}

fn mean_std(data: &[f64]) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
#[path = "graph_info_tests.rs"]
mod tests;
