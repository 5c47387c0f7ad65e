// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `desim simulate` - run one instance or fan a graph x seed batch across a
//! worker pool.
//!
//! Workers share nothing: every job loads its own graph, builds its own
//! node population, and owns exactly one open log file. A failing job
//! aborts the batch; logs already written stay on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tokio::sync::Semaphore;

use desim_engine::{run_instance, Algorithm, Graph, SimConfig};

use crate::exit_error::ExitError;

use super::read_stems;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AlgoArg {
    Sleepwell,
    Solo,
    Solo2,
    Desync,
}

impl From<AlgoArg> for Algorithm {
    fn from(arg: AlgoArg) -> Self {
        match arg {
            AlgoArg::Sleepwell => Algorithm::SleepWell,
            AlgoArg::Solo => Algorithm::Solo,
            AlgoArg::Solo2 => Algorithm::Solo2,
            AlgoArg::Desync => Algorithm::Desync,
        }
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Directory with index.txt naming one graph stem per line
    #[arg(long, conflicts_with = "graph", required_unless_present = "graph")]
    pub graph_dir: Option<PathBuf>,

    /// Single adjacency-list file
    #[arg(long)]
    pub graph: Option<PathBuf>,

    /// File with one integer seed per line
    #[arg(long, conflicts_with = "seed", required_unless_present = "seed")]
    pub seed_list: Option<PathBuf>,

    /// Seed for initial offsets and timer jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Algorithm to simulate
    #[arg(long, value_enum)]
    pub algo: AlgoArg,

    /// Corrective weight in percent for solo, solo2, and desync
    #[arg(long)]
    pub alpha: Option<u32>,

    /// Output directory; must exist and be empty
    #[arg(long)]
    pub outdir: PathBuf,

    /// Worker pool size for batches
    #[arg(long, default_value_t = 8)]
    pub workers: usize,
}

/// One `(graph, seed)` pair of the batch cross product.
#[derive(Debug, Clone)]
struct Job {
    graph_file: PathBuf,
    stem: String,
    seed: u64,
}

impl Job {
    fn log_name(&self) -> String {
        format!("graph-{}-seed-{}.txt", self.stem, self.seed)
    }
}

pub async fn run(args: SimulateArgs) -> Result<()> {
    validate_outdir(&args.outdir)?;
    let config = SimConfig::new(args.algo.into(), args.alpha)
        .map_err(|e| ExitError::usage(e.to_string()))?;
    let seeds = collect_seeds(&args)?;
    let jobs = collect_jobs(&args, &seeds)?;

    save_parameters(&args.outdir)?;

    let started = Instant::now();
    run_batch(&jobs, config, &args.outdir, args.workers).await?;
    write_index(&args.outdir, &jobs)?;
    tracing::info!(
        jobs = jobs.len(),
        algo = %config.algorithm,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch complete"
    );
    Ok(())
}

fn validate_outdir(outdir: &Path) -> Result<()> {
    if !outdir.is_dir() {
        return Err(ExitError::usage(format!("{} does not exist", outdir.display())).into());
    }
    let mut entries = fs::read_dir(outdir)
        .map_err(|e| ExitError::usage(format!("cannot read {}: {e}", outdir.display())))?;
    if entries.next().is_some() {
        return Err(ExitError::usage(format!("{} is not empty", outdir.display())).into());
    }
    Ok(())
}

fn collect_seeds(args: &SimulateArgs) -> Result<Vec<u64>> {
    if let Some(path) = &args.seed_list {
        let text = fs::read_to_string(path)
            .map_err(|e| ExitError::usage(format!("cannot read {}: {e}", path.display())))?;
        let mut seeds = Vec::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let seed = line.parse().map_err(|_| {
                ExitError::usage(format!("bad seed {line:?} in {}", path.display()))
            })?;
            seeds.push(seed);
        }
        if seeds.is_empty() {
            return Err(ExitError::usage(format!("{} lists no seeds", path.display())).into());
        }
        Ok(seeds)
    } else {
        let seed = args
            .seed
            .ok_or_else(|| ExitError::usage("one of --seed or --seed-list is required"))?;
        Ok(vec![seed])
    }
}

/// Enumerate jobs graph-major, seed-minor; the output index keeps this
/// order.
fn collect_jobs(args: &SimulateArgs, seeds: &[u64]) -> Result<Vec<Job>> {
    let mut graphs = Vec::new();
    if let Some(dir) = &args.graph_dir {
        for stem in read_stems(dir)? {
            graphs.push((dir.join(format!("{stem}.txt")), stem));
        }
        if graphs.is_empty() {
            return Err(
                ExitError::usage(format!("{} lists no graphs", dir.display())).into(),
            );
        }
    } else if let Some(file) = &args.graph {
        let stem = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "graph".to_string());
        graphs.push((file.clone(), stem));
    } else {
        return Err(ExitError::usage("one of --graph or --graph-dir is required").into());
    }

    let mut jobs = Vec::with_capacity(graphs.len() * seeds.len());
    for (graph_file, stem) in &graphs {
        for &seed in seeds {
            jobs.push(Job {
                graph_file: graph_file.clone(),
                stem: stem.clone(),
                seed,
            });
        }
    }
    Ok(jobs)
}

/// Record the invocation command line alongside the logs it produced.
fn save_parameters(outdir: &Path) -> Result<()> {
    let parameters: Vec<String> = std::env::args().skip(1).collect();
    let path = outdir.join("parameters.txt");
    fs::write(&path, parameters.join(" ") + "\n")
        .with_context(|| format!("cannot write {}", path.display()))
}

async fn run_batch(jobs: &[Job], config: SimConfig, outdir: &Path, workers: usize) -> Result<()> {
    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut handles = Vec::with_capacity(jobs.len());
    for job in jobs {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("worker pool closed")?;
        let job = job.clone();
        let outdir = outdir.to_path_buf();
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            run_job(&job, config, &outdir)
        }));
    }

    // Every dispatched job runs to completion before the batch reports: a
    // failure aborts the batch, never an instance already in flight, and
    // finished logs stay on disk.
    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await);
    }
    for (job, outcome) in jobs.iter().zip(outcomes) {
        if let Err(cause) = outcome.context("worker panicked")? {
            return Err(
                ExitError::instance(&job.stem, job.seed, config.algorithm, &cause).into(),
            );
        }
    }
    Ok(())
}

fn run_job(job: &Job, config: SimConfig, outdir: &Path) -> Result<()> {
    let started = Instant::now();
    let graph = Graph::load(&job.graph_file)?;
    let log = run_instance(&graph, config, job.seed)?;

    let path = outdir.join(job.log_name());
    fs::write(&path, &log).with_context(|| format!("cannot write {}", path.display()))?;

    tracing::info!(
        graph = %job.stem,
        seed = job.seed,
        records = log.lines().count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "instance complete"
    );
    Ok(())
}

fn write_index(outdir: &Path, jobs: &[Job]) -> Result<()> {
    let names: Vec<String> = jobs.iter().map(Job::log_name).collect();
    let path = outdir.join("index.txt");
    fs::write(&path, names.join("\n") + "\n")
        .with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
#[path = "simulate_tests.rs"]
mod tests;
