// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs for `desim simulate`.

use std::path::Path;

use crate::prelude::*;

const TRIANGLE: &str = "0 1 2\n1 2\n";

fn simulate(graph: &Path, seed: u64, algo: &str, outdir: &Path) -> Run {
    desim()
        .arg("simulate")
        .arg("--graph")
        .arg(graph)
        .arg("--seed")
        .arg(seed.to_string())
        .arg("--algo")
        .arg(algo)
        .arg("--outdir")
        .arg(outdir)
        .passes()
}

#[test]
fn single_instance_writes_log_parameters_and_index() {
    let scratch = Scratch::new();
    let graph = scratch.file("triangle.txt", TRIANGLE);
    let outdir = scratch.subdir("out");
    simulate(&graph, 7, "sleepwell", &outdir);

    let log = scratch.read("out/graph-triangle-seed-7.txt");
    let mut lines = log.lines();
    assert_eq!(lines.next(), Some("0,0,init,None"));
    assert_eq!(lines.next(), Some("0,1,init,None"));
    assert_eq!(lines.next(), Some("0,2,init,None"));
    assert!(log.lines().any(|l| l.contains(",broadcast,")));

    assert_eq!(scratch.read("out/index.txt"), "graph-triangle-seed-7.txt\n");
    assert!(scratch.read("out/parameters.txt").contains("--algo sleepwell"));
}

#[test]
fn runs_are_deterministic() {
    let scratch = Scratch::new();
    let graph = scratch.file("triangle.txt", TRIANGLE);
    let first = scratch.subdir("a");
    let second = scratch.subdir("b");

    for algo in ["sleepwell", "solo", "solo2", "desync"] {
        for out in [&first, &second] {
            let outdir = out.join(algo);
            std::fs::create_dir(&outdir).expect("create outdir");
            simulate(&graph, 42, algo, &outdir);
        }
        let a = scratch.read(format!("a/{algo}/graph-triangle-seed-42.txt"));
        let b = scratch.read(format!("b/{algo}/graph-triangle-seed-42.txt"));
        assert_eq!(a, b, "{algo} diverged between identical runs");
    }
}

#[test]
fn occupied_outdir_exits_two() {
    let scratch = Scratch::new();
    let graph = scratch.file("g.txt", TRIANGLE);
    let outdir = scratch.subdir("out");
    scratch.file("out/leftover.txt", "x");

    desim()
        .arg("simulate")
        .arg("--graph")
        .arg(&graph)
        .arg("--seed")
        .arg("1")
        .arg("--algo")
        .arg("solo")
        .arg("--outdir")
        .arg(&outdir)
        .fails_with(2)
        .stderr_has("not empty");
}

#[test]
fn alpha_with_sleepwell_exits_two() {
    let scratch = Scratch::new();
    let graph = scratch.file("g.txt", TRIANGLE);
    let outdir = scratch.subdir("out");

    desim()
        .arg("simulate")
        .arg("--graph")
        .arg(&graph)
        .arg("--seed")
        .arg("1")
        .arg("--algo")
        .arg("sleepwell")
        .arg("--alpha")
        .arg("50")
        .arg("--outdir")
        .arg(&outdir)
        .fails_with(2)
        .stderr_has("alpha");
}

#[test]
fn missing_graph_file_exits_one() {
    let scratch = Scratch::new();
    let outdir = scratch.subdir("out");
    desim()
        .arg("simulate")
        .arg("--graph")
        .arg("/nonexistent/graph.txt")
        .arg("--seed")
        .arg("1")
        .arg("--algo")
        .arg("solo")
        .arg("--outdir")
        .arg(&outdir)
        .fails_with(1)
        .stderr_has("graph=")
        .stderr_has("seed=1");
}

#[test]
fn batch_covers_the_cross_product_in_order() {
    let scratch = Scratch::new();
    let graphs = scratch.subdir("graphs");
    scratch.file("graphs/index.txt", "0\n1\n");
    scratch.file("graphs/0.txt", TRIANGLE);
    scratch.file("graphs/1.txt", "0 1\n");
    let seeds = scratch.file("seeds.txt", "3\n5\n");
    let outdir = scratch.subdir("out");

    desim()
        .arg("simulate")
        .arg("--graph-dir")
        .arg(&graphs)
        .arg("--seed-list")
        .arg(&seeds)
        .arg("--algo")
        .arg("desync")
        .arg("--alpha")
        .arg("30")
        .arg("--outdir")
        .arg(&outdir)
        .arg("--workers")
        .arg("2")
        .passes();

    assert_eq!(
        scratch.read("out/index.txt"),
        "graph-0-seed-3.txt\ngraph-0-seed-5.txt\ngraph-1-seed-3.txt\ngraph-1-seed-5.txt\n"
    );
    for name in ["graph-0-seed-3", "graph-0-seed-5", "graph-1-seed-3", "graph-1-seed-5"] {
        let log = scratch.read(format!("out/{name}.txt"));
        assert!(log.starts_with("0,0,init,None\n"), "{name} lacks init");
    }
}

#[test]
fn failed_batch_keeps_partial_results_but_no_index() {
    let scratch = Scratch::new();
    let graphs = scratch.subdir("graphs");
    // Graph 0 is listed first but its file is missing; graph 1, dispatched
    // after the failing job, must still run to completion.
    scratch.file("graphs/index.txt", "0\n1\n");
    scratch.file("graphs/1.txt", TRIANGLE);
    let outdir = scratch.subdir("out");

    desim()
        .arg("simulate")
        .arg("--graph-dir")
        .arg(&graphs)
        .arg("--seed")
        .arg("3")
        .arg("--algo")
        .arg("solo")
        .arg("--outdir")
        .arg(&outdir)
        .fails_with(1)
        .stderr_has("graph=0")
        .stderr_has("seed=3")
        .stderr_has("algo=solo");

    let survivor = scratch.read("out/graph-1-seed-3.txt");
    assert!(survivor.starts_with("0,0,init,None\n"));
    assert!(survivor.lines().any(|l| l.contains(",broadcast,")));
    assert!(!outdir.join("index.txt").exists());
}

#[test]
fn single_node_desync_converges_within_one_interval() {
    let scratch = Scratch::new();
    let graph = scratch.file("lonely.txt", "0\n");
    let outdir = scratch.subdir("out");
    simulate(&graph, 0, "desync", &outdir);

    let run = desim()
        .arg("analyze")
        .arg("--logdir")
        .arg(&outdir)
        .arg("--converge-time")
        .passes();
    let stdout = run.stdout();
    let value: f64 = stdout
        .split_whitespace()
        .last()
        .expect("a value")
        .parse()
        .expect("numeric converge time");
    assert!(value <= INTERVAL as f64, "converged at {value}");
}
