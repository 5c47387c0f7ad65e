// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help and usage specs.

use crate::prelude::*;

#[test]
fn no_args_shows_usage_and_exits_two() {
    desim().fails_with(2).stderr_has("Usage:");
}

#[test]
fn help_lists_the_subcommands() {
    desim()
        .arg("--help")
        .passes()
        .stdout_has("simulate")
        .stdout_has("analyze")
        .stdout_has("graph-info");
}

#[test]
fn simulate_help_shows_the_flags() {
    desim()
        .args(["simulate", "--help"])
        .passes()
        .stdout_has("--graph-dir")
        .stdout_has("--seed-list")
        .stdout_has("--algo")
        .stdout_has("--alpha")
        .stdout_has("--outdir");
}

#[test]
fn analyze_help_shows_the_stats() {
    desim()
        .args(["analyze", "--help"])
        .passes()
        .stdout_has("--min-broadcast-count")
        .stdout_has("--converge-time")
        .stdout_has("--deficit");
}

#[test]
fn version_prints() {
    desim().arg("--version").passes().stdout_has("0.2");
}

#[test]
fn unknown_algorithm_exits_two() {
    let scratch = Scratch::new();
    let graph = scratch.file("g.txt", "0 1\n");
    let outdir = scratch.subdir("out");
    desim()
        .arg("simulate")
        .arg("--graph")
        .arg(&graph)
        .arg("--seed")
        .arg("1")
        .arg("--algo")
        .arg("pco")
        .arg("--outdir")
        .arg(&outdir)
        .fails_with(2);
}
