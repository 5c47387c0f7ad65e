// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end specs for `desim analyze` over synthesized logs.

use std::fmt::Write as _;
use std::path::Path;

use crate::prelude::*;

/// A log in which every node broadcasts at exact INTERVAL spacing from its
/// offset until the horizon.
fn periodic_log(offsets: &[u64]) -> String {
    let horizon = 100 * INTERVAL;
    let mut lines = Vec::new();
    for (node, _) in offsets.iter().enumerate() {
        lines.push((0u64, node as u32, "init".to_string()));
    }
    for (node, &offset) in offsets.iter().enumerate() {
        let mut t = offset;
        while t < horizon {
            lines.push((t, node as u32, "broadcast".to_string()));
            t += INTERVAL;
        }
    }
    // Stable sort keeps each node's init ahead of a time-zero broadcast.
    lines.sort_by_key(|&(t, node, _)| (t, node));
    let mut out = String::new();
    for (t, node, kind) in lines {
        let _ = writeln!(out, "{t},{node},{kind},None");
    }
    out
}

fn log_dir(scratch: &Scratch, logs: &[(&str, &str)]) -> std::path::PathBuf {
    let dir = scratch.subdir("logs");
    let index: String = logs.iter().map(|(name, _)| format!("{name}\n")).collect();
    scratch.file("logs/index.txt", &index);
    for (name, contents) in logs {
        scratch.file(&format!("logs/{name}"), contents);
    }
    dir
}

fn analyze(logdir: &Path, flags: &[&str]) -> Run {
    let mut cmd = desim();
    cmd.arg("analyze").arg("--logdir").arg(logdir);
    for flag in flags {
        cmd.arg(flag);
    }
    cmd.passes()
}

#[test]
fn min_broadcast_count_reports_one_value_per_file() {
    let scratch = Scratch::new();
    let a = "0,0,init,None\n0,1,init,None\n5,0,broadcast,None\n6,1,broadcast,None\n7,1,broadcast,None\n";
    let b = "0,0,init,None\n5,0,broadcast,None\n";
    let dir = log_dir(&scratch, &[("a.txt", a), ("b.txt", b)]);

    let run = analyze(&dir, &["--min-broadcast-count"]);
    let stdout = run.stdout();
    let values: Vec<&str> = stdout
        .lines()
        .map(|l| l.split('\t').nth(1).expect("value column"))
        .collect();
    assert_eq!(values, vec!["1", "1"]);
}

#[test]
fn converge_time_of_a_perfect_log_is_the_first_broadcast() {
    let scratch = Scratch::new();
    let offset = 3 * INTERVAL / 7;
    let log = periodic_log(&[offset]);
    let dir = log_dir(&scratch, &[("a.txt", &log)]);

    let run = analyze(&dir, &["--converge-time"]);
    let stdout = run.stdout();
    let value = stdout.split_whitespace().last().expect("a value");
    assert_eq!(value, &offset.to_string());
}

#[test]
fn converge_time_reports_inf_for_a_silent_node() {
    let scratch = Scratch::new();
    // The node's last broadcast sits a single interval in: far short of the
    // horizon, so its clean gap does not matter.
    let log = format!(
        "0,0,init,None\n0,0,broadcast,None\n{INTERVAL},0,broadcast,None\n"
    );
    let dir = log_dir(&scratch, &[("a.txt", &log)]);

    let run = analyze(&dir, &["--converge-time"]);
    run.stdout_has("inf");
}

#[test]
fn converge_time_cdf_has_twenty_monotone_rows() {
    let scratch = Scratch::new();
    let a = periodic_log(&[0]);
    let b = periodic_log(&[INTERVAL / 2]);
    let dir = log_dir(&scratch, &[("a.txt", &a), ("b.txt", &b)]);

    let run = analyze(&dir, &["--converge-time", "--cdf"]);
    let stdout = run.stdout();
    let rows: Vec<(f64, f64)> = stdout
        .lines()
        .map(|l| {
            let mut cols = l.split('\t');
            let edge = cols.next().expect("edge").parse().expect("edge number");
            let frac = cols.next().expect("fraction").parse().expect("fraction number");
            (edge, frac)
        })
        .collect();
    assert_eq!(rows.len(), 20);
    assert!(rows.windows(2).all(|w| w[0].1 <= w[1].1));
    assert_eq!(rows.last().map(|&(_, f)| f), Some(1.0));
}

#[test]
fn last_deficit_reports_the_maximum() {
    let scratch = Scratch::new();
    let log = "0,0,init,None\n0,1,init,None\n\
               10,0,deficit,0.75\n20,0,deficit,0.25\n30,1,deficit,0.5\n";
    let dir = log_dir(&scratch, &[("a.txt", log)]);

    let run = analyze(&dir, &["--deficit", "--last"]);
    run.stdout_has("0.5");
}

#[test]
fn transient_deficit_is_a_runtime_failure() {
    let scratch = Scratch::new();
    let dir = log_dir(&scratch, &[("a.txt", "0,0,init,None\n")]);

    desim()
        .arg("analyze")
        .arg("--logdir")
        .arg(&dir)
        .arg("--deficit")
        .arg("--transient")
        .fails_with(1)
        .stderr_has("not implemented");
}

#[test]
fn cdf_without_converge_time_exits_two() {
    let scratch = Scratch::new();
    let dir = log_dir(&scratch, &[("a.txt", "0,0,init,None\n")]);

    desim()
        .arg("analyze")
        .arg("--logdir")
        .arg(&dir)
        .arg("--min-broadcast-count")
        .arg("--cdf")
        .fails_with(2);
}

#[test]
fn missing_logdir_exits_two() {
    desim()
        .arg("analyze")
        .arg("--logdir")
        .arg("/nonexistent/logs")
        .arg("--converge-time")
        .fails_with(2);
}

#[test]
fn outfile_receives_the_report() {
    let scratch = Scratch::new();
    let log = periodic_log(&[0]);
    let dir = log_dir(&scratch, &[("a.txt", &log)]);
    let outfile = scratch.path().join("report.txt");

    desim()
        .arg("analyze")
        .arg("--logdir")
        .arg(&dir)
        .arg("--converge-time")
        .arg("--outfile")
        .arg(&outfile)
        .passes();
    assert!(scratch.read("report.txt").contains("a.txt\t0"));
}

#[test]
fn json_format_emits_file_value_pairs() {
    let scratch = Scratch::new();
    let log = periodic_log(&[0]);
    let dir = log_dir(&scratch, &[("a.txt", &log)]);

    let run = analyze(&dir, &["--converge-time", "--format", "json"]);
    let parsed: serde_json::Value =
        serde_json::from_str(&run.stdout()).expect("valid json");
    assert_eq!(parsed[0]["value"], serde_json::json!(0.0));
    assert!(parsed[0]["file"]
        .as_str()
        .expect("file string")
        .ends_with("a.txt"));
}
