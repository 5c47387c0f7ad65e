// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the CLI specs.

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::Command;

/// Mirrors `desim_core::constants::INTERVAL` for synthesized logs.
pub const INTERVAL: u64 = 100_000_000;

pub fn desim() -> Command {
    Command::cargo_bin("desim").expect("desim binary builds")
}

pub struct Run {
    output: Output,
}

pub trait CommandExt {
    fn run_captured(&mut self) -> Run;
    fn passes(&mut self) -> Run;
    fn fails_with(&mut self, code: i32) -> Run;
}

impl CommandExt for Command {
    fn run_captured(&mut self) -> Run {
        Run {
            output: self.output().expect("spawn desim"),
        }
    }

    fn passes(&mut self) -> Run {
        let run = self.run_captured();
        assert!(
            run.output.status.success(),
            "expected success, got {:?}\nstderr: {}",
            run.output.status.code(),
            run.stderr()
        );
        run
    }

    fn fails_with(&mut self, code: i32) -> Run {
        let run = self.run_captured();
        assert_eq!(
            run.output.status.code(),
            Some(code),
            "stdout: {}\nstderr: {}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

impl Run {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(&self, needle: &str) -> &Self {
        assert!(
            self.stdout().contains(needle),
            "stdout missing {needle:?}:\n{}",
            self.stdout()
        );
        self
    }

    pub fn stderr_has(&self, needle: &str) -> &Self {
        assert!(
            self.stderr().contains(needle),
            "stderr missing {needle:?}:\n{}",
            self.stderr()
        );
        self
    }
}

/// Scratch directory holding graph files, seed lists, and output dirs.
pub struct Scratch {
    dir: tempfile::TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create scratch dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn subdir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::create_dir(&path).expect("create subdir");
        path
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> String {
        let path = self.dir.path().join(relative);
        std::fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
    }
}
