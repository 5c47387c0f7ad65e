// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Undirected graphs from adjacency-list files.
//!
//! File format: `#`-prefixed comment lines, otherwise whitespace-separated
//! tokens where the first is a node label and the rest are neighbor labels
//! for edges not yet emitted. Labels are relabelled to `0..N-1` in sorted
//! lexicographic order so identifiers are stable across runs.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("cannot read graph file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("graph file {0} contains no nodes")]
    Empty(String),
}

/// An undirected graph with contiguous integer node ids.
#[derive(Debug, Clone)]
pub struct Graph {
    adj: Vec<Vec<u32>>,
    labels: Vec<String>,
}

impl Graph {
    /// Parse adjacency-list text. The source name is only used in errors.
    pub fn from_adjacency(text: &str, source: &str) -> Result<Self, GraphError> {
        let mut neighbors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let Some(node) = tokens.next() else {
                continue;
            };
            neighbors.entry(node).or_default();
            for peer in tokens {
                neighbors.entry(peer).or_default();
                if peer != node {
                    neighbors.entry(node).or_default().insert(peer);
                    neighbors.entry(peer).or_default().insert(node);
                }
            }
        }
        if neighbors.is_empty() {
            return Err(GraphError::Empty(source.to_string()));
        }

        // BTreeMap iteration gives the lexicographic label order.
        let labels: Vec<String> = neighbors.keys().map(|l| l.to_string()).collect();
        let index: BTreeMap<&str, u32> = neighbors
            .keys()
            .enumerate()
            .map(|(i, &l)| (l, i as u32))
            .collect();
        let adj = neighbors
            .values()
            .map(|peers| {
                let mut ids: Vec<u32> = peers.iter().filter_map(|p| index.get(p).copied()).collect();
                ids.sort_unstable();
                ids
            })
            .collect();
        Ok(Self { adj, labels })
    }

    pub fn load(path: &Path) -> Result<Self, GraphError> {
        let text = fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let graph = Self::from_adjacency(&text, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph loaded"
        );
        Ok(graph)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Neighbor ids of `node`, ascending.
    pub fn neighbors(&self, node: u32) -> &[u32] {
        &self.adj[node as usize]
    }

    pub fn degree(&self, node: u32) -> usize {
        self.adj[node as usize].len()
    }

    pub fn max_degree(&self) -> usize {
        self.adj.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn min_degree(&self) -> usize {
        self.adj.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Original label of a relabelled node id.
    pub fn label(&self, node: u32) -> &str {
        &self.labels[node as usize]
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
