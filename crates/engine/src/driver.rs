// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation driver: builds a node population from a graph, pumps the
//! event queue to the horizon, and merges the per-node logs.
//!
//! The driver owns the whole population in one arena; nodes refer to their
//! neighbors by index and only ever talk through queued tasks, so a run is
//! a pure function of `(graph, config, seed)`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use desim_core::constants::INTERVAL;
use desim_core::queue::{EventQueue, Task};
use desim_core::record::LogRecord;

use crate::config::SimConfig;
use crate::graph::Graph;
use crate::node::Node;

#[derive(Debug, Error)]
pub enum SimError {
    /// Nodes always re-arm their timers, so a drained queue before the
    /// horizon means the engine itself is broken.
    #[error("event queue drained before the horizon at t={0}")]
    QueueDrained(u64),
}

pub struct Simulation {
    queue: EventQueue,
    nodes: Vec<Node>,
    duration: u64,
}

impl Simulation {
    /// Seed offsets, build nodes, wire links, and schedule every start.
    ///
    /// Stream 0 of the seeded generator draws the initial offsets; node `i`
    /// draws its timer jitter from stream `i + 1`, so batch workers never
    /// share a random stream.
    pub fn new(graph: &Graph, config: SimConfig, seed: u64) -> Self {
        let mut queue = EventQueue::new();
        let count = graph.node_count() as u32;

        let mut offset_rng = ChaCha8Rng::seed_from_u64(seed);
        let offsets: Vec<u64> = (0..count).map(|_| offset_rng.gen_range(0..INTERVAL)).collect();

        let nodes = (0..count)
            .map(|id| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(id as u64 + 1);
                Node::new(&config, id, graph.neighbors(id).to_vec(), rng)
            })
            .collect();

        for (id, &offset) in offsets.iter().enumerate() {
            queue.add_task(Task::Start { node: id as u32 }, offset);
        }

        Self { queue, nodes, duration: config.duration }
    }

    /// Pump tasks until the horizon. The task popped at or past the horizon
    /// still executes; nothing after it does.
    pub fn run(&mut self) -> Result<(), SimError> {
        let mut executed: u64 = 0;
        while self.queue.current_time() < self.duration {
            let task = self
                .queue
                .pop_task()
                .map_err(|_| SimError::QueueDrained(self.queue.current_time()))?;
            match task {
                Task::Start { node } => self.nodes[node as usize].start(&mut self.queue),
                Task::Timer { node } => self.nodes[node as usize].timer(&mut self.queue),
                Task::Recv { dst, src, degree } => {
                    self.nodes[dst as usize].recv(&mut self.queue, src, degree)
                }
            }
            executed += 1;
        }
        tracing::debug!(
            tasks = executed,
            horizon = self.duration,
            nodes = self.nodes.len(),
            "simulation horizon reached"
        );
        Ok(())
    }

    /// Merge the per-node logs into one sequence ordered by
    /// `(time, node_id, insertion order)`.
    pub fn into_log(self) -> Vec<LogRecord> {
        let mut records: Vec<LogRecord> = Vec::new();
        for node in self.nodes {
            records.extend(node.into_log());
        }
        // Stable sort keeps each node's insertion order within an instant.
        records.sort_by_key(|r| (r.time, r.node));
        records
    }
}

/// Run one instance over a loaded graph and return the rendered log text.
pub fn run_instance(graph: &Graph, config: SimConfig, seed: u64) -> Result<String, SimError> {
    let mut sim = Simulation::new(graph, config, seed);
    sim.run()?;
    Ok(desim_core::record::render_lines(&sim.into_log()))
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
