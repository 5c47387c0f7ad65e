// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event queue for the single-threaded cooperative simulation.
//!
//! Tasks are ordered by `(fire_time, sequence)` where `sequence` is a
//! strictly monotone injection counter, so two tasks scheduled for the same
//! instant execute in scheduling order. Re-adding an equal payload
//! tombstones the pending instance, which is how timers are re-armed.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use thiserror::Error;

/// Callback payload of a scheduled task.
///
/// Equality is structural: the same timer for the same node compares equal
/// regardless of when it was scheduled, so `add_task` can cancel the
/// in-flight instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Turn the node on; it broadcasts for the first time.
    Start { node: u32 },
    /// The node's periodic broadcast timer.
    Timer { node: u32 },
    /// Deliver a beacon from `src` to `dst`. Solo-family beacons carry the
    /// sender's degree.
    Recv {
        dst: u32,
        src: u32,
        degree: Option<u32>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("pop from an empty event queue")]
    Empty,
}

#[derive(Debug)]
struct Entry {
    fire_time: u64,
    seq: u64,
    task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.fire_time == other.fire_time && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so the BinaryHeap pops the smallest (fire_time, seq).
        other
            .fire_time
            .cmp(&self.fire_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Priority queue of scheduled tasks with implicit cancellation.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Entry>,
    /// Sequence number of the live entry per payload. Heap entries whose
    /// sequence no longer matches are tombstones.
    live: HashMap<Task, u64>,
    next_seq: u64,
    current: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time: the fire time of the last popped task.
    pub fn current_time(&self) -> u64 {
        self.current
    }

    /// Schedule `task` at `fire_time`, cancelling any pending equal payload.
    pub fn add_task(&mut self, task: Task, fire_time: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(task, seq);
        self.heap.push(Entry { fire_time, seq, task });
    }

    /// Pop the earliest live task and advance `current_time` to its fire
    /// time. Tombstoned entries are skipped.
    pub fn pop_task(&mut self) -> Result<Task, QueueError> {
        while let Some(entry) = self.heap.pop() {
            if self.live.get(&entry.task) != Some(&entry.seq) {
                continue;
            }
            self.live.remove(&entry.task);
            self.current = entry.fire_time;
            return Ok(entry.task);
        }
        Err(QueueError::Empty)
    }

    /// Number of live (non-cancelled) tasks.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
