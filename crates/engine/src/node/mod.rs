// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-node protocol state machines.
//!
//! The four algorithms share one external contract: `start` fires once at
//! the node's initial offset, `timer` on every broadcast timer expiry, and
//! `recv` on every delivered beacon. All cross-node communication goes
//! through the event queue, so a node only ever mutates itself.

mod desync;
mod sleepwell;
mod solo;

pub use desync::DesyncNode;
pub use sleepwell::SleepWellNode;
pub use solo::{SoloNode, SoloPolicy};

use std::collections::BTreeMap;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use desim_core::constants::{DEFICIT_TOLERANCE, INTERVAL};
use desim_core::queue::{EventQueue, Task};
use desim_core::record::{LogKind, LogRecord};

use crate::config::{Algorithm, SimConfig};

/// True when `share` falls short of `target` by more than the tolerance.
///
/// The share may be negative for Solo-family nodes when a beacon arrives
/// after the pending broadcast's nominal time.
pub(crate) fn in_deficit(share: i64, target: u64) -> bool {
    (share as f64) - (target as f64) <= -DEFICIT_TOLERANCE * INTERVAL as f64
}

/// State common to every protocol variant.
#[derive(Debug)]
pub(crate) struct NodeCore {
    pub id: u32,
    /// Neighbor ids, ascending. Broadcast delivery order follows this.
    pub links: Vec<u32>,
    /// Phase at which each neighbor's last beacon was observed.
    pub neighbor_map: BTreeMap<u32, u64>,
    pub on: bool,
    pub latest_broadcast: Option<u64>,
    pub log: Vec<LogRecord>,
    pub rng: ChaCha8Rng,
    pub jitter: i64,
}

impl NodeCore {
    fn new(id: u32, links: Vec<u32>, rng: ChaCha8Rng, jitter: i64) -> Self {
        Self {
            id,
            links,
            neighbor_map: BTreeMap::new(),
            on: false,
            latest_broadcast: None,
            log: vec![LogRecord::new(0, id, LogKind::Init)],
            rng,
            jitter,
        }
    }

    /// `INTERVAL / (known neighbors + 1)`.
    pub fn target_share(&self) -> u64 {
        INTERVAL / (self.neighbor_map.len() as u64 + 1)
    }

    /// Schedule beacon delivery to every link at the current instant and log
    /// the broadcast. Deliveries carry later sequence numbers than the
    /// running task, so the sender's bookkeeping settles first.
    pub fn send_beacon(&mut self, queue: &mut EventQueue, degree: Option<u32>) -> u64 {
        let now = queue.current_time();
        for &dst in &self.links {
            queue.add_task(Task::Recv { dst, src: self.id, degree }, now);
        }
        self.log.push(LogRecord::new(now, self.id, LogKind::Broadcast));
        now
    }

    /// Re-arm the broadcast timer `interval` ticks from now, perturbed by
    /// the node's jitter draw. Re-adding the payload cancels any pending
    /// timer. A non-positive interval fires at the current instant; the
    /// queue never travels backwards.
    pub fn set_timer(&mut self, queue: &mut EventQueue, interval: i64) {
        let interval = interval + self.rng.gen_range(-self.jitter..=self.jitter);
        let now = queue.current_time();
        let fire = now.saturating_add(interval.max(0) as u64);
        queue.add_task(Task::Timer { node: self.id }, fire);
    }

    /// Log the relative deficit of the slot that just closed.
    pub fn log_deficit(&mut self, now: u64) {
        let Some(latest) = self.latest_broadcast else {
            return;
        };
        let target = self.target_share();
        let my_share = now - latest;
        let deficit = (target as f64 - my_share as f64) / target as f64;
        self.log.push(LogRecord::with_payload(
            now,
            self.id,
            LogKind::Deficit,
            deficit.to_string(),
        ));
    }
}

/// Closed set of protocol variants behind the `{start, recv, timer}`
/// contract. Solo and Solo2 share a state struct and differ only in the
/// receive-side adjustment policy.
#[derive(Debug)]
pub enum Node {
    SleepWell(SleepWellNode),
    Solo(SoloNode),
    Desync(DesyncNode),
}

impl Node {
    pub fn new(config: &SimConfig, id: u32, links: Vec<u32>, rng: ChaCha8Rng) -> Self {
        match config.algorithm {
            Algorithm::SleepWell => {
                Node::SleepWell(SleepWellNode::new(id, links, rng, config.jitter))
            }
            Algorithm::Solo => Node::Solo(SoloNode::new(
                id,
                links,
                rng,
                config.jitter,
                config.alpha,
                SoloPolicy::Solo,
            )),
            Algorithm::Solo2 => Node::Solo(SoloNode::new(
                id,
                links,
                rng,
                config.jitter,
                config.alpha,
                SoloPolicy::Fidget,
            )),
            Algorithm::Desync => {
                Node::Desync(DesyncNode::new(id, links, rng, config.jitter, config.alpha))
            }
        }
    }

    pub fn start(&mut self, queue: &mut EventQueue) {
        match self {
            Node::SleepWell(n) => n.start(queue),
            Node::Solo(n) => n.start(queue),
            Node::Desync(n) => n.start(queue),
        }
    }

    pub fn timer(&mut self, queue: &mut EventQueue) {
        match self {
            Node::SleepWell(n) => n.timer(queue),
            Node::Solo(n) => n.timer(queue),
            Node::Desync(n) => n.timer(queue),
        }
    }

    pub fn recv(&mut self, queue: &mut EventQueue, src: u32, degree: Option<u32>) {
        match self {
            Node::SleepWell(n) => n.recv(queue, src),
            Node::Solo(n) => n.recv(queue, src, degree.unwrap_or_default()),
            Node::Desync(n) => n.recv(queue, src),
        }
    }

    pub fn log(&self) -> &[LogRecord] {
        match self {
            Node::SleepWell(n) => &n.core.log,
            Node::Solo(n) => &n.core.log,
            Node::Desync(n) => &n.core.log,
        }
    }

    pub fn into_log(self) -> Vec<LogRecord> {
        match self {
            Node::SleepWell(n) => n.core.log,
            Node::Solo(n) => n.core.log,
            Node::Desync(n) => n.core.log,
        }
    }
}
