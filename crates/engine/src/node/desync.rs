// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Classical DESYNC: each node watches its predecessor and successor in the
//! circular broadcast order and drifts toward their midpoint.

use rand_chacha::ChaCha8Rng;

use desim_core::constants::INTERVAL;
use desim_core::phase;
use desim_core::queue::EventQueue;
use desim_core::record::{LogKind, LogRecord};

use super::NodeCore;

#[derive(Debug)]
pub struct DesyncNode {
    pub(crate) core: NodeCore,
    alpha: i64,
    /// A broadcast happened and the successor's beacon is still awaited.
    fired: bool,
    /// Forward distance to the most recent predecessor, carried between
    /// slot boundaries.
    prev: Option<i64>,
    /// Nominal time of the pending broadcast, without jitter.
    next_broadcast: u64,
}

impl DesyncNode {
    pub(crate) fn new(
        id: u32,
        links: Vec<u32>,
        rng: ChaCha8Rng,
        jitter: i64,
        alpha: u32,
    ) -> Self {
        Self {
            core: NodeCore::new(id, links, rng, jitter),
            alpha: alpha as i64,
            fired: false,
            prev: None,
            next_broadcast: 0,
        }
    }

    pub fn start(&mut self, queue: &mut EventQueue) {
        self.core.on = true;
        self.broadcast(queue);
        self.core.set_timer(queue, INTERVAL as i64);
        self.next_broadcast = queue.current_time() + INTERVAL;
    }

    pub fn recv(&mut self, queue: &mut EventQueue, src: u32) {
        if !self.core.on {
            return;
        }
        let now = queue.current_time();
        self.core.neighbor_map.insert(src, now % INTERVAL);

        if self.fired {
            // First beacon after our own broadcast: the successor. Close the
            // slot and pull the pending broadcast toward the midpoint of
            // predecessor and successor.
            self.close_slot(now);
            let next = (now - self.core.latest_broadcast.unwrap_or(now)) as i64;
            let prev = self.prev.unwrap_or(INTERVAL as i64 - next);
            let adjustment = (self.alpha * (next - prev)).div_euclid(200);
            self.core.log.push(LogRecord::with_payload(
                now,
                self.core.id,
                LogKind::Adjust,
                (adjustment as f64 / INTERVAL as f64).to_string(),
            ));
            self.core.set_timer(
                queue,
                self.next_broadcast as i64 + adjustment - now as i64,
            );
        } else {
            // Between slots every beacon updates the predecessor distance.
            let my_offset = self.next_broadcast % INTERVAL;
            let your_offset = now % INTERVAL;
            self.prev = Some(phase::diff(my_offset, your_offset) as i64);
        }
    }

    pub fn timer(&mut self, queue: &mut EventQueue) {
        self.broadcast(queue);
        self.core.set_timer(queue, INTERVAL as i64);
        self.next_broadcast = queue.current_time() + INTERVAL;
    }

    fn broadcast(&mut self, queue: &mut EventQueue) {
        let now = self.core.send_beacon(queue, None);
        if self.fired {
            // No beacon arrived all slot; the deficit spans the whole gap.
            self.close_slot(now);
        }
        self.fired = true;
        self.core.latest_broadcast = Some(now);
    }

    fn close_slot(&mut self, now: u64) {
        self.core.log_deficit(now);
        self.fired = false;
    }
}

#[cfg(test)]
#[path = "desync_tests.rs"]
mod tests;
