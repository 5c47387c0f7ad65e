// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Solo and Solo2 ("Fidget"): pulse-coupled oscillators with degree-based
//! separation. A receiver that learns a crowded neighbor just beaconed
//! delays its own pending broadcast toward the neighbor's target share.

use rand_chacha::ChaCha8Rng;

use desim_core::constants::INTERVAL;
use desim_core::queue::EventQueue;

use super::{in_deficit, NodeCore};

/// Receive-side adjustment policy.
///
/// Solo sizes the separation target purely from the sender's reported
/// degree. Fidget caps the demand with the receiver's own degree, which
/// keeps low-degree senders in dense neighborhoods from claiming an
/// outsized share and converges where Solo cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoloPolicy {
    Solo,
    Fidget,
}

#[derive(Debug)]
pub struct SoloNode {
    pub(crate) core: NodeCore,
    policy: SoloPolicy,
    alpha: u64,
    /// A broadcast happened and its receive window is still open.
    my_slot: bool,
    /// Nominal time of the pending broadcast, without jitter.
    next_broadcast: u64,
}

impl SoloNode {
    pub(crate) fn new(
        id: u32,
        links: Vec<u32>,
        rng: ChaCha8Rng,
        jitter: i64,
        alpha: u32,
        policy: SoloPolicy,
    ) -> Self {
        Self {
            core: NodeCore::new(id, links, rng, jitter),
            policy,
            alpha: alpha as u64,
            my_slot: false,
            next_broadcast: 0,
        }
    }

    pub fn start(&mut self, queue: &mut EventQueue) {
        self.core.on = true;
        self.broadcast(queue);
        self.core.set_timer(queue, INTERVAL as i64);
        self.next_broadcast = queue.current_time() + INTERVAL;
    }

    pub fn recv(&mut self, queue: &mut EventQueue, src: u32, their_degree: u32) {
        if !self.core.on {
            return;
        }
        let now = queue.current_time();
        if self.my_slot {
            self.close_slot(now);
        }
        self.core.neighbor_map.insert(src, now % INTERVAL);
        let delay = self.adjust(now, their_degree);
        if delay > 0 {
            self.next_broadcast += delay as u64;
            self.core
                .set_timer(queue, self.next_broadcast as i64 - now as i64);
        }
    }

    pub fn timer(&mut self, queue: &mut EventQueue) {
        self.broadcast(queue);
        self.core.set_timer(queue, INTERVAL as i64);
        self.next_broadcast = queue.current_time() + INTERVAL;
    }

    fn broadcast(&mut self, queue: &mut EventQueue) {
        let degree = self.core.neighbor_map.len() as u32;
        let now = self.core.send_beacon(queue, Some(degree));
        self.core.latest_broadcast = Some(now);
        if self.my_slot {
            self.close_slot(now);
        }
        self.my_slot = true;
    }

    fn close_slot(&mut self, now: u64) {
        self.core.log_deficit(now);
        self.my_slot = false;
    }

    /// How far to push the pending broadcast for a beacon that arrived at
    /// `now`. Zero when the sender already has its target share.
    fn adjust(&self, now: u64, their_degree: u32) -> i64 {
        let next_bc = self.next_broadcast;
        let divisor = match self.policy {
            SoloPolicy::Solo => their_degree.max(1) as u64 + 1,
            SoloPolicy::Fidget => {
                let own_degree = self.core.neighbor_map.len() as u32;
                their_degree.max(own_degree).max(1) as u64 + 1
            }
        };
        let target_share = INTERVAL / divisor;

        // Forward distance from the just-arrived beacon to our pending
        // broadcast; negative when a late timer left next_broadcast behind.
        let their_share = next_bc as i64 - now as i64;
        if !in_deficit(their_share, target_share) {
            return 0;
        }

        let target_bc = now + target_share;
        let new_bc = (next_bc * (100 - self.alpha) + target_bc * self.alpha) / 100;
        new_bc as i64 - next_bc as i64
    }
}

#[cfg(test)]
#[path = "solo_tests.rs"]
mod tests;
