// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SleepWell: broadcast once per interval and, when crowded, jump to the
//! midpoint of the largest gap between neighbor phases.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use desim_core::constants::{INTERVAL, MAX_DEFICIT_COUNT};
use desim_core::phase;
use desim_core::queue::EventQueue;
use desim_core::record::{LogKind, LogRecord};

use super::{in_deficit, NodeCore};

#[derive(Debug)]
pub struct SleepWellNode {
    pub(crate) core: NodeCore,
    /// A broadcast happened and its receive window is still open.
    my_slot: bool,
    deficit_count: u32,
}

impl SleepWellNode {
    pub(crate) fn new(id: u32, links: Vec<u32>, rng: ChaCha8Rng, jitter: i64) -> Self {
        Self {
            core: NodeCore::new(id, links, rng, jitter),
            my_slot: false,
            deficit_count: 0,
        }
    }

    pub fn start(&mut self, queue: &mut EventQueue) {
        self.core.on = true;
        self.broadcast(queue);
        self.core.set_timer(queue, INTERVAL as i64);
    }

    pub fn recv(&mut self, queue: &mut EventQueue, src: u32) {
        if !self.core.on {
            return;
        }
        let now = queue.current_time();
        self.core.neighbor_map.insert(src, now % INTERVAL);
        if self.my_slot {
            self.close_slot(now);
        }
    }

    pub fn timer(&mut self, queue: &mut EventQueue) {
        self.broadcast(queue);
        let interval = self.adjust(queue.current_time());
        self.core.set_timer(queue, interval as i64);
    }

    fn broadcast(&mut self, queue: &mut EventQueue) {
        let now = self.core.send_beacon(queue, None);
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

    /// Pick the interval to the next broadcast.
    ///
    /// Returns `INTERVAL` when the node already has its target share.
    /// Otherwise the node aims at the midpoint of the largest gap (or just
    /// a target-share back from the gap's end when the gap is narrow), and
    /// the returned interval lands in `(INTERVAL/2, 3*INTERVAL/2]` so the
    /// next broadcast never falls within half a period of this one.
    fn adjust(&mut self, now: u64) -> u64 {
        let my_offset = now % INTERVAL;
        let Some(my_share) = self
            .core
            .neighbor_map
            .values()
            .map(|&offset| phase::diff(offset, my_offset))
            .min()
        else {
            // Never heard from anyone: the whole period is ours.
            return INTERVAL;
        };
        let target_share = self.core.target_share();
        if !in_deficit(my_share as i64, target_share) {
            return INTERVAL;
        }

        let offsets: Vec<u64> = self.core.neighbor_map.values().copied().collect();
        self.core.log.push(LogRecord::with_payload(
            now,
            self.core.id,
            LogKind::Nmap,
            format!("{offsets:?}"),
        ));
        let short = (target_share as f64 - my_share as f64) / INTERVAL as f64;
        self.core.log.push(LogRecord::with_payload(
            now,
            self.core.id,
            LogKind::Short,
            short.to_string(),
        ));

        self.deficit_count += 1;
        let new_offset = if self.deficit_count == MAX_DEFICIT_COUNT {
            self.deficit_count = 0;
            self.core
                .log
                .push(LogRecord::new(now, self.core.id, LogKind::Reset));
            self.core.rng.gen_range(0..INTERVAL)
        } else {
            let (start, end) = self.largest_gap();
            let half_gap = phase::diff(end, start) / 2;
            if half_gap > target_share {
                phase::sum(start, half_gap)
            } else {
                phase::diff(end, target_share)
            }
        };

        let mut interval = phase::diff(new_offset, my_offset);
        if interval <= INTERVAL / 2 {
            interval += INTERVAL;
        }
        self.core.log.push(LogRecord::with_payload(
            now,
            self.core.id,
            LogKind::Adjust,
            new_offset.to_string(),
        ));
        interval
    }

    /// Largest circular gap between consecutive neighbor phases, as
    /// `(start, end)`. Ties go to the lowest start. Callers ensure the
    /// neighbor map is non-empty.
    fn largest_gap(&self) -> (u64, u64) {
        let mut starts: Vec<u64> = self.core.neighbor_map.values().copied().collect();
        starts.sort_unstable();
        let mut best = (starts[0], starts[1 % starts.len()]);
        let mut best_gap = phase::diff(best.1, best.0);
        for (i, &start) in starts.iter().enumerate().skip(1) {
            let end = starts[(i + 1) % starts.len()];
            let gap = phase::diff(end, start);
            if gap > best_gap {
                best_gap = gap;
                best = (start, end);
            }
        }
        best
    }
}

#[cfg(test)]
#[path = "sleepwell_tests.rs"]
mod tests;
