// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! desim-core: time base, circular phase arithmetic, event queue, and log
//! records shared by the simulator engine and the log analyzer.

pub mod constants;
pub mod phase;
pub mod queue;
pub mod record;

pub use constants::{
    CONVERGENCE_TOLERANCE, DEFICIT_TOLERANCE, INTERVAL, JITTER, MAX_DEFICIT_COUNT,
    SIMULATION_DURATION,
};
pub use queue::{EventQueue, QueueError, Task};
pub use record::{LogKind, LogRecord, ParseRecordError};
