//! Batching and pacing
//!
//! Units are counted into fixed-size batches so progress can be reported
//! per batch, and remote calls are spaced by a fixed delay.

use std::time::Duration;
use tokio::time::sleep;

/// Counts for one closed batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based batch number
    pub batch: usize,
    /// Total batches in the run
    pub batches: usize,
    /// Units that succeeded in this batch
    pub succeeded: usize,
    /// Units attempted in this batch
    pub attempted: usize,
    /// Units attempted so far, all batches
    pub done: usize,
    /// Units in the run
    pub total: usize,
}

/// Partitions a run of `total` units into batches of `batch_size`
#[derive(Debug, Clone)]
pub struct BatchTracker {
    batch_size: usize,
    total: usize,
    batch: usize,
    in_batch: usize,
    batch_succeeded: usize,
    attempted: usize,
}

impl BatchTracker {
    /// Tracker for `total` units
    pub fn new(total: usize, batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            total,
            batch: 0,
            in_batch: 0,
            batch_succeeded: 0,
            attempted: 0,
        }
    }

    /// Number of batches the run splits into
    pub const fn batches(&self) -> usize {
        self.total.div_ceil(self.batch_size)
    }

    /// Record one unit's outcome. Returns the batch counts when this unit
    /// closes a batch (it filled the batch or was the last unit).
    pub fn record(&mut self, ok: bool) -> Option<BatchProgress> {
        self.attempted += 1;
        self.in_batch += 1;
        if ok {
            self.batch_succeeded += 1;
        }

        if self.in_batch < self.batch_size && self.attempted < self.total {
            return None;
        }

        self.batch += 1;
        let progress = BatchProgress {
            batch: self.batch,
            batches: self.batches().max(self.batch),
            succeeded: self.batch_succeeded,
            attempted: self.in_batch,
            done: self.attempted,
            total: self.total,
        };
        self.in_batch = 0;
        self.batch_succeeded = 0;
        Some(progress)
    }
}

/// Spaces remote calls by a fixed delay
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    calls: usize,
}

impl Pacer {
    /// Pacer waiting `delay` between calls
    pub const fn new(delay: Duration) -> Self {
        Self { delay, calls: 0 }
    }

    /// Wait until the next call may go out. The first call is never delayed.
    pub async fn ready(&mut self) {
        if self.calls > 0 && !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.calls += 1;
    }
}
