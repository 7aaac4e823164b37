//! Engine tuning knobs

use std::time::Duration;

/// Default units prepared per local batch
pub const DEFAULT_LOCAL_BATCH_SIZE: usize = 50;
/// Default PRs/discussions per remote batch
pub const DEFAULT_REMOTE_BATCH_SIZE: usize = 20;
/// Default pause between remote API calls, in milliseconds
pub const DEFAULT_INTER_CALL_DELAY_MS: u64 = 1000;
/// Default pause between remote API calls
pub const DEFAULT_INTER_CALL_DELAY: Duration = Duration::from_millis(DEFAULT_INTER_CALL_DELAY_MS);
/// Default size of the preparation worker pool
pub const DEFAULT_WORKERS: usize = 10;

/// Configuration for one engine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Units per local preparation/application batch
    pub local_batch_size: usize,
    /// PRs or discussions per remote batch
    pub remote_batch_size: usize,
    /// Pause between remote API calls (0.5-3 s keeps clear of secondary rate limits)
    pub inter_call_delay: Duration,
    /// Preparation worker threads
    pub workers: usize,
    /// Prepared groups buffered between the workers and the applier
    pub queue_capacity: usize,
    /// Branch commits land on and PRs target
    pub default_branch: String,
    /// Remote to push to
    pub remote: String,
    /// Leave working copies on disk after a repository finishes
    pub keep_working_copies: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            local_batch_size: DEFAULT_LOCAL_BATCH_SIZE,
            remote_batch_size: DEFAULT_REMOTE_BATCH_SIZE,
            inter_call_delay: DEFAULT_INTER_CALL_DELAY,
            workers: DEFAULT_WORKERS,
            queue_capacity: 64,
            default_branch: "main".to_string(),
            remote: "origin".to_string(),
            keep_working_copies: false,
        }
    }
}

impl EngineConfig {
    /// Clamp sizes to at least one
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.local_batch_size = self.local_batch_size.max(1);
        self.remote_batch_size = self.remote_batch_size.max(1);
        self.workers = self.workers.max(1);
        self.queue_capacity = self.queue_capacity.max(1);
        self
    }
}
