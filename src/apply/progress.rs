//! Run observation
//!
//! The engine reports through this trait so the CLI can render spinners
//! and tests can observe the run without parsing output.

use crate::apply::BatchProgress;
use crate::error::Error;
use crate::types::{Discussion, PullRequestRecord};
use async_trait::async_trait;

/// Stage of one repository's run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Cloning the working copy
    Cloning,
    /// Committing prepared units
    Applying,
    /// Pushing the default branch
    Pushing,
    /// Opening and merging pull requests
    PullRequests,
    /// Creating discussions
    Discussions,
    /// Repository finished
    Complete,
}

/// Receives engine events in the order they happen
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A repository is about to be processed
    async fn on_repository(&self, name: &str, unit_noun: &str, planned: usize);

    /// The current repository moved to `phase`
    async fn on_phase(&self, phase: Phase);

    /// A batch closed
    async fn on_batch(&self, batch: &BatchProgress);

    /// A generated pull request reached its terminal state
    async fn on_pull_request(&self, record: &PullRequestRecord);

    /// A discussion was created and answered
    async fn on_discussion(&self, discussion: &Discussion);

    /// A unit failed and the run moves on
    async fn on_error(&self, error: &Error);

    /// Guidance for the operator, such as how to enable a missing feature
    async fn on_message(&self, message: &str);
}

/// Ignores every event
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_repository(&self, _name: &str, _unit_noun: &str, _planned: usize) {}
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_batch(&self, _batch: &BatchProgress) {}
    async fn on_pull_request(&self, _record: &PullRequestRecord) {}
    async fn on_discussion(&self, _discussion: &Discussion) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
