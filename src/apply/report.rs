//! Run reports
//!
//! Every attempted unit ends up counted here; failures are kept with the
//! operation that failed and the HTTP status when there was one.

use crate::error::Error;
use crate::types::{Discussion, ProcessingMode, PullRequestRecord, WorkUnitKind};
use std::fmt;
use std::path::PathBuf;

/// The step a unit failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Writing, staging or committing
    Commit,
    /// Creating or switching branches
    Checkout,
    /// Pushing to the remote
    Push,
    /// Opening a pull request
    CreatePullRequest,
    /// Merging a pull request (after the fallback)
    MergePullRequest,
    /// Listing discussion categories
    FetchCategories,
    /// Creating a discussion
    CreateDiscussion,
    /// Posting the answer comment
    AddComment,
    /// Accepting the answer
    MarkAnswer,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Commit => "commit",
            Self::Checkout => "checkout",
            Self::Push => "push",
            Self::CreatePullRequest => "create pull request",
            Self::MergePullRequest => "merge pull request",
            Self::FetchCategories => "list discussion categories",
            Self::CreateDiscussion => "create discussion",
            Self::AddComment => "add comment",
            Self::MarkAnswer => "mark answer",
        };
        f.write_str(s)
    }
}

/// One failed unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFailure {
    /// Run-wide index of the unit, `None` for repository-level steps
    pub unit: Option<usize>,
    /// Step that failed
    pub operation: Operation,
    /// HTTP status, for API failures that got a response
    pub status: Option<u16>,
    /// Error message or response body
    pub message: String,
}

impl UnitFailure {
    /// Record `error` against `unit`
    pub fn new(unit: Option<usize>, operation: Operation, error: &Error) -> Self {
        let (status, message) = match error {
            Error::Api { status, message } => (*status, message.clone()),
            other => (None, other.to_string()),
        };
        Self {
            unit,
            operation,
            status,
            message,
        }
    }
}

/// Outcome of one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryReport {
    /// Repository name
    pub name: String,
    /// What was generated ("commits", "pull requests", "discussions")
    pub unit_noun: &'static str,
    /// How failed units were treated
    pub mode: ProcessingMode,
    /// Units scheduled
    pub planned: usize,
    /// Units attempted
    pub attempted: usize,
    /// Units fully applied
    pub succeeded: usize,
    /// Failed units, in the order they failed
    pub failures: Vec<UnitFailure>,
    /// Generated pull requests
    pub pull_requests: Vec<PullRequestRecord>,
    /// Created discussions
    pub discussions: Vec<Discussion>,
    /// Why the repository was skipped, if it was
    pub skipped: Option<String>,
    /// Set when a fatal error stopped this repository
    pub aborted: bool,
    /// Working copy, when one was cloned
    pub working_copy: Option<PathBuf>,
}

impl RepositoryReport {
    /// Empty report for `name`
    pub fn new(name: &str, kind: &WorkUnitKind, planned: usize) -> Self {
        Self {
            name: name.to_string(),
            unit_noun: kind.unit_noun(),
            mode: kind.mode(),
            planned,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
            pull_requests: Vec::new(),
            discussions: Vec::new(),
            skipped: None,
            aborted: false,
            working_copy: None,
        }
    }

    /// Attempted units that did not succeed
    pub const fn failed(&self) -> usize {
        self.attempted.saturating_sub(self.succeeded)
    }

    /// Every planned unit succeeded
    pub const fn is_success(&self) -> bool {
        !self.aborted && self.skipped.is_none() && self.succeeded == self.planned
    }

    pub(crate) fn fail(&mut self, unit: Option<usize>, operation: Operation, error: &Error) {
        self.failures.push(UnitFailure::new(unit, operation, error));
    }
}

/// The error that stopped a run
#[derive(Debug)]
pub struct FatalAbort {
    /// Repository being processed
    pub repository: String,
    /// What went wrong
    pub error: Error,
}

impl FatalAbort {
    /// Manual steps to finish the interrupted work
    pub fn recovery_steps(&self) -> Vec<String> {
        self.error.recovery_steps().unwrap_or_default()
    }
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    /// One report per processed repository, in input order
    pub repositories: Vec<RepositoryReport>,
    /// Set when a fatal error ended the run early
    pub fatal: Option<FatalAbort>,
}

impl RunReport {
    /// No fatal error occurred
    pub const fn is_success(&self) -> bool {
        self.fatal.is_none()
    }

    /// Process exit code for this outcome
    pub const fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_http_status() {
        let err = Error::Api {
            status: Some(502),
            message: "Bad Gateway".to_string(),
        };
        let failure = UnitFailure::new(Some(3), Operation::CreatePullRequest, &err);
        assert_eq!(failure.status, Some(502));
        assert_eq!(failure.message, "Bad Gateway");
    }

    #[test]
    fn test_repository_success_requires_every_unit() {
        let mut report = RepositoryReport::new("api-service", &WorkUnitKind::Discussion, 2);
        report.attempted = 2;
        report.succeeded = 1;
        assert!(!report.is_success());
        assert_eq!(report.failed(), 1);

        report.succeeded = 2;
        assert!(report.is_success());
    }

    #[test]
    fn test_exit_code() {
        let mut run = RunReport::default();
        assert_eq!(run.exit_code(), 0);
        run.fatal = Some(FatalAbort {
            repository: "x".to_string(),
            error: Error::Internal("boom".to_string()),
        });
        assert_eq!(run.exit_code(), 1);
    }
}
