//! Core types for git-backfill

use crate::catalog::{MessagePool, TopicPool};
use crate::error::{Error, Result};
use crate::schedule::{DateRange, DayFilter, Volume};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A repository to receive activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTarget {
    /// Short name, also used as the working-copy directory name
    pub name: String,
    /// URL to clone from and push to
    pub clone_url: String,
}

impl RepoTarget {
    /// Parse a `NAME=URL` argument
    pub fn parse(arg: &str) -> Result<Self> {
        let (name, url) = arg
            .split_once('=')
            .ok_or_else(|| Error::Config(format!("expected NAME=URL, got '{arg}'")))?;
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            return Err(Error::Config(format!("expected NAME=URL, got '{arg}'")));
        }
        validate_repo_name(name)?;
        Ok(Self {
            name: name.to_string(),
            clone_url: url.to_string(),
        })
    }
}

/// Check that `name` is usable as a repository and directory name
pub fn validate_repo_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "invalid repository name '{name}': use letters, digits, '-', '_' or '.'"
        )))
    }
}

/// Number of commits to put in each generated pull request (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitRange {
    /// Minimum commits per PR
    pub min: u32,
    /// Maximum commits per PR
    pub max: u32,
}

impl CommitRange {
    /// Create a validated range
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min < 1 || max < min {
            return Err(Error::Config(format!(
                "invalid commits-per-PR range {min}..={max}"
            )));
        }
        Ok(Self { min, max })
    }
}

impl Default for CommitRange {
    fn default() -> Self {
        Self { min: 1, max: 3 }
    }
}

/// A co-author credited through a `Co-authored-by:` trailer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coauthor {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
}

impl Coauthor {
    /// Placeholder used when a coauthored run is requested without coauthors
    pub fn placeholder() -> Self {
        Self {
            name: "Backfill Bot".to_string(),
            email: "backfill-bot@users.noreply.github.com".to_string(),
        }
    }

    /// Parse `Name <email>`
    pub fn parse(input: &str) -> Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"^\s*(.+?)\s*<([^<>\s]+@[^<>\s]+)>\s*$").expect("hardcoded regex is valid")
        });

        let caps = re
            .captures(input)
            .ok_or_else(|| Error::Config(format!("expected 'Name <email>', got '{input}'")))?;

        Ok(Self {
            name: caps[1].to_string(),
            email: caps[2].to_string(),
        })
    }

    /// The commit trailer line for this co-author
    pub fn trailer(&self) -> String {
        format!("Co-authored-by: {} <{}>", self.name, self.email)
    }
}

/// Which kind of activity a request produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkUnitKind {
    /// Commits straight onto the default branch, pushed once at the end
    PlainCommit,
    /// One feature branch per unit, pushed, opened as a PR and merged
    BranchedPr {
        /// Commits per pull request
        commits: CommitRange,
    },
    /// A discussion with an accepted answer
    Discussion,
    /// Like `BranchedPr`, with `Co-authored-by:` trailers on every commit
    CoauthoredPr {
        /// Commits per pull request
        commits: CommitRange,
        /// Never empty
        coauthors: Vec<Coauthor>,
    },
}

impl WorkUnitKind {
    /// Build a coauthored PR kind, substituting the placeholder when no
    /// coauthors were supplied.
    pub fn coauthored(commits: CommitRange, coauthors: Vec<Coauthor>) -> Self {
        let coauthors = if coauthors.is_empty() {
            vec![Coauthor::placeholder()]
        } else {
            coauthors
        };
        Self::CoauthoredPr { commits, coauthors }
    }

    /// Processing mode used for this kind of work
    pub const fn mode(&self) -> ProcessingMode {
        match self {
            Self::PlainCommit => ProcessingMode::Strict,
            _ => ProcessingMode::BestEffort,
        }
    }

    /// Noun for one unit of this kind, used in reports
    pub const fn unit_noun(&self) -> &'static str {
        match self {
            Self::PlainCommit => "commits",
            Self::BranchedPr { .. } | Self::CoauthoredPr { .. } => "pull requests",
            Self::Discussion => "discussions",
        }
    }
}

/// How failures inside a repository's run are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    /// Any failure aborts the repository
    Strict,
    /// Remote failures are counted and the next unit proceeds
    BestEffort,
}

impl ProcessingMode {
    /// Whether `error` ends the repository's run in this mode
    pub const fn halts_on(self, error: &Error) -> bool {
        match self {
            Self::Strict => true,
            Self::BestEffort => error.is_local_mutation(),
        }
    }
}

/// Everything needed to generate activity for one repository.
///
/// Built once from resolved user input and never mutated.
#[derive(Debug, Clone)]
pub struct ActivityRequest {
    /// Target repository
    pub repository: RepoTarget,
    /// Inclusive date range
    pub range: DateRange,
    /// Total count or per-day policy
    pub volume: Volume,
    /// Which days may receive activity
    pub day_filter: DayFilter,
    /// Commit messages (custom or default catalog)
    pub messages: MessagePool,
    /// Discussion topics (custom or default catalog)
    pub topics: TopicPool,
    /// What gets generated
    pub kind: WorkUnitKind,
}

impl ActivityRequest {
    /// Assemble a request, checking that the volume fits the kind
    pub fn new(
        repository: RepoTarget,
        range: DateRange,
        volume: Volume,
        day_filter: DayFilter,
        messages: MessagePool,
        topics: TopicPool,
        kind: WorkUnitKind,
    ) -> Result<Self> {
        if kind != WorkUnitKind::PlainCommit && !matches!(volume, Volume::Total(_)) {
            return Err(Error::Config(format!(
                "{} are scheduled by total count, not by a per-day policy",
                kind.unit_noun()
            )));
        }

        Ok(Self {
            repository,
            range,
            volume,
            day_filter,
            messages,
            topics,
            kind,
        })
    }
}

/// Content and metadata for one commit, ready to apply.
///
/// Holds no reference to any working copy, so it can move freely between
/// threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUnit {
    /// Position in the repository's run (monotonically increasing)
    pub index: usize,
    /// Scheduled date
    pub date: NaiveDate,
    /// Path relative to the working-copy root, unique within the run
    pub file_name: String,
    /// File content
    pub content: String,
    /// Author and committer timestamp
    pub timestamp: NaiveDateTime,
    /// Commit subject
    pub message: String,
    /// Co-authors credited on this commit
    pub coauthors: Vec<Coauthor>,
}

impl PreparedUnit {
    /// Full commit message including any `Co-authored-by:` trailers
    pub fn commit_message(&self) -> String {
        if self.coauthors.is_empty() {
            return self.message.clone();
        }
        let trailers: Vec<String> = self.coauthors.iter().map(Coauthor::trailer).collect();
        format!("{}\n\n{}", self.message, trailers.join("\n"))
    }

    /// Timestamp in the form git accepts for `GIT_AUTHOR_DATE`
    pub fn git_timestamp(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Content for one discussion, ready to post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedDiscussion {
    /// Position in the repository's run
    pub index: usize,
    /// Scheduled date
    pub date: NaiveDate,
    /// Discussion title
    pub title: String,
    /// Discussion body (the question)
    pub body: String,
    /// Comment posted and accepted as the answer
    pub answer: String,
}

/// A pull request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// Web URL for the PR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR title
    pub title: String,
}

/// Terminal state of one generated pull request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrOutcome {
    /// Merged with the merge method
    Merged,
    /// Merge failed, the fallback method succeeded
    MergedViaFallback,
    /// Merge and fallback both failed; the PR stays open
    MergeFailed,
    /// The PR could not be opened
    CreationFailed,
    /// The branch never reached the remote
    PushFailed,
}

impl PrOutcome {
    /// Whether the PR ended up merged
    pub const fn is_merged(self) -> bool {
        matches!(self, Self::Merged | Self::MergedViaFallback)
    }
}

impl fmt::Display for PrOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Merged => "merged",
            Self::MergedViaFallback => "merged (fallback)",
            Self::MergeFailed => "merge failed (fallback attempted)",
            Self::CreationFailed => "creation failed",
            Self::PushFailed => "push failed",
        };
        f.write_str(s)
    }
}

/// What happened to one generated pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// Feature branch name
    pub branch: String,
    /// PR number, once created
    pub number: Option<u64>,
    /// Web URL, once created
    pub html_url: Option<String>,
    /// PR title
    pub title: String,
    /// PR body
    pub body: String,
    /// Terminal state
    pub outcome: PrOutcome,
}

/// Merge strategy for the hosting merge endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    /// Merge commit
    Merge,
    /// Squash merge
    Squash,
}

/// A discussion category in a repository
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionCategory {
    /// GraphQL node ID
    pub id: String,
    /// Category name
    pub name: String,
    /// Whether comments can be marked as the answer
    #[serde(default)]
    pub is_answerable: bool,
}

/// Repository node ID plus its discussion categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionCategories {
    /// GraphQL node ID of the repository
    pub repository_id: String,
    /// Available categories
    pub categories: Vec<DiscussionCategory>,
}

impl DiscussionCategories {
    /// Preferred category: the first answerable one, else the first one
    pub fn preferred(&self) -> Option<&DiscussionCategory> {
        self.categories
            .iter()
            .find(|c| c.is_answerable)
            .or_else(|| self.categories.first())
    }
}

/// A created discussion
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Discussion {
    /// GraphQL node ID
    pub id: String,
    /// Discussion number
    pub number: u64,
    /// Web URL
    pub url: String,
}

/// Hosting coordinates of a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostingConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
