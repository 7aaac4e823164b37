//! Hosting services
//!
//! Everything the engine needs from the hosting side of a repository:
//! pull requests, merges and discussions.

mod detection;
mod factory;
mod github;

pub use detection::parse_repo_info;
pub use factory::{create_account, create_hosting_service};
pub use github::{AuthenticatedUser, CreatedRepository, GitHubAccount, GitHubService};

use crate::error::Result;
use crate::types::{Discussion, DiscussionCategories, MergeMethod, PullRequest};
use async_trait::async_trait;

/// Remote operations for one repository
///
/// Implementations are called from a single task, one request at a time;
/// pacing between calls is the caller's job.
#[async_trait]
pub trait HostingService: Send + Sync {
    /// Open a PR from `head` into `base`
    async fn create_pr(&self, head: &str, base: &str, title: &str, body: &str)
    -> Result<PullRequest>;

    /// Merge an open PR
    async fn merge_pr(&self, number: u64, title: &str, method: MergeMethod) -> Result<()>;

    /// Repository node ID and its discussion categories
    async fn discussion_categories(&self) -> Result<DiscussionCategories>;

    /// Start a discussion
    async fn create_discussion(
        &self,
        repository_id: &str,
        category_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Discussion>;

    /// Comment on a discussion, returning the comment's node ID
    async fn add_discussion_comment(&self, discussion_id: &str, body: &str) -> Result<String>;

    /// Accept a comment as the discussion's answer
    async fn mark_discussion_answer(&self, comment_id: &str) -> Result<()>;
}
