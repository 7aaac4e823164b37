//! Hosting service construction

use crate::auth::GitHubAuthConfig;
use crate::error::Result;
use crate::platform::{GitHubAccount, GitHubService, HostingService, parse_repo_info};
use std::env;

/// Create the hosting service for a repository's clone URL
pub fn create_hosting_service(
    auth: &GitHubAuthConfig,
    clone_url: &str,
) -> Result<Box<dyn HostingService>> {
    let config = parse_repo_info(clone_url)?;
    Ok(Box::new(GitHubService::new(&auth.token, config)?))
}

/// Account client for the authenticated user, honouring `GH_HOST`
pub fn create_account(auth: &GitHubAuthConfig) -> Result<GitHubAccount> {
    let host = env::var("GH_HOST").ok().filter(|h| h != "github.com");
    GitHubAccount::new(&auth.token, host.as_deref())
}
