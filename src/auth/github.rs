//! GitHub token discovery

use crate::auth::AuthSource;
use crate::error::{Error, Result};
use std::env;
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Scopes a classic token needs for every activity kind
pub const REQUIRED_SCOPES: [&str; 2] = ["repo", "write:discussion"];

/// A resolved GitHub token
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// Resolve a GitHub token.
///
/// The gh CLI wins when it is installed and logged in (for `GH_HOST` when
/// set), then `GITHUB_TOKEN`, then `GH_TOKEN`. Blank values are ignored.
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    let host = env::var("GH_HOST").ok().filter(|h| !h.trim().is_empty());
    if let Some(token) = gh_cli_token(host.as_deref()).await {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    TOKEN_VARS
        .into_iter()
        .find_map(|var| {
            let token = env::var(var).ok()?.trim().to_string();
            (!token.is_empty()).then(|| {
                debug!("Using token from {var}");
                GitHubAuthConfig {
                    token,
                    source: AuthSource::EnvVar(var),
                }
            })
        })
        .ok_or_else(|| {
            Error::Auth(
                "no GitHub token found; run `gh auth login` or export GITHUB_TOKEN".to_string(),
            )
        })
}

/// `gh auth token`, or None when gh is missing or not logged in
async fn gh_cli_token(host: Option<&str>) -> Option<String> {
    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);
    if let Some(host) = host {
        cmd.args(["--hostname", host]);
    }

    let output = cmd.output().await.ok()?;
    if !output.status.success() {
        debug!("gh CLI has no token available");
        return None;
    }
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

/// Required scopes absent from `granted`.
///
/// Fine-grained tokens report no scopes at all; nothing is flagged for them.
pub fn missing_scopes(granted: Option<&[String]>) -> Vec<&'static str> {
    let Some(granted) = granted else {
        return Vec::new();
    };
    REQUIRED_SCOPES
        .into_iter()
        .filter(|scope| !granted.iter().any(|g| g == scope))
        .collect()
}
