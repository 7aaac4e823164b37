//! GitHub authentication
//!
//! Tokens come from the gh CLI or the environment.

mod github;

pub use github::{GitHubAuthConfig, REQUIRED_SCOPES, get_github_auth, missing_scopes};

use std::fmt;

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// `gh auth token`
    Cli,
    /// The named environment variable
    EnvVar(&'static str),
}

impl fmt::Display for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => f.write_str("gh CLI"),
            Self::EnvVar(var) => write!(f, "${var}"),
        }
    }
}
