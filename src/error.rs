//! Error types for git-backfill

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while scheduling and applying activity
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user-supplied configuration (detected before scheduling)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Date string not in `YYYY-MM-DD` form
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A message or topic catalog has no entries
    #[error("the {0} catalog is empty")]
    EmptyCatalog(&'static str),

    /// A git command failed while mutating the working copy
    #[error("git command failed: {command}{}", stderr_suffix(stderr))]
    Git {
        /// The exact command line that failed
        command: String,
        /// Working copy the command ran in, if any
        working_copy: Option<PathBuf>,
        /// Captured stderr
        stderr: String,
    },

    /// Pushing a branch to the remote failed
    #[error("failed to push {branch} to {remote}: {command}{}", stderr_suffix(stderr))]
    Push {
        /// The exact command line that failed
        command: String,
        /// Working copy holding the unpushed commits
        working_copy: PathBuf,
        /// Remote name
        remote: String,
        /// Branch that was being pushed
        branch: String,
        /// Captured stderr
        stderr: String,
    },

    /// Hosting API call failed
    #[error("GitHub API error{}: {message}", status_suffix(*status))]
    Api {
        /// HTTP status, when the failure came with a response
        status: Option<u16>,
        /// Error message or response body
        message: String,
    },

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Filesystem error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => {
                let details: Vec<String> = source
                    .errors
                    .unwrap_or_default()
                    .iter()
                    .map(|e| {
                        e.get("message")
                            .and_then(serde_json::Value::as_str)
                            .map_or_else(|| e.to_string(), ToString::to_string)
                    })
                    .collect();
                let message = if details.is_empty() {
                    source.message
                } else {
                    format!("{}: {}", source.message, details.join("; "))
                };
                Self::Api {
                    status: Some(source.status_code.as_u16()),
                    message,
                }
            }
            other => Self::Api {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl Error {
    /// Whether this error leaves the working copy in a state that must not be
    /// mutated further. A rejected push leaves the checkout intact.
    pub const fn is_local_mutation(&self) -> bool {
        matches!(self, Self::Git { .. } | Self::Io(_))
    }

    /// Manual steps an operator has to run to finish what the engine could not.
    ///
    /// Returns `None` for errors that have no working-copy side.
    pub fn recovery_steps(&self) -> Option<Vec<String>> {
        match self {
            Self::Git {
                command,
                working_copy,
                ..
            } => {
                let mut steps = vec![
                    format!("The following command failed: {command}"),
                    "Please execute it manually in the terminal:".to_string(),
                ];
                if let Some(path) = working_copy {
                    steps.push(format!("cd {}", path.display()));
                }
                steps.push(command.clone());
                Some(steps)
            }
            Self::Push {
                command,
                working_copy,
                remote,
                branch,
                ..
            } => Some(vec![
                format!("The following command failed: {command}"),
                "Navigate to the repository directory and push the changes manually:".to_string(),
                format!("cd {}", working_copy.display()),
                format!("git push {remote} {branch}"),
            ]),
            _ => None,
        }
    }
}
