//! Version-control access
//!
//! All git invocations go through [`GitExecutor`] so the engine can run
//! against a recording fake in tests. Timestamps travel as an explicit
//! [`EnvOverrides`] value per call, never through process-wide state.

mod working_copy;

pub use working_copy::WorkingCopy;

use crate::error::{Error, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Environment variables set for a single git invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    vars: Vec<(String, String)>,
}

impl EnvOverrides {
    /// No overrides
    pub const fn none() -> Self {
        Self { vars: Vec::new() }
    }

    /// Author and committer dates both pinned to `timestamp`
    pub fn backdated(timestamp: &str) -> Self {
        Self {
            vars: vec![
                ("GIT_AUTHOR_DATE".to_string(), timestamp.to_string()),
                ("GIT_COMMITTER_DATE".to_string(), timestamp.to_string()),
            ],
        }
    }

    /// Value of one override
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All overrides in insertion order
    pub fn vars(&self) -> &[(String, String)] {
        &self.vars
    }
}

/// Runs git commands
pub trait GitExecutor: Send + Sync {
    /// Run `git <args>` in `cwd` with `env` applied on top of the inherited
    /// environment. Fails with [`Error::Git`] on a non-zero exit.
    fn run(&self, args: &[&str], cwd: Option<&Path>, env: &EnvOverrides) -> Result<()>;
}

/// Render a git invocation the way an operator would type it
pub fn command_line(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        if arg.contains(char::is_whitespace) {
            line.push('"');
            line.push_str(&arg.replace('"', "\\\""));
            line.push('"');
        } else {
            line.push_str(arg);
        }
    }
    line
}

/// [`GitExecutor`] backed by the system `git` binary.
///
/// Uses whatever authentication the user's git is configured with
/// (credential helpers, SSH keys).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl GitExecutor for SystemGit {
    fn run(&self, args: &[&str], cwd: Option<&Path>, env: &EnvOverrides) -> Result<()> {
        let rendered = command_line(args);
        debug!("Running: {rendered}");

        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in env.vars() {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| Error::Git {
            command: rendered.clone(),
            working_copy: cwd.map(Path::to_path_buf),
            stderr: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(Error::Git {
                command: rendered,
                working_copy: cwd.map(Path::to_path_buf),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }
}
