//! The single on-disk checkout a repository's activity is applied to

use crate::error::{Error, Result};
use crate::repo::{EnvOverrides, GitExecutor, command_line};
use crate::types::PreparedUnit;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Mutable state of one repository's checkout.
///
/// Owned exclusively by the applier while the repository is processed;
/// every method mutates the checkout and must be called from one task, in
/// order.
pub struct WorkingCopy<'a> {
    git: &'a dyn GitExecutor,
    path: PathBuf,
    remote: String,
    default_branch: String,
    applied: usize,
}

impl<'a> WorkingCopy<'a> {
    /// Clone `clone_url` into `path`, replacing anything already there
    pub fn materialize(
        git: &'a dyn GitExecutor,
        clone_url: &str,
        path: &Path,
        remote: &str,
        default_branch: &str,
    ) -> Result<Self> {
        if path.exists() {
            debug!("Removing stale working copy at {}", path.display());
            fs::remove_dir_all(path)?;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let target = path.to_string_lossy();
        git.run(&["clone", clone_url, target.as_ref()], None, &EnvOverrides::none())?;

        Ok(Self {
            git,
            path: path.to_path_buf(),
            remote: remote.to_string(),
            default_branch: default_branch.to_string(),
            applied: 0,
        })
    }

    /// Checkout root
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Branch commits land on when no feature branch is in use
    pub fn default_branch(&self) -> &str {
        &self.default_branch
    }

    /// Units committed so far
    pub const fn applied(&self) -> usize {
        self.applied
    }

    /// Write, stage and commit one unit with its historical timestamp
    pub fn apply(&mut self, unit: &PreparedUnit) -> Result<()> {
        let file = self.path.join(&unit.file_name);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file, &unit.content)?;

        self.git(&["add", &unit.file_name], &EnvOverrides::none())?;

        let message = unit.commit_message();
        let env = EnvOverrides::backdated(&unit.git_timestamp());
        self.git(&["commit", "-m", &message], &env)?;

        self.applied += 1;
        Ok(())
    }

    /// Create `branch` from the current HEAD and switch to it
    pub fn create_branch(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", "-b", branch], &EnvOverrides::none())
    }

    /// Switch to an existing branch
    pub fn checkout(&self, branch: &str) -> Result<()> {
        self.git(&["checkout", branch], &EnvOverrides::none())
    }

    /// Switch back to the default branch
    pub fn checkout_default(&self) -> Result<()> {
        self.checkout(&self.default_branch)
    }

    /// Push `branch` to the remote
    pub fn push(&self, branch: &str) -> Result<()> {
        let args = ["push", self.remote.as_str(), branch];
        self.git(&args, &EnvOverrides::none())
            .map_err(|e| Error::Push {
                command: command_line(&args),
                working_copy: self.path.clone(),
                remote: self.remote.clone(),
                branch: branch.to_string(),
                stderr: match e {
                    Error::Git { stderr, .. } => stderr,
                    other => other.to_string(),
                },
            })
    }

    /// Push the default branch
    pub fn push_default(&self) -> Result<()> {
        self.push(&self.default_branch)
    }

    fn git(&self, args: &[&str], env: &EnvOverrides) -> Result<()> {
        self.git.run(args, Some(&self.path), env)
    }
}
