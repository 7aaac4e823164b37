//! Recording git executor
//!
//! Stands in for the system `git` binary: every invocation is recorded and
//! nothing touches a real repository. The working-copy files written by the
//! engine still land on disk under the test's temp dir.

#![allow(dead_code)]

use git_backfill::error::{Error, Result};
use git_backfill::repo::{EnvOverrides, GitExecutor, command_line};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One recorded `git` invocation
#[derive(Debug, Clone)]
pub struct GitCall {
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: EnvOverrides,
}

impl GitCall {
    /// First argument (`clone`, `commit`, `push`, ...)
    pub fn subcommand(&self) -> &str {
        self.args.first().map_or("", String::as_str)
    }

    /// Message passed with `commit -m`
    pub fn commit_message(&self) -> Option<&str> {
        let pos = self.args.iter().position(|a| a == "-m")?;
        self.args.get(pos + 1).map(String::as_str)
    }
}

/// Failure rule: the `occurrence`th (zero-based) call of `subcommand`
/// fails, or every such call when `occurrence` is None
#[derive(Debug, Clone)]
struct FailRule {
    subcommand: String,
    occurrence: Option<usize>,
    stderr: String,
}

#[derive(Default)]
pub struct RecordingGit {
    calls: Mutex<Vec<GitCall>>,
    rules: Mutex<Vec<FailRule>>,
}

impl RecordingGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `subcommand`
    pub fn fail_on(&self, subcommand: &str, stderr: &str) {
        self.rules.lock().unwrap().push(FailRule {
            subcommand: subcommand.to_string(),
            occurrence: None,
            stderr: stderr.to_string(),
        });
    }

    /// Fail only the `occurrence`th call (zero-based) of `subcommand`
    pub fn fail_nth(&self, subcommand: &str, occurrence: usize, stderr: &str) {
        self.rules.lock().unwrap().push(FailRule {
            subcommand: subcommand.to_string(),
            occurrence: Some(occurrence),
            stderr: stderr.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded calls of one subcommand, in order
    pub fn calls_of(&self, subcommand: &str) -> Vec<GitCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.subcommand() == subcommand)
            .collect()
    }

    /// `GIT_AUTHOR_DATE` of every commit, in order
    pub fn commit_dates(&self) -> Vec<String> {
        self.calls_of("commit")
            .iter()
            .filter_map(|c| c.env.get("GIT_AUTHOR_DATE").map(ToString::to_string))
            .collect()
    }
}

impl GitExecutor for RecordingGit {
    fn run(&self, args: &[&str], cwd: Option<&Path>, env: &EnvOverrides) -> Result<()> {
        let call = GitCall {
            args: args.iter().map(ToString::to_string).collect(),
            cwd: cwd.map(Path::to_path_buf),
            env: env.clone(),
        };
        let subcommand = call.subcommand().to_string();

        let occurrence = {
            let mut calls = self.calls.lock().unwrap();
            let seen = calls
                .iter()
                .filter(|c| c.subcommand() == subcommand)
                .count();
            calls.push(call);
            seen
        };

        let rules = self.rules.lock().unwrap();
        let failing = rules.iter().find(|r| {
            r.subcommand == subcommand && r.occurrence.is_none_or(|n| n == occurrence)
        });
        if let Some(rule) = failing {
            return Err(Error::Git {
                command: command_line(args),
                working_copy: cwd.map(Path::to_path_buf),
                stderr: rule.stderr.clone(),
            });
        }
        Ok(())
    }
}
