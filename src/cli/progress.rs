//! Terminal progress: a spinner per repository plus styled event lines

use crate::cli::style::{
    Stream, Stylize, check, cross, hyperlink_url, outcome_role, spinner_style,
};
use anstream::{eprintln, println};
use async_trait::async_trait;
use git_backfill::apply::{BatchProgress, Phase, ProgressCallback};
use git_backfill::error::Error;
use git_backfill::types::{Discussion, PullRequestRecord};
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// Progress callback printing to the terminal
pub struct CliProgress {
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Progress with no spinner running yet
    pub const fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    /// Print a line without tearing the spinner
    fn line(&self, f: impl FnOnce()) {
        let guard = self.spinner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_ref() {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    fn set_message(&self, message: String) {
        let guard = self.spinner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(spinner) = guard.as_ref() {
            spinner.set_message(message);
        }
    }

    /// Stop and clear the spinner, if one is running
    pub fn finish(&self) {
        let mut guard = self.spinner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(spinner) = guard.take() {
            spinner.finish_and_clear();
        }
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Cloning => "cloning",
        Phase::Applying => "committing",
        Phase::Pushing => "pushing",
        Phase::PullRequests => "opening pull requests",
        Phase::Discussions => "creating discussions",
        Phase::Complete => "done",
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_repository(&self, name: &str, unit_noun: &str, planned: usize) {
        self.finish();
        println!(
            "{} {} {}",
            name.emphasis(),
            planned.accent(),
            unit_noun.muted()
        );

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_prefix(name.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(spinner);
    }

    async fn on_phase(&self, phase: Phase) {
        if phase == Phase::Complete {
            self.finish();
            return;
        }
        self.set_message(format!("{}...", phase_label(phase)));
    }

    async fn on_batch(&self, batch: &BatchProgress) {
        self.set_message(format!("{}/{}", batch.done, batch.total));
        self.line(|| {
            println!(
                "  batch {}/{}: {}/{} ok",
                batch.batch,
                batch.batches,
                batch.succeeded.accent(),
                batch.attempted
            );
        });
    }

    async fn on_pull_request(&self, record: &PullRequestRecord) {
        let number = record
            .number
            .map_or_else(|| "-".to_string(), |n| format!("#{n}"));
        let url = record
            .html_url
            .as_deref()
            .map(|u| hyperlink_url(Stream::Stdout, u))
            .unwrap_or_default();

        let outcome = record.outcome.to_string();
        let outcome = outcome.role(outcome_role(record.outcome));
        self.line(|| {
            if record.outcome.is_merged() {
                println!(
                    "  {} {} {} {} {}",
                    check(),
                    number.accent(),
                    record.branch,
                    outcome.for_stdout(),
                    url.muted()
                );
            } else {
                eprintln!("  {} {} {} ({outcome})", cross(), number, record.branch);
            }
        });
    }

    async fn on_discussion(&self, discussion: &Discussion) {
        let url = hyperlink_url(Stream::Stdout, &discussion.url);
        self.line(|| {
            println!(
                "  {} discussion {} {}",
                check(),
                format!("#{}", discussion.number).accent(),
                url.muted()
            );
        });
    }

    async fn on_error(&self, error: &Error) {
        self.line(|| eprintln!("  {}: {error}", "error".error()));
    }

    async fn on_message(&self, message: &str) {
        self.line(|| println!("  {}", message.warn().for_stdout()));
    }
}
