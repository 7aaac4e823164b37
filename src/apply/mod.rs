//! Application engine
//!
//! Runs repositories one at a time, in input order. Within a repository a
//! worker pool prepares units while this task applies them to the working
//! copy strictly in order:
//! - plain commits are strict: any failure stops the run
//! - pull requests and discussions are best-effort: remote failures are
//!   counted and the next unit proceeds, local failures still stop the run

mod batch;
mod commits;
mod discussions;
mod progress;
mod pulls;
mod report;

pub use batch::{BatchProgress, BatchTracker, Pacer};
pub use progress::{NoopProgress, Phase, ProgressCallback};
pub use report::{FatalAbort, Operation, RepositoryReport, RunReport, UnitFailure};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::platform::HostingService;
use crate::repo::{GitExecutor, WorkingCopy};
use crate::schedule::{Schedule, Volume, plan, plan_spaced};
use crate::types::{ActivityRequest, WorkUnitKind};
use std::fs;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// One repository's worth of work
pub struct RepositoryJob {
    /// What to generate
    pub request: ActivityRequest,
    /// Hosting API for the repository (required for pull requests and
    /// discussions)
    pub hosting: Option<Box<dyn HostingService>>,
}

/// Compute the schedule for a request.
///
/// Plain commits follow the even-spread/sparse rules; pull requests and
/// discussions are always spaced evenly over the eligible days.
pub fn schedule_for(request: &ActivityRequest) -> Result<Schedule> {
    match (&request.kind, request.volume) {
        (WorkUnitKind::PlainCommit, volume) => plan(
            volume,
            &request.range,
            request.day_filter,
            &mut rand::rng(),
        ),
        (_, Volume::Total(total)) => plan_spaced(total, &request.range, request.day_filter),
        (kind, Volume::PerDay(_)) => Err(Error::Config(format!(
            "{} need a total count",
            kind.unit_noun()
        ))),
    }
}

/// Drives repositories through scheduling, preparation and application
pub struct Engine<'a> {
    git: &'a dyn GitExecutor,
    config: EngineConfig,
    workdir: PathBuf,
    progress: &'a dyn ProgressCallback,
}

impl<'a> Engine<'a> {
    /// Engine cloning working copies under `workdir`
    pub fn new(
        git: &'a dyn GitExecutor,
        config: EngineConfig,
        workdir: PathBuf,
        progress: &'a dyn ProgressCallback,
    ) -> Self {
        Self {
            git,
            config: config.normalized(),
            workdir,
            progress,
        }
    }

    /// Where a repository's working copy lives
    pub fn working_copy_path(&self, name: &str) -> PathBuf {
        self.workdir.join(name)
    }

    /// Process every job in order, stopping at the first fatal error.
    ///
    /// Reports of repositories finished before the fatal error are kept.
    pub async fn run(&self, jobs: Vec<RepositoryJob>) -> RunReport {
        let mut run = RunReport::default();

        for job in jobs {
            let (mut report, result) = self.run_repository(&job).await;
            match result {
                Ok(()) => {
                    info!(
                        "{}: {}/{} {} succeeded",
                        report.name, report.succeeded, report.attempted, report.unit_noun
                    );
                    self.progress.on_phase(Phase::Complete).await;
                    run.repositories.push(report);
                }
                Err(e) => {
                    error!("Stopping at {}: {e}", report.name);
                    report.aborted = true;
                    let repository = report.name.clone();
                    run.repositories.push(report);
                    run.fatal = Some(FatalAbort {
                        repository,
                        error: e,
                    });
                    break;
                }
            }
        }

        run
    }

    async fn run_repository(&self, job: &RepositoryJob) -> (RepositoryReport, Result<()>) {
        let request = &job.request;
        let name = request.repository.name.as_str();
        let noun = request.kind.unit_noun();

        let schedule = match schedule_for(request) {
            Ok(schedule) => schedule,
            Err(e) => return (RepositoryReport::new(name, &request.kind, 0), Err(e)),
        };
        let mut report = RepositoryReport::new(name, &request.kind, schedule.total());
        self.progress
            .on_repository(name, noun, schedule.total())
            .await;

        if schedule.is_empty() {
            info!("{name}: nothing scheduled");
            return (report, Ok(()));
        }

        let result = self.dispatch(job, &schedule, &mut report).await;
        (report, result)
    }

    async fn dispatch(
        &self,
        job: &RepositoryJob,
        schedule: &Schedule,
        report: &mut RepositoryReport,
    ) -> Result<()> {
        let request = &job.request;
        let hosting = job.hosting.as_deref();
        let noun = request.kind.unit_noun();

        match &request.kind {
            WorkUnitKind::PlainCommit => self.run_commits(request, schedule, report).await,
            WorkUnitKind::BranchedPr { commits } => {
                let hosting = require_hosting(hosting, noun)?;
                self.run_pulls(request, schedule, *commits, &[], hosting, report)
                    .await
            }
            WorkUnitKind::CoauthoredPr { commits, coauthors } => {
                let hosting = require_hosting(hosting, noun)?;
                self.run_pulls(request, schedule, *commits, coauthors, hosting, report)
                    .await
            }
            WorkUnitKind::Discussion => {
                let hosting = require_hosting(hosting, noun)?;
                self.run_discussions(request, schedule, hosting, report)
                    .await
            }
        }
    }

    async fn materialize(
        &self,
        request: &ActivityRequest,
        report: &mut RepositoryReport,
    ) -> Result<WorkingCopy<'a>> {
        self.progress.on_phase(Phase::Cloning).await;
        let path = self.working_copy_path(&request.repository.name);
        report.working_copy = Some(path.clone());

        WorkingCopy::materialize(
            self.git,
            &request.repository.clone_url,
            &path,
            &self.config.remote,
            &self.config.default_branch,
        )
    }

    /// Remove a finished working copy unless configured to keep it
    fn release(&self, working_copy: WorkingCopy<'_>, report: &mut RepositoryReport) {
        if self.config.keep_working_copies {
            return;
        }
        let path = working_copy.path().to_path_buf();
        drop(working_copy);

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!("Removed working copy {}", path.display());
                report.working_copy = None;
            }
            Err(e) => warn!("Could not remove {}: {e}", path.display()),
        }
    }

    /// Record a failed unit. The error comes back when the repository's
    /// processing mode halts on it; otherwise it is logged and the caller
    /// moves on to the next unit.
    async fn unit_failure(
        &self,
        report: &mut RepositoryReport,
        unit: Option<usize>,
        operation: Operation,
        error: Error,
    ) -> Result<()> {
        report.fail(unit, operation, &error);
        if report.mode.halts_on(&error) {
            return Err(error);
        }
        warn!("{}: {operation} failed: {error}", report.name);
        self.progress.on_error(&error).await;
        Ok(())
    }
}

fn require_hosting<'h>(
    hosting: Option<&'h dyn HostingService>,
    noun: &str,
) -> Result<&'h dyn HostingService> {
    hosting.ok_or_else(|| Error::Config(format!("{noun} need a GitHub repository")))
}

async fn join_producer(handle: JoinHandle<Result<()>>) -> Result<()> {
    handle
        .await
        .map_err(|e| Error::Internal(format!("preparation worker failed: {e}")))?
}
