//! Test data factories for git-backfill types

#![allow(dead_code)]

use git_backfill::apply::{Engine, NoopProgress, RepositoryJob};
use git_backfill::catalog::{MessagePool, TopicPool};
use git_backfill::config::EngineConfig;
use git_backfill::platform::HostingService;
use git_backfill::repo::GitExecutor;
use git_backfill::schedule::{DateRange, DayFilter, Volume};
use git_backfill::types::{ActivityRequest, RepoTarget, WorkUnitKind};
use std::path::Path;
use std::time::Duration;

/// Shared no-op progress sink
pub static NOOP: NoopProgress = NoopProgress;

/// Repository target with a fake clone URL
pub fn make_target(name: &str) -> RepoTarget {
    RepoTarget {
        name: name.to_string(),
        clone_url: format!("https://github.com/octo/{name}.git"),
    }
}

/// Inclusive range from two `YYYY-MM-DD` strings
pub fn make_range(start: &str, end: &str) -> DateRange {
    DateRange::parse(start, end).unwrap()
}

/// Request with the default catalogs and no day filter
pub fn make_request(name: &str, range: DateRange, volume: Volume, kind: WorkUnitKind) -> ActivityRequest {
    ActivityRequest::new(
        make_target(name),
        range,
        volume,
        DayFilter::All,
        MessagePool::default_catalog(),
        TopicPool::default_catalog(),
        kind,
    )
    .unwrap()
}

/// Job without a hosting service
pub fn make_job(request: ActivityRequest) -> RepositoryJob {
    RepositoryJob {
        request,
        hosting: None,
    }
}

/// Job with a hosting service
pub fn make_hosted_job(request: ActivityRequest, hosting: Box<dyn HostingService>) -> RepositoryJob {
    RepositoryJob {
        request,
        hosting: Some(hosting),
    }
}

/// Small batches and no pacing, so tests run instantly
pub fn test_config() -> EngineConfig {
    EngineConfig {
        local_batch_size: 5,
        remote_batch_size: 2,
        inter_call_delay: Duration::ZERO,
        workers: 2,
        ..EngineConfig::default()
    }
}

/// Engine over `git` cloning into `workdir`
pub fn make_engine<'a>(git: &'a dyn GitExecutor, workdir: &Path) -> Engine<'a> {
    Engine::new(git, test_config(), workdir.to_path_buf(), &NOOP)
}
