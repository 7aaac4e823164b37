//! Activity commands - commits, prs and discussions

use anstream::{eprintln, println};
use clap::{Args, ValueEnum};
use dialoguer::Confirm;
use dialoguer::theme::ColorfulTheme;
use git_backfill::apply::{Engine, RepositoryJob, RunReport, schedule_for};
use git_backfill::auth::{GitHubAuthConfig, get_github_auth};
use git_backfill::catalog::{MessagePool, TopicPool};
use git_backfill::config::{
    DEFAULT_INTER_CALL_DELAY_MS, DEFAULT_LOCAL_BATCH_SIZE, DEFAULT_REMOTE_BATCH_SIZE,
    DEFAULT_WORKERS, EngineConfig,
};
use git_backfill::error::{Error, Result};
use git_backfill::platform::{CreatedRepository, create_account, create_hosting_service};
use git_backfill::repo::SystemGit;
use git_backfill::schedule::{DateRange, DayFilter, Volume};
use git_backfill::types::{ActivityRequest, RepoTarget, WorkUnitKind, validate_repo_name};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, arrow, check, cross};

/// Days allowed to receive activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DaysArg {
    /// Every day
    All,
    /// Monday to Friday
    Weekdays,
    /// Saturday and Sunday
    Weekends,
}

impl From<DaysArg> for DayFilter {
    fn from(days: DaysArg) -> Self {
        match days {
            DaysArg::All => Self::All,
            DaysArg::Weekdays => Self::Weekdays,
            DaysArg::Weekends => Self::Weekends,
        }
    }
}

/// Options shared by every activity command
#[derive(Debug, Args)]
pub struct ActivityArgs {
    /// Existing repository to backfill (repeatable)
    #[arg(long = "repo", value_name = "NAME=URL")]
    pub repos: Vec<String>,

    /// Create a repository under your account and backfill it (repeatable)
    #[arg(long = "create", value_name = "NAME")]
    pub create: Vec<String>,

    /// Make created repositories private
    #[arg(long)]
    pub private: bool,

    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// Last day of the range (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub end: Option<String>,

    /// Which days may receive activity
    #[arg(long, value_enum, default_value_t = DaysArg::All)]
    pub days: DaysArg,

    /// File with one commit message per line, shared by every repository
    #[arg(long, value_name = "FILE")]
    pub messages: Option<PathBuf>,

    /// Commit messages for one repository, instead of --messages (repeatable)
    #[arg(long = "repo-messages", value_name = "NAME=FILE")]
    pub repo_messages: Vec<String>,

    /// Directory working copies are cloned into
    #[arg(long, env = "BACKFILL_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Units prepared per local batch
    #[arg(long, default_value_t = DEFAULT_LOCAL_BATCH_SIZE)]
    pub batch_size: usize,

    /// Pull requests or discussions per remote batch
    #[arg(long, default_value_t = DEFAULT_REMOTE_BATCH_SIZE)]
    pub remote_batch_size: usize,

    /// Pause between API calls in milliseconds (500-3000 recommended)
    #[arg(long, default_value_t = DEFAULT_INTER_CALL_DELAY_MS)]
    pub delay_ms: u64,

    /// Preparation worker threads
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Branch to commit to and merge into
    #[arg(long, default_value = "main")]
    pub branch: String,

    /// Remote to push to
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Keep working copies after a successful run
    #[arg(long)]
    pub keep_workdir: bool,

    /// Don't ask for confirmation before pushing
    #[arg(short, long)]
    pub yes: bool,

    /// Show the schedule without touching any repository
    #[arg(long)]
    pub dry_run: bool,
}

impl ActivityArgs {
    fn range(&self) -> Result<DateRange> {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
        DateRange::parse(&self.start, self.end.as_deref().unwrap_or(&today))
    }

    fn message_catalogs(&self, targets: &[RepoTarget]) -> Result<MessageCatalogs> {
        let shared = self
            .messages
            .as_deref()
            .map_or_else(|| Ok(MessagePool::default_catalog()), MessagePool::from_file)?;

        let mut per_repo = HashMap::new();
        for arg in &self.repo_messages {
            let (name, file) = arg.split_once('=').ok_or_else(|| {
                Error::Config(format!("invalid --repo-messages '{arg}': expected NAME=FILE"))
            })?;
            let known = targets.iter().any(|t| t.name == name)
                || self.create.iter().any(|c| c == name);
            if !known {
                return Err(Error::Config(format!(
                    "--repo-messages names unknown repository '{name}'"
                )));
            }
            let pool = MessagePool::from_file(Path::new(file))?;
            if per_repo.insert(name.to_string(), pool).is_some() {
                return Err(Error::Config(format!(
                    "--repo-messages given twice for '{name}'"
                )));
            }
        }
        Ok(MessageCatalogs { shared, per_repo })
    }

    fn targets(&self) -> Result<Vec<RepoTarget>> {
        let targets = self
            .repos
            .iter()
            .map(|arg| RepoTarget::parse(arg))
            .collect::<Result<Vec<_>>>()?;
        for name in &self.create {
            validate_repo_name(name)?;
        }
        if targets.is_empty() && self.create.is_empty() {
            return Err(Error::Config(
                "no repositories given; pass --repo NAME=URL or --create NAME".to_string(),
            ));
        }
        Ok(targets)
    }

    fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            local_batch_size: self.batch_size,
            remote_batch_size: self.remote_batch_size,
            inter_call_delay: Duration::from_millis(self.delay_ms),
            workers: self.workers,
            default_branch: self.branch.clone(),
            remote: self.remote.clone(),
            keep_working_copies: self.keep_workdir,
            ..EngineConfig::default()
        }
    }

    fn workdir(&self) -> PathBuf {
        self.workdir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("git-backfill")
                .join("work")
        })
    }
}

/// Commit messages: one shared pool plus per-repository overrides
struct MessageCatalogs {
    shared: MessagePool,
    per_repo: HashMap<String, MessagePool>,
}

impl MessageCatalogs {
    fn for_repo(&self, name: &str) -> MessagePool {
        self.per_repo.get(name).unwrap_or(&self.shared).clone()
    }
}

/// What to generate, resolved from a subcommand
pub struct Activity {
    /// Kind of unit
    pub kind: WorkUnitKind,
    /// How many
    pub volume: Volume,
    /// Discussion topics
    pub topics: TopicPool,
}

/// Validate, confirm and run an activity command. Returns the exit code.
pub async fn run_activity(args: ActivityArgs, activity: Activity) -> Result<i32> {
    let range = args.range()?;
    let targets = args.targets()?;
    let messages = args.message_catalogs(&targets)?;
    let day_filter = DayFilter::from(args.days);

    let build = |repository: RepoTarget| {
        let messages = messages.for_repo(&repository.name);
        ActivityRequest::new(
            repository,
            range,
            activity.volume,
            day_filter,
            messages,
            activity.topics.clone(),
            activity.kind.clone(),
        )
    };

    // Validate everything, including repositories still to be created,
    // before touching the network
    let pending: Vec<ActivityRequest> = args
        .create
        .iter()
        .map(|name| {
            build(RepoTarget {
                name: name.clone(),
                clone_url: String::new(),
            })
        })
        .collect::<Result<_>>()?;
    let mut requests: Vec<ActivityRequest> =
        targets.into_iter().map(&build).collect::<Result<_>>()?;

    if args.dry_run {
        print_dry_run(requests.iter().chain(&pending), &range)?;
        return Ok(0);
    }

    let noun = activity.kind.unit_noun();
    let repo_count = requests.len() + pending.len();
    if !args.yes && !confirm(noun, repo_count)? {
        println!("Aborted, nothing was pushed");
        return Ok(0);
    }

    let needs_hosting = activity.kind != WorkUnitKind::PlainCommit;
    let auth = if needs_hosting || !pending.is_empty() {
        Some(get_github_auth().await?)
    } else {
        None
    };

    if let Some(auth) = &auth {
        for target in create_repositories(auth, &args.create, args.private).await? {
            requests.push(build(target)?);
        }
    }

    let mut jobs = Vec::with_capacity(requests.len());
    for request in requests {
        let hosting = match (&auth, needs_hosting) {
            (Some(auth), true) => Some(create_hosting_service(auth, &request.repository.clone_url)?),
            _ => None,
        };
        jobs.push(RepositoryJob { request, hosting });
    }

    let progress = CliProgress::new();
    let git = SystemGit;
    let engine = Engine::new(&git, args.engine_config(), args.workdir(), &progress);
    let report = engine.run(jobs).await;
    progress.finish();

    print_report(&report);
    Ok(report.exit_code())
}

fn confirm(noun: &str, repos: usize) -> Result<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Push generated {noun} to {repos} repositor{}?",
            if repos == 1 { "y" } else { "ies" }
        ))
        .default(false)
        .interact()
        .map_err(|e| Error::Internal(format!("confirmation prompt failed: {e}")))
}

async fn create_repositories(
    auth: &GitHubAuthConfig,
    names: &[String],
    private: bool,
) -> Result<Vec<RepoTarget>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }
    let account = create_account(auth)?;
    let mut login = None;
    let mut targets = Vec::with_capacity(names.len());

    for name in names {
        match account.create_repository(name, private).await? {
            CreatedRepository::Created(target) => {
                println!("{} Created {}", check(), target.name.accent());
                targets.push(target);
            }
            CreatedRepository::AlreadyExists => {
                if login.is_none() {
                    login = Some(account.current_user().await?.login);
                }
                let owner = login.as_deref().unwrap_or_default();
                println!("  {} already exists, using it", name.accent());
                targets.push(RepoTarget {
                    name: name.clone(),
                    clone_url: account.repository_url(owner, name),
                });
            }
        }
    }
    Ok(targets)
}

fn print_dry_run<'r>(
    requests: impl Iterator<Item = &'r ActivityRequest>,
    range: &DateRange,
) -> Result<()> {
    println!(
        "{} {} to {} ({} days)",
        "Dry run:".emphasis(),
        range.start(),
        range.end(),
        range.day_count()
    );
    for request in requests {
        let schedule = schedule_for(request)?;
        let span = schedule.span().map_or_else(
            || "nothing scheduled".to_string(),
            |(first, last)| format!("{first} .. {last}"),
        );
        println!(
            "  {} {} {} over {} days {}",
            request.repository.name.emphasis(),
            schedule.total().accent(),
            request.kind.unit_noun(),
            schedule.entries().len(),
            span.muted()
        );
    }
    println!("No repository was touched");
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("{}", "Summary".emphasis());
    for repo in &report.repositories {
        let counts = format!("{}/{} {}", repo.succeeded, repo.attempted, repo.unit_noun);
        if repo.is_success() {
            println!("  {} {} {}", check(), repo.name.accent(), counts);
        } else if let Some(reason) = &repo.skipped {
            println!("  {} {} skipped: {}", arrow(), repo.name.accent(), reason.warn().for_stdout());
        } else {
            println!("  {} {} {}", cross(), repo.name.accent(), counts.warn().for_stdout());
        }
        for failure in &repo.failures {
            let status = failure
                .status
                .map(|s| format!(" (HTTP {s})"))
                .unwrap_or_default();
            println!(
                "      {}{}: {}",
                failure.operation,
                status,
                failure.message.muted()
            );
        }
        if let Some(path) = &repo.working_copy {
            println!("      working copy: {}", path.display().muted());
        }
    }

    if let Some(fatal) = &report.fatal {
        eprintln!();
        eprintln!(
            "{} {} stopped the run: {}",
            "error:".error(),
            fatal.repository,
            fatal.error
        );
        let steps = fatal.recovery_steps();
        if !steps.is_empty() {
            eprintln!();
            for step in steps {
                eprintln!("  {step}");
            }
        }
    }
}
