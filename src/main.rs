//! backfill - historical activity for GitHub repositories
//!
//! CLI binary spreading commits, pull requests and discussions over a date
//! range.

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use git_backfill::catalog::TopicPool;
use git_backfill::schedule::{FrequencyPolicy, Volume};
use git_backfill::types::{Coauthor, CommitRange, WorkUnitKind};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "backfill")]
#[command(about = "Backfill historical commits, pull requests and discussions on GitHub")]
#[command(version)]
struct Cli {
    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Commit straight onto the default branch, pushed once at the end
    Commits {
        #[command(flatten)]
        activity: cli::ActivityArgs,

        #[command(flatten)]
        volume: CommitVolume,
    },

    /// Open and merge pull requests whose commits carry historical dates
    Prs {
        #[command(flatten)]
        activity: cli::ActivityArgs,

        /// Pull requests to create per repository
        #[arg(long)]
        count: usize,

        /// Fewest commits in one pull request
        #[arg(long, default_value_t = 1)]
        commits_min: u32,

        /// Most commits in one pull request
        #[arg(long, default_value_t = 3)]
        commits_max: u32,

        /// Add Co-authored-by trailers to every commit
        #[arg(long)]
        coauthored: bool,

        /// Co-author to credit (repeatable, implies --coauthored)
        #[arg(long = "coauthor", value_name = "NAME <EMAIL>")]
        coauthors: Vec<String>,
    },

    /// Create discussions and accept an answer on each
    Discussions {
        #[command(flatten)]
        activity: cli::ActivityArgs,

        /// Discussions to create per repository
        #[arg(long)]
        count: usize,

        /// JSON file with [{"title", "question", "answer"}] topics
        #[arg(long, value_name = "FILE")]
        topics: Option<PathBuf>,
    },

    /// Repository management
    Repos {
        #[command(subcommand)]
        action: ReposAction,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

/// How many commits to schedule
#[derive(Args)]
struct CommitVolume {
    /// Commits to spread over the range
    #[arg(long, conflicts_with_all = ["fixed", "min", "max"])]
    total: Option<usize>,

    /// Exactly this many commits on every eligible day
    #[arg(long, conflicts_with_all = ["min", "max"])]
    fixed: Option<u32>,

    /// Random commits per day, at least this many
    #[arg(long, requires = "max")]
    min: Option<u32>,

    /// Random commits per day, at most this many
    #[arg(long, requires = "min")]
    max: Option<u32>,
}

impl CommitVolume {
    fn resolve(&self) -> git_backfill::error::Result<Volume> {
        match (self.total, self.fixed, self.min, self.max) {
            (Some(total), _, _, _) => Ok(Volume::Total(total)),
            (None, Some(n), _, _) => Ok(Volume::PerDay(FrequencyPolicy::fixed(n)?)),
            (None, None, Some(min), Some(max)) => {
                Ok(Volume::PerDay(FrequencyPolicy::random(min, max)?))
            }
            _ => Err(git_backfill::error::Error::Config(
                "pass --total N, --fixed N or --min N --max M".to_string(),
            )),
        }
    }
}

#[derive(Subcommand)]
enum ReposAction {
    /// Create repositories under your account
    Create {
        /// Names to create (defaults to stock names)
        names: Vec<String>,

        /// How many stock names to use when no names are given
        #[arg(long, default_value_t = 1)]
        defaults: usize,

        /// Create private repositories
        #[arg(long)]
        private: bool,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,git_backfill=debug,backfill=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Commits { activity, volume } => {
            let activity_kind = cli::Activity {
                kind: WorkUnitKind::PlainCommit,
                volume: volume.resolve()?,
                topics: TopicPool::default_catalog(),
            };
            cli::run_activity(activity, activity_kind).await?
        }
        Commands::Prs {
            activity,
            count,
            commits_min,
            commits_max,
            coauthored,
            coauthors,
        } => {
            let commits = CommitRange::new(commits_min, commits_max)?;
            let coauthors = coauthors
                .iter()
                .map(|c| Coauthor::parse(c))
                .collect::<git_backfill::error::Result<Vec<_>>>()?;
            let kind = if coauthored || !coauthors.is_empty() {
                WorkUnitKind::coauthored(commits, coauthors)
            } else {
                WorkUnitKind::BranchedPr { commits }
            };
            let activity_kind = cli::Activity {
                kind,
                volume: Volume::Total(count),
                topics: TopicPool::default_catalog(),
            };
            cli::run_activity(activity, activity_kind).await?
        }
        Commands::Discussions {
            activity,
            count,
            topics,
        } => {
            let topics = match topics {
                Some(path) => TopicPool::from_file(&path)?,
                None => TopicPool::default_catalog(),
            };
            let activity_kind = cli::Activity {
                kind: WorkUnitKind::Discussion,
                volume: Volume::Total(count),
                topics,
            };
            cli::run_activity(activity, activity_kind).await?
        }
        Commands::Repos {
            action:
                ReposAction::Create {
                    names,
                    defaults,
                    private,
                },
        } => {
            cli::run_repos_create(names, defaults, private).await?;
            0
        }
        Commands::Auth { action } => {
            match action {
                AuthAction::Test => cli::run_auth_test().await?,
                AuthAction::Setup => cli::run_auth_setup(),
            }
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
