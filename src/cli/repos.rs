//! Repos command - create repositories to backfill

use anstream::println;
use git_backfill::auth::get_github_auth;
use git_backfill::catalog::DEFAULT_REPO_NAMES;
use git_backfill::error::{Error, Result};
use git_backfill::platform::{CreatedRepository, create_account};
use git_backfill::types::validate_repo_name;

use crate::cli::style::{Stream, Stylize, arrow, check, hyperlink_url};

/// Names to create: the given ones, else the first `defaults` stock names
pub fn resolve_names(names: Vec<String>, defaults: usize) -> Result<Vec<String>> {
    let names = if names.is_empty() {
        if defaults == 0 || defaults > DEFAULT_REPO_NAMES.len() {
            return Err(Error::Config(format!(
                "--defaults must be between 1 and {}",
                DEFAULT_REPO_NAMES.len()
            )));
        }
        DEFAULT_REPO_NAMES[..defaults]
            .iter()
            .map(ToString::to_string)
            .collect()
    } else {
        names
    };

    for name in &names {
        validate_repo_name(name)?;
    }
    Ok(names)
}

/// Create repositories under the authenticated account
pub async fn run_repos_create(names: Vec<String>, defaults: usize, private: bool) -> Result<()> {
    let names = resolve_names(names, defaults)?;
    let auth = get_github_auth().await?;
    let account = create_account(&auth)?;

    let mut created = Vec::new();
    for name in &names {
        match account.create_repository(name, private).await? {
            CreatedRepository::Created(target) => {
                println!(
                    "{} Created {} {}",
                    check(),
                    target.name.accent(),
                    hyperlink_url(Stream::Stdout, &target.clone_url).muted()
                );
                created.push(target);
            }
            CreatedRepository::AlreadyExists => {
                println!("  {} already exists, skipped", name.warn().for_stdout());
            }
        }
    }

    if !created.is_empty() {
        println!();
        println!("{} Backfill them with:", arrow());
        let repos: Vec<String> = created
            .iter()
            .map(|t| format!("--repo {}={}", t.name, t.clone_url))
            .collect();
        println!(
            "  backfill commits {} --start YYYY-MM-DD --total N",
            repos.join(" ")
        );
    }
    Ok(())
}
