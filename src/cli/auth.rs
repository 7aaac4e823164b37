//! Auth command - check and explain authentication

use anstream::println;
use git_backfill::auth::{REQUIRED_SCOPES, get_github_auth, missing_scopes};
use git_backfill::error::Result;
use git_backfill::platform::create_account;

use crate::cli::style::{Stylize, arrow, check, cross};

/// Resolve a token, ask GitHub who owns it and whether it can do everything
pub async fn run_auth_test() -> Result<()> {
    let config = get_github_auth().await?;
    let user = create_account(&config)?.current_user().await?;

    println!(
        "{} Authenticated as {} (token from {})",
        check(),
        user.login.accent(),
        config.source.muted()
    );

    match user.scopes.as_deref() {
        Some(scopes) => {
            let missing = missing_scopes(Some(scopes));
            if missing.is_empty() {
                println!("  scopes: {}", scopes.join(", ").muted());
            } else {
                println!(
                    "{} Token lacks {}; some activity kinds will fail",
                    cross(),
                    missing.join(", ").warn().for_stdout()
                );
            }
        }
        None => println!(
            "  fine-grained token: make sure it grants contents, pull requests and discussions"
        ),
    }
    Ok(())
}

/// Print setup instructions
pub fn run_auth_setup() {
    println!("{}", "Authenticating git-backfill".emphasis());
    println!();
    println!("{} gh CLI (preferred)", arrow());
    println!("  gh auth login --scopes {}", REQUIRED_SCOPES.join(","));
    println!();
    println!("{} Token in the environment", arrow());
    println!(
        "  export GITHUB_TOKEN=<classic token with {}>",
        REQUIRED_SCOPES.join(" and ")
    );
    println!("  GH_TOKEN is read when GITHUB_TOKEN is unset");
    println!();
    println!("{} GitHub Enterprise", arrow());
    println!("  export GH_HOST=<your instance hostname>");
    println!();
    println!(
        "Pushing uses your git credentials; the token is only for the API \
         (pull requests, discussions, repository creation)."
    );
}
