//! CLI commands
//!
//! Command implementations for the `backfill` binary.

mod auth;
mod progress;
mod repos;
mod run;
mod style;

pub use auth::{run_auth_setup, run_auth_test};
pub use repos::run_repos_create;
pub use run::{Activity, ActivityArgs, run_activity};
