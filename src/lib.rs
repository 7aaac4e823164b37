//! git-backfill - historical activity scheduling and application
//!
//! Spreads commits, pull requests and discussions over a date range and
//! replays them against GitHub repositories with historical timestamps.
//!
//! The pipeline runs leaves first:
//! 1. [`schedule`] - distribute units over the date range
//! 2. [`prepare`] - build file content, messages and timestamps (parallel, pure)
//! 3. [`apply`] - apply prepared units to one working copy, strictly in order

pub mod apply;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod platform;
pub mod prepare;
pub mod repo;
pub mod schedule;
pub mod types;
