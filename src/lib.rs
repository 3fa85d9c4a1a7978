//! Pull request timeline normalization and derived-state engine.
//!
//! `Client::fetch` pulls a pull request's activity from GitHub, normalizes it
//! into a sorted `Event` list, resolves participant write access, derives
//! check/approval/mergeability summaries, and caches the result behind a
//! reference-time aware, single-flight cache.

pub mod access;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod github;
pub mod model;
pub mod normalize;
pub mod summary;
pub mod util;

pub use client::Client;
pub use config::Config;
pub use error::FetchError;
pub use model::{
  ApprovalSummary, CheckSummary, Event, EventKind, PullRequest, PullRequestData, ReviewState, TestState, WriteAccess,
};
