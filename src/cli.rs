use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::github::api::DEFAULT_API_BASE;
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "prx",
    version,
    about = "Fetch a pull request's normalized timeline and derived state as JSON",
    long_about = None
)]
pub struct Cli {
  /// Pull request: owner/repo#123, owner/repo/pull/123, or a github.com URL
  #[arg(required_unless_present = "gen_man")]
  pub pr: Option<String>,

  /// Only accept cached data computed at or after this RFC 3339 instant
  #[arg(long)]
  pub reference_time: Option<String>,

  /// Bypass cached data (reference time = now)
  #[arg(long, conflicts_with = "reference_time")]
  pub fresh: bool,

  /// Cache directory (default: platform cache dir + /prx)
  #[arg(long)]
  pub cache_dir: Option<PathBuf>,

  /// Keep caches in memory only
  #[arg(long, conflicts_with = "cache_dir")]
  pub no_cache: bool,

  /// Overall deadline for upstream requests, in seconds
  #[arg(long, default_value_t = 120)]
  pub timeout_secs: u64,

  /// GitHub API base URL (GitHub Enterprise: https://HOST/api/v3)
  #[arg(long, default_value = DEFAULT_API_BASE)]
  pub api_base: String,

  /// Emit single-line JSON
  #[arg(long)]
  pub compact: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRef {
  pub owner: String,
  pub repo: String,
  pub number: u64,
}

static RE_PR_REF: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^(?:https?://github\.com/)?([\w.-]+)/([\w.-]+)(?:#|/pulls?/)(\d+)(?:[/?#].*)?$").unwrap()
});

pub fn parse_pr_ref(s: &str) -> Result<PrRef> {
  let Some(caps) = RE_PR_REF.captures(s.trim()) else {
    bail!("Unrecognized pull request reference {:?}; expected owner/repo#123 or a PR URL", s)
  };
  let number: u64 = caps[3].parse().with_context(|| format!("PR number out of range in {:?}", s))?;
  if number == 0 {
    bail!("PR number must be positive");
  }

  Ok(PrRef {
    owner: caps[1].to_string(),
    repo: caps[2].to_string(),
    number,
  })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub pr: PrRef,
  pub reference_time: DateTime<Utc>,
  pub compact: bool,
  pub config: Config,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let Some(pr_arg) = cli.pr.as_deref() else {
    bail!("Provide a pull request reference, e.g. owner/repo#123")
  };
  let pr = parse_pr_ref(pr_arg)?;

  // Epoch accepts any cached entry still within its TTL
  let reference_time = match (&cli.reference_time, cli.fresh) {
    (_, true) => Utc::now(),
    (Some(s), false) => util::parse_timestamp(s).with_context(|| format!("Invalid --reference-time {:?}", s))?,
    (None, false) => DateTime::UNIX_EPOCH,
  };

  if cli.timeout_secs == 0 {
    bail!("--timeout-secs must be at least 1");
  }

  let cache_dir = if cli.no_cache {
    None
  } else {
    cli.cache_dir.clone().or_else(util::default_cache_dir)
  };

  let config = Config {
    api_base: cli.api_base.clone(),
    cache_dir,
    timeout: Duration::from_secs(cli.timeout_secs),
    ..Config::default()
  };

  Ok(EffectiveConfig {
    pr,
    reference_time,
    compact: cli.compact,
    config,
  })
}
