use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{COLLABORATORS_TTL, PERMISSION_TTL, PULL_REQUEST_TTL};
use crate::github::api::DEFAULT_API_BASE;
use crate::util::default_cache_dir;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Library configuration owned by a `Client`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
  pub api_base: String,
  /// `None` keeps every cache in memory only.
  pub cache_dir: Option<PathBuf>,
  pub timeout: Duration,
  pub pull_request_ttl: Duration,
  pub collaborators_ttl: Duration,
  pub permission_ttl: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_base: DEFAULT_API_BASE.to_string(),
      cache_dir: default_cache_dir(),
      timeout: DEFAULT_TIMEOUT,
      pull_request_ttl: PULL_REQUEST_TTL,
      collaborators_ttl: COLLABORATORS_TTL,
      permission_ttl: PERMISSION_TTL,
    }
  }
}

impl Config {
  pub fn in_memory() -> Self {
    Self {
      cache_dir: None,
      ..Self::default()
    }
  }

  pub fn pull_request_cache_dir(&self) -> Option<PathBuf> {
    self.cache_dir.as_ref().map(|d| d.join("pulls"))
  }
}
