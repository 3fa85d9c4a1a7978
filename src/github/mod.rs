// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Namespace for GitHub integration (API backends, raw payload shapes) plus shared request context
// role: github/namespace
// outputs: RepoRef, Deadline, and the api/raw submodules
// invariants: Every upstream call is bounded by the caller's Deadline
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

pub mod api;
pub mod raw;

/// `owner/name` pair identifying a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoRef {
  pub owner: String,
  pub name: String,
}

impl RepoRef {
  pub fn new(owner: &str, name: &str) -> Self {
    Self {
      owner: owner.to_string(),
      name: name.to_string(),
    }
  }
}

impl fmt::Display for RepoRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.owner, self.name)
  }
}

/// Point in time after which no further upstream requests are issued.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
  at: Instant,
}

impl Deadline {
  pub fn after(timeout: Duration) -> Self {
    let now = Instant::now();
    let at = now
      .checked_add(timeout)
      .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24));
    Self { at }
  }

  /// Time left before the deadline; `None` once it has passed.
  pub fn remaining(&self) -> Option<Duration> {
    self
      .at
      .checked_duration_since(Instant::now())
      .filter(|d| !d.is_zero())
  }

  pub fn expired(&self) -> bool {
    self.remaining().is_none()
  }
}
