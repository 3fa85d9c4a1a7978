// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: GitHub API seam (per-resource REST calls) with an HTTP backend and a fixture backend for tests
// role: github/api
// inputs: RepoRef, PR number / commit SHA / branch, Deadline; env GITHUB_TOKEN/GH_TOKEN; optional `gh` CLI; PRX_TEST_* fixtures
// outputs: Raw serde_json::Value payloads (lists are fully paginated)
// side_effects: Network calls to the configured API base; spawns `gh` subprocess for token discovery
// invariants:
// - Never panic; every failure is a FetchError carrying the HTTP status when one exists
// - Token discovery prefers GITHUB_TOKEN, then GH_TOKEN, then `gh auth token`
// - Pagination follows Link rel="next" and stops after MAX_PAGES
// errors: Returned to the pipeline, which decides whether a gap is fatal
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Deadline, RepoRef};
use crate::error::FetchError;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("prx/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u32 = 100;
const MAX_PAGES: usize = 30;

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t.trim().to_string());
      }
    }
  }

  let output = std::process::Command::new("gh").args(["auth", "token"]).output().ok()?;

  if !output.status.success() {
    return None;
  }

  let t = String::from_utf8_lossy(&output.stdout).trim().to_string();
  (!t.is_empty()).then_some(t)
}

// --- Trait seam for GitHub API ---
pub trait GithubApi: Send + Sync {
  fn pull_request(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Value, FetchError>;
  fn pull_commits(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn issue_comments(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn pull_reviews(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn review_comments(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn issue_timeline(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn commit_statuses(&self, repo: &RepoRef, sha: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn commit_check_runs(&self, repo: &RepoRef, sha: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  /// Branch protection `required_status_checks` object.
  fn branch_protection_checks(&self, repo: &RepoRef, branch: &str, deadline: &Deadline) -> Result<Value, FetchError>;
  /// Active ruleset rules applying to `branch`.
  fn branch_rules(&self, repo: &RepoRef, branch: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn collaborators(&self, repo: &RepoRef, deadline: &Deadline) -> Result<Vec<Value>, FetchError>;
  fn collaborator_permission(&self, repo: &RepoRef, login: &str, deadline: &Deadline) -> Result<Value, FetchError>;
}

/// Extract the `rel="next"` URL from a `Link` header.
fn next_link(header: &str) -> Option<String> {
  header.split(',').find_map(|part| {
    let (url, params) = part.split_once(';')?;
    let is_next = params.split(';').any(|p| p.trim() == "rel=\"next\"");
    is_next.then(|| url.trim().trim_start_matches('<').trim_end_matches('>').to_string())
  })
}

fn with_per_page(url: &str) -> String {
  let sep = if url.contains('?') { '&' } else { '?' };
  format!("{}{}per_page={}", url, sep, PER_PAGE)
}

fn into_array(v: Value) -> Vec<Value> {
  match v {
    Value::Array(items) => items,
    _ => Vec::new(),
  }
}

fn check_runs_array(mut v: Value) -> Vec<Value> {
  into_array(v.get_mut("check_runs").map(Value::take).unwrap_or(Value::Null))
}

pub struct GithubHttpApi {
  agent: ureq::Agent,
  base_url: String,
  token: Option<String>,
}

impl GithubHttpApi {
  pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(timeout).user_agent(USER_AGENT).build();

    Self {
      agent,
      base_url: base_url.trim_end_matches('/').to_string(),
      token,
    }
  }

  fn repo_url(&self, repo: &RepoRef, rest: &str) -> String {
    format!("{}/repos/{}/{}/{}", self.base_url, repo.owner, repo.name, rest)
  }

  fn get(&self, url: &str, deadline: &Deadline) -> Result<ureq::Response, FetchError> {
    let remaining = deadline.remaining().ok_or(FetchError::Timeout)?;

    let mut req = self
      .agent
      .get(url)
      .set("Accept", "application/vnd.github+json")
      .set("X-GitHub-Api-Version", API_VERSION)
      .timeout(remaining);

    if let Some(token) = &self.token {
      req = req.set("Authorization", &format!("Bearer {}", token));
    }

    debug!(url, "GET");

    match req.call() {
      Ok(resp) => Ok(resp),
      Err(ureq::Error::Status(status, _)) => Err(FetchError::Status {
        status,
        url: url.to_string(),
      }),
      Err(ureq::Error::Transport(t)) => Err(FetchError::Transport(t.to_string())),
    }
  }

  fn get_json(&self, url: &str, deadline: &Deadline) -> Result<Value, FetchError> {
    self.get(url, deadline)?.into_json::<Value>().map_err(|e| FetchError::Decode {
      url: url.to_string(),
      message: e.to_string(),
    })
  }

  fn get_paged(&self, url: &str, deadline: &Deadline, extract: fn(Value) -> Vec<Value>) -> Result<Vec<Value>, FetchError> {
    let mut out = Vec::new();
    let mut next = Some(with_per_page(url));
    let mut pages = 0usize;

    while let Some(page_url) = next.take() {
      let resp = self.get(&page_url, deadline)?;
      next = resp.header("link").and_then(next_link);

      let v = resp.into_json::<Value>().map_err(|e| FetchError::Decode {
        url: page_url.clone(),
        message: e.to_string(),
      })?;
      out.extend(extract(v));

      pages += 1;
      if pages >= MAX_PAGES && next.is_some() {
        warn!(url, pages, "pagination cap reached; truncating");
        break;
      }
    }

    Ok(out)
  }
}

impl GithubApi for GithubHttpApi {
  fn pull_request(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Value, FetchError> {
    self.get_json(&self.repo_url(repo, &format!("pulls/{}", number)), deadline)
  }

  fn pull_commits(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("pulls/{}/commits", number)), deadline, into_array)
  }

  fn issue_comments(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("issues/{}/comments", number)), deadline, into_array)
  }

  fn pull_reviews(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("pulls/{}/reviews", number)), deadline, into_array)
  }

  fn review_comments(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("pulls/{}/comments", number)), deadline, into_array)
  }

  fn issue_timeline(&self, repo: &RepoRef, number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("issues/{}/timeline", number)), deadline, into_array)
  }

  fn commit_statuses(&self, repo: &RepoRef, sha: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("commits/{}/statuses", sha)), deadline, into_array)
  }

  fn commit_check_runs(&self, repo: &RepoRef, sha: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("commits/{}/check-runs", sha)), deadline, check_runs_array)
  }

  fn branch_protection_checks(&self, repo: &RepoRef, branch: &str, deadline: &Deadline) -> Result<Value, FetchError> {
    let url = self.repo_url(repo, &format!("branches/{}/protection/required_status_checks", branch));
    self.get_json(&url, deadline)
  }

  fn branch_rules(&self, repo: &RepoRef, branch: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, &format!("rules/branches/{}", branch)), deadline, into_array)
  }

  fn collaborators(&self, repo: &RepoRef, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.get_paged(&self.repo_url(repo, "collaborators?affiliation=all"), deadline, into_array)
  }

  fn collaborator_permission(&self, repo: &RepoRef, login: &str, deadline: &Deadline) -> Result<Value, FetchError> {
    self.get_json(&self.repo_url(repo, &format!("collaborators/{}/permission", login)), deadline)
  }
}

/// Canned API payloads, keyed by resource. Missing list resources are empty;
/// a missing pull request or protection object is a 404.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
  #[serde(default)]
  pub pull: Option<Value>,
  #[serde(default)]
  pub commits: Vec<Value>,
  #[serde(default)]
  pub comments: Vec<Value>,
  #[serde(default)]
  pub reviews: Vec<Value>,
  #[serde(default)]
  pub review_comments: Vec<Value>,
  #[serde(default)]
  pub timeline: Vec<Value>,
  /// Commit SHA -> statuses reported for it.
  #[serde(default)]
  pub statuses: BTreeMap<String, Vec<Value>>,
  /// Commit SHA -> check runs reported for it.
  #[serde(default)]
  pub check_runs: BTreeMap<String, Vec<Value>>,
  #[serde(default)]
  pub protection: Option<Value>,
  #[serde(default)]
  pub rules: Vec<Value>,
  #[serde(default)]
  pub collaborators: Vec<Value>,
  /// Login -> permission payload.
  #[serde(default)]
  pub permissions: BTreeMap<String, Value>,
  /// Resource name -> HTTP status to fail with.
  #[serde(default)]
  pub errors: BTreeMap<String, u16>,
}

const FIXTURES_JSON_VAR: &str = "PRX_TEST_FIXTURES_JSON";
const FIXTURES_PATH_VAR: &str = "PRX_TEST_FIXTURES";

impl Fixtures {
  /// Load fixtures from `PRX_TEST_FIXTURES_JSON` (inline) or `PRX_TEST_FIXTURES` (file path).
  pub fn from_env() -> Option<Result<Self, FetchError>> {
    if let Ok(s) = std::env::var(FIXTURES_JSON_VAR) {
      return Some(serde_json::from_str(&s).map_err(|e| FetchError::Fixture(e.to_string())));
    }

    let path = std::env::var(FIXTURES_PATH_VAR).ok()?;
    let parsed = std::fs::read_to_string(&path)
      .map_err(|e| FetchError::Fixture(format!("{}: {}", path, e)))
      .and_then(|s| serde_json::from_str(&s).map_err(|e| FetchError::Fixture(format!("{}: {}", path, e))));
    Some(parsed)
  }
}

/// Fixture-backed backend; also counts calls per resource.
pub struct GithubFixtureApi {
  fixtures: Fixtures,
  calls: Mutex<BTreeMap<&'static str, usize>>,
}

impl GithubFixtureApi {
  pub fn new(fixtures: Fixtures) -> Self {
    Self {
      fixtures,
      calls: Mutex::new(BTreeMap::new()),
    }
  }

  pub fn call_count(&self, resource: &str) -> usize {
    let calls = self.calls.lock().unwrap_or_else(|p| p.into_inner());
    calls.get(resource).copied().unwrap_or(0)
  }

  fn enter(&self, resource: &'static str, deadline: &Deadline) -> Result<(), FetchError> {
    {
      let mut calls = self.calls.lock().unwrap_or_else(|p| p.into_inner());
      *calls.entry(resource).or_insert(0) += 1;
    }

    if deadline.expired() {
      return Err(FetchError::Timeout);
    }

    match self.fixtures.errors.get(resource) {
      Some(status) => Err(FetchError::Status {
        status: *status,
        url: format!("fixture://{}", resource),
      }),
      None => Ok(()),
    }
  }

  fn not_found(resource: &str) -> FetchError {
    FetchError::Status {
      status: 404,
      url: format!("fixture://{}", resource),
    }
  }
}

impl GithubApi for GithubFixtureApi {
  fn pull_request(&self, _repo: &RepoRef, _number: u64, deadline: &Deadline) -> Result<Value, FetchError> {
    self.enter("pull", deadline)?;
    self.fixtures.pull.clone().ok_or_else(|| Self::not_found("pull"))
  }

  fn pull_commits(&self, _repo: &RepoRef, _number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("commits", deadline)?;
    Ok(self.fixtures.commits.clone())
  }

  fn issue_comments(&self, _repo: &RepoRef, _number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("comments", deadline)?;
    Ok(self.fixtures.comments.clone())
  }

  fn pull_reviews(&self, _repo: &RepoRef, _number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("reviews", deadline)?;
    Ok(self.fixtures.reviews.clone())
  }

  fn review_comments(&self, _repo: &RepoRef, _number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("review_comments", deadline)?;
    Ok(self.fixtures.review_comments.clone())
  }

  fn issue_timeline(&self, _repo: &RepoRef, _number: u64, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("timeline", deadline)?;
    Ok(self.fixtures.timeline.clone())
  }

  fn commit_statuses(&self, _repo: &RepoRef, sha: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("statuses", deadline)?;
    Ok(self.fixtures.statuses.get(sha).cloned().unwrap_or_default())
  }

  fn commit_check_runs(&self, _repo: &RepoRef, sha: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("check_runs", deadline)?;
    Ok(self.fixtures.check_runs.get(sha).cloned().unwrap_or_default())
  }

  fn branch_protection_checks(&self, _repo: &RepoRef, _branch: &str, deadline: &Deadline) -> Result<Value, FetchError> {
    self.enter("protection", deadline)?;
    self.fixtures.protection.clone().ok_or_else(|| Self::not_found("protection"))
  }

  fn branch_rules(&self, _repo: &RepoRef, _branch: &str, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("rules", deadline)?;
    Ok(self.fixtures.rules.clone())
  }

  fn collaborators(&self, _repo: &RepoRef, deadline: &Deadline) -> Result<Vec<Value>, FetchError> {
    self.enter("collaborators", deadline)?;
    Ok(self.fixtures.collaborators.clone())
  }

  fn collaborator_permission(&self, _repo: &RepoRef, login: &str, deadline: &Deadline) -> Result<Value, FetchError> {
    self.enter("permission", deadline)?;
    self.fixtures.permissions.get(login).cloned().ok_or_else(|| Self::not_found("permission"))
  }
}

static TOKEN_WARNING: Lazy<()> = Lazy::new(|| {
  warn!("no GitHub token found (GITHUB_TOKEN, GH_TOKEN, gh auth token); using unauthenticated requests");
});

/// Select the backend once: fixtures when PRX_TEST_* is set, HTTP otherwise.
pub fn build_api(base_url: &str, timeout: Duration) -> Result<Arc<dyn GithubApi>, FetchError> {
  if let Some(fixtures) = Fixtures::from_env() {
    return Ok(Arc::new(GithubFixtureApi::new(fixtures?)));
  }

  let token = get_github_token();
  if token.is_none() {
    Lazy::force(&TOKEN_WARNING);
  }

  Ok(Arc::new(GithubHttpApi::new(base_url, token, timeout)))
}
