// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run the fetch pipeline (metadata, parallel resource tasks, normalize, access, summary) behind the freshness cache
// role: client/orchestration
// inputs: owner, repo, PR number, reference time; Config; a GithubApi backend
// outputs: PullRequestData (aggregate + finalized, noise-filtered events)
// side_effects: Upstream calls through GithubApi; cache reads/writes
// invariants:
// - PR metadata failure is the user-visible error; other task failures only leave gaps
// - The fetch fails with NoEvents only when tasks failed and none produced an event
// - Consumers only ever see the sorted, finalized list
// - Summaries are computed before the status noise filter is applied
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::access::{upgrade_write_access, AccessCaches, AccessResolver};
use crate::cache::{DiskStore, FreshnessCache, TtlCache};
use crate::config::Config;
use crate::error::FetchError;
use crate::github::api::{build_api, GithubApi};
use crate::github::raw::{
  decode_items, RawCheckRun, RawComment, RawCommit, RawItem, RawPullRequest, RawRequiredStatusChecks, RawReview,
  RawReviewComment, RawRule, RawStatus, RawTimelineItem,
};
use crate::github::{Deadline, RepoRef};
use crate::model::{Event, EventKind, PullRequestData};
use crate::normalize::{filter_noise, mark_required, normalize, pull_request_fields, required_check_names};
use crate::summary::finalize;

/// Tasks whose output is events (required checks are not counted).
pub const EVENT_TASKS: usize = 7;

/// Stable cache key for one pull request.
pub fn cache_key(owner: &str, repo: &str, number: u64) -> String {
  format!("prx-v1:{}/{}#{}", owner.to_ascii_lowercase(), repo.to_ascii_lowercase(), number)
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|p| p.into_inner())
}

#[derive(Debug, Default)]
struct TaskLog {
  produced: usize,
  failures: Vec<(&'static str, FetchError)>,
}

pub struct Client {
  api: Arc<dyn GithubApi>,
  config: Config,
  pulls: FreshnessCache<PullRequestData>,
  access: AccessCaches,
}

impl Client {
  /// Build with the backend chosen from the environment.
  pub fn new(config: Config) -> Result<Self, FetchError> {
    let api = build_api(&config.api_base, config.timeout)?;
    Ok(Self::with_api(api, config))
  }

  pub fn with_api(api: Arc<dyn GithubApi>, config: Config) -> Self {
    let pulls_disk = config.pull_request_cache_dir().map(DiskStore::new);
    let pulls = FreshnessCache::new(TtlCache::new(config.pull_request_ttl, pulls_disk));
    let access =
      AccessCaches::with_ttls(config.cache_dir.as_deref(), config.collaborators_ttl, config.permission_ttl);

    Self {
      api,
      config,
      pulls,
      access,
    }
  }

  /// Cached data computed at or after `reference`, otherwise a fresh fetch.
  pub fn fetch(
    &self,
    owner: &str,
    repo: &str,
    number: u64,
    reference: DateTime<Utc>,
  ) -> Result<PullRequestData, FetchError> {
    let key = cache_key(owner, repo, number);
    self
      .pulls
      .get_or_fetch(&key, reference, || self.fetch_uncached(owner, repo, number))
  }

  pub fn fetch_uncached(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestData, FetchError> {
    let repo_ref = RepoRef::new(owner, repo);
    let deadline = Deadline::after(self.config.timeout);
    let api = self.api.as_ref();

    let raw_pr = fetch_pull_request(api, &repo_ref, number, &deadline)?;
    let (mut events, required, log) = gather(api, &repo_ref, number, &raw_pr, &deadline);

    if log.produced == 0 && !log.failures.is_empty() {
      return Err(FetchError::NoEvents {
        failed: log.failures.len(),
        total: EVENT_TASKS,
      });
    }

    mark_required(&mut events, &required);
    AccessResolver::new(api, &self.access, &repo_ref, &deadline).annotate(&mut events);
    events.sort_by(Event::timeline_cmp);
    upgrade_write_access(&mut events);

    let mut pr = pull_request_fields(&raw_pr);
    pr.author_write_access = events
      .iter()
      .find(|e| e.kind == EventKind::Opened)
      .map(|e| e.write_access)
      .unwrap_or_default();
    let pr = finalize(pr, &events, &required, None);
    let events = filter_noise(events);

    info!(
      repo = %repo_ref,
      number,
      events = events.len(),
      failed_tasks = log.failures.len(),
      "pull request fetched"
    );

    Ok(PullRequestData {
      pull_request: pr,
      events,
    })
  }

  /// Sweep expired cache entries from memory and disk.
  pub fn close(&self) {
    self.pulls.close();
    self.access.close();
  }
}

fn fetch_pull_request(
  api: &dyn GithubApi,
  repo: &RepoRef,
  number: u64,
  deadline: &Deadline,
) -> Result<RawPullRequest, FetchError> {
  let value = api.pull_request(repo, number, deadline)?;
  serde_json::from_value(value).map_err(|e| FetchError::Decode {
    url: format!("repos/{}/pulls/{}", repo, number),
    message: e.to_string(),
  })
}

fn wrap<T: DeserializeOwned>(values: Vec<Value>, what: &str, variant: fn(T) -> RawItem) -> Vec<RawItem> {
  decode_items::<T>(values, what).into_iter().map(variant).collect()
}

/// Run the resource tasks concurrently; each appends its normalized events to one shared list.
fn gather(
  api: &dyn GithubApi,
  repo: &RepoRef,
  number: u64,
  pr: &RawPullRequest,
  deadline: &Deadline,
) -> (Vec<Event>, Vec<String>, TaskLog) {
  let events = Mutex::new(normalize(&[RawItem::PullRequest(pr.clone())]));
  let log = Mutex::new(TaskLog::default());
  let required: Mutex<Vec<String>> = Mutex::new(Vec::new());
  let head_sha = pr.head.sha.as_str();
  let base_ref = pr.base.name.as_str();
  let (sha_tx, sha_rx) = mpsc::channel::<Vec<String>>();

  let record = |task: &'static str, result: Result<Vec<RawItem>, FetchError>| match result {
    Ok(items) => {
      let normalized = normalize(&items);
      debug!(task, count = normalized.len(), "fetch task finished");
      lock(&log).produced += normalized.len();
      lock(&events).extend(normalized);
    }
    Err(e) => {
      warn!(task, error = %e, "fetch task failed");
      lock(&log).failures.push((task, e));
    }
  };
  let record = &record;

  thread::scope(|s| {
    s.spawn(move || {
      let result = api
        .pull_commits(repo, number, deadline)
        .map(|v| decode_items::<RawCommit>(v, "commit"));
      if let Ok(commits) = &result {
        let _ = sha_tx.send(commits.iter().map(|c| c.sha.clone()).collect());
      }
      record("commits", result.map(|cs| cs.into_iter().map(RawItem::Commit).collect()));
    });

    s.spawn(move || {
      let r = api.issue_comments(repo, number, deadline);
      record("comments", r.map(|v| wrap::<RawComment>(v, "comment", RawItem::Comment)));
    });

    s.spawn(move || {
      let r = api.pull_reviews(repo, number, deadline);
      record("reviews", r.map(|v| wrap::<RawReview>(v, "review", RawItem::Review)));
    });

    s.spawn(move || {
      let r = api.review_comments(repo, number, deadline);
      record(
        "review_comments",
        r.map(|v| wrap::<RawReviewComment>(v, "review_comment", RawItem::ReviewComment)),
      );
    });

    s.spawn(move || {
      let r = api.issue_timeline(repo, number, deadline);
      record("timeline", r.map(|v| wrap::<RawTimelineItem>(v, "timeline", RawItem::Timeline)));
    });

    s.spawn(move || {
      let r = api.commit_statuses(repo, head_sha, deadline).map(|v| {
        decode_items::<RawStatus>(v, "status")
          .into_iter()
          .map(|status| RawItem::Status {
            status,
            sha: head_sha.to_string(),
          })
          .collect()
      });
      record("statuses", r);
    });

    s.spawn(move || {
      let wait = deadline.remaining().unwrap_or_default();
      let shas = match sha_rx.recv_timeout(wait) {
        Ok(shas) if !shas.is_empty() => shas,
        _ => vec![head_sha.to_string()],
      };
      record("check_runs", check_runs_for(api, repo, &shas, deadline));
    });

    s.spawn(|| {
      *lock(&required) = required_checks(api, repo, base_ref, deadline);
    });
  });

  let events = events.into_inner().unwrap_or_else(|p| p.into_inner());
  let required = required.into_inner().unwrap_or_else(|p| p.into_inner());
  let log = log.into_inner().unwrap_or_else(|p| p.into_inner());
  (events, required, log)
}

/// Check runs for every commit, in commit order, so the earliest run wins dedup.
fn check_runs_for(
  api: &dyn GithubApi,
  repo: &RepoRef,
  shas: &[String],
  deadline: &Deadline,
) -> Result<Vec<RawItem>, FetchError> {
  let per_commit: Vec<Result<Vec<RawCheckRun>, FetchError>> = shas
    .par_iter()
    .map(|sha| {
      api.commit_check_runs(repo, sha, deadline).map(|v| {
        let mut runs = decode_items::<RawCheckRun>(v, "check_run");
        for run in runs.iter_mut().filter(|r| r.head_sha.is_empty()) {
          run.head_sha = sha.clone();
        }
        runs
      })
    })
    .collect();

  let mut items = Vec::new();
  let mut first_err = None;
  let mut succeeded = 0usize;
  for (sha, result) in shas.iter().zip(per_commit) {
    match result {
      Ok(runs) => {
        succeeded += 1;
        items.extend(runs.into_iter().map(RawItem::CheckRun));
      }
      Err(e) => {
        debug!(sha = %sha, error = %e, "check runs unavailable for commit");
        first_err.get_or_insert(e);
      }
    }
  }

  match first_err {
    Some(e) if succeeded == 0 => Err(e),
    _ => Ok(items),
  }
}

fn required_checks(api: &dyn GithubApi, repo: &RepoRef, base: &str, deadline: &Deadline) -> Vec<String> {
  if base.is_empty() {
    return Vec::new();
  }

  let protection = match api.branch_protection_checks(repo, base, deadline) {
    Ok(v) => match serde_json::from_value::<RawRequiredStatusChecks>(v) {
      Ok(p) => Some(p),
      Err(e) => {
        warn!(base, error = %e, "malformed branch protection payload");
        None
      }
    },
    Err(e) if e.is_not_found() || e.is_forbidden() => {
      debug!(base, error = %e, "no readable branch protection");
      None
    }
    Err(e) => {
      warn!(base, error = %e, "branch protection lookup failed");
      None
    }
  };

  let rules = match api.branch_rules(repo, base, deadline) {
    Ok(v) => decode_items::<RawRule>(v, "rule"),
    Err(e) => {
      debug!(base, error = %e, "branch rules unavailable");
      Vec::new()
    }
  };

  required_check_names(protection.as_ref(), &rules)
}
