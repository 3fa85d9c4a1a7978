// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Derive aggregate pull request state (checks, approvals, reviewers, access, tests, mergeability) from events
// role: summary/derivation
// inputs: PullRequest identity fields, finalized Event list, required check names, upstream test state
// outputs: PullRequest with every derived field recomputed
// side_effects: None (pure); tracing only
// invariants:
// - Each check name lands in exactly one CheckSummary map, chosen by its latest event
// - Participant access is the maximum level observed per login
// - Derived fields are fully recomputed; nothing from a previous run leaks through
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{
  ApprovalSummary, CheckSummary, Event, EventKind, PullRequest, ReviewState, TestState, WriteAccess,
};

/// Placeholder for required checks that have not reported yet.
pub const EXPECTED_CHECK_DESCRIPTION: &str = "Expected — Waiting for status to be reported";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
  Success,
  Failing,
  Pending,
  Cancelled,
  Skipped,
  Stale,
  Neutral,
}

fn categorize(outcome: &str) -> Category {
  match outcome.to_ascii_lowercase().as_str() {
    "success" => Category::Success,
    "failure" | "error" | "timed_out" | "action_required" | "startup_failure" => Category::Failing,
    "cancelled" => Category::Cancelled,
    "skipped" => Category::Skipped,
    "stale" => Category::Stale,
    "neutral" => Category::Neutral,
    // pending, queued, in_progress, waiting, requested, expected, and anything new
    _ => Category::Pending,
  }
}

/// Latest outcome per check name across check runs and status checks.
pub fn check_summary(events: &[Event], required_checks: &[String]) -> CheckSummary {
  let mut latest: BTreeMap<&str, &Event> = BTreeMap::new();
  for e in events.iter().filter(|e| e.kind.is_check() && !e.body.is_empty()) {
    match latest.get(e.body.as_str()) {
      Some(prev) if prev.timestamp > e.timestamp => {}
      _ => {
        latest.insert(e.body.as_str(), e);
      }
    }
  }

  let mut summary = CheckSummary::default();
  for (name, e) in latest {
    let description = if e.description.is_empty() {
      e.outcome.clone()
    } else {
      e.description.clone()
    };
    let bucket = match categorize(&e.outcome) {
      Category::Success => &mut summary.success,
      Category::Failing => &mut summary.failing,
      Category::Pending => &mut summary.pending,
      Category::Cancelled => &mut summary.cancelled,
      Category::Skipped => &mut summary.skipped,
      Category::Stale => &mut summary.stale,
      Category::Neutral => &mut summary.neutral,
    };
    bucket.insert(name.to_string(), description);
  }

  for name in required_checks {
    if !summary.contains(name) {
      summary.pending.insert(name.clone(), EXPECTED_CHECK_DESCRIPTION.to_string());
    }
  }

  summary
}

/// Most recent non-`commented` review per reviewer.
fn latest_reviews(events: &[Event]) -> BTreeMap<&str, &Event> {
  let mut latest: BTreeMap<&str, &Event> = BTreeMap::new();
  for e in events.iter().filter(|e| e.kind == EventKind::Review && !e.actor.is_empty()) {
    if ReviewState::parse(&e.outcome) == Some(ReviewState::Commented) {
      continue;
    }
    match latest.get(e.actor.as_str()) {
      Some(prev) if prev.timestamp > e.timestamp => {}
      _ => {
        latest.insert(e.actor.as_str(), e);
      }
    }
  }
  latest
}

pub fn approval_summary(events: &[Event]) -> ApprovalSummary {
  let mut summary = ApprovalSummary::default();
  for e in latest_reviews(events).values() {
    match ReviewState::parse(&e.outcome) {
      Some(ReviewState::Approved) => match e.write_access {
        WriteAccess::Definitely => summary.approvals_with_write_access += 1,
        WriteAccess::No => summary.approvals_without_write_access += 1,
        _ => summary.approvals_with_unknown_access += 1,
      },
      Some(ReviewState::ChangesRequested) => summary.changes_requested += 1,
      _ => {}
    }
  }
  summary
}

/// Requested reviewers start as pending; submitted reviews override.
pub fn reviewer_states(requested: &[String], events: &[Event]) -> BTreeMap<String, ReviewState> {
  let mut states: BTreeMap<String, ReviewState> =
    requested.iter().map(|r| (r.clone(), ReviewState::Pending)).collect();

  let mut reviews: Vec<&Event> = events.iter().filter(|e| e.kind == EventKind::Review && !e.actor.is_empty()).collect();
  reviews.sort_by_key(|e| e.timestamp);

  for e in reviews {
    let Some(state) = ReviewState::parse(&e.outcome) else { continue };
    let current = states.get(&e.actor).copied();
    // a later comment does not hide an approval or change request
    if state == ReviewState::Commented && !matches!(current, None | Some(ReviewState::Pending)) {
      continue;
    }
    states.insert(e.actor.clone(), state);
  }

  states
}

pub fn participant_access(pr: &PullRequest, events: &[Event]) -> BTreeMap<String, WriteAccess> {
  let mut access: BTreeMap<String, WriteAccess> = BTreeMap::new();
  let mut observe = |name: &str, level: WriteAccess| {
    if name.is_empty() {
      return;
    }
    access
      .entry(name.to_string())
      .and_modify(|cur| *cur = (*cur).max(level))
      .or_insert(level);
  };

  observe(&pr.author, pr.author_write_access);
  for a in &pr.assignees {
    observe(a, WriteAccess::NotApplicable);
  }
  for r in pr.requested_reviewers.iter().chain(pr.reviewers.keys()) {
    observe(r, WriteAccess::NotApplicable);
  }
  for e in events {
    observe(&e.actor, e.write_access);
  }

  access
}

/// Cancelled checks block just like failing ones.
pub fn test_state(summary: &CheckSummary) -> TestState {
  if !summary.failing.is_empty() || !summary.cancelled.is_empty() {
    TestState::Failing
  } else if !summary.pending.is_empty() {
    TestState::Pending
  } else if !summary.success.is_empty() {
    TestState::Passing
  } else {
    TestState::None
  }
}

pub fn mergeable_state_description(
  state: &str,
  checks: &CheckSummary,
  approvals: &ApprovalSummary,
) -> Option<String> {
  let approved = approvals.counted_approvals() > 0;
  let failing = !checks.failing.is_empty();
  let pending = !checks.pending.is_empty();

  let text = match state {
    "blocked" => {
      if !approved && !failing {
        if pending {
          "PR requires approval and has pending status checks"
        } else {
          "PR requires approval"
        }
      } else if failing {
        if approved {
          "PR has failing status checks"
        } else {
          "PR has failing status checks and requires approval"
        }
      } else if pending {
        "PR has pending status checks"
      } else {
        "PR is blocked by branch protection rules"
      }
    }
    "dirty" => "PR has merge conflicts that must be resolved",
    "unstable" => "PR has failing or pending non-required status checks",
    "clean" => "PR is ready to merge",
    "unknown" => "Mergeability is still being computed",
    "draft" => "PR is a draft and cannot be merged",
    "behind" => "PR branch is behind the base branch",
    "has_hooks" => "PR is mergeable; pre-receive hooks will run",
    _ => return None,
  };

  Some(text.to_string())
}

/// Recompute every derived field of `pr` from the finalized event list.
pub fn finalize(
  mut pr: PullRequest,
  events: &[Event],
  required_checks: &[String],
  api_test_state: Option<TestState>,
) -> PullRequest {
  pr.required_checks = required_checks.to_vec();
  pr.check_summary = check_summary(events, required_checks);
  pr.approval_summary = approval_summary(events);
  pr.reviewers = reviewer_states(&pr.requested_reviewers, events);
  pr.participant_access = participant_access(&pr, events);

  let computed = test_state(&pr.check_summary);
  if let Some(upstream) = api_test_state.filter(|s| *s != computed) {
    debug!(?upstream, ?computed, "upstream test state overridden");
  }
  pr.test_state = computed;

  let state = pr.mergeable_state.to_ascii_lowercase();
  if matches!(state.as_str(), "blocked" | "dirty" | "unstable") {
    pr.mergeable = Some(false);
  }
  pr.mergeable_state_description = mergeable_state_description(&state, &pr.check_summary, &pr.approval_summary);

  pr
}
