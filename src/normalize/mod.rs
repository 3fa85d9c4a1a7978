// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Convert raw upstream items into canonical Event records (one kind per item, or dropped)
// role: normalize/events
// inputs: RawItem values decoded from any GithubApi backend
// outputs: Vec<Event> in input order (sorting happens at finalize time)
// side_effects: None (pure); tracing only
// invariants:
// - Same input yields identical output (no clocks, no randomness, no I/O)
// - Check runs are deduplicated by (name, completed_at or started_at) within one call; first seen survives
// - free-text body/description never exceed MAX_TEXT_CHARS characters; check and status names are kept whole
// errors: None; items without a usable timestamp are skipped with debug!
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::github::raw::{
  RawCheckRun, RawComment, RawCommit, RawItem, RawPullRequest, RawReview, RawReviewComment, RawRequiredStatusChecks,
  RawRule, RawStatus, RawTimelineItem, RawUser, TimelineFields,
};
use crate::model::{Association, Event, EventKind, PullRequest};
use crate::util::{clip_text, MAX_TEXT_CHARS};

pub mod bots;
pub mod text;

pub use bots::is_bot;
pub use text::{extract_mentions, is_question};

/// Normalize a batch of raw items. Check-run dedup spans the whole batch.
pub fn normalize(items: &[RawItem]) -> Vec<Event> {
  let mut seen_checks: HashSet<(String, Option<DateTime<Utc>>)> = HashSet::new();
  let mut events = Vec::with_capacity(items.len());

  for item in items {
    let event = match item {
      RawItem::PullRequest(pr) => Some(opened_event(pr)),
      RawItem::Commit(c) => commit_event(c),
      RawItem::Comment(c) => Some(comment_event(c)),
      RawItem::Review(r) => review_event(r),
      RawItem::ReviewComment(c) => Some(review_comment_event(c)),
      RawItem::Timeline(t) => timeline_event(t),
      RawItem::CheckRun(run) => {
        let key = (run.name.clone(), run.completed_at.or(run.started_at));
        if seen_checks.insert(key) {
          check_run_event(run)
        } else {
          debug!(name = %run.name, sha = %run.head_sha, "duplicate check run across commits");
          None
        }
      }
      RawItem::Status { status, sha } => Some(status_event(status, sha)),
    };
    events.extend(event);
  }

  events
}

fn set_actor(e: &mut Event, user: Option<&RawUser>) {
  if let Some(u) = user {
    e.actor = u.login.clone();
    e.bot = is_bot(u);
  }
}

fn set_target_user(e: &mut Event, user: Option<&RawUser>) {
  if let Some(u) = user {
    e.target = u.login.clone();
    e.target_is_bot = is_bot(u);
  }
}

/// Clip free text into `body`, deriving the question flag and mentions.
fn set_text(e: &mut Event, text: Option<&str>) {
  let Some(t) = text.filter(|t| !t.is_empty()) else { return };
  e.question = is_question(t);
  e.mentions = extract_mentions(t);
  e.body = clip_text(t, MAX_TEXT_CHARS);
}

fn set_description(e: &mut Event, text: &str) {
  e.description = clip_text(text, MAX_TEXT_CHARS);
}

fn association(s: Option<&str>) -> Option<Association> {
  s.filter(|s| !s.is_empty()).map(Association::parse)
}

fn opened_event(pr: &RawPullRequest) -> Event {
  let mut e = Event::new(EventKind::Opened, pr.created_at);
  set_actor(&mut e, pr.user.as_ref());
  set_text(&mut e, pr.body.as_deref());
  e.association = association(pr.author_association.as_deref());
  e
}

fn commit_event(c: &RawCommit) -> Option<Event> {
  let git_author = c.commit.author.as_ref();
  let ts = git_author
    .and_then(|a| a.date)
    .or_else(|| c.commit.committer.as_ref().and_then(|a| a.date));
  let Some(ts) = ts else {
    debug!(sha = %c.sha, "commit without a date; skipping");
    return None;
  };

  let mut e = Event::new(EventKind::Commit, ts);
  match c.author.as_ref().filter(|u| !u.login.is_empty()) {
    Some(u) => set_actor(&mut e, Some(u)),
    None => e.actor = git_author.map(|a| a.name.clone()).unwrap_or_default(),
  }
  let subject = c.commit.message.lines().next().unwrap_or_default();
  e.body = clip_text(subject, MAX_TEXT_CHARS);
  e.description = c.sha.clone();
  Some(e)
}

fn comment_event(c: &RawComment) -> Event {
  let mut e = Event::new(EventKind::Comment, c.created_at);
  set_actor(&mut e, c.user.as_ref());
  set_text(&mut e, c.body.as_deref());
  e.association = association(c.author_association.as_deref());
  e
}

fn review_event(r: &RawReview) -> Option<Event> {
  // unsubmitted (pending) reviews have no timestamp
  let ts = r.submitted_at?;
  let mut e = Event::new(EventKind::Review, ts);
  set_actor(&mut e, r.user.as_ref());
  set_text(&mut e, r.body.as_deref());
  e.outcome = r.state.to_ascii_lowercase();
  e.association = association(r.author_association.as_deref());
  Some(e)
}

fn review_comment_event(c: &RawReviewComment) -> Event {
  let mut e = Event::new(EventKind::ReviewComment, c.created_at);
  set_actor(&mut e, c.user.as_ref());
  set_text(&mut e, c.body.as_deref());
  if let Some(path) = &c.path {
    set_description(&mut e, path);
  }
  e.outdated = c.position.is_none();
  e.association = association(c.author_association.as_deref());
  e
}

fn timeline_kind(item: &RawTimelineItem) -> Option<(EventKind, &TimelineFields)> {
  use RawTimelineItem as T;
  let pair = match item {
    T::Labeled(f) => (EventKind::Labeled, f),
    T::Unlabeled(f) => (EventKind::Unlabeled, f),
    T::Assigned(f) => (EventKind::Assigned, f),
    T::Unassigned(f) => (EventKind::Unassigned, f),
    T::Milestoned(f) => (EventKind::Milestoned, f),
    T::Demilestoned(f) => (EventKind::Demilestoned, f),
    T::ReviewRequested(f) => (EventKind::ReviewRequested, f),
    T::ReviewRequestRemoved(f) => (EventKind::ReviewRequestRemoved, f),
    T::ReviewDismissed(f) => (EventKind::ReviewDismissed, f),
    T::Merged(f) => (EventKind::Merged, f),
    T::Closed(f) => (EventKind::Closed, f),
    T::Reopened(f) => (EventKind::Reopened, f),
    T::ReadyForReview(f) => (EventKind::ReadyForReview, f),
    T::ConvertToDraft(f) => (EventKind::ConvertToDraft, f),
    T::HeadRefForcePushed(f) => (EventKind::HeadRefForcePushed, f),
    T::HeadRefDeleted(f) => (EventKind::HeadRefDeleted, f),
    T::HeadRefRestored(f) => (EventKind::HeadRefRestored, f),
    T::BaseRefChanged(f) => (EventKind::BaseRefChanged, f),
    T::BaseRefForcePushed(f) => (EventKind::BaseRefForcePushed, f),
    T::Renamed(f) => (EventKind::RenamedTitle, f),
    T::Locked(f) => (EventKind::Locked, f),
    T::Unlocked(f) => (EventKind::Unlocked, f),
    T::AutoMergeEnabled(f) => (EventKind::AutoMergeEnabled, f),
    T::AutoMergeDisabled(f) => (EventKind::AutoMergeDisabled, f),
    T::AutoSquashEnabled(f) => (EventKind::AutoSquashEnabled, f),
    T::AutoRebaseEnabled(f) => (EventKind::AutoRebaseEnabled, f),
    T::AddedToMergeQueue(f) => (EventKind::AddedToMergeQueue, f),
    T::RemovedFromMergeQueue(f) => (EventKind::RemovedFromMergeQueue, f),
    T::AutomaticBaseChangeSucceeded(f) => (EventKind::AutomaticBaseChangeSucceeded, f),
    T::AutomaticBaseChangeFailed(f) => (EventKind::AutomaticBaseChangeFailed, f),
    T::Connected(f) => (EventKind::Connected, f),
    T::Disconnected(f) => (EventKind::Disconnected, f),
    T::CrossReferenced(f) => (EventKind::CrossReferenced, f),
    T::Referenced(f) => (EventKind::Referenced, f),
    T::Mentioned(f) => (EventKind::Mentioned, f),
    T::Subscribed(f) => (EventKind::Subscribed, f),
    T::Unsubscribed(f) => (EventKind::Unsubscribed, f),
    T::Deployed(f) => (EventKind::Deployed, f),
    T::DeploymentEnvironmentChanged(f) => (EventKind::DeploymentEnvironmentChanged, f),
    T::Pinned(f) => (EventKind::Pinned, f),
    T::Unpinned(f) => (EventKind::Unpinned, f),
    T::Transferred(f) => (EventKind::Transferred, f),
    T::CommentDeleted(f) => (EventKind::CommentDeleted, f),
    T::Unknown => return None,
  };
  Some(pair)
}

fn timeline_event(item: &RawTimelineItem) -> Option<Event> {
  let (kind, f) = timeline_kind(item)?;
  let mut e = Event::new(kind, f.created_at);
  set_actor(&mut e, f.actor.as_ref());

  match kind {
    EventKind::Labeled | EventKind::Unlabeled => {
      e.target = f.label.as_ref().map(|l| l.name.clone()).unwrap_or_default();
    }
    EventKind::Assigned | EventKind::Unassigned => set_target_user(&mut e, f.assignee.as_ref()),
    EventKind::Milestoned | EventKind::Demilestoned => {
      e.target = f.milestone.as_ref().map(|m| m.title.clone()).unwrap_or_default();
    }
    EventKind::ReviewRequested | EventKind::ReviewRequestRemoved => match (&f.requested_reviewer, &f.requested_team) {
      (Some(u), _) => set_target_user(&mut e, Some(u)),
      (None, Some(team)) => {
        e.target = if team.slug.is_empty() { team.name.clone() } else { team.slug.clone() };
      }
      (None, None) => {}
    },
    EventKind::ReviewDismissed => {
      if let Some(d) = &f.dismissed_review {
        e.outcome = d.state.to_ascii_lowercase();
        set_text(&mut e, d.dismissal_message.as_deref());
      }
    }
    EventKind::RenamedTitle => {
      if let Some(r) = &f.rename {
        e.body = clip_text(&r.to, MAX_TEXT_CHARS);
        set_description(&mut e, &format!("{} -> {}", r.from, r.to));
      }
    }
    EventKind::CrossReferenced => {
      if let Some(issue) = f.source.as_ref().and_then(|s| s.issue.as_ref()) {
        e.target = issue.html_url.clone().unwrap_or_else(|| format!("#{}", issue.number));
        if let Some(title) = &issue.title {
          e.body = clip_text(title, MAX_TEXT_CHARS);
        }
      }
    }
    EventKind::Merged | EventKind::Referenced | EventKind::HeadRefForcePushed | EventKind::Closed => {
      e.target = f.commit_id.clone().unwrap_or_default();
    }
    _ => {}
  }

  Some(e)
}

fn check_run_event(run: &RawCheckRun) -> Option<Event> {
  let Some(ts) = run.completed_at.or(run.started_at) else {
    debug!(name = %run.name, "check run without timestamps; skipping");
    return None;
  };

  let mut e = Event::new(EventKind::CheckRun, ts);
  // check names are keys for summaries and required matching; never clipped
  e.body = run.name.clone();
  e.outcome = match (&run.conclusion, run.status.as_str()) {
    (Some(c), "completed") if !c.is_empty() => c.to_ascii_lowercase(),
    _ => run.status.to_ascii_lowercase(),
  };
  e.target = run.head_sha.clone();
  if let Some(app) = &run.app {
    e.actor = app.login.clone();
    e.bot = true;
  }
  if let Some(out) = &run.output {
    let text = out.title.as_deref().filter(|t| !t.is_empty()).or(out.summary.as_deref());
    if let Some(t) = text {
      set_description(&mut e, t);
    }
  }
  Some(e)
}

fn status_event(s: &RawStatus, sha: &str) -> Event {
  let mut e = Event::new(EventKind::StatusCheck, s.created_at);
  set_actor(&mut e, s.creator.as_ref());
  e.body = s.context.clone();
  e.outcome = s.state.to_ascii_lowercase();
  if let Some(d) = &s.description {
    set_description(&mut e, d);
  }
  e.target = sha.to_string();
  e
}

/// Identity fields of the aggregate; derived fields stay at their defaults.
pub fn pull_request_fields(pr: &RawPullRequest) -> PullRequest {
  let author = pr.user.as_ref();
  PullRequest {
    number: pr.number,
    title: pr.title.clone(),
    body: pr.body.clone().unwrap_or_default(),
    author: author.map(|u| u.login.clone()).unwrap_or_default(),
    author_bot: author.is_some_and(is_bot),
    state: pr.state.to_ascii_lowercase(),
    draft: pr.draft,
    merged: pr.merged || pr.merged_at.is_some(),
    merged_by: pr.merged_by.as_ref().map(|u| u.login.clone()),
    mergeable: pr.mergeable,
    mergeable_state: pr.mergeable_state.as_deref().unwrap_or_default().to_ascii_lowercase(),
    created_at: Some(pr.created_at),
    updated_at: pr.updated_at,
    closed_at: pr.closed_at,
    merged_at: pr.merged_at,
    head_sha: pr.head.sha.clone(),
    base_ref: pr.base.name.clone(),
    additions: pr.additions,
    deletions: pr.deletions,
    changed_files: pr.changed_files,
    assignees: pr.assignees.iter().map(|u| u.login.clone()).collect(),
    requested_reviewers: pr.requested_reviewers.iter().map(|u| u.login.clone()).collect(),
    labels: pr.labels.iter().map(|l| l.name.clone()).collect(),
    ..Default::default()
  }
}

/// Required check names from branch protection and ruleset rules, deduplicated and sorted.
pub fn required_check_names(protection: Option<&RawRequiredStatusChecks>, rules: &[RawRule]) -> Vec<String> {
  let mut names: BTreeSet<String> = BTreeSet::new();

  if let Some(p) = protection {
    names.extend(p.contexts.iter().cloned());
    names.extend(p.checks.iter().map(|c| c.context.clone()));
  }

  for rule in rules.iter().filter(|r| r.rule_type == "required_status_checks") {
    if let Some(params) = &rule.parameters {
      names.extend(params.required_status_checks.iter().map(|c| c.context.clone()));
    }
  }

  names.into_iter().filter(|n| !n.is_empty()).collect()
}

/// Flag check and status events whose name is a required check.
pub fn mark_required(events: &mut [Event], required: &[String]) {
  for e in events.iter_mut().filter(|e| e.kind.is_check()) {
    e.required = required.iter().any(|r| r == &e.body);
  }
}

fn is_failure_outcome(outcome: &str) -> bool {
  matches!(outcome, "failure" | "error")
}

/// Drop non-failing status checks from the exposed list; every other kind is kept.
pub fn filter_noise(events: Vec<Event>) -> Vec<Event> {
  events
    .into_iter()
    .filter(|e| e.kind != EventKind::StatusCheck || is_failure_outcome(&e.outcome))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::github::raw::decode_items;
  use serde_json::json;

  fn check_runs(values: Vec<serde_json::Value>) -> Vec<RawItem> {
    decode_items::<RawCheckRun>(values, "check_run")
      .into_iter()
      .map(RawItem::CheckRun)
      .collect()
  }

  fn sample_items() -> Vec<RawItem> {
    let pr: RawPullRequest = serde_json::from_value(json!({
      "number": 7, "title": "Add thing", "body": "Could you review? cc @alice",
      "user": {"login": "octo"}, "author_association": "MEMBER", "state": "open",
      "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap();
    let comment: RawComment = serde_json::from_value(json!({
      "user": {"login": "renovate[bot]"}, "body": "Bumped deps", "created_at": "2024-01-01T01:00:00Z",
      "author_association": "NONE"
    }))
    .unwrap();
    let mut items = vec![RawItem::PullRequest(pr), RawItem::Comment(comment)];
    items.extend(check_runs(vec![
      json!({"name": "test", "status": "completed", "conclusion": "failure", "head_sha": "aaa",
             "completed_at": "2024-01-01T02:00:00Z"}),
      json!({"name": "test", "status": "completed", "conclusion": "failure", "head_sha": "bbb",
             "completed_at": "2024-01-01T02:00:00Z"}),
      json!({"name": "test", "status": "completed", "conclusion": "success", "head_sha": "bbb",
             "completed_at": "2024-01-01T03:00:00Z"}),
    ]));
    items
  }

  #[test]
  fn normalize_is_idempotent() {
    let items = sample_items();
    let a = serde_json::to_vec(&normalize(&items)).unwrap();
    let b = serde_json::to_vec(&normalize(&items)).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn opened_event_carries_author_text_flags() {
    let events = normalize(&sample_items());
    let opened = &events[0];
    assert_eq!(opened.kind, EventKind::Opened);
    assert_eq!(opened.actor, "octo");
    assert!(opened.question);
    assert_eq!(opened.mentions, vec!["alice".to_string()]);
    assert_eq!(opened.association, Some(Association::Member));
    assert!(events[1].bot);
  }

  #[test]
  fn cross_commit_check_runs_dedup_first_seen() {
    let events = normalize(&sample_items());
    let checks: Vec<_> = events.iter().filter(|e| e.kind == EventKind::CheckRun).collect();
    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0].target, "aaa");
    assert_eq!(checks[0].outcome, "failure");
    assert_eq!(checks[1].outcome, "success");
  }

  #[test]
  fn in_progress_check_uses_status_as_outcome() {
    let events = normalize(&check_runs(vec![json!({
      "name": "lint", "status": "in_progress", "conclusion": null, "head_sha": "c1",
      "started_at": "2024-01-01T00:00:00Z", "output": {"title": "Running", "summary": "…"}
    })]));
    assert_eq!(events[0].outcome, "in_progress");
    assert_eq!(events[0].description, "Running");
  }

  #[test]
  fn timeline_items_map_targets_and_unknowns_drop() {
    let values = vec![
      json!({"event": "labeled", "actor": {"login": "maint"}, "created_at": "2024-01-01T00:00:00Z", "label": {"name": "bug"}}),
      json!({"event": "assigned", "actor": {"login": "maint"}, "created_at": "2024-01-01T00:00:01Z", "assignee": {"login": "helper-bot"}}),
      json!({"event": "renamed", "actor": {"login": "octo"}, "created_at": "2024-01-01T00:00:02Z", "rename": {"from": "Old", "to": "New"}}),
      json!({"event": "review_requested", "actor": {"login": "octo"}, "created_at": "2024-01-01T00:00:03Z", "requested_team": {"name": "Core", "slug": "core"}}),
      json!({"event": "committed", "sha": "abc"}),
      json!({"event": "brand_new_thing", "created_at": "2024-01-01T00:00:04Z"}),
    ];
    let items: Vec<RawItem> = decode_items::<RawTimelineItem>(values, "timeline")
      .into_iter()
      .map(RawItem::Timeline)
      .collect();
    let events = normalize(&items);
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].target, "bug");
    assert_eq!(events[1].target, "helper-bot");
    assert!(events[1].target_is_bot);
    assert_eq!(events[2].kind, EventKind::RenamedTitle);
    assert_eq!(events[2].description, "Old -> New");
    assert_eq!(events[3].target, "core");
  }

  #[test]
  fn commit_falls_back_to_git_author_name() {
    let commit: RawCommit = serde_json::from_value(json!({
      "sha": "deadbeef", "author": null,
      "commit": {"message": "Fix it\n\nlong body", "author": {"name": "Jane Dev", "date": "2024-02-01T00:00:00Z"}}
    }))
    .unwrap();
    let events = normalize(&[RawItem::Commit(commit)]);
    assert_eq!(events[0].actor, "Jane Dev");
    assert_eq!(events[0].body, "Fix it");
    assert_eq!(events[0].description, "deadbeef");
  }

  #[test]
  fn long_bodies_are_clipped() {
    let comment: RawComment = serde_json::from_value(json!({
      "user": {"login": "a"}, "body": "é".repeat(300), "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap();
    let events = normalize(&[RawItem::Comment(comment)]);
    assert_eq!(events[0].body.chars().count(), MAX_TEXT_CHARS);
  }

  #[test]
  fn pending_reviews_are_skipped_and_outdated_comments_flagged() {
    let pending: RawReview = serde_json::from_value(json!({"user": {"login": "r"}, "state": "PENDING"})).unwrap();
    let rc: RawReviewComment = serde_json::from_value(json!({
      "user": {"login": "r"}, "body": "nit", "created_at": "2024-01-01T00:00:00Z", "path": "src/lib.rs", "position": null
    }))
    .unwrap();
    let events = normalize(&[RawItem::Review(pending), RawItem::ReviewComment(rc)]);
    assert_eq!(events.len(), 1);
    assert!(events[0].outdated);
    assert_eq!(events[0].description, "src/lib.rs");
  }

  #[test]
  fn pull_request_fields_copy_identity() {
    let pr: RawPullRequest = serde_json::from_value(json!({
      "number": 3, "title": "T", "user": {"login": "dependabot[bot]", "type": "Bot"}, "state": "closed",
      "merged_at": "2024-01-02T00:00:00Z", "merged_by": {"login": "maint"}, "mergeable_state": "CLEAN",
      "created_at": "2024-01-01T00:00:00Z", "head": {"sha": "h1", "ref": "deps"}, "base": {"sha": "b1", "ref": "main"},
      "assignees": [{"login": "x"}], "labels": [{"name": "deps"}]
    }))
    .unwrap();
    let fields = pull_request_fields(&pr);
    assert!(fields.author_bot);
    assert!(fields.merged);
    assert_eq!(fields.merged_by.as_deref(), Some("maint"));
    assert_eq!(fields.mergeable_state, "clean");
    assert_eq!(fields.base_ref, "main");
    assert_eq!(fields.labels, vec!["deps".to_string()]);
    assert!(fields.check_summary.success.is_empty());
  }

  #[test]
  fn required_names_merge_protection_and_rules() {
    let protection: RawRequiredStatusChecks =
      serde_json::from_value(json!({"contexts": ["build", "test"], "checks": [{"context": "test"}]})).unwrap();
    let rules: Vec<RawRule> = serde_json::from_value(json!([
      {"type": "required_status_checks", "parameters": {"required_status_checks": [{"context": "lint"}]}},
      {"type": "pull_request", "parameters": {}}
    ]))
    .unwrap();
    assert_eq!(required_check_names(Some(&protection), &rules), vec!["build", "lint", "test"]);
    assert!(required_check_names(None, &[]).is_empty());
  }

  #[test]
  fn noise_filter_keeps_only_failing_statuses() {
    let ts = Utc::now();
    let mut ok = Event::new(EventKind::StatusCheck, ts);
    ok.outcome = "success".into();
    let mut bad = Event::new(EventKind::StatusCheck, ts);
    bad.outcome = "error".into();
    let mut run = Event::new(EventKind::CheckRun, ts);
    run.outcome = "success".into();
    let kept = filter_noise(vec![ok, bad, run]);
    assert_eq!(kept.len(), 2);
    assert!(kept.iter().all(|e| e.kind != EventKind::StatusCheck || e.outcome == "error"));
  }

  #[test]
  fn mark_required_only_touches_checks() {
    let ts = Utc::now();
    let mut run = Event::new(EventKind::CheckRun, ts);
    run.body = "build".into();
    let mut comment = Event::new(EventKind::Comment, ts);
    comment.body = "build".into();
    let mut events = vec![run, comment];
    mark_required(&mut events, &["build".to_string()]);
    assert!(events[0].required);
    assert!(!events[1].required);
  }

  #[test]
  fn long_check_names_stay_whole_through_required_matching() {
    let name = format!("integration / {}", "matrix-entry-".repeat(23));
    assert!(name.chars().count() > MAX_TEXT_CHARS);

    let mut events = normalize(&check_runs(vec![json!({
      "name": name, "status": "completed", "conclusion": "success", "head_sha": "c1",
      "started_at": "2024-01-01T00:00:00Z", "completed_at": "2024-01-01T00:05:00Z"
    })]));
    let required = vec![name.clone()];
    mark_required(&mut events, &required);

    assert_eq!(events[0].body, name);
    assert!(events[0].required);

    let pr = crate::summary::finalize(PullRequest::default(), &events, &required, None);
    assert_eq!(pr.check_summary.success.keys().collect::<Vec<_>>(), vec![&name]);
    assert!(pr.check_summary.pending.is_empty());
    assert_eq!(pr.test_state, crate::model::TestState::Passing);
  }
}
