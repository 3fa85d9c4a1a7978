// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed raw shapes for GitHub REST payloads consumed by the normalizer
// role: github/raw-decoding
// inputs: serde_json::Value items returned by a GithubApi backend
// outputs: RawItem values (one variant per upstream resource); timeline items as a tagged union
// invariants:
// - Decoding is per item: one malformed item is skipped (warn!) without failing the batch
// - Unknown timeline `event` tags decode to RawTimelineItem::Unknown and are dropped later
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawUser {
  #[serde(default)]
  pub login: String,
  #[serde(rename = "type", default)]
  pub user_type: Option<String>,
  #[serde(default)]
  pub node_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRef {
  #[serde(default)]
  pub sha: String,
  #[serde(rename = "ref", default)]
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLabel {
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPullRequest {
  pub number: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub body: Option<String>,
  #[serde(default)]
  pub user: Option<RawUser>,
  #[serde(default)]
  pub author_association: Option<String>,
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub draft: bool,
  #[serde(default)]
  pub merged: bool,
  #[serde(default)]
  pub merged_by: Option<RawUser>,
  #[serde(default)]
  pub mergeable: Option<bool>,
  #[serde(default)]
  pub mergeable_state: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub updated_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub closed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub merged_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub head: RawRef,
  #[serde(default)]
  pub base: RawRef,
  #[serde(default)]
  pub additions: u64,
  #[serde(default)]
  pub deletions: u64,
  #[serde(default)]
  pub changed_files: u64,
  #[serde(default)]
  pub assignees: Vec<RawUser>,
  #[serde(default)]
  pub requested_reviewers: Vec<RawUser>,
  #[serde(default)]
  pub labels: Vec<RawLabel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGitActor {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommitDetail {
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub author: Option<RawGitActor>,
  #[serde(default)]
  pub committer: Option<RawGitActor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCommit {
  pub sha: String,
  pub commit: RawCommitDetail,
  /// Linked GitHub account; null when the author email matches no account.
  #[serde(default)]
  pub author: Option<RawUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
  #[serde(default)]
  pub user: Option<RawUser>,
  #[serde(default)]
  pub body: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub author_association: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
  #[serde(default)]
  pub user: Option<RawUser>,
  #[serde(default)]
  pub body: Option<String>,
  pub state: String,
  /// Absent for reviews still pending submission.
  #[serde(default)]
  pub submitted_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub author_association: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReviewComment {
  #[serde(default)]
  pub user: Option<RawUser>,
  #[serde(default)]
  pub body: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub author_association: Option<String>,
  #[serde(default)]
  pub path: Option<String>,
  /// Null once the diff hunk the comment was attached to no longer exists.
  #[serde(default)]
  pub position: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMilestone {
  #[serde(default)]
  pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRename {
  #[serde(default)]
  pub from: String,
  #[serde(default)]
  pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDismissedReview {
  #[serde(default)]
  pub state: String,
  #[serde(default)]
  pub dismissal_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawIssueRef {
  pub number: u64,
  #[serde(default)]
  pub html_url: Option<String>,
  #[serde(default)]
  pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReferenceSource {
  #[serde(default)]
  pub issue: Option<RawIssueRef>,
}

/// Fields shared by issue timeline events; each kind reads the subset it needs.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineFields {
  #[serde(default)]
  pub actor: Option<RawUser>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub commit_id: Option<String>,
  #[serde(default)]
  pub label: Option<RawLabel>,
  #[serde(default)]
  pub assignee: Option<RawUser>,
  #[serde(default)]
  pub milestone: Option<RawMilestone>,
  #[serde(default)]
  pub requested_reviewer: Option<RawUser>,
  #[serde(default)]
  pub requested_team: Option<RawTeam>,
  #[serde(default)]
  pub dismissed_review: Option<RawDismissedReview>,
  #[serde(default)]
  pub rename: Option<RawRename>,
  #[serde(default)]
  pub source: Option<RawReferenceSource>,
}

/// Issue timeline item, discriminated by the upstream `event` tag.
///
/// `committed`, `commented`, `reviewed` and `line-commented` are fetched from
/// their dedicated endpoints, so they land in `Unknown` with everything else
/// this crate does not model.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RawTimelineItem {
  Labeled(TimelineFields),
  Unlabeled(TimelineFields),
  Assigned(TimelineFields),
  Unassigned(TimelineFields),
  Milestoned(TimelineFields),
  Demilestoned(TimelineFields),
  ReviewRequested(TimelineFields),
  ReviewRequestRemoved(TimelineFields),
  ReviewDismissed(TimelineFields),
  Merged(TimelineFields),
  Closed(TimelineFields),
  Reopened(TimelineFields),
  ReadyForReview(TimelineFields),
  ConvertToDraft(TimelineFields),
  HeadRefForcePushed(TimelineFields),
  HeadRefDeleted(TimelineFields),
  HeadRefRestored(TimelineFields),
  BaseRefChanged(TimelineFields),
  BaseRefForcePushed(TimelineFields),
  Renamed(TimelineFields),
  Locked(TimelineFields),
  Unlocked(TimelineFields),
  AutoMergeEnabled(TimelineFields),
  AutoMergeDisabled(TimelineFields),
  AutoSquashEnabled(TimelineFields),
  AutoRebaseEnabled(TimelineFields),
  AddedToMergeQueue(TimelineFields),
  RemovedFromMergeQueue(TimelineFields),
  AutomaticBaseChangeSucceeded(TimelineFields),
  AutomaticBaseChangeFailed(TimelineFields),
  Connected(TimelineFields),
  Disconnected(TimelineFields),
  #[serde(rename = "cross-referenced")]
  CrossReferenced(TimelineFields),
  Referenced(TimelineFields),
  Mentioned(TimelineFields),
  Subscribed(TimelineFields),
  Unsubscribed(TimelineFields),
  Deployed(TimelineFields),
  DeploymentEnvironmentChanged(TimelineFields),
  Pinned(TimelineFields),
  Unpinned(TimelineFields),
  Transferred(TimelineFields),
  CommentDeleted(TimelineFields),
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCheckOutput {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCheckRun {
  pub name: String,
  #[serde(default)]
  pub status: String,
  #[serde(default)]
  pub conclusion: Option<String>,
  #[serde(default)]
  pub started_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub completed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub head_sha: String,
  #[serde(default)]
  pub output: Option<RawCheckOutput>,
  #[serde(default)]
  pub app: Option<RawUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
  pub context: String,
  pub state: String,
  #[serde(default)]
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub creator: Option<RawUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPermissions {
  #[serde(default)]
  pub admin: bool,
  #[serde(default)]
  pub maintain: bool,
  #[serde(default)]
  pub push: bool,
  #[serde(default)]
  pub triage: bool,
  #[serde(default)]
  pub pull: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCollaborator {
  pub login: String,
  #[serde(default)]
  pub role_name: Option<String>,
  #[serde(default)]
  pub permissions: Option<RawPermissions>,
}

impl RawCollaborator {
  /// Effective role string; older API versions only expose permission flags.
  pub fn role(&self) -> String {
    if let Some(r) = self.role_name.as_deref().filter(|r| !r.is_empty()) {
      return r.to_ascii_lowercase();
    }
    let p = self.permissions.clone().unwrap_or_default();
    let role = if p.admin {
      "admin"
    } else if p.maintain {
      "maintain"
    } else if p.push {
      "write"
    } else if p.triage {
      "triage"
    } else if p.pull {
      "read"
    } else {
      "none"
    };
    role.to_string()
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPermissionLevel {
  #[serde(default)]
  pub permission: String,
  #[serde(default)]
  pub role_name: Option<String>,
}

impl RawPermissionLevel {
  pub fn role(&self) -> String {
    self
      .role_name
      .as_deref()
      .filter(|r| !r.is_empty())
      .unwrap_or(&self.permission)
      .to_ascii_lowercase()
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRequiredCheck {
  pub context: String,
}

/// Branch protection `required_status_checks` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequiredStatusChecks {
  #[serde(default)]
  pub contexts: Vec<String>,
  #[serde(default)]
  pub checks: Vec<RawRequiredCheck>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRuleParameters {
  #[serde(default)]
  pub required_status_checks: Vec<RawRequiredCheck>,
}

/// One active ruleset rule for a branch; only `required_status_checks` rules matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRule {
  #[serde(rename = "type")]
  pub rule_type: String,
  #[serde(default)]
  pub parameters: Option<RawRuleParameters>,
}

/// Shared raw-item shape handed to the normalizer.
#[derive(Debug, Clone)]
pub enum RawItem {
  PullRequest(RawPullRequest),
  Commit(RawCommit),
  Comment(RawComment),
  Review(RawReview),
  ReviewComment(RawReviewComment),
  Timeline(RawTimelineItem),
  CheckRun(RawCheckRun),
  Status { status: RawStatus, sha: String },
}

/// Decode a batch of JSON items, skipping (and logging) the malformed ones.
pub fn decode_items<T: DeserializeOwned>(values: Vec<serde_json::Value>, what: &str) -> Vec<T> {
  values
    .into_iter()
    .filter_map(|v| match serde_json::from_value::<T>(v) {
      Ok(item) => Some(item),
      Err(e) => {
        warn!(kind = what, error = %e, "skipping malformed upstream item");
        None
      }
    })
    .collect()
}
